//! Fixed-canvas SVG composition
//!
//! Embeds an arbitrary image payload into a 100x100 SVG. The image is
//! scaled to fit and centered inside an inset square; everything outside
//! it is transparent.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::escape;

use crate::models::{ImagePayload, RenderedIcon};

/// Side length of the output canvas in SVG user units
pub const CANVAS_SIZE: u32 = 100;

/// Inset applied on every side when padding is requested
pub const EDGE_PADDING: u32 = 10;

pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// Builds the SVG wrapper around a chosen icon
pub struct CanvasCompositor;

impl CanvasCompositor {
    /// Wrap `image` into the fixed canvas, inset by [`EDGE_PADDING`] when `add_padding` is set
    pub fn compose(image: &ImagePayload, add_padding: bool) -> RenderedIcon {
        let padding = if add_padding { EDGE_PADDING } else { 0 };
        let size = CANVAS_SIZE - padding * 2;
        let encoded = STANDARD.encode(&image.bytes);
        let mime = escape(&image.mime_type);

        let svg = format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {canvas} {canvas}" width="{canvas}" height="{canvas}">"#,
                r#"<defs><pattern id="img" x="{p}" y="{p}" width="{s}" height="{s}" patternUnits="userSpaceOnUse">"#,
                r#"<image x="0" y="0" width="{s}" height="{s}" preserveAspectRatio="xMidYMid meet" href="data:{mime};base64,{data}"/>"#,
                r#"</pattern></defs>"#,
                r#"<rect width="{canvas}" height="{canvas}" fill="transparent"/>"#,
                r#"<rect x="{p}" y="{p}" width="{s}" height="{s}" fill="url(#img)"/>"#,
                r#"</svg>"#
            ),
            canvas = CANVAS_SIZE,
            p = padding,
            s = size,
            mime = mime,
            data = encoded,
        );

        RenderedIcon {
            payload: svg.into_bytes(),
            mime_type: SVG_MIME_TYPE.to_string(),
            padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ImagePayload {
        ImagePayload {
            bytes: vec![0x89, b'P', b'N', b'G'],
            mime_type: "image/png".to_string(),
        }
    }

    fn svg(icon: &RenderedIcon) -> String {
        String::from_utf8(icon.payload.clone()).unwrap()
    }

    #[test]
    fn test_canvas_is_always_100_square() {
        for add_padding in [false, true] {
            let icon = CanvasCompositor::compose(&payload(), add_padding);
            let out = svg(&icon);
            assert!(out.starts_with(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" width="100" height="100">"#
            ));
            assert!(out.contains(r#"<rect width="100" height="100" fill="transparent"/>"#));
            assert_eq!(icon.mime_type, "image/svg+xml");
        }
    }

    #[test]
    fn test_padding_is_zero_or_ten() {
        let plain = CanvasCompositor::compose(&payload(), false);
        assert_eq!(plain.padding, 0);
        assert!(svg(&plain).contains(r#"<rect x="0" y="0" width="100" height="100" fill="url(#img)"/>"#));

        let padded = CanvasCompositor::compose(&payload(), true);
        assert_eq!(padded.padding, 10);
        let out = svg(&padded);
        assert!(out.contains(r#"<pattern id="img" x="10" y="10" width="80" height="80""#));
        assert!(out.contains(r#"<rect x="10" y="10" width="80" height="80" fill="url(#img)"/>"#));
    }

    #[test]
    fn test_payload_embedded_as_data_uri() {
        let out = svg(&CanvasCompositor::compose(&payload(), false));
        assert!(out.contains(r#"preserveAspectRatio="xMidYMid meet""#));
        assert!(out.contains(r#"href="data:image/png;base64,iVBORw==""#));
    }

    #[test]
    fn test_mime_type_is_escaped() {
        let hostile = ImagePayload {
            bytes: vec![],
            mime_type: r#"image/png" onload="x"#.to_string(),
        };
        let out = svg(&CanvasCompositor::compose(&hostile, false));
        assert!(out.contains("data:image/png&quot; onload=&quot;x;base64,"));
    }
}
