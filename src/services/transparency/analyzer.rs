//! Border alpha scan over decoded raster images

use std::sync::Arc;
use tracing::{debug, trace};

use super::cache::{TransparencyCache, fingerprint};
use crate::errors::{AppError, AppResult};

/// Pixel grid produced by an [`ImageDecoder`]
///
/// `pixels` is row-major, 8 bits per channel, `channels` samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Alpha sample at `(x, y)`, or `None` for images without four channels
    fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if self.channels != 4 {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4 + 3;
        self.pixels.get(index).copied()
    }

    /// Whether any pixel on the outer border is fully transparent
    ///
    /// Scans the top and bottom rows, then the left and right columns, and
    /// stops at the first hit.
    pub fn has_transparent_border(&self) -> bool {
        if self.channels != 4 || self.width == 0 || self.height == 0 {
            return false;
        }

        let (w, h) = (self.width, self.height);
        let transparent = |x: u32, y: u32| self.alpha_at(x, y) == Some(0);

        (0..w).any(|x| transparent(x, 0) || transparent(x, h - 1))
            || (0..h).any(|y| transparent(0, y) || transparent(w - 1, y))
    }
}

/// Turns encoded bytes into a pixel grid
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> AppResult<DecodedImage>;
}

/// Decoder backed by the `image` crate (PNG, JPEG, GIF, WebP, ICO, BMP)
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageDecoder;

impl ImageDecoder for RasterImageDecoder {
    fn decode(&self, bytes: &[u8]) -> AppResult<DecodedImage> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AppError::decode(format!("Unsupported or corrupt image: {e}")))?;

        let channels = image.color().channel_count();
        let (width, height) = (image.width(), image.height());
        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };

        Ok(DecodedImage {
            width,
            height,
            channels: channels.min(4),
            pixels,
        })
    }
}

/// Memoized edge transparency check
#[derive(Clone)]
pub struct EdgeTransparencyAnalyzer {
    decoder: Arc<dyn ImageDecoder>,
    cache: Arc<TransparencyCache>,
    fingerprint_length: usize,
}

impl EdgeTransparencyAnalyzer {
    pub fn new(
        decoder: Arc<dyn ImageDecoder>,
        cache: Arc<TransparencyCache>,
        fingerprint_length: usize,
    ) -> Self {
        Self {
            decoder,
            cache,
            fingerprint_length,
        }
    }

    pub fn cache(&self) -> &Arc<TransparencyCache> {
        &self.cache
    }

    /// Whether the image has a fully transparent border pixel
    ///
    /// Undecodable input yields `false` and is not cached, so a later
    /// identical payload is decoded again.
    pub fn has_transparent_edges(&self, bytes: &[u8]) -> bool {
        let key = fingerprint(bytes, self.fingerprint_length);
        if let Some(cached) = self.cache.get(&key) {
            trace!("Transparency verdict cache hit for {}", key);
            return cached;
        }

        let verdict = match self.decoder.decode(bytes) {
            Ok(image) => image.has_transparent_border(),
            Err(e) => {
                debug!("Skipping transparency check: {}", e);
                return false;
            }
        };

        self.cache.insert(key, verdict);
        verdict
    }
}
