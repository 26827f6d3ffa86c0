//! Edge transparency analysis
//!
//! Decides whether a decoded icon has at least one fully transparent pixel
//! on its outer border, which is what triggers padding in the compositor.
//! Results are memoized by content fingerprint in a bounded LRU cache with
//! a time-to-live.

pub mod analyzer;
pub mod cache;

pub use analyzer::{DecodedImage, EdgeTransparencyAnalyzer, ImageDecoder, RasterImageDecoder};
pub use cache::{TransparencyCache, fingerprint};
