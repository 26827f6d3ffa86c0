//! Service layer
//!
//! One module per pipeline stage. [`FaviconService`] wires them together
//! and is the only entry point the web layer uses.

pub mod compositor;
pub mod discovery;
pub mod domain_resolver;
pub mod favicon_service;
pub mod icon_extractor;
pub mod icon_selector;
pub mod provider_fallback;
pub mod transparency;

pub use compositor::CanvasCompositor;
pub use discovery::{DiscoveryAttempt, DiscoveryWaterfall, forwardable_headers};
pub use domain_resolver::DomainResolver;
pub use favicon_service::FaviconService;
pub use icon_extractor::IconExtractor;
pub use icon_selector::IconSelector;
pub use provider_fallback::{ProviderFallback, placeholder_glyph};
pub use transparency::{EdgeTransparencyAnalyzer, TransparencyCache};
