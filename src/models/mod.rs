pub mod icon;

pub use icon::{
    DiscoveryResult, IconCandidate, IconOutcome, ImagePayload, PlaceholderGlyph, ProviderIcon,
    RenderedIcon, SelectionPreferences, UNKNOWN_SIZE,
};
