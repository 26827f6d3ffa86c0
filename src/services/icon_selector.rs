//! Icon selection
//!
//! Picks exactly one candidate out of a discovery result according to the
//! caller's size preferences. Selection is deterministic: ties always keep
//! the candidate that appeared first in the page.

use crate::models::{IconCandidate, SelectionPreferences};

/// Chooses the candidate to render
pub struct IconSelector;

impl IconSelector {
    /// Select one candidate, or `None` when there is nothing to choose from
    pub fn select<'a>(
        candidates: &'a [IconCandidate],
        preferences: SelectionPreferences,
    ) -> Option<&'a IconCandidate> {
        let min = preferences.minimum_width;

        if preferences.prefer_largest {
            return Self::largest(candidates, min);
        }

        if min > 0 {
            return candidates
                .iter()
                .find(|candidate| candidate.width() >= min)
                .or_else(|| Self::largest(candidates, 0));
        }

        candidates.first()
    }

    /// Running-best fold used by the prefer-largest rule
    ///
    /// With `min > 0` a candidate meeting the minimum always displaces a best
    /// that does not. Otherwise the strictly wider candidate wins.
    fn largest(candidates: &[IconCandidate], min: u32) -> Option<&IconCandidate> {
        candidates.iter().reduce(|best, candidate| {
            let best_width = best.width();
            let width = candidate.width();

            let displaces = if min > 0 && (width >= min) != (best_width >= min) {
                width >= min
            } else {
                width > best_width
            };

            if displaces { candidate } else { best }
        })
    }
}
