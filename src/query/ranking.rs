//! Name match ranking
//!
//! Name search orders hits by how closely the name matches the query:
//! exact name first, then names starting with the query, then names that
//! merely contain it. Ties keep dataset order.

/// Kind of name match, ordered best first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact,
    Prefix,
    Substring,
}

impl NameMatch {
    /// Classify `name` against an already lowercased, trimmed `needle`.
    /// Returns `None` when the name does not contain the needle at all.
    pub fn classify(name: &str, needle: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        if name == needle {
            Some(NameMatch::Exact)
        } else if name.starts_with(needle) {
            Some(NameMatch::Prefix)
        } else if name.contains(needle) {
            Some(NameMatch::Substring)
        } else {
            None
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            NameMatch::Exact => 0,
            NameMatch::Prefix => 1,
            NameMatch::Substring => 2,
        }
    }
}

/// Stable sort of classified hits, best match first
pub fn rank_hits<T>(mut hits: Vec<(NameMatch, T)>) -> Vec<T> {
    hits.sort_by_key(|(kind, _)| kind.rank());
    hits.into_iter().map(|(_, item)| item).collect()
}
