pub mod loader;
pub mod pair;

pub use loader::{
    load_pairs, LoadError, LoadedPairs, Orphan, PairValidationReport, Side, SnippetReadError,
};
pub use pair::{Fingerprint, SnippetPair};

/// Similarity above which a name is offered as a "did you mean".
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Closest candidate to `needle` by Jaro-Winkler similarity, if any is close
/// enough. Exact matches are never suggested.
pub(crate) fn closest_name<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    candidates
        .into_iter()
        .filter(|candidate| *candidate != needle)
        .map(|candidate| (candidate, strsim::jaro_winkler(needle, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.to_string())
}
