use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// One patch unit: an original block and the text that replaces it.
///
/// Pairs are built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetPair {
    name: String,
    original: String,
    patched: String,
}

impl SnippetPair {
    /// Build a pair. Callers outside the loader are expected to uphold the
    /// non-empty original invariant themselves (tests, embedding tools).
    pub fn new(
        name: impl Into<String>,
        original: impl Into<String>,
        patched: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            original: original.into(),
            patched: patched.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn patched(&self) -> &str {
        &self.patched
    }

    /// A pair whose patched block is blank removes the matched text.
    pub fn is_deletion(&self) -> bool {
        self.patched.trim().is_empty()
    }

    /// Fingerprint of both blocks, stable across machines.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            original: xxh3_64(self.original.as_bytes()),
            patched: xxh3_64(self.patched.as_bytes()),
        }
    }
}

/// xxh3 hashes of a pair's two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub original: u64,
    pub patched: u64,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}:{:016x}", self.original, self.patched)
    }
}
