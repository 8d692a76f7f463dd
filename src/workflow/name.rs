use serde::{Deserialize, Serialize};

/// Case-folded, whitespace-trimmed collection name.
///
/// This, not the raw user input, is the uniqueness key and the key used for
/// persistence lookups. The only way to build one from user input is
/// [`NormalizedName::new`], which applies the normalization rule, so every
/// consumer of the type observably agrees on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedName(String);

impl NormalizedName {
    /// Normalize raw user input. Returns `None` when the input is empty or
    /// whitespace-only after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    /// Wrap a name that is already normalized, e.g. one read back from a
    /// store that only ever persists normalized keys.
    pub fn assume_normalized(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
