//! Input sample type delivered by the reader

use serde::{Deserialize, Serialize};

/// One free-text address to process, with an optional country hint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressSample {
    pub text: String,
    /// Upstream hint for the expected country (ISO code).
    #[serde(default)]
    pub suggested_country: Option<String>,
    /// When set, only combinations matching the suggestion survive.
    #[serde(default)]
    pub force_suggested_country: bool,
}

impl AddressSample {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggested_country: None,
            force_suggested_country: false,
        }
    }

    pub fn with_suggestion(mut self, origin: impl Into<String>, forced: bool) -> Self {
        self.suggested_country = Some(origin.into());
        self.force_suggested_country = forced;
        self
    }
}
