use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Embed)]
#[folder = "assets/vocabulary/"]
struct VocabularyAssets;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabTerm {
    pub word: String,
    #[serde(default)]
    pub definition: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabList {
    #[serde(default)]
    pub terms: Vec<VocabTerm>,
}

impl VocabList {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The bundled glossary. A broken asset yields an empty list.
    pub fn load() -> Self {
        let Some(file) = VocabularyAssets::get("terms.json") else {
            warn!("bundled vocabulary missing");
            return Self::default();
        };
        std::str::from_utf8(file.data.as_ref())
            .map_err(|e| e.to_string())
            .and_then(|content| Self::from_json(content).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not parse bundled vocabulary");
                Self::default()
            })
    }
}
