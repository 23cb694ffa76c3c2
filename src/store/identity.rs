use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Entry as written by the exporter: raw UTF-8 bytes, or already a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EncodedString {
    Bytes(Vec<u8>),
    Text(String),
}

impl EncodedString {
    fn decode(self) -> AppResult<String> {
        match self {
            EncodedString::Text(text) => Ok(text),
            EncodedString::Bytes(bytes) => String::from_utf8(bytes)
                .map_err(|e| AppError::Artifact(format!("Entry is not valid UTF-8: {}", e))),
        }
    }
}

/// Decodes a JSON list of byte-encoded strings
pub fn decode_list(json: &str) -> AppResult<Vec<String>> {
    let entries: Vec<EncodedString> = serde_json::from_str(json)?;
    entries.into_iter().map(EncodedString::decode).collect()
}

fn load_list(path: &Path) -> AppResult<Vec<String>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        AppError::Artifact(format!("Failed to read {}: {}", path.display(), e))
    })?;
    decode_list(&json)
}

/// Known user ids and book titles, in exporter order
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    pub user_ids: Vec<String>,
    pub book_titles: Vec<String>,
}

impl IdentityIndex {
    pub fn new(user_ids: Vec<String>, book_titles: Vec<String>) -> Self {
        Self {
            user_ids,
            book_titles,
        }
    }

    pub fn load(
        user_ids_path: impl AsRef<Path>,
        book_titles_path: impl AsRef<Path>,
    ) -> AppResult<Self> {
        let user_ids = load_list(user_ids_path.as_ref())?;
        let book_titles = load_list(book_titles_path.as_ref())?;

        tracing::info!(
            users = user_ids.len(),
            titles = book_titles.len(),
            "Loaded identity index"
        );

        Ok(Self::new(user_ids, book_titles))
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|id| id == user_id)
    }
}
