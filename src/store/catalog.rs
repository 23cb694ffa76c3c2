use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogRow, ReadingHistory},
};

/// Read-only catalog joining users, ratings and book metadata
///
/// Titles are the join key and are not unique: several rows (one per rating)
/// share a title, and two distinct books may share one. Cover lookups use the
/// first row stored for a title.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
    first_row_by_title: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        let mut first_row_by_title = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            first_row_by_title
                .entry(row.book_title.clone())
                .or_insert(idx);
        }

        Self {
            rows,
            first_row_by_title,
        }
    }

    /// Loads the catalog CSV from disk
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Artifact(format!("Failed to open catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            rows = catalog.len(),
            titles = catalog.first_row_by_title.len(),
            "Loaded catalog"
        );

        Ok(catalog)
    }

    /// Parses catalog rows from any CSV source with a header line
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();

        for result in reader.deserialize::<CatalogRow>() {
            let row = result.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                AppError::Artifact(format!("Malformed catalog row at line {}: {}", line, e))
            })?;
            rows.push(row);
        }

        Ok(Self::new(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cover URL of the first row carrying `title`
    pub fn cover_url(&self, title: &str) -> Option<&str> {
        self.first_row_by_title
            .get(title)
            .map(|&idx| self.rows[idx].img_l.as_str())
    }

    /// All rows rated by `user_id`, in stored order
    pub fn history(&self, user_id: i64) -> ReadingHistory {
        let mut history = ReadingHistory::default();
        for row in self.rows.iter().filter(|row| row.user_id == user_id) {
            history.push(row);
        }
        history
    }
}
