use serde::{Deserialize, Serialize};

/// One row of the catalog CSV: a single user's rating of a single book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRow {
    pub book_title: String,
    pub book_author: String,
    /// Large cover image URL
    pub img_l: String,
    pub user_id: i64,
    pub rating: i32,
}

/// A recommended title with its display score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    /// Model score formatted to two decimal places
    pub score: String,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, score: f32) -> Self {
        Self {
            title: title.into(),
            score: format_score(score),
        }
    }
}

/// Formats a raw model score for display.
pub fn format_score(score: f32) -> String {
    format!("{:.2}", score)
}

/// Books a user has rated, as three row-aligned sequences
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReadingHistory {
    pub titles: Vec<String>,
    pub ratings: Vec<i32>,
    pub authors: Vec<String>,
}

impl ReadingHistory {
    pub fn push(&mut self, row: &CatalogRow) {
        self.titles.push(row.book_title.clone());
        self.ratings.push(row.rating);
        self.authors.push(row.book_author.clone());
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Exact title match against the read list
    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }

    /// Iterates rows as (title, rating, author)
    pub fn rows(&self) -> impl Iterator<Item = (&str, i32, &str)> {
        self.titles
            .iter()
            .zip(self.ratings.iter())
            .zip(self.authors.iter())
            .map(|((title, rating), author)| (title.as_str(), *rating, author.as_str()))
    }
}
