use serde::Serialize;

/// Rows shown for a reading history
pub const HISTORY_MAX_ROWS: usize = 3;
/// Characters of a title kept in a history caption
pub const HISTORY_CAPTION_CHARS: usize = 15;
/// Characters of a title kept in a recommendation caption
pub const RECOMMENDATION_CAPTION_CHARS: usize = 25;

/// Cards laid out row-major in a fixed number of columns
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Gallery<T> {
    pub columns: usize,
    pub rows: Vec<Vec<T>>,
}

impl<T> Gallery<T> {
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Number of cards a grid can show, `None` when unbounded
pub fn capacity(columns: usize, max_rows: Option<usize>) -> Option<usize> {
    max_rows.map(|rows| rows * columns)
}

/// Lays `items` out in rows of `columns`, dropping whatever does not fit in `max_rows`
pub fn layout<T>(items: Vec<T>, columns: usize, max_rows: Option<usize>) -> Gallery<T> {
    let columns = columns.max(1);
    let limit = capacity(columns, max_rows).unwrap_or(usize::MAX);

    let mut rows: Vec<Vec<T>> = Vec::new();
    for item in items.into_iter().take(limit) {
        match rows.last_mut() {
            Some(row) if row.len() < columns => row.push(item),
            _ => rows.push(vec![item]),
        }
    }

    Gallery { columns, rows }
}

/// First `max_chars` characters of `title` followed by an ellipsis
pub fn caption(title: &str, max_chars: usize) -> String {
    let mut caption: String = title.chars().take(max_chars).collect();
    caption.push_str("...");
    caption
}
