/// Retrieval model abstraction
///
/// The model is trained elsewhere and shipped as an artifact. The service only
/// queries it: one user id in, one ranked list of candidates out. Keeping it
/// behind a trait lets the pipeline run against stubs in tests.
use crate::error::AppResult;

pub mod brute_force;

pub use brute_force::BruteForceIndex;

/// Raw model output: two parallel arrays ranked best-first
///
/// Titles come back byte-encoded, the way the exported index stores them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedCandidates {
    pub scores: Vec<f32>,
    pub titles: Vec<Vec<u8>>,
}

impl RankedCandidates {
    pub fn len(&self) -> usize {
        self.titles.len().min(self.scores.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pre-trained scoring function over the book catalog
#[cfg_attr(test, mockall::automock)]
pub trait RetrievalModel: Send + Sync {
    /// Scores candidates for `user_id`
    ///
    /// Ids the model has never seen are not an error: the result is whatever the
    /// model produces for them (possibly empty).
    fn query(&self, user_id: &str) -> AppResult<RankedCandidates>;

    /// Model name for logging and the health endpoint
    fn name(&self) -> &'static str;
}
