use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::model::{RankedCandidates, RetrievalModel},
};

const DEFAULT_TOP_K: usize = 10;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// On-disk layout of an exported retrieval index
#[derive(Debug, Deserialize)]
pub struct IndexArtifact {
    /// Number of candidates the index returns per query
    #[serde(default = "default_top_k")]
    pub k: usize,
    pub user_embeddings: HashMap<String, Vec<f32>>,
    /// Embedding the user tower produces for ids outside its vocabulary
    #[serde(default)]
    pub oov_embedding: Option<Vec<f32>>,
    pub candidates: Vec<CandidateArtifact>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateArtifact {
    pub title: String,
    pub embedding: Vec<f32>,
}

/// Exhaustive dot-product retrieval over precomputed embeddings
#[derive(Debug, Clone)]
pub struct BruteForceIndex {
    k: usize,
    dimension: usize,
    user_embeddings: HashMap<String, Vec<f32>>,
    oov_embedding: Option<Vec<f32>>,
    titles: Vec<Vec<u8>>,
    embeddings: Vec<Vec<f32>>,
}

impl BruteForceIndex {
    /// Builds the index, checking every embedding has the same dimension
    pub fn from_artifact(artifact: IndexArtifact) -> AppResult<Self> {
        let dimension = artifact
            .candidates
            .first()
            .map(|c| c.embedding.len())
            .or_else(|| artifact.user_embeddings.values().next().map(Vec::len))
            .unwrap_or_default();

        let check = |what: &str, len: usize| {
            if len == dimension {
                Ok(())
            } else {
                Err(AppError::Artifact(format!(
                    "{} has dimension {}, expected {}",
                    what, len, dimension
                )))
            }
        };

        for candidate in &artifact.candidates {
            check(
                format!("candidate '{}'", candidate.title).as_str(),
                candidate.embedding.len(),
            )?;
        }
        for (user_id, embedding) in &artifact.user_embeddings {
            check(format!("user '{}'", user_id).as_str(), embedding.len())?;
        }
        if let Some(oov) = &artifact.oov_embedding {
            check("oov embedding", oov.len())?;
        }

        let (titles, embeddings) = artifact
            .candidates
            .into_iter()
            .map(|c| (c.title.into_bytes(), c.embedding))
            .unzip();

        Ok(Self {
            k: artifact.k,
            dimension,
            user_embeddings: artifact.user_embeddings,
            oov_embedding: artifact.oov_embedding,
            titles,
            embeddings,
        })
    }

    /// Loads an exported index from a JSON file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Artifact(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        let artifact: IndexArtifact = serde_json::from_str(&json)?;
        let index = Self::from_artifact(artifact)?;

        tracing::info!(
            path = %path.display(),
            users = index.user_embeddings.len(),
            candidates = index.titles.len(),
            dimension = index.dimension,
            k = index.k,
            "Loaded retrieval index"
        );

        Ok(index)
    }

    fn user_embedding(&self, user_id: &str) -> Option<&[f32]> {
        self.user_embeddings
            .get(user_id)
            .or(self.oov_embedding.as_ref())
            .map(Vec::as_slice)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl RetrievalModel for BruteForceIndex {
    fn query(&self, user_id: &str) -> AppResult<RankedCandidates> {
        let Some(query) = self.user_embedding(user_id) else {
            tracing::warn!(user_id = %user_id, "Unknown user and no OOV embedding");
            return Ok(RankedCandidates::default());
        };

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(idx, embedding)| (idx, dot(query, embedding)))
            .collect();

        // Stable: equal scores keep candidate order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.k);

        let (scores, titles) = scored
            .into_iter()
            .map(|(idx, score)| (score, self.titles[idx].clone()))
            .unzip();

        Ok(RankedCandidates { scores, titles })
    }

    fn name(&self) -> &'static str {
        "brute_force"
    }
}
