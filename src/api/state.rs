use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::Config,
    error::AppResult,
    services::{BruteForceIndex, CoverResolver, CoverSource, RetrievalModel},
    store::{Catalog, IdentityIndex},
};

/// Artifacts loaded once at startup and shared read-only by every request
pub struct AppContext {
    pub catalog: Arc<Catalog>,
    pub identity: IdentityIndex,
    pub model: Arc<dyn RetrievalModel>,
    pub covers: Arc<dyn CoverSource>,
    pub loaded_at: DateTime<Utc>,
}

impl AppContext {
    pub fn new(
        catalog: Arc<Catalog>,
        identity: IdentityIndex,
        model: Arc<dyn RetrievalModel>,
        covers: Arc<dyn CoverSource>,
    ) -> Self {
        Self {
            catalog,
            identity,
            model,
            covers,
            loaded_at: Utc::now(),
        }
    }

    /// Loads the catalog, identity index and retrieval model named by `config`
    pub fn load(config: &Config) -> AppResult<Self> {
        let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
        let identity = IdentityIndex::load(&config.user_ids_path, &config.book_titles_path)?;
        let model = Arc::new(BruteForceIndex::load(&config.model_path)?);
        let covers = Arc::new(CoverResolver::new(
            catalog.clone(),
            config.cover_user_agent.clone(),
        ));

        Ok(Self::new(catalog, identity, model, covers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let vars = vec![
            (
                "CATALOG_PATH".to_string(),
                write(
                    &dir,
                    "filtered_df.csv",
                    "user_id,rating,book_title,book_author,img_l\n1,5,Dune,Frank Herbert,http://covers.local/dune.jpg\n",
                )
                .display()
                .to_string(),
            ),
            (
                "USER_IDS_PATH".to_string(),
                write(&dir, "users.json", "[[49]]").display().to_string(),
            ),
            (
                "BOOK_TITLES_PATH".to_string(),
                write(&dir, "titles.json", r#"["Dune"]"#).display().to_string(),
            ),
            (
                "MODEL_PATH".to_string(),
                write(
                    &dir,
                    "index.json",
                    r#"{"user_embeddings": {"1": [1.0]}, "candidates": [{"title": "Dune", "embedding": [0.5]}]}"#,
                )
                .display()
                .to_string(),
            ),
        ];
        let config = Config::from_vars(vars).unwrap();

        let ctx = AppContext::load(&config).unwrap();
        assert_eq!(ctx.catalog.len(), 1);
        assert_eq!(ctx.identity.user_ids, vec!["1"]);
        assert_eq!(ctx.model.name(), "brute_force");
        assert_eq!(ctx.model.query("1").unwrap().len(), 1);
    }

    #[test]
    fn test_load_fails_on_missing_artifacts() {
        let vars = vec![(
            "CATALOG_PATH".to_string(),
            "/nonexistent/filtered_df.csv".to_string(),
        )];
        let config = Config::from_vars(vars).unwrap();
        assert!(AppContext::load(&config).is_err());
    }
}
