use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::AuthProvider;
use crate::collection::{CollectionManager, SharedCollection};
use crate::config::Config;
use crate::contact::{ContactRepository, SqliteContactRepository};
use crate::db::models::{InstagramReview, PortfolioImage};
use crate::store::{LocalObjectStore, SqliteTable};
use crate::upload::{UploadPipeline, UploadPolicy};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub auth: AuthProvider,
    pub objects: Arc<LocalObjectStore>,
    pub portfolio: SharedCollection<PortfolioImage>,
    pub reviews: SharedCollection<InstagramReview>,
    pub contacts: Arc<dyn ContactRepository>,
    pub uploads: Arc<UploadPipeline>,
}

impl AppState {
    /// Wire the SQLite-backed collaborators. Collections start empty; call
    /// `load_collections` before serving.
    pub fn new(db: DbPool, config: Config) -> Self {
        let objects = Arc::new(LocalObjectStore::new(
            config.media_path(),
            config.server.public_url.clone(),
        ));
        let bucket = config.uploads.bucket.clone();

        let portfolio = CollectionManager::new(
            "portfolio",
            Arc::new(SqliteTable::<PortfolioImage>::new(db.clone())),
        )
        .with_attachments(objects.clone(), bucket.clone())
        .into_shared();

        let reviews = CollectionManager::new(
            "reviews",
            Arc::new(SqliteTable::<InstagramReview>::new(db.clone())),
        )
        .into_shared();

        let uploads = Arc::new(UploadPipeline::new(
            UploadPolicy::new(config.uploads.max_bytes),
            objects.clone(),
            bucket,
        ));

        Self {
            auth: AuthProvider::new(db.clone(), config.auth.session_hours),
            contacts: Arc::new(SqliteContactRepository::new(db.clone())),
            db,
            config,
            objects,
            portfolio,
            reviews,
            uploads,
        }
    }

    pub async fn load_collections(&self) -> Result<(), crate::collection::CollectionError> {
        self.portfolio.lock().await.load().await?;
        self.reviews.lock().await.load().await?;
        Ok(())
    }
}
