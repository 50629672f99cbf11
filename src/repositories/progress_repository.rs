use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{self, Database},
    errors::AppResult,
    models::domain::Progress,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Progress>>;
    /// Inserts or replaces the record for `(user_id, course_id)`.
    async fn upsert(&self, progress: Progress) -> AppResult<Progress>;
}

pub struct MongoProgressRepository {
    collection: Collection<Progress>,
}

impl MongoProgressRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(db::PROGRESS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for progress collection");

        let user_course_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "course_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_course_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(user_course_index).await?;

        log::info!("Successfully created indexes for progress collection");
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for MongoProgressRepository {
    async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Progress>> {
        let progress = self
            .collection
            .find_one(doc! { "user_id": user_id, "course_id": course_id })
            .await?;
        Ok(progress)
    }

    async fn upsert(&self, progress: Progress) -> AppResult<Progress> {
        self.collection
            .replace_one(
                doc! { "user_id": &progress.user_id, "course_id": &progress.course_id },
                &progress,
            )
            .upsert(true)
            .await?;
        Ok(progress)
    }
}
