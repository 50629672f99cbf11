use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::{self, is_duplicate_key, Database},
    errors::{AppError, AppResult},
    models::domain::Certificate,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the user already holds one for the course.
    async fn create(&self, certificate: Certificate) -> AppResult<Certificate>;
    async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Certificate>>;
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Certificate>>;
}

pub struct MongoCertificateRepository {
    collection: Collection<Certificate>,
}

impl MongoCertificateRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(db::CERTIFICATES);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for certificates collection");

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

        log::info!("Successfully created indexes for certificates collection");
        Ok(())
    }
}

#[async_trait]
impl CertificateRepository for MongoCertificateRepository {
    async fn create(&self, certificate: Certificate) -> AppResult<Certificate> {
        match self.collection.insert_one(&certificate).await {
            Ok(_) => Ok(certificate),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(
                "Certificate already issued.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Certificate>> {
        let certificate = self
            .collection
            .find_one(doc! { "user_id": user_id, "course_id": course_id })
            .await?;
        Ok(certificate)
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Certificate>> {
        let options = FindOptions::builder()
            .sort(doc! { "issue_date": -1 })
            .build();
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .with_options(options)
            .await?;
        let certificates: Vec<Certificate> = cursor.try_collect().await?;
        Ok(certificates)
    }
}
