use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::{Config, CourseSource},
    db::Database,
    errors::AppResult,
    models::catalog::Catalog,
    repositories::{
        CertificateRepository, CourseRepository, ForumRepository, JsonCourseRepository,
        MongoCertificateRepository, MongoCourseRepository, MongoForumRepository,
        MongoProgressRepository, MongoUserRepository, ProgressRepository, UserRepository,
    },
    services::{
        certificate_service::CertificateService,
        course_service::CourseService,
        forum_service::ForumService,
        gamification::GamificationService,
        grader::{CodeGrader, CodeRunner, ProcessCodeRunner},
        practice_service::PracticeService,
        progress_service::ProgressService,
        quiz_service::QuizService,
        user_service::UserService,
    },
};

/// Storage backends behind every service.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub forum: Arc<dyn ForumRepository>,
    pub certificates: Arc<dyn CertificateRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub progress_service: Arc<ProgressService>,
    pub quiz_service: Arc<QuizService>,
    pub practice_service: Arc<PracticeService>,
    pub forum_service: Arc<ForumService>,
    pub certificate_service: Arc<CertificateService>,
    pub jwt_service: Arc<JwtService>,
    pub config: Arc<Config>,
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let progress_repository = Arc::new(MongoProgressRepository::new(&db));
        progress_repository.ensure_indexes().await?;

        let forum_repository = Arc::new(MongoForumRepository::new(&db));
        forum_repository.ensure_indexes().await?;

        let certificate_repository = Arc::new(MongoCertificateRepository::new(&db));
        certificate_repository.ensure_indexes().await?;

        let course_repository = Self::course_repository(&config, &db).await?;

        let repositories = Repositories {
            users: user_repository,
            courses: course_repository,
            progress: progress_repository,
            forum: forum_repository,
            certificates: certificate_repository,
        };

        let runner = Arc::new(ProcessCodeRunner::new(config.grader.clone()));

        Ok(Self::from_repositories(config, repositories, runner, Some(db)))
    }

    async fn course_repository(
        config: &Config,
        db: &Database,
    ) -> AppResult<Arc<dyn CourseRepository>> {
        match config.course_source {
            CourseSource::Json => {
                let repository = JsonCourseRepository::load(&config.course_catalog_path).await?;
                Ok(Arc::new(repository))
            }
            CourseSource::Database => {
                let repository = MongoCourseRepository::new(db);
                repository.ensure_indexes().await?;

                match Catalog::load(&config.course_catalog_path).await {
                    Ok(catalog) => {
                        if repository.import_if_empty(catalog.into_rows()).await? {
                            log::info!(
                                "Imported course catalog from {}",
                                config.course_catalog_path.display()
                            );
                        }
                    }
                    Err(e) => log::warn!("Skipping course catalog import: {}", e),
                }

                Ok(Arc::new(repository))
            }
        }
    }

    pub fn from_repositories(
        config: Config,
        repositories: Repositories,
        runner: Arc<dyn CodeRunner>,
        db: Option<Database>,
    ) -> Self {
        let Repositories {
            users,
            courses,
            progress,
            forum,
            certificates,
        } = repositories;

        let gamification = Arc::new(GamificationService::new(users.clone()));

        let certificate_service = Arc::new(CertificateService::new(
            certificates.clone(),
            courses.clone(),
            progress.clone(),
        ));
        let user_service = Arc::new(UserService::new(
            users.clone(),
            certificate_service.clone(),
            gamification.clone(),
        ));
        let course_service = Arc::new(CourseService::new(courses.clone(), progress.clone()));
        let progress_service = Arc::new(ProgressService::new(
            progress,
            courses.clone(),
            certificates,
            gamification.clone(),
        ));
        let quiz_service = Arc::new(QuizService::new(courses.clone(), gamification.clone()));
        let practice_service = Arc::new(PracticeService::new(
            courses,
            progress_service.clone(),
            gamification.clone(),
            CodeGrader::new(runner),
        ));
        let forum_service = Arc::new(ForumService::new(forum, users, gamification));

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.session_expiration_hours,
        ));

        Self {
            user_service,
            course_service,
            progress_service,
            quiz_service,
            practice_service,
            forum_service,
            certificate_service,
            jwt_service,
            config: Arc::new(config),
            db,
        }
    }

    /// Pings the store. Always healthy when running without one.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.db {
            Some(db) => db.health_check().await,
            None => Ok(()),
        }
    }
}
