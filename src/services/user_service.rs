use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::password::{hash_password, verify_password},
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::{
            request::{LoginRequest, RegisterRequest, UpdateAvatarRequest, UpdateRatingRequest},
            response::{AuthResponse, ProfileDto},
        },
    },
    repositories::UserRepository,
    services::{
        certificate_service::CertificateService,
        gamification::{GamificationService, MAX_SAVE_ATTEMPTS},
    },
};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    certificates: Arc<CertificateService>,
    gamification: Arc<GamificationService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        certificates: Arc<CertificateService>,
        gamification: Arc<GamificationService>,
    ) -> Self {
        Self {
            users,
            certificates,
            gamification,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists("Email already exists.".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(&request.username, &request.email, &password_hash);
        let user = self.users.create(user).await?;

        log::info!("Registered user {} ({})", user.username, user.id);

        Ok(AuthResponse {
            user_id: user.id,
            username: user.username,
        })
    }

    /// Returns the user whose credentials match. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> AppResult<User> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Invalid email or password.".to_string());

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Failed login attempt for user {}", user.id);
            return Err(invalid());
        }

        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    pub async fn get_profile(&self, user_id: &str) -> AppResult<ProfileDto> {
        let user = self.get_user(user_id).await?;
        let certificates = self.certificates.list_for_user(user_id).await?;
        Ok(ProfileDto::new(user, certificates))
    }

    /// Sets the rating outright. Achievement thresholds still apply, so the
    /// change goes through the gamification engine as a delta.
    pub async fn update_rating(
        &self,
        user_id: &str,
        request: UpdateRatingRequest,
    ) -> AppResult<User> {
        request.validate()?;

        let target = request.rating;
        self.gamification
            .apply(user_id, "rating update", move |progression| {
                let delta = target.saturating_sub(progression.user().rating);
                progression.add_rating(delta);
            })
            .await
    }

    pub async fn update_avatar(
        &self,
        user_id: &str,
        request: UpdateAvatarRequest,
    ) -> AppResult<User> {
        request.validate()?;

        for _ in 0..MAX_SAVE_ATTEMPTS {
            let mut user = self.get_user(user_id).await?;
            user.avatar_url = Some(request.avatar_url.clone());
            if let Some(saved) = self.users.save(user).await? {
                return Ok(saved);
            }
        }

        Err(AppError::Conflict(
            "User was modified concurrently, please retry".to_string(),
        ))
    }
}
