use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{
        require_self,
        session::{clear_session_cookie, session_cookie},
        AuthenticatedUser,
    },
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RegisterRequest, UpdateAvatarRequest, UpdateRatingRequest},
        response::{AuthResponse, MessageResponse},
    },
};

#[post("/api/User/register")]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.user_service.register(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/User/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.login(request.into_inner()).await?;
    let token = state.jwt_service.create_token(&user)?;

    let cookie = session_cookie(
        token,
        state.jwt_service.expiration_hours(),
        state.config.session_cookie_secure,
    );

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        user_id: user.id,
        username: user.username,
    }))
}

#[post("/api/User/logout")]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(clear_session_cookie(state.config.session_cookie_secure))
        .json(MessageResponse::new("Logged out."))
}

#[get("/api/User/me")]
pub async fn me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let profile = state.user_service.get_profile(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[get("/api/User/profile/{user_id}")]
pub async fn get_profile(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let profile = state.user_service.get_profile(&user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[actix_web::put("/api/User/rating/{user_id}")]
pub async fn update_rating(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    request: web::Json<UpdateRatingRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_self(&auth.0, &user_id)?;

    state
        .user_service
        .update_rating(&user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Rating updated.")))
}

#[actix_web::put("/api/User/avatar")]
pub async fn update_avatar(
    state: web::Data<AppState>,
    request: web::Json<UpdateAvatarRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state
        .user_service
        .update_avatar(auth.user_id(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Avatar updated.",
        "avatarUrl": user.avatar_url
    })))
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let db_health = state.health_check().await;

    let status = if db_health.is_ok() {
        "ready"
    } else {
        "not_ready"
    };

    let response = serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": if db_health.is_ok() { "ok" } else { "error" }
        }
    });

    if db_health.is_ok() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[get("/health/live")]
pub async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
