use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::IssueCertificateRequest,
};

#[get("/api/Certificate")]
pub async fn list_certificates(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let certificates = state
        .certificate_service
        .list_for_user(auth.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(certificates))
}

#[post("/api/Certificate")]
pub async fn issue_certificate(
    state: web::Data<AppState>,
    request: web::Json<IssueCertificateRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .certificate_service
        .issue(auth.user_id(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
