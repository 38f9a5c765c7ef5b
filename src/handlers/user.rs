use actix_web::{get, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::{dto::ProfilePictureDto, errors::ApiError, handlers, service, PGPool};

#[get("/me")]
pub async fn me(req: HttpRequest, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let auth = handlers::caller(&req)?;
    let user = service::user::get_by_id(auth.user_id, conn).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/me/notifications")]
pub async fn notifications(
    req: HttpRequest,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let auth = handlers::caller(&req)?;
    let counts = service::user::notification_counts(auth.user_id, conn).await?;
    Ok(HttpResponse::Ok().json(counts))
}

#[put("/me/picture")]
pub async fn set_picture(
    req: HttpRequest,
    dto: web::Json<ProfilePictureDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let auth = handlers::caller(&req)?;
    service::user::set_profile_picture(auth.user_id, dto.into_inner(), conn).await?;
    Ok(HttpResponse::Ok().json("profile picture updated"))
}

#[get("/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let user = service::user::get_by_id(id.into_inner(), conn).await?;
    log::debug!("profile lookup: {}", user.full_name());
    Ok(HttpResponse::Ok().json(user))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(me)
        .service(notifications)
        .service(set_picture)
        .service(get_by_id);
}
