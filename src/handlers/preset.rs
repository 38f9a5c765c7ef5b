use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::{
   dto::{ApplyPresetDto, NewPresetDto},
   errors::ApiError,
   handlers, service, PGPool,
};

#[post("")]
pub async fn create(
   req: HttpRequest,
   dto: web::Json<NewPresetDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let preset = service::preset::create(auth.user_id, dto.into_inner(), conn).await?;
   Ok(HttpResponse::Created().json(preset))
}

#[get("")]
pub async fn list(req: HttpRequest, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let presets = service::preset::list(auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(presets))
}

#[delete("/{id}")]
pub async fn remove(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::preset::delete(id.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json("preset deleted"))
}

/// Projects the preset onto a calendar date, creating a concrete window.
#[post("/{id}/apply")]
pub async fn apply(
   req: HttpRequest,
   id: web::Path<Uuid>,
   dto: web::Json<ApplyPresetDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let window = service::preset::apply(id.into_inner(), dto.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Created().json(window))
}

pub fn config(cfg: &mut web::ServiceConfig) {
   cfg.service(create).service(list).service(remove).service(apply);
}
