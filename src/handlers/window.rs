use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::{
   dto::{NewWindowDto, WindowRangeQuery},
   errors::ApiError,
   handlers, service, PGPool,
};

#[post("")]
pub async fn create(
   req: HttpRequest,
   dto: web::Json<NewWindowDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let window = service::window::create(auth.user_id, dto.into_inner(), conn).await?;
   Ok(HttpResponse::Created().json(window))
}

#[get("")]
pub async fn list(
   req: HttpRequest,
   query: web::Query<WindowRangeQuery>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let windows =
      service::window::list(auth.user_id, query.from, query.to, Utc::now(), conn).await?;
   Ok(HttpResponse::Ok().json(windows))
}

#[get("/{id}")]
pub async fn get_by_id(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let details = service::window::details(id.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(details))
}

#[delete("/{id}")]
pub async fn remove(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::window::delete(id.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json("window deleted"))
}

pub fn config(cfg: &mut web::ServiceConfig) {
   cfg.service(create).service(list).service(get_by_id).service(remove);
}
