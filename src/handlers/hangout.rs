use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::{
   dto::{NewHangoutRequestDto, RespondDto},
   errors::ApiError,
   handlers, service, PGPool,
};

#[post("/requests")]
pub async fn send_request(
   req: HttpRequest,
   dto: web::Json<NewHangoutRequestDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let details =
      service::hangout::send_request(auth.user_id, dto.into_inner(), Utc::now(), conn).await?;
   Ok(HttpResponse::Created().json(details))
}

#[get("/requests")]
pub async fn my_requests(req: HttpRequest, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let (sent, received) = service::hangout::my_requests(auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(serde_json::json!({
      "sent": sent,
      "received": received,
   })))
}

#[post("/requests/recipients/{id}/respond")]
pub async fn respond(
   req: HttpRequest,
   id: web::Path<Uuid>,
   dto: web::Json<RespondDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::hangout::respond(id.into_inner(), auth.user_id, dto.into_inner(), conn).await?;
   Ok(HttpResponse::Ok().json("response recorded"))
}

#[delete("/requests/pending")]
pub async fn delete_pending(
   req: HttpRequest,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let removed = service::hangout::delete_my_pending_requests(auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(removed))
}

#[post("/{id}/join")]
pub async fn join(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let join_request =
      service::hangout::send_join_request(id.into_inner(), auth.user_id, Utc::now(), conn).await?;
   Ok(HttpResponse::Created().json(join_request))
}

#[post("/join-requests/{id}/respond")]
pub async fn respond_join(
   req: HttpRequest,
   id: web::Path<Uuid>,
   dto: web::Json<RespondDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::hangout::respond_to_join_request(id.into_inner(), auth.user_id, dto.into_inner(), conn)
      .await?;
   Ok(HttpResponse::Ok().json("response recorded"))
}

#[get("/{id}")]
pub async fn get_by_id(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let details = service::hangout::details(id.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(details))
}

pub fn config(cfg: &mut web::ServiceConfig) {
   cfg.service(send_request)
      .service(my_requests)
      .service(respond)
      .service(delete_pending)
      .service(respond_join)
      .service(join)
      .service(get_by_id);
}
