use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::{
   dto::{NewContactRequestDto, RespondContactDto},
   errors::ApiError,
   handlers, service, PGPool,
};

#[post("/requests")]
pub async fn send_request(
   req: HttpRequest,
   dto: web::Json<NewContactRequestDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let friendship =
      service::friendship::send_friend_request(auth.user_id, dto.recipient_id, Utc::now(), conn)
         .await?;
   Ok(HttpResponse::Created().json(friendship))
}

#[post("/requests/{id}/respond")]
pub async fn respond(
   req: HttpRequest,
   id: web::Path<Uuid>,
   dto: web::Json<RespondContactDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::friendship::respond_to_friend_request(id.into_inner(), auth.user_id, dto.accept, conn)
      .await?;
   Ok(HttpResponse::Ok().json("response recorded"))
}

#[get("/requests/pending")]
pub async fn pending(req: HttpRequest, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let requests = service::friendship::pending_friend_requests(auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(requests))
}

#[get("")]
pub async fn list(req: HttpRequest, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let friends = service::friendship::list_friends(auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(friends))
}

#[post("/block/{user_id}")]
pub async fn block(
   req: HttpRequest,
   user_id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::friendship::block(auth.user_id, user_id.into_inner(), Utc::now(), conn).await?;
   Ok(HttpResponse::Ok().json("user blocked"))
}

#[post("/tagalongs")]
pub async fn send_tagalong(
   req: HttpRequest,
   dto: web::Json<NewContactRequestDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let tagalong =
      service::friendship::send_tagalong_request(auth.user_id, dto.recipient_id, Utc::now(), conn)
         .await?;
   Ok(HttpResponse::Created().json(tagalong))
}

#[post("/tagalongs/{id}/respond")]
pub async fn respond_tagalong(
   req: HttpRequest,
   id: web::Path<Uuid>,
   dto: web::Json<RespondContactDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::friendship::respond_to_tagalong_request(id.into_inner(), auth.user_id, dto.accept, conn)
      .await?;
   Ok(HttpResponse::Ok().json("response recorded"))
}

pub fn config(cfg: &mut web::ServiceConfig) {
   cfg.service(send_request)
      .service(respond)
      .service(pending)
      .service(block)
      .service(send_tagalong)
      .service(respond_tagalong)
      .service(list);
}
