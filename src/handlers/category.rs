use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::{
   dto::{CategoryMemberDto, NewCategoryDto},
   errors::ApiError,
   handlers, service, PGPool,
};

#[post("")]
pub async fn create(
   req: HttpRequest,
   dto: web::Json<NewCategoryDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let category = service::friendship::create_category(auth.user_id, dto.into_inner(), conn).await?;
   Ok(HttpResponse::Created().json(category))
}

#[get("")]
pub async fn list(req: HttpRequest, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let categories = service::friendship::list_categories(auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(categories))
}

#[delete("/{id}")]
pub async fn remove(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   service::friendship::delete_category(id.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json("category deleted"))
}

#[post("/{id}/members")]
pub async fn add_member(
   req: HttpRequest,
   id: web::Path<Uuid>,
   dto: web::Json<CategoryMemberDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let member =
      service::friendship::add_category_member(id.into_inner(), dto.user_id, auth.user_id, conn)
         .await?;
   Ok(HttpResponse::Created().json(member))
}

#[get("/{id}/members")]
pub async fn list_members(
   req: HttpRequest,
   id: web::Path<Uuid>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let members =
      service::friendship::list_category_members(id.into_inner(), auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json(members))
}

#[delete("/{id}/members/{user_id}")]
pub async fn remove_member(
   req: HttpRequest,
   path: web::Path<(Uuid, Uuid)>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let (category_id, user_id) = path.into_inner();
   service::friendship::remove_category_member(category_id, user_id, auth.user_id, conn).await?;
   Ok(HttpResponse::Ok().json("member removed"))
}

pub fn config(cfg: &mut web::ServiceConfig) {
   cfg.service(create)
      .service(list)
      .service(remove)
      .service(add_member)
      .service(list_members)
      .service(remove_member);
}
