use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::{dto::HiveQuery, errors::ApiError, handlers, service, PGPool};

/// The cross-user availability view: every other user's window the caller
/// is allowed to see within the queried range.
#[get("")]
pub async fn list(
   req: HttpRequest,
   query: web::Query<HiveQuery>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let conn: &PGPool = pool_state.get_ref();
   let auth = handlers::caller(&req)?;
   let windows = service::hive::list(auth.user_id, query.into_inner(), Utc::now(), conn).await?;
   Ok(HttpResponse::Ok().json(windows))
}

pub fn config(cfg: &mut web::ServiceConfig) {
   cfg.service(list);
}
