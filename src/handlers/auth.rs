use actix_web::{post, web, HttpResponse};
use log::info;

use crate::{dto::{LoginUserRequest, NewUserDto}, errors::ApiError, service, PGPool};

#[post("/register")]
pub async fn register(
    dto: web::Json<NewUserDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let user = service::user::create(dto.into_inner(), conn).await?;
    info!("registered user {}", user.username);
    Ok(HttpResponse::Created().json(user))
}

#[post("/login")]
pub async fn login(
    dto: web::Json<LoginUserRequest>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let token = service::auth::jwt::login(conn, dto.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login);
}
