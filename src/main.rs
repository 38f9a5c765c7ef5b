pub mod db;
pub mod handlers;
pub mod service;
pub mod models;
pub mod dto;
pub mod errors;

use actix_web::{web, App, HttpServer};
use db::init_db_pool;
use dotenv::dotenv;
use service::auth::AuthMiddleware;
use sqlx::{postgres::Postgres, Pool};
use std::env;

type PGPool = Pool<Postgres>;

/// Bearer token lifetime, seconds.
const ACCESS_TOKEN_EXP: usize = 24 * 60 * 60;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    service::log::init_logger();
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|e| {
        panic!("Failed to get env with name 'DATABASE_URL': {:?}", e);
    });
    let pool: PGPool = init_db_pool(&db_url).await;
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(service::log::LoggerMiddleware)
            .service(web::scope("/auth").configure(handlers::auth::config))
            .service(
                web::scope("/users")
                    .wrap(AuthMiddleware)
                    .configure(handlers::user::config),
            )
            .service(
                web::scope("/friends")
                    .wrap(AuthMiddleware)
                    .configure(handlers::friendship::config),
            )
            .service(
                web::scope("/categories")
                    .wrap(AuthMiddleware)
                    .configure(handlers::category::config),
            )
            .service(
                web::scope("/windows")
                    .wrap(AuthMiddleware)
                    .configure(handlers::window::config),
            )
            .service(
                web::scope("/presets")
                    .wrap(AuthMiddleware)
                    .configure(handlers::preset::config),
            )
            .service(
                web::scope("/hangouts")
                    .wrap(AuthMiddleware)
                    .configure(handlers::hangout::config),
            )
            .service(
                web::scope("/hive")
                    .wrap(AuthMiddleware)
                    .configure(handlers::hive::config),
            )
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
