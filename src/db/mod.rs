pub mod user;
pub mod friendship;
pub mod category;
pub mod window;
pub mod preset;
pub mod hangout;

use crate::PGPool;
use log::info;
use sqlx::postgres::PgPoolOptions;

pub async fn init_db_pool(db_url: &str) -> PGPool {
    let pool: PGPool = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to connect to postgres: {:?}", e);
        });
    info!("Connected to postgresql");
    pool
}
