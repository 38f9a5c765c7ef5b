use sqlx::postgres::PgQueryResult;
use uuid::Uuid;

use crate::{models::User, PGPool};

pub async fn create(user: &User, pool: &PGPool) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, pwd_hash, email, first_name, last_name, profile_picture)
        VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.pwd_hash)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.profile_picture)
    .execute(pool)
    .await
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_by_username(username: &str, pool: &PGPool) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_one(pool)
        .await
}

pub async fn get_by_ids(ids: &[Uuid], pool: &PGPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1) ORDER BY username")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn exists_by_username(username: &str, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(count.0 > 0)
}

pub async fn exists_by_id(id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count.0 > 0)
}

pub async fn set_profile_picture(
    id: Uuid,
    url: &str,
    pool: &PGPool,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE users SET profile_picture = $1 WHERE id = $2")
        .bind(url)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Pending rows addressed to `user_id`, one count per source table.
pub async fn pending_counts(
    user_id: Uuid,
    pool: &PGPool,
) -> Result<(i64, i64, i64, i64), sqlx::Error> {
    let friends: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM friendships WHERE recipient_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    let tagalongs: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM tagalongs WHERE recipient_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    let invites: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM hangout_request_recipients WHERE user_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    let joins: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM join_requests j WHERE j.status = 'pending'
        AND EXISTS (SELECT 1 FROM hangout_guests g WHERE g.hangout_id = j.hangout_id AND g.user_id = $1)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok((friends.0, tagalongs.0, invites.0, joins.0))
}
