use uuid::Uuid;

use crate::{
    models::{Friendship, RequestStatus, Tagalong},
    PGPool,
};

pub async fn create(friendship: &Friendship, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO friendships (id, sender_id, recipient_id, status, created_at)
        VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(friendship.id)
    .bind(friendship.sender_id)
    .bind(friendship.recipient_id)
    .bind(friendship.status)
    .bind(friendship.created_at)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Friendship, sqlx::Error> {
    sqlx::query_as::<_, Friendship>("SELECT * FROM friendships WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// The edge between two users regardless of direction, if any.
pub async fn find_between(
    a: Uuid,
    b: Uuid,
    pool: &PGPool,
) -> Result<Option<Friendship>, sqlx::Error> {
    sqlx::query_as::<_, Friendship>(
        "SELECT * FROM friendships
        WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)",
    )
    .bind(a)
    .bind(b)
    .fetch_optional(pool)
    .await
}

pub async fn set_status(
    id: Uuid,
    status: RequestStatus,
    pool: &PGPool,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE friendships SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn pending_received(user_id: Uuid, pool: &PGPool) -> Result<Vec<Friendship>, sqlx::Error> {
    sqlx::query_as::<_, Friendship>(
        "SELECT * FROM friendships WHERE recipient_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Ids of everyone `user_id` has an accepted friendship with, either
/// direction.
pub async fn accepted_friend_ids(user_id: Uuid, pool: &PGPool) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END
        FROM friendships
        WHERE status = 'accepted' AND (sender_id = $1 OR recipient_id = $1)",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Accepted friends plus accepted tagalongs: the full contact set that may
/// ever see this user's windows.
pub async fn accepted_contact_ids(user_id: Uuid, pool: &PGPool) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END
        FROM friendships
        WHERE status = 'accepted' AND (sender_id = $1 OR recipient_id = $1)
        UNION
        SELECT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END
        FROM tagalongs
        WHERE status = 'accepted' AND (sender_id = $1 OR recipient_id = $1)",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn create_tagalong(tagalong: &Tagalong, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO tagalongs (id, sender_id, recipient_id, status, created_at)
        VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(tagalong.id)
    .bind(tagalong.sender_id)
    .bind(tagalong.recipient_id)
    .bind(tagalong.status)
    .bind(tagalong.created_at)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_tagalong_by_id(id: Uuid, pool: &PGPool) -> Result<Tagalong, sqlx::Error> {
    sqlx::query_as::<_, Tagalong>("SELECT * FROM tagalongs WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_tagalong_between(
    a: Uuid,
    b: Uuid,
    pool: &PGPool,
) -> Result<Option<Tagalong>, sqlx::Error> {
    sqlx::query_as::<_, Tagalong>(
        "SELECT * FROM tagalongs
        WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)",
    )
    .bind(a)
    .bind(b)
    .fetch_optional(pool)
    .await
}

pub async fn set_tagalong_status(
    id: Uuid,
    status: RequestStatus,
    pool: &PGPool,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE tagalongs SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
