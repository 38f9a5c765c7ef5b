use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    models::{Window, WindowParticipant, WindowVisibility},
    PGPool,
};

/// Serializes window creation per user: both halves of a concurrent
/// double-booking race block on the same advisory lock until one commits,
/// so the second overlap check sees the first insert.
pub async fn lock_participant(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(lock_key(user_id))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn lock_key(user_id: Uuid) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&user_id.as_bytes()[..8]);
    i64::from_le_bytes(bytes)
}

/// Every active window in which `user_id` appears as a participant (the
/// owner always has a participant row).
pub async fn participant_windows<'e, E>(user_id: Uuid, executor: E) -> Result<Vec<Window>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Window>(
        "SELECT w.* FROM windows w
        JOIN window_participants p ON p.window_id = w.id
        WHERE p.user_id = $1 AND w.active = TRUE",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn insert_with_links(
    tx: &mut Transaction<'_, Postgres>,
    window: &Window,
    participant_ids: &[Uuid],
    visibility_category_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO windows
        (id, user_id, start_at, end_at, preferred_activity, days_of_notice_needed, active, hangout_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(window.id)
    .bind(window.user_id)
    .bind(window.start_at)
    .bind(window.end_at)
    .bind(&window.preferred_activity)
    .bind(window.days_of_notice_needed)
    .bind(window.active)
    .bind(window.hangout_id)
    .execute(&mut **tx)
    .await?;
    for user_id in participant_ids {
        sqlx::query(
            "INSERT INTO window_participants (id, window_id, user_id) VALUES ($1, $2, $3)
            ON CONFLICT (window_id, user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(window.id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    }
    for category_id in visibility_category_ids {
        sqlx::query(
            "INSERT INTO window_visibilities (id, window_id, category_id) VALUES ($1, $2, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(window.id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn get_participants(
    window_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<WindowParticipant>, sqlx::Error> {
    sqlx::query_as::<_, WindowParticipant>(
        "SELECT * FROM window_participants WHERE window_id = $1",
    )
    .bind(window_id)
    .fetch_all(pool)
    .await
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Window, sqlx::Error> {
    sqlx::query_as::<_, Window>("SELECT * FROM windows WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM windows WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Lazy garbage collection: drops the caller's own windows that have fully
/// elapsed. Link rows cascade.
pub async fn delete_expired(
    owner_id: Uuid,
    now: DateTime<Utc>,
    pool: &PGPool,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM windows WHERE user_id = $1 AND end_at < $2")
        .bind(owner_id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Windows where `user_id` participates, overlapping `[from, to)`.
pub async fn list_range(
    user_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    pool: &PGPool,
) -> Result<Vec<Window>, sqlx::Error> {
    sqlx::query_as::<_, Window>(
        "SELECT w.* FROM windows w
        JOIN window_participants p ON p.window_id = w.id
        WHERE p.user_id = $1 AND w.start_at < $3 AND w.end_at > $2
        ORDER BY w.start_at",
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Other users' active windows overlapping `[from, to)` — the raw candidate
/// set for the hive view, before the visibility filter runs.
pub async fn hive_candidates(
    viewer_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    pool: &PGPool,
) -> Result<Vec<Window>, sqlx::Error> {
    sqlx::query_as::<_, Window>(
        "SELECT * FROM windows
        WHERE user_id != $1 AND active = TRUE AND start_at < $3 AND end_at > $2
        ORDER BY start_at",
    )
    .bind(viewer_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

pub async fn visibilities_for(
    window_ids: &[Uuid],
    pool: &PGPool,
) -> Result<Vec<WindowVisibility>, sqlx::Error> {
    sqlx::query_as::<_, WindowVisibility>(
        "SELECT * FROM window_visibilities WHERE window_id = ANY($1)",
    )
    .bind(window_ids)
    .fetch_all(pool)
    .await
}
