use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    models::{Preset, PresetParticipant, PresetVisibility},
    PGPool,
};

pub async fn insert_with_links(
    tx: &mut Transaction<'_, Postgres>,
    preset: &Preset,
    participant_ids: &[Uuid],
    visibility_category_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO presets
        (id, user_id, start_at, end_at, preferred_activity, days_of_notice_needed)
        VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(preset.id)
    .bind(preset.user_id)
    .bind(preset.start_at)
    .bind(preset.end_at)
    .bind(&preset.preferred_activity)
    .bind(preset.days_of_notice_needed)
    .execute(&mut **tx)
    .await?;
    for user_id in participant_ids {
        sqlx::query(
            "INSERT INTO preset_participants (id, preset_id, user_id) VALUES ($1, $2, $3)
            ON CONFLICT (preset_id, user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(preset.id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    }
    for category_id in visibility_category_ids {
        sqlx::query(
            "INSERT INTO preset_visibilities (id, preset_id, category_id) VALUES ($1, $2, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(preset.id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Preset, sqlx::Error> {
    sqlx::query_as::<_, Preset>("SELECT * FROM presets WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_by_owner(owner_id: Uuid, pool: &PGPool) -> Result<Vec<Preset>, sqlx::Error> {
    sqlx::query_as::<_, Preset>("SELECT * FROM presets WHERE user_id = $1 ORDER BY start_at")
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM presets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn get_participants(
    preset_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<PresetParticipant>, sqlx::Error> {
    sqlx::query_as::<_, PresetParticipant>(
        "SELECT * FROM preset_participants WHERE preset_id = $1",
    )
    .bind(preset_id)
    .fetch_all(pool)
    .await
}

pub async fn get_visibilities(
    preset_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<PresetVisibility>, sqlx::Error> {
    sqlx::query_as::<_, PresetVisibility>(
        "SELECT * FROM preset_visibilities WHERE preset_id = $1",
    )
    .bind(preset_id)
    .fetch_all(pool)
    .await
}
