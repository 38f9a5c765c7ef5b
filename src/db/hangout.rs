use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    models::{Hangout, HangoutGuest, HangoutRequest, HangoutRequestRecipient, JoinRequest, RequestStatus},
    PGPool,
};

pub async fn insert(tx: &mut Transaction<'_, Postgres>, hangout: &Hangout) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO hangouts (id, title, descr, confirmed_start, confirmed_end, active)
        VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(hangout.id)
    .bind(&hangout.title)
    .bind(&hangout.descr)
    .bind(hangout.confirmed_start)
    .bind(hangout.confirmed_end)
    .bind(hangout.active)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Hangout, sqlx::Error> {
    sqlx::query_as::<_, Hangout>("SELECT * FROM hangouts WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn set_active(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    active: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE hangouts SET active = $1 WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn insert_guest(
    tx: &mut Transaction<'_, Postgres>,
    guest: &HangoutGuest,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO hangout_guests (id, hangout_id, user_id) VALUES ($1, $2, $3)
        ON CONFLICT (hangout_id, user_id) DO NOTHING",
    )
    .bind(guest.id)
    .bind(guest.hangout_id)
    .bind(guest.user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn is_guest(hangout_id: Uuid, user_id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM hangout_guests WHERE hangout_id = $1 AND user_id = $2",
    )
    .bind(hangout_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}

pub async fn get_guests(hangout_id: Uuid, pool: &PGPool) -> Result<Vec<HangoutGuest>, sqlx::Error> {
    sqlx::query_as::<_, HangoutGuest>("SELECT * FROM hangout_guests WHERE hangout_id = $1")
        .bind(hangout_id)
        .fetch_all(pool)
        .await
}

/// A hangout accepts join requests if any of its spawning requests was
/// marked open.
pub async fn is_open(hangout_id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM hangout_requests WHERE hangout_id = $1 AND is_open = TRUE",
    )
    .bind(hangout_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}

pub async fn insert_request(
    tx: &mut Transaction<'_, Postgres>,
    request: &HangoutRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO hangout_requests
        (id, hangout_id, sender_id, title, descr, proposed_start, proposed_end, is_open, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(request.id)
    .bind(request.hangout_id)
    .bind(request.sender_id)
    .bind(&request.title)
    .bind(&request.descr)
    .bind(request.proposed_start)
    .bind(request.proposed_end)
    .bind(request.is_open)
    .bind(request.status)
    .bind(request.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get_request(id: Uuid, pool: &PGPool) -> Result<HangoutRequest, sqlx::Error> {
    sqlx::query_as::<_, HangoutRequest>("SELECT * FROM hangout_requests WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn set_request_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: RequestStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE hangout_requests SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn requests_sent_by(
    sender_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<HangoutRequest>, sqlx::Error> {
    sqlx::query_as::<_, HangoutRequest>(
        "SELECT * FROM hangout_requests WHERE sender_id = $1 ORDER BY created_at DESC",
    )
    .bind(sender_id)
    .fetch_all(pool)
    .await
}

pub async fn requests_received_by(
    user_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<HangoutRequest>, sqlx::Error> {
    sqlx::query_as::<_, HangoutRequest>(
        "SELECT r.* FROM hangout_requests r
        JOIN hangout_request_recipients rec ON rec.request_id = r.id
        WHERE rec.user_id = $1
        ORDER BY r.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Scoped bulk delete: only the caller's own still-pending sent requests and
/// received invite rows, never a table-wide wipe.
pub async fn delete_pending_for(user_id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let sent = sqlx::query(
        "DELETE FROM hangout_requests WHERE sender_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    let received = sqlx::query(
        "DELETE FROM hangout_request_recipients WHERE user_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(sent.rows_affected() + received.rows_affected())
}

pub async fn insert_recipient(
    tx: &mut Transaction<'_, Postgres>,
    recipient: &HangoutRequestRecipient,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO hangout_request_recipients (id, request_id, user_id, status, invited_at)
        VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(recipient.id)
    .bind(recipient.request_id)
    .bind(recipient.user_id)
    .bind(recipient.status)
    .bind(recipient.invited_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get_recipient(id: Uuid, pool: &PGPool) -> Result<HangoutRequestRecipient, sqlx::Error> {
    sqlx::query_as::<_, HangoutRequestRecipient>(
        "SELECT * FROM hangout_request_recipients WHERE id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Locks the recipient row for the rest of the transaction, so concurrent
/// responses serialize on it.
pub async fn get_recipient_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<HangoutRequestRecipient, sqlx::Error> {
    sqlx::query_as::<_, HangoutRequestRecipient>(
        "SELECT * FROM hangout_request_recipients WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn get_recipients(
    request_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<HangoutRequestRecipient>, sqlx::Error> {
    sqlx::query_as::<_, HangoutRequestRecipient>(
        "SELECT * FROM hangout_request_recipients WHERE request_id = $1 ORDER BY invited_at",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await
}

pub async fn set_recipient_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: RequestStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE hangout_request_recipients SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// (pending, accepted, rejected) counts for a request's recipient rows.
pub async fn recipient_status_counts(
    tx: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
) -> Result<(i64, i64, i64), sqlx::Error> {
    let row: (i64, i64, i64) = sqlx::query_as(
        "SELECT
            COUNT(*) FILTER (WHERE status = 'pending'),
            COUNT(*) FILTER (WHERE status = 'accepted'),
            COUNT(*) FILTER (WHERE status = 'rejected')
        FROM hangout_request_recipients WHERE request_id = $1",
    )
    .bind(request_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

pub async fn insert_join_request(request: &JoinRequest, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO join_requests (id, hangout_id, user_id, status, created_at)
        VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(request.id)
    .bind(request.hangout_id)
    .bind(request.user_id)
    .bind(request.status)
    .bind(request.created_at)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_join_request(id: Uuid, pool: &PGPool) -> Result<JoinRequest, sqlx::Error> {
    sqlx::query_as::<_, JoinRequest>("SELECT * FROM join_requests WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_join_request_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<JoinRequest, sqlx::Error> {
    sqlx::query_as::<_, JoinRequest>("SELECT * FROM join_requests WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_one(&mut **tx)
        .await
}

pub async fn pending_join_exists(
    hangout_id: Uuid,
    user_id: Uuid,
    pool: &PGPool,
) -> Result<bool, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM join_requests
        WHERE hangout_id = $1 AND user_id = $2 AND status = 'pending'",
    )
    .bind(hangout_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}

pub async fn set_join_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: RequestStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE join_requests SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
