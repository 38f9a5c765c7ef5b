use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
   db,
   dto::{HangoutDetails, HangoutRequestDetails, NewHangoutRequestDto, RespondDto},
   errors::ApiError,
   models::{Hangout, HangoutGuest, HangoutRequest, HangoutRequestRecipient, JoinRequest, RequestStatus, Window},
   service::window,
   PGPool,
};

/// Per-row state machine shared by invite recipients and join requests:
/// Pending is the only state that may be responded to, and the answer is
/// terminal. A second response is rejected instead of silently re-applied,
/// so acceptance side effects (guest rows, windows) can never double up.
pub fn respond_transition(current: RequestStatus, accept: bool) -> Result<RequestStatus, ApiError> {
   match current {
      RequestStatus::Pending => {
         if accept {
            Ok(RequestStatus::Accepted)
         } else {
            Ok(RequestStatus::Rejected)
         }
      }
      RequestStatus::Accepted | RequestStatus::Rejected => Err(ApiError::Conflict(
         "this request has already been responded to".to_string(),
      )),
   }
}

/// Overall request status derived from its recipient rows: one acceptance
/// confirms the hangout; the request only becomes Rejected once every
/// recipient has declined.
pub fn rollup_status(pending: i64, accepted: i64) -> RequestStatus {
   if accepted > 0 {
      RequestStatus::Accepted
   } else if pending > 0 {
      RequestStatus::Pending
   } else {
      RequestStatus::Rejected
   }
}

pub async fn send_request(
   sender_id: Uuid,
   dto: NewHangoutRequestDto,
   now: DateTime<Utc>,
   pool: &PGPool,
) -> Result<HangoutRequestDetails, ApiError> {
   window::validate_interval(dto.proposed_start, dto.proposed_end)?;
   if dto.title.trim().is_empty() {
      return Err(ApiError::Validation("title must not be empty".to_string()));
   }
   let mut recipient_ids = dto.recipient_ids;
   recipient_ids.sort();
   recipient_ids.dedup();
   recipient_ids.retain(|id| *id != sender_id);
   if recipient_ids.is_empty() {
      return Err(ApiError::Validation(
         "a hangout request needs at least one recipient".to_string(),
      ));
   }
   for id in &recipient_ids {
      if !db::user::exists_by_id(*id, pool).await? {
         return Err(ApiError::Validation(format!("unknown recipient {}", id)));
      }
   }

   let hangout = Hangout {
      id: Uuid::new_v4(),
      title: dto.title.clone(),
      descr: dto.descr.clone(),
      confirmed_start: dto.proposed_start,
      confirmed_end: dto.proposed_end,
      active: false,
   };
   let request = HangoutRequest {
      id: Uuid::new_v4(),
      hangout_id: hangout.id,
      sender_id,
      title: dto.title,
      descr: dto.descr,
      proposed_start: dto.proposed_start,
      proposed_end: dto.proposed_end,
      is_open: dto.is_open,
      status: RequestStatus::Pending,
      created_at: now,
   };

   let mut tx = pool.begin().await?;
   db::hangout::insert(&mut tx, &hangout).await?;
   db::hangout::insert_request(&mut tx, &request).await?;
   // the sender hosts: a guest from the start
   db::hangout::insert_guest(
      &mut tx,
      &HangoutGuest {
         id: Uuid::new_v4(),
         hangout_id: hangout.id,
         user_id: sender_id,
      },
   )
   .await?;
   let mut recipients = Vec::with_capacity(recipient_ids.len());
   for user_id in recipient_ids {
      let recipient = HangoutRequestRecipient {
         id: Uuid::new_v4(),
         request_id: request.id,
         user_id,
         status: RequestStatus::Pending,
         invited_at: now,
      };
      db::hangout::insert_recipient(&mut tx, &recipient).await?;
      recipients.push(recipient);
   }
   tx.commit().await?;
   Ok(HangoutRequestDetails { request, recipients })
}

/// Accept or reject an invite. Acceptance converts the recipient into a
/// durable guest of the hangout and optionally reserves a window at the
/// confirmed interval; a conflicting window fails the whole response.
pub async fn respond(
   recipient_row_id: Uuid,
   caller_id: Uuid,
   dto: RespondDto,
   pool: &PGPool,
) -> Result<(), ApiError> {
   let recipient = db::hangout::get_recipient(recipient_row_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("invite does not exist".to_string()),
         other => other.into(),
      })?;
   if recipient.user_id != caller_id {
      return Err(ApiError::Forbidden(
         "only the invited user may respond to this invite".to_string(),
      ));
   }
   let request = db::hangout::get_request(recipient.request_id, pool).await?;

   let mut tx = pool.begin().await?;
   // re-read under a row lock: of two concurrent responses only the first
   // may see Pending
   let recipient = db::hangout::get_recipient_for_update(&mut tx, recipient.id).await?;
   let next = respond_transition(recipient.status, dto.accept)?;
   if dto.accept && dto.create_window {
      // hold the caller's window lock for the whole response so the overlap
      // check and the insert are one atomic step
      db::window::lock_participant(&mut tx, caller_id).await?;
      let existing = db::window::participant_windows(caller_id, &mut *tx).await?;
      if let Some(other) = window::conflicting_window(
         &existing,
         request.proposed_start,
         request.proposed_end,
         None,
      ) {
         return Err(ApiError::Conflict(format!(
            "the confirmed time overlaps with another window where you are a participant ({} to {})",
            other.start_at, other.end_at
         )));
      }
   }
   db::hangout::set_recipient_status(&mut tx, recipient.id, next).await?;
   if dto.accept {
      db::hangout::insert_guest(
         &mut tx,
         &HangoutGuest {
            id: Uuid::new_v4(),
            hangout_id: request.hangout_id,
            user_id: caller_id,
         },
      )
      .await?;
      db::hangout::set_active(&mut tx, request.hangout_id, true).await?;
      db::hangout::set_request_status(&mut tx, request.id, RequestStatus::Accepted).await?;
      if dto.create_window {
         let reserved = Window {
            id: Uuid::new_v4(),
            user_id: caller_id,
            start_at: request.proposed_start,
            end_at: request.proposed_end,
            preferred_activity: request.title.clone(),
            days_of_notice_needed: 0,
            active: true,
            hangout_id: Some(request.hangout_id),
         };
         db::window::insert_with_links(&mut tx, &reserved, &[caller_id], &[]).await?;
      }
   } else {
      let (pending, accepted, _) = db::hangout::recipient_status_counts(&mut tx, request.id).await?;
      db::hangout::set_request_status(&mut tx, request.id, rollup_status(pending, accepted)).await?;
   }
   tx.commit().await?;
   Ok(())
}

/// A non-invited user asks to join. Only hangouts spawned from an open
/// request accept join requests.
pub async fn send_join_request(
   hangout_id: Uuid,
   caller_id: Uuid,
   now: DateTime<Utc>,
   pool: &PGPool,
) -> Result<JoinRequest, ApiError> {
   let hangout = db::hangout::get_by_id(hangout_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("hangout does not exist".to_string()),
         other => other.into(),
      })?;
   if !db::hangout::is_open(hangout.id, pool).await? {
      return Err(ApiError::Forbidden(
         "this hangout does not accept join requests".to_string(),
      ));
   }
   if db::hangout::is_guest(hangout.id, caller_id, pool).await? {
      return Err(ApiError::Conflict(
         "you are already a guest of this hangout".to_string(),
      ));
   }
   if db::hangout::pending_join_exists(hangout.id, caller_id, pool).await? {
      return Err(ApiError::Conflict(
         "you already have a pending join request for this hangout".to_string(),
      ));
   }
   let request = JoinRequest {
      id: Uuid::new_v4(),
      hangout_id: hangout.id,
      user_id: caller_id,
      status: RequestStatus::Pending,
      created_at: now,
   };
   db::hangout::insert_join_request(&request, pool).await?;
   Ok(request)
}

/// Any existing guest may answer a join request. Acceptance adds the joiner
/// as a guest and optionally reserves a window for them.
pub async fn respond_to_join_request(
   join_request_id: Uuid,
   caller_id: Uuid,
   dto: RespondDto,
   pool: &PGPool,
) -> Result<(), ApiError> {
   let join = db::hangout::get_join_request(join_request_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("join request does not exist".to_string()),
         other => other.into(),
      })?;
   if !db::hangout::is_guest(join.hangout_id, caller_id, pool).await? {
      return Err(ApiError::Forbidden(
         "only a guest of the hangout may respond to join requests".to_string(),
      ));
   }
   let hangout = db::hangout::get_by_id(join.hangout_id, pool).await?;

   let mut tx = pool.begin().await?;
   let join = db::hangout::get_join_request_for_update(&mut tx, join.id).await?;
   let next = respond_transition(join.status, dto.accept)?;
   if dto.accept && dto.create_window {
      db::window::lock_participant(&mut tx, join.user_id).await?;
      let existing = db::window::participant_windows(join.user_id, &mut *tx).await?;
      if let Some(other) = window::conflicting_window(
         &existing,
         hangout.confirmed_start,
         hangout.confirmed_end,
         None,
      ) {
         return Err(ApiError::Conflict(format!(
            "the confirmed time overlaps with a window where the joining user participates ({} to {})",
            other.start_at, other.end_at
         )));
      }
   }
   db::hangout::set_join_status(&mut tx, join.id, next).await?;
   if dto.accept {
      db::hangout::insert_guest(
         &mut tx,
         &HangoutGuest {
            id: Uuid::new_v4(),
            hangout_id: join.hangout_id,
            user_id: join.user_id,
         },
      )
      .await?;
      if dto.create_window {
         let reserved = Window {
            id: Uuid::new_v4(),
            user_id: join.user_id,
            start_at: hangout.confirmed_start,
            end_at: hangout.confirmed_end,
            preferred_activity: hangout.title.clone(),
            days_of_notice_needed: 0,
            active: true,
            hangout_id: Some(join.hangout_id),
         };
         db::window::insert_with_links(&mut tx, &reserved, &[join.user_id], &[]).await?;
      }
   }
   tx.commit().await?;
   Ok(())
}

pub async fn my_requests(
   caller_id: Uuid,
   pool: &PGPool,
) -> Result<(Vec<HangoutRequestDetails>, Vec<HangoutRequestDetails>), ApiError> {
   let mut sent = Vec::new();
   for request in db::hangout::requests_sent_by(caller_id, pool).await? {
      let recipients = db::hangout::get_recipients(request.id, pool).await?;
      sent.push(HangoutRequestDetails { request, recipients });
   }
   let mut received = Vec::new();
   for request in db::hangout::requests_received_by(caller_id, pool).await? {
      let recipients = db::hangout::get_recipients(request.id, pool).await?;
      received.push(HangoutRequestDetails { request, recipients });
   }
   Ok((sent, received))
}

pub async fn details(hangout_id: Uuid, caller_id: Uuid, pool: &PGPool) -> Result<HangoutDetails, ApiError> {
   let hangout = db::hangout::get_by_id(hangout_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("hangout does not exist".to_string()),
         other => other.into(),
      })?;
   if !db::hangout::is_guest(hangout.id, caller_id, pool).await? {
      return Err(ApiError::Forbidden(
         "only guests may view this hangout".to_string(),
      ));
   }
   let guests = db::hangout::get_guests(hangout.id, pool).await?;
   Ok(HangoutDetails { hangout, guests })
}

pub async fn delete_my_pending_requests(caller_id: Uuid, pool: &PGPool) -> Result<u64, ApiError> {
   let removed = db::hangout::delete_pending_for(caller_id, pool).await?;
   Ok(removed)
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn pending_accepts_and_rejects() {
      assert_eq!(
         respond_transition(RequestStatus::Pending, true).unwrap(),
         RequestStatus::Accepted
      );
      assert_eq!(
         respond_transition(RequestStatus::Pending, false).unwrap(),
         RequestStatus::Rejected
      );
   }

   #[test]
   fn decided_rows_cannot_be_responded_to_again() {
      assert!(respond_transition(RequestStatus::Accepted, true).is_err());
      assert!(respond_transition(RequestStatus::Accepted, false).is_err());
      assert!(respond_transition(RequestStatus::Rejected, true).is_err());
      assert!(respond_transition(RequestStatus::Rejected, false).is_err());
   }

   #[test]
   fn one_acceptance_confirms_the_request() {
      assert_eq!(rollup_status(3, 1), RequestStatus::Accepted);
      assert_eq!(rollup_status(0, 2), RequestStatus::Accepted);
   }

   #[test]
   fn request_stays_pending_while_anyone_may_still_accept() {
      assert_eq!(rollup_status(2, 0), RequestStatus::Pending);
   }

   #[test]
   fn request_is_rejected_only_when_everyone_declined() {
      assert_eq!(rollup_status(0, 0), RequestStatus::Rejected);
   }
}
