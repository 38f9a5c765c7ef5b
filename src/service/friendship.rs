use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
   db,
   dto::NewCategoryDto,
   errors::ApiError,
   models::{CategoryMember, Friendship, FriendshipCategory, RequestStatus, Tagalong, User},
   PGPool,
};

pub async fn send_friend_request(
   sender_id: Uuid,
   recipient_id: Uuid,
   now: DateTime<Utc>,
   pool: &PGPool,
) -> Result<Friendship, ApiError> {
   if sender_id == recipient_id {
      return Err(ApiError::Validation(
         "cannot send a friend request to yourself".to_string(),
      ));
   }
   if !db::user::exists_by_id(recipient_id, pool).await? {
      return Err(ApiError::NotFound("recipient does not exist".to_string()));
   }
   if let Some(existing) = db::friendship::find_between(sender_id, recipient_id, pool).await? {
      let reason = match existing.status {
         RequestStatus::Pending => "a friend request between you is already pending",
         RequestStatus::Accepted => "you are already friends",
         RequestStatus::Rejected => "a previous request between you was declined",
      };
      return Err(ApiError::Conflict(reason.to_string()));
   }
   let friendship = Friendship {
      id: Uuid::new_v4(),
      sender_id,
      recipient_id,
      status: RequestStatus::Pending,
      created_at: now,
   };
   db::friendship::create(&friendship, pool).await?;
   Ok(friendship)
}

pub async fn respond_to_friend_request(
   friendship_id: Uuid,
   caller_id: Uuid,
   accept: bool,
   pool: &PGPool,
) -> Result<(), ApiError> {
   let friendship = db::friendship::get_by_id(friendship_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("friend request does not exist".to_string()),
         other => other.into(),
      })?;
   if friendship.recipient_id != caller_id {
      return Err(ApiError::Forbidden(
         "only the recipient may respond to a friend request".to_string(),
      ));
   }
   if friendship.status != RequestStatus::Pending {
      return Err(ApiError::Conflict(
         "this friend request has already been responded to".to_string(),
      ));
   }
   let status = if accept {
      RequestStatus::Accepted
   } else {
      RequestStatus::Rejected
   };
   db::friendship::set_status(friendship_id, status, pool).await?;
   Ok(())
}

/// Blocking forces the edge to Rejected, creating it if the two users never
/// interacted. A rejected edge blocks new requests in both directions.
pub async fn block(caller_id: Uuid, other_id: Uuid, now: DateTime<Utc>, pool: &PGPool) -> Result<(), ApiError> {
   if caller_id == other_id {
      return Err(ApiError::Validation("cannot block yourself".to_string()));
   }
   match db::friendship::find_between(caller_id, other_id, pool).await? {
      Some(existing) => {
         db::friendship::set_status(existing.id, RequestStatus::Rejected, pool).await?;
      }
      None => {
         let friendship = Friendship {
            id: Uuid::new_v4(),
            sender_id: caller_id,
            recipient_id: other_id,
            status: RequestStatus::Rejected,
            created_at: now,
         };
         db::friendship::create(&friendship, pool).await?;
      }
   }
   Ok(())
}

pub async fn list_friends(caller_id: Uuid, pool: &PGPool) -> Result<Vec<User>, ApiError> {
   let ids = db::friendship::accepted_friend_ids(caller_id, pool).await?;
   let users = db::user::get_by_ids(&ids, pool).await?;
   Ok(users)
}

pub async fn pending_friend_requests(caller_id: Uuid, pool: &PGPool) -> Result<Vec<Friendship>, ApiError> {
   let pending = db::friendship::pending_received(caller_id, pool).await?;
   Ok(pending)
}

pub async fn send_tagalong_request(
   sender_id: Uuid,
   recipient_id: Uuid,
   now: DateTime<Utc>,
   pool: &PGPool,
) -> Result<Tagalong, ApiError> {
   if sender_id == recipient_id {
      return Err(ApiError::Validation(
         "cannot send a tagalong request to yourself".to_string(),
      ));
   }
   if !db::user::exists_by_id(recipient_id, pool).await? {
      return Err(ApiError::NotFound("recipient does not exist".to_string()));
   }
   if db::friendship::find_tagalong_between(sender_id, recipient_id, pool)
      .await?
      .is_some()
   {
      return Err(ApiError::Conflict(
         "a tagalong relationship between you already exists".to_string(),
      ));
   }
   let tagalong = Tagalong {
      id: Uuid::new_v4(),
      sender_id,
      recipient_id,
      status: RequestStatus::Pending,
      created_at: now,
   };
   db::friendship::create_tagalong(&tagalong, pool).await?;
   Ok(tagalong)
}

pub async fn respond_to_tagalong_request(
   tagalong_id: Uuid,
   caller_id: Uuid,
   accept: bool,
   pool: &PGPool,
) -> Result<(), ApiError> {
   let tagalong = db::friendship::get_tagalong_by_id(tagalong_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => {
            ApiError::NotFound("tagalong request does not exist".to_string())
         }
         other => other.into(),
      })?;
   if tagalong.recipient_id != caller_id {
      return Err(ApiError::Forbidden(
         "only the recipient may respond to a tagalong request".to_string(),
      ));
   }
   if tagalong.status != RequestStatus::Pending {
      return Err(ApiError::Conflict(
         "this tagalong request has already been responded to".to_string(),
      ));
   }
   let status = if accept {
      RequestStatus::Accepted
   } else {
      RequestStatus::Rejected
   };
   db::friendship::set_tagalong_status(tagalong_id, status, pool).await?;
   Ok(())
}

pub async fn create_category(
   owner_id: Uuid,
   dto: NewCategoryDto,
   pool: &PGPool,
) -> Result<FriendshipCategory, ApiError> {
   if dto.name.trim().is_empty() {
      return Err(ApiError::Validation(
         "category name must not be empty".to_string(),
      ));
   }
   let category = FriendshipCategory {
      id: Uuid::new_v4(),
      owner_id,
      name: dto.name,
   };
   db::category::create(&category, pool).await?;
   Ok(category)
}

pub async fn list_categories(owner_id: Uuid, pool: &PGPool) -> Result<Vec<FriendshipCategory>, ApiError> {
   let categories = db::category::get_by_owner(owner_id, pool).await?;
   Ok(categories)
}

pub async fn delete_category(category_id: Uuid, caller_id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
   let category = fetch_owned_category(category_id, caller_id, pool).await?;
   db::category::delete(category.id, pool).await?;
   Ok(())
}

/// Category members must already be accepted friends of the owner; the
/// category only narrows visibility, it never grants it.
pub async fn add_category_member(
   category_id: Uuid,
   member_id: Uuid,
   caller_id: Uuid,
   pool: &PGPool,
) -> Result<CategoryMember, ApiError> {
   let category = fetch_owned_category(category_id, caller_id, pool).await?;
   let friends = db::friendship::accepted_friend_ids(caller_id, pool).await?;
   if !friends.contains(&member_id) {
      return Err(ApiError::Validation(
         "category members must be accepted friends".to_string(),
      ));
   }
   let member = CategoryMember {
      id: Uuid::new_v4(),
      category_id: category.id,
      user_id: member_id,
   };
   db::category::add_member(&member, pool).await?;
   Ok(member)
}

pub async fn list_category_members(
   category_id: Uuid,
   caller_id: Uuid,
   pool: &PGPool,
) -> Result<Vec<CategoryMember>, ApiError> {
   let category = fetch_owned_category(category_id, caller_id, pool).await?;
   let members = db::category::get_members(category.id, pool).await?;
   Ok(members)
}

pub async fn remove_category_member(
   category_id: Uuid,
   member_id: Uuid,
   caller_id: Uuid,
   pool: &PGPool,
) -> Result<(), ApiError> {
   let category = fetch_owned_category(category_id, caller_id, pool).await?;
   db::category::remove_member(category.id, member_id, pool).await?;
   Ok(())
}

async fn fetch_owned_category(
   category_id: Uuid,
   caller_id: Uuid,
   pool: &PGPool,
) -> Result<FriendshipCategory, ApiError> {
   let category = db::category::get_by_id(category_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("category does not exist".to_string()),
         other => other.into(),
      })?;
   if category.owner_id != caller_id {
      return Err(ApiError::Forbidden(
         "only the category owner may manage it".to_string(),
      ));
   }
   Ok(category)
}
