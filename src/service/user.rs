use crate::{db, dto::{NewUserDto, NotificationCounts, ProfilePictureDto}, errors::ApiError, models::User, PGPool};
use uuid::Uuid;

use super::crypto;

pub async fn create(dto: NewUserDto, pool: &PGPool) -> Result<User, ApiError> {
    let NewUserDto {
        username,
        email,
        first_name,
        last_name,
        pwd,
        pwd_confirm,
    } = dto;
    if username.trim().is_empty() || first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "username, first name and last name must not be empty".to_string(),
        ));
    }
    if pwd != pwd_confirm {
        return Err(ApiError::Validation(
            "password confirmation does not match".to_string(),
        ));
    }
    if db::user::exists_by_username(&username, pool).await? {
        return Err(ApiError::Conflict(format!(
            "username '{}' is already taken",
            username
        )));
    }
    let user = User {
        id: Uuid::new_v4(),
        username,
        pwd_hash: crypto::get_sha3_256_hash(&pwd),
        email,
        first_name,
        last_name,
        profile_picture: None,
    };
    db::user::create(&user, pool).await?;
    Ok(user)
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<User, ApiError> {
    let user = db::user::get_by_id(id, pool).await.map_err(|e| match e {
        sqlx::Error::RowNotFound => ApiError::NotFound("user does not exist".to_string()),
        other => other.into(),
    })?;
    Ok(user)
}

pub async fn set_profile_picture(
    id: Uuid,
    dto: ProfilePictureDto,
    pool: &PGPool,
) -> Result<(), ApiError> {
    if dto.url.trim().is_empty() {
        return Err(ApiError::Validation(
            "profile picture url must not be empty".to_string(),
        ));
    }
    db::user::set_profile_picture(id, &dto.url, pool).await?;
    Ok(())
}

/// The caller's notification badge: every pending row addressed to them.
pub async fn notification_counts(id: Uuid, pool: &PGPool) -> Result<NotificationCounts, ApiError> {
    let (friend_requests, tagalong_requests, hangout_invites, join_requests) =
        db::user::pending_counts(id, pool).await?;
    Ok(NotificationCounts {
        friend_requests,
        tagalong_requests,
        hangout_invites,
        join_requests,
        total: friend_requests + tagalong_requests + hangout_invites + join_requests,
    })
}
