pub mod auth;
pub mod category;
pub mod friendship;
pub mod hangout;
pub mod hive;
pub mod preset;
pub mod user;
pub mod window;

use actix_web::{HttpMessage, HttpRequest};

use crate::{errors::ApiError, service::auth::UserAuthData};

/// The authenticated caller, injected by the auth middleware.
pub fn caller(req: &HttpRequest) -> Result<UserAuthData, ApiError> {
    req.extensions()
        .get::<UserAuthData>()
        .cloned()
        .ok_or_else(|| ApiError::Auth("missing authentication".to_string()))
}
