use std::future::{ready, Ready};
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::errors::ApiError;

/// The authenticated caller, available from request extensions behind the
/// auth middleware.
#[derive(Debug, Clone)]
pub struct UserAuthData {
    pub user_id: Uuid,
    pub username: String,
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match jwt::validate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(UserAuthData {
                    user_id: claims.user_id,
                    username: claims.username,
                });
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(err) => Box::pin(ready(Err(err.into()))),
        }
    }
}

pub mod jwt {
    use actix_web::dev::ServiceRequest;
    use chrono::Utc;
    use jsonwebtoken::{
        decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation,
    };
    use std::env;

    use crate::{
        db,
        dto::{AuthTokenResponse, Claims, LoginUserRequest},
        errors::ApiError,
        service::crypto,
        PGPool, ACCESS_TOKEN_EXP,
    };

    fn get_secret() -> Result<String, ApiError> {
        env::var("JWT_SECRET").map_err(|_| {
            log::error!("JWT_SECRET is not set");
            ApiError::Internal
        })
    }

    pub fn create(user_id: &uuid::Uuid, username: &str, ttl_secs: usize) -> Result<String, ApiError> {
        let exp = Utc::now().timestamp() as usize + ttl_secs;
        let secret = get_secret()?;
        let claims = Claims::new(user_id, username, exp);
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|e| {
            log::error!("failed to sign token: {:?}", e);
            ApiError::Internal
        })
    }

    pub fn decode_claims(token: &str) -> Result<TokenData<Claims>, ApiError> {
        let secret = get_secret()?;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ApiError::Auth("token expired".to_string())
            }
            _ => ApiError::Auth("invalid token".to_string()),
        })
    }

    /// Extracts and verifies the bearer token of an inbound request.
    pub fn validate(req: &ServiceRequest) -> Result<Claims, ApiError> {
        let token = parse_request(req, "Bearer ")?;
        let data = decode_claims(&token)?;
        Ok(data.claims)
    }

    pub fn parse_request(req: &ServiceRequest, prefix: &str) -> Result<String, ApiError> {
        if let Some(auth_header) = req.headers().get("Authorization") {
            if let Ok(auth_value) = auth_header.to_str() {
                if let Some(token) = auth_value.strip_prefix(prefix) {
                    return Ok(token.to_string());
                }
            }
        }
        Err(ApiError::Auth("missing bearer token".to_string()))
    }

    pub async fn login(pool: &PGPool, req: LoginUserRequest) -> Result<AuthTokenResponse, ApiError> {
        let user = db::user::get_by_username(&req.username, pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => ApiError::Auth("invalid credentials".to_string()),
                other => other.into(),
            })?;
        if crypto::get_sha3_256_hash(&req.pwd) != user.pwd_hash {
            return Err(ApiError::Auth("invalid credentials".to_string()));
        }
        let token = create(&user.id, &user.username, ACCESS_TOKEN_EXP)?;
        Ok(AuthTokenResponse(token))
    }
}
