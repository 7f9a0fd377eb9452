//! Authentication middleware
//!
//! JWT validation for protected routes, plus extractors for handlers that
//! require a user and for handlers that merely accept one.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{ErrorDetail, ErrorResponse};
use crate::services::auth::{decode_claims, Claims};
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub full_name: String,
}

impl TryFrom<Claims> for AuthUser {
    type Error = &'static str;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = uuid::Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
        Ok(AuthUser {
            user_id,
            email: claims.email,
            full_name: claims.name,
        })
    }
}

/// Verify an access token against the configured signing secret
fn authenticate(token: &str, secret: &str) -> Result<AuthUser, String> {
    let claims = decode_claims(token, secret)?;
    AuthUser::try_from(claims).map_err(str::to_string)
}

/// Authentication middleware that validates JWT tokens.
/// Register with `middleware::from_fn_with_state`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let auth_user = match authenticate(bearer.token(), &state.config.jwt.secret) {
        Ok(user) => user,
        Err(msg) => return unauthorized_response(&msg),
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message_en: message.to_string(),
            message_es: "No autorizado".to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers behind `auth_middleware`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message_en: "Authentication required".to_string(),
                        message_es: "Debes iniciar sesión".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}

/// Optional user for public routes. A missing, expired or malformed token
/// yields `MaybeUser(None)` instead of a rejection.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(MaybeUser(Some(user.clone())));
        }

        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();

        let user = bearer.and_then(|TypedHeader(Authorization(bearer))| {
            authenticate(bearer.token(), &state.config.jwt.secret)
                .map_err(|msg| tracing::debug!("Ignoring session token: {}", msg))
                .ok()
        });

        Ok(MaybeUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn signed_token(secret: &str) -> (uuid::Uuid, String) {
        let user_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: "compras@bioenergia.cl".to_string(),
            name: "Bioenergía del Sur".to_string(),
            exp: now + 3600,
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .unwrap();
        (user_id, token)
    }

    #[test]
    fn test_token_verified_with_configured_secret() {
        // Secret that only the config file knows about
        let (user_id, token) = signed_token("secret-from-config-file");

        let user = authenticate(&token, "secret-from-config-file").unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "compras@bioenergia.cl");

        assert!(authenticate(&token, "development-secret-key").is_err());
    }

    #[test]
    fn test_token_with_bad_subject_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "a@b.cl".to_string(),
            name: "A".to_string(),
            exp: now + 60,
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s")).unwrap();
        assert!(authenticate(&token, "s").is_err());
    }
}
