//! # Authentication & Authorization Middleware
//!
//! Bearer token middleware with role-based access control.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{address}:{secret}   role-scoped, address may be empty
//! Bearer {secret}                    admin, no signing address
//! ```
//!
//! `role` is one of `viewer`, `issuer` or `admin`. The address becomes the
//! signing identity for mint and revoke; a caller without one gets 428 on
//! writes, never a default issuer.
//!
//! When no token is configured, every request runs as admin and the signing
//! address is read from the `X-Wallet-Address` header.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use educred_core::WalletAddress;
use educred_registry::Caller;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};

/// Header naming the signing address when auth is disabled.
pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";

// ── Role ────────────────────────────────────────────────────────────────────

/// Roles ordered by privilege: `Viewer < Issuer < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only access to certificates, metadata and verification.
    Viewer,
    /// Can store metadata, mint, issue and revoke.
    Issuer,
    /// Full access.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Issuer => "issuer",
            Self::Admin => "admin",
        }
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller, injected by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub role: Role,
    /// Signing address used as issuer for registry writes.
    pub address: Option<WalletAddress>,
}

impl CallerIdentity {
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }

    /// The registry-side view of this identity.
    pub fn caller(&self) -> Caller {
        match &self.address {
            Some(address) => Caller::signer(address.clone()),
            None => Caller::anonymous(),
        }
    }
}

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Returns 403 Forbidden if the caller's role is below `minimum`.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// When lengths differ, performs a dummy comparison so timing does not
/// depend on where the mismatch is.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{role}:{address}:{secret}` or `{secret}`.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.len() {
        1 => {
            if constant_time_token_eq(provided, expected_secret) {
                Ok(CallerIdentity {
                    role: Role::Admin,
                    address: None,
                })
            } else {
                Err("invalid bearer token".into())
            }
        }
        3 => {
            let role_str = parts[0];
            let address_str = parts[1];
            let secret = parts[2];

            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = match role_str {
                "admin" => Role::Admin,
                "issuer" => Role::Issuer,
                "viewer" => Role::Viewer,
                other => return Err(format!("unknown role: {other}")),
            };

            let address = if address_str.is_empty() {
                None
            } else {
                Some(
                    WalletAddress::new(address_str)
                        .map_err(|e| format!("invalid address: {e}"))?,
                )
            };

            Ok(CallerIdentity { role, address })
        }
        _ => Err("invalid token format, expected {role}:{address}:{secret} or {secret}".into()),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the bearer token and inject [`CallerIdentity`] into extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            let address = match request
                .headers()
                .get(WALLET_ADDRESS_HEADER)
                .map(|v| v.to_str().map_err(|e| e.to_string()))
                .transpose()
            {
                Ok(Some(raw)) => match WalletAddress::new(raw) {
                    Ok(address) => Some(address),
                    Err(e) => return AppError::Validation(e.to_string()).into_response(),
                },
                Ok(None) => None,
                Err(e) => return AppError::Validation(e).into_response(),
            };
            request.extensions_mut().insert(CallerIdentity {
                role: Role::Admin,
                address,
            });
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("UNAUTHORIZED", message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const ADDR: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    async fn whoami(caller: CallerIdentity) -> String {
        format!(
            "{}:{}",
            caller.role.as_str(),
            caller.address.map(|a| a.to_string()).unwrap_or_default()
        )
    }

    fn test_app(token: Option<String>) -> Router {
        Router::new()
            .route("/test", get(whoami))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { token }))
    }

    async fn call(app: Router, auth: Option<&str>, wallet: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/test");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        if let Some(wallet) = wallet {
            builder = builder.header(WALLET_ADDRESS_HEADER, wallet);
        }
        let resp = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn plain_secret_is_admin_without_address() {
        let (status, body) = call(test_app(Some("s3cret".into())), Some("Bearer s3cret"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin:");
    }

    #[tokio::test]
    async fn scoped_token_carries_role_and_address() {
        let token = format!("Bearer issuer:{ADDR}:s3cret");
        let (status, body) = call(test_app(Some("s3cret".into())), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("issuer:{ADDR}"));
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let token = format!("Bearer issuer:{ADDR}:nope");
        let (status, body) = call(test_app(Some("s3cret".into())), Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (status, _) = call(test_app(Some("s3cret".into())), None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn basic_scheme_is_rejected() {
        let (status, _) = call(test_app(Some("s3cret".into())), Some("Basic s3cret"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn disabled_auth_reads_wallet_header() {
        let (status, body) = call(test_app(None), None, Some(ADDR)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("admin:{ADDR}"));
    }

    #[tokio::test]
    async fn disabled_auth_rejects_malformed_wallet_header() {
        let (status, body) = call(test_app(None), None, Some("0x123")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("VALIDATION_ERROR"));
    }

    #[test]
    fn unknown_role_and_bad_address_are_rejected() {
        assert!(parse_bearer_token("root::s", "s").is_err());
        assert!(parse_bearer_token("issuer:0x12:s", "s").is_err());
        assert!(parse_bearer_token("a:b", "s").is_err());
    }

    #[test]
    fn role_ordering() {
        assert!(Role::Admin > Role::Issuer);
        assert!(Role::Issuer > Role::Viewer);
        let viewer = CallerIdentity {
            role: Role::Viewer,
            address: None,
        };
        assert!(require_role(&viewer, Role::Issuer).is_err());
        assert!(require_role(&viewer, Role::Viewer).is_ok());
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let debug = format!("{:?}", AuthConfig { token: Some("s3cret".into()) });
        assert!(!debug.contains("s3cret"));
    }
}
