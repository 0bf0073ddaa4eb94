//! Error types for the Margin avatar proxy

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::fmt;

#[derive(Debug)]
pub enum AvatarProxyError {
    /// Request path is missing the signature or actor segment
    BadRequest(String),
    InvalidSignature,
    Profile(bsky_profile_client::ProfileError),
    Http(Box<reqwest::Error>),
    /// Avatar host answered with a non-success status
    Upstream(String),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for AvatarProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvatarProxyError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AvatarProxyError::InvalidSignature => write!(f, "Invalid signature"),
            AvatarProxyError::Profile(err) => write!(f, "Profile lookup error: {}", err),
            AvatarProxyError::Http(err) => write!(f, "HTTP error: {}", err),
            AvatarProxyError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AvatarProxyError::Io(err) => write!(f, "IO error: {}", err),
            AvatarProxyError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AvatarProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AvatarProxyError::Profile(err) => Some(err),
            AvatarProxyError::Http(err) => Some(err.as_ref()),
            AvatarProxyError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AvatarProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AvatarProxyError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad URL".to_string()),
            AvatarProxyError::InvalidSignature => {
                (StatusCode::FORBIDDEN, "Invalid signature".to_string())
            }
            other => {
                tracing::error!(error = %other, "Avatar request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("error fetching avatar: {}", other),
                )
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

impl From<bsky_profile_client::ProfileError> for AvatarProxyError {
    fn from(err: bsky_profile_client::ProfileError) -> Self {
        AvatarProxyError::Profile(err)
    }
}

impl From<reqwest::Error> for AvatarProxyError {
    fn from(err: reqwest::Error) -> Self {
        AvatarProxyError::Http(Box::new(err))
    }
}

impl From<std::io::Error> for AvatarProxyError {
    fn from(err: std::io::Error) -> Self {
        AvatarProxyError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for AvatarProxyError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        AvatarProxyError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AvatarProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_config_error_display() {
        let err = AvatarProxyError::Config("missing AVATAR_SHARED_SECRET".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: missing AVATAR_SHARED_SECRET"
        );
    }

    #[test]
    fn test_profile_error_display() {
        let err = AvatarProxyError::Profile(bsky_profile_client::ProfileError::InvalidServiceUrl(
            "nope".to_string(),
        ));
        assert!(format!("{}", err).contains("Invalid service URL: nope"));
    }

    #[tokio::test]
    async fn test_bad_request_response() {
        let response = AvatarProxyError::BadRequest("one segment".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Bad URL");
    }

    #[tokio::test]
    async fn test_invalid_signature_response() {
        let response = AvatarProxyError::InvalidSignature.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "Invalid signature");
    }

    #[tokio::test]
    async fn test_internal_error_embeds_message() {
        let response = AvatarProxyError::Upstream("status 502".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            body_text(response).await,
            "error fetching avatar: Upstream error: status 502"
        );
    }
}
