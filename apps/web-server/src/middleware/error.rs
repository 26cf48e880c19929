//! Error translation for a server-rendered site.
//!
//! Unlike a JSON API, most failures here become either an HTML error page
//! (404/500) or a redirect (authentication). Authorization denials never
//! reach this type - handlers resolve them as silent redirects.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use std::fmt;
use std::fmt::Write;

use quill_core::error::{DomainError, RepoError};
use quill_core::ports::{CacheError, MediaError};

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    NotFound,
    /// Authentication required - redirect to the login page, carrying the
    /// originally requested path so the user can come back.
    LoginRequired { next: String },
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound => write!(f, "Not found"),
            AppError::LoginRequired { next } => write!(f, "Login required (next: {next})"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

/// Escape a path for use as a query-string value. Unreserved characters
/// and `/` pass through; everything else (notably `?`, `&`, `=`) is
/// percent-encoded so the path survives the round trip intact.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body("<!DOCTYPE html><html><head><title>404</title></head><body><h1>Page not found</h1></body></html>"),
            AppError::LoginRequired { next } => HttpResponse::Found()
                .insert_header((
                    header::LOCATION,
                    format!("/auth/login/?next={}", encode_query_value(next)),
                ))
                .finish(),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {detail}");
                HttpResponse::InternalServerError()
                    .content_type("text/html; charset=utf-8")
                    .body("<!DOCTYPE html><html><head><title>500</title></head><body><h1>Server error</h1></body></html>")
            }
        }
    }
}

// Conversion from domain/storage errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound,
            DomainError::Validation(msg) => AppError::Internal(msg),
            DomainError::NotOwner => AppError::NotFound,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound,
            RepoError::Constraint(msg) => {
                // Constraint races that matter are swallowed closer to the
                // storage layer; anything left is unexpected.
                tracing::error!("Unhandled constraint violation: {msg}");
                AppError::Internal(msg)
            }
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                tracing::error!("Database error: {msg}");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_pass_through_unchanged() {
        assert_eq!(
            encode_query_value("/posts/42/comment/"),
            "/posts/42/comment/"
        );
    }

    #[test]
    fn login_redirect_escapes_the_next_target() {
        let err = AppError::LoginRequired {
            next: "/posts/1/comment/?page=2&x=1".to_string(),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(
            location,
            "/auth/login/?next=/posts/1/comment/%3Fpage%3D2%26x%3D1"
        );
    }
}
