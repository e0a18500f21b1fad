//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

pub const UID_HEADER: &str = "x-campus-uid";
pub const EMAIL_HEADER: &str = "x-campus-email";
pub const EMAIL_VERIFIED_HEADER: &str = "x-campus-email-verified";

/// Caller identity verified by the gateway and forwarded via `x-campus-*` headers.
///
/// Returns 401 if the uid or email header is absent or empty.
/// `x-campus-email-verified` is optional and defaults to `false`.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously and return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let uid = header_str(parts, UID_HEADER).map(str::to_owned);
        let email = header_str(parts, EMAIL_HEADER).map(str::to_owned);
        let email_verified = header_str(parts, EMAIL_VERIFIED_HEADER)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        async move {
            let uid = uid.ok_or(StatusCode::UNAUTHORIZED)?;
            let email = email.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                uid,
                email,
                email_verified,
            })
        }
    }
}
