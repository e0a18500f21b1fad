//! Mock identity helpers for HTTP tests.
//!
//! Services behind the gateway receive `x-campus-uid`, `x-campus-email` and
//! `x-campus-email-verified` headers after the gateway has verified the caller's
//! token. In tests, `MockIdentity` produces these headers directly so no real
//! identity provider is needed.

use campus_auth_types::identity::{EMAIL_HEADER, EMAIL_VERIFIED_HEADER, UID_HEADER};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Configurable identity injected into test requests.
pub struct MockIdentity {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

impl MockIdentity {
    pub fn new(uid: &str, email: &str) -> Self {
        Self {
            uid: uid.to_owned(),
            email: email.to_owned(),
            email_verified: true,
        }
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(UID_HEADER),
            HeaderValue::from_str(&self.uid).unwrap(),
        );
        map.insert(
            HeaderName::from_static(EMAIL_HEADER),
            HeaderValue::from_str(&self.email).unwrap(),
        );
        map.insert(
            HeaderName::from_static(EMAIL_VERIFIED_HEADER),
            HeaderValue::from_static(if self.email_verified { "true" } else { "false" }),
        );
        map
    }
}
