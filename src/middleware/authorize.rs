use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;

use crate::session::Session;

/// Builds the credential headers for outgoing calls. The only place a bearer
/// header is constructed.
pub struct RequestAuthorizer;

impl RequestAuthorizer {
    /// `Authorization: Bearer <token>` when a session exists, nothing otherwise.
    pub fn headers(session: Option<&Session>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(session) = session else {
            return headers;
        };

        match HeaderValue::from_str(&format!("Bearer {}", session.token.as_str())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("Stored token is not a valid header value, sending request without credentials");
            }
        }
        headers
    }

    pub fn authorize(builder: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        builder.headers(Self::headers(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ApprovalStatus, Role};

    #[test]
    fn bearer_header_when_session_present() {
        let session = Session::new("abc", "1", Role::Member, ApprovalStatus::Approved);
        let headers = RequestAuthorizer::headers(Some(&session));
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn no_header_when_anonymous() {
        assert!(RequestAuthorizer::headers(None).is_empty());
    }

    #[test]
    fn invalid_token_sends_no_header() {
        let session = Session::new("bad\ntoken", "1", Role::Member, ApprovalStatus::Approved);
        assert!(RequestAuthorizer::headers(Some(&session)).is_empty());
    }
}
