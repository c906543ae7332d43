//! Caller authorization
//!
//! Token validation itself belongs to the surrounding server; this layer only
//! asks a yes/no question before routing.

use crate::request::ApiRequest;

/// Decides whether a request may proceed
pub trait ClientAuth: Send + Sync {
    /// `true` if the caller is authenticated and authorized
    fn authorize(&self, request: &ApiRequest) -> bool;
}

/// Authorizes every caller
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ClientAuth for AllowAll {
    fn authorize(&self, _request: &ApiRequest) -> bool {
        true
    }
}

/// Authorizes callers presenting one fixed token
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl ClientAuth for StaticToken {
    fn authorize(&self, request: &ApiRequest) -> bool {
        request.token.as_deref() == Some(self.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn static_token_requires_exact_match() {
        let auth = StaticToken::new("secret");
        let request = ApiRequest::new(Method::Get, "/api/groups");

        assert!(!auth.authorize(&request));
        assert!(!auth.authorize(&request.clone().with_token("Secret")));
        assert!(auth.authorize(&request.with_token("secret")));
    }

    #[test]
    fn allow_all_ignores_token() {
        assert!(AllowAll.authorize(&ApiRequest::new(Method::Delete, "/api/groups/x")));
    }
}
