//! Bearer token sources handed to the API client at construction
use std::sync::RwLock;

pub trait TokenSource: Send + Sync {
    /// Current bearer token, `None` when signed out.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, for service accounts and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token held for the lifetime of a signed-in session.
#[derive(Debug, Default)]
pub struct SessionToken {
    token: RwLock<Option<String>>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

impl TokenSource for SessionToken {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .ok()
            .and_then(|t| t.clone())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lifecycle() {
        let session = SessionToken::new();
        assert_eq!(session.bearer_token(), None);
        session.sign_in("abc");
        assert_eq!(session.bearer_token().as_deref(), Some("abc"));
        session.sign_out();
        assert_eq!(session.bearer_token(), None);
    }
}
