use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Bearer token returned by `POST /api/auth/login`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    /// How long this credential has been held (for logging)
    pub fn age(&self) -> Duration {
        Utc::now() - self.obtained_at
    }

    /// Value for the `X-Authorization` header
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let credential = Credential::new("abc.def.ghi");
        assert_eq!(credential.header_value(), "Bearer abc.def.ghi");
        assert_eq!(credential.token(), "abc.def.ghi");
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("abc.def.ghi");
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("abc.def.ghi"));
    }

    #[test]
    fn test_age_is_non_negative() {
        let mut credential = Credential::new("t");
        assert!(credential.age().num_seconds() <= 1);

        credential.obtained_at = Utc::now() - Duration::minutes(5);
        assert!(credential.age().num_minutes() >= 5);
    }
}
