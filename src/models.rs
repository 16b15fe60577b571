use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are only served while they stay valid at least this long.
pub const TOKEN_EXPIRY_SKEW_MINUTES: i64 = 5;

/// Bearer token as persisted by the token cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
}

impl CachedToken {
    /// `None` when the lifetime is not positive or runs past the representable range.
    pub fn new(
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_in_secs: i64,
    ) -> Option<Self> {
        if expires_in_secs <= 0 {
            return None;
        }
        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))?;
        Some(Self {
            token: token.into(),
            issued_at,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// True while the token outlives `now + skew`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now + Duration::minutes(TOKEN_EXPIRY_SKEW_MINUTES) < self.expires_at
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    pub fn expires_in_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }

    /// Format remaining lifetime as human-readable string
    pub fn expiration_display(&self) -> String {
        let mins = self.expires_in_seconds() / 60;

        if mins >= 60 {
            let hours = mins / 60;
            let remaining_mins = mins % 60;
            if remaining_mins > 0 {
                format!("{}h {}m", hours, remaining_mins)
            } else {
                format!("{}h", hours)
            }
        } else if mins > 0 {
            format!("{} minutes", mins)
        } else {
            "EXPIRED".to_string()
        }
    }
}

/// Result header embedded in every API response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub result_code: i64,
    #[serde(default)]
    pub result_message: String,
    pub is_successful: bool,
}

impl ResponseHeader {
    pub fn is_success(&self) -> bool {
        self.result_code == 0 && self.is_successful
    }
}

/// Response types that carry a [`ResponseHeader`].
///
/// For types with `HAS_HEADER` set, the parser reads the header before the
/// payload, so a failure reply without payload fields is still an API error.
pub trait ResponseEnvelope {
    const HAS_HEADER: bool = false;

    fn header(&self) -> Option<&ResponseHeader> {
        None
    }
}

/// Implements [`ResponseEnvelope`] for response structs with a `header` field.
#[macro_export]
macro_rules! impl_response_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::models::ResponseEnvelope for $ty {
                const HAS_HEADER: bool = true;

                fn header(&self) -> Option<&$crate::models::ResponseHeader> {
                    Some(&self.header)
                }
            }
        )+
    };
}

impl ResponseEnvelope for serde_json::Value {}

/// Response carrying only the header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderOnlyResponse {
    pub header: ResponseHeader,
}

/// Response of asynchronous operations (create, delete, start, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub header: ResponseHeader,
    pub job_id: String,
}

impl_response_envelope!(HeaderOnlyResponse, JobResponse);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry_is_issued_plus_lifetime() {
        let issued = Utc::now();
        let token = CachedToken::new("abc", issued, 3600).unwrap();
        assert_eq!(token.expires_at - token.issued_at, Duration::hours(1));
        assert!(token.is_fresh());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_within_skew_is_stale() {
        let now = Utc::now();
        let token = CachedToken::new("abc", now, 4 * 60).unwrap();
        assert!(!token.is_expired());
        assert!(!token.is_fresh_at(now));

        let token = CachedToken::new("abc", now, 6 * 60).unwrap();
        assert!(token.is_fresh_at(now));
        assert!(!token.is_fresh_at(now + Duration::minutes(2)));
    }

    #[test]
    fn test_unusable_lifetime_is_rejected() {
        let now = Utc::now();
        assert!(CachedToken::new("abc", now, 0).is_none());
        assert!(CachedToken::new("abc", now, -1).is_none());
        assert!(CachedToken::new("abc", now, i64::MAX).is_none());
        assert!(CachedToken::new("abc", now, 1).is_some());
    }

    #[test]
    fn test_empty_token_is_never_fresh() {
        let token = CachedToken::new("", Utc::now(), 86400).unwrap();
        assert!(!token.is_fresh());
    }

    #[test]
    fn test_cached_token_expiration_display() {
        let token = CachedToken::new("abc", Utc::now(), 90 * 60 + 30).unwrap();
        assert!(token.expiration_display().contains("1h"));

        let expired = CachedToken::new("abc", Utc::now() - Duration::hours(2), 3600).unwrap();
        assert_eq!(expired.expiration_display(), "EXPIRED");
    }

    #[test]
    fn test_response_header_success_requires_code_and_flag() {
        let ok = ResponseHeader {
            result_code: 0,
            result_message: "SUCCESS".to_string(),
            is_successful: true,
        };
        assert!(ok.is_success());

        let flag_false = ResponseHeader {
            is_successful: false,
            ..ok.clone()
        };
        assert!(!flag_false.is_success());

        let nonzero = ResponseHeader {
            result_code: 500,
            ..ok
        };
        assert!(!nonzero.is_success());
    }

    #[test]
    fn test_job_response_deserializes_camel_case() {
        let body = r#"{"header":{"resultCode":0,"resultMessage":"SUCCESS","isSuccessful":true},"jobId":"job-1"}"#;
        let resp: JobResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.job_id, "job-1");
        assert!(resp.header().is_some_and(ResponseHeader::is_success));
    }
}
