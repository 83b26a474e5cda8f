//! Opaque continuation tokens.
//!
//! A token is URL-safe base64 (no padding) over a JSON body. The body carries
//! what any replica needs to resume a search without re-running extraction;
//! delivered ids stay server-side in the session.

use aisle_core::constants::CONTINUATION_TOKEN_VERSION;
use aisle_core::errors::SessionError;
use aisle_core::models::{ExtractedFilters, PipelinePath};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationToken {
    pub version: u8,
    pub store_id: String,
    pub query: String,
    pub filters: ExtractedFilters,
    /// Products delivered so far.
    pub offset: usize,
    /// Unix seconds at issue time.
    pub issued_at: i64,
    #[serde(rename = "type")]
    pub path: PipelinePath,
    pub session_id: String,
}

impl ContinuationToken {
    pub fn new(
        store_id: impl Into<String>,
        query: impl Into<String>,
        filters: ExtractedFilters,
        offset: usize,
        path: PipelinePath,
        session_id: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: CONTINUATION_TOKEN_VERSION,
            store_id: store_id.into(),
            query: query.into(),
            filters,
            offset,
            issued_at: issued_at.timestamp(),
            path,
            session_id: session_id.into(),
        }
    }

    pub fn encode(&self) -> Result<String, SessionError> {
        let json = serde_json::to_vec(self).map_err(|e| SessionError::InvalidToken {
            reason: e.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode without checking age.
    pub fn decode(token: &str) -> Result<Self, SessionError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| SessionError::InvalidToken {
                reason: format!("not base64: {e}"),
            })?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(|e| SessionError::InvalidToken {
                reason: format!("malformed body: {e}"),
            })?;
        if decoded.version != CONTINUATION_TOKEN_VERSION {
            return Err(SessionError::InvalidToken {
                reason: format!(
                    "version {} (expected {CONTINUATION_TOKEN_VERSION})",
                    decoded.version
                ),
            });
        }
        Ok(decoded)
    }

    /// Decode and reject tokens older than `ttl_secs` at `now`.
    pub fn decode_fresh(token: &str, now: DateTime<Utc>, ttl_secs: u64) -> Result<Self, SessionError> {
        let decoded = Self::decode(token)?;
        let age_secs = now.timestamp() - decoded.issued_at;
        if age_secs > ttl_secs as i64 {
            return Err(SessionError::TokenExpired { age_secs });
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_core::models::HardFilters;

    fn token(issued_at: DateTime<Utc>) -> ContinuationToken {
        ContinuationToken::new(
            "wine-store",
            "red wine",
            ExtractedFilters {
                hard: HardFilters {
                    category: vec!["Red Wine".into()],
                    ..Default::default()
                },
                ..Default::default()
            },
            25,
            PipelinePath::FilterOnlyFast,
            "abc",
            issued_at,
        )
    }

    #[test]
    fn survives_encoding() {
        let now = Utc::now();
        let t = token(now);
        let encoded = t.encode().unwrap();
        assert!(!encoded.contains('='));
        assert_eq!(ContinuationToken::decode_fresh(&encoded, now, 60).unwrap(), t);
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            ContinuationToken::decode("%%%"),
            Err(SessionError::InvalidToken { .. })
        ));
        let not_json = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(matches!(
            ContinuationToken::decode(&not_json),
            Err(SessionError::InvalidToken { .. })
        ));
    }

    #[test]
    fn other_versions_are_invalid() {
        let mut t = token(Utc::now());
        t.version = CONTINUATION_TOKEN_VERSION + 1;
        let encoded = t.encode().unwrap();
        assert!(matches!(
            ContinuationToken::decode(&encoded),
            Err(SessionError::InvalidToken { .. })
        ));
    }

    #[test]
    fn old_tokens_expire() {
        let issued = Utc::now() - chrono::Duration::hours(25);
        let encoded = token(issued).encode().unwrap();
        assert!(matches!(
            ContinuationToken::decode_fresh(&encoded, Utc::now(), 86_400),
            Err(SessionError::TokenExpired { .. })
        ));
    }
}
