use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::StatsConfig;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::rate_limit::{RateLimitMode, RateLimiter};
use crate::record::PlayerRecord;

pub const PLAYER_ENDPOINT: &str = "player";

/// Fetches raw player records through a shared rate limiter. Every call is
/// admitted by the limiter before any network traffic happens.
#[derive(Debug, Clone)]
pub struct PlayerClient {
    api_base: String,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
}

impl PlayerClient {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            limiter,
        }
    }

    pub fn from_config(cfg: &StatsConfig) -> Self {
        let limiter = RateLimiter::new(cfg.rate_limit.clone());
        if limiter.mode() == RateLimitMode::Bypass {
            info!("rate limiting bypassed for {}", cfg.api_base);
        }
        Self::new(cfg.api_base.clone(), cfg.api_key.clone(), Arc::new(limiter))
    }

    pub fn player_url(&self, player_id: &str) -> String {
        format!("{}/{PLAYER_ENDPOINT}/{}", self.api_base.trim_end_matches('/'), player_id.trim())
    }

    pub fn fetch_player_record(&self, player_id: &str) -> Result<PlayerRecord, FetchError> {
        self.limiter.acquire(PLAYER_ENDPOINT)?;

        let url = self.player_url(player_id);
        debug!("GET {url}");
        let mut req = http_client()?.get(&url);
        if let Some(key) = self.api_key.as_deref() {
            req = req.query(&[("api_key", key)]);
        }
        let resp = req.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            warn!("player {player_id}: http {status}");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: truncate(&body, 200),
            });
        }
        parse_player_response(&body)
    }
}

/// Parses the player endpoint body. An error code embedded in a 200 response is
/// a failure, never a partial record.
pub fn parse_player_response(raw: &str) -> Result<PlayerRecord, FetchError> {
    let root: Value = serde_json::from_str(raw.trim())?;
    if let Some(code) = api_error_code(&root) {
        let message = root
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(FetchError::Api { code, message });
    }
    let Some(data) = root.get("data").or_else(|| root.get("matches").map(|_| &root)) else {
        return Err(FetchError::Api {
            code: "missing_data".to_string(),
            message: "response carries no player data".to_string(),
        });
    };
    Ok(serde_json::from_value(data.clone())?)
}

fn api_error_code(root: &Value) -> Option<String> {
    ["error", "code"].iter().find_map(|key| match root.get(*key)? {
        Value::Number(n) if n.as_i64() != Some(0) => Some(n.to_string()),
        Value::String(s) if !matches!(s.trim(), "" | "0") => Some(s.trim().to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    })
}

fn truncate(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitConfig;

    #[test]
    fn parses_wrapped_data() {
        let raw = r#"{"error": 0, "data": {"matches": [{"season": "2025"}], "teams": []}}"#;
        let record = parse_player_response(raw).unwrap();
        assert_eq!(record.matches.len(), 1);
        assert!(record.teams.is_empty());
    }

    #[test]
    fn parses_bare_matches() {
        let raw = r#"{"matches": []}"#;
        assert!(parse_player_response(raw).unwrap().matches.is_empty());
    }

    #[test]
    fn embedded_error_code_is_request_failure() {
        let raw = r#"{"error": 403, "message": "invalid key", "data": {"matches": []}}"#;
        match parse_player_response(raw) {
            Err(FetchError::Api { code, message }) => {
                assert_eq!(code, "403");
                assert_eq!(message, "invalid key");
            }
            other => panic!("expected api error, got {other:?}"),
        }
        let raw = r#"{"code": "E_LIMIT"}"#;
        assert!(parse_player_response(raw).unwrap_err().is_request_failed());
    }

    #[test]
    fn missing_data_is_not_a_partial_result() {
        let err = parse_player_response(r#"{"status": "ok"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Api { .. }));
        assert!(parse_player_response("not json").is_err());
    }

    #[test]
    fn rate_limited_call_never_reaches_the_network() {
        let mut cfg = RateLimitConfig {
            mode: RateLimitMode::Enforced,
            global_per_window: 0,
            ..RateLimitConfig::default()
        };
        cfg.endpoint_per_window.clear();
        // Unroutable base: reaching the network would surface a transport error.
        let client = PlayerClient::new("http://127.0.0.1:9", None, Arc::new(RateLimiter::new(cfg)));
        let err = client.fetch_player_record("42").unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[test]
    fn player_url_joins_cleanly() {
        let client = PlayerClient::new("http://host/api/", None, Arc::new(RateLimiter::bypass()));
        assert_eq!(client.player_url(" 42 "), "http://host/api/player/42");
    }
}
