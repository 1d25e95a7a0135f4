use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Fault;

/// User-Agent sent with every request, identifying this library. Not configurable.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configuration for the UpdateChecker.
#[derive(Debug, Clone)]
pub struct UpdateCheckerConfig {
    /// Optional bearer token, e.g. a GitHub token to lift rate limits.
    pub token: Option<String>,
    /// Total request timeout. Default is 10 seconds.
    pub timeout: Duration,
    /// Connect timeout. Default is 5 seconds.
    pub connect_timeout: Duration,
    /// Replaces scheme, host and port of platform URLs (for testing).
    pub(crate) base_url: Option<String>,
}

impl Default for UpdateCheckerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateCheckerConfig {
    /// Creates a config with default transport settings.
    pub fn new() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            base_url: None,
        }
    }

    /// Sets a custom base URL (for testing).
    #[doc(hidden)]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// How an update check resolved. Every completed check has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// A newer version is available remotely.
    NewUpdateAvailable,
    /// The API could not be reached or answered with an error status.
    ConnectionFailed,
    /// The response was missing the expected fields or had the wrong shape.
    MalformedResponse,
    /// The API answered with HTTP 401.
    Unauthorized,
    /// The local version is newer than the one the API reports.
    AheadOfRemote,
    /// No response was received at all.
    UnknownError,
    /// The version scheme could not compare the two versions.
    ComparisonUnsupported,
    /// The local version is the latest.
    UpToDate,
}

impl CheckOutcome {
    /// Classifies the result of comparing `local` against `fetched`, where
    /// `latest` is what the version scheme reported as newer.
    pub fn from_comparison(latest: Option<&str>, local: &str, fetched: &str) -> Self {
        match latest {
            None => CheckOutcome::ComparisonUnsupported,
            Some(latest) if latest == local => {
                if fetched == local {
                    CheckOutcome::UpToDate
                } else {
                    CheckOutcome::AheadOfRemote
                }
            }
            Some(latest) if latest == fetched => CheckOutcome::NewUpdateAvailable,
            // A scheme returning neither input breaks its contract.
            Some(_) => CheckOutcome::ComparisonUnsupported,
        }
    }

    /// Classifies a check that failed before the response could be read,
    /// from the HTTP status recorded so far (if any).
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => CheckOutcome::UnknownError,
            Some(401) => CheckOutcome::Unauthorized,
            Some(_) => CheckOutcome::ConnectionFailed,
        }
    }
}

/// The result of an update check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    outcome: CheckOutcome,
    local_version: Arc<str>,
    fetched_version: String,
    fault: Option<Arc<Fault>>,
    checked_at: DateTime<Utc>,
}

impl CheckResult {
    pub(crate) fn new(
        outcome: CheckOutcome,
        local_version: Arc<str>,
        fetched_version: String,
        fault: Option<Fault>,
    ) -> Self {
        Self {
            outcome,
            local_version,
            fetched_version,
            fault: fault.map(Arc::new),
            checked_at: Utc::now(),
        }
    }

    /// How the check resolved.
    pub fn outcome(&self) -> CheckOutcome {
        self.outcome
    }

    /// The locally installed version the checker was created with.
    pub fn local_version(&self) -> &str {
        &self.local_version
    }

    /// The version reported by the release API, or an empty string if none
    /// could be extracted.
    pub fn fetched_version(&self) -> &str {
        &self.fetched_version
    }

    /// The fault that stopped the check before the response could be read.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_deref()
    }

    /// When the check completed.
    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// True iff the outcome is [`CheckOutcome::NewUpdateAvailable`].
    pub fn is_update_available(&self) -> bool {
        self.outcome == CheckOutcome::NewUpdateAvailable
    }

    /// The fetched version if an update is available, otherwise the local one.
    pub fn latest_known_version(&self) -> &str {
        if self.is_update_available() {
            &self.fetched_version
        } else {
            &self.local_version
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = UpdateCheckerConfig::new()
            .token("test-token")
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(2));

        assert_eq!(config.token, Some("test-token".to_string()));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn test_user_agent_identifies_library() {
        assert_eq!(USER_AGENT, format!("update-checker/{}", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_outcome_from_comparison() {
        assert_eq!(
            CheckOutcome::from_comparison(Some("1.0.0"), "1.0.0", "1.0.0"),
            CheckOutcome::UpToDate
        );
        assert_eq!(
            CheckOutcome::from_comparison(Some("2.0.0"), "2.0.0", "1.0.0"),
            CheckOutcome::AheadOfRemote
        );
        assert_eq!(
            CheckOutcome::from_comparison(Some("1.1.0"), "1.0.0", "1.1.0"),
            CheckOutcome::NewUpdateAvailable
        );
        assert_eq!(
            CheckOutcome::from_comparison(None, "abc", "1.0"),
            CheckOutcome::ComparisonUnsupported
        );
        assert_eq!(
            CheckOutcome::from_comparison(Some("9.9"), "1.0", "1.1"),
            CheckOutcome::ComparisonUnsupported
        );
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(CheckOutcome::from_status(None), CheckOutcome::UnknownError);
        assert_eq!(CheckOutcome::from_status(Some(401)), CheckOutcome::Unauthorized);
        assert_eq!(CheckOutcome::from_status(Some(404)), CheckOutcome::ConnectionFailed);
        assert_eq!(CheckOutcome::from_status(Some(500)), CheckOutcome::ConnectionFailed);
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CheckOutcome::NewUpdateAvailable).unwrap(),
            "\"new_update_available\""
        );
    }

    #[test]
    fn test_latest_known_version() {
        let local: Arc<str> = Arc::from("1.0.0");

        let update = CheckResult::new(
            CheckOutcome::NewUpdateAvailable,
            local.clone(),
            "1.1.0".to_string(),
            None,
        );
        assert!(update.is_update_available());
        assert_eq!(update.latest_known_version(), "1.1.0");

        let ahead = CheckResult::new(CheckOutcome::AheadOfRemote, local, "0.9.0".to_string(), None);
        assert!(!ahead.is_update_available());
        assert_eq!(ahead.latest_known_version(), "1.0.0");
        assert_eq!(ahead.fetched_version(), "0.9.0");
    }

    #[test]
    fn test_fault_is_kept() {
        let result = CheckResult::new(
            CheckOutcome::Unauthorized,
            Arc::from("1.0.0"),
            String::new(),
            Some(Fault::Status {
                status: 401,
                message: "Bad credentials".to_string(),
            }),
        );
        assert!(matches!(
            result.fault(),
            Some(Fault::Status { status: 401, .. })
        ));
        assert_eq!(result.fetched_version(), "");
        assert_eq!(result.latest_known_version(), "1.0.0");
    }
}
