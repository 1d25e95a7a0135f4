use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use reqwest::{Client, Response};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::{Position, Url};

use crate::error::{CheckError, Fault, Result};
use crate::platform::Platform;
use crate::scheme::{DecimalScheme, VersionScheme};
use crate::types::{CheckOutcome, CheckResult, UpdateCheckerConfig, USER_AGENT};

/// Checks release platforms for versions newer than the locally installed one.
///
/// Cloning is cheap; clones share the HTTP client and version scheme.
#[derive(Clone)]
pub struct UpdateChecker {
    inner: Arc<Inner>,
}

struct Inner {
    local_version: Arc<str>,
    scheme: Arc<dyn VersionScheme>,
    client: Client,
    token: Option<String>,
    base_url: Option<Url>,
}

/// Status and body as produced by the transport.
struct Fetched {
    status: Option<u16>,
    body: std::result::Result<Value, Fault>,
}

impl UpdateChecker {
    /// Creates a checker for `local_version` using the [`DecimalScheme`].
    pub fn new(local_version: impl Into<String>, config: UpdateCheckerConfig) -> Result<Self> {
        Self::with_scheme(local_version, config, DecimalScheme::new())
    }

    /// Creates a checker for `local_version` using a custom version scheme.
    pub fn with_scheme(
        local_version: impl Into<String>,
        config: UpdateCheckerConfig,
        scheme: impl VersionScheme + 'static,
    ) -> Result<Self> {
        let local_version = local_version.into();
        if local_version.trim().is_empty() {
            return Err(CheckError::BlankLocalVersion);
        }

        let base_url = match config.base_url {
            Some(ref base) => Some(
                Url::parse(base).map_err(|_| CheckError::InvalidBaseUrl(base.clone()))?,
            ),
            None => None,
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                local_version: Arc::from(local_version),
                scheme: Arc::new(scheme),
                client,
                token: config.token,
                base_url,
            }),
        })
    }

    /// The locally installed version every check compares against.
    pub fn local_version(&self) -> &str {
        &self.inner.local_version
    }

    /// Starts an update check for project `id` on `platform`.
    ///
    /// The check runs as a task on the current Tokio runtime; the returned
    /// [`PendingCheck`] resolves to a [`CheckResult`] for every failure mode of
    /// the check itself. Errors are returned only for misuse: a blank `id`, or
    /// calling outside a Tokio runtime.
    pub fn check(&self, id: impl fmt::Display, platform: Platform) -> Result<PendingCheck> {
        let id = id.to_string();
        if id.trim().is_empty() {
            return Err(CheckError::BlankSourceId);
        }

        let runtime = Handle::try_current().map_err(|_| CheckError::NoRuntime)?;
        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move { inner.run(&id, platform).await });

        Ok(PendingCheck {
            handle,
            local_version: Arc::clone(&self.inner.local_version),
        })
    }
}

impl fmt::Debug for UpdateChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateChecker")
            .field("local_version", &self.inner.local_version)
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl Inner {
    async fn run(&self, id: &str, platform: Platform) -> CheckResult {
        let url = self.request_url(platform, id);
        debug!(%platform, id, %url, "Checking for updates");

        let Fetched { status, body } = self.fetch(&url).await;

        let (outcome, fetched, fault) = match body {
            Ok(root) => match platform.extract_latest(&root) {
                Ok(fetched) => {
                    let latest = self.scheme.compare(&self.local_version, &fetched);
                    let outcome =
                        CheckOutcome::from_comparison(latest, &self.local_version, &fetched);
                    (outcome, fetched, None)
                }
                Err(e) => {
                    warn!(%platform, id, error = %e, "Could not extract latest version");
                    (CheckOutcome::MalformedResponse, String::new(), None)
                }
            },
            Err(fault) => (CheckOutcome::from_status(status), String::new(), Some(fault)),
        };

        debug!(
            %platform,
            id,
            ?outcome,
            local = %self.local_version,
            fetched = %fetched,
            "Update check finished"
        );

        CheckResult::new(outcome, Arc::clone(&self.local_version), fetched, fault)
    }

    /// Builds the request URL, moving it onto the base URL override if set.
    fn request_url(&self, platform: Platform, id: &str) -> String {
        let url = platform.request_url(id);

        let Some(ref base) = self.base_url else {
            return url;
        };

        match Url::parse(&url) {
            Ok(parsed) => format!(
                "{}{}",
                base.as_str().trim_end_matches('/'),
                &parsed[Position::BeforePath..]
            ),
            Err(_) => url,
        }
    }

    async fn fetch(&self, url: &str) -> Fetched {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json");

        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Release API request failed");
                return Fetched {
                    status: None,
                    body: Err(e.into()),
                };
            }
        };

        let status = response.status().as_u16();
        let body = Self::read_body(response).await;
        if let Err(ref e) = body {
            warn!(url, status, error = %e, "Release API response unusable");
        }

        Fetched {
            status: Some(status),
            body,
        }
    }

    async fn read_body(response: Response) -> std::result::Result<Value, Fault> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Fault::Status { status, message });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Handle to an update check running on a worker task.
///
/// Dropping it does not cancel the check.
#[derive(Debug)]
pub struct PendingCheck {
    handle: JoinHandle<CheckResult>,
    local_version: Arc<str>,
}

impl Future for PendingCheck {
    type Output = CheckResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<CheckResult> {
        let this = self.get_mut();
        match Pin::new(&mut this.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => {
                warn!(error = %e, "Update check task failed");
                Poll::Ready(CheckResult::new(
                    CheckOutcome::UnknownError,
                    Arc::clone(&this.local_version),
                    String::new(),
                    Some(Fault::Worker(e.to_string())),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_with_base(base: &str) -> UpdateChecker {
        let config = UpdateCheckerConfig::new().base_url(base);
        UpdateChecker::new("1.0.0", config).unwrap()
    }

    #[test]
    fn test_blank_local_version_rejected() {
        for version in ["", "   "] {
            let result = UpdateChecker::new(version, UpdateCheckerConfig::new());
            assert!(matches!(result, Err(CheckError::BlankLocalVersion)));
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let config = UpdateCheckerConfig::new().base_url("not-a-valid-url");
        let result = UpdateChecker::new("1.0.0", config);

        let Err(CheckError::InvalidBaseUrl(url)) = result else {
            panic!("Expected InvalidBaseUrl error");
        };
        assert_eq!(url, "not-a-valid-url");
    }

    #[test]
    fn test_blank_source_id_rejected() {
        let checker = UpdateChecker::new("1.0.0", UpdateCheckerConfig::new()).unwrap();
        for id in ["", " \t "] {
            let result = checker.check(id, Platform::GitHub);
            assert!(matches!(result, Err(CheckError::BlankSourceId)));
        }
    }

    #[test]
    fn test_check_outside_runtime_rejected() {
        let checker = UpdateChecker::new("1.0.0", UpdateCheckerConfig::new()).unwrap();
        let result = checker.check("owner/repo", Platform::GitHub);
        assert!(matches!(result, Err(CheckError::NoRuntime)));
    }

    #[test]
    fn test_request_url_without_override() {
        let checker = UpdateChecker::new("1.0.0", UpdateCheckerConfig::new()).unwrap();
        assert_eq!(
            checker.inner.request_url(Platform::GitHub, "owner/repo"),
            "https://api.github.com/repos/owner/repo/releases/latest"
        );
    }

    #[test]
    fn test_request_url_with_override_keeps_path_and_query() {
        let checker = checker_with_base("http://127.0.0.1:8080");
        assert_eq!(
            checker.inner.request_url(Platform::Spigot, "42"),
            "http://127.0.0.1:8080/simple/0.1/index.php?action=getResource&id=42"
        );
        assert_eq!(
            checker.inner.request_url(Platform::Modrinth, "sodium"),
            "http://127.0.0.1:8080/v2/project/sodium/version"
        );

        let checker = checker_with_base("https://mirror.example.com/api/");
        assert_eq!(
            checker.inner.request_url(Platform::GitHub, "owner/repo"),
            "https://mirror.example.com/api/repos/owner/repo/releases/latest"
        );
    }

    #[test]
    fn test_local_version_is_kept() {
        let checker = checker_with_base("http://localhost");
        assert_eq!(checker.local_version(), "1.0.0");
        assert_eq!(checker.clone().local_version(), "1.0.0");
    }
}
