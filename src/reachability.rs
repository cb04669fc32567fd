//! URL reachability checks for status metrics and data-file accessibility.
//!
//! The evaluator never performs network I/O. Callers collect the URLs a
//! profile needs, run them through [`check_all`] with a bounded window, and
//! hand the resulting [`ReachabilityTable`] to the evaluator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tracing::warn;

use crate::error::CollaboratorError;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const MAX_REDIRECTS: u32 = 5;

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reachability {
    pub accessible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Reachability {
    /// 2xx and 3xx count as accessible.
    pub fn from_status(status: u16) -> Self {
        Self {
            accessible: (200..400).contains(&status),
            status: Some(status),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            accessible: false,
            status: None,
        }
    }
}

/// Dereferences a URL. Implementations must enforce their own timeout.
pub trait UrlChecker: Send + Sync {
    fn check(&self, url: &str) -> Result<Reachability, CollaboratorError>;
}

/// Whether a value looks like something a checker can dereference.
pub fn is_http_url(value: &str) -> bool {
    url::Url::parse(value.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Checks URLs over HTTP: `HEAD`, falling back to `GET` when the server
/// rejects `HEAD`.
pub struct HttpChecker {
    agent: ureq::Agent,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(MAX_REDIRECTS)
            .user_agent(concat!("mqa/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    fn request(&self, method: &str, url: &str) -> Result<Reachability, CollaboratorError> {
        match self.agent.request(method, url).call() {
            Ok(response) => Ok(Reachability::from_status(response.status())),
            Err(ureq::Error::Status(code, _)) => Ok(Reachability::from_status(code)),
            Err(ureq::Error::Transport(transport)) => {
                let reason = transport.to_string();
                if reason.contains("timed out") {
                    Err(CollaboratorError::Timeout(url.to_string()))
                } else {
                    Err(CollaboratorError::Request {
                        url: url.to_string(),
                        reason,
                    })
                }
            }
        }
    }
}

impl Default for HttpChecker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

impl UrlChecker for HttpChecker {
    fn check(&self, url: &str) -> Result<Reachability, CollaboratorError> {
        if !is_http_url(url) {
            return Err(CollaboratorError::Request {
                url: url.to_string(),
                reason: "not an http(s) URL".to_string(),
            });
        }

        let head = self.request("HEAD", url)?;
        match head.status {
            Some(405) | Some(501) => self.request("GET", url),
            _ => Ok(head),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Canned responses, for tests and offline runs. Unknown URLs are unreachable.
#[derive(Debug, Default)]
pub struct StaticChecker {
    responses: BTreeMap<String, Result<Reachability, CollaboratorError>>,
    calls: AtomicUsize,
}

impl StaticChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(url.into(), Ok(Reachability::from_status(status)));
        self
    }

    pub fn with_error(mut self, url: impl Into<String>, error: CollaboratorError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// Number of `check` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UrlChecker for StaticChecker {
    fn check(&self, url: &str) -> Result<Reachability, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(Reachability::unreachable()))
    }
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

/// Results of a batch, keyed by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReachabilityTable {
    results: BTreeMap<String, Reachability>,
}

impl ReachabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, result: Reachability) {
        self.results.insert(url.into(), result);
    }

    pub fn get(&self, url: &str) -> Option<&Reachability> {
        self.results.get(url)
    }

    /// Unchecked URLs are not accessible.
    pub fn is_accessible(&self, url: &str) -> bool {
        self.get(url).is_some_and(|r| r.accessible)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Reachability)> {
        self.results.iter()
    }
}

/// Check each distinct URL once, at most `concurrency` at a time.
///
/// Failed and timed-out checks are recorded as unreachable; the batch itself
/// never fails.
pub fn check_all<I, S>(checker: &dyn UrlChecker, urls: I, concurrency: usize) -> ReachabilityTable
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: Vec<String> = urls
        .into_iter()
        .map(|u| u.as_ref().trim().to_string())
        .filter(|u| !u.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let window = concurrency.max(1);
    let mut table = ReachabilityTable::new();

    for batch in unique.chunks(window) {
        let outcomes: Vec<(String, Reachability)> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|url| (url, scope.spawn(move || checker.check(url))))
                .collect();

            handles
                .into_iter()
                .map(|(url, handle)| {
                    let result = match handle.join() {
                        Ok(Ok(reachability)) => reachability,
                        Ok(Err(e)) => {
                            warn!(url = %url, error = %e, "reachability check failed");
                            Reachability::unreachable()
                        }
                        Err(_) => {
                            warn!(url = %url, "reachability check panicked");
                            Reachability::unreachable()
                        }
                    };
                    (url.clone(), result)
                })
                .collect()
        });

        for (url, result) in outcomes {
            table.insert(url, result);
        }
    }

    tracing::debug!(checked = table.len(), "reachability batch done");
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(Reachability::from_status(200).accessible);
        assert!(Reachability::from_status(302).accessible);
        assert!(Reachability::from_status(399).accessible);
        assert!(!Reachability::from_status(404).accessible);
        assert!(!Reachability::from_status(500).accessible);
        assert!(!Reachability::from_status(199).accessible);
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://ex.org/data.csv"));
        assert!(is_http_url(" http://ex.org "));
        assert!(!is_http_url("ftp://ex.org/x"));
        assert!(!is_http_url("CSV"));
        assert!(!is_http_url("mailto:a@b.c"));
    }

    #[test]
    fn test_check_all_dedupes() {
        let checker = StaticChecker::new()
            .with_status("http://a", 200)
            .with_status("http://b", 404);
        let table = check_all(
            &checker,
            ["http://a", "http://b", "http://a", " http://a "],
            2,
        );
        assert_eq!(checker.calls(), 2);
        assert!(table.is_accessible("http://a"));
        assert!(!table.is_accessible("http://b"));
        assert_eq!(table.get("http://b").unwrap().status, Some(404));
    }

    #[test]
    fn test_errors_degrade_to_unreachable() {
        let checker = StaticChecker::new()
            .with_error("http://slow", CollaboratorError::Timeout("http://slow".to_string()));
        let table = check_all(&checker, ["http://slow"], DEFAULT_CONCURRENCY);
        assert_eq!(table.get("http://slow"), Some(&Reachability::unreachable()));
    }

    #[test]
    fn test_window_larger_than_batch_and_zero_window() {
        let checker = StaticChecker::new().with_status("http://a", 200);
        let urls: Vec<String> = (0..25).map(|i| format!("http://u{}", i)).collect();
        let table = check_all(&checker, &urls, 0);
        assert_eq!(table.len(), 25);
        assert_eq!(checker.calls(), 25);
    }

    #[test]
    fn test_unchecked_url_is_not_accessible() {
        assert!(!ReachabilityTable::new().is_accessible("http://never"));
    }

    #[test]
    fn test_http_checker_rejects_non_http() {
        let checker = HttpChecker::default();
        assert!(matches!(
            checker.check("file:///etc/passwd"),
            Err(CollaboratorError::Request { .. })
        ));
    }
}
