//! Network verification of www-sites.
//!
//! Hosts are resolved first. A site whose host does not resolve is never
//! fetched. Probes run concurrently up to a fixed limit, each bounded by a
//! timeout, and every distinct host and URL is probed once per run.

use crate::config::Checks;
use reqwest::{redirect, Client, Url};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("portlint/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed before a site counts as unreachable.
const MAX_REDIRECTS: usize = 10;

/// Errors setting up the verifier.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum NetworkError {
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    #[diagnostic(code(portlint::network::client))]
    Client(#[from] reqwest::Error),
}

/// Options of a verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Resolve the host of each site.
    pub resolve_hosts: bool,
    /// Fetch each site whose host resolved.
    pub fetch_urls: bool,
    /// Maximum number of probes in flight.
    pub concurrency: usize,
    /// Timeout of one resolution or one fetch.
    pub timeout: Duration,
    /// Honour `HTTP_PROXY` and friends.
    pub use_system_proxy: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self::from_checks(&Checks::default())
    }
}

impl VerifyOptions {
    /// Derives options from the `[checks]` configuration.
    #[must_use]
    pub fn from_checks(checks: &Checks) -> Self {
        Self {
            resolve_hosts: checks.resolve_hosts(),
            fetch_urls: checks.urls,
            concurrency: checks.concurrency.max(1),
            timeout: Duration::from_secs(checks.timeout_secs),
            use_system_proxy: true,
        }
    }
}

/// Outcome of resolving a site's host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The host has at least one address.
    Resolved,
    /// The host did not resolve, or the URL has no usable host.
    Unresolvable {
        /// Resolver error or parse failure.
        reason: String,
    },
    /// Resolution was not requested.
    NotChecked,
}

/// Why a site was not fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fetching was not requested.
    Disabled,
    /// The host did not resolve.
    UnresolvableHost,
}

/// Outcome of fetching a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// The final response after redirects was 2xx or 3xx.
    Reachable {
        /// HTTP status code.
        status: u16,
    },
    /// The fetch failed or ended on a 4xx/5xx status.
    Unreachable {
        /// Human-readable cause.
        reason: String,
        /// HTTP status code, if a response was received.
        status: Option<u16>,
    },
    /// The site was not fetched.
    Skipped(SkipReason),
}

/// Probe of one www-site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WwwProbe {
    /// The probed URL.
    pub url: String,
    /// Host part of the URL, if it has one.
    pub host: Option<String>,
    /// Result of host resolution.
    pub resolution: Resolution,
    /// Result of the fetch.
    pub reachability: Reachability,
}

impl WwwProbe {
    /// Returns true if the host was looked up and did not resolve.
    #[must_use]
    pub fn is_unresolvable(&self) -> bool {
        matches!(self.resolution, Resolution::Unresolvable { .. })
    }
}

/// Probes keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct ProbeResults {
    /// One probe per port whose www-site was verified.
    pub results: HashMap<String, WwwProbe>,
    /// True if cancellation stopped the pass before every site was probed.
    pub interrupted: bool,
}

impl ProbeResults {
    /// Returns the probe of a port.
    #[must_use]
    pub fn get(&self, port: &str) -> Option<&WwwProbe> {
        self.results.get(port)
    }

    /// Returns the number of ports with a probe.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no port has a probe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

type HostCache = Arc<Mutex<HashMap<String, Arc<OnceCell<Resolution>>>>>;

/// Resolves and fetches www-sites.
#[derive(Debug, Clone)]
pub struct NetworkVerifier {
    client: Client,
    options: VerifyOptions,
    hosts: HostCache,
}

impl NetworkVerifier {
    /// Creates a verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(options: VerifyOptions) -> Result<Self, NetworkError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if !options.use_system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
            options,
            hosts: HostCache::default(),
        })
    }

    /// Returns the options of this verifier.
    #[must_use]
    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Probes one site.
    ///
    /// Resolutions are shared with every other probe of this verifier.
    pub async fn verify(&self, www: &str) -> WwwProbe {
        let url = match Url::parse(www) {
            Ok(url) => url,
            Err(e) => {
                return WwwProbe {
                    url: www.to_string(),
                    host: None,
                    resolution: self.unless_disabled(Resolution::Unresolvable {
                        reason: format!("invalid URL: {e}"),
                    }),
                    reachability: self.skipped(SkipReason::UnresolvableHost),
                }
            }
        };
        let host = url.host_str().map(String::from);

        let resolution = match (&host, self.options.resolve_hosts) {
            (_, false) => Resolution::NotChecked,
            (None, true) => Resolution::Unresolvable {
                reason: "URL has no host".to_string(),
            },
            (Some(_), true) => match url.domain() {
                Some(domain) => {
                    let port = url.port_or_known_default().unwrap_or(80);
                    self.resolve_cached(domain, port).await
                }
                // IP literal
                None => Resolution::Resolved,
            },
        };

        let reachability = match &resolution {
            Resolution::Unresolvable { .. } => Reachability::Skipped(SkipReason::UnresolvableHost),
            _ if !self.options.fetch_urls => Reachability::Skipped(SkipReason::Disabled),
            _ => self.fetch(url).await,
        };

        WwwProbe {
            url: www.to_string(),
            host,
            resolution,
            reachability,
        }
    }

    fn unless_disabled(&self, resolution: Resolution) -> Resolution {
        if self.options.resolve_hosts {
            resolution
        } else {
            Resolution::NotChecked
        }
    }

    fn skipped(&self, reason: SkipReason) -> Reachability {
        if self.options.resolve_hosts {
            Reachability::Skipped(reason)
        } else {
            Reachability::Skipped(SkipReason::Disabled)
        }
    }

    async fn resolve_cached(&self, domain: &str, port: u16) -> Resolution {
        let cell = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(hosts.entry(domain.to_string()).or_default())
        };
        cell.get_or_init(|| self.resolve(domain, port))
            .await
            .clone()
    }

    async fn resolve(&self, domain: &str, port: u16) -> Resolution {
        let lookup = tokio::net::lookup_host((domain, port));
        match tokio::time::timeout(self.options.timeout, lookup).await {
            Ok(Ok(mut addrs)) => {
                if addrs.next().is_some() {
                    Resolution::Resolved
                } else {
                    Resolution::Unresolvable {
                        reason: "no address".to_string(),
                    }
                }
            }
            Ok(Err(e)) => {
                debug!("Failed to resolve {}: {}", domain, e);
                Resolution::Unresolvable {
                    reason: e.to_string(),
                }
            }
            Err(_) => Resolution::Unresolvable {
                reason: "resolution timed out".to_string(),
            },
        }
    }

    async fn fetch(&self, url: Url) -> Reachability {
        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    Reachability::Reachable {
                        status: status.as_u16(),
                    }
                } else {
                    Reachability::Unreachable {
                        reason: format!("HTTP {status}"),
                        status: Some(status.as_u16()),
                    }
                }
            }
            Err(e) => {
                debug!("Failed to fetch {}: {}", url, e);
                let reason = if e.is_timeout() {
                    "timed out".to_string()
                } else if e.is_redirect() {
                    "too many redirects".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                Reachability::Unreachable {
                    reason,
                    status: e.status().map(|s| s.as_u16()),
                }
            }
        }
    }

    /// Probes the www-site of every `(port, www)` pair.
    ///
    /// Empty sites are ignored. Each distinct URL is probed once and the
    /// result shared by all ports using it. Once `cancel` fires no new probe
    /// starts; probes already in flight still complete.
    pub async fn verify_all<I>(&self, sites: I, cancel: &CancellationToken) -> ProbeResults
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut ports_by_url: HashMap<String, Vec<String>> = HashMap::new();
        for (port, www) in sites {
            let www = www.trim();
            if www.is_empty() {
                continue;
            }
            ports_by_url.entry(www.to_string()).or_default().push(port);
        }
        // Sorted so the issue order, and thus a partial result, is reproducible.
        let urls: BTreeSet<String> = ports_by_url.keys().cloned().collect();
        info!(
            "Verifying {} distinct www-sites with up to {} probes in flight",
            urls.len(),
            self.options.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut set: JoinSet<(String, WwwProbe)> = JoinSet::new();
        let mut interrupted = false;

        for url in urls {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                break;
            };
            let verifier = self.clone();
            set.spawn(async move {
                let probe = verifier.verify(&url).await;
                drop(permit);
                (url, probe)
            });
        }
        if interrupted {
            warn!("Verification interrupted, waiting for probes in flight");
        }

        let mut results = HashMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((url, probe)) => {
                    for port in ports_by_url.get(&url).into_iter().flatten() {
                        results.insert(port.clone(), probe.clone());
                    }
                }
                Err(e) => warn!("Probe task failed: {}", e),
            }
        }

        info!("Verified www-sites of {} ports", results.len());
        ProbeResults {
            results,
            interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn options(fetch_urls: bool) -> VerifyOptions {
        VerifyOptions {
            resolve_hosts: true,
            fetch_urls,
            concurrency: 4,
            timeout: Duration::from_secs(5),
            use_system_proxy: false,
        }
    }

    fn pair(port: &str, www: &str) -> (String, String) {
        (port.to_string(), www.to_string())
    }

    #[tokio::test]
    async fn unresolvable_host_is_not_fetched() {
        let verifier = NetworkVerifier::new(options(true)).unwrap();
        let probe = verifier.verify("https://nowhere.invalid/").await;

        assert_eq!(probe.host.as_deref(), Some("nowhere.invalid"));
        assert!(probe.is_unresolvable());
        assert_eq!(
            probe.reachability,
            Reachability::Skipped(SkipReason::UnresolvableHost)
        );
    }

    #[tokio::test]
    async fn invalid_url_counts_as_unresolvable() {
        let verifier = NetworkVerifier::new(options(true)).unwrap();
        let probe = verifier.verify("not a url").await;
        assert!(probe.host.is_none());
        assert!(probe.is_unresolvable());
    }

    #[tokio::test]
    async fn classifies_http_statuses() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("GET", "/ok")
            .with_status(200)
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/gone")
            .with_status(410)
            .create_async()
            .await;

        let verifier = NetworkVerifier::new(options(true)).unwrap();

        let ok = verifier.verify(&format!("{}/ok", server.url())).await;
        assert_eq!(ok.resolution, Resolution::Resolved);
        assert_eq!(ok.reachability, Reachability::Reachable { status: 200 });

        let gone = verifier.verify(&format!("{}/gone", server.url())).await;
        match gone.reachability {
            Reachability::Unreachable { status, .. } => assert_eq!(status, Some(410)),
            other => panic!("expected unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn follows_redirects() {
        let mut server = Server::new_async().await;
        let _moved = server
            .mock("GET", "/old")
            .with_status(301)
            .with_header("location", &format!("{}/new", server.url()))
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/new")
            .with_status(200)
            .create_async()
            .await;

        let verifier = NetworkVerifier::new(options(true)).unwrap();
        let probe = verifier.verify(&format!("{}/old", server.url())).await;
        assert_eq!(probe.reachability, Reachability::Reachable { status: 200 });
    }

    #[tokio::test]
    async fn fetching_disabled_skips_requests() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let verifier = NetworkVerifier::new(options(false)).unwrap();
        let probe = verifier.verify(&format!("{}/", server.url())).await;
        assert_eq!(probe.resolution, Resolution::Resolved);
        assert_eq!(probe.reachability, Reachability::Skipped(SkipReason::Disabled));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn verify_all_probes_each_url_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/shared")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let shared = format!("{}/shared", server.url());

        let verifier = NetworkVerifier::new(options(true)).unwrap();
        let results = verifier
            .verify_all(
                vec![
                    pair("a-1.0", &shared),
                    pair("b-1.0", &shared),
                    pair("c-1.0", ""),
                ],
                &CancellationToken::new(),
            )
            .await;

        assert!(!results.interrupted);
        assert_eq!(results.len(), 2);
        assert_eq!(results.get("a-1.0"), results.get("b-1.0"));
        assert!(results.get("c-1.0").is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn cancelled_pass_issues_no_probe() {
        let verifier = NetworkVerifier::new(options(true)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = verifier
            .verify_all(vec![pair("a-1.0", "https://nowhere.invalid/")], &cancel)
            .await;
        assert!(results.interrupted);
        assert!(results.is_empty());
    }

    #[test]
    fn options_follow_checks() {
        let checks = Checks {
            urls: true,
            ..Checks::default()
        };
        let options = VerifyOptions::from_checks(&checks);
        assert!(options.resolve_hosts);
        assert!(options.fetch_urls);
        assert_eq!(options.concurrency, 16);
        assert_eq!(options.timeout, Duration::from_secs(10));
    }
}
