//! SSRF-hardened page fetching
//!
//! Requires the `fetch` feature (needs reqwest and tokio).

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use futures_util::{Stream, StreamExt};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use std::error::Error as StdError;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::AnalyzeError;
use crate::predicates::{charset_from_content_type, is_html_content_type};
use crate::service::PageSource;
use crate::ssrf::{self, HostResolver, SystemResolver};
use crate::types::FetchOutcome;
use crate::url_utils::parse_target;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// 2.5 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 2_621_440;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

pub fn default_user_agent() -> String {
    format!(
        "seolens/{} (+https://github.com/pondevelopment/seolens)",
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Covers resolution, connection, the redirect chain and the body
    pub timeout: Duration,
    pub max_body_bytes: usize,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: default_user_agent(),
        }
    }
}

/// Raised from the redirect policy when a hop targets an internal host.
#[derive(Debug)]
struct BlockedRedirect {
    host: String,
    target: String,
}

impl fmt::Display for BlockedRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to internal address {}", self.target)
    }
}

impl StdError for BlockedRedirect {}

type BoxError = Box<dyn StdError + Send + Sync>;

/// Connection-time resolver: every name reqwest looks up, on every redirect
/// hop, goes through the [`HostResolver`] and only public addresses are
/// handed back for connecting.
struct GuardedDns<R> {
    resolver: Arc<R>,
}

impl<R: HostResolver + 'static> Resolve for GuardedDns<R> {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let ips = ssrf::resolve_public(resolver.as_ref(), name.as_str(), 0).await?;
            // the connector replaces port 0 with the port of the URL
            let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok::<_, BoxError>(addrs)
        })
    }
}

/// Fetches single HTML documents from public addresses only.
pub struct SafeFetcher<R = SystemResolver> {
    client: Client,
    resolver: Arc<R>,
    config: FetchConfig,
}

impl SafeFetcher<SystemResolver> {
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        Self::with_resolver(config, SystemResolver)
    }
}

impl<R: HostResolver + 'static> SafeFetcher<R> {
    pub fn with_resolver(config: FetchConfig, resolver: R) -> Result<Self, reqwest::Error> {
        Self::with_client_options(config, resolver, |builder| builder)
    }

    /// Like [`Self::with_resolver`], letting `customize` adjust the client
    /// after the guarded settings are applied.
    pub fn with_client_options<F>(config: FetchConfig, resolver: R, customize: F) -> Result<Self, reqwest::Error>
    where
        F: FnOnce(ClientBuilder) -> ClientBuilder,
    {
        let resolver = Arc::new(resolver);
        let client = customize(client_builder(&config, Arc::clone(&resolver))).build()?;
        Ok(Self {
            client,
            resolver,
            config,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `requested` and return its decoded body.
    ///
    /// Nothing is returned until the whole pipeline (the address checks, the
    /// request and the bounded body read) has finished within the timeout.
    pub async fn fetch(&self, requested: &str) -> Result<FetchOutcome, AnalyzeError> {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.config.timeout, self.fetch_inner(requested))
            .await
            .map_err(|_| AnalyzeError::NetworkTimeout)??;

        info!(
            url = requested,
            final_url = %outcome.final_address,
            status = outcome.status_code,
            bytes = outcome.decoded_body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched page"
        );
        Ok(outcome)
    }

    async fn fetch_inner(&self, requested: &str) -> Result<FetchOutcome, AnalyzeError> {
        let target = parse_target(requested)?;
        ssrf::ensure_public_host(self.resolver.as_ref(), &target).await?;

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(map_transport_error)?;

        // redirects may have moved us to a host the first check never saw
        let final_url = response.url().clone();
        ssrf::ensure_public_host(self.resolver.as_ref(), &final_url).await?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(AnalyzeError::Upstream { status });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        if let Some(ct) = &content_type
            && !is_html_content_type(ct)
        {
            return Err(AnalyzeError::UnsupportedMedia(ct.clone()));
        }

        let limit = self.config.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(AnalyzeError::PayloadTooLarge { limit });
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_transport_error));
        let body = read_body_limited(chunks, limit).await?;
        debug!(bytes = body.len(), "read response body");

        Ok(FetchOutcome {
            final_address: final_url.to_string(),
            status_code: status,
            decoded_body: decode_body(&body, content_type.as_deref()),
            content_type,
        })
    }
}

#[async_trait]
impl<R: HostResolver + 'static> PageSource for SafeFetcher<R> {
    async fn fetch(&self, address: &str) -> Result<FetchOutcome, AnalyzeError> {
        SafeFetcher::fetch(self, address).await
    }
}

/// Client settings every fetcher relies on: one User-Agent, the overall
/// timeout, direct connections through the guarded resolver and a redirect
/// policy that refuses obviously internal hops.
fn client_builder<R: HostResolver + 'static>(config: &FetchConfig, resolver: Arc<R>) -> ClientBuilder {
    let max_redirects = config.max_redirects;
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error("too many redirects");
        }
        if ssrf::is_obviously_internal(attempt.url()) {
            let blocked = BlockedRedirect {
                host: attempt.url().host_str().unwrap_or_default().to_string(),
                target: attempt.url().to_string(),
            };
            return attempt.error(blocked);
        }
        attempt.follow()
    });

    // a proxy would resolve targets itself and bypass the guard
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .no_proxy()
        .dns_resolver(Arc::new(GuardedDns { resolver }))
        .redirect(policy)
}

/// Accumulate `chunks` into one buffer, failing as soon as the total would
/// exceed `limit`. The offending chunk is never appended.
pub async fn read_body_limited<S, B>(chunks: S, limit: usize) -> Result<Vec<u8>, AnalyzeError>
where
    S: Stream<Item = Result<B, AnalyzeError>>,
    B: AsRef<[u8]>,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut buffer = Vec::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        if buffer.len() + chunk.len() > limit {
            return Err(AnalyzeError::PayloadTooLarge { limit });
        }
        buffer.extend_from_slice(chunk);
    }

    Ok(buffer)
}

/// Decode `bytes` using the declared charset, or UTF-8 when none is usable.
/// Invalid sequences become U+FFFD.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn map_transport_error(err: reqwest::Error) -> AnalyzeError {
    // raised by the guarded resolver while connecting
    if let Some(refused) = find_source::<AnalyzeError>(&err) {
        return refused.clone();
    }
    if err.is_timeout() {
        return AnalyzeError::NetworkTimeout;
    }
    if let Some(blocked) = find_source::<BlockedRedirect>(&err) {
        return AnalyzeError::SsrfBlocked {
            host: blocked.host.clone(),
            address: blocked.target.clone(),
        };
    }
    AnalyzeError::Network(err.to_string())
}

fn find_source<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<T>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}
