//! The analysis pipeline shared by every front end
//!
//! `SeoAnalyzer` ties a [`PageSource`] to the [`ResultCache`]: URL analyses
//! are served from the cache when a live entry exists and stored under both
//! the requested and the final address otherwise. Inline markup never
//! touches the network or the cache.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::error::AnalyzeError;
use crate::parser;
use crate::types::{AnalysisResult, FetchOutcome};

/// Something that can retrieve a page for analysis.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<FetchOutcome, AnalyzeError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch(&self, address: &str) -> Result<FetchOutcome, AnalyzeError> {
        (**self).fetch(address).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

/// A result together with where it came from.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: Arc<AnalysisResult>,
    pub cache: CacheStatus,
}

/// Run extraction and scoring over already-decoded markup.
pub fn evaluate(html: &str, base: Option<&str>, status: u16, final_url: Option<String>) -> AnalysisResult {
    let fields = parser::analyze(html, base);
    AnalysisResult::new(fields, status, final_url)
}

pub struct SeoAnalyzer<S> {
    source: S,
    cache: Arc<ResultCache>,
}

impl<S: PageSource> SeoAnalyzer<S> {
    pub fn new(source: S, cache: Arc<ResultCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and analyze `address`, consulting the cache first.
    pub async fn analyze_url(&self, address: &str) -> Result<Analysis, AnalyzeError> {
        if let Some(result) = self.cache.get(address) {
            debug!(url = address, "cache hit");
            return Ok(Analysis {
                result,
                cache: CacheStatus::Hit,
            });
        }

        let outcome = self.source.fetch(address).await?;
        let result = Arc::new(evaluate(
            &outcome.decoded_body,
            Some(&outcome.final_address),
            outcome.status_code,
            Some(outcome.final_address.clone()),
        ));

        self.cache.put(address, Arc::clone(&result));
        if outcome.final_address != address {
            self.cache.put(&outcome.final_address, Arc::clone(&result));
        }

        info!(
            url = address,
            final_url = %outcome.final_address,
            score = result.score,
            "analyzed page"
        );
        Ok(Analysis {
            result,
            cache: CacheStatus::Miss,
        })
    }

    /// Analyze caller-supplied markup. `url`, when given, is reported as the
    /// final address and used to resolve a relative canonical link.
    pub fn analyze_html(&self, html: &str, url: Option<&str>) -> Result<AnalysisResult, AnalyzeError> {
        analyze_markup(html, url)
    }
}

/// Inline analysis without an analyzer instance.
pub fn analyze_markup(html: &str, url: Option<&str>) -> Result<AnalysisResult, AnalyzeError> {
    if html.is_empty() {
        return Err(AnalyzeError::EmptyMarkup);
    }
    Ok(evaluate(html, url, 200, url.map(str::to_string)))
}
