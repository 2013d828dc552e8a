//! # seolens-core
//!
//! Core library for on-page SEO analysis.
//!
//! This library provides:
//! - HTML parsing and extraction of title, description, headings, canonical,
//!   robots directives, social tags and JSON-LD types
//! - Deterministic 0-100 scoring with ordered recommendations
//! - A TTL + LRU result cache
//! - SSRF-hardened page fetching (DNS validation, size and time limits)
//!
//! ## Features
//!
//! - `default`: everything, including network fetching
//! - `fetch`: `SafeFetcher` and the SSRF guard (pulls in reqwest and tokio)
//!
//! Without `fetch` the crate is a pure, synchronous analyzer.
//!
//! ## Example
//!
//! ```
//! use seolens_core::analyze_markup;
//!
//! let html = r#"
//!     <title>Example Domain</title>
//!     <script type="application/ld+json">
//!     {"@context": "https://schema.org", "@type": "Product", "name": "Example"}
//!     </script>
//! "#;
//!
//! let result = analyze_markup(html, Some("https://example.com/")).unwrap();
//! assert_eq!(result.jsonld_types, vec!["Product"]);
//! assert!(result.score <= 100);
//! ```

pub mod cache;
pub mod error;
pub mod parser;
pub mod predicates;
pub mod scoring;
pub mod service;
pub mod types;
pub mod url_utils;

#[cfg(feature = "fetch")]
pub mod fetcher;
#[cfg(feature = "fetch")]
pub mod ssrf;

// Re-export commonly used types
pub use cache::{CacheConfig, ResultCache};
pub use error::AnalyzeError;
pub use scoring::{Finding, ScoreCard};
pub use service::{Analysis, CacheStatus, PageSource, SeoAnalyzer, analyze_markup, evaluate};
pub use types::{AnalysisResult, ExtractedFields, FetchOutcome};

#[cfg(feature = "fetch")]
pub use fetcher::{FetchConfig, SafeFetcher};
#[cfg(feature = "fetch")]
pub use ssrf::{HostResolver, SystemResolver};
