//! Deterministic scoring of extracted SEO fields
//!
//! Scoring starts at 100 and subtracts a fixed penalty for each finding.
//! Findings are evaluated in a fixed order, which is also the order of the
//! recommendations, and the total is clamped to `0..=100` only at the end.

use crate::types::ExtractedFields;

pub const TITLE_MIN: usize = 30;
pub const TITLE_MAX: usize = 60;
pub const DESCRIPTION_MIN: usize = 70;
pub const DESCRIPTION_MAX: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finding {
    MissingTitle,
    TitleTooShort,
    TitleTooLong,
    MissingMetaDescription,
    MetaDescriptionTooShort,
    MetaDescriptionTooLong,
    MultipleH1,
    MissingH1,
    MissingCanonical,
    Noindex,
    Nofollow,
    MissingViewport,
    MissingOpenGraph,
    MissingTwitterCard,
    MissingStructuredData,
    HttpStatus(u16),
}

impl Finding {
    pub fn label(self) -> &'static str {
        match self {
            Finding::MissingTitle => "missing_title",
            Finding::TitleTooShort => "title_too_short",
            Finding::TitleTooLong => "title_too_long",
            Finding::MissingMetaDescription => "missing_meta_description",
            Finding::MetaDescriptionTooShort => "meta_description_too_short",
            Finding::MetaDescriptionTooLong => "meta_description_too_long",
            Finding::MultipleH1 => "multiple_h1",
            Finding::MissingH1 => "missing_h1",
            Finding::MissingCanonical => "missing_canonical",
            Finding::Noindex => "noindex",
            Finding::Nofollow => "nofollow",
            Finding::MissingViewport => "missing_viewport",
            Finding::MissingOpenGraph => "missing_open_graph",
            Finding::MissingTwitterCard => "missing_twitter_card",
            Finding::MissingStructuredData => "missing_structured_data",
            Finding::HttpStatus(_) => "http_status",
        }
    }

    pub fn penalty(self) -> i32 {
        match self {
            Finding::MissingTitle => 15,
            Finding::TitleTooShort => 8,
            Finding::TitleTooLong => 5,
            Finding::MissingMetaDescription => 12,
            Finding::MetaDescriptionTooShort => 6,
            Finding::MetaDescriptionTooLong => 6,
            Finding::MultipleH1 => 6,
            Finding::MissingH1 => 10,
            Finding::MissingCanonical => 6,
            Finding::Noindex => 40,
            Finding::Nofollow => 8,
            Finding::MissingViewport => 6,
            Finding::MissingOpenGraph => 4,
            Finding::MissingTwitterCard => 2,
            Finding::MissingStructuredData => 4,
            Finding::HttpStatus(_) => 10,
        }
    }

    pub fn recommendation(self) -> String {
        match self {
            Finding::MissingTitle => {
                format!("Add a descriptive <title> ({TITLE_MIN}-{TITLE_MAX} characters).")
            }
            Finding::TitleTooShort => {
                format!("Title is short; expand it to at least {TITLE_MIN} characters.")
            }
            Finding::TitleTooLong => {
                format!("Title is long; keep it under {TITLE_MAX} characters to avoid truncation.")
            }
            Finding::MissingMetaDescription => format!(
                "Add a meta description ({DESCRIPTION_MIN}-{DESCRIPTION_MAX} characters)."
            ),
            Finding::MetaDescriptionTooShort => format!(
                "Meta description is short; expand it to at least {DESCRIPTION_MIN} characters."
            ),
            Finding::MetaDescriptionTooLong => format!(
                "Meta description is long; keep it under {DESCRIPTION_MAX} characters."
            ),
            Finding::MultipleH1 => "Keep a single H1 that states the page topic.".to_string(),
            Finding::MissingH1 => "Add an H1 that matches the page title.".to_string(),
            Finding::MissingCanonical => {
                "Add a <link rel=\"canonical\"> pointing at the preferred URL.".to_string()
            }
            Finding::Noindex => {
                "Page is marked noindex and will not be indexed; remove it if the page should rank."
                    .to_string()
            }
            Finding::Nofollow => {
                "Page is marked nofollow; its links pass no link equity.".to_string()
            }
            Finding::MissingViewport => {
                "Add a responsive <meta name=\"viewport\"> tag.".to_string()
            }
            Finding::MissingOpenGraph => {
                "Add Open Graph tags (og:title, og:description, og:image).".to_string()
            }
            Finding::MissingTwitterCard => {
                "Add Twitter Card tags (twitter:card, twitter:title).".to_string()
            }
            Finding::MissingStructuredData => {
                "Add JSON-LD structured data describing the page.".to_string()
            }
            Finding::HttpStatus(status) => {
                format!("Page returned HTTP {status}; serve it with status 200.")
            }
        }
    }
}

/// The outcome of scoring one set of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: u8,
    pub findings: Vec<Finding>,
}

impl ScoreCard {
    pub fn recommendations(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.recommendation()).collect()
    }
}

/// Findings for `fields`, in evaluation order.
pub fn collect_findings(fields: &ExtractedFields, status: u16) -> Vec<Finding> {
    let mut findings = Vec::new();

    let title_length = fields.title_length();
    if title_length == 0 {
        findings.push(Finding::MissingTitle);
    } else if title_length < TITLE_MIN {
        findings.push(Finding::TitleTooShort);
    } else if title_length > TITLE_MAX {
        findings.push(Finding::TitleTooLong);
    }

    let description_length = fields.meta_description_length();
    if description_length == 0 {
        findings.push(Finding::MissingMetaDescription);
    } else if description_length < DESCRIPTION_MIN {
        findings.push(Finding::MetaDescriptionTooShort);
    } else if description_length > DESCRIPTION_MAX {
        findings.push(Finding::MetaDescriptionTooLong);
    }

    if fields.multiple_h1() {
        findings.push(Finding::MultipleH1);
    } else if fields.h1.is_empty() {
        findings.push(Finding::MissingH1);
    }

    if fields.canonical.is_none() {
        findings.push(Finding::MissingCanonical);
    }
    if fields.noindex() {
        findings.push(Finding::Noindex);
    }
    if fields.nofollow() {
        findings.push(Finding::Nofollow);
    }
    if !fields.viewport {
        findings.push(Finding::MissingViewport);
    }
    if fields.og_count == 0 {
        findings.push(Finding::MissingOpenGraph);
    }
    if fields.twitter_count == 0 {
        findings.push(Finding::MissingTwitterCard);
    }
    if fields.jsonld_count == 0 {
        findings.push(Finding::MissingStructuredData);
    }
    if status != 200 {
        findings.push(Finding::HttpStatus(status));
    }

    findings
}

/// Score `fields` fetched with HTTP `status`.
pub fn score(fields: &ExtractedFields, status: u16) -> ScoreCard {
    let findings = collect_findings(fields, status);
    let total = findings
        .iter()
        .fold(100i32, |acc, finding| acc - finding.penalty());

    ScoreCard {
        score: total.clamp(0, 100) as u8,
        findings,
    }
}
