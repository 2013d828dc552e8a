//! Common types used across seolens

use serde::{Deserialize, Serialize};

use crate::scoring;

/// A successfully retrieved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Address after following redirects
    pub final_address: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub decoded_body: String,
}

/// SEO signals extracted from one markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub meta_description: String,
    /// Level-1 headings in document order
    pub h1: Vec<String>,
    pub canonical: Option<String>,
    /// Lowercased robots/googlebot directive string
    pub robots: Option<String>,
    pub viewport: bool,
    pub og_count: usize,
    pub twitter_count: usize,
    /// Number of JSON-LD script blocks, parseable or not
    pub jsonld_count: usize,
    /// Every `@type` value in encounter order, duplicates kept
    pub jsonld_types: Vec<String>,
    pub text_words: usize,
}

impl ExtractedFields {
    pub fn title_length(&self) -> usize {
        self.title.chars().count()
    }

    pub fn meta_description_length(&self) -> usize {
        self.meta_description.chars().count()
    }

    pub fn multiple_h1(&self) -> bool {
        self.h1.len() > 1
    }

    pub fn noindex(&self) -> bool {
        self.robots.as_deref().is_some_and(|r| r.contains("noindex"))
    }

    pub fn nofollow(&self) -> bool {
        self.robots.as_deref().is_some_and(|r| r.contains("nofollow"))
    }
}

/// The externally visible result of analyzing one document.
///
/// Built only through [`AnalysisResult::new`], which derives the score and
/// every boolean from the extracted fields so they cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ok: bool,
    pub status: u16,
    pub final_url: Option<String>,
    pub title: String,
    pub title_length: usize,
    pub meta_description: String,
    pub meta_description_length: usize,
    pub h1: Vec<String>,
    pub multiple_h1: bool,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub noindex: bool,
    pub nofollow: bool,
    pub viewport: bool,
    pub og_count: usize,
    pub twitter_count: usize,
    pub jsonld_count: usize,
    pub jsonld_types: Vec<String>,
    pub text_words: usize,
    pub score: u8,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn new(fields: ExtractedFields, status: u16, final_url: Option<String>) -> Self {
        let card = scoring::score(&fields, status);

        Self {
            ok: true,
            status,
            final_url,
            title_length: fields.title_length(),
            meta_description_length: fields.meta_description_length(),
            multiple_h1: fields.multiple_h1(),
            noindex: fields.noindex(),
            nofollow: fields.nofollow(),
            score: card.score,
            recommendations: card.recommendations(),
            title: fields.title,
            meta_description: fields.meta_description,
            h1: fields.h1,
            canonical: fields.canonical,
            robots: fields.robots,
            viewport: fields.viewport,
            og_count: fields.og_count,
            twitter_count: fields.twitter_count,
            jsonld_count: fields.jsonld_count,
            jsonld_types: fields.jsonld_types,
            text_words: fields.text_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_flags_follow_fields() {
        let fields = ExtractedFields {
            h1: vec!["One".into(), "Two".into()],
            robots: Some("noindex, follow".into()),
            ..Default::default()
        };

        assert!(fields.multiple_h1());
        assert!(fields.noindex());
        assert!(!fields.nofollow());

        let result = AnalysisResult::new(fields, 200, None);
        assert!(result.multiple_h1);
        assert!(result.noindex);
        assert!(!result.nofollow);
        assert!(result.ok);
    }

    #[test]
    fn lengths_count_characters() {
        let fields = ExtractedFields {
            title: "Café Crème".into(),
            ..Default::default()
        };
        assert_eq!(fields.title_length(), 10);
    }

    #[test]
    fn serializes_with_flat_field_names() {
        let result = AnalysisResult::new(ExtractedFields::default(), 200, None);
        let json = serde_json::to_value(&result).unwrap();

        for key in [
            "ok",
            "status",
            "final_url",
            "title",
            "title_length",
            "meta_description",
            "meta_description_length",
            "h1",
            "multiple_h1",
            "canonical",
            "robots",
            "noindex",
            "nofollow",
            "viewport",
            "og_count",
            "twitter_count",
            "jsonld_count",
            "jsonld_types",
            "text_words",
            "score",
            "recommendations",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["final_url"].is_null());
        assert!(json["canonical"].is_null());
    }
}
