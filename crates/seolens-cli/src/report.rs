use std::fmt::Write as FmtWrite;

use seolens_core::AnalysisResult;

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;
const MISSING: &str = "(missing)";

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn with_length(text: &str, length: usize) -> String {
    if text.is_empty() {
        MISSING.to_string()
    } else {
        format!("{text} ({length} chars)")
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Human-readable report for one analysis.
pub fn render_report(result: &AnalysisResult, source: &str) -> String {
    let mut buf = String::new();

    push_section_header(&mut buf, "🔎", &format!("SEO report: {source}"));
    push_key_value(&mut buf, "Score", &format!("{}/100", result.score));
    push_key_value(&mut buf, "HTTP status", &result.status.to_string());
    push_key_value(&mut buf, "Final URL", result.final_url.as_deref().unwrap_or_default());
    let _ = writeln!(buf);

    push_section_header(&mut buf, "📝", "Content");
    push_key_value(&mut buf, "Title", &with_length(&result.title, result.title_length));
    push_key_value(
        &mut buf,
        "Description",
        &with_length(&result.meta_description, result.meta_description_length),
    );
    let headings = if result.h1.is_empty() {
        MISSING.to_string()
    } else {
        format!("{} ({})", result.h1.join(" | "), result.h1.len())
    };
    push_key_value(&mut buf, "H1", &headings);
    push_key_value(&mut buf, "Words", &result.text_words.to_string());
    let _ = writeln!(buf);

    push_section_header(&mut buf, "🧭", "Indexing");
    push_key_value(&mut buf, "Canonical", result.canonical.as_deref().unwrap_or(MISSING));
    push_key_value(&mut buf, "Robots", result.robots.as_deref().unwrap_or("(none)"));
    push_key_value(&mut buf, "Noindex", yes_no(result.noindex));
    push_key_value(&mut buf, "Nofollow", yes_no(result.nofollow));
    push_key_value(&mut buf, "Viewport", yes_no(result.viewport));
    let _ = writeln!(buf);

    push_section_header(&mut buf, "🔗", "Social & Structured Data");
    push_key_value(&mut buf, "Open Graph", &result.og_count.to_string());
    push_key_value(&mut buf, "Twitter Card", &result.twitter_count.to_string());
    push_key_value(&mut buf, "JSON-LD blocks", &result.jsonld_count.to_string());
    push_key_value(&mut buf, "JSON-LD types", &result.jsonld_types.join(", "));
    let _ = writeln!(buf);

    if result.recommendations.is_empty() {
        push_section_header(&mut buf, "✅", "No recommendations");
    } else {
        push_section_header(&mut buf, "💡", "Recommendations");
        for (i, recommendation) in result.recommendations.iter().enumerate() {
            let _ = writeln!(buf, "{}. {}", i + 1, recommendation);
        }
    }

    buf
}
