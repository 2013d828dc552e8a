//! Integration tests for the seolens CLI
//!
//! These run the built binary as a subprocess on local markup only.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Acme Anvils - Drop-forged anvils since 1949</title>
    <meta name="description" content="Acme makes drop-forged anvils for blacksmiths, farriers and cartoon coyotes alike.">
    <meta name="viewport" content="width=device-width">
    <meta property="og:title" content="Acme Anvils">
    <meta name="twitter:card" content="summary">
    <link rel="canonical" href="/anvils">
    <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Organization"}</script>
</head>
<body><h1>Anvils</h1></body>
</html>"#;

fn seolens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seolens"))
        .args(args)
        .output()
        .expect("Failed to run seolens")
}

fn page_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_cli_help() {
    let output = seolens(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--html"));
}

#[test]
fn test_cli_json_output() {
    let file = page_file(PAGE);
    let path = file.path().to_str().unwrap();
    let output = seolens(&["--html", path, "--base", "https://acme.example/shop", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["ok"], true);
    assert_eq!(result["status"], 200);
    assert_eq!(result["score"], 100);
    assert_eq!(result["final_url"], "https://acme.example/shop");
    assert_eq!(result["canonical"], "https://acme.example/anvils");
    assert_eq!(result["jsonld_types"], serde_json::json!(["Organization"]));
}

#[test]
fn test_cli_text_report() {
    let file = page_file("<html><body><h1>One</h1><h1>Two</h1></body></html>");
    let output = seolens(&["--html", file.path().to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("SEO report:"));
    assert!(stdout.contains("Recommendations"));
    assert!(stdout.contains("Keep a single H1"));
}

#[test]
fn test_cli_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_seolens"))
        .args(["--html", "-", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"<title>From stdin</title>")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["title"], "From stdin");
    assert!(result["final_url"].is_null());
}

#[test]
fn test_cli_rejects_empty_markup() {
    let file = page_file("");
    let output = seolens(&["--html", file.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no markup supplied"));
}

#[test]
fn test_cli_requires_input() {
    assert!(!seolens(&[]).status.success());
    assert!(!seolens(&["https://example.com", "--html", "page.html"]).status.success());
}

#[test]
fn test_cli_blocks_internal_addresses() {
    let output = seolens(&["http://127.0.0.1:9/"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("reserved range"));
}
