use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use seolens_core::{AnalysisResult, FetchConfig, ResultCache, SafeFetcher, SeoAnalyzer, analyze_markup};

mod report;

/// Score a web page's on-page SEO signals
#[derive(Debug, Parser)]
#[command(name = "seolens", version, about)]
struct Cli {
    /// Page to fetch and analyze
    #[arg(required_unless_present = "html", conflicts_with = "html")]
    url: Option<String>,

    /// Analyze a local markup file instead (`-` reads stdin)
    #[arg(long, value_name = "FILE|-")]
    html: Option<PathBuf>,

    /// Address used to resolve a relative canonical link in --html mode
    #[arg(long, value_name = "URL", requires = "html")]
    base: Option<String>,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,
}

fn read_markup(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read markup from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn analyze(cli: &Cli) -> Result<(AnalysisResult, String)> {
    if let Some(path) = &cli.html {
        let html = read_markup(path)?;
        let result = analyze_markup(&html, cli.base.as_deref())?;
        return Ok((result, path.display().to_string()));
    }

    let url = cli.url.as_deref().context("a URL or --html is required")?;
    let fetcher = SafeFetcher::new(FetchConfig::default()).context("Failed to build HTTP client")?;
    let analyzer = SeoAnalyzer::new(fetcher, Arc::new(ResultCache::default()));
    let analysis = analyzer
        .analyze_url(url)
        .await
        .with_context(|| format!("Failed to analyze {url}"))?;

    Ok((analysis.result.as_ref().clone(), url.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (result, source) = analyze(&cli).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render_report(&result, &source));
    }

    Ok(())
}
