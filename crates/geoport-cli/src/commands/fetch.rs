//! `geoport fetch` -- fetch one page and extract links or readable text.
//!
//! Kept deliberately small: one GET, no crawling, no session state.

use std::time::Duration;

use tabled::Tabled;
use url::Url;

use geoport_api::{TlsMode, TransportConfig};
use geoport_core::extract::{extract_links, extract_text, word_count};

use crate::cli::{FetchArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LinkRow {
    text: String,
    href: String,
    absolute: String,
}

#[derive(serde::Serialize)]
struct PageReport {
    url: String,
    status: u16,
    word_count: usize,
    link_count: usize,
    fetched_at: String,
}

pub async fn handle(args: &FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let url: Url = args.url.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", args.url),
    })?;

    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };
    let client = TransportConfig::new(tls, Duration::from_secs(global.timeout))
        .build_client()
        .map_err(|e| fetch_failed(&args.url, &e))?;

    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| fetch_failed(&args.url, &e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(CliError::FetchFailed {
            url: args.url.clone(),
            cause: format!("HTTP {status}"),
        });
    }
    let body = resp.text().await.map_err(|e| fetch_failed(&args.url, &e))?;

    let rendered = if args.links {
        let links = extract_links(&body, &url);
        output::render_list(
            &global.output,
            &links,
            |l| LinkRow {
                text: l.text.clone(),
                href: l.href.clone(),
                absolute: l.absolute.clone().unwrap_or_default(),
            },
            |l| l.absolute.clone().unwrap_or_else(|| l.href.clone()),
        )
    } else if args.text {
        extract_text(&body)
    } else {
        let text = extract_text(&body);
        let report = PageReport {
            url: url.to_string(),
            status: status.as_u16(),
            word_count: word_count(&text),
            link_count: extract_links(&body, &url).len(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };
        output::render_single(&global.output, &report, page_detail, |r| r.url.clone())
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
        }
        None => output::print_output(&rendered, global.quiet),
    }

    Ok(())
}

fn fetch_failed(url: &str, cause: &dyn std::fmt::Display) -> CliError {
    CliError::FetchFailed {
        url: url.to_string(),
        cause: cause.to_string(),
    }
}

fn page_detail(report: &PageReport) -> String {
    [
        format!("url:        {}", report.url),
        format!("status:     {}", report.status),
        format!("words:      {}", report.word_count),
        format!("links:      {}", report.link_count),
        format!("fetched at: {}", report.fetched_at),
    ]
    .join("\n")
}
