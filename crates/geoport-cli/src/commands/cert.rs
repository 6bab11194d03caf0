//! `geoport cert verify` -- TLS trust probe against the system bundle.

use url::Url;

use geoport_api::CertificateResolver;

use crate::cli::{CertArgs, CertCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(serde::Serialize)]
struct ProbeReport {
    url: String,
    trusted: bool,
    bundle: String,
}

pub async fn handle(args: &CertArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.command {
        CertCommand::Verify { url, store_dir } => {
            let parsed: Url = url.parse().map_err(|_| CliError::Validation {
                field: "url".into(),
                reason: format!("invalid URL: {url}"),
            })?;

            let resolver = CertificateResolver::new(store_dir);
            match resolver.resolve(&parsed).await {
                Some(bundle) => {
                    let report = ProbeReport {
                        url: parsed.to_string(),
                        trusted: true,
                        bundle: bundle.display().to_string(),
                    };
                    let rendered = output::render_single(
                        &global.output,
                        &report,
                        |r| format!("url:     {}\ntrusted: yes\nbundle:  {}", r.url, r.bundle),
                        |r| r.bundle.clone(),
                    );
                    output::print_output(&rendered, global.quiet);
                    Ok(())
                }
                None => Err(CliError::CertProbeFailed {
                    url: parsed.to_string(),
                }),
            }
        }
    }
}
