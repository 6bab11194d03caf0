//! `geoport connect` -- run the tiered connect sequence and report the
//! signed-in identity (and optionally portal metadata).

use std::time::Duration;

use secrecy::SecretString;

use geoport_config::{Config, CredentialResolver, load_config_or_default, stored_profiles};
use geoport_core::{ConnectionRequest, PortalConnector, PortalSession};

use crate::cli::{ConnectArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(serde::Serialize)]
struct Identity {
    portal: String,
    username: Option<String>,
    full_name: Option<String>,
    role: Option<String>,
    authenticated: bool,
}

pub async fn handle(args: &ConnectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = load_config_or_default();
    let request = build_request(global, &config)?;

    let connector = PortalConnector::new(CredentialResolver::from_platform())
        .with_profiles(stored_profiles(&config))
        .with_timeout(Duration::from_secs(global.timeout));

    let session = connector.connect(&request).await?;
    report(&session, args, global).await
}

/// Translate global flags + config into a `ConnectionRequest`.
///
/// An explicit `--portal` wins over profiles; otherwise the explicit or
/// default profile name is used when the config defines it.
fn build_request(global: &GlobalOpts, config: &Config) -> Result<ConnectionRequest, CliError> {
    let profile = global.profile.clone().or_else(|| {
        if global.portal.is_none() {
            config
                .default_profile
                .clone()
                .filter(|name| config.profiles.contains_key(name))
        } else {
            None
        }
    });

    let url = match &global.portal {
        Some(raw) => Some(raw.parse().map_err(|_| CliError::Validation {
            field: "portal".into(),
            reason: format!("invalid URL: {raw}"),
        })?),
        None => None,
    };

    let verify_certificates = if global.insecure {
        false
    } else {
        profile
            .as_deref()
            .and_then(|name| config.profiles.get(name))
            .and_then(|p| p.verify_certificates)
            .unwrap_or(config.defaults.verify_certificates)
    };

    Ok(ConnectionRequest {
        url,
        identity: global.username.clone(),
        secret: global.password.clone().map(SecretString::from),
        profile,
        verify_certificates,
        use_secure_credentials: config.defaults.use_secure_credentials && !global.no_keyring,
    })
}

async fn report(
    session: &PortalSession,
    args: &ConnectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    use std::io::IsTerminal;

    use owo_colors::OwoColorize;

    let user = session
        .current_user()
        .await
        .map_err(|e| CliError::ConnectionFailed {
            cause: e.to_string(),
        })?;

    if !global.quiet
        && matches!(global.output, crate::cli::OutputFormat::Table)
        && std::io::stdout().is_terminal()
    {
        println!("{}", format!("Connected to {}", session.portal_url()).green());
    }

    let identity = Identity {
        portal: session.portal_url().to_string(),
        username: user.username,
        full_name: user.full_name,
        role: user.role,
        authenticated: session.is_authenticated(),
    };

    let rendered = output::render_single(
        &global.output,
        &identity,
        identity_detail,
        |i| i.username.clone().unwrap_or_default(),
    );
    output::print_output(&rendered, global.quiet);

    if args.info {
        let info = session
            .portal_info()
            .await
            .map_err(|e| CliError::ConnectionFailed {
                cause: e.to_string(),
            })?;
        let rendered = output::render_single(&global.output, &info, portal_detail, |v| {
            v["portalHostname"].as_str().unwrap_or_default().to_string()
        });
        output::print_output(&rendered, global.quiet);
    }

    Ok(())
}

fn identity_detail(identity: &Identity) -> String {
    let mut lines = vec![
        format!("portal:        {}", identity.portal),
        format!(
            "user:          {}",
            identity.username.as_deref().unwrap_or("<anonymous>")
        ),
    ];
    if let Some(full_name) = &identity.full_name {
        lines.push(format!("full name:     {full_name}"));
    }
    if let Some(role) = &identity.role {
        lines.push(format!("role:          {role}"));
    }
    lines.push(format!(
        "authenticated: {}",
        if identity.authenticated { "yes" } else { "no (anonymous)" }
    ));
    lines.join("\n")
}

fn portal_detail(info: &serde_json::Value) -> String {
    let field = |key: &str| info[key].as_str().unwrap_or("<unknown>").to_string();
    [
        format!("portal name:   {}", field("name")),
        format!("hostname:      {}", field("portalHostname")),
        format!("version:       {}", field("currentVersion")),
    ]
    .join("\n")
}
