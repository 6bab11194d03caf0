//! `geoport config` -- show, locate, and bootstrap the config file.

use std::io::IsTerminal;

use geoport_config::{Config, Profile, config_path, load_config_or_default, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = redact(load_config_or_default());
            let rendered = match global.output {
                crate::cli::OutputFormat::Json => output::render_json_pretty(&config),
                crate::cli::OutputFormat::JsonCompact => output::render_json_compact(&config),
                _ => toml::to_string_pretty(&config)
                    .map_err(geoport_config::ConfigError::Serialization)?,
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }

        ConfigCommand::Init { force } => init(*force, global),
    }
}

fn init(force: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config_path();
    if path.exists() && !force && !confirm_overwrite(&path)? {
        return Err(CliError::ConfigExists {
            path: path.display().to_string(),
        });
    }

    let mut config = Config::default();
    config.profiles.insert(
        "default".into(),
        Profile {
            portal: "https://maps.example.com/portal".into(),
            username: None,
            password: None,
            password_env: None,
            verify_certificates: None,
            timeout: None,
        },
    );

    save_config(&config)?;
    if !global.quiet {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Interactive overwrite confirmation; declines automatically when not
/// attached to a terminal so scripts fail loudly instead of hanging.
fn confirm_overwrite(path: &std::path::Path) -> Result<bool, CliError> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    dialoguer::Confirm::new()
        .with_prompt(format!("Overwrite existing config at {}?", path.display()))
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Blank out profile passwords before displaying the config.
fn redact(mut config: Config) -> Config {
    for profile in config.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("<redacted>".into());
        }
    }
    config
}
