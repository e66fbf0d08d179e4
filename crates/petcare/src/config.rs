//! CLI-aware wrappers over `petcare-config`: `--config`, `--profile` and
//! `--timeout` take precedence over the file.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use petcare_config::{Config, Profile};
use petcare_core::PetcareConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(petcare_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(petcare_config::load_config_from(&config_file(global))?)
}

pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the runtime config for the active profile.
///
/// With no matching profile, an explicitly requested one is an error;
/// otherwise an empty profile is used so `PETCARE_EMAIL` /
/// `PETCARE_PASSWORD` alone are enough.
pub fn build_petcare_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(String, PetcareConfig), CliError> {
    let name = active_profile_name(global, cfg);
    let fallback = Profile::default();
    let profile = match cfg.profiles.get(&name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                path: config_file(global).display().to_string(),
            });
        }
        None => &fallback,
    };

    let mut config = petcare_config::profile_to_petcare_config(profile, &name, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok((name, config))
}

/// `--output` if given, else the config file's `defaults.output`.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "expected table, json, json-compact or plain, got '{}'",
            cfg.defaults.output
        ),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["petcare"];
        argv.extend_from_slice(args);
        argv.push("flaps");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn config_default_output_applies_without_flag() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json-compact".into();
        assert_eq!(
            output_format(&global(&[]), &cfg).unwrap(),
            OutputFormat::JsonCompact
        );
        assert_eq!(
            output_format(&global(&["-o", "plain"]), &cfg).unwrap(),
            OutputFormat::Plain
        );
    }

    #[test]
    fn invalid_default_output_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert!(matches!(
            output_format(&global(&[]), &cfg),
            Err(CliError::Validation { .. })
        ));
    }
}
