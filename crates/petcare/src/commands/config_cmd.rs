//! Config subcommand handlers.

use std::fmt::Write as _;
use std::io::{self, BufRead};

use petcare_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, InitArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Init(init) => {
            let path = config::config_file(global);
            let mut cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);
            cfg.profiles.insert(name.clone(), init_profile(init));
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }

            petcare_config::save_config_to(&cfg, &path)?;
            output::print_output(
                &format!("Wrote profile '{name}' to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }
        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);

            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            let password = line.trim_end_matches(['\r', '\n']);
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "empty input".into(),
                });
            }

            petcare_config::store_password(&name, password)?;
            output::print_output(
                &format!("Stored password for profile '{name}' in the system keyring"),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn init_profile(init: InitArgs) -> Profile {
    Profile {
        email: Some(init.email),
        password_env: init.password_env,
        base_url: init.base_url,
        ..Profile::default()
    }
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "interval = {}", cfg.defaults.interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref email) = p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref url) = p.base_url {
            let _ = writeln!(out, "base_url = \"{url}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(secs) = p.data_rate_limit {
            let _ = writeln!(out, "data_rate_limit = {secs}");
        }
        if let Some(secs) = p.timeline_rate_limit {
            let _ = writeln!(out, "timeline_rate_limit = {secs}");
        }
    }
    out
}
