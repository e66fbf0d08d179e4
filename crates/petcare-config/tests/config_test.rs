#![allow(clippy::unwrap_used)]
// Loading, saving and credential resolution for petcare-config.

use std::path::Path;
use std::time::Duration;

use figment::Jail;
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use petcare_config::{
    Config, ConfigError, Defaults, Profile, load_config_from, profile_to_petcare_config,
    resolve_email, resolve_password, save_config_to,
};

const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
email = "owner@example.com"
password_env = "HOME_PETCARE_PW"
base_url = "http://127.0.0.1:8080/api/"
data_rate_limit = 60
retry_budget = 1
"#;

#[test]
fn test_missing_file_yields_defaults() {
    Jail::expect_with(|_jail| {
        let config = load_config_from(Path::new("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.output, "table");
        assert_eq!(config.defaults.timeout, 35);
        assert!(config.profiles.is_empty());
        Ok(())
    });
}

#[test]
fn test_file_values_override_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", SAMPLE)?;
        let config = load_config_from(Path::new("config.toml")).unwrap();

        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.interval, 300);
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        let profile = &config.profiles["home"];
        assert_eq!(profile.email.as_deref(), Some("owner@example.com"));
        assert_eq!(profile.retry_budget, Some(1));
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", SAMPLE)?;
        jail.set_env("PETCARE_DEFAULTS_OUTPUT", "plain");
        jail.set_env("PETCARE_PROFILES_HOME_TIMEOUT", "5");

        let config = load_config_from(Path::new("config.toml")).unwrap();
        assert_eq!(config.defaults.output, "table");
        assert_eq!(config.profiles["home"].timeout, Some(5));
        Ok(())
    });
}

#[test]
fn test_password_env_takes_precedence() {
    Jail::expect_with(|jail| {
        jail.set_env("HOME_PETCARE_PW", "from-env");
        let profile = Profile {
            password: Some("plaintext".into()),
            password_env: Some("HOME_PETCARE_PW".into()),
            ..Profile::default()
        };
        let password = resolve_password(&profile, "home").unwrap();
        assert_eq!(password.expose_secret(), "from-env");
        Ok(())
    });
}

#[test]
fn test_email_falls_back_to_env() {
    Jail::expect_with(|jail| {
        let profile = Profile::default();
        assert!(matches!(
            resolve_email(&profile, "home"),
            Err(ConfigError::NoCredentials { .. })
        ));

        jail.set_env("PETCARE_EMAIL", "env@example.com");
        assert_eq!(resolve_email(&profile, "home").unwrap(), "env@example.com");
        Ok(())
    });
}

#[test]
fn test_profile_translates_to_runtime_config() {
    Jail::expect_with(|jail| {
        jail.set_env("HOME_PETCARE_PW", "secret");
        jail.create_file("config.toml", SAMPLE)?;
        let config = load_config_from(Path::new("config.toml")).unwrap();
        let profile = &config.profiles["home"];

        let runtime = profile_to_petcare_config(profile, "home", &config.defaults).unwrap();
        assert_eq!(runtime.base_url.as_str(), "http://127.0.0.1:8080/api/");
        assert_eq!(runtime.auth.email, "owner@example.com");
        assert_eq!(runtime.auth.password.expose_secret(), "secret");
        assert_eq!(runtime.timeout, Duration::from_secs(35));
        assert_eq!(runtime.data_rate_limit, Duration::from_secs(60));
        assert_eq!(runtime.timeline_rate_limit, Duration::from_secs(300));
        assert_eq!(runtime.retry_budget, 1);
        Ok(())
    });
}

#[test]
fn test_invalid_base_url_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("PETCARE_PASSWORD", "pw");
        let profile = Profile {
            email: Some("a@b.c".into()),
            base_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_petcare_config(&profile, "home", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "base_url"));
        Ok(())
    });
}

#[test]
fn test_save_then_load_preserves_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.profiles.insert(
        "default".into(),
        Profile {
            email: Some("owner@example.com".into()),
            timeline_rate_limit: Some(120),
            ..Profile::default()
        },
    );
    save_config_to(&config, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("owner@example.com"));

    let loaded: Config = toml::from_str(&written).unwrap();
    assert_eq!(loaded.profiles["default"].timeline_rate_limit, Some(120));
}
