//! Profile configuration for Omada controller connections.
//!
//! TOML profiles, environment overrides, credential resolution
//! (env + keyring + plaintext), and translation into the transport and
//! client settings `omada-api` needs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use omada_api::{DEFAULT_PAGE_SIZE, DEFAULT_SITE, OmadaClient, TlsMode, TransportConfig};

/// Keyring service name; entries are keyed `{profile}/password`.
const KEYRING_SERVICE: &str = "omada";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("profile '{profile}' has no username or password available")]
    NoCredentials { profile: String },

    #[error("could not write config as TOML: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("could not load config: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── File layout ─────────────────────────────────────────────────────

/// Contents of `config.toml`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Controller profiles keyed by name.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// One controller: where it lives, which site, and how to log in.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller host, `host[:port]` or a full URL. The API base URL is
    /// discovered from its login redirect.
    pub host: String,

    #[serde(default = "default_site")]
    pub site: String,

    pub username: Option<String>,

    /// Plaintext password (prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip certificate verification (self-signed controllers).
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Default page size for paged listings.
    pub page_size: Option<u32>,
}

fn default_site() -> String {
    DEFAULT_SITE.into()
}

// ── Locations ───────────────────────────────────────────────────────

/// `config.toml` under the platform config directory, falling back to
/// `~/.config/omada` and finally the working directory.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "omada", "omada")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .or_else(|| BaseDirs::new().map(|base| base.home_dir().join(".config").join("omada")))
        .unwrap_or_else(|| PathBuf::from(".omada"))
        .join("config.toml")
}

// ── Load / save ─────────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path`, layered as defaults → file → `OMADA_*`
/// environment variables (nested keys separated by `__`, e.g.
/// `OMADA_DEFAULTS__PAGE_SIZE`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!("loading config from {}", path.display());

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OMADA_").split("__"));

    Ok(figment.extract()?)
}

/// [`load_config`], or an empty config when loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(cfg)?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, rendered)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

impl Config {
    /// Look up `name`, or the default profile when `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

impl Config {
    /// Resolve `name` (or the default profile) into connection settings.
    pub fn settings(&self, name: Option<&str>) -> Result<ConnectionSettings, ConfigError> {
        let (profile_name, profile) = self.profile(name)?;
        profile_settings(self, profile, profile_name)
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve username + password for `profile`.
///
/// Username: profile, then `OMADA_USERNAME`. Password: the variable named
/// by `password_env`, then `OMADA_PASSWORD`, then the system keyring,
/// then plaintext in the profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    resolve_credentials_with(
        profile,
        profile_name,
        |var| std::env::var(var).ok(),
        keyring_password,
    )
}

/// [`resolve_credentials`] with the environment and keyring lookups
/// supplied by the caller.
fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| env("OMADA_USERNAME"))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = profile
        .password_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env("OMADA_PASSWORD"))
        .or_else(|| keyring(profile_name))
        .or_else(|| profile.password.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    Ok((username, SecretString::from(password)))
}

fn keyring_password(profile_name: &str) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")).ok()?;
    match entry.get_password() {
        Ok(pw) => Some(pw),
        Err(err) => {
            debug!(profile = profile_name, "no keyring password: {err}");
            None
        }
    }
}

// ── Translation to client settings ──────────────────────────────────

/// Everything needed to open an authenticated client for one profile.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub site: String,
    pub page_size: u32,
    pub transport: TransportConfig,
    pub username: String,
    pub password: SecretString,
}

impl ConnectionSettings {
    /// Discover the controller's API, log in, and hand back the client.
    pub async fn connect(&self) -> Result<OmadaClient, omada_api::Error> {
        let client = OmadaClient::connect(&self.host, self.site.clone(), &self.transport)
            .await?
            .with_page_size(self.page_size);
        client.login(&self.username, &self.password).await?;
        Ok(client)
    }
}

/// Build connection settings from a profile, applying global defaults.
pub fn profile_settings(
    config: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<ConnectionSettings, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let page_size = profile.page_size.unwrap_or(config.defaults.page_size);
    if page_size == 0 {
        return Err(ConfigError::Validation {
            field: "page_size".into(),
            reason: "must be at least 1".into(),
        });
    }

    let (username, password) = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(config.defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout));

    Ok(ConnectionSettings {
        host: profile.host.clone(),
        site: profile.site.clone(),
        page_size,
        transport: TransportConfig {
            tls,
            timeout,
            cookie_jar: None,
        },
        username,
        password,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 10
page_size = 200

[profiles.lab]
host = "omada.lab:8043"
username = "admin"
password = "hunter2"
insecure = true

[profiles.office]
host = "https://omada.office"
site = "HQ"
username = "ops"
password = "s3cret"
ca_cert = "/etc/omada/ca.pem"
page_size = 50
timeout = 5
"#;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_profiles_and_defaults_from_file() {
        let (_dir, path) = write_config(SAMPLE);
        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.page_size, 200);
        assert_eq!(cfg.profiles.len(), 2);

        let lab = &cfg.profiles["lab"];
        assert_eq!(lab.host, "omada.lab:8043");
        assert_eq!(lab.site, DEFAULT_SITE);
        assert_eq!(lab.insecure, Some(true));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                host: "10.0.0.2".into(),
                site: "Branch".into(),
                username: Some("admin".into()),
                page_size: Some(25),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = &loaded.profiles["default"];
        assert_eq!(profile.host, "10.0.0.2");
        assert_eq!(profile.site, "Branch");
        assert_eq!(profile.page_size, Some(25));
        assert_eq!(profile.password, None);
    }

    #[test]
    fn profile_lookup_falls_back_to_default_profile() {
        let (_dir, path) = write_config(SAMPLE);
        let cfg = load_config_from(&path).unwrap();

        let (name, _) = cfg.profile(None).unwrap();
        assert_eq!(name, "lab");
        let (name, profile) = cfg.profile(Some("office")).unwrap();
        assert_eq!(name, "office");
        assert_eq!(profile.site, "HQ");

        let err = cfg.profile(Some("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { ref profile } if profile == "missing"));
    }

    #[test]
    fn settings_apply_profile_overrides() {
        let (_dir, path) = write_config(SAMPLE);
        let cfg = load_config_from(&path).unwrap();

        let office = cfg.settings(Some("office")).unwrap();
        assert_eq!(office.host, "https://omada.office");
        assert_eq!(office.site, "HQ");
        assert_eq!(office.page_size, 50);
        assert_eq!(office.transport.timeout, Duration::from_secs(5));
        assert_eq!(
            office.transport.tls,
            TlsMode::CustomCa(PathBuf::from("/etc/omada/ca.pem"))
        );
        assert_eq!(office.username, "ops");
    }

    #[test]
    fn settings_fall_back_to_global_defaults() {
        let (_dir, path) = write_config(SAMPLE);
        let cfg = load_config_from(&path).unwrap();

        let lab = cfg.settings(None).unwrap();
        assert_eq!(lab.site, DEFAULT_SITE);
        assert_eq!(lab.page_size, 200);
        assert_eq!(lab.transport.timeout, Duration::from_secs(10));
        assert_eq!(lab.transport.tls, TlsMode::DangerAcceptInvalid);
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn credential_profile() -> Profile {
        Profile {
            host: "omada.test".into(),
            username: Some("admin".into()),
            password: Some("plaintext".into()),
            password_env: Some("LAB_PASSWORD".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn plaintext_password_is_the_last_resort() {
        let (user, pw) =
            resolve_credentials_with(&credential_profile(), "lab", lookup(&[]), lookup(&[]))
                .unwrap();
        assert_eq!(user, "admin");
        assert_eq!(pw.expose_secret(), "plaintext");
    }

    #[test]
    fn password_sources_resolve_in_priority_order() {
        let profile = credential_profile();
        let keyring = lookup(&[("lab", "from-keyring")]);

        let all_env = lookup(&[
            ("LAB_PASSWORD", "from-profile-env"),
            ("OMADA_PASSWORD", "from-env"),
        ]);
        let (_, pw) = resolve_credentials_with(&profile, "lab", all_env, &keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");

        let shared_env = lookup(&[("OMADA_PASSWORD", "from-env")]);
        let (_, pw) = resolve_credentials_with(&profile, "lab", shared_env, &keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-env");

        let (_, pw) = resolve_credentials_with(&profile, "lab", lookup(&[]), &keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");
    }

    #[test]
    fn username_falls_back_to_env_and_missing_password_errors() {
        let profile = Profile {
            host: "omada.test".into(),
            ..Profile::default()
        };
        let env = lookup(&[("OMADA_USERNAME", "ops")]);
        let err = resolve_credentials_with(&profile, "bare", env, lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "bare"));

        let env = lookup(&[("OMADA_USERNAME", "ops"), ("OMADA_PASSWORD", "pw")]);
        let (user, _) = resolve_credentials_with(&profile, "bare", env, lookup(&[])).unwrap();
        assert_eq!(user, "ops");
    }

    #[test]
    fn empty_host_is_rejected() {
        let cfg = Config::default();
        let profile = Profile {
            host: "  ".into(),
            username: Some("admin".into()),
            password: Some("pw".into()),
            ..Profile::default()
        };
        let err = profile_settings(&cfg, &profile, "blank").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let cfg = Config::default();
        let profile = Profile {
            host: "omada.test".into(),
            page_size: Some(0),
            ..Profile::default()
        };
        let err = profile_settings(&cfg, &profile, "zero").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "page_size"));
    }
}
