//! Configuration types for the reconciliation engine
//!
//! Configuration lives in a YAML document owned by the caller and is
//! read-only to the engine for the duration of one invocation. Keys
//! missing from an existing file are backfilled from defaults and the
//! file rewritten, so upgrades never require hand-editing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Default TTL applied to upserted record sets, in seconds
pub const DEFAULT_TTL: u32 = 300;

/// Default SMTP submission port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Which resolver probe implementation the binary should wire in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverMode {
    /// Native recursive resolver using the system configuration
    #[default]
    System,
    /// External lookup tool adapter (`nslookup` output parsing)
    LookupTool,
}

/// The record this engine keeps in sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpec {
    /// DNS zone name (e.g. "example.com")
    pub zone: String,
    /// Relative record set name within the zone (e.g. "home")
    pub name: String,
    /// TTL in seconds for upserted record sets
    pub ttl: u32,
}

impl RecordSpec {
    /// Fully-qualified name of the target record
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.name, self.zone)
    }
}

/// Engine configuration, as stored in `config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory tenant the application is registered in
    #[serde(default)]
    pub tenant_id: String,

    /// Application (client) identifier
    #[serde(default)]
    pub client_id: String,

    /// Subscription holding the DNS zone
    #[serde(default)]
    pub subscription_id: String,

    /// Resource group holding the DNS zone
    #[serde(default)]
    pub resource_group: String,

    /// DNS zone name
    #[serde(default)]
    pub zone_name: String,

    /// Relative record set name within the zone
    #[serde(default)]
    pub record_set_name: String,

    /// TTL in seconds for upserted record sets
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Path to the combined PEM (certificate + private key) used for
    /// provider authentication
    #[serde(default = "default_certificate_path")]
    pub certificate_path: String,

    /// Password for the certificate key, empty when the key is unencrypted
    #[serde(default)]
    pub certificate_password: String,

    /// Notification sender address
    #[serde(default)]
    pub email_from: String,

    /// Notification recipient address
    #[serde(default)]
    pub email_to: String,

    /// SMTP submission server
    #[serde(default)]
    pub smtp_server: String,

    /// SMTP submission port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Default SMTP username offered during interactive setup
    #[serde(default = "default_smtp_username")]
    pub smtp_username: String,

    /// SMTP credential file, resolved against the config directory when
    /// the path is relative
    #[serde(default = "default_smtp_key_file")]
    pub smtp_key_file: String,

    /// Resolver probe implementation to use
    #[serde(default)]
    pub resolver: ResolverMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            subscription_id: String::new(),
            resource_group: String::new(),
            zone_name: String::new(),
            record_set_name: String::new(),
            ttl: default_ttl(),
            certificate_path: default_certificate_path(),
            certificate_password: String::new(),
            email_from: String::new(),
            email_to: String::new(),
            smtp_server: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: default_smtp_username(),
            smtp_key_file: default_smtp_key_file(),
            resolver: ResolverMode::System,
        }
    }
}

impl Config {
    /// Validate the fields a reconciliation pass cannot run without
    ///
    /// Notification fields are deliberately not required; an unconfigured
    /// notifier fails in isolation without affecting reconciliation.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("subscription_id", &self.subscription_id),
            ("resource_group", &self.resource_group),
            ("zone_name", &self.zone_name),
            ("record_set_name", &self.record_set_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!(
                    "required configuration key '{field}' is empty; run with --reconfig"
                )));
            }
        }

        if self.ttl == 0 {
            return Err(Error::config("ttl must be greater than zero"));
        }

        Ok(())
    }

    /// The record this configuration targets
    pub fn record_spec(&self) -> RecordSpec {
        RecordSpec {
            zone: self.zone_name.clone(),
            name: self.record_set_name.clone(),
            ttl: self.ttl,
        }
    }

    /// Resolve the SMTP key file path against the config directory
    pub fn smtp_key_path(&self, config_dir: &Path) -> PathBuf {
        let path = Path::new(&self.smtp_key_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.join(path)
        }
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_certificate_path() -> String {
    "/etc/ssl/private/dnssync-combined.pem".to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_smtp_username() -> String {
    "apikey".to_string()
}

fn default_smtp_key_file() -> String {
    "smtp_auth.key".to_string()
}

/// Load a config file, backfilling missing keys from defaults
///
/// Returns `Ok(None)` when the file does not exist. When keys are
/// missing, defaults are merged in and the file is rewritten so the
/// on-disk document always carries the full key set.
pub fn load_or_backfill(path: &Path) -> Result<Option<Config>, Error> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let mut mapping: serde_yaml::Mapping = if content.trim().is_empty() {
        serde_yaml::Mapping::new()
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?
    };

    let defaults = serde_yaml::to_value(Config::default())
        .map_err(|e| Error::config(format!("failed to serialize defaults: {e}")))?;
    let defaults = defaults
        .as_mapping()
        .expect("default config serializes to a mapping");

    let mut updated = false;
    for (key, value) in defaults {
        if !mapping.contains_key(key) {
            mapping.insert(key.clone(), value.clone());
            updated = true;
        }
    }

    let config: Config = serde_yaml::from_value(serde_yaml::Value::Mapping(mapping.clone()))
        .map_err(|e| Error::config(format!("invalid configuration in {}: {e}", path.display())))?;

    if updated {
        tracing::info!("backfilling missing configuration keys in {}", path.display());
        save(path, &config)?;
    }

    Ok(Some(config))
}

/// Write the configuration document
pub fn save(path: &Path, config: &Config) -> Result<(), Error> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| Error::config(format!("failed to serialize configuration: {e}")))?;
    std::fs::write(path, yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        let loaded = load_or_backfill(&dir.path().join("config.yaml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn partial_file_is_backfilled_and_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "zone_name: example.com\nrecord_set_name: home\ntenant_id: t\n",
        )
        .unwrap();

        let config = load_or_backfill(&path).unwrap().unwrap();
        assert_eq!(config.zone_name, "example.com");
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);

        // The rewritten document carries the backfilled keys.
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("ttl:"));
        assert!(rewritten.contains("smtp_key_file:"));
        assert!(rewritten.contains("zone_name: example.com"));
    }

    #[test]
    fn complete_file_is_left_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        save(&path, &Config::default()).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        load_or_backfill(&path).unwrap().unwrap();
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn validate_requires_record_identity() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.tenant_id = "t".into();
        config.client_id = "c".into();
        config.subscription_id = "s".into();
        config.resource_group = "rg".into();
        config.zone_name = "example.com".into();
        config.record_set_name = "home".into();
        assert!(config.validate().is_ok());

        config.ttl = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn record_spec_builds_fqdn() {
        let record = RecordSpec {
            zone: "example.com".to_string(),
            name: "home".to_string(),
            ttl: 300,
        };
        assert_eq!(record.fqdn(), "home.example.com");
    }

    #[test]
    fn smtp_key_path_resolves_relative_names() {
        let config = Config::default();
        let resolved = config.smtp_key_path(Path::new("/etc/dnssync"));
        assert_eq!(resolved, Path::new("/etc/dnssync/smtp_auth.key"));

        let mut absolute = Config::default();
        absolute.smtp_key_file = "/run/secrets/smtp.key".to_string();
        assert_eq!(
            absolute.smtp_key_path(Path::new("/etc/dnssync")),
            Path::new("/run/secrets/smtp.key")
        );
    }
}
