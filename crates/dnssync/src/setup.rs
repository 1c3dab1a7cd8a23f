//! Interactive configuration sequence
//!
//! Prompts for every configuration key with the current (or default)
//! value offered in brackets, writes `config.yaml`, and stores the SMTP
//! credential key file with owner-only permissions. Used by `--reconfig`
//! and by a first run on an interactive terminal.

use anyhow::{Context, Result};
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use dnssync_core::config::{self, Config};

use crate::Paths;

/// Whether both stdin and stdout are attached to a terminal
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Run the full prompt sequence and persist the results
pub fn run_interactive(paths: &Paths) -> Result<()> {
    // Seed prompts from the existing installation where possible.
    let mut defaults = config::load_or_backfill(&paths.config_file())?.unwrap_or_default();
    if let Some(username) = stored_smtp_username(&defaults.smtp_key_path(paths.dir())) {
        defaults.smtp_username = username;
    }

    println!("\n--- DNS Sync Initial Configuration ---\n");

    println!("Provider configuration:");
    let mut config = defaults.clone();
    config.tenant_id = prompt("Tenant ID", &defaults.tenant_id)?;
    config.client_id = prompt("Application ID", &defaults.client_id)?;
    config.subscription_id = prompt("Subscription ID", &defaults.subscription_id)?;
    config.resource_group = prompt("Resource Group", &defaults.resource_group)?;
    config.zone_name = prompt("Zone Name", &defaults.zone_name)?;
    config.record_set_name = prompt("Record Set Name", &defaults.record_set_name)?;
    config.ttl = prompt_parsed("TTL", defaults.ttl)?;
    config.certificate_path = prompt(
        "Path to provider app certificate",
        &defaults.certificate_path,
    )?;
    config.certificate_password =
        rpassword::prompt_password("Certificate password (if any, else leave blank): ")?;

    println!("\nEmail/SMTP configuration:");
    config.email_from = prompt("Email Address From", &defaults.email_from)?;
    config.email_to = prompt("Email Address To", &defaults.email_to)?;
    config.smtp_server = prompt("SMTP Server", &defaults.smtp_server)?;
    config.smtp_port = prompt_parsed("SMTP Port", defaults.smtp_port)?;

    prompt_and_store_smtp_key(paths, &config)?;

    config::save(&paths.config_file(), &config)?;
    println!("\nConfiguration complete! All settings saved.\n");
    Ok(())
}

/// Prompt for the SMTP credential pair and write the key file
///
/// The file is created with owner-only permissions; the transport reads
/// it back through the CredentialSource seam at notification time.
pub fn prompt_and_store_smtp_key(paths: &Paths, config: &Config) -> Result<()> {
    println!("\n--- SMTP Credentials ---\n");
    let username = prompt("SMTP Username", &config.smtp_username)?;
    let password = rpassword::prompt_password("SMTP API key or password: ")?;

    let path = config.smtp_key_path(paths.dir());
    std::fs::write(&path, format!("username:{username}\npassword:{password}\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    restrict_to_owner(&path)?;

    println!(
        "SMTP credentials saved to {} (permissions set to 600)",
        path.display()
    );
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

/// Username stored in an existing key file, if any
fn stored_smtp_username(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("username:"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Prompt with the default offered in brackets; empty input keeps it
fn prompt(label: &str, default: &str) -> Result<String> {
    print!("{label} [{default}]: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

/// Prompt for a numeric value; unparseable input keeps the default
fn prompt_parsed<T>(label: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let answer = prompt(label, &default.to_string())?;
    Ok(answer.parse().unwrap_or_else(|_| {
        eprintln!("Could not parse {answer:?}; keeping {default}");
        default
    }))
}
