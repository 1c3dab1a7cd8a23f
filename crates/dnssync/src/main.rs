// # dnssync - one-shot DNS reconciliation
//
// The binary is a thin wiring layer: it loads configuration, builds
// the collaborators, and hands them to the Reconciler in dnssync-core
// for exactly one pass. No business logic lives here.
//
// Designed to be run from a systemd timer or cron; there is no internal
// scheduler and the process always terminates. The external trigger is
// also the retry mechanism: a run that accomplishes nothing simply
// leaves the work for the next invocation.
//
// ## Invocations
//
// - `dnssync`: one reconciliation pass (prompts for initial
//   configuration when run interactively without one)
// - `dnssync --reconfig`: interactive configuration sequence
// - `dnssync --version`: version query
//
// ## Files
//
// All state lives under the config directory (default `/etc/dnssync`,
// override with `--config-dir`): `config.yaml`, `last_ip.txt`,
// `update.log`, and the SMTP key file.
//
// ## Exit codes
//
// - 0: normal completion, including no-ops and failures the engine
//   logged and absorbed (observation failure, provider write failure)
// - 1: startup or runtime error (unreadable configuration, audit log
//   unwritable)
// - 2: configuration required but no interactive terminal available

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use dnssync_core::config::{self, Config, ResolverMode};
use dnssync_core::traits::{KeyFileCredentials, ResolverProbe};
use dnssync_core::{FileAuditLog, FileStateStore, Outcome, Reconciler};
use dnssync_gateway_azure::{AzureDnsGateway, ClientCertificateCredential};
use dnssync_notify_smtp::{SmtpNotifier, SmtpSettings};
use dnssync_observer_http::HttpAddressObserver;
use dnssync_resolver::{LookupToolProbe, SystemResolverProbe};

mod setup;

/// Default directory for configuration and engine state
const DEFAULT_CONFIG_DIR: &str = "/etc/dnssync";

#[derive(Parser)]
#[command(
    name = "dnssync",
    version,
    about = "Keeps a dynamic DNS A record in sync with the caller's public address"
)]
struct Cli {
    /// Run the interactive configuration sequence and exit
    #[arg(long)]
    reconfig: bool,

    /// Directory holding config.yaml, last_ip.txt, update.log and the
    /// SMTP key file
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,
}

/// Exit codes for the different termination scenarios
#[derive(Debug, Clone, Copy)]
enum RunExitCode {
    /// Normal completion, including logged non-fatal failures
    Clean = 0,
    /// Startup or runtime error
    Error = 1,
    /// Configuration required but no interactive terminal available
    SetupRequired = 2,
}

impl From<RunExitCode> for ExitCode {
    fn from(code: RunExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Paths under the config directory
pub struct Paths {
    dir: PathBuf,
}

impl Paths {
    fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join("config.yaml")
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir.join("last_ip.txt")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.join("update.log")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match std::env::var("DNSSYNC_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return RunExitCode::Error.into();
    }

    if let Err(e) = std::fs::create_dir_all(&cli.config_dir) {
        eprintln!(
            "Failed to create config directory {}: {e}",
            cli.config_dir.display()
        );
        return RunExitCode::Error.into();
    }
    let paths = Paths::new(cli.config_dir);

    if cli.reconfig {
        println!("Running interactive configuration...");
        return match setup::run_interactive(&paths) {
            Ok(()) => {
                println!("Configuration updated successfully!");
                RunExitCode::Clean.into()
            }
            Err(e) => {
                eprintln!("Configuration failed: {e}");
                RunExitCode::Error.into()
            }
        };
    }

    let config = match load_configuration(&paths) {
        Ok(Some(config)) => config,
        Ok(None) => return RunExitCode::SetupRequired.into(),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return RunExitCode::Error.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return RunExitCode::Error.into();
    }

    // Enter tokio runtime for the single pass
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return RunExitCode::Error.into();
        }
    };

    match rt.block_on(run_once(&paths, config)) {
        Ok(outcome) => {
            match outcome {
                Outcome::InSync { address } => {
                    info!("already in sync ({address}); nothing to do")
                }
                Outcome::Committed { address, .. } => {
                    info!("provider record updated to {address}")
                }
                Outcome::WriteFailed { address } => {
                    warn!("provider update to {address} failed; will retry on the next run")
                }
                Outcome::Aborted => {
                    warn!("public address unavailable; nothing accomplished this cycle")
                }
            }
            RunExitCode::Clean.into()
        }
        Err(e) => {
            error!("reconciliation error: {e}");
            RunExitCode::Error.into()
        }
    }
}

/// Load configuration, running first-time setup when possible
///
/// Returns `Ok(None)` when configuration is required but no interactive
/// terminal is available.
fn load_configuration(paths: &Paths) -> anyhow::Result<Option<Config>> {
    if let Some(config) = config::load_or_backfill(&paths.config_file())? {
        // An existing installation may predate the key file; only an
        // interactive run can create it. Otherwise notification simply
        // fails in isolation later.
        if setup::is_interactive() && !config.smtp_key_path(paths.dir()).exists() {
            setup::prompt_and_store_smtp_key(paths, &config)?;
        }
        return Ok(Some(config));
    }

    if !setup::is_interactive() {
        eprintln!("ERROR: No configuration found and no interactive terminal detected.");
        eprintln!(
            "Run `dnssync --reconfig --config-dir {}` in an interactive shell to complete initial setup.",
            paths.dir().display()
        );
        return Ok(None);
    }

    setup::run_interactive(paths)?;
    Ok(config::load_or_backfill(&paths.config_file())?)
}

/// Build the collaborators and perform one reconciliation pass
async fn run_once(paths: &Paths, config: Config) -> dnssync_core::Result<Outcome> {
    let record = config.record_spec();
    info!("reconciling {}", record.fqdn());

    let observer = HttpAddressObserver::default();

    let resolver: Box<dyn ResolverProbe> = match config.resolver {
        ResolverMode::System => match SystemResolverProbe::from_system_conf() {
            Ok(probe) => Box::new(probe),
            Err(e) => {
                warn!("system resolver unavailable ({e}); falling back to the lookup tool");
                Box::new(LookupToolProbe::new())
            }
        },
        ResolverMode::LookupTool => Box::new(LookupToolProbe::new()),
    };

    let password = (!config.certificate_password.is_empty())
        .then(|| config.certificate_password.clone());
    let credential = Arc::new(ClientCertificateCredential::new(
        &config.tenant_id,
        &config.client_id,
        &config.certificate_path,
        password,
    ));
    let gateway = AzureDnsGateway::new(
        &config.subscription_id,
        &config.resource_group,
        credential,
    );

    let state = FileStateStore::new(paths.state_file());
    let audit = FileAuditLog::new(paths.log_file());

    let notifier = SmtpNotifier::new(
        SmtpSettings {
            server: config.smtp_server.clone(),
            port: config.smtp_port,
            from: config.email_from.clone(),
            to: config.email_to.clone(),
        },
        Box::new(KeyFileCredentials::new(config.smtp_key_path(paths.dir()))),
    );

    let reconciler = Reconciler::new(
        record,
        Box::new(observer),
        resolver,
        Box::new(gateway),
        Box::new(state),
        Box::new(audit),
        Box::new(notifier),
    );

    reconciler.run().await
}
