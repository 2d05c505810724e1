// # dnsrecctl - DNS record command line
//
// A THIN front end over dnsrec-core. Record logic, retries, caching and
// convergence polling all live in the library; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Registers API backends and builds the record manager
// 4. Runs one command, cancelling it on SIGINT/SIGTERM
//
// ## Usage
//
// ```text
// dnsrecctl list [NAME_FILTER]
// dnsrecctl get    TYPE NAME VALUE
// dnsrecctl add    TYPE NAME VALUE
// dnsrecctl remove TYPE NAME VALUE
// ```
//
// `dnsrecctl --help` lists the commands, `dnsrecctl <command> --help`
// describes one.
//
// ## Configuration
//
// - `DNSREC_API_TYPE`: API backend (default: dreamhost)
// - `DNSREC_API_KEY`: API key (required)
// - `DNSREC_API_BASE_URL`: Endpoint override (optional)
// - `DNSREC_RETRY_TIMEOUT_SECS`: Retry and convergence budget (default: 120)
// - `DNSREC_RETRY_DELAY_SECS`: Delay between attempts and poll ticks (default: 5)
// - `DNSREC_RETRY_MIN_DELAY_SECS`: Minimum wait before a poll tick (default: 1)
// - `DNSREC_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
//
// ## Example
//
// ```bash
// export DNSREC_API_KEY=6SHU5P2HLDAYECUM
// dnsrecctl add A www.example.com 192.0.2.1
// ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dnsrec_core::{
    ApiConfig, ApiRegistry, CancellationToken, DnsRecConfig, RecordClient, RecordFilter,
    RecordInput, RecordManager, RetryConfig,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CtlExitCode {
    /// Command completed
    Success = 0,
    /// Usage or configuration error
    ConfigError = 1,
    /// The command failed or was cancelled
    RuntimeError = 2,
}

impl From<CtlExitCode> for ExitCode {
    fn from(code: CtlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "dnsrecctl")]
#[command(version)]
#[command(about = "Create, inspect and remove DNS records through a provider API")]
#[command(after_help = "Configuration is read from DNSREC_* environment variables.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// One command line invocation
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// List records straight from upstream
    List {
        /// Only show records whose name contains this text
        name_filter: Option<String>,
    },
    /// Show one record from the cached listing
    Get(RecordArgs),
    /// Create a record and wait until upstream lists it
    Add(RecordArgs),
    /// Remove a record and wait until upstream drops it
    Remove(RecordArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct RecordArgs {
    /// Record type (A, AAAA, CNAME, ...), case-insensitive
    #[arg(value_name = "TYPE")]
    record_type: String,

    /// Fully qualified record name
    #[arg(value_name = "NAME")]
    name: String,

    /// Record value
    #[arg(value_name = "VALUE")]
    value: String,
}

impl RecordArgs {
    fn to_input(&self) -> RecordInput {
        RecordInput::new(
            self.name.as_str(),
            self.record_type.to_uppercase(),
            self.value.as_str(),
        )
    }
}

/// Application configuration
struct Config {
    api_type: String,
    api_key: String,
    api_base_url: Option<String>,
    retry: RetryConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let defaults = RetryConfig::default();
        Ok(Self {
            api_type: env::var("DNSREC_API_TYPE").unwrap_or_else(|_| "dreamhost".to_string()),
            api_key: env::var("DNSREC_API_KEY").context(
                "DNSREC_API_KEY is required. Set it via: export DNSREC_API_KEY=your_key",
            )?,
            api_base_url: env::var("DNSREC_API_BASE_URL").ok(),
            retry: RetryConfig {
                timeout_secs: env_secs("DNSREC_RETRY_TIMEOUT_SECS", defaults.timeout_secs)?,
                delay_secs: env_secs("DNSREC_RETRY_DELAY_SECS", defaults.delay_secs)?,
                min_delay_secs: env_secs("DNSREC_RETRY_MIN_DELAY_SECS", defaults.min_delay_secs)?,
            },
            log_level: env::var("DNSREC_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!("DNSREC_API_KEY cannot be empty");
        }

        // Catch the common mistake of copying the example verbatim
        let key_lower = self.api_key.to_lowercase();
        if key_lower.contains("your_key") || key_lower.contains("replace_me") {
            anyhow::bail!(
                "DNSREC_API_KEY appears to be a placeholder. \
                Use an actual API key from your DNS provider."
            );
        }

        parse_log_level(&self.log_level)?;

        self.to_dnsrec_config()?
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Library configuration for the selected backend
    fn to_dnsrec_config(&self) -> Result<DnsRecConfig> {
        let api = match self.api_type.as_str() {
            "dreamhost" => ApiConfig::Dreamhost {
                api_key: self.api_key.clone(),
                base_url: self.api_base_url.clone(),
            },
            other => anyhow::bail!(
                "DNSREC_API_TYPE '{}' is not supported. Supported types: dreamhost",
                other
            ),
        };

        Ok(DnsRecConfig {
            api,
            retry: self.retry.clone(),
        })
    }
}

/// Read a whole number of seconds, falling back to `default` when unset
fn env_secs(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds. Got: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DNSREC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let command = match Cli::try_parse() {
        Ok(cli) => cli.command,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() {
                CtlExitCode::ConfigError
            } else {
                CtlExitCode::Success
            };
            let _ = e.print();
            return code.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return CtlExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    // Initialize tracing; stdout is reserved for command output
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CtlExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config, command).await {
            Ok(()) => CtlExitCode::Success,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                CtlExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Build the manager and run one command under a shutdown-aware token
async fn run(config: Config, command: Command) -> Result<()> {
    let registry = ApiRegistry::new();

    #[cfg(feature = "dreamhost")]
    {
        debug!("Registering DreamHost API");
        dnsrec_provider_dreamhost::register(&registry);
    }

    let dnsrec_config = config.to_dnsrec_config()?;
    let api = registry
        .create_api(&dnsrec_config.api)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(api = api.api_name(), "API backend ready");

    let client = Arc::new(RecordClient::new(api));
    let manager = RecordManager::from_config(client, &dnsrec_config.retry);

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(signal) => {
                warn!("Received {}, cancelling", signal);
                watcher.cancel();
            }
            Err(e) => error!("Signal handling error: {}", e),
        }
    });

    execute(&manager, command, &cancel)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}

async fn execute(
    manager: &RecordManager,
    command: Command,
    cancel: &CancellationToken,
) -> dnsrec_core::Result<()> {
    match command {
        Command::List { name_filter } => {
            let mut filter = RecordFilter::new();
            if let Some(name) = name_filter {
                filter = filter.with_name(name);
            }
            let result = manager.list_filtered(&filter).await?;
            for record in &result.records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.record_type, record.name, record.value, record.zone
                );
            }
            info!(count = result.records.len(), query = %result.id, "listed records");
        }
        Command::Get(args) => {
            let input = args.to_input();
            let record = manager
                .read(&input.to_id())
                .await?
                .ok_or_else(|| dnsrec_core::Error::not_found(input.to_string()))?;
            println!("id:       {}", record.to_input().to_id());
            println!("zone:     {}", record.zone);
            println!("editable: {}", record.editable);
            if !record.comment.is_empty() {
                println!("comment:  {}", record.comment);
            }
        }
        Command::Add(args) => match manager.create(args.to_input(), cancel).await {
            Ok(record) => println!("created {}", record.to_input().to_id()),
            Err(e) => {
                if let Some(id) = e.unconfirmed_id() {
                    println!("created {} (unconfirmed)", id);
                }
                return Err(e);
            }
        },
        Command::Remove(args) => {
            let input = args.to_input();
            let outcome = manager.delete(&input, cancel).await?;
            for warning in &outcome.warnings {
                eprintln!("warning: {}", warning);
            }
            println!("removed {}", input.to_id());
        }
    }
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnsrec_core::RecordType;

    fn parse(line: &str) -> std::result::Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("dnsrecctl").chain(line.split_whitespace()))
            .map(|cli| cli.command)
    }

    fn config(api_key: &str) -> Config {
        Config {
            api_type: "dreamhost".to_string(),
            api_key: api_key.to_string(),
            api_base_url: None,
            retry: RetryConfig::default(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("list").unwrap(), Command::List { name_filter: None });
        assert_eq!(
            parse("list www").unwrap(),
            Command::List {
                name_filter: Some("www".to_string())
            }
        );

        match parse("add cname www.example.com example.com").unwrap() {
            Command::Add(args) => {
                let input = args.to_input();
                assert_eq!(input.record_type, RecordType::Cname);
                assert_eq!(input.name, "www.example.com");
                assert_eq!(input.value, "example.com");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        match parse("remove A example.com 192.0.2.1").unwrap() {
            Command::Remove(args) => {
                assert_eq!(args.to_input().to_id(), "A|example.com|192.0.2.1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        use clap::error::ErrorKind;

        let err = parse("").unwrap_err();
        assert!(err.use_stderr());
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );

        assert_eq!(parse("frobnicate").unwrap_err().kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(
            parse("add A example.com").unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(parse("list a b").unwrap_err().kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = parse("--help").unwrap_err();
        assert!(!err.use_stderr());

        let err = parse("add --help").unwrap_err();
        assert!(!err.use_stderr());
    }

    #[test]
    fn test_config_validation() {
        assert!(config("6SHU5P2HLDAYECUM").validate().is_ok());
        assert!(config("").validate().is_err());
        assert!(config("your_key").validate().is_err());

        let mut cfg = config("6SHU5P2HLDAYECUM");
        cfg.api_type = "route53".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = config("6SHU5P2HLDAYECUM");
        cfg.log_level = "loud".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = config("6SHU5P2HLDAYECUM");
        cfg.retry.delay_secs = 500;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CtlExitCode::Success as u8, 0);
        assert_eq!(CtlExitCode::ConfigError as u8, 1);
        assert_eq!(CtlExitCode::RuntimeError as u8, 2);
    }
}
