use anyhow::Result;
use clap::{Parser, Subcommand};

use audited_store::audit::AuditLogger;
use audited_store::cli::{
    handle_audit_command, handle_config_command, handle_export_command,
    handle_local_audit_command, handle_store_command, run_demo, AuditArgs, ExportArgs,
    StoreCommands,
};
use audited_store::config::{ConnectionSettings, Settings, StorePaths};
use audited_store::logging::{init_logging, LogConfig};
use audited_store::repository::AuditedRepository;
use audited_store::store::{ConnectionProvider, LocalProvider};

#[derive(Parser)]
#[command(
    name = "audited-store",
    version,
    about = "Document store access with a forensic audit trail",
    long_about = "audited-store performs create, read, update and delete operations \
                  on a document collection and records who did what, when, with \
                  which filter, and how the store planned each read."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Store(StoreCommands),

    /// Show recent audit entries
    Audit(AuditArgs),

    /// Export the audit trail
    Export(ExportArgs),

    /// Run a create/read/update/delete walk-through
    Demo {
        /// Use throwaway in-memory collections
        #[arg(long)]
        memory: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_env()?)?;

    let paths = StorePaths::new()?;
    let settings = Settings::load_or_create(&paths)?.with_env_overrides();

    match cli.command {
        Some(Commands::Store(cmd)) => {
            let provider = connect(&settings, &paths)?;
            let repo = AuditedRepository::from_provider(&provider, &settings, &paths)?;
            handle_store_command(&repo, cmd)?;
        }
        Some(Commands::Audit(args)) if args.local => {
            let mirror = AuditLogger::new(settings.local_audit_file(&paths));
            handle_local_audit_command(&mirror, &args)?;
        }
        Some(Commands::Audit(args)) => {
            let provider = connect(&settings, &paths)?;
            handle_audit_command(provider.audit_collection().as_ref(), &args)?;
        }
        Some(Commands::Export(args)) => {
            let provider = connect(&settings, &paths)?;
            handle_export_command(
                provider.audit_collection().as_ref(),
                &settings.collection,
                &args,
            )?;
        }
        Some(Commands::Demo { memory }) => {
            let provider = if memory {
                LocalProvider::in_memory(&settings)
            } else {
                connect(&settings, &paths)?
            };
            let repo = AuditedRepository::from_provider(&provider, &settings, &paths)?;
            run_demo(&repo)?;
        }
        Some(Commands::Config) => {
            handle_config_command(&paths, &settings)?;
        }
        None => {
            println!("audited-store - document store access with an audit trail");
            println!();
            println!("Run 'audited-store --help' for usage information.");
            println!("Run 'audited-store demo --memory' for a walk-through.");
        }
    }

    Ok(())
}

/// Missing credentials are fatal here, before any command runs
fn connect(settings: &Settings, paths: &StorePaths) -> Result<LocalProvider> {
    let descriptor = ConnectionSettings::from_env()?.resolve()?;
    Ok(LocalProvider::connect(&descriptor, settings, paths)?)
}
