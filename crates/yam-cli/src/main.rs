//! yam command line driver.
//!
//! Runs the launcher core against a JSON platform fixture so the registry,
//! filter pipeline and shortcut slots can be exercised from a terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use yam_core::config::Directories;
use yam_core::platform::{PlatformFixture, StaticPlatform};
use yam_core::search::FilterRequest;
use yam_core::{Error, YamCore};
use yam_types::{DefaultAction, ProfileId, TargetId, TargetRef};

#[derive(Parser)]
#[command(name = "yam")]
#[command(version, about = "Minimal launcher core", long_about = None)]
#[command(after_help = "EXAMPLES:
    yam --fixture phone.json targets        List launchable targets
    yam --fixture phone.json filter cal     Filter targets by a query
    yam slots set 0 Mail org.mail/.Inbox    Bind slot 0 to an app
    yam slots launch 0                      Resolve slot 0
    yam watch                               Follow registry refreshes")]
struct Cli {
    /// Platform fixture describing installed apps and contacts
    #[arg(long, global = true, value_name = "FILE")]
    fixture: Option<PathBuf>,

    /// Store config and slots under this directory instead of the user dirs
    #[arg(long, global = true, value_name = "DIR")]
    base: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current launch targets
    Targets {
        /// Include hidden targets
        #[arg(long)]
        hidden: bool,
    },

    /// Run one filter pass
    Filter {
        /// Search text (empty shows everything)
        #[arg(default_value = "")]
        query: String,
        /// Search contacts instead of apps
        #[arg(long)]
        contacts: bool,
        /// Include hidden targets
        #[arg(long)]
        hidden: bool,
        /// Filter as a slot binding session (no auto-launch)
        #[arg(long)]
        binding: bool,
    },

    /// Shortcut slot management
    Slots {
        #[command(subcommand)]
        command: SlotsCommand,
    },

    /// Resolve the handler for a default action
    Default {
        #[command(subcommand)]
        action: DefaultCommand,
    },

    /// Per-target label aliases
    Alias {
        #[command(subcommand)]
        command: AliasCommand,
    },

    /// Hide a target from the app list
    Hide {
        component: String,
        #[arg(long, default_value_t = 0)]
        profile: ProfileId,
    },

    /// Show a previously hidden target again
    Unhide {
        component: String,
        #[arg(long, default_value_t = 0)]
        profile: ProfileId,
    },

    /// Run the refresh loop and print every published snapshot
    Watch,
}

#[derive(Subcommand)]
enum SlotsCommand {
    /// List all slots
    List,

    /// Bind a slot to an app
    Set {
        index: usize,
        label: String,
        component: String,
        #[arg(long, default_value_t = 0)]
        profile: ProfileId,
    },

    /// Bind a slot to a contact
    SetContact {
        index: usize,
        label: String,
        contact_id: i64,
    },

    /// Rename a bound slot
    Rename { index: usize, label: String },

    /// Clear a slot
    Clear { index: usize },

    /// Lock shortcut editing
    Lock,

    /// Unlock shortcut editing
    Unlock,

    /// Resolve what a tap on the slot would launch
    Launch { index: usize },
}

#[derive(Subcommand)]
enum DefaultCommand {
    /// Web search for a query
    Search { query: String },
    Calendar,
    Clock,
}

#[derive(Subcommand)]
enum AliasCommand {
    /// Set an alias
    Set {
        component: String,
        label: String,
        #[arg(long, default_value_t = 0)]
        profile: ProfileId,
    },

    /// Remove an alias
    Clear {
        component: String,
        #[arg(long, default_value_t = 0)]
        profile: ProfileId,
    },
}

/// Set up logging with file output for debugging.
/// In debug builds, defaults to debug level and also logs to a timestamped
/// file. Logs always go to stderr so stdout stays machine readable.
fn setup_logging() {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("yam={default_level},yam_core={default_level}")));

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("yam-{timestamp}.log");

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Keep the writer alive for the whole process
        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter)
            .init();
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let mut core = open_core(&cli)?;

    match cli.command {
        Commands::Targets { hidden } => run_targets(&core, hidden),
        Commands::Filter {
            query,
            contacts,
            hidden,
            binding,
        } => {
            let request = if contacts {
                FilterRequest::contacts(query)
            } else {
                FilterRequest::apps(query)
            };
            print_json(
                &core.filter(&request.with_hidden(hidden).with_binding_session(binding)),
            )
        }
        Commands::Slots { command } => run_slots(&mut core, command),
        Commands::Default { action } => run_default(&core, action),
        Commands::Alias { command } => run_alias(&core, command),
        Commands::Hide { component, profile } => run_hidden(&core, component, profile, true),
        Commands::Unhide { component, profile } => run_hidden(&core, component, profile, false),
        Commands::Watch => run_watch(&core).await,
    }
}

fn open_core(cli: &Cli) -> Result<YamCore> {
    let platform = match &cli.fixture {
        Some(path) => StaticPlatform::load(path)
            .with_context(|| format!("Failed to load fixture {}", path.display()))?,
        None => StaticPlatform::new(PlatformFixture::default()),
    };

    let dirs = match &cli.base {
        Some(base) => Directories::with_base(base.clone()),
        None => Directories::new().context("Failed to resolve user directories")?,
    };
    debug!("Using config file {}", dirs.config_file.display());

    YamCore::new(Arc::new(platform), dirs).context("Failed to open launcher state")
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prefer the user-facing notice text when the error has one
fn report(err: Error) -> anyhow::Error {
    match err.notice() {
        Some(notice) => anyhow!(notice.message()),
        None => err.into(),
    }
}

fn run_targets(core: &YamCore, hidden: bool) -> Result<()> {
    let snapshot = if hidden {
        core.registry().enumerate(true).map_err(report)?
    } else {
        core.refresh()
    };
    print_json(&snapshot.to_vec())
}

fn run_slots(core: &mut YamCore, command: SlotsCommand) -> Result<()> {
    match command {
        SlotsCommand::List => {
            for (index, slot) in core.shortcuts().iter().enumerate() {
                match (slot.label(), slot.target()) {
                    (Some(label), Some(TargetRef::App { component, profile })) => {
                        println!("{index}: {label} -> {component} (profile {profile})");
                    }
                    (Some(label), Some(TargetRef::Contact { contact_id })) => {
                        println!("{index}: {label} -> contact {contact_id}");
                    }
                    _ => println!("{index}: (empty)"),
                }
            }
            if core.shortcuts_locked() {
                println!("(locked)");
            }
            Ok(())
        }
        SlotsCommand::Set {
            index,
            label,
            component,
            profile,
        } => {
            core.bind_shortcut(index, &label, TargetRef::app(component, profile))
                .map_err(report)?;
            info!("Slot {} bound", index);
            Ok(())
        }
        SlotsCommand::SetContact {
            index,
            label,
            contact_id,
        } => core
            .bind_shortcut(index, &label, TargetRef::contact(contact_id))
            .map_err(report),
        SlotsCommand::Rename { index, label } => {
            core.rename_shortcut(index, &label).map_err(report)
        }
        SlotsCommand::Clear { index } => core.clear_shortcut(index).map_err(report),
        SlotsCommand::Lock => core.set_shortcuts_locked(true).map_err(report),
        SlotsCommand::Unlock => core.set_shortcuts_locked(false).map_err(report),
        SlotsCommand::Launch { index } => {
            let launch = core.launch_slot(index).map_err(report)?;
            print_json(&launch)
        }
    }
}

fn run_default(core: &YamCore, action: DefaultCommand) -> Result<()> {
    let action = match action {
        DefaultCommand::Search { query } => DefaultAction::WebSearch { query },
        DefaultCommand::Calendar => DefaultAction::Calendar,
        DefaultCommand::Clock => DefaultAction::Clock,
    };
    let handle = core.launch_default(&action).map_err(report)?;
    print_json(&handle)
}

fn run_alias(core: &YamCore, command: AliasCommand) -> Result<()> {
    match command {
        AliasCommand::Set {
            component,
            label,
            profile,
        } => core
            .set_alias(&TargetId::new(component, profile), &label)
            .map_err(report),
        AliasCommand::Clear { component, profile } => {
            let id = TargetId::new(component, profile);
            if !core.clear_alias(&id).map_err(report)? {
                bail!("No alias set for {id}");
            }
            Ok(())
        }
    }
}

fn run_hidden(core: &YamCore, component: String, profile: ProfileId, hidden: bool) -> Result<()> {
    let id = TargetId::new(component, profile);
    if !core.set_hidden(&id, hidden).map_err(report)? {
        let state = if hidden { "hidden" } else { "visible" };
        eprintln!("{id} is already {state}");
    }
    Ok(())
}

async fn run_watch(core: &YamCore) -> Result<()> {
    let mut rx = core.subscribe();
    let host = core.start();
    eprintln!("Watching registry (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                print_json(&snapshot.to_vec())?;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    host.shutdown().await;
    info!("Watch stopped");
    Ok(())
}
