//! CLI interface.
//!
//! `clap`-based commands over the updater tool. The bare binary runs the
//! demo flow, matching the original program; the remaining subcommands
//! expose the registry for inspection and the agent endpoint for the
//! browser driver.

use crate::agent::{self, AgentError, AgentState, AGENT_BASE_PORT};
use crate::demo::{self, DEMO_VERSION};
use crate::reporter::ConsoleReporter;
use crate::tool::{product_name_from_path, ToolConfig, ToolError, UpdaterTool};
use chiffon_core::{ProductName, ProductVersion, RegistryError, VendorName};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// =============================================================================
// ARGUMENTS
// =============================================================================

/// ChiffonUpdater demo application.
#[derive(Debug, Parser)]
#[command(name = "chiffon-demo", version, about = "ChiffonUpdater demo application")]
pub struct Cli {
    /// Enable log output (off by default, as in the original demo)
    #[arg(long, global = true)]
    pub log: bool,

    /// Registry directory override (defaults to the per-user data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub registry_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the demo flow (the default when no command is given)
    Demo,

    /// Register a program binary
    Register {
        /// Path of the binary to register
        #[arg(long)]
        path: PathBuf,
        /// Product name (defaults to the binary's file stem)
        #[arg(long)]
        name: Option<String>,
        /// Product version (defaults to "0.0")
        #[arg(long)]
        version: Option<String>,
        /// Vendor name
        #[arg(long)]
        vendor: Option<String>,
    },

    /// Remove a program's registration
    Unregister {
        /// Path of the binary to unregister
        #[arg(long)]
        path: PathBuf,
    },

    /// List registered products
    Products {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show registry status
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Serve the local agent endpoint for the browser driver
    Agent {
        /// First port to probe
        #[arg(long, default_value_t = AGENT_BASE_PORT)]
        base_port: u16,
        /// Auth cookie (generated and printed when omitted)
        #[arg(long)]
        cookie: Option<String>,
    },
}

// =============================================================================
// ERRORS
// =============================================================================

/// CLI-level errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The updater tool reported initialization failure.
    #[error("updater tool failed to initialize")]
    InitFailed,

    /// Updater tool failure.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Agent endpoint failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Registry validation failure (bad name/version/vendor arguments).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output encoding failure.
    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// ENTRY
// =============================================================================

/// Install the tracing subscriber when logging is enabled.
///
/// The flag mirrors the boolean the original tool was constructed with:
/// logging is entirely off unless asked for.
pub fn init_logging(enabled: bool) {
    if !enabled {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let registry_dir = cli.registry_dir.as_deref();
    match cli.command.unwrap_or(Command::Demo) {
        Command::Demo => cmd_demo(registry_dir, cli.log),
        Command::Register {
            path,
            name,
            version,
            vendor,
        } => cmd_register(
            registry_dir,
            &path,
            name.as_deref(),
            version.as_deref(),
            vendor.as_deref(),
        ),
        Command::Unregister { path } => cmd_unregister(registry_dir, &path),
        Command::Products { json } => cmd_products(registry_dir, json),
        Command::Status { json } => cmd_status(registry_dir, json),
        Command::Agent { base_port, cookie } => cmd_agent(registry_dir, base_port, cookie),
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Run the demo flow.
///
/// Always exits successfully: the original program shows its warning
/// dialog and terminates normally even when registration was skipped.
pub fn cmd_demo(registry_dir: Option<&Path>, logging_enabled: bool) -> Result<(), CliError> {
    let config = ToolConfig {
        logging_enabled,
        registry_dir: registry_dir.map(Path::to_path_buf),
        product_name: Some(ProductName::new("Demo")?),
        product_version: Some(ProductVersion::new(DEMO_VERSION)?),
        vendor: None,
    };
    let mut tool = UpdaterTool::new(config);
    let mut reporter = ConsoleReporter;
    let _skip = demo::run_demo(&mut tool, &mut reporter);
    Ok(())
}

/// Register an arbitrary program binary.
pub fn cmd_register(
    registry_dir: Option<&Path>,
    path: &Path,
    name: Option<&str>,
    version: Option<&str>,
    vendor: Option<&str>,
) -> Result<(), CliError> {
    let mut tool = open_tool(registry_dir)?;

    let name = match name {
        Some(value) => ProductName::new(value)?,
        None => product_name_from_path(path)?,
    };
    let version = match version {
        Some(value) => ProductVersion::new(value)?,
        None => ProductVersion::unknown(),
    };
    let vendor = vendor.map(VendorName::new).transpose()?;

    let sequence = tool.register_program_as(path, name, version, vendor)?;
    println!("registered (sequence {sequence})");
    Ok(())
}

/// Remove a program's registration.
pub fn cmd_unregister(registry_dir: Option<&Path>, path: &Path) -> Result<(), CliError> {
    let mut tool = open_tool(registry_dir)?;
    match tool.unregister_program(path)? {
        Some(record) => println!("unregistered {}", record.name),
        None => println!("not registered: {}", path.display()),
    }
    Ok(())
}

/// List registered products.
pub fn cmd_products(registry_dir: Option<&Path>, json: bool) -> Result<(), CliError> {
    let tool = open_tool(registry_dir)?;
    let products = tool.products()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else if products.is_empty() {
        println!("no products registered");
    } else {
        for record in &products {
            println!(
                "{}\t{}\t{}",
                record.name,
                record.version,
                record.install_path.display()
            );
        }
    }
    Ok(())
}

/// Show registry status.
pub fn cmd_status(registry_dir: Option<&Path>, json: bool) -> Result<(), CliError> {
    let tool = open_tool(registry_dir)?;
    let registry_path = tool
        .registry_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let count = tool.product_count()?;

    if json {
        let status = serde_json::json!({
            "registry": registry_path,
            "backend": "redb",
            "products": count,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("registry: {registry_path}");
        println!("backend: redb");
        println!("products: {count}");
    }
    Ok(())
}

/// Serve the local agent endpoint.
pub fn cmd_agent(
    registry_dir: Option<&Path>,
    base_port: u16,
    cookie: Option<String>,
) -> Result<(), CliError> {
    let mut tool = UpdaterTool::new(ToolConfig {
        registry_dir: registry_dir.map(Path::to_path_buf),
        ..ToolConfig::default()
    });
    // Serve even when the registry is unavailable; the driver sees the
    // "unconfigured" state instead of a refused connection
    if !tool.initialize() {
        warn!("registry unavailable, agent will report unconfigured");
    }

    let cookie = cookie.unwrap_or_else(AgentState::generate_cookie);
    println!("agent cookie: {cookie}");
    let state = AgentState::new(tool, cookie);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(agent::serve(state, base_port))?;
    Ok(())
}

/// Open an initialized tool or fail with a CLI error.
fn open_tool(registry_dir: Option<&Path>) -> Result<UpdaterTool, CliError> {
    let mut tool = UpdaterTool::new(ToolConfig {
        registry_dir: registry_dir.map(Path::to_path_buf),
        ..ToolConfig::default()
    });
    if !tool.initialize() {
        return Err(CliError::InitFailed);
    }
    Ok(tool)
}
