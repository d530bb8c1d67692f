//! # Item Catalog CLI (`catalog`)
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog init` | Create the SQLite schema and the image directory |
//! | `catalog serve` | Start the HTTP server |
//! | `catalog add <name> <category> --image <path>` | Add an item |
//! | `catalog list [--category <name>]` | List items |
//! | `catalog get <id>` | Show one item |
//! | `catalog search <keyword>` | Items whose name contains the keyword |
//! | `catalog categories` | List categories |
//! | `catalog completions <shell>` | Print shell completions |

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use item_catalog::{cli, config, logging, server};

/// Item Catalog: categorized items with content-addressed images.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Item Catalog: categorized items with content-addressed images",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema and image directory.
    ///
    /// Safe to run more than once.
    Init,

    /// Start the HTTP server.
    Serve,

    /// Add an item with an image.
    Add {
        name: String,
        category: String,

        /// Image file to upload.
        #[arg(long)]
        image: PathBuf,
    },

    /// List items, oldest first.
    List {
        /// Only items in this category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one item by identifier.
    Get { id: String },

    /// Find items whose name contains the keyword (case-sensitive).
    Search { keyword: String },

    /// List categories.
    Categories,

    /// Print shell completions to stdout.
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "catalog", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    logging::init_tracing(&cfg.log);

    match cli.command {
        Commands::Init => cli::run_init(&cfg).await?,
        Commands::Serve => server::run_server(&cfg).await?,
        Commands::Add {
            name,
            category,
            image,
        } => cli::run_add(&cfg, &name, &category, &image).await?,
        Commands::List { category } => cli::run_list(&cfg, category.as_deref()).await?,
        Commands::Get { id } => cli::run_get(&cfg, &id).await?,
        Commands::Search { keyword } => cli::run_search(&cfg, &keyword).await?,
        Commands::Categories => cli::run_categories(&cfg).await?,
        Commands::Completions { .. } => unreachable!("handled before config is loaded"),
    }

    Ok(())
}
