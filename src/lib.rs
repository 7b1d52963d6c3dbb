//! Flightshelf: a directory of Parquet datasets served over Arrow Flight.
//!
//! Every immediate child of a repository root is one dataset. Clients list
//! the datasets, resolve one to its schema and fetch endpoint, and stream
//! its record batches with a ticket.
//!
//! # Modules
//!
//! - [`catalog`]: Identifiers, resolution, and repository listing
//! - [`store`]: Parquet access behind the [`store::DatasetStore`] trait
//! - [`stream`]: Ticket decoding and pull-driven batch streams
//! - [`server`]: The Arrow Flight service
//! - [`client`]: A small Flight client for the `fetch` command
//! - [`error`]: Error types for flightshelf operations

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod server;
pub mod store;
pub mod stream;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::CatalogError;

use catalog::{DatasetId, ListErrorPolicy, ListOptions};
use config::{CatalogConfig, ServerConfig, DEFAULT_LISTEN, DEFAULT_REPO};
use report::DatasetSummary;
use store::DEFAULT_BATCH_SIZE;

/// The flightshelf CLI application.
#[derive(Parser)]
#[command(name = "flightshelf")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Serve the repository over Arrow Flight.
    Serve(ServeArgs),
    /// List every dataset in the repository with its schema.
    List(ListArgs),
    /// Resolve one dataset and show its schema and endpoint.
    Info(InfoArgs),
    /// Fetch a dataset from a running server and report what arrived.
    Fetch(FetchArgs),
}

/// Repository settings shared by the local commands and the server.
#[derive(clap::Args)]
struct CatalogArgs {
    /// Repository root; each immediate child is one dataset.
    #[arg(long, env = "FLIGHTSHELF_REPO", default_value = DEFAULT_REPO)]
    repo: PathBuf,

    /// Maximum rows per streamed batch.
    #[arg(long, env = "FLIGHTSHELF_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Skip datasets that fail to resolve instead of aborting the listing.
    #[arg(long)]
    skip_broken: bool,

    /// Keep directory order instead of sorting dataset names.
    #[arg(long)]
    unsorted: bool,
}

impl CatalogArgs {
    fn into_config(self, location: String) -> CatalogConfig {
        let on_error = if self.skip_broken {
            ListErrorPolicy::Skip
        } else {
            ListErrorPolicy::Abort
        };

        CatalogConfig {
            repo: self.repo,
            location,
            batch_size: self.batch_size,
            list: ListOptions {
                sorted: !self.unsorted,
                on_error,
            },
        }
    }
}

/// Arguments for the serve subcommand.
#[derive(clap::Args)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "FLIGHTSHELF_LISTEN", default_value = DEFAULT_LISTEN)]
    listen: SocketAddr,

    /// Location advertised in endpoints (defaults to grpc://<listen>).
    #[arg(long, env = "FLIGHTSHELF_LOCATION")]
    location: Option<String>,

    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for the list subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Location shown in endpoints.
    #[arg(long, env = "FLIGHTSHELF_LOCATION", default_value = "grpc://0.0.0.0:8815")]
    location: String,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for the info subcommand.
#[derive(clap::Args)]
struct InfoArgs {
    /// Dataset identifier, relative to the repository root.
    dataset: String,

    /// Location shown in endpoints.
    #[arg(long, env = "FLIGHTSHELF_LOCATION", default_value = "grpc://0.0.0.0:8815")]
    location: String,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for the fetch subcommand.
#[derive(clap::Args)]
struct FetchArgs {
    /// Dataset identifier to fetch.
    dataset: String,

    /// Server to fetch from.
    #[arg(long, env = "FLIGHTSHELF_URI", default_value = "grpc://127.0.0.1:8815")]
    uri: String,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// How command results are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(raw: &str) -> Result<Self, CatalogError> {
        match raw {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CatalogError::Config(format!(
                "unsupported output format '{}' (supported: text, json)",
                other
            ))),
        }
    }
}

/// Run the flightshelf CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CatalogError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => run_serve(args),
        Some(Commands::List(args)) => run_list(args),
        Some(Commands::Info(args)) => run_info(args),
        Some(Commands::Fetch(args)) => run_fetch(args),
        None => {
            println!("flightshelf {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Serve a directory of Parquet datasets over Arrow Flight.");
            println!();
            println!("Run 'flightshelf --help' for usage information.");
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CatalogError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Execute the serve subcommand.
fn run_serve(args: ServeArgs) -> Result<(), CatalogError> {
    let config = ServerConfig::new(
        args.listen,
        args.location,
        args.catalog.into_config(String::new()),
    );
    let catalog = config.catalog.create_catalog()?;

    runtime()?.block_on(server::serve(catalog, config.listen))
}

/// Execute the list subcommand.
///
/// Datasets are printed as they resolve, so an aborted listing still shows
/// everything before the failing entry.
fn run_list(args: ListArgs) -> Result<(), CatalogError> {
    let output = OutputFormat::parse(&args.output)?;
    let catalog = args.catalog.into_config(args.location).open_catalog()?;

    let mut summaries = Vec::new();
    let mut printed = 0usize;
    for info in catalog.list_all()? {
        let summary = DatasetSummary::from(&info?);
        match output {
            OutputFormat::Text => {
                print!("{}", summary);
                printed += 1;
            }
            OutputFormat::Json => summaries.push(summary),
        }
    }

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Text if printed == 0 => println!(
            "No datasets found in {}",
            catalog.repository().root().display()
        ),
        OutputFormat::Text => {}
    }
    Ok(())
}

/// Execute the info subcommand.
fn run_info(args: InfoArgs) -> Result<(), CatalogError> {
    let output = OutputFormat::parse(&args.output)?;
    let catalog = args.catalog.into_config(args.location).open_catalog()?;

    let id = DatasetId::new(args.dataset)?;
    let summary = DatasetSummary::from(&catalog.resolve(&id)?);

    match output {
        OutputFormat::Text => print!("{}", summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

/// Execute the fetch subcommand.
fn run_fetch(args: FetchArgs) -> Result<(), CatalogError> {
    let output = OutputFormat::parse(&args.output)?;
    let id = DatasetId::new(args.dataset)?;

    let report = runtime()?.block_on(client::fetch(&args.uri, &id))?;

    match output {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
