use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_sqlorder::{format_graph, load_dependency_graph, order_schema, write_lines, OrderOptions};

#[derive(Parser)]
#[command(name = "rust-sqlorder")]
#[command(author, version, about = "Order SQL Server tables so referenced tables come first")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tables of a schema in foreign-key safe creation order
    Order(SchemaArgs),

    /// Print each table with the tables it references
    Graph(SchemaArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// Path to the schema script, or a directory of .sql files
    #[arg(short, long)]
    schema: PathBuf,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Encoding of the schema files (e.g. utf-16le, utf-8, windows-1252); detected by default
    #[arg(short, long)]
    encoding: Option<String>,

    /// Fail on foreign keys added to tables that are never created
    #[arg(long)]
    strict: bool,

    /// Identify tables as schema.table instead of by table name alone
    #[arg(short, long)]
    qualified: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl SchemaArgs {
    fn into_options(self) -> OrderOptions {
        OrderOptions {
            schema_path: self.schema,
            output_path: self.output,
            encoding: self.encoding,
            strict: self.strict,
            qualified_names: self.qualified,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rust_sqlorder={}", default_level).into()),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Order(args) => {
            init_tracing(args.verbose);
            let options = args.into_options();
            let ordered = order_schema(&options)?;
            write_lines(&ordered, options.output_path.as_deref())?;
        }
        Commands::Graph(args) => {
            init_tracing(args.verbose);
            let options = args.into_options();
            let graph = load_dependency_graph(&options)?;
            write_lines(&format_graph(&graph), options.output_path.as_deref())?;
        }
    }

    Ok(())
}
