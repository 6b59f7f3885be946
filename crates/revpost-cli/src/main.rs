mod generate;
mod posts;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revpost")]
#[command(about = "Product review post generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate review posts for one or more products
    Generate {
        /// Product names; a built-in list is used when none are given
        products: Vec<String>,

        /// Read product names from a file, one per line (`#` starts a comment)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Regenerate every product already recorded in the ledger
        #[arg(long)]
        from_ledger: bool,

        /// Generate even when the ledger already holds the product
        #[arg(long)]
        force: bool,

        /// Skip web research
        #[arg(long)]
        no_search: bool,

        /// Skip the language model and write the fallback template
        #[arg(long)]
        no_llm: bool,
    },
    /// List previously generated reviews
    Ledger,
    /// Flag low-quality posts and write them to a candidate list
    Audit {
        /// Where to write the candidate list
        #[arg(long, default_value = "to_delete.txt")]
        output: PathBuf,
    },
    /// Move posts named in a candidate list into a trash directory
    Purge {
        /// Candidate list written by `audit`
        #[arg(long, default_value = "to_delete.txt")]
        list: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = revpost_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            products,
            file,
            from_ledger,
            force,
            no_search,
            no_llm,
        } => {
            config.force_regenerate |= force || from_ledger;
            config.disable_web_search |= no_search;
            config.disable_llm |= no_llm;
            let source = generate::ProductSource {
                products,
                file,
                from_ledger,
            };
            generate::run_generate(&config, &source).await?;
        }
        Commands::Ledger => posts::run_ledger(&config)?,
        Commands::Audit { output } => posts::run_audit(&config, &output)?,
        Commands::Purge { list } => posts::run_purge(&config, &list)?,
    }

    Ok(())
}
