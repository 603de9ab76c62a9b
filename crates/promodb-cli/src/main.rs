mod report;

use clap::{Parser, Subcommand};
use promodb_core::DEFAULT_NO_CATEGORY_LABEL;
use tracing_subscriber::EnvFilter;

use crate::report::ReportOptions;

#[derive(Debug, Parser)]
#[command(name = "promodb-cli")]
#[command(about = "Store promotions retrieval and discount statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch promotions for stores and print discount statistics
    Report {
        /// Store id to fetch; repeat for several stores. Defaults to the stores file.
        #[arg(long = "store", value_name = "ID")]
        stores: Vec<u64>,

        /// Restrict promotions to one category id
        #[arg(long, value_name = "ID")]
        category: Option<u64>,

        /// List categories from smallest to largest average discount
        #[arg(long)]
        ascending: bool,

        /// Label for promotions without a category
        #[arg(long, default_value = DEFAULT_NO_CATEGORY_LABEL)]
        no_category_label: String,

        /// Fail the whole run if any store fails
        #[arg(long)]
        strict: bool,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the stores configured in the stores file
    Stores,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = promodb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report {
            stores,
            category,
            ascending,
            no_category_label,
            strict,
            json,
        } => {
            let options = ReportOptions::new(
                stores,
                category,
                ascending,
                no_category_label,
                strict,
                json,
            );
            report::run_report(&config, &options).await?;
        }
        Commands::Stores => {
            let stores = promodb_core::load_stores(&config.stores_path)?;
            for store in &stores.stores {
                println!("{}\t{}", store.id, store.display_name());
            }
        }
    }

    Ok(())
}
