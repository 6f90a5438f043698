use crate::config::toml_config::{AppConfig, OutputFormat, DEFAULT_CONFIG_FILE};
use crate::core::loader::LoadMode;
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "foodshare")]
#[command(about = "Food donation tracker: load spreadsheet exports and run the dashboard queries")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Override database.url from the config file
    #[arg(long, env = "FOODSHARE_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Override output.format from the config file
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the tables and load the CSV exports
    Setup {
        /// Override loader.mode
        #[arg(long, value_enum)]
        mode: Option<LoadMode>,

        /// Override loader.data_dir
        #[arg(long)]
        data_dir: Option<String>,
    },
    /// List the analysis catalog
    Catalog,
    /// Run one catalog entry by number
    Run {
        number: usize,

        /// City for the provider-contacts entry
        #[arg(long)]
        city: Option<String>,
    },
    /// Show food listings, optionally only in the given cities
    Listings {
        #[arg(long = "city")]
        cities: Vec<String>,
    },
    /// List the cities providers are located in
    Cities,
    /// Add a single food listing
    AddListing(AddListingArgs),
    /// Run one ad-hoc SQL statement
    Sql { statement: String },
    /// Interactive dashboard session
    Dashboard,
}

#[derive(Debug, Clone, Args)]
pub struct AddListingArgs {
    #[arg(long)]
    pub food_name: String,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub quantity: u32,

    /// YYYY-MM-DD
    #[arg(long)]
    pub expiry_date: NaiveDate,

    #[arg(long)]
    pub provider_id: i64,

    #[arg(long)]
    pub provider_type: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub food_type: Option<String>,

    #[arg(long)]
    pub meal_type: Option<String>,
}

impl Cli {
    /// Load the config file and apply command-line overrides on top.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load_or_default(&self.config)?;

        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Command::Setup { mode, data_dir } = &self.command {
            if let Some(mode) = mode {
                config.loader.mode = *mode;
            }
            if let Some(dir) = data_dir {
                config.loader.data_dir = dir.clone();
            }
        }

        Ok(config)
    }
}

impl AddListingArgs {
    pub fn into_listing(self) -> crate::domain::model::NewListing {
        crate::domain::model::NewListing {
            food_name: self.food_name,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
            provider_id: self.provider_id,
            provider_type: self.provider_type,
            location: self.location,
            food_type: self.food_type,
            meal_type: self.meal_type,
        }
    }
}
