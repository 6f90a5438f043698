use clap::Parser;
use foodshare::config::cli::{Cli, Command};
use foodshare::utils::{logger, validation::Validate};
use foodshare::{
    Action, AppConfig, CsvLoader, Dashboard, DatabaseUrl, EtlEngine, LocalStorage, Outcome,
    QueryExecutor, TrackerError,
};
use std::io;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), TrackerError> {
    // 載入並驗證配置
    let config = cli.resolve_config()?;
    config.validate()?;
    tracing::debug!("Resolved config: {:?}", config);

    let action = match cli.command {
        Command::Setup { .. } => return setup(config).await,
        Command::Catalog => Some(Action::ListCatalog),
        Command::Run { number, city } => Some(Action::RunEntry { number, city }),
        Command::Listings { cities } => Some(Action::Listings(cities)),
        Command::Cities => Some(Action::Cities),
        Command::AddListing(args) => Some(Action::AddListing(args.into_listing())),
        Command::Sql { statement } => Some(Action::Sql(statement)),
        Command::Dashboard => None,
    };

    // 啟動時連不上資料庫是致命錯誤
    let executor = QueryExecutor::new(DatabaseUrl::parse(&config.database.url)?);
    executor.ping()?;
    tracing::info!("Connected to {}", executor.url());

    let dashboard = Dashboard::new(executor, config);
    let Some(action) = action else {
        dashboard.run_session(io::stdin().lock(), io::stdout())?;
        return Ok(());
    };

    let outcome = dashboard.handle(action);
    match &outcome {
        Outcome::Error(_) => {
            eprint!("{}", dashboard.present(&outcome));
            std::process::exit(2);
        }
        _ => print!("{}", dashboard.present(&outcome)),
    }
    Ok(())
}

async fn setup(config: AppConfig) -> Result<(), TrackerError> {
    tracing::info!(
        "🚀 Loading CSV exports from '{}' ({} mode) into {}",
        config.loader.data_dir,
        config.loader.mode,
        config.database.url
    );

    let storage = LocalStorage::from_config(&config);
    let loader = CsvLoader::new(storage, config)?;
    let engine = EtlEngine::new(loader);
    let report = engine.run().await?;

    for (table, outcome) in &report.tables {
        println!("{:<14} {}", table, serde_json::to_string(outcome)?);
    }

    if report.has_failures() {
        println!("⚠️ Setup finished with errors; see the log above.");
        std::process::exit(1);
    }
    println!("🎉 Database setup is complete ({} rows).", report.rows_loaded());
    Ok(())
}
