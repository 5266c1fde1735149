use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use env_logger::Env;
use vuln_db::{
    db,
    ingest::{self, IngestReport},
    sources::nvd::NvdClient,
};

use nvd_ingest::configuration::{DatabaseSettings, IngestSettings};

fn main() -> Result<()> {
    let opts = Opts::parse();

    dotenv().ok();

    // Setup logger
    {
        #[cfg(debug_assertions)]
        let default_env_filter = "debug";
        #[cfg(not(debug_assertions))]
        let default_env_filter = "info";

        let env = Env::default().default_filter_or(default_env_filter);
        env_logger::Builder::from_env(env)
            .try_init()
            .context("Failed to setup logger")?;
    }

    // Repository
    let repository = {
        let db_settings = DatabaseSettings::try_from_env()
            .context("Invalid or missing DB_* database settings")?;

        db::PostgresRepository::new(&db_settings.connection_string())
            .context("Cannot connect to database")?
    };

    let settings = IngestSettings::try_from_env().context("Invalid NVD_* settings")?;

    let mut options = settings.ingest_options();
    if let Some(page_size) = opts.page_size {
        options.page_size = page_size;
    }
    if let Some(max_retries) = opts.max_retries {
        options.retry.max_retries = max_retries;
    }

    let client = NvdClient::new(&settings.api_url, settings.api_key.clone(), settings.timeout())
        .context("Cannot create NVD client")?;

    log::info!("connected to database, importing records ...");

    let report = ingest::run(&client, &repository, &options).context("Import aborted")?;

    log::info!("{}", report_message(&report));

    Ok(())
}

#[derive(Parser)]
#[command(author, about, version = nvd_ingest::version())]
struct Opts {
    /// Records requested per page, overrides NVD_PAGE_SIZE
    #[arg(short = 'p', long = "page-size")]
    page_size: Option<u32>,

    /// Retries of a failed page request, overrides NVD_MAX_RETRIES
    #[arg(short = 'r', long = "max-retries")]
    max_retries: Option<u32>,
}

fn report_message(report: &IngestReport) -> String {
    let summary = format!(
        "{} records in {} pages, {} skipped, {} rows already present, {} failed writes",
        report.records,
        report.pages,
        report.skipped_records,
        report.rows.existing,
        report.rows.failed
    );

    if report.rows.inserted == 0 {
        format!("No new rows created ({summary})")
    } else {
        format!("{} new rows created ({summary})", report.rows.inserted)
    }
}
