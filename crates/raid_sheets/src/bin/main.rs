use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use raid_sheets::data::RaidData;
use raid_sheets::{RaidSpreadsheet, Result, SpreadsheetIdStore, DEFAULT_ID_FILE};
use sheets_client::GoogleClient;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LoggingMode {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl From<LoggingMode> for logutil::LoggingMode {
    fn from(mode: LoggingMode) -> Self {
        match mode {
            LoggingMode::Pretty => logutil::LoggingMode::Pretty,
            LoggingMode::Json => logutil::LoggingMode::Json,
            LoggingMode::Compact => logutil::LoggingMode::Compact,
        }
    }
}

#[derive(Parser)]
#[clap(name = "raid_sheets")]
#[clap(version)]
#[clap(about = "Publish RAID champion and skill data to Google Sheets", long_about = None)]
struct Arguments {
    /// JSON file with the champions and skills to publish.
    ///
    /// Has the form `{"champions": [...], "skills": [...]}`.
    #[clap(short, long, value_parser)]
    data: PathBuf,

    /// File holding the id of the spreadsheet of this installation.
    #[clap(long, value_parser, default_value = DEFAULT_ID_FILE)]
    id_file: PathBuf,

    /// OAuth access token with the Sheets and Drive scopes.
    #[clap(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Timeout in seconds for every remote call.
    #[clap(long, default_value_t = 60)]
    timeout: u64,

    /// Skip bolding headers, banding and refreshing the title.
    #[clap(long)]
    no_format: bool,

    /// Log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(long, value_enum, default_value_t)]
    log_mode: LoggingMode,
}

fn main() {
    let args = Arguments::parse();
    logutil::init(args.verbose, args.log_mode.into());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            println!("ERROR: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args)) {
        println!("ERROR: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Arguments) -> Result<()> {
    // Read input before touching anything remote.
    let data = RaidData::from_path(&args.data)?;
    info!(
        champions = data.champions.len(),
        skills = data.skills.len(),
        "loaded raid data"
    );

    let client = GoogleClient::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build(&args.access_token)?;
    let store = SpreadsheetIdStore::new(args.id_file);

    let mut raid = RaidSpreadsheet::initialize(client, store).await?;
    info!(spreadsheet_id = %raid.spreadsheet_id(), state = ?raid.initial_state(), "spreadsheet ready");

    for champion in &data.champions {
        raid.add_champion(champion);
    }
    for skill in &data.skills {
        raid.add_skill(skill);
    }

    raid.populate_champions().await?;
    raid.populate_skills().await?;

    if !args.no_format {
        raid.finalize().await?;
    }

    info!(
        champions = raid.champion_rows().len().saturating_sub(1),
        skills = raid.skill_rows().len().saturating_sub(1),
        "done"
    );

    Ok(())
}
