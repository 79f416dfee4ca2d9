#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `tamaod`: looks up buildings under construction around a Tel Aviv
//! address.
//!
//! Backends default to the live Nominatim and GISN services. Set
//! `USE_MOCK_NOMINATIVE` / `USE_MOCK_GISN` (or pass `--mock`,
//! `--mock-geocoder`, `--mock-features`) to replay the bundled fixtures
//! instead.

mod streets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tamaod_models::AnalyzeRequest;
use tamaod_pipeline::{BackendSelection, Services};

#[derive(Parser)]
#[command(name = "tamaod", about = "Construction risk lookup for Tel Aviv addresses")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List buildings under construction near an address, as JSON
    Analyze {
        /// Street name (Hebrew or English)
        #[arg(long)]
        street: String,
        /// House number, e.g. "10" or "10A"
        #[arg(long)]
        house_number: String,
        /// Search radius in meters (10-5000, default 100)
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<i64>,
        /// Use the bundled fixtures for both backends
        #[arg(long)]
        mock: bool,
        /// Use the bundled Nominatim fixture
        #[arg(long)]
        mock_geocoder: bool,
        /// Use the bundled GISN fixture
        #[arg(long)]
        mock_features: bool,
    },
    /// Print known street names
    Streets {
        /// Street list file
        #[arg(long, default_value = streets::DEFAULT_PATH)]
        file: PathBuf,
        /// Only streets starting with this text (case-insensitive)
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            street,
            house_number,
            radius,
            mock,
            mock_geocoder,
            mock_features,
        } => {
            let request = AnalyzeRequest {
                street: Some(street),
                house_number: Some(house_number),
                radius,
            };
            let request = match request.validate() {
                Ok(request) => request,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return Ok(ExitCode::from(2));
                }
            };

            let env = BackendSelection::from_env();
            let selection = BackendSelection {
                mock_geocoder: mock || mock_geocoder || env.mock_geocoder,
                mock_features: mock || mock_features || env.mock_features,
            };
            let services = Services::build(selection, |name| std::env::var(name).ok())?;

            match tamaod_pipeline::analyze(&services, &request).await {
                Ok(results) => {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
                Err(e) => {
                    log::error!(
                        "Analysis of '{} {}' failed: {e}",
                        request.street,
                        request.house_number
                    );
                    eprintln!("Error: failed to process address (status {})", e.status_code());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Streets { file, prefix } => {
            let all = streets::load(&file)?;
            for street in streets::matching(&all, prefix.as_deref().unwrap_or("")) {
                println!("{street}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
