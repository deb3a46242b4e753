mod cli;
mod config;
mod http;
mod rms;

use anyhow::Context;
use log::debug;
use std::io;

#[tokio::main(flavor = "current_thread")] // one request, nothing to run concurrently
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("orc-rms {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = config::Config::from_env().map_err(anyhow::Error::msg)?;
    let query = cli::query_from_matches(&matches);
    let client = http::build_client(&cfg)?;
    let doc = http::download_boat_rms(&client, &cfg, &query)
        .await
        .with_context(|| format!("downloading RMS for {}", query))?;

    match rms::extract_records(&doc)? {
        Some(records) => {
            let mut out = io::stdout().lock();
            rms::write_records(&mut out, records)?;
        }
        None => {
            if let Some(value) = doc.get(rms::RMS_KEY) {
                debug!(
                    "{:?} is a {}, not an array; nothing to print",
                    rms::RMS_KEY,
                    rms::kind_of(value)
                );
            }
        }
    }
    Ok(())
}
