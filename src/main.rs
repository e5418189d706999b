// SPDX-License-Identifier: MPL-2.0
use roadlens::app::{self, paths, RunOptions};
use roadlens::config;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
roadlens - timed geotagged frame capture

USAGE:
  roadlens [run] --frames <DIR> [OPTIONS]
  roadlens inspect <FILE>
  roadlens count
  roadlens reset-count

RUN OPTIONS:
  --frames <DIR>         Directory of images replayed as the video source
  --output <DIR>         Where captures are written
  --interval <SECS>      Seconds between captures
  --lat <DEG>            Latitude used for geotagging
  --lon <DEG>            Longitude used for geotagging
  --tag <NAME>           File name prefix
  --max-captures <N>     Stop after N saved captures
  --no-countdown         Skip the 3 second countdown

GLOBAL OPTIONS:
  --config <FILE>        Settings file (default: <config dir>/settings.toml)
  --data-dir <DIR>       Directory of the capture counter
  --config-dir <DIR>     Directory of settings.toml
  -h, --help             Print this help
";

const DEFAULT_LOG_FILTER: &str = "info";

fn parse_path(s: &OsStr) -> Result<PathBuf, &'static str> {
    Ok(PathBuf::from(s))
}

enum Command {
    Run(Box<RunOptions>),
    Inspect(PathBuf),
    Count,
    ResetCount,
}

fn parse_args() -> Result<Option<Command>, String> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let data_dir: Option<PathBuf> = args
        .opt_value_from_os_str("--data-dir", parse_path)
        .map_err(|e| e.to_string())?;
    let config_dir: Option<PathBuf> = args
        .opt_value_from_os_str("--config-dir", parse_path)
        .map_err(|e| e.to_string())?;
    let config_file: Option<PathBuf> = args
        .opt_value_from_os_str("--config", parse_path)
        .map_err(|e| e.to_string())?;
    paths::init_cli_overrides(data_dir, config_dir);

    let subcommand = args.subcommand().map_err(|e| e.to_string())?;
    let command = match subcommand.as_deref() {
        Some("inspect") => {
            let file: PathBuf = args
                .free_from_os_str(parse_path)
                .map_err(|e| e.to_string())?;
            Command::Inspect(file)
        }
        Some("count") => Command::Count,
        Some("reset-count") => Command::ResetCount,
        None | Some("run") => {
            let mut config = match config_file {
                Some(path) => config::load_from_path(&path).map_err(|e| e.to_string())?,
                None => config::load().unwrap_or_default(),
            };
            let frames_dir: PathBuf = args
                .value_from_os_str("--frames", parse_path)
                .map_err(|e| e.to_string())?;
            if let Some(output) = args
                .opt_value_from_os_str("--output", parse_path)
                .map_err(|e| e.to_string())?
            {
                config.output_dir = Some(output);
            }
            if let Some(interval) = args
                .opt_value_from_str("--interval")
                .map_err(|e| e.to_string())?
            {
                config.interval_secs = interval;
            }
            if let Some(lat) = args.opt_value_from_str("--lat").map_err(|e| e.to_string())? {
                config.latitude = Some(lat);
            }
            if let Some(lon) = args.opt_value_from_str("--lon").map_err(|e| e.to_string())? {
                config.longitude = Some(lon);
            }
            if let Some(tag) = args
                .opt_value_from_str::<_, String>("--tag")
                .map_err(|e| e.to_string())?
            {
                config.app_tag = tag;
            }

            let mut options = RunOptions::new(config, frames_dir);
            options.max_captures = args
                .opt_value_from_str("--max-captures")
                .map_err(|e| e.to_string())?;
            options.skip_countdown = args.contains("--no-countdown");
            Command::Run(Box::new(options))
        }
        Some(other) => return Err(format!("unknown command `{other}`")),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(format!("unexpected arguments: {rest:?}"));
    }
    Ok(Some(command))
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn env_filter() -> EnvFilter {
    log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let command = match parse_args() {
        Ok(Some(command)) => command,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    let result = match command {
        Command::Run(options) => app::run(*options, wait_for_ctrl_c()).await.map(|summary| {
            println!(
                "saved {} capture(s), {} geotagged, {} failed; total {}",
                summary.saved, summary.geotagged, summary.failed, summary.total_count
            );
        }),
        Command::Inspect(path) => app::inspect(&path).map(|gps| match gps {
            Some(coordinates) => println!("{}", coordinates.format()),
            None => println!("no GPS data"),
        }),
        Command::Count => app::capture_count(None).map(|count| println!("{count}")),
        Command::ResetCount => app::reset_capture_count(None).map(|()| println!("0")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "roadlens failed");
            ExitCode::FAILURE
        }
    }
}
