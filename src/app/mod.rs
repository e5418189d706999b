// SPDX-License-Identifier: MPL-2.0
//! Application root: wires the infrastructure adapters into the capture
//! services and drives a capture session until it is told to stop.
//!
//! The binary is a thin argument parser over the functions in this module.

pub mod paths;

use crate::application::counter::CounterService;
use crate::application::pipeline::{CapturePipeline, CaptureReport};
use crate::application::port::Counter;
use crate::application::scheduler::CaptureScheduler;
use crate::config::Config;
use crate::domain::capture::CapturePhase;
use crate::domain::metadata::GpsCoordinates;
use crate::error::{Error, Result};
use crate::infrastructure::{
    DirectoryFrameSource, DirectoryPersistor, FixedLocationProvider, PersistentCounter, TokioClock,
};
use crate::media::metadata::read_gps_from_path;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;

/// Options of a capture session, after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: Config,
    /// Directory of still images replayed as the video source.
    pub frames_dir: PathBuf,
    /// Stop after this many saved captures.
    pub max_captures: Option<u64>,
    /// Start capturing right away instead of counting down.
    pub skip_countdown: bool,
    /// Overrides the data directory holding the capture counter.
    pub data_dir: Option<PathBuf>,
}

impl RunOptions {
    #[must_use]
    pub fn new(config: Config, frames_dir: PathBuf) -> Self {
        Self {
            config,
            frames_dir,
            max_captures: None,
            skip_countdown: false,
            data_dir: None,
        }
    }
}

/// Totals of a finished capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Captures written to disk.
    pub saved: u64,
    /// Saved captures that carry GPS tags.
    pub geotagged: u64,
    /// Ticks that produced no file.
    pub failed: u64,
    /// Counter value when the session ended.
    pub total_count: u64,
}

impl RunSummary {
    fn record(&mut self, report: &CaptureReport) {
        match &report.outcome {
            Ok(_) => {
                self.saved += 1;
                if report.geotagged {
                    self.geotagged += 1;
                }
            }
            Err(_) => self.failed += 1,
        }
        if let Some(count) = report.count {
            self.total_count = self.total_count.max(count);
        }
    }
}

fn data_dir(override_path: Option<PathBuf>) -> Result<PathBuf> {
    paths::get_app_data_dir_with_override(override_path)
        .ok_or_else(|| Error::Config("cannot determine the data directory".to_string()))
}

/// Runs a capture session until `shutdown` resolves or `max_captures` files
/// have been saved.
///
/// Captures that are in flight when the session stops are allowed to finish
/// and are included in the summary.
///
/// # Errors
///
/// Startup failures: a capture tag with path separators, unreadable frame
/// directory, output directory that cannot be created, undeterminable data
/// directory, or a rejected start.
pub async fn run<F>(options: RunOptions, shutdown: F) -> Result<RunSummary>
where
    F: Future<Output = ()>,
{
    let runtime = Handle::current();
    let config = &options.config;

    let app_tag = config.tag()?;
    let frames = DirectoryFrameSource::scan(&options.frames_dir, config.quality())?;
    let output_dir = config
        .resolved_output_dir()
        .ok_or_else(|| Error::Config("cannot determine the output directory".to_string()))?;
    let persistor = DirectoryPersistor::create(&output_dir)?;
    let counter = PersistentCounter::in_dir(&data_dir(options.data_dir.clone())?);
    let start_count = counter.value();
    let (counter_handle, counter_task) = CounterService::spawn(Box::new(counter), &runtime);

    let location = FixedLocationProvider::new(config.position());
    if location.coordinate().is_none() {
        tracing::warn!("no position configured, captures will not be geotagged");
    }

    let pipeline = Arc::new(CapturePipeline::new(
        runtime.clone(),
        Arc::new(frames),
        Arc::new(location),
        Arc::new(persistor),
        counter_handle,
        app_tag,
    ));
    let mut reports = pipeline.subscribe();

    let scheduler = CaptureScheduler::with_interval(
        Arc::new(TokioClock::new(runtime)),
        pipeline,
        config.interval(),
    );
    let mut phases = scheduler.subscribe();

    tracing::info!(
        frames = %options.frames_dir.display(),
        output = %output_dir.display(),
        interval_secs = scheduler.interval_seconds().value(),
        "starting capture session"
    );
    if options.skip_countdown {
        scheduler.begin_capturing()?;
    } else {
        scheduler.request_start()?;
    }

    let mut summary = RunSummary {
        total_count: start_count,
        ..RunSummary::default()
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("stop requested");
                break;
            }
            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = *phases.borrow_and_update();
                if let CapturePhase::CountingDown { remaining } = phase {
                    tracing::info!(remaining, "starting in");
                }
            }
            report = reports.recv() => match report {
                Ok(report) => {
                    summary.record(&report);
                    if options.max_captures.is_some_and(|max| summary.saved >= max) {
                        tracing::info!(saved = summary.saved, "capture limit reached");
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "capture reports dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    scheduler.request_stop();
    // Dropping the scheduler drops the pipeline; the report channel closes
    // once the last in-flight tick is done.
    drop(scheduler);
    loop {
        match reports.recv().await {
            Ok(report) => summary.record(&report),
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
        }
    }
    if let Err(e) = counter_task.await {
        tracing::error!(error = %e, "counter service ended abnormally");
    }

    tracing::info!(
        saved = summary.saved,
        geotagged = summary.geotagged,
        failed = summary.failed,
        total = summary.total_count,
        "capture session finished"
    );
    Ok(summary)
}

/// Current value of the persistent capture counter.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn capture_count(data_dir_override: Option<PathBuf>) -> Result<u64> {
    Ok(PersistentCounter::in_dir(&data_dir(data_dir_override)?).value())
}

/// Resets the persistent capture counter to zero.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined or the reset
/// cannot be stored.
pub fn reset_capture_count(data_dir_override: Option<PathBuf>) -> Result<()> {
    let mut counter = PersistentCounter::in_dir(&data_dir(data_dir_override)?);
    counter.reset()?;
    tracing::info!(path = %counter.path().display(), "capture counter reset");
    Ok(())
}

/// Reads the GPS position embedded in a capture.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn inspect(path: &Path) -> Result<Option<GpsCoordinates>> {
    read_gps_from_path(path)
}
