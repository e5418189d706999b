// SPDX-License-Identifier: MPL-2.0
//! Per-tick capture pipeline.
//!
//! [`CapturePipeline`] is the [`CaptureTrigger`] handed to the scheduler. For
//! each request it samples the frame source synchronously, then hands the
//! bytes to a detached task that waits for a position, embeds it, persists the
//! result and bumps the counter. Ticks never share state with each other; the
//! outcome of each one is broadcast as a [`CaptureReport`].

use crate::application::counter::CounterHandle;
use crate::application::port::{CaptureTrigger, FrameSource, LocationProvider, Persistor};
use crate::domain::capture::CaptureSource;
use crate::error::CaptureError;
use crate::media::exif::embed_gps;
use crate::media::frame_export::capture_file_name;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

/// Capacity of the report channel. Slow subscribers miss older reports.
const REPORT_CAPACITY: usize = 64;

/// Outcome of a single capture request.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub source: CaptureSource,
    /// Where the capture was written, or why the tick produced nothing.
    pub outcome: Result<PathBuf, CaptureError>,
    /// Whether the persisted bytes carry GPS tags.
    pub geotagged: bool,
    /// Counter value after this capture, when the increment succeeded.
    pub count: Option<u64>,
}

impl CaptureReport {
    fn failed(source: CaptureSource, error: CaptureError) -> Self {
        Self {
            source,
            outcome: Err(error),
            geotagged: false,
            count: None,
        }
    }

    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Collaborators shared by all ticks.
#[derive(Clone)]
struct Collaborators {
    location: Arc<dyn LocationProvider>,
    persistor: Arc<dyn Persistor>,
    counter: CounterHandle,
    app_tag: Arc<str>,
    reports: broadcast::Sender<CaptureReport>,
}

/// State carried by one tick from frame sample to report.
struct TickContext {
    source: CaptureSource,
    frame: Vec<u8>,
    deps: Collaborators,
}

impl TickContext {
    async fn complete(self) {
        let TickContext {
            source,
            frame,
            deps,
        } = self;

        let (bytes, geotagged) = match deps.location.current_coordinate().await {
            Ok(coordinate) => match embed_gps(&frame, coordinate) {
                Ok(tagged) => (tagged, true),
                Err(e) => {
                    tracing::error!(source = source.tag(), error = %e, "GPS embedding failed");
                    deps.report(CaptureReport::failed(source, e.into()));
                    return;
                }
            },
            Err(e) => {
                tracing::warn!(source = source.tag(), error = %e, "saving capture without location");
                (frame, false)
            }
        };

        let name = capture_file_name(
            &deps.app_tag,
            chrono::Utc::now().timestamp_millis(),
            geotagged,
        );
        let persistor = Arc::clone(&deps.persistor);
        let file_name = name.clone();
        let saved = tokio::task::spawn_blocking(move || persistor.save(&bytes, &file_name))
            .await
            .unwrap_or_else(|e| Err(CaptureError::Persist(format!("save task failed: {e}"))));
        let path = match saved {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(source = source.tag(), file = %name, error = %e, "capture not saved");
                deps.report(CaptureReport::failed(source, e));
                return;
            }
        };

        let count = match deps.counter.increment().await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!(error = %e, "capture saved but not counted");
                None
            }
        };
        tracing::info!(
            source = source.tag(),
            path = %path.display(),
            geotagged,
            count,
            "capture saved"
        );
        deps.report(CaptureReport {
            source,
            outcome: Ok(path),
            geotagged,
            count,
        });
    }
}

impl Collaborators {
    fn report(&self, report: CaptureReport) {
        // No subscribers is fine.
        let _ = self.reports.send(report);
    }
}

/// Capture trigger that samples, geotags and persists frames.
pub struct CapturePipeline {
    runtime: Handle,
    frames: Arc<dyn FrameSource>,
    deps: Collaborators,
}

impl std::fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("app_tag", &self.deps.app_tag)
            .finish_non_exhaustive()
    }
}

impl CapturePipeline {
    /// Creates a pipeline spawning its tick tasks on `runtime`.
    pub fn new(
        runtime: Handle,
        frames: Arc<dyn FrameSource>,
        location: Arc<dyn LocationProvider>,
        persistor: Arc<dyn Persistor>,
        counter: CounterHandle,
        app_tag: &str,
    ) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CAPACITY);
        Self {
            runtime,
            frames,
            deps: Collaborators {
                location,
                persistor,
                counter,
                app_tag: Arc::from(app_tag),
                reports,
            },
        }
    }

    /// Subscribes to per-tick outcomes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureReport> {
        self.deps.reports.subscribe()
    }

    #[must_use]
    pub fn counter(&self) -> &CounterHandle {
        &self.deps.counter
    }
}

impl CaptureTrigger for CapturePipeline {
    fn capture(&self, source: CaptureSource) {
        let frame = match self.frames.current_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(source = source.tag(), error = %e, "tick skipped");
                self.deps.report(CaptureReport::failed(source, e));
                return;
            }
        };

        let tick = TickContext {
            source,
            frame,
            deps: self.deps.clone(),
        };
        self.runtime.spawn(tick.complete());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::counter::CounterService;
    use crate::domain::metadata::GpsCoordinates;
    use crate::infrastructure::counter::MemoryCounter;
    use crate::infrastructure::location::FixedLocationProvider;
    use crate::media::metadata::read_gps;
    use crate::test_utils::{assert_abs_diff_eq, sample_jpeg};
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    struct StaticFrames(Result<Vec<u8>, CaptureError>);

    impl FrameSource for StaticFrames {
        fn current_frame(&self) -> Result<Vec<u8>, CaptureError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct MemoryPersistor {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
        threads: Mutex<Vec<ThreadId>>,
    }

    impl Persistor for MemoryPersistor {
        fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf, CaptureError> {
            self.threads.lock().unwrap().push(thread::current().id());
            self.saved
                .lock()
                .unwrap()
                .push((suggested_name.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(suggested_name))
        }
    }

    struct Fixture {
        pipeline: CapturePipeline,
        persistor: Arc<MemoryPersistor>,
        reports: broadcast::Receiver<CaptureReport>,
    }

    fn fixture(frame: Result<Vec<u8>, CaptureError>, location: Option<GpsCoordinates>) -> Fixture {
        let runtime = Handle::current();
        let (counter, _task) = CounterService::spawn(Box::new(MemoryCounter::new(0)), &runtime);
        let persistor = Arc::new(MemoryPersistor::default());
        let pipeline = CapturePipeline::new(
            runtime,
            Arc::new(StaticFrames(frame)),
            Arc::new(FixedLocationProvider::new(location)),
            persistor.clone(),
            counter,
            "roadmetrics",
        );
        let reports = pipeline.subscribe();
        Fixture {
            pipeline,
            persistor,
            reports,
        }
    }

    #[tokio::test]
    async fn located_capture_is_tagged_and_counted() {
        let coordinate = GpsCoordinates::new(48.8584, 2.2945);
        let mut fx = fixture(Ok(sample_jpeg(16, 16)), Some(coordinate));

        fx.pipeline.capture(CaptureSource::Immediate);
        let report = fx.reports.recv().await.unwrap();

        assert!(report.is_saved());
        assert!(report.geotagged);
        assert_eq!(report.count, Some(1));
        assert_eq!(fx.pipeline.counter().value(), 1);

        let saved = fx.persistor.saved.lock().unwrap();
        let (name, bytes) = &saved[0];
        assert!(name.starts_with("roadmetrics_"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains("no_location"));

        let read = read_gps(bytes).expect("GPS tags present");
        assert_abs_diff_eq!(read.latitude(), 48.8584, epsilon = 1e-4);
        assert_abs_diff_eq!(read.longitude(), 2.2945, epsilon = 1e-4);
    }

    #[tokio::test]
    async fn missing_location_saves_raw_bytes() {
        let frame = sample_jpeg(8, 8);
        let mut fx = fixture(Ok(frame.clone()), None);

        fx.pipeline.capture(CaptureSource::Interval);
        let report = fx.reports.recv().await.unwrap();

        assert!(report.is_saved());
        assert!(!report.geotagged);
        assert_eq!(report.count, Some(1));

        let saved = fx.persistor.saved.lock().unwrap();
        let (name, bytes) = &saved[0];
        assert!(name.ends_with("_no_location.jpg"));
        assert_eq!(bytes, &frame);
    }

    #[tokio::test]
    async fn not_ready_source_skips_tick() {
        let mut fx = fixture(Err(CaptureError::NotReady), Some(GpsCoordinates::default()));

        fx.pipeline.capture(CaptureSource::Immediate);
        let report = fx.reports.recv().await.unwrap();

        assert_eq!(report.outcome, Err(CaptureError::NotReady));
        assert_eq!(report.count, None);
        assert!(fx.persistor.saved.lock().unwrap().is_empty());
        assert_eq!(fx.pipeline.counter().value(), 0);
    }

    #[tokio::test]
    async fn malformed_frame_fails_without_persisting() {
        let mut fx = fixture(Ok(b"not a jpeg".to_vec()), Some(GpsCoordinates::default()));

        fx.pipeline.capture(CaptureSource::Immediate);
        let report = fx.reports.recv().await.unwrap();

        assert!(matches!(report.outcome, Err(CaptureError::Format(_))));
        assert!(fx.persistor.saved.lock().unwrap().is_empty());
        assert_eq!(fx.pipeline.counter().value(), 0);
    }

    #[tokio::test]
    async fn every_tick_is_counted() {
        let mut fx = fixture(Ok(sample_jpeg(8, 8)), Some(GpsCoordinates::new(-33.9, 151.2)));

        fx.pipeline.capture(CaptureSource::Immediate);
        fx.pipeline.capture(CaptureSource::Interval);
        fx.pipeline.capture(CaptureSource::Interval);

        let mut counts = Vec::new();
        for _ in 0..3 {
            counts.push(fx.reports.recv().await.unwrap().count.unwrap());
        }
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(fx.persistor.saved.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn saving_runs_off_the_runtime_thread() {
        let mut fx = fixture(Ok(sample_jpeg(8, 8)), None);

        fx.pipeline.capture(CaptureSource::Immediate);
        assert!(fx.reports.recv().await.unwrap().is_saved());

        // The default test runtime is single threaded.
        let threads = fx.persistor.threads.lock().unwrap();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], thread::current().id());
    }

    struct PanickingPersistor;

    impl Persistor for PanickingPersistor {
        fn save(&self, _bytes: &[u8], _suggested_name: &str) -> Result<PathBuf, CaptureError> {
            panic!("disk driver crashed");
        }
    }

    #[tokio::test]
    async fn crashed_save_is_reported_as_persist_failure() {
        let runtime = Handle::current();
        let (counter, _task) = CounterService::spawn(Box::new(MemoryCounter::new(0)), &runtime);
        let pipeline = CapturePipeline::new(
            runtime,
            Arc::new(StaticFrames(Ok(sample_jpeg(8, 8)))),
            Arc::new(FixedLocationProvider::new(None)),
            Arc::new(PanickingPersistor),
            counter,
            "roadmetrics",
        );
        let mut reports = pipeline.subscribe();

        pipeline.capture(CaptureSource::Interval);
        let report = reports.recv().await.unwrap();

        assert!(matches!(report.outcome, Err(CaptureError::Persist(_))));
        assert_eq!(pipeline.counter().value(), 0);
    }
}
