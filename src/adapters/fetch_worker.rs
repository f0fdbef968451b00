//! Background fetch worker.
//!
//! Runs a [`Fetcher`] on its own thread so a slow calendar download never
//! stalls the tick loop. Requests travel through an `embassy-sync`
//! [`Signal`], which holds only the newest generation, so a burst of
//! superseding requests collapses to the last one and none can be lost.
//! Reports come back over a bounded channel.
//!
//! ```text
//! ┌──────────────┐  Generation   ┌──────────────┐
//! │  Tick loop   │─────────────▶│ Fetch worker │
//! │  (sync)      │◀─────────────│  (thread)    │
//! └──────────────┘  FetchReport  └──────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::{debug, warn};

use crate::app::ports::CalendarSource;
use crate::calendar::CalendarSnapshot;
use crate::error::FetchError;
use crate::refresh::{FetchReport, Generation};

/// Report queue depth.
const DEPTH: usize = 4;

/// How often the idle worker checks for requests.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

type RequestSignal = Signal<CriticalSectionRawMutex, Generation>;
type ReportChannel = Channel<CriticalSectionRawMutex, FetchReport, DEPTH>;

/// Something that can download and parse the calendar (blocking).
pub trait Fetcher: Send + 'static {
    fn fetch(&mut self) -> Result<CalendarSnapshot, FetchError>;
}

pub struct FetchWorker {
    requests: Arc<RequestSignal>,
    reports: Arc<ReportChannel>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FetchWorker {
    /// Spawn the worker thread.
    pub fn spawn(mut fetcher: impl Fetcher) -> std::io::Result<Self> {
        let requests: Arc<RequestSignal> = Arc::new(Signal::new());
        let reports: Arc<ReportChannel> = Arc::new(Channel::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let (rx, tx, stop) = (requests.clone(), reports.clone(), shutdown.clone());
        let handle = thread::Builder::new()
            .name("fetch-worker".into())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let Some(latest) = rx.try_take() else {
                        thread::sleep(POLL_INTERVAL);
                        continue;
                    };
                    debug!("FetchWorker: fetching for request {latest}");
                    let report = FetchReport {
                        generation: latest,
                        outcome: fetcher.fetch(),
                    };
                    if tx.try_send(report).is_err() {
                        warn!("FetchWorker: report queue full, dropping {latest}");
                    }
                }
            })?;

        Ok(Self {
            requests,
            reports,
            shutdown,
            handle: Some(handle),
        })
    }
}

impl CalendarSource for FetchWorker {
    fn request_fetch(&mut self, generation: Generation) {
        // Overwrites any request the worker has not picked up yet.
        self.requests.signal(generation);
    }

    fn poll_fetch(&mut self) -> Option<FetchReport> {
        self.reports.try_receive().ok()
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
