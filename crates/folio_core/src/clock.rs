//! Periodic time-of-day display.
//!
//! # Responsibility
//! - Format wall-clock time for the page header.
//! - Drive a cancellable ticker on its own thread.
//!
//! # Invariants
//! - The ticker never touches edit session state.
//! - Cancelling or dropping a ticker stops and joins its thread.

use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, warn};
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;
const IST_TIME_FORMAT: &str = "IST %H:%M:%S";

/// Formats `now` as India Standard Time, e.g. `IST 17:35:09`.
pub fn format_ist_time(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => now.with_timezone(&ist).format(IST_TIME_FORMAT).to_string(),
        None => now.format("UTC %H:%M:%S").to_string(),
    }
}

/// Background ticker that reports formatted time at a fixed interval.
pub struct ClockTicker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ClockTicker {
    /// Starts the ticker; `on_tick` runs once immediately, then every `interval`.
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> io::Result<Self>
    where
        F: FnMut(String) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("folio-clock".to_string())
            .spawn(move || loop {
                on_tick(format_ist_time(Utc::now()));
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        debug!(
            "event=clock_start module=clock status=ok interval_ms={}",
            interval.as_millis()
        );
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops the ticker and waits for its thread to exit.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("event=clock_stop module=clock status=error reason=tick_panicked");
            }
        }
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{format_ist_time, ClockTicker};
    use chrono::{TimeZone, Utc};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn format_ist_time_applies_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 9).unwrap();
        assert_eq!(format_ist_time(now), "IST 17:35:09");
    }

    #[test]
    fn format_ist_time_wraps_past_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        assert_eq!(format_ist_time(now), "IST 01:30:00");
    }

    #[test]
    fn ticker_fires_immediately_and_stops_on_cancel() {
        let (tx, rx) = mpsc::channel();
        let ticker = ClockTicker::spawn(Duration::from_secs(60), move |text| {
            let _ = tx.send(text);
        })
        .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(first.starts_with("IST "));
        ticker.cancel();
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn ticker_repeats_on_interval() {
        let (tx, rx) = mpsc::channel();
        let _ticker = ClockTicker::spawn(Duration::from_millis(10), move |text| {
            let _ = tx.send(text);
        })
        .unwrap();

        for _ in 0..3 {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
    }
}
