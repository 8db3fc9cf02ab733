use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ExamError;
use crate::responses::ResponseStore;

/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second elapsed; carries the remaining time.
    Tick(u64),
    /// The countdown hit zero. Emitted exactly once.
    Expired,
    /// The clock is not running; nothing changed.
    Idle,
}

/// The single countdown for a session.
///
/// Each tick takes one second off the global countdown and credits it to the
/// active question. The clock only advances while running.
#[derive(Debug, Clone)]
pub struct SessionClock {
    remaining: u64,
    running: bool,
    expired: bool,
}

impl SessionClock {
    pub fn new(limit_seconds: u64) -> Self {
        Self {
            remaining: limit_seconds,
            running: false,
            expired: false,
        }
    }

    pub fn start(&mut self) {
        if !self.expired {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn tick(
        &mut self,
        store: &mut ResponseStore,
        active_question: &str,
    ) -> Result<ClockEvent, ExamError> {
        if !self.running {
            return Ok(ClockEvent::Idle);
        }
        if self.remaining > 0 {
            store.add_elapsed(active_question, 1)?;
            self.remaining -= 1;
        }
        if self.remaining == 0 {
            self.running = false;
            if !self.expired {
                self.expired = true;
                return Ok(ClockEvent::Expired);
            }
            return Ok(ClockEvent::Idle);
        }
        Ok(ClockEvent::Tick(self.remaining))
    }
}

/// Message from the ticker thread. `epoch` identifies the session attempt the
/// ticker was started for so stale ticks can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub epoch: u64,
}

/// Handle to a background thread that emits one [`TimerEvent`] per second.
/// The thread exits once stopped or once the receiver is gone.
pub struct Ticker {
    rx: mpsc::Receiver<TimerEvent>,
    stop: Arc<AtomicBool>,
}

impl Ticker {
    pub fn try_recv(&self) -> Option<TimerEvent> {
        self.rx.try_recv().ok()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn_ticker(epoch: u64) -> Ticker {
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    thread::spawn(move || {
        let started = Instant::now();
        let mut n: u32 = 0;
        loop {
            n += 1;
            let due = started + Duration::from_secs(n as u64);
            // Sleep in short slices so a stop request is honoured promptly.
            loop {
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                let now = Instant::now();
                if now >= due {
                    break;
                }
                thread::sleep((due - now).min(Duration::from_millis(50)));
            }
            if tx.send(TimerEvent { epoch }).is_err() {
                return;
            }
        }
    });

    Ticker { rx, stop }
}

/// `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// `Xm Ys`, as shown on the result screen.
pub fn format_minutes(total_secs: u64) -> String {
    format!("{}m {}s", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, Quiz};

    fn store() -> ResponseStore {
        let quiz = Quiz::new(
            "Clock",
            "",
            vec![],
            3,
            vec![
                Question::new("a", "A", vec!["x".into(), "y".into()], 0),
                Question::new("b", "B", vec!["x".into(), "y".into()], 1),
            ],
        )
        .unwrap();
        ResponseStore::initialize(&quiz)
    }

    #[test]
    fn test_idle_until_started() {
        let mut store = store();
        let mut clock = SessionClock::new(3);
        assert_eq!(clock.tick(&mut store, "a").unwrap(), ClockEvent::Idle);
        assert_eq!(clock.remaining(), 3);
        assert_eq!(store.total_elapsed(), 0);
    }

    #[test]
    fn test_countdown_attributes_and_expires_once() {
        let mut store = store();
        let mut clock = SessionClock::new(3);
        clock.start();

        assert_eq!(clock.tick(&mut store, "a").unwrap(), ClockEvent::Tick(2));
        assert_eq!(clock.tick(&mut store, "b").unwrap(), ClockEvent::Tick(1));
        assert_eq!(clock.tick(&mut store, "b").unwrap(), ClockEvent::Expired);
        assert_eq!(clock.remaining(), 0);
        assert!(!clock.is_running());

        clock.start();
        assert_eq!(clock.tick(&mut store, "b").unwrap(), ClockEvent::Idle);
        assert_eq!(clock.remaining(), 0);

        assert_eq!(store.get("a").unwrap().time_spent, 1);
        assert_eq!(store.get("b").unwrap().time_spent, 2);
        assert_eq!(store.total_elapsed(), 3);
    }

    #[test]
    fn test_stopped_clock_ignores_ticks() {
        let mut store = store();
        let mut clock = SessionClock::new(10);
        clock.start();
        clock.tick(&mut store, "a").unwrap();
        clock.stop();
        assert_eq!(clock.tick(&mut store, "a").unwrap(), ClockEvent::Idle);
        assert_eq!(clock.remaining(), 9);
        assert_eq!(store.total_elapsed(), 1);
    }

    #[test]
    fn test_ticker_stops() {
        let ticker = spawn_ticker(7);
        ticker.stop();
        thread::sleep(Duration::from_millis(1200));
        while ticker.try_recv().is_some() {}
        thread::sleep(Duration::from_millis(1100));
        assert!(ticker.try_recv().is_none());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3725), "1:02:05");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m 0s");
        assert_eq!(format_minutes(125), "2m 5s");
    }
}
