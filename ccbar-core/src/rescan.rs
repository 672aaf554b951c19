//! Rescan scheduling.
//!
//! Every reason to look for new comment inputs (startup, the poll timer,
//! history navigation, DOM insertions, the page becoming visible again) is a
//! [`RescanTrigger`] sent over one channel to a single scheduler task. The
//! scheduler decides when a scan actually runs and hands that decision to the
//! UI loop, which performs the scan and reports back with
//! [`TriggerSender::scan_done`].
//!
//! Scheduling rules live in [`RescanGate`], which is plain data driven by
//! explicit instants so it can be tested without a runtime:
//! - DOM insertions are debounced; triggers arriving mid-debounce ride the
//!   pending deadline.
//! - Navigation scans at once and again after each retry delay.
//! - At most one scan is in flight; anything requested meanwhile collapses
//!   into a single follow-up scan.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Why a scan was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RescanTrigger {
    Initial,
    Timer,
    Navigation,
    DomMutation,
    Visibility,
}

/// Timing knobs for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescanConfig {
    pub poll_interval: Duration,
    pub debounce: Duration,
    /// Extra scans after a navigation, measured from the navigation itself.
    pub navigation_retries: Vec<Duration>,
}

impl Default for RescanConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            debounce: Duration::from_millis(100),
            navigation_retries: vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
            ],
        }
    }
}

/// Busy flag, debounce deadline and retry queue.
#[derive(Debug, Clone)]
pub struct RescanGate {
    debounce: Duration,
    retry_delays: Vec<Duration>,
    busy: bool,
    follow_up: Option<RescanTrigger>,
    debounce_deadline: Option<Instant>,
    retries: Vec<Instant>,
}

impl RescanGate {
    pub fn new(config: &RescanConfig) -> Self {
        Self {
            debounce: config.debounce,
            retry_delays: config.navigation_retries.clone(),
            busy: false,
            follow_up: None,
            debounce_deadline: None,
            retries: Vec::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Handles an incoming trigger. Returns the scan to start now, if any.
    pub fn on_trigger(&mut self, trigger: RescanTrigger, now: Instant) -> Option<RescanTrigger> {
        match trigger {
            RescanTrigger::DomMutation => {
                if self.debounce_deadline.is_none() {
                    self.debounce_deadline = Some(now + self.debounce);
                }
                None
            }
            RescanTrigger::Navigation => {
                self.retries = self.retry_delays.iter().map(|d| now + *d).collect();
                self.retries.sort();
                self.request(trigger)
            }
            _ => self.request(trigger),
        }
    }

    /// The UI finished a scan. Returns the queued follow-up, if any.
    pub fn on_scan_done(&mut self) -> Option<RescanTrigger> {
        self.busy = false;
        let next = self.follow_up.take()?;
        self.busy = true;
        Some(next)
    }

    /// Earliest instant at which [`RescanGate::on_deadline`] has work.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.retries.first().copied()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires every deadline that is due at `now`, coalesced into one request.
    pub fn on_deadline(&mut self, now: Instant) -> Option<RescanTrigger> {
        let mut due = None;
        if self.debounce_deadline.is_some_and(|d| d <= now) {
            self.debounce_deadline = None;
            due = Some(RescanTrigger::DomMutation);
        }
        let before = self.retries.len();
        self.retries.retain(|&at| at > now);
        if self.retries.len() < before {
            due = Some(RescanTrigger::Navigation);
        }
        self.request(due?)
    }

    fn request(&mut self, trigger: RescanTrigger) -> Option<RescanTrigger> {
        if self.busy {
            self.follow_up.get_or_insert(trigger);
            return None;
        }
        self.busy = true;
        Some(trigger)
    }
}

#[derive(Debug)]
enum Message {
    Trigger(RescanTrigger),
    ScanDone,
}

/// Producer handle onto the scheduler. Cheap to clone; one per source.
#[derive(Debug, Clone)]
pub struct TriggerSender(mpsc::UnboundedSender<Message>);

impl TriggerSender {
    /// Requests a scan. Returns `false` once the scheduler has stopped.
    pub fn send(&self, trigger: RescanTrigger) -> bool {
        self.0.send(Message::Trigger(trigger)).is_ok()
    }

    /// Reports that the scan last handed out has finished.
    pub fn scan_done(&self) -> bool {
        self.0.send(Message::ScanDone).is_ok()
    }
}

/// Spawns the scheduler task.
///
/// `emit` receives each scan to run; returning `false` (the UI is gone) stops
/// the task. The task also stops when every [`TriggerSender`] is dropped.
pub fn spawn_scheduler<F>(config: RescanConfig, mut emit: F) -> (TriggerSender, JoinHandle<()>)
where
    F: FnMut(RescanTrigger) -> bool + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        let mut gate = RescanGate::new(&config);
        loop {
            let deadline = gate.next_deadline();
            let scan = tokio::select! {
                msg = rx.recv() => match msg {
                    Some(Message::Trigger(trigger)) => {
                        trace!(?trigger, busy = gate.is_busy(), "rescan trigger");
                        gate.on_trigger(trigger, Instant::now())
                    }
                    Some(Message::ScanDone) => gate.on_scan_done(),
                    None => break,
                },
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    gate.on_deadline(Instant::now())
                }
            };
            if let Some(trigger) = scan {
                debug!(?trigger, "scan requested");
                if !emit(trigger) {
                    break;
                }
            }
        }
    });
    (TriggerSender(tx), handle)
}

/// Spawns the poll timer feeding [`RescanTrigger::Timer`] every `period`.
pub fn spawn_timer(period: Duration, triggers: TriggerSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if !triggers.send(RescanTrigger::Timer) {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn dom_bursts_collapse_into_one_debounced_scan() {
        let t0 = Instant::now();
        let mut gate = RescanGate::new(&RescanConfig::default());

        assert_eq!(gate.on_trigger(RescanTrigger::DomMutation, t0), None);
        assert_eq!(gate.on_trigger(RescanTrigger::DomMutation, t0 + ms(40)), None);
        assert_eq!(gate.next_deadline(), Some(t0 + ms(100)));

        assert_eq!(gate.on_deadline(t0 + ms(99)), None);
        assert_eq!(gate.on_deadline(t0 + ms(100)), Some(RescanTrigger::DomMutation));
        assert_eq!(gate.next_deadline(), None);
    }

    #[test]
    fn busy_gate_queues_a_single_follow_up() {
        let t0 = Instant::now();
        let mut gate = RescanGate::new(&RescanConfig::default());

        assert_eq!(gate.on_trigger(RescanTrigger::Initial, t0), Some(RescanTrigger::Initial));
        assert_eq!(gate.on_trigger(RescanTrigger::Timer, t0), None);
        assert_eq!(gate.on_trigger(RescanTrigger::Visibility, t0), None);

        assert_eq!(gate.on_scan_done(), Some(RescanTrigger::Timer));
        assert!(gate.is_busy());
        assert_eq!(gate.on_scan_done(), None);
        assert!(!gate.is_busy());
    }

    #[test]
    fn navigation_schedules_retries() {
        let t0 = Instant::now();
        let mut gate = RescanGate::new(&RescanConfig::default());

        assert_eq!(
            gate.on_trigger(RescanTrigger::Navigation, t0),
            Some(RescanTrigger::Navigation)
        );
        gate.on_scan_done();
        assert_eq!(gate.next_deadline(), Some(t0 + ms(500)));
        assert_eq!(gate.on_deadline(t0 + ms(500)), Some(RescanTrigger::Navigation));
        gate.on_scan_done();
        // Two late retries due together run once.
        assert_eq!(gate.on_deadline(t0 + ms(2500)), Some(RescanTrigger::Navigation));
        assert_eq!(gate.next_deadline(), None);
    }

    #[test]
    fn new_navigation_replaces_pending_retries() {
        let t0 = Instant::now();
        let mut gate = RescanGate::new(&RescanConfig::default());
        gate.on_trigger(RescanTrigger::Navigation, t0);
        gate.on_scan_done();
        gate.on_trigger(RescanTrigger::Navigation, t0 + ms(300));
        assert_eq!(gate.next_deadline(), Some(t0 + ms(800)));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_emits_and_waits_for_scan_done() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (triggers, _task) =
            spawn_scheduler(RescanConfig::default(), move |t| out_tx.send(t).is_ok());

        triggers.send(RescanTrigger::Initial);
        assert_eq!(out_rx.recv().await, Some(RescanTrigger::Initial));

        for _ in 0..5 {
            triggers.send(RescanTrigger::DomMutation);
        }
        time::sleep(ms(150)).await;
        assert!(out_rx.try_recv().is_err(), "scan still in flight");

        triggers.scan_done();
        assert_eq!(out_rx.recv().await, Some(RescanTrigger::DomMutation));
        triggers.scan_done();
        time::sleep(ms(500)).await;
        assert!(out_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_feeds_the_scheduler() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (triggers, _task) =
            spawn_scheduler(RescanConfig::default(), move |t| out_tx.send(t).is_ok());
        let _timer = spawn_timer(ms(1000), triggers.clone());

        assert_eq!(out_rx.recv().await, Some(RescanTrigger::Timer));
        triggers.scan_done();
        assert_eq!(out_rx.recv().await, Some(RescanTrigger::Timer));
    }
}
