//! Session history for the host page.
//!
//! Every entry change (push, replace, back, forward) goes through
//! [`History`], which reports it to the rescan scheduler as a navigation.

use tracing::debug;

use crate::rescan::{RescanTrigger, TriggerSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Push,
    Replace,
    Pop,
}

/// A stack of visited locations with a cursor, like a browser tab's history.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
    hook: Option<TriggerSender>,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            index: 0,
            hook: None,
        }
    }

    /// Routes every later navigation to `hook`.
    pub fn with_hook(mut self, hook: TriggerSender) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    /// Adds a new entry after the current one, dropping any forward entries.
    pub fn push_state(&mut self, location: impl Into<String>) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location.into());
        self.index = self.entries.len() - 1;
        self.notify(Navigation::Push);
    }

    pub fn replace_state(&mut self, location: impl Into<String>) {
        self.entries[self.index] = location.into();
        self.notify(Navigation::Replace);
    }

    /// Moves one entry back. Returns the new location, or `None` at the start.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        self.notify(Navigation::Pop);
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.notify(Navigation::Pop);
        Some(self.current())
    }

    fn notify(&self, kind: Navigation) {
        debug!(?kind, location = self.current(), "navigation");
        if let Some(hook) = &self.hook {
            hook.send(RescanTrigger::Navigation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rescan::{spawn_scheduler, RescanConfig};
    use tokio::sync::mpsc;

    #[test]
    fn push_truncates_forward_entries() {
        let mut history = History::new("/pull/1");
        history.push_state("/pull/1/files");
        history.push_state("/pull/1/commits");
        assert_eq!(history.back(), Some("/pull/1/files"));
        history.push_state("/pull/1/checks");
        assert_eq!(history.forward(), None);
        assert_eq!(history.back(), Some("/pull/1/files"));
        assert_eq!(history.back(), Some("/pull/1"));
        assert_eq!(history.back(), None);
    }

    #[test]
    fn replace_keeps_position() {
        let mut history = History::new("/pull/1");
        history.replace_state("/pull/1#top");
        assert_eq!(history.current(), "/pull/1#top");
        assert!(!history.can_go_back());
    }

    #[tokio::test(start_paused = true)]
    async fn every_navigation_reaches_the_scheduler() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (triggers, _task) = spawn_scheduler(RescanConfig::default(), move |t| out_tx.send(t).is_ok());
        let mut history = History::new("/pull/1").with_hook(triggers.clone());

        history.push_state("/pull/1/files");
        assert_eq!(out_rx.recv().await, Some(RescanTrigger::Navigation));
        triggers.scan_done();

        history.back();
        assert_eq!(out_rx.recv().await, Some(RescanTrigger::Navigation));
    }
}
