use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use scout_runtime::{DiscoveryObserver, Stage};

/// Draws one progress bar per discovery stage.
pub struct ProgressObserver {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ProgressObserver {
    /// Draw bars on stderr.
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: false,
        }
    }

    /// Track progress without drawing anything.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        self.bar
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|bar| bar.position()))
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl DiscoveryObserver for ProgressObserver {
    fn stage_started(&self, stage: Stage, total: usize) {
        let bar = ProgressBar::new(total as u64);
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(bar_style());
        bar.set_message(stage.label());

        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.abandon();
            }
        }
    }

    fn task_finished(&self, _stage: Stage) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn stage_finished(&self, _stage: Stage) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_finished_tasks() {
        let observer = ProgressObserver::hidden();
        observer.stage_started(Stage::Probe, 3);
        observer.task_finished(Stage::Probe);
        observer.task_finished(Stage::Probe);

        assert_eq!(observer.position(), Some(2));
    }

    #[test]
    fn test_new_stage_resets_bar() {
        let observer = ProgressObserver::hidden();
        observer.stage_started(Stage::SeedFetch, 1);
        observer.task_finished(Stage::SeedFetch);
        observer.stage_finished(Stage::SeedFetch);
        observer.stage_started(Stage::Probe, 10);

        assert_eq!(observer.position(), Some(0));
    }

    #[test]
    fn test_events_before_any_stage_are_ignored() {
        let observer = ProgressObserver::hidden();
        observer.task_finished(Stage::Expansion);
        assert_eq!(observer.position(), None);
    }
}
