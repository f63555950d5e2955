//! Terminal progress bars fed by the coordinator's polling loop.

use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};

use tablec_core::{Phase, ProgressObserver};

const TEMPLATE: &str = "{prefix:>10.cyan.bold} [{bar:32}] {pos}/{len} {msg}";

/// One bar per parallel phase, cleared when the phase ends.
#[derive(Default)]
pub struct BarProgress {
    bar: RefCell<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unit(phase: Phase) -> &'static str {
    match phase {
        Phase::Ingest | Phase::References => "sheets",
        Phase::Validate => "tables",
    }
}

impl ProgressObserver for BarProgress {
    fn phase_started(&self, phase: Phase, total: usize) {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(total as u64)
            .with_style(style)
            .with_prefix(phase.as_str())
            .with_message(unit(phase));
        self.bar.replace(Some(bar));
    }

    fn progress(&self, _phase: Phase, completed: usize, _total: usize) {
        if let Some(bar) = self.bar.borrow().as_ref() {
            bar.set_position(completed as u64);
        }
    }

    fn phase_finished(&self, _phase: Phase) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
