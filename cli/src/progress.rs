//! Progress reporting for batch runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use triad_application::SolveProgressNotifier;
use triad_domain::{TaskId, TrajectoryStatus};

/// Reports batch progress on a single bar, one tick per finished task
pub struct ConsoleProgress {
    bar: ProgressBar,
    failed: AtomicUsize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(Self::batch_style());
        bar.set_prefix("tasks");
        Self {
            bar,
            failed: AtomicUsize::new(0),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    /// The bar log output must be routed around
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        let failed = self.failed();
        let message = if failed == 0 {
            "done".green().to_string()
        } else {
            format!("done, {} failed", failed).yellow().to_string()
        };
        self.bar.finish_with_message(message);
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SolveProgressNotifier for ConsoleProgress {
    fn on_task_start(&self, task_id: &TaskId, _index: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_message(format!("task {} started", task_id));
    }

    fn on_iteration(&self, task_id: &TaskId, iteration: usize, max_iterations: usize) {
        self.bar
            .set_message(format!("task {} iteration {}/{}", task_id, iteration, max_iterations));
    }

    fn on_task_complete(&self, task_id: &TaskId, status: Option<TrajectoryStatus>) {
        match status {
            Some(TrajectoryStatus::Completed) => {
                self.bar.set_message(format!("{} task {}", "v".green(), task_id));
            }
            Some(status) => {
                self.bar
                    .set_message(format!("{} task {} {}", "-".yellow(), task_id, status));
            }
            None => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                self.bar
                    .println(format!("  {} task {} failed", "x".red(), task_id));
            }
        }
        self.bar.inc(1);
    }
}

/// Log writer that hides the progress bar while a line is written to stderr
pub struct SuspendingWriter {
    bar: Option<ProgressBar>,
}

impl SuspendingWriter {
    pub fn new(bar: Option<ProgressBar>) -> Self {
        Self { bar }
    }
}

impl Write for SuspendingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.bar {
            Some(bar) => bar.suspend(|| io::stderr().write(buf)),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
