//! Progress observers
//!
//! [`ConsoleProgressObserver`] renders stage updates for the terminal;
//! [`MemoryProgressObserver`] keeps them for inspection.

use std::io::Write;
use std::sync::{Arc, Mutex};
use crate::progress::{ProgressInfo, ProgressObserver, StepState};

/// Prints one line per stage update
///
/// Started and succeeded updates go to stdout, failures to stderr.
pub struct ConsoleProgressObserver;

impl ConsoleProgressObserver {
    pub fn new() -> Self {
        Self
    }

    /// Line printed for an update
    pub fn format_line(&self, progress: &ProgressInfo) -> String {
        let details = progress.details.as_deref().unwrap_or(progress.step.as_str());
        let marker = match progress.state {
            StepState::Started => "…",
            StepState::Succeeded => "✔",
            StepState::Failed => "✖",
        };
        format!("{} {}", marker, details)
    }
}

impl Default for ConsoleProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        let line = self.format_line(&progress);
        if progress.state == StepState::Failed {
            eprintln!("{}", line);
        } else {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{}", line);
            let _ = stdout.flush();
        }
    }
}

/// Stores every update in memory
pub struct MemoryProgressObserver {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl MemoryProgressObserver {
    pub fn new() -> Self {
        Self {
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the updates received so far
    pub fn history(&self) -> Vec<ProgressInfo> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Handle that stays readable after the observer is moved into a tracker
    pub fn shared_history(&self) -> Arc<Mutex<Vec<ProgressInfo>>> {
        self.history.clone()
    }
}

impl Default for MemoryProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for MemoryProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        if let Ok(mut history) = self.history.lock() {
            history.push(progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProcessStep;

    fn update(state: StepState, details: Option<&str>) -> ProgressInfo {
        ProgressInfo {
            step: ProcessStep::SpeechGeneration,
            state,
            total_progress: 5.0,
            details: details.map(str::to_string),
        }
    }

    #[test]
    fn console_lines_use_state_markers() {
        let observer = ConsoleProgressObserver::new();
        assert_eq!(
            observer.format_line(&update(StepState::Succeeded, Some("Speech generated"))),
            "✔ Speech generated"
        );
        assert_eq!(
            observer.format_line(&update(StepState::Failed, Some("Failed"))),
            "✖ Failed"
        );
        assert_eq!(
            observer.format_line(&update(StepState::Started, None)),
            "… Speech generation"
        );
    }

    #[test]
    fn memory_observer_keeps_history() {
        let observer = MemoryProgressObserver::new();
        observer.on_progress_update(update(StepState::Started, None));
        observer.on_progress_update(update(StepState::Succeeded, None));
        assert_eq!(observer.history().len(), 2);
        assert_eq!(observer.shared_history().lock().unwrap().len(), 2);
    }
}
