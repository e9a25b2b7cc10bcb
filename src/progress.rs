//! Progress tracking for the generation pipeline
//!
//! The pipeline reports the start, success or failure of each stage to a
//! [`ProgressTracker`], which fans the update out to its observers.

use std::collections::HashMap;
use std::sync::RwLock;
use serde::{Deserialize, Serialize};

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessStep {
    /// Credential, input text and avatar checks
    Validation,
    /// Text-to-speech call
    SpeechGeneration,
    /// External talking-head generation
    VideoGeneration,
}

impl ProcessStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "Validation",
            Self::SpeechGeneration => "Speech generation",
            Self::VideoGeneration => "Video generation",
        }
    }

    /// Share of the whole run, in percent
    pub fn weight(&self) -> f32 {
        match self {
            Self::Validation => 5.0,
            Self::SpeechGeneration => 25.0,
            Self::VideoGeneration => 70.0,
        }
    }
}

/// State of a stage within a single update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    Started,
    Succeeded,
    Failed,
}

/// A single progress update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub step: ProcessStep,
    pub state: StepState,
    /// Completed share of the run (0.0 - 100.0)
    pub total_progress: f32,
    /// Human-readable message for this update
    pub details: Option<String>,
}

/// Receives progress updates
pub trait ProgressObserver: Send + Sync {
    fn on_progress_update(&self, progress: ProgressInfo);
}

/// Tracks completed stages and notifies observers
pub struct ProgressTracker {
    observers: Vec<Box<dyn ProgressObserver>>,
    completed_steps: RwLock<HashMap<ProcessStep, f32>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            completed_steps: RwLock::new(HashMap::new()),
        }
    }

    /// Register an observer
    pub fn add_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    /// Report that a stage has begun
    pub fn start_step(&self, step: ProcessStep, details: impl Into<String>) {
        self.report(step, StepState::Started, Some(details.into()));
    }

    /// Report a message within a stage that has already begun and is going well
    pub fn succeed_step(&self, step: ProcessStep, details: impl Into<String>) {
        self.report(step, StepState::Succeeded, Some(details.into()));
    }

    /// Mark a stage as done
    pub fn finish_step(&self, step: ProcessStep, details: impl Into<String>) {
        if let Ok(mut completed) = self.completed_steps.write() {
            completed.insert(step, 100.0);
        }
        self.report(step, StepState::Succeeded, Some(details.into()));
    }

    /// Report that a stage failed; the run stops after this
    pub fn fail_step(&self, step: ProcessStep, details: impl Into<String>) {
        self.report(step, StepState::Failed, Some(details.into()));
    }

    /// Completed share of the run
    pub fn total_progress(&self) -> f32 {
        let completed = match self.completed_steps.read() {
            Ok(completed) => completed,
            Err(_) => return 0.0,
        };
        completed
            .iter()
            .map(|(step, progress)| step.weight() * progress / 100.0)
            .sum::<f32>()
            .clamp(0.0, 100.0)
    }

    fn report(&self, step: ProcessStep, state: StepState, details: Option<String>) {
        let progress = ProgressInfo {
            step,
            state,
            total_progress: self.total_progress(),
            details,
        };
        log::debug!(
            "{} {:?} ({:.0}%): {}",
            step.as_str(),
            state,
            progress.total_progress,
            progress.details.as_deref().unwrap_or("")
        );
        for observer in &self.observers {
            observer.on_progress_update(progress.clone());
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
