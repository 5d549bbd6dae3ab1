//! The single in-progress session and its lifecycle. Every mutation of the
//! record goes through the transition methods here; the surface only renders
//! and collects text.

pub mod record;

use chrono::{DateTime, Local};
use thiserror::Error;

pub use record::{SessionRecord, SessionRow};

/// Fixed set of focus categories offered by the surface.
pub const CATEGORIES: [&str; 11] = [
    "Software Architecture",
    "Machine Learning + AI",
    "Web Development",
    "Database Architecture",
    "Data Science",
    "Cybersecurity",
    "Networking",
    "Cloud Computing",
    "DevOps",
    "History",
    "Other",
];

/// Lifecycle stage of the session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Active,
    AwaitingTakeaways,
    AwaitingChallenges,
    Submitted,
}

/// Reflection prompt pending after the stopwatch was stopped. Derived from
/// the stage so the two prompts always run in order, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    KeyTakeaways,
    Challenges,
}

impl Prompt {
    pub fn title(self) -> &'static str {
        match self {
            Prompt::KeyTakeaways => "What are the key takeaways?",
            Prompt::Challenges => "Any challenges/questions?",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please choose a category for this session")]
    EmptyCategory,
    #[error("please state at least one objective for this session")]
    EmptyObjectives,
}

/// The single mutable session record of a run. Created `Idle` at process
/// start and discarded at process exit; the only thing that outlives it is
/// the row appended to the remote store.
#[derive(Debug)]
pub struct Session {
    stage: Stage,
    category: String,
    objectives: String,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
    elapsed_seconds: u64,
    key_takeaways: String,
    challenges: String,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            category: String::new(),
            objectives: String::new(),
            start_time: None,
            end_time: None,
            elapsed_seconds: 0,
            key_takeaways: String::new(),
            challenges: String::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Idle → Active. Both fields must be non-empty after trimming, otherwise
    /// the session is left untouched and the caller may retry.
    pub fn start(
        &mut self,
        category: &str,
        objectives: &str,
        now: DateTime<Local>,
    ) -> Result<(), ValidationError> {
        if self.stage != Stage::Idle {
            return Ok(());
        }
        let category = category.trim();
        let objectives = objectives.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if objectives.is_empty() {
            return Err(ValidationError::EmptyObjectives);
        }
        self.category = category.to_owned();
        self.objectives = objectives.to_owned();
        self.start_time = Some(now);
        self.stage = Stage::Active;
        Ok(())
    }

    /// Delivers one stopwatch tick. Counts only while the session is active;
    /// returns the elapsed seconds either way so the caller can render.
    pub fn tick(&mut self) -> u64 {
        if self.stage == Stage::Active {
            self.elapsed_seconds += 1;
        }
        self.elapsed_seconds
    }

    /// Active → AwaitingTakeaways. Freezes the stopwatch and records the end
    /// timestamp.
    pub fn stop(&mut self, now: DateTime<Local>) {
        if self.stage != Stage::Active {
            return;
        }
        self.end_time = Some(now);
        self.stage = Stage::AwaitingTakeaways;
    }

    /// The reflection prompt the surface should show next, if any.
    pub fn pending_prompt(&self) -> Option<Prompt> {
        match self.stage {
            Stage::AwaitingTakeaways => Some(Prompt::KeyTakeaways),
            Stage::AwaitingChallenges => Some(Prompt::Challenges),
            _ => None,
        }
    }

    /// Stores the trimmed answer to the pending prompt; empty answers are
    /// allowed. Completing the second prompt moves the session to `Submitted`
    /// and yields the finished record for the sink. The record is produced at
    /// most once per session.
    pub fn submit_prompt(&mut self, text: &str) -> Option<SessionRecord> {
        match self.stage {
            Stage::AwaitingTakeaways => {
                self.key_takeaways = text.trim().to_owned();
                self.stage = Stage::AwaitingChallenges;
                None
            }
            Stage::AwaitingChallenges => {
                self.challenges = text.trim().to_owned();
                self.stage = Stage::Submitted;
                Some(SessionRecord {
                    category: self.category.clone(),
                    objectives: self.objectives.clone(),
                    key_takeaways: self.key_takeaways.clone(),
                    challenges: self.challenges.clone(),
                    start_time: self.start_time.expect("an active session was started"),
                    end_time: self.end_time.expect("a stopped session has an end time"),
                    elapsed_seconds: self.elapsed_seconds,
                })
            }
            _ => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
