//! Commands queued from the UI to the backend worker.

use client_core::Submission;

pub enum BackendCommand {
    Submit { submission: Submission },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::CheckHealth => "check_health",
        }
    }
}
