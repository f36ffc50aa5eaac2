use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Events emitted while a batch runs. Progress is emitted once per term,
/// before that term's processing begins, in strictly increasing index
/// order; exactly one terminal event (`Complete` or `Failed`) follows.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchEvent {
    #[serde(rename = "progress")]
    Progress {
        index: usize,
        total: usize,
        term: String,
    },

    #[serde(rename = "complete")]
    Complete {
        count: usize,
        generated_at: DateTime<Utc>,
        cards: Vec<Card>,
    },

    #[serde(rename = "failed")]
    Failed { message: String },
}

impl BatchEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Complete { .. } => "complete",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}
