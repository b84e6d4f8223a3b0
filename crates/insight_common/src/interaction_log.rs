//! Interaction Log - bounded, chronological record of answered questions.
//!
//! FIFO eviction at capacity. The log does no I/O of its own; persistence
//! goes through `export_all` / `import_all`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How many entries `LogSummary::recent` counts at most
pub const RECENT_WINDOW: usize = 5;

/// One answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    pub agent_response: String,
    pub confidence: f32,

    #[serde(default)]
    pub data_used: Vec<String>,

    #[serde(default)]
    pub insights: Vec<String>,
}

impl Interaction {
    pub fn new(
        user_input: impl Into<String>,
        agent_response: impl Into<String>,
        confidence: f32,
        data_used: Vec<String>,
        insights: Vec<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_input: user_input.into(),
            agent_response: agent_response.into(),
            confidence: unit_confidence(confidence),
            data_used,
            insights,
        }
    }

    /// Case-folded substring match on input or response
    pub fn matches(&self, lower_term: &str) -> bool {
        self.user_input.to_lowercase().contains(lower_term)
            || self.agent_response.to_lowercase().contains(lower_term)
    }
}

/// Aggregate view of the log. Confidence statistics are only present when
/// the log is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,

    /// Interactions in the recent window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct InteractionLog {
    entries: VecDeque<Interaction>,
    capacity: usize,
}

impl InteractionLog {
    /// A zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.entries.iter()
    }

    /// Append, evicting the oldest entry at capacity. Returns the evicted one.
    pub fn append(&mut self, interaction: Interaction) -> Option<Interaction> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(interaction);
        if evicted.is_some() {
            tracing::debug!(capacity = self.capacity, "interaction log full, evicted oldest");
        }
        evicted
    }

    pub fn summary(&self) -> LogSummary {
        let total = self.entries.len();
        if total == 0 {
            return LogSummary {
                total: 0,
                average_confidence: None,
                min_confidence: None,
                max_confidence: None,
                first_timestamp: None,
                last_timestamp: None,
                recent: None,
            };
        }

        let sum: f32 = self.entries.iter().map(|i| i.confidence).sum();
        let min = self
            .entries
            .iter()
            .map(|i| i.confidence)
            .fold(f32::INFINITY, f32::min);
        let max = self
            .entries
            .iter()
            .map(|i| i.confidence)
            .fold(f32::NEG_INFINITY, f32::max);

        LogSummary {
            total,
            average_confidence: Some(sum / total as f32),
            min_confidence: Some(min),
            max_confidence: Some(max),
            first_timestamp: self.entries.front().map(|i| i.timestamp),
            last_timestamp: self.entries.back().map(|i| i.timestamp),
            recent: Some(total.min(RECENT_WINDOW)),
        }
    }

    /// Case-insensitive substring search, chronological order
    pub fn search(&self, term: &str) -> Vec<&Interaction> {
        let lower = term.to_lowercase();
        self.entries.iter().filter(|i| i.matches(&lower)).collect()
    }

    /// Last `limit` interactions, oldest first
    pub fn recent(&self, limit: usize) -> Vec<&Interaction> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).collect()
    }

    pub fn with_min_confidence(&self, min: f32) -> Vec<&Interaction> {
        self.entries.iter().filter(|i| i.confidence >= min).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn export_all(&self) -> Vec<Interaction> {
        self.entries.iter().cloned().collect()
    }

    /// Replace the content. Only the newest `capacity` entries are kept.
    pub fn import_all(&mut self, interactions: Vec<Interaction>) {
        let skip = interactions.len().saturating_sub(self.capacity);
        if skip > 0 {
            tracing::warn!(
                dropped = skip,
                capacity = self.capacity,
                "import exceeds capacity, oldest entries dropped"
            );
        }
        let mut clamped = 0;
        self.entries = interactions
            .into_iter()
            .skip(skip)
            .map(|mut interaction| {
                let confidence = unit_confidence(interaction.confidence);
                if confidence != interaction.confidence {
                    clamped += 1;
                    interaction.confidence = confidence;
                }
                interaction
            })
            .collect();
        if clamped > 0 {
            tracing::warn!(clamped, "imported confidences outside [0, 1] were clamped");
        }
    }
}

fn unit_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
