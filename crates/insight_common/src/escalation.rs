//! Escalation Gate - decides whether to hand the question to a human.
//!
//! Evaluated once, before any data access. Every rule is checked; the
//! reasons accumulate instead of stopping at the first hit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::Context;
use crate::intent::Intent;

/// Default minimum confidence for automatic execution
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// More metrics than this is too much for one answer
pub const MAX_METRICS: usize = 3;

/// Regions and cities both above this count is compounded complexity
pub const MAX_REGIONS_WITH_CITIES: usize = 2;

/// A comparison over more metrics than this needs a human
pub const MAX_COMPARISON_METRICS: usize = 2;

/// Message used when nothing triggered
pub const AUTO_EXECUTABLE: &str = "analysis can be executed automatically";

/// Why a request was escalated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationReason {
    LowConfidence { confidence: f32, threshold: f32 },
    UnknownIntent,
    TooManyMetrics { count: usize },
    ComplexScope { regions: usize, cities: usize },
    ComplexComparison { metrics: usize },
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationReason::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "low confidence ({:.2} < {:.2})", confidence, threshold),
            EscalationReason::UnknownIntent => write!(f, "analysis type not recognised"),
            EscalationReason::TooManyMetrics { count } => {
                write!(f, "too many metrics requested ({})", count)
            }
            EscalationReason::ComplexScope { regions, cities } => write!(
                f,
                "analysis too complex ({} regions and {} cities)",
                regions, cities
            ),
            EscalationReason::ComplexComparison { metrics } => {
                write!(f, "complex comparison over {} metrics", metrics)
            }
        }
    }
}

/// Gate verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub escalate: bool,
    pub reasons: Vec<EscalationReason>,
}

impl EscalationDecision {
    /// All triggered reasons joined with "; ", or the auto-executable message
    pub fn reason_text(&self) -> String {
        if self.reasons.is_empty() {
            AUTO_EXECUTABLE.to_string()
        } else {
            self.reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EscalationGate {
    threshold: f32,
}

impl EscalationGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn evaluate(&self, confidence: f32, intent: Intent, context: &Context) -> EscalationDecision {
        let mut reasons = Vec::new();

        if confidence < self.threshold {
            reasons.push(EscalationReason::LowConfidence {
                confidence,
                threshold: self.threshold,
            });
        }

        if intent == Intent::Unknown {
            reasons.push(EscalationReason::UnknownIntent);
        }

        if context.metrics.len() > MAX_METRICS {
            reasons.push(EscalationReason::TooManyMetrics {
                count: context.metrics.len(),
            });
        }

        if context.regions.len() > MAX_REGIONS_WITH_CITIES
            && context.cities.len() > MAX_REGIONS_WITH_CITIES
        {
            reasons.push(EscalationReason::ComplexScope {
                regions: context.regions.len(),
                cities: context.cities.len(),
            });
        }

        if context.comparison_requested && context.metrics.len() > MAX_COMPARISON_METRICS {
            reasons.push(EscalationReason::ComplexComparison {
                metrics: context.metrics.len(),
            });
        }

        EscalationDecision {
            escalate: !reasons.is_empty(),
            reasons,
        }
    }

    /// `(escalate, reason_text)` form of `evaluate`
    pub fn should_escalate(&self, confidence: f32, intent: Intent, context: &Context) -> (bool, String) {
        let decision = self.evaluate(confidence, intent, context);
        (decision.escalate, decision.reason_text())
    }
}

impl Default for EscalationGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(metrics: usize, regions: usize, cities: usize, comparison: bool) -> Context {
        Context {
            metrics: (0..metrics).map(|i| format!("m{}", i)).collect(),
            regions: (0..regions).map(|i| format!("r{}", i)).collect(),
            cities: (0..cities).map(|i| format!("C{}", i)).collect(),
            comparison_requested: comparison,
        }
    }

    #[test]
    fn test_confident_simple_request_passes() {
        let gate = EscalationGate::default();
        let (escalate, reason) = gate.should_escalate(0.9, Intent::Ranking, &ctx(1, 0, 0, false));
        assert!(!escalate);
        assert_eq!(reason, AUTO_EXECUTABLE);
    }

    #[test]
    fn test_low_confidence_escalates() {
        let gate = EscalationGate::default();
        let decision = gate.evaluate(0.5, Intent::DataAnalysis, &Context::default());
        assert!(decision.escalate);
        assert!(decision.reason_text().contains("low confidence"));
    }

    #[test]
    fn test_threshold_is_inclusive_for_pass() {
        let gate = EscalationGate::new(0.7);
        assert!(!gate.evaluate(0.7, Intent::DataAnalysis, &Context::default()).escalate);
    }

    #[test]
    fn test_unknown_intent_escalates() {
        let gate = EscalationGate::default();
        let decision = gate.evaluate(1.0, Intent::Unknown, &Context::default());
        assert_eq!(decision.reasons, vec![EscalationReason::UnknownIntent]);
    }

    #[test]
    fn test_too_many_metrics() {
        let gate = EscalationGate::default();
        assert!(!gate.evaluate(1.0, Intent::DataAnalysis, &ctx(3, 0, 0, false)).escalate);
        let decision = gate.evaluate(1.0, Intent::DataAnalysis, &ctx(4, 0, 0, false));
        assert!(decision.escalate);
        assert!(decision.reason_text().contains("metrics"));
    }

    #[test]
    fn test_regions_and_cities_compound() {
        let gate = EscalationGate::default();
        assert!(!gate.evaluate(1.0, Intent::DataSearch, &ctx(0, 3, 2, false)).escalate);
        assert!(!gate.evaluate(1.0, Intent::DataSearch, &ctx(0, 2, 3, false)).escalate);
        assert!(gate.evaluate(1.0, Intent::DataSearch, &ctx(0, 3, 3, false)).escalate);
    }

    #[test]
    fn test_comparison_with_many_metrics() {
        let gate = EscalationGate::default();
        assert!(!gate.evaluate(1.0, Intent::Comparison, &ctx(2, 0, 0, true)).escalate);
        assert!(gate.evaluate(1.0, Intent::Comparison, &ctx(3, 0, 0, true)).escalate);
        assert!(!gate.evaluate(1.0, Intent::Comparison, &ctx(3, 0, 0, false)).escalate);
    }

    #[test]
    fn test_reasons_accumulate() {
        let gate = EscalationGate::default();
        let decision = gate.evaluate(0.2, Intent::Unknown, &ctx(4, 3, 3, true));
        assert_eq!(decision.reasons.len(), 5);
        assert_eq!(decision.reason_text().matches("; ").count(), 4);
    }
}
