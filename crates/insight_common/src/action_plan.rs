//! Action Planner - expands an intent and its context into ordered steps.
//!
//! Plans are built fresh for every request, sorted by ascending priority
//! (stable, so ties keep insertion order) and discarded after execution.
//! A plan with no steps is legal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::classifier::Context;
use crate::data_service::Metric;
use crate::intent::Intent;

pub const PARAM_METRIC: &str = "metric";
pub const PARAM_TERMS: &str = "search_terms";
pub const PARAM_REGIONS: &str = "regions";

/// Abstract data/insight operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Dataset-wide summary statistics
    GetSummary,
    /// Top-N ranking for one metric
    AnalyzeMetric,
    /// Search cities/states/regions by name, one call per term
    SearchEntities,
    /// Aggregate every region
    AnalyzeByRegion,
    /// Ask the text generator for insights over everything retrieved so far
    GenerateInsights,
    /// Correlation matrix between the numeric metrics
    ComparativeAnalysis,
    /// Search the interaction log with the user's own words
    SearchLog,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::GetSummary => "get_summary",
            ActionKind::AnalyzeMetric => "analyze_metric",
            ActionKind::SearchEntities => "search_entities",
            ActionKind::AnalyzeByRegion => "analyze_by_region",
            ActionKind::GenerateInsights => "generate_insights",
            ActionKind::ComparativeAnalysis => "comparative_analysis",
            ActionKind::SearchLog => "search_log",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub kind: ActionKind,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,

    /// Lower runs first
    pub priority: u8,
}

impl ActionStep {
    pub fn new(kind: ActionKind, priority: u8) -> Self {
        Self {
            kind,
            parameters: BTreeMap::new(),
            priority,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }

    /// String-array parameter; missing or mistyped entries are skipped
    pub fn param_list(&self, key: &str) -> Vec<String> {
        self.parameters
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One-line description for traces and the CLI
    pub fn describe(&self) -> String {
        match self.kind {
            ActionKind::GetSummary => "fetch dataset summary".to_string(),
            ActionKind::AnalyzeMetric => {
                format!("rank by metric: {}", self.param_str(PARAM_METRIC).unwrap_or("?"))
            }
            ActionKind::SearchEntities => {
                format!("search: {}", self.param_list(PARAM_TERMS).join(", "))
            }
            ActionKind::AnalyzeByRegion => {
                let regions = self.param_list(PARAM_REGIONS);
                if regions.is_empty() {
                    "aggregate by region".to_string()
                } else {
                    format!("aggregate by region ({})", regions.join(", "))
                }
            }
            ActionKind::GenerateInsights => "generate business insights".to_string(),
            ActionKind::ComparativeAnalysis => "comparative correlation analysis".to_string(),
            ActionKind::SearchLog => "search earlier interactions".to_string(),
        }
    }
}

/// Ordered list of steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub steps: Vec<ActionStep>,
}

impl ActionPlan {
    /// Build a plan; steps are stably sorted by priority
    pub fn from_steps(mut steps: Vec<ActionStep>) -> Self {
        steps.sort_by_key(|s| s.priority);
        Self { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.steps.iter().any(|s| s.kind == kind)
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }

    /// Whether priorities are non-decreasing
    pub fn is_ordered(&self) -> bool {
        self.steps.windows(2).all(|w| w[0].priority <= w[1].priority)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} steps: {}",
            self.steps.len(),
            self.steps
                .iter()
                .map(|s| s.kind.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        )
    }
}

impl<'a> IntoIterator for &'a ActionPlan {
    type Item = &'a ActionStep;
    type IntoIter = std::slice::Iter<'a, ActionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Pure intent → plan mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionPlanner;

impl ActionPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, intent: Intent, confidence: f32, context: &Context) -> ActionPlan {
        let mut steps = Vec::new();

        match intent {
            Intent::DataAnalysis => {
                steps.push(ActionStep::new(ActionKind::GetSummary, 1));
                steps.extend(metric_steps(context, 2));
            }
            Intent::DataSearch => {
                if !context.cities.is_empty() {
                    steps.push(search_step(context, 1));
                }
                if !context.regions.is_empty() {
                    steps.push(region_step(context, 2));
                }
            }
            Intent::InsightGeneration => {
                steps.push(ActionStep::new(ActionKind::GenerateInsights, 1));
                if context.comparison_requested {
                    steps.push(ActionStep::new(ActionKind::ComparativeAnalysis, 2));
                }
            }
            Intent::MemorySearch => {
                steps.push(ActionStep::new(ActionKind::SearchLog, 1));
            }
            Intent::Ranking => {
                steps.push(ActionStep::new(ActionKind::GetSummary, 1));
                let metrics = metric_steps(context, 2);
                if metrics.is_empty() {
                    steps.push(
                        ActionStep::new(ActionKind::AnalyzeMetric, 2)
                            .with_param(PARAM_METRIC, Metric::GdpTotal.key()),
                    );
                } else {
                    steps.extend(metrics);
                }
            }
            Intent::Comparison => {
                if !context.cities.is_empty() {
                    steps.push(search_step(context, 1));
                }
                steps.push(ActionStep::new(ActionKind::ComparativeAnalysis, 2));
                if !context.regions.is_empty() {
                    steps.push(region_step(context, 2));
                }
            }
            Intent::CityProfile => {
                if context.cities.is_empty() {
                    steps.push(ActionStep::new(ActionKind::GetSummary, 1));
                } else {
                    steps.push(search_step(context, 1));
                }
            }
            Intent::RegionalAnalysis => {
                steps.push(region_step(context, 1));
                steps.extend(metric_steps(context, 2));
            }
            Intent::Unknown => {}
        }

        let plan = ActionPlan::from_steps(steps);
        tracing::debug!(intent = %intent, confidence, plan = %plan.summary(), "planned actions");
        plan
    }
}

fn metric_steps(context: &Context, priority: u8) -> Vec<ActionStep> {
    context
        .metrics
        .iter()
        .map(|m| ActionStep::new(ActionKind::AnalyzeMetric, priority).with_param(PARAM_METRIC, m.as_str()))
        .collect()
}

fn search_step(context: &Context, priority: u8) -> ActionStep {
    ActionStep::new(ActionKind::SearchEntities, priority)
        .with_param(PARAM_TERMS, context.cities.clone())
}

fn region_step(context: &Context, priority: u8) -> ActionStep {
    ActionStep::new(ActionKind::AnalyzeByRegion, priority)
        .with_param(PARAM_REGIONS, context.regions.clone())
}
