//! Action Executor - runs a plan step by step against the collaborators.
//!
//! Strictly sequential. A failing step never aborts the request: it leaves an
//! error-tagged entry in `raw_data` and `data_used`, and the next step runs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::action_plan::{ActionKind, ActionPlan, ActionStep, PARAM_METRIC, PARAM_REGIONS, PARAM_TERMS};
use crate::data_service::{
    region_matches, CityRecord, CorrelationMatrix, DataService, DatasetSummary, Metric,
    RegionAggregate,
};
use crate::error::DataError;
use crate::interaction_log::InteractionLog;
use crate::synthesizer::ResponseSynthesizer;

pub const KEY_SUMMARY: &str = "summary";
pub const KEY_REGIONS: &str = "region_analysis";
pub const KEY_NATIONAL_GDP: &str = "national_gdp";
pub const KEY_CORRELATION: &str = "correlation";
pub const KEY_MEMORY: &str = "memory_search";
pub const KEY_INSIGHTS: &str = "insights";
pub const PREFIX_TOP: &str = "top_";
pub const PREFIX_SEARCH: &str = "search_";
pub const ERROR_SUFFIX: &str = "_error";

/// Default ranking size
pub const DEFAULT_TOP_N: usize = 10;

/// Everything gathered while running a plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Provenance labels, in execution order
    pub data_used: Vec<String>,
    /// Free-text insights from the text generator
    pub insights: Vec<String>,
    /// Retrieved payloads keyed by data type
    pub raw_data: BTreeMap<String, Value>,
}

impl ExecutionResult {
    /// Record a failed step under `<key>_error`
    pub fn record_error(&mut self, key: &str, label: &str, tag: &str, code: &str, message: &str) {
        self.raw_data.insert(
            format!("{}{}", key, ERROR_SUFFIX),
            json!({ "code": code, "message": message }),
        );
        self.data_used.push(format!("[{}] {}: {}", tag, label, message));
    }

    /// Keys of the error-tagged entries
    pub fn error_keys(&self) -> Vec<&str> {
        self.raw_data
            .keys()
            .filter(|k| k.ends_with(ERROR_SUFFIX))
            .map(String::as_str)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.raw_data.keys().any(|k| k.ends_with(ERROR_SUFFIX))
    }

    /// True when no step produced a usable payload
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty() && self.raw_data.keys().all(|k| k.ends_with(ERROR_SUFFIX))
    }

    pub fn summary(&self) -> Option<DatasetSummary> {
        self.typed(KEY_SUMMARY)
    }

    /// First successful ranking, with the metric it was ranked by
    pub fn ranking(&self) -> Option<(Metric, Vec<CityRecord>)> {
        self.raw_data.iter().find_map(|(key, value)| {
            let metric = key
                .strip_prefix(PREFIX_TOP)
                .filter(|rest| !rest.ends_with(ERROR_SUFFIX))
                .and_then(Metric::from_name)?;
            let records = serde_json::from_value(value.clone()).ok()?;
            Some((metric, records))
        })
    }

    /// `(term, records)` for every successful search
    pub fn search_results(&self) -> Vec<(String, Vec<CityRecord>)> {
        self.raw_data
            .iter()
            .filter(|(key, _)| !key.ends_with(ERROR_SUFFIX))
            .filter_map(|(key, value)| {
                let term = key.strip_prefix(PREFIX_SEARCH)?;
                let records = serde_json::from_value(value.clone()).ok()?;
                Some((term.to_string(), records))
            })
            .collect()
    }

    pub fn regions(&self) -> Option<Vec<RegionAggregate>> {
        self.typed(KEY_REGIONS)
    }

    pub fn correlation(&self) -> Option<CorrelationMatrix> {
        self.typed(KEY_CORRELATION)
    }

    /// GDP summed over every region, before any region filter
    pub fn national_gdp(&self) -> Option<f64> {
        self.raw_data.get(KEY_NATIONAL_GDP).and_then(Value::as_f64)
    }

    /// One `key: json` line per payload, for prompts
    pub fn data_text(&self) -> String {
        self.raw_data
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn typed<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.raw_data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Runs plans against a data service, the synthesizer's text generator and
/// the interaction log.
pub struct ActionExecutor<'a> {
    data: &'a dyn DataService,
    synthesizer: &'a ResponseSynthesizer,
    log: &'a InteractionLog,
    top_n: usize,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(
        data: &'a dyn DataService,
        synthesizer: &'a ResponseSynthesizer,
        log: &'a InteractionLog,
    ) -> Self {
        Self {
            data,
            synthesizer,
            log,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn execute(&self, plan: &ActionPlan, original_text: &str) -> ExecutionResult {
        let mut result = ExecutionResult::default();

        for step in plan {
            debug!(action = %step.kind, "executing: {}", step.describe());
            self.run_step(step, original_text, &mut result);
        }

        info!(
            steps = plan.len(),
            data_used = result.data_used.len(),
            insights = result.insights.len(),
            errors = result.error_keys().len(),
            "plan executed"
        );
        result
    }

    fn run_step(&self, step: &ActionStep, original_text: &str, result: &mut ExecutionResult) {
        let labels = self.synthesizer.templates();

        match step.kind {
            ActionKind::GetSummary => {
                self.record(result, KEY_SUMMARY, &labels.label_summary(), self.data.summary());
            }
            ActionKind::AnalyzeMetric => {
                let name = step.param_str(PARAM_METRIC).unwrap_or_default();
                match Metric::from_name(name) {
                    Some(metric @ (Metric::GdpTotal | Metric::Population)) => {
                        let key = format!("{}{}", PREFIX_TOP, metric.key());
                        let label = labels.label_top(self.top_n, metric);
                        self.record(result, &key, &label, self.data.top_by(metric, self.top_n));
                    }
                    _ => {
                        let skipped = DataError::InvalidMetric(name.to_string());
                        debug!(code = skipped.code(), "{}, skipped", skipped);
                    }
                }
            }
            ActionKind::SearchEntities => {
                for term in step.param_list(PARAM_TERMS) {
                    let key = format!("{}{}", PREFIX_SEARCH, term);
                    let label = labels.label_search(&term);
                    self.record(result, &key, &label, self.data.search(&term));
                }
            }
            ActionKind::AnalyzeByRegion => {
                let wanted = step.param_list(PARAM_REGIONS);
                let outcome = self.data.aggregate_by_region().map(|all| {
                    let national: f64 = all.iter().map(|agg| agg.total_gdp).sum();
                    result.raw_data.insert(KEY_NATIONAL_GDP.to_string(), json!(national));
                    let selected: Vec<RegionAggregate> = all
                        .iter()
                        .filter(|agg| wanted.iter().any(|w| region_matches(&agg.region, w)))
                        .cloned()
                        .collect();
                    if selected.is_empty() {
                        all
                    } else {
                        selected
                    }
                });
                self.record(result, KEY_REGIONS, &labels.label_regions(), outcome);
            }
            ActionKind::GenerateInsights => {
                match self.synthesizer.generate_insights(result, original_text) {
                    Ok(text) => {
                        result.insights.push(text);
                        result.data_used.push(labels.label_insights());
                    }
                    Err(e) => {
                        warn!(code = e.code(), "insight generation failed: {}", e);
                        result.record_error(
                            KEY_INSIGHTS,
                            &labels.label_insights(),
                            labels.error_tag(),
                            e.code(),
                            &e.to_string(),
                        );
                    }
                }
            }
            ActionKind::ComparativeAnalysis => {
                self.record(
                    result,
                    KEY_CORRELATION,
                    &labels.label_correlation(),
                    self.data.correlation_matrix(),
                );
            }
            ActionKind::SearchLog => {
                let matches = self.log.search(original_text);
                debug!(matches = matches.len(), "interaction log searched");
                let outcome = Ok::<_, DataError>(matches);
                self.record(result, KEY_MEMORY, &labels.label_memory(), outcome);
            }
        }
    }

    fn record<T: Serialize>(
        &self,
        result: &mut ExecutionResult,
        key: &str,
        label: &str,
        outcome: Result<T, DataError>,
    ) {
        let tag = self.synthesizer.templates().error_tag();
        match outcome {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(value) => {
                    result.raw_data.insert(key.to_string(), value);
                    result.data_used.push(label.to_string());
                }
                Err(e) => {
                    warn!(key, "payload serialization failed: {}", e);
                    result.record_error(key, label, tag, "serialization", &e.to_string());
                }
            },
            Err(e) => {
                warn!(key, code = e.code(), "data step failed: {}", e);
                result.record_error(key, label, tag, e.code(), &e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_plan::ActionPlanner;
    use crate::classifier::Context;
    use crate::data_service::InMemoryDataset;
    use crate::intent::Intent;
    use crate::llm_client::{FakeLlmClient, LlmError, OfflineClient};
    use crate::templates::TemplateLibrary;
    use crate::config::Language;
    use std::sync::Arc;

    struct DownService;

    impl DataService for DownService {
        fn summary(&self) -> Result<DatasetSummary, DataError> {
            Err(DataError::Unavailable("connection refused".into()))
        }
        fn top_by(&self, _: Metric, _: usize) -> Result<Vec<CityRecord>, DataError> {
            Err(DataError::Unavailable("connection refused".into()))
        }
        fn search(&self, _: &str) -> Result<Vec<CityRecord>, DataError> {
            Err(DataError::Unavailable("connection refused".into()))
        }
        fn aggregate_by_region(&self) -> Result<Vec<RegionAggregate>, DataError> {
            Err(DataError::Unavailable("connection refused".into()))
        }
        fn correlation_matrix(&self) -> Result<CorrelationMatrix, DataError> {
            Err(DataError::Unavailable("connection refused".into()))
        }
    }

    fn offline_synth() -> ResponseSynthesizer {
        ResponseSynthesizer::new(Arc::new(OfflineClient), TemplateLibrary::new(Language::Portuguese))
    }

    fn plan(intent: Intent, context: &Context) -> ActionPlan {
        ActionPlanner::new().plan(intent, 1.0, context)
    }

    #[test]
    fn test_ranking_plan_retrieves_summary_and_top() {
        let data = InMemoryDataset::brazilian_capitals();
        let synth = offline_synth();
        let log = InteractionLog::new(10);
        let result = ActionExecutor::new(&data, &synth, &log)
            .execute(&plan(Intent::Ranking, &Context::default()), "top");

        assert_eq!(result.data_used, vec!["Resumo estatístico geral", "Top 10 cidades por PIB"]);
        assert!(result.summary().is_some());
        let (metric, records) = result.ranking().unwrap();
        assert_eq!(metric, Metric::GdpTotal);
        assert_eq!(records.len(), 10);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_top_n_is_configurable() {
        let data = InMemoryDataset::brazilian_capitals();
        let synth = offline_synth();
        let log = InteractionLog::new(10);
        let mut context = Context::default();
        context.metrics = vec!["população".into()];
        let result = ActionExecutor::new(&data, &synth, &log)
            .with_top_n(3)
            .execute(&plan(Intent::DataAnalysis, &context), "q");
        assert_eq!(result.raw_data["top_population"].as_array().unwrap().len(), 3);
        assert_eq!(result.data_used[1], "Top 3 cidades por população");
    }

    #[test]
    fn test_unranked_metrics_are_skipped() {
        let data = InMemoryDataset::brazilian_capitals();
        let synth = offline_synth();
        let log = InteractionLog::new(10);
        let mut context = Context::default();
        context.metrics = vec!["desemprego".into(), "felicidade".into()];
        let result = ActionExecutor::new(&data, &synth, &log)
            .execute(&plan(Intent::DataAnalysis, &context), "q");
        assert_eq!(result.data_used.len(), 1);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_failures_are_tagged_and_execution_continues() {
        let synth = offline_synth();
        let log = InteractionLog::new(10);
        let mut context = Context::default();
        context.cities = vec!["Recife".into()];
        context.regions = vec!["nordeste".into()];
        let result = ActionExecutor::new(&DownService, &synth, &log)
            .execute(&plan(Intent::DataSearch, &context), "q");

        assert_eq!(result.data_used.len(), 2);
        assert!(result.data_used.iter().all(|d| d.starts_with("[erro]")));
        assert_eq!(result.error_keys(), vec!["region_analysis_error", "search_Recife_error"]);
        assert_eq!(result.raw_data["search_Recife_error"]["code"], "data_unavailable");
        assert!(result.is_empty());
    }

    #[test]
    fn test_search_and_region_filter() {
        let data = InMemoryDataset::brazilian_capitals();
        let synth = offline_synth();
        let log = InteractionLog::new(10);
        let mut context = Context::default();
        context.cities = vec!["Recife".into(), "Curitiba".into()];
        context.regions = vec!["sul".into()];
        let result = ActionExecutor::new(&data, &synth, &log)
            .execute(&plan(Intent::DataSearch, &context), "q");

        let searches = result.search_results();
        assert_eq!(searches.len(), 2);
        assert!(searches.iter().all(|(_, r)| r.len() == 1));
        let regions = result.regions().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region, "Sul");

        let national = result.national_gdp().unwrap();
        let all: f64 = data.aggregate_by_region().unwrap().iter().map(|r| r.total_gdp).sum();
        assert!((national - all).abs() < 1.0);
        assert!(national > regions[0].total_gdp);
    }

    #[test]
    fn test_insights_use_generator() {
        let data = InMemoryDataset::brazilian_capitals();
        let fake = Arc::new(FakeLlmClient::always("Sudeste concentra o PIB."));
        let synth = ResponseSynthesizer::new(fake.clone(), TemplateLibrary::new(Language::Portuguese));
        let log = InteractionLog::new(10);
        let mut context = Context::default();
        context.comparison_requested = true;
        let result = ActionExecutor::new(&data, &synth, &log)
            .execute(&plan(Intent::InsightGeneration, &context), "gere insights");

        assert_eq!(result.insights, vec!["Sudeste concentra o PIB."]);
        assert!(result.correlation().is_some());
        assert_eq!(fake.call_count(), 1);
        assert!(fake.prompts()[0].1.contains("gere insights"));
    }

    #[test]
    fn test_insight_failure_is_tagged() {
        let data = InMemoryDataset::brazilian_capitals();
        let synth = ResponseSynthesizer::new(
            Arc::new(FakeLlmClient::always_error(LlmError::Timeout(30))),
            TemplateLibrary::new(Language::English),
        );
        let log = InteractionLog::new(10);
        let result = ActionExecutor::new(&data, &synth, &log)
            .execute(&plan(Intent::InsightGeneration, &Context::default()), "insights");

        assert!(result.insights.is_empty());
        assert_eq!(result.raw_data["insights_error"]["code"], "llm_timeout");
        assert!(result.data_used[0].starts_with("[error]"));
    }

    #[test]
    fn test_empty_plan() {
        let data = InMemoryDataset::brazilian_capitals();
        let synth = offline_synth();
        let log = InteractionLog::new(10);
        let result = ActionExecutor::new(&data, &synth, &log).execute(&ActionPlan::default(), "q");
        assert_eq!(result, ExecutionResult::default());
    }
}
