//! Agent - the single request pipeline.
//!
//! classify → gate → plan → execute → synthesize → log, run to completion
//! for each input. Construction is the only fallible step; `process` always
//! returns an answer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::action_plan::ActionPlanner;
use crate::classifier::Classifier;
use crate::config::{AgentConfig, Language};
use crate::data_service::{DataService, DatasetSummary, InMemoryDataset};
use crate::error::{AgentError, DataError};
use crate::escalation::EscalationGate;
use crate::executor::ActionExecutor;
use crate::intent::Intent;
use crate::interaction_log::{Interaction, InteractionLog, LogSummary};
use crate::llm_client::{HttpLlmClient, LlmError, OfflineClient, TextGenerator};
use crate::patterns::PatternTable;
use crate::quality::{evaluate_quality, QualityMetrics};
use crate::synthesizer::ResponseSynthesizer;
use crate::templates::TemplateLibrary;
use crate::vocabulary::Vocabulary;

/// Everything a caller gets back for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    pub confidence: f32,
    pub intent: Intent,
    pub data_used: Vec<String>,
    pub insights: Vec<String>,
    pub needs_human_help: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_reason: Option<String>,

    pub quality: QualityMetrics,
}

pub struct Agent {
    classifier: Classifier,
    gate: EscalationGate,
    planner: ActionPlanner,
    data: Arc<dyn DataService>,
    synthesizer: ResponseSynthesizer,
    log: InteractionLog,
    top_n: usize,
}

impl Agent {
    /// Built-in dataset; HTTP generation when enabled and a key is set,
    /// otherwise offline templates.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let has_key = config
            .llm
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());

        let generator: Arc<dyn TextGenerator> = if config.llm.enabled && has_key {
            Arc::new(HttpLlmClient::new(config.llm.clone())?)
        } else {
            info!(
                enabled = config.llm.enabled,
                has_key, "text generation not configured, answering from templates"
            );
            Arc::new(OfflineClient)
        };

        Self::with_parts(config, Arc::new(InMemoryDataset::brazilian_capitals()), generator)
    }

    /// Built-in dataset, never touches the network
    pub fn offline(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::with_parts(
            config,
            Arc::new(InMemoryDataset::brazilian_capitals()),
            Arc::new(OfflineClient),
        )
    }

    /// Explicit collaborators
    pub fn with_parts(
        config: &AgentConfig,
        data: Arc<dyn DataService>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let language = config.agent.language;

        let classifier = Classifier::new(
            PatternTable::for_language(language)?,
            Vocabulary::for_language(language),
        )?
        .with_default_confidence(config.agent.default_confidence);

        Ok(Self {
            classifier,
            gate: EscalationGate::new(config.agent.confidence_threshold),
            planner: ActionPlanner::new(),
            data,
            synthesizer: ResponseSynthesizer::new(generator, TemplateLibrary::new(language)),
            log: InteractionLog::new(config.agent.max_memory_size),
            top_n: config.agent.top_n,
        })
    }

    pub fn language(&self) -> Language {
        self.synthesizer.templates().language()
    }

    pub fn process(&mut self, text: &str) -> AgentResponse {
        let classification = self.classifier.classify(text);
        let intent = classification.intent;
        let confidence = classification.confidence;
        let context = &classification.context;

        let decision = self.gate.evaluate(confidence, intent, context);
        if decision.escalate {
            info!(
                intent = %intent,
                confidence,
                reason = %decision.reason_text(),
                "escalating to human"
            );
            let templates = self.synthesizer.templates();
            let reason = templates.describe_reasons(&decision.reasons);
            let response = templates.help_message(text, &decision.reasons, confidence);
            let quality = QualityMetrics::escalated(&response, confidence);
            return AgentResponse {
                response,
                confidence,
                intent,
                data_used: Vec::new(),
                insights: Vec::new(),
                needs_human_help: true,
                help_reason: Some(reason),
                quality,
            };
        }

        let plan = self.planner.plan(intent, confidence, context);
        let result = ActionExecutor::new(self.data.as_ref(), &self.synthesizer, &self.log)
            .with_top_n(self.top_n)
            .execute(&plan, text);

        let response = self.synthesizer.synthesize(text, &result, confidence);
        let quality = evaluate_quality(&response, confidence, self.synthesizer.templates());

        self.log.append(Interaction::new(
            text,
            response.clone(),
            confidence,
            result.data_used.clone(),
            result.insights.clone(),
        ));

        info!(
            intent = %intent,
            confidence,
            steps = plan.len(),
            score = quality.overall_score,
            "request answered"
        );

        AgentResponse {
            response,
            confidence,
            intent,
            data_used: result.data_used,
            insights: result.insights,
            needs_human_help: false,
            help_reason: None,
            quality,
        }
    }

    pub fn memory_summary(&self) -> LogSummary {
        self.log.summary()
    }

    pub fn search_memory(&self, term: &str) -> Vec<Interaction> {
        self.log.search(term).into_iter().cloned().collect()
    }

    pub fn recent_memory(&self, limit: usize) -> Vec<Interaction> {
        self.log.recent(limit).into_iter().cloned().collect()
    }

    pub fn clear_memory(&mut self) {
        self.log.clear();
    }

    pub fn export_memory(&self) -> Vec<Interaction> {
        self.log.export_all()
    }

    pub fn import_memory(&mut self, interactions: Vec<Interaction>) {
        self.log.import_all(interactions);
    }

    pub fn export_memory_json(&self) -> Result<String, AgentError> {
        Ok(serde_json::to_string_pretty(&self.log.export_all())?)
    }

    /// Returns how many interactions the log holds afterwards
    pub fn import_memory_json(&mut self, json: &str) -> Result<usize, AgentError> {
        let interactions: Vec<Interaction> = serde_json::from_str(json)?;
        self.log.import_all(interactions);
        Ok(self.log.len())
    }

    pub fn data_overview(&self) -> Result<DatasetSummary, DataError> {
        self.data.summary()
    }

    pub fn probe_llm(&self) -> Result<(), LlmError> {
        self.synthesizer.generator().probe()
    }
}
