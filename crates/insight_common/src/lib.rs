//! Insight Common - rule-based data analysis agent core.
//!
//! Keyword classification, an escalation gate, deterministic action plans
//! over a narrow data-service interface, and answer synthesis that works the
//! same with or without a text-generation backend.

pub mod action_plan;
pub mod agent;
pub mod classifier;
pub mod config;
pub mod data_service;
pub mod error;
pub mod escalation;
pub mod executor;
pub mod intent;
pub mod interaction_log;
pub mod llm_client;
pub mod patterns;
pub mod quality;
pub mod synthesizer;
pub mod templates;
pub mod vocabulary;

pub use action_plan::{ActionKind, ActionPlan, ActionPlanner, ActionStep};
pub use agent::{Agent, AgentResponse};
pub use classifier::{ClassificationResult, Classifier, Context};
pub use config::{AgentConfig, Language};
pub use data_service::{DataService, InMemoryDataset, Metric};
pub use error::{AgentError, ConfigError, DataError};
pub use escalation::{EscalationDecision, EscalationGate, EscalationReason};
pub use executor::{ActionExecutor, ExecutionResult};
pub use intent::Intent;
pub use interaction_log::{Interaction, InteractionLog, LogSummary};
pub use llm_client::{FakeLlmClient, HttpLlmClient, LlmError, OfflineClient, TextGenerator};
pub use quality::QualityMetrics;
pub use synthesizer::ResponseSynthesizer;
pub use templates::TemplateLibrary;
