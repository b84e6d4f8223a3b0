//! Decision quality scoring for a finished response.

use serde::{Deserialize, Serialize};

use crate::templates::TemplateLibrary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Characters, not bytes
    pub response_length: usize,
    pub confidence: f32,
    pub has_insights: bool,
    pub has_data: bool,
    pub has_actions: bool,
    /// 0..1
    pub overall_score: f32,
}

impl QualityMetrics {
    /// Escalated responses are scored by confidence alone
    pub fn escalated(response: &str, confidence: f32) -> Self {
        Self {
            response_length: response.chars().count(),
            confidence,
            has_insights: false,
            has_data: false,
            has_actions: false,
            overall_score: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Keyword heuristics: 0.3 insights + 0.3 data + 0.2 actions + min(confidence, 0.2)
pub fn evaluate_quality(response: &str, confidence: f32, templates: &TemplateLibrary) -> QualityMetrics {
    let lower = response.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let has_insights = contains_any(templates.insight_keywords());
    let has_data = contains_any(templates.data_keywords());
    let has_actions = contains_any(templates.action_keywords());

    let mut score = 0.0;
    if has_insights {
        score += 0.3;
    }
    if has_data {
        score += 0.3;
    }
    if has_actions {
        score += 0.2;
    }
    score += confidence.clamp(0.0, 0.2);

    QualityMetrics {
        response_length: response.chars().count(),
        confidence,
        has_insights,
        has_data,
        has_actions,
        overall_score: score.min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;

    #[test]
    fn test_full_score() {
        let t = TemplateLibrary::new(Language::Portuguese);
        let q = evaluate_quality(
            "Os dados mostram um insight claro; a próxima ação é expandir.",
            0.9,
            &t,
        );
        assert!(q.has_insights && q.has_data && q.has_actions);
        assert!((q.overall_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_contribution_is_capped() {
        let t = TemplateLibrary::new(Language::English);
        let q = evaluate_quality("plain text", 0.9, &t);
        assert!(!q.has_insights && !q.has_data && !q.has_actions);
        assert!((q.overall_score - 0.2).abs() < 1e-6);
        let low = evaluate_quality("plain text", 0.05, &t);
        assert!((low.overall_score - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_language_keywords() {
        let en = TemplateLibrary::new(Language::English);
        let q = evaluate_quality("The data suggests this strategy.", 0.0, &en);
        assert!(q.has_data && q.has_actions && !q.has_insights);
        assert_eq!(q.response_length, 32);
    }

    #[test]
    fn test_escalated_score_is_confidence() {
        let q = QualityMetrics::escalated("help", 0.4);
        assert_eq!(q.overall_score, 0.4);
        assert!(!q.has_data);
    }
}
