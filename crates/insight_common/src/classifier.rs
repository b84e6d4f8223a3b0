//! Classifier - scores free text against the Pattern Table.
//!
//! Runs before any data access or text generation. Pure: the result depends
//! only on the input string and the static tables.
//!
//! Scoring: for each category, confidence = matching expressions / total
//! expressions, capped at 1.0. The highest score wins; ties go to the
//! category declared first in the table. When nothing matches at all the
//! result is `DataAnalysis` at the configured default confidence, never
//! `Unknown`.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::intent::Intent;
use crate::patterns::PatternTable;
use crate::vocabulary::Vocabulary;

/// Default confidence when no expression matched
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

/// Runs of capitalised words, allowing short lowercase connectors
/// ("Rio de Janeiro", "Mato Grosso do Sul").
const CITY_PATTERN: &str = r"\b\p{Lu}\p{Ll}+(?:[ \t]+(?:d[aeo]s?[ \t]+)?\p{Lu}\p{Ll}+)*\b";

/// Structured hints extracted from the question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Mentioned or implied metrics, vocabulary order, no duplicates
    pub metrics: Vec<String>,
    /// Mentioned regions
    pub regions: Vec<String>,
    /// City-like capitalised tokens
    pub cities: Vec<String>,
    pub comparison_requested: bool,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
            && self.regions.is_empty()
            && self.cities.is_empty()
            && !self.comparison_requested
    }
}

/// Output of `Classifier::classify`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    /// Always within [0, 1]
    pub confidence: f32,
    pub context: Context,
    /// Per-category scores in table order
    pub scores: Vec<(Intent, f32)>,
    /// True when no expression matched and the default policy applied
    pub defaulted: bool,
}

/// Keyword/regex intent classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    table: PatternTable,
    vocabulary: Vocabulary,
    default_confidence: f32,
    city_re: Regex,
    region_res: Vec<(String, Regex)>,
    comparison_res: Vec<Regex>,
}

impl Classifier {
    pub fn new(table: PatternTable, vocabulary: Vocabulary) -> Result<Self, ConfigError> {
        let city_re = Regex::new(CITY_PATTERN).map_err(|source| ConfigError::InvalidPattern {
            intent: "context".to_string(),
            pattern: CITY_PATTERN.to_string(),
            source,
        })?;

        let region_res = vocabulary
            .regions
            .iter()
            .map(|r| whole_word(r).map(|re| (r.to_string(), re)))
            .collect::<Result<Vec<_>, _>>()?;
        let comparison_res = vocabulary
            .comparison_words
            .iter()
            .map(|w| whole_word(w))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table,
            vocabulary,
            default_confidence: DEFAULT_CONFIDENCE,
            city_re,
            region_res,
            comparison_res,
        })
    }

    /// Override the zero-match confidence (clamped to [0, 1])
    pub fn with_default_confidence(mut self, confidence: f32) -> Self {
        self.default_confidence = clamp_unit(confidence);
        self
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let mut scores = Vec::with_capacity(self.table.sets().len());
        let mut best: Option<(Intent, f32)> = None;

        for set in self.table.sets() {
            let score = if set.is_empty() {
                0.0
            } else {
                clamp_unit(set.count_matches(text) as f32 / set.len() as f32)
            };
            scores.push((set.intent, score));
            // Strictly greater: earlier declarations win ties
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((set.intent, score));
            }
        }

        let (intent, confidence, defaulted) = match best {
            Some((intent, score)) if score > 0.0 => (intent, score, false),
            _ => (Intent::DataAnalysis, self.default_confidence, true),
        };

        let context = self.extract_context(text);

        tracing::debug!(
            intent = %intent,
            confidence,
            defaulted,
            metrics = context.metrics.len(),
            regions = context.regions.len(),
            cities = context.cities.len(),
            "classified input"
        );

        ClassificationResult {
            intent,
            confidence,
            context,
            scores,
            defaulted,
        }
    }

    /// Context extraction, independent of the winning intent
    pub fn extract_context(&self, text: &str) -> Context {
        let lower = text.to_lowercase();

        let mut metrics = Vec::new();
        for metric in &self.vocabulary.metrics {
            if lower.contains(metric) {
                push_unique(&mut metrics, metric.to_string());
            }
        }

        for (hint, metric) in &self.vocabulary.metric_hints {
            if lower.contains(hint) {
                push_unique(&mut metrics, metric.to_string());
            }
        }

        let mut regions = Vec::new();
        for (name, re) in &self.region_res {
            if re.is_match(&lower) {
                push_unique(&mut regions, name.clone());
            }
        }

        let comparison_requested = self.comparison_res.iter().any(|re| re.is_match(&lower));

        let mut cities = Vec::new();
        for m in self.city_re.find_iter(text) {
            if let Some(city) = self.clean_city_candidate(m.as_str()) {
                push_unique(&mut cities, city);
            }
        }

        Context {
            metrics,
            regions,
            cities,
            comparison_requested,
        }
    }

    /// Strip leading/trailing stopwords; reject region and metric names.
    fn clean_city_candidate(&self, candidate: &str) -> Option<String> {
        let words: Vec<&str> = candidate.split_whitespace().collect();
        let start = words
            .iter()
            .position(|w| !self.vocabulary.is_city_stopword(w))?;
        let end = words
            .iter()
            .rposition(|w| !self.vocabulary.is_city_stopword(w))?;
        let city = words[start..=end].join(" ");

        let lower = city.to_lowercase();
        if city.chars().count() <= 2
            || self.vocabulary.regions.iter().any(|r| *r == lower)
            || self.vocabulary.metrics.iter().any(|m| *m == lower)
        {
            return None;
        }
        Some(city)
    }
}

fn whole_word(word: &str) -> Result<Regex, ConfigError> {
    let pattern = format!(r"\b{}\b", regex::escape(word));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            intent: "context".to_string(),
            pattern,
            source,
        })
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;

    fn pt() -> Classifier {
        Classifier::new(
            PatternTable::for_language(Language::Portuguese).unwrap(),
            Vocabulary::portuguese(),
        )
        .unwrap()
    }

    fn en() -> Classifier {
        Classifier::new(
            PatternTable::for_language(Language::English).unwrap(),
            Vocabulary::english(),
        )
        .unwrap()
    }

    #[test]
    fn test_ranking_question() {
        let result = pt().classify("Quais são as 10 cidades com maior PIB?");
        assert_eq!(result.intent, Intent::Ranking);
        assert!(result.confidence >= 0.9);
        assert_eq!(result.context.metrics, vec!["pib"]);
        assert!(result.context.cities.is_empty(), "got {:?}", result.context.cities);
        assert!(!result.defaulted);
    }

    #[test]
    fn test_zero_match_defaults_to_data_analysis() {
        let result = pt().classify("xyz qwerty");
        assert_eq!(result.intent, Intent::DataAnalysis);
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert!(result.defaulted);
    }

    #[test]
    fn test_custom_default_confidence() {
        let result = pt().with_default_confidence(0.1).classify("...");
        assert_eq!(result.confidence, 0.1);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let table = PatternTable::from_specs(&[
            (Intent::DataSearch, &["alpha"]),
            (Intent::Ranking, &["alpha"]),
        ])
        .unwrap();
        let classifier = Classifier::new(table, Vocabulary::english()).unwrap();
        assert_eq!(classifier.classify("alpha").intent, Intent::DataSearch);
    }

    #[test]
    fn test_partial_match_score() {
        let table = PatternTable::from_specs(&[(Intent::MemorySearch, &["one", "two", "three", "four"])])
            .unwrap();
        let classifier = Classifier::new(table, Vocabulary::english()).unwrap();
        let result = classifier.classify("one and three");
        assert_eq!(result.intent, Intent::MemorySearch);
        assert!((result.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_multiword_city_extraction() {
        let ctx = pt().extract_context("Compare São Paulo vs Rio de Janeiro");
        assert_eq!(ctx.cities, vec!["São Paulo", "Rio de Janeiro"]);
        assert!(ctx.comparison_requested);
    }

    #[test]
    fn test_region_words_are_not_cities() {
        let ctx = pt().extract_context("Como está o Nordeste e o Sul?");
        assert!(ctx.cities.is_empty(), "got {:?}", ctx.cities);
        assert_eq!(ctx.regions, vec!["nordeste", "sul"]);
    }

    #[test]
    fn test_region_match_is_whole_word() {
        // "consulta" contains "sul" but is not the region
        let ctx = pt().extract_context("faça uma consulta");
        assert!(ctx.regions.is_empty());
    }

    #[test]
    fn test_metric_extraction_order_and_dedup() {
        let ctx = pt().extract_context("pib per capita, desemprego e PIB");
        assert_eq!(ctx.metrics, vec!["pib", "desemprego", "pib per capita"]);
    }

    #[test]
    fn test_ranking_adjectives_imply_metric() {
        let result = pt().classify("Quais as 5 cidades mais populosas?");
        assert_eq!(result.intent, Intent::Ranking);
        assert_eq!(result.context.metrics, vec!["população"]);
        assert_eq!(pt().extract_context("as capitais mais ricas").metrics, vec!["pib"]);
        assert_eq!(en().extract_context("the most populous cities").metrics, vec!["population"]);
        // An explicit mention is not duplicated by its hint
        assert_eq!(pt().extract_context("maior população, mais populosas").metrics, vec!["população"]);
    }

    #[test]
    fn test_sentence_starters_are_not_cities() {
        let ctx = pt().extract_context("Gostaria de saber sobre Curitiba");
        assert_eq!(ctx.cities, vec!["Curitiba"]);
        let ctx = pt().extract_context("Explique Recife. Quero ver Manaus");
        assert_eq!(ctx.cities, vec!["Recife", "Manaus"]);
    }

    #[test]
    fn test_english_table() {
        let result = en().classify("What are the 10 cities with highest GDP?");
        assert_eq!(result.intent, Intent::Ranking);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.context.metrics, vec!["gdp"]);
    }

    #[test]
    fn test_english_comparison() {
        let result = en().classify("São Paulo vs Belo Horizonte, which is better?");
        assert_eq!(result.intent, Intent::Comparison);
        assert_eq!(result.context.cities, vec!["São Paulo", "Belo Horizonte"]);
        assert!(result.context.comparison_requested);
    }

    #[test]
    fn test_scores_cover_every_category() {
        let result = pt().classify("qualquer coisa");
        assert_eq!(result.scores.len(), 8);
        assert!(result.scores.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }
}
