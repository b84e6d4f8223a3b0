//! Context vocabulary - the fixed word lists used for context extraction.

use crate::config::Language;

/// Word lists for one language
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Metric names as they are reported in the context (lowercase)
    pub metrics: Vec<&'static str>,
    /// Words implying a metric, paired with the metric name they report
    pub metric_hints: Vec<(&'static str, &'static str)>,
    /// Region names (lowercase)
    pub regions: Vec<&'static str>,
    /// Words signalling a comparison (lowercase, whole words)
    pub comparison_words: Vec<&'static str>,
    /// Capitalised words that are never city names
    pub city_stopwords: Vec<&'static str>,
}

impl Vocabulary {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Portuguese => Self::portuguese(),
            Language::English => Self::english(),
        }
    }

    pub fn portuguese() -> Self {
        Self {
            metrics: vec!["população", "pib", "desemprego", "educação", "pib per capita"],
            metric_hints: vec![
                ("populos", "população"),
                ("habitantes", "população"),
                ("mais ricas", "pib"),
                ("mais ricos", "pib"),
                ("mais pobres", "pib"),
            ],
            regions: vec!["norte", "nordeste", "sudeste", "sul", "centro-oeste"],
            comparison_words: vec!["comparar", "compare", "versus", "vs", "diferença", "comparação"],
            city_stopwords: vec![
                "Quais", "Qual", "Quem", "Quanto", "Quantos", "Quantas", "Como", "Onde", "Por",
                "Porque", "Compare", "Comparar", "Busque", "Buscar", "Procure", "Encontre",
                "Analise", "Analisar", "Mostre", "Liste", "Gere", "Fale", "Conte", "Me", "Eu",
                "Você", "Voce", "Olá", "Ola", "Oi", "Bom", "Boa", "Das", "Dos", "Sobre", "Entre",
                "Brasil", "Norte", "Nordeste", "Sudeste", "Sul", "Centro", "Oeste", "Centro-Oeste",
                "Lembra", "Lembre", "Qualquer", "Existe", "Existem", "Há", "Faça", "Preciso",
                "Gostaria", "Quero", "Queria", "Diga", "Explique", "Mostra", "Poderia", "Pode",
                "Considerando", "Sabe", "Sabendo",
            ],
        }
    }

    pub fn english() -> Self {
        Self {
            metrics: vec!["population", "gdp", "unemployment", "education", "gdp per capita"],
            metric_hints: vec![
                ("populous", "population"),
                ("inhabitants", "population"),
                ("richest", "gdp"),
                ("wealthiest", "gdp"),
                ("poorest", "gdp"),
            ],
            regions: vec!["north", "northeast", "southeast", "south", "central-west"],
            comparison_words: vec!["compare", "versus", "vs", "difference", "comparison"],
            city_stopwords: vec![
                "What", "Which", "Who", "How", "Where", "Why", "When", "Show", "List", "Find",
                "Search", "Compare", "Analyze", "Analyse", "Generate", "Tell", "Give", "Hello",
                "Hi", "The", "Are", "Is", "Can", "Could", "Please", "Brazil", "Brazilian", "North",
                "Northeast", "Southeast", "South", "Central", "West", "Central-West", "Do", "Does",
                "Remember", "Any", "Top", "GDP", "I", "I'd", "Would", "Explain", "Describe",
                "Let", "Let's", "Want",
            ],
        }
    }

    pub fn is_city_stopword(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.city_stopwords.iter().any(|s| s.to_lowercase() == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_lists_are_lowercase() {
        for vocab in [Vocabulary::portuguese(), Vocabulary::english()] {
            for m in &vocab.metrics {
                assert_eq!(*m, m.to_lowercase());
            }
            for r in &vocab.regions {
                assert_eq!(*r, r.to_lowercase());
            }
        }
    }

    #[test]
    fn test_stopwords() {
        let vocab = Vocabulary::portuguese();
        assert!(vocab.is_city_stopword("Quais"));
        assert!(vocab.is_city_stopword("quais"));
        assert!(!vocab.is_city_stopword("Recife"));
        assert!(vocab.is_city_stopword("Gostaria"));
        assert!(vocab.is_city_stopword("Explique"));
    }

    #[test]
    fn test_metric_hints_name_known_metrics() {
        for vocab in [Vocabulary::portuguese(), Vocabulary::english()] {
            for (_, metric) in &vocab.metric_hints {
                assert!(vocab.metrics.contains(metric), "{} is not a metric", metric);
            }
        }
    }
}
