//! Pattern Table - intent category to trigger expressions.
//!
//! Entries are kept in declaration order. That order is also the tie-break
//! priority used by the classifier: when two categories score the same,
//! the one declared first wins.

use regex::{Regex, RegexBuilder};

use crate::config::Language;
use crate::error::ConfigError;
use crate::intent::Intent;

/// Trigger expressions for one intent
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub intent: Intent,
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Number of expressions that fire on `text`
    pub fn count_matches(&self, text: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(text)).count()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The source expressions, for diagnostics
    pub fn sources(&self) -> Vec<&str> {
        self.patterns.iter().map(|re| re.as_str()).collect()
    }
}

/// Ordered intent → expressions table
#[derive(Debug, Clone)]
pub struct PatternTable {
    sets: Vec<PatternSet>,
}

impl PatternTable {
    /// Compile a table from `(intent, expressions)` specs.
    ///
    /// Matching is case-insensitive. An intent listed twice has its
    /// expressions merged into the first occurrence.
    pub fn from_specs(specs: &[(Intent, &[&str])]) -> Result<Self, ConfigError> {
        let mut sets: Vec<PatternSet> = Vec::with_capacity(specs.len());
        for (intent, sources) in specs {
            let mut compiled = Vec::with_capacity(sources.len());
            for src in sources.iter() {
                let re = RegexBuilder::new(src)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::InvalidPattern {
                        intent: intent.to_string(),
                        pattern: src.to_string(),
                        source,
                    })?;
                compiled.push(re);
            }
            match sets.iter_mut().find(|s| s.intent == *intent) {
                Some(existing) => existing.patterns.extend(compiled),
                None => sets.push(PatternSet {
                    intent: *intent,
                    patterns: compiled,
                }),
            }
        }
        Ok(Self { sets })
    }

    /// Built-in table for a language
    pub fn for_language(language: Language) -> Result<Self, ConfigError> {
        match language {
            Language::Portuguese => Self::from_specs(PORTUGUESE),
            Language::English => Self::from_specs(ENGLISH),
        }
    }

    /// Sets in priority order
    pub fn sets(&self) -> &[PatternSet] {
        &self.sets
    }

    pub fn get(&self, intent: Intent) -> Option<&PatternSet> {
        self.sets.iter().find(|s| s.intent == intent)
    }
}

/// Names of the capitals in the built-in dataset, as one alternation
macro_rules! capitals {
    () => {
        "são paulo|sao paulo|rio de janeiro|brasília|brasilia|belo horizonte|curitiba|porto alegre|salvador|fortaleza|recife|goiânia|goiania|manaus"
    };
}

// Each expression covers one facet of a question, so that the share of
// matching facets is a meaningful confidence.

const PORTUGUESE: &[(Intent, &[&str])] = &[
    (
        Intent::Ranking,
        &[
            r"\b(top|ranking|maior|maiores|menor|menores|melhor|melhores|pior|piores|mais ric[ao]s|mais populos[ao]s)\b",
            r"\b(\d+|três|tres|cinco|dez|vinte)\s+(cidades|primeir[ao]s|maiores|menores|melhores|piores)\b|\btop\s*\d+\b",
        ],
    ),
    (
        Intent::Comparison,
        &[
            r"\b(compar(ar|e|ação|acao|ações|ativo|ativa)|versus|vs\.?|diferença|diferenca)\b",
            // Two sides: a connector, or two capitals named in one question
            concat!(r"\b(entre|contra|ou)\b|\b(", capitals!(), r")\b.+\b(", capitals!(), r")\b"),
        ],
    ),
    (
        Intent::CityProfile,
        &[
            r"\b(sobre|perfil|informaç(ão|ões)|informac(ao|oes)|fale|conte)\b",
            concat!(r"\b(", capitals!(), r")\b"),
        ],
    ),
    (
        Intent::RegionalAnalysis,
        &[
            r"\b(regi(ão|ao|ões|oes)|regional|regionais)\b",
            r"\b(norte|nordeste|sudeste|sul|centro-oeste)\b",
        ],
    ),
    (
        Intent::InsightGeneration,
        &[
            r"\binsights?\b",
            r"\b(recomendaç(ão|ões)|recomendac(ao|oes)|estratégias?|estrategias?|oportunidades?|riscos?|conclus(ão|ao|ões|oes))\b",
            r"\b(negócios?|negocios?|business|mercado|investir|investimento)\b",
        ],
    ),
    (
        Intent::MemorySearch,
        &[
            r"\b(lembr(ar|a|e|as)|histórico|historico|memória|memoria)\b",
            r"\b(anterior|anteriores|últim[ao]s?|ultim[ao]s?|passad[ao]|perguntei|falamos)\b",
        ],
    ),
    (
        Intent::DataSearch,
        &[
            r"\b(busc(ar|a|e|que)|encontr(ar|e|a)|procur(ar|e|a)|pesquis(ar|e|a)|filtr(ar|e|o))\b",
            r"\b(cidades?|estados?|capita(l|is)|município|municipio)\b",
        ],
    ),
    (
        Intent::DataAnalysis,
        &[
            r"\b(anális[ea]|analis[ae]r?|estatístic[ao]s?|estatistic[ao]s?|resumo)\b",
            r"\b(média|media|correlaç(ão|ões)|correlac(ao|oes)|tendência|tendencia|distribuição|distribuicao)\b",
            r"\b(pib|população|populacao|desemprego|educação|educacao)\b",
        ],
    ),
];

const ENGLISH: &[(Intent, &[&str])] = &[
    (
        Intent::Ranking,
        &[
            r"\b(top|ranking|rank|highest|lowest|largest|biggest|smallest|richest|best|worst)\b",
            r"\b(\d+|three|five|ten|twenty)\s+(cities|largest|biggest|best|worst)\b|\btop\s*\d+\b",
        ],
    ),
    (
        Intent::Comparison,
        &[
            r"\b(compar(e|ing|ison)|versus|vs\.?|difference|differences)\b",
            concat!(r"\b(between|against|or|better)\b|\b(", capitals!(), r")\b.+\b(", capitals!(), r")\b"),
        ],
    ),
    (
        Intent::CityProfile,
        &[
            r"\b(about|profile|information|info|tell me|talk)\b",
            concat!(r"\b(", capitals!(), r")\b"),
        ],
    ),
    (
        Intent::RegionalAnalysis,
        &[
            r"\b(regions?|regional)\b",
            r"\b(north|northeast|southeast|south|central-west)\b",
        ],
    ),
    (
        Intent::InsightGeneration,
        &[
            r"\binsights?\b",
            r"\b(recommendations?|strateg(y|ies)|opportunit(y|ies)|risks?|conclusions?)\b",
            r"\b(business|market|invest|investment)\b",
        ],
    ),
    (
        Intent::MemorySearch,
        &[
            r"\b(remember|history|memory|recall)\b",
            r"\b(previous|earlier|last|past|asked|discussed)\b",
        ],
    ),
    (
        Intent::DataSearch,
        &[
            r"\b(search|find|look up|lookup|filter)\b",
            r"\b(cit(y|ies)|states?|capitals?|municipalit(y|ies))\b",
        ],
    ),
    (
        Intent::DataAnalysis,
        &[
            r"\b(analy[sz]e|analysis|statistics?|summary|overview)\b",
            r"\b(average|mean|correlations?|trends?|distribution)\b",
            r"\b(gdp|population|unemployment|education)\b",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_compile() {
        let pt = PatternTable::for_language(Language::Portuguese).unwrap();
        let en = PatternTable::for_language(Language::English).unwrap();
        assert_eq!(pt.sets().len(), 8);
        assert_eq!(en.sets().len(), 8);
    }

    #[test]
    fn test_declaration_order_is_priority_order() {
        let pt = PatternTable::for_language(Language::Portuguese).unwrap();
        let order: Vec<Intent> = pt.sets().iter().map(|s| s.intent).collect();
        assert_eq!(order[0], Intent::Ranking);
        assert_eq!(order[7], Intent::DataAnalysis);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = PatternTable::from_specs(&[(Intent::Ranking, &["(unclosed"])]).unwrap_err();
        assert_eq!(err.code(), "invalid_pattern");
    }

    #[test]
    fn test_duplicate_intent_is_merged() {
        let table = PatternTable::from_specs(&[
            (Intent::Ranking, &["top"]),
            (Intent::DataSearch, &["find"]),
            (Intent::Ranking, &["rank"]),
        ])
        .unwrap();
        assert_eq!(table.sets().len(), 2);
        assert_eq!(table.get(Intent::Ranking).unwrap().len(), 2);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let table = PatternTable::for_language(Language::Portuguese).unwrap();
        let ranking = table.get(Intent::Ranking).unwrap();
        assert_eq!(ranking.count_matches("QUAIS AS 10 CIDADES COM MAIOR PIB"), 2);
    }

    #[test]
    fn test_two_capitals_count_as_comparison_sides() {
        let table = PatternTable::for_language(Language::Portuguese).unwrap();
        let comparison = table.get(Intent::Comparison).unwrap();
        assert_eq!(comparison.count_matches("Compare São Paulo vs Rio de Janeiro"), 2);
        assert_eq!(comparison.count_matches("São Paulo versus Belo Horizonte"), 2);
        assert_eq!(comparison.count_matches("Compare São Paulo e Belo Horizonte"), 2);
        assert_eq!(comparison.count_matches("Compare o PIB de Recife"), 1);
        assert_eq!(comparison.count_matches("Fale sobre Recife"), 0);
    }
}
