//! Template Library - every user-facing string for one language.
//!
//! Prompts, provenance labels, the human-help message and the deterministic
//! fallback answers all live here as data, so the pipeline itself carries no
//! language-specific text.

use crate::config::Language;
use crate::data_service::{CityRecord, Metric};
use crate::escalation::EscalationReason;
use crate::executor::ExecutionResult;

/// Which canned answer the fallback path renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Ranking,
    CityProfile,
    CityComparison,
    Regions,
    Correlation,
    Greeting,
    Generic,
}

struct Phrases {
    synthesis_system: &'static str,
    insight_system: &'static str,
    prompt_question: &'static str,
    prompt_data: &'static str,
    prompt_insights: &'static str,
    prompt_closing: &'static str,
    prompt_no_data: &'static str,
    insight_data: &'static str,
    insight_question: &'static str,

    label_summary: &'static str,
    label_top: &'static str,
    label_search: &'static str,
    label_regions: &'static str,
    label_correlation: &'static str,
    label_memory: &'static str,
    label_insights: &'static str,
    error_tag: &'static str,
    /// Display names in `Metric::ALL` order
    metric_names: [&'static str; 5],

    help_title: &'static str,
    help_question: &'static str,
    help_reason: &'static str,
    help_confidence: &'static str,
    help_body: &'static str,
    help_options_title: &'static str,
    help_options: [&'static str; 4],

    billion: &'static str,
    insights_title: &'static str,
    data_title: &'static str,
    confidence_line: &'static str,
    unavailable: &'static str,
    ranking_unavailable: &'static str,
    ranking_insight: &'static str,
    ranking_action: &'static str,
    comparison_title: &'static str,
    comparison_per_capita: &'static str,
    comparison_unemployment: &'static str,
    comparison_action: &'static str,
    profile_action: &'static str,
    regions_title: &'static str,
    region_line: &'static str,
    region_insight: &'static str,
    region_action: &'static str,
    correlation_title: &'static str,
    correlation_strongest: &'static str,
    correlation_undefined: &'static str,
    correlation_action: &'static str,
    summary_line: &'static str,
    greeting: &'static str,
    generic: &'static str,

    kw_correlation: &'static [&'static str],
    kw_comparison: &'static [&'static str],
    kw_ranking: &'static [&'static str],
    kw_region: &'static [&'static str],
    kw_greeting: &'static [&'static str],

    quality_insight: &'static [&'static str],
    quality_data: &'static [&'static str],
    quality_action: &'static [&'static str],
}

static PORTUGUESE: Phrases = Phrases {
    synthesis_system: "Você é um especialista em análise de dados e business intelligence. \
Responda à pergunta do usuário usando os dados fornecidos, cite números concretos \
e sugira ações de negócio quando apropriado.",
    insight_system: "Você é um especialista em análise de dados e business intelligence. \
Analise os dados fornecidos e responda com insights valiosos para o negócio. \
Seja específico, use números quando possível e sugira ações baseadas nos dados.",
    prompt_question: "Pergunta do usuário",
    prompt_data: "Dados disponíveis",
    prompt_insights: "Insights gerados",
    prompt_closing: "Por favor, forneça uma análise completa e insights de negócio.",
    prompt_no_data: "(nenhum dado recuperado)",
    insight_data: "Resumo dos dados",
    insight_question: "Pergunta",

    label_summary: "Resumo estatístico geral",
    label_top: "Top {n} cidades por {metric}",
    label_search: "Busca por: {term}",
    label_regions: "Análise por região",
    label_correlation: "Análise de correlação",
    label_memory: "Busca na memória",
    label_insights: "Geração de insights",
    error_tag: "erro",
    metric_names: [
        "população",
        "PIB",
        "PIB per capita",
        "taxa de desemprego",
        "índice de educação",
    ],

    help_title: "🤔 **Solicitação de ajuda humana**",
    help_question: "Pergunta do usuário",
    help_reason: "Motivo",
    help_confidence: "Confiança do agente",
    help_body: "O agente não tem confiança suficiente para executar esta análise automaticamente.\n\
Por favor, forneça orientações específicas ou reformule a pergunta.",
    help_options_title: "Opções disponíveis",
    help_options: [
        "Reformular a pergunta de forma mais específica",
        "Solicitar análise de métricas específicas",
        "Fornecer contexto adicional",
        "Executar análise com confiança reduzida",
    ],

    billion: "bi",
    insights_title: "💡 **Insights**",
    data_title: "📊 **Dados**",
    confidence_line: "Confiança da análise: {confidence}",
    unavailable: "⚠️ Alguns dados não puderam ser obtidos no momento: {labels}.",
    ranking_unavailable: "O ranking solicitado não está disponível no momento.",
    ranking_insight: "{city} lidera com {share}% do total entre as cidades listadas.",
    ranking_action: "🎯 Recomendação de ação: priorizar a estratégia de expansão nos mercados do topo do ranking.",
    comparison_title: "🏙️ **Comparação**",
    comparison_per_capita: "Maior PIB per capita: {city} ({value})",
    comparison_unemployment: "Menor taxa de desemprego: {city} ({value})",
    comparison_action: "🎯 Recomendação de ação: escolher pela escala de mercado ou pela renda per capita, conforme a estratégia.",
    profile_action: "🎯 Recomendação de ação: usar estes números como base para a estratégia local.",
    regions_title: "🗺️ **Análise por região**",
    region_line: "**{region}**: {n} cidades, PIB {gdp}, PIB per capita {per_capita}, desemprego médio {unemployment}",
    region_insight: "{region} concentra {share}% do PIB total das capitais.",
    region_action: "🎯 Recomendação de ação: concentrar a estratégia comercial nas regiões de maior PIB e acompanhar o desemprego das demais.",
    correlation_title: "🔗 **Análise de correlação**",
    correlation_strongest: "Correlação mais forte: {pair} ({value}).",
    correlation_undefined: "indefinida",
    correlation_action: "🎯 Recomendação de ação: investigar as relações fortes antes de definir a próxima estratégia.",
    summary_line: "A base contém {cities} cidades em {regions} regiões, com PIB somado de {gdp} e desemprego médio de {unemployment}.",
    greeting: "👋 Olá! Sou o agente de análise de dados. Posso montar rankings por PIB ou população, \
perfis de cidades, comparações regionais e correlações entre indicadores. Como posso ajudar?",
    generic: "Posso ajudar com análises sobre os dados de cidades brasileiras: rankings por PIB ou \
população, perfis de cidades, comparações regionais e correlações entre indicadores. \
Reformule a pergunta citando uma métrica, cidade ou região.",

    kw_correlation: &["correlação", "correlacao", "correlações", "relação entre"],
    kw_comparison: &["compare", "comparar", "comparação", "comparacao", "versus", "vs", "diferença", "melhor"],
    kw_ranking: &["maior", "maiores", "menor", "menores", "ranking", "top", "melhores", "principais"],
    kw_region: &["região", "regiões", "regional", "norte", "nordeste", "sudeste", "sul", "centro-oeste"],
    kw_greeting: &["olá", "ola", "oi", "bom dia", "boa tarde", "boa noite", "ajuda"],

    quality_insight: &["insight", "conclusão", "recomendação"],
    quality_data: &["dados", "estatística", "número"],
    quality_action: &["ação", "estratégia", "próximo"],
};

static ENGLISH: Phrases = Phrases {
    synthesis_system: "You are a data analysis and business intelligence expert. \
Answer the user's question using the data provided, cite concrete figures \
and suggest business actions when appropriate.",
    insight_system: "You are a data analysis and business intelligence expert. \
Analyze the data provided and answer with valuable business insights. \
Be specific, use numbers when possible and suggest actions based on the data.",
    prompt_question: "User question",
    prompt_data: "Available data",
    prompt_insights: "Generated insights",
    prompt_closing: "Please provide a complete analysis and business insights.",
    prompt_no_data: "(no data retrieved)",
    insight_data: "Data summary",
    insight_question: "Question",

    label_summary: "Overall statistical summary",
    label_top: "Top {n} cities by {metric}",
    label_search: "Search: {term}",
    label_regions: "Regional analysis",
    label_correlation: "Correlation analysis",
    label_memory: "Memory search",
    label_insights: "Insight generation",
    error_tag: "error",
    metric_names: [
        "population",
        "GDP",
        "GDP per capita",
        "unemployment rate",
        "education index",
    ],

    help_title: "🤔 **Human assistance requested**",
    help_question: "User question",
    help_reason: "Reason",
    help_confidence: "Agent confidence",
    help_body: "The agent is not confident enough to run this analysis automatically.\n\
Please give specific guidance or rephrase the question.",
    help_options_title: "Available options",
    help_options: [
        "Rephrase the question more specifically",
        "Ask for specific metrics",
        "Provide additional context",
        "Run the analysis with reduced confidence",
    ],

    billion: "billion",
    insights_title: "💡 **Insights**",
    data_title: "📊 **Data**",
    confidence_line: "Analysis confidence: {confidence}",
    unavailable: "⚠️ Some data could not be retrieved right now: {labels}.",
    ranking_unavailable: "The requested ranking is not available right now.",
    ranking_insight: "{city} leads with {share}% of the total among the listed cities.",
    ranking_action: "🎯 Recommended action: focus the expansion strategy on the top-ranked markets.",
    comparison_title: "🏙️ **Comparison**",
    comparison_per_capita: "Highest GDP per capita: {city} ({value})",
    comparison_unemployment: "Lowest unemployment rate: {city} ({value})",
    comparison_action: "🎯 Recommended action: choose by market scale or by per-capita income, depending on the strategy.",
    profile_action: "🎯 Recommended action: use these figures as the baseline for a local strategy.",
    regions_title: "🗺️ **Regional analysis**",
    region_line: "**{region}**: {n} cities, GDP {gdp}, GDP per capita {per_capita}, average unemployment {unemployment}",
    region_insight: "{region} holds {share}% of total GDP across the capitals.",
    region_action: "🎯 Recommended action: concentrate the commercial strategy on the highest-GDP regions and monitor unemployment elsewhere.",
    correlation_title: "🔗 **Correlation analysis**",
    correlation_strongest: "Strongest correlation: {pair} ({value}).",
    correlation_undefined: "undefined",
    correlation_action: "🎯 Recommended action: investigate the strong relationships before defining the next strategy.",
    summary_line: "The dataset covers {cities} cities in {regions} regions, with combined GDP of {gdp} and average unemployment of {unemployment}.",
    greeting: "👋 Hello! I am the data analysis agent. I can build rankings by GDP or population, \
city profiles, regional comparisons and correlations between indicators. How can I help?",
    generic: "I can help with analyses of Brazilian city data: rankings by GDP or population, \
city profiles, regional comparisons and correlations between indicators. \
Please rephrase the question mentioning a metric, city or region.",

    kw_correlation: &["correlation", "correlations", "relationship"],
    kw_comparison: &["compare", "comparison", "versus", "vs", "difference", "better"],
    kw_ranking: &["highest", "largest", "biggest", "lowest", "ranking", "top", "best", "leading"],
    kw_region: &["region", "regions", "regional", "north", "northeast", "southeast", "south", "central-west"],
    kw_greeting: &["hello", "hi", "hey", "good morning", "good afternoon", "help"],

    quality_insight: &["insight", "conclusion", "recommend"],
    quality_data: &["data", "statistic", "number"],
    quality_action: &["action", "strategy", "next"],
};

/// Language-specific strings and the fallback renderer
#[derive(Clone)]
pub struct TemplateLibrary {
    language: Language,
    phrases: &'static Phrases,
}

impl std::fmt::Debug for TemplateLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateLibrary")
            .field("language", &self.language)
            .finish()
    }
}

impl TemplateLibrary {
    pub fn new(language: Language) -> Self {
        let phrases = match language {
            Language::Portuguese => &PORTUGUESE,
            Language::English => &ENGLISH,
        };
        Self { language, phrases }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    // Prompts

    pub fn synthesis_system_prompt(&self) -> &'static str {
        self.phrases.synthesis_system
    }

    pub fn synthesis_prompt(&self, question: &str, data_text: &str, insights: &[String]) -> String {
        let p = self.phrases;
        let data = if data_text.trim().is_empty() {
            p.prompt_no_data
        } else {
            data_text
        };
        format!(
            "{}: {}\n\n{}:\n{}\n\n{}:\n{}\n\n{}",
            p.prompt_question,
            question,
            p.prompt_data,
            data,
            p.prompt_insights,
            insights.join("; "),
            p.prompt_closing
        )
    }

    pub fn insight_system_prompt(&self) -> &'static str {
        self.phrases.insight_system
    }

    pub fn insight_prompt(&self, data_text: &str, question: &str) -> String {
        let p = self.phrases;
        let data = if data_text.trim().is_empty() {
            p.prompt_no_data
        } else {
            data_text
        };
        format!("{}: {}\n\n{}: {}", p.insight_data, data, p.insight_question, question)
    }

    // Provenance labels

    pub fn label_summary(&self) -> String {
        self.phrases.label_summary.to_string()
    }

    pub fn label_top(&self, n: usize, metric: Metric) -> String {
        fill(
            self.phrases.label_top,
            &[("n", n.to_string()), ("metric", self.metric_name(metric).to_string())],
        )
    }

    pub fn label_search(&self, term: &str) -> String {
        fill(self.phrases.label_search, &[("term", term.to_string())])
    }

    pub fn label_regions(&self) -> String {
        self.phrases.label_regions.to_string()
    }

    pub fn label_correlation(&self) -> String {
        self.phrases.label_correlation.to_string()
    }

    pub fn label_memory(&self) -> String {
        self.phrases.label_memory.to_string()
    }

    pub fn label_insights(&self) -> String {
        self.phrases.label_insights.to_string()
    }

    pub fn error_tag(&self) -> &'static str {
        self.phrases.error_tag
    }

    pub fn metric_name(&self, metric: Metric) -> &'static str {
        let idx = Metric::ALL.iter().position(|m| *m == metric).unwrap_or(0);
        self.phrases.metric_names[idx]
    }

    // Escalation

    pub fn describe_reason(&self, reason: &EscalationReason) -> String {
        match (self.language, reason) {
            (Language::English, r) => r.to_string(),
            (Language::Portuguese, EscalationReason::LowConfidence { confidence, threshold }) => {
                format!("confiança baixa ({:.2} < {:.2})", confidence, threshold)
            }
            (Language::Portuguese, EscalationReason::UnknownIntent) => {
                "tipo de análise não identificado".to_string()
            }
            (Language::Portuguese, EscalationReason::TooManyMetrics { count }) => {
                format!("muitas métricas solicitadas ({})", count)
            }
            (Language::Portuguese, EscalationReason::ComplexScope { regions, cities }) => format!(
                "análise muito complexa ({} regiões e {} cidades)",
                regions, cities
            ),
            (Language::Portuguese, EscalationReason::ComplexComparison { metrics }) => {
                format!("comparação complexa com {} métricas", metrics)
            }
        }
    }

    /// Localized reasons joined with "; "
    pub fn describe_reasons(&self, reasons: &[EscalationReason]) -> String {
        reasons
            .iter()
            .map(|r| self.describe_reason(r))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn help_message(&self, question: &str, reasons: &[EscalationReason], confidence: f32) -> String {
        let p = self.phrases;
        let reason = self.describe_reasons(reasons);
        let options = p
            .help_options
            .iter()
            .enumerate()
            .map(|(i, o)| format!("{}. {}", i + 1, o))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\n**{}:** {}\n**{}:** {}\n**{}:** {:.2}\n\n{}\n\n**{}:**\n{}",
            p.help_title,
            p.help_question,
            question,
            p.help_reason,
            reason,
            p.help_confidence,
            confidence,
            p.help_body,
            p.help_options_title,
            options
        )
    }

    // Quality keywords

    pub fn insight_keywords(&self) -> &'static [&'static str] {
        self.phrases.quality_insight
    }

    pub fn data_keywords(&self) -> &'static [&'static str] {
        self.phrases.quality_data
    }

    pub fn action_keywords(&self) -> &'static [&'static str] {
        self.phrases.quality_action
    }

    // Fallback answers

    pub fn generic_response(&self) -> &'static str {
        self.phrases.generic
    }

    pub fn select_fallback(&self, question: &str, result: &ExecutionResult) -> FallbackKind {
        let p = self.phrases;
        let lower = question.to_lowercase();
        let has_cities = result.search_results().iter().any(|(_, r)| !r.is_empty());
        let has_ranking = result.ranking().is_some();
        let has_regions = result.regions().is_some_and(|r| !r.is_empty());
        let has_correlation = result.correlation().is_some();

        if mentions(&lower, p.kw_correlation) && has_correlation {
            FallbackKind::Correlation
        } else if mentions(&lower, p.kw_comparison) && has_cities {
            FallbackKind::CityComparison
        } else if mentions(&lower, p.kw_ranking) && has_ranking {
            FallbackKind::Ranking
        } else if mentions(&lower, p.kw_region) && has_regions {
            FallbackKind::Regions
        } else if has_cities {
            FallbackKind::CityProfile
        } else if has_ranking {
            FallbackKind::Ranking
        } else if has_regions {
            FallbackKind::Regions
        } else if has_correlation {
            FallbackKind::Correlation
        } else if mentions(&lower, p.kw_greeting) {
            FallbackKind::Greeting
        } else {
            FallbackKind::Generic
        }
    }

    /// Deterministic answer built only from the execution result
    pub fn fallback(&self, question: &str, result: &ExecutionResult, confidence: f32) -> String {
        let p = self.phrases;
        let kind = self.select_fallback(question, result);

        let mut sections = match kind {
            FallbackKind::Ranking => self.render_ranking(result),
            FallbackKind::CityProfile => self.render_profiles(result, false),
            FallbackKind::CityComparison => self.render_profiles(result, true),
            FallbackKind::Regions => self.render_regions(result),
            FallbackKind::Correlation => self.render_correlation(result),
            FallbackKind::Greeting => vec![p.greeting.to_string()],
            FallbackKind::Generic => self.render_generic(result),
        };

        if !result.insights.is_empty() {
            let lines: Vec<String> = result.insights.iter().map(|i| format!("• {}", i)).collect();
            sections.push(format!("{}\n{}", p.insights_title, lines.join("\n")));
        }

        let failed: Vec<&str> = result
            .data_used
            .iter()
            .filter(|d| d.starts_with(&format!("[{}]", p.error_tag)))
            .map(String::as_str)
            .collect();
        if !failed.is_empty() {
            sections.push(fill(p.unavailable, &[("labels", failed.join("; "))]));
        }

        if !matches!(kind, FallbackKind::Greeting | FallbackKind::Generic) {
            sections.push(fill(
                p.confidence_line,
                &[("confidence", self.decimal(confidence as f64, 2))],
            ));
        }

        sections.join("\n\n")
    }

    fn render_ranking(&self, result: &ExecutionResult) -> Vec<String> {
        let p = self.phrases;
        let Some((metric, records)) = result.ranking().filter(|(_, r)| !r.is_empty()) else {
            return vec![p.ranking_unavailable.to_string(), p.generic.to_string()];
        };

        let mut lines = vec![format!(
            "📊 **{}**",
            self.label_top(records.len(), metric)
        )];
        for (i, record) in records.iter().enumerate() {
            lines.push(format!(
                "{}. **{}** ({}) - {}",
                i + 1,
                record.city,
                record.state,
                self.metric_value(record, metric)
            ));
        }

        let total: f64 = records.iter().map(|r| r.value(metric)).sum();
        let mut insight = vec![p.insights_title.to_string()];
        if total > 0.0 {
            let share = records[0].value(metric) / total * 100.0;
            insight.push(format!(
                "• {}",
                fill(
                    p.ranking_insight,
                    &[("city", records[0].city.to_string()), ("share", self.decimal(share, 1))]
                )
            ));
        }
        insight.push(p.ranking_action.to_string());

        vec![lines.join("\n"), insight.join("\n")]
    }

    fn render_profiles(&self, result: &ExecutionResult, compare: bool) -> Vec<String> {
        let p = self.phrases;
        let mut records: Vec<CityRecord> = Vec::new();
        for (_, found) in result.search_results() {
            for record in found {
                if !records.iter().any(|r| r.city == record.city) {
                    records.push(record);
                }
            }
        }

        let mut sections: Vec<String> = records.iter().map(|r| self.profile(r)).collect();

        if compare && records.len() >= 2 {
            let mut lines = vec![p.comparison_title.to_string()];
            if let Some(best) = records
                .iter()
                .max_by(|a, b| a.gdp_per_capita.total_cmp(&b.gdp_per_capita))
            {
                lines.push(format!(
                    "• {}",
                    fill(
                        p.comparison_per_capita,
                        &[("city", best.city.to_string()), ("value", self.money(best.gdp_per_capita))]
                    )
                ));
            }
            if let Some(best) = records
                .iter()
                .min_by(|a, b| a.unemployment_rate.total_cmp(&b.unemployment_rate))
            {
                lines.push(format!(
                    "• {}",
                    fill(
                        p.comparison_unemployment,
                        &[("city", best.city.to_string()), ("value", self.percent(best.unemployment_rate))]
                    )
                ));
            }
            lines.push(p.comparison_action.to_string());
            sections.push(lines.join("\n"));
        } else {
            sections.push(p.profile_action.to_string());
        }
        sections
    }

    fn profile(&self, record: &CityRecord) -> String {
        let mut lines = vec![format!(
            "🏙️ **{}** ({}, {})",
            record.city, record.state, record.region
        )];
        for metric in Metric::ALL {
            lines.push(format!(
                "• {}: {}",
                capitalize(self.metric_name(metric)),
                self.metric_value(record, metric)
            ));
        }
        lines.join("\n")
    }

    fn render_regions(&self, result: &ExecutionResult) -> Vec<String> {
        let p = self.phrases;
        let regions = result.regions().unwrap_or_default();
        if regions.is_empty() {
            return self.render_generic(result);
        }

        let mut lines = vec![p.regions_title.to_string()];
        for agg in &regions {
            lines.push(format!(
                "• {}",
                fill(
                    p.region_line,
                    &[
                        ("region", agg.region.to_string()),
                        ("n", agg.num_cities.to_string()),
                        ("gdp", self.money_billions(agg.total_gdp)),
                        ("per_capita", self.money(agg.gdp_per_capita)),
                        ("unemployment", self.percent(agg.avg_unemployment_rate)),
                    ]
                )
            ));
        }

        let total = result
            .national_gdp()
            .unwrap_or_else(|| regions.iter().map(|r| r.total_gdp).sum());
        let mut insight = vec![p.insights_title.to_string()];
        if total > 0.0 {
            let share = regions[0].total_gdp / total * 100.0;
            insight.push(format!(
                "• {}",
                fill(
                    p.region_insight,
                    &[("region", regions[0].region.to_string()), ("share", self.decimal(share, 1))]
                )
            ));
        }
        insight.push(p.region_action.to_string());

        vec![lines.join("\n"), insight.join("\n")]
    }

    fn render_correlation(&self, result: &ExecutionResult) -> Vec<String> {
        let p = self.phrases;
        let Some(matrix) = result.correlation() else {
            return self.render_generic(result);
        };

        let mut lines = vec![p.correlation_title.to_string()];
        for pair in &matrix.pairs {
            let value = pair
                .coefficient
                .map(|c| self.decimal(c, 2))
                .unwrap_or_else(|| p.correlation_undefined.to_string());
            lines.push(format!(
                "• {} × {}: {}",
                self.metric_name(pair.a),
                self.metric_name(pair.b),
                value
            ));
        }

        let mut insight = vec![p.insights_title.to_string()];
        let strongest = matrix
            .pairs
            .iter()
            .filter_map(|c| c.coefficient.map(|v| (c, v)))
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()));
        if let Some((pair, value)) = strongest {
            let name = format!("{} × {}", self.metric_name(pair.a), self.metric_name(pair.b));
            insight.push(format!(
                "• {}",
                fill(
                    p.correlation_strongest,
                    &[("pair", name), ("value", self.decimal(value, 2))]
                )
            ));
        }
        insight.push(p.correlation_action.to_string());

        vec![lines.join("\n"), insight.join("\n")]
    }

    fn render_generic(&self, result: &ExecutionResult) -> Vec<String> {
        let p = self.phrases;
        match result.summary() {
            Some(summary) => vec![format!(
                "{}\n{}",
                p.data_title,
                fill(
                    p.summary_line,
                    &[
                        ("cities", summary.total_cities.to_string()),
                        ("regions", summary.total_regions.to_string()),
                        ("gdp", self.money_billions(summary.total_gdp)),
                        ("unemployment", self.percent(summary.avg_unemployment_rate)),
                    ]
                )
            )],
            None => vec![p.generic.to_string()],
        }
    }

    // Number formatting

    fn metric_value(&self, record: &CityRecord, metric: Metric) -> String {
        match metric {
            Metric::Population => self.number(record.population as f64, 0),
            Metric::GdpTotal => self.money_billions(record.gdp_total),
            Metric::GdpPerCapita => self.money(record.gdp_per_capita),
            Metric::UnemploymentRate => self.percent(record.unemployment_rate),
            Metric::EducationIndex => self.decimal(record.education_index, 2),
        }
    }

    fn money_billions(&self, value: f64) -> String {
        format!("R$ {} {}", self.number(value / 1e9, 1), self.phrases.billion)
    }

    fn money(&self, value: f64) -> String {
        format!("R$ {}", self.number(value, 0))
    }

    fn percent(&self, value: f64) -> String {
        format!("{}%", self.decimal(value, 1))
    }

    fn decimal(&self, value: f64, decimals: usize) -> String {
        self.number(value, decimals)
    }

    fn number(&self, value: f64, decimals: usize) -> String {
        let (thousands, point) = match self.language {
            Language::Portuguese => ('.', ','),
            Language::English => (',', '.'),
        };
        format_number(value, decimals, thousands, point)
    }
}

/// Replace `{name}` placeholders
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in values {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Whole-word match for single words, substring match for phrases
fn mentions(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| {
        if k.contains(' ') {
            lower.contains(k)
        } else {
            lower
                .split(|c: char| !(c.is_alphanumeric() || c == '-'))
                .any(|word| word == *k)
        }
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_number(value: f64, decimals: usize, thousands: char, point: char) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(*c);
    }

    let negative = value < 0.0 && raw.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(point);
        out.push_str(frac);
    }
    out
}
