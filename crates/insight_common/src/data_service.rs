//! Data Service - the narrow query interface the executor consumes.
//!
//! `InMemoryDataset` is the reference implementation: a fixed table of
//! Brazilian capitals with real computations over it. Any other backend
//! (a database, a remote API) only has to implement `DataService`.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Numeric columns that can be ranked and correlated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Population,
    GdpTotal,
    GdpPerCapita,
    UnemploymentRate,
    EducationIndex,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Population,
        Metric::GdpTotal,
        Metric::GdpPerCapita,
        Metric::UnemploymentRate,
        Metric::EducationIndex,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Population => "population",
            Metric::GdpTotal => "gdp_total",
            Metric::GdpPerCapita => "gdp_per_capita",
            Metric::UnemploymentRate => "unemployment_rate",
            Metric::EducationIndex => "education_index",
        }
    }

    /// Resolve a metric name or synonym (Portuguese or English)
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "pib" | "gdp" | "gdp_total" | "pib_total" | "pib total" | "gdp total" => {
                Some(Metric::GdpTotal)
            }
            "população" | "populacao" | "population" => Some(Metric::Population),
            "pib per capita" | "gdp per capita" | "pib_per_capita" | "gdp_per_capita" => {
                Some(Metric::GdpPerCapita)
            }
            "desemprego" | "taxa de desemprego" | "taxa_desemprego" | "unemployment"
            | "unemployment_rate" => Some(Metric::UnemploymentRate),
            "educação" | "educacao" | "indice_educacao" | "education" | "education_index" => {
                Some(Metric::EducationIndex)
            }
            _ => None,
        }
    }
}

/// One row of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    pub state: String,
    pub region: String,
    pub population: u64,
    /// Total GDP in BRL
    pub gdp_total: f64,
    /// GDP per capita in BRL
    pub gdp_per_capita: f64,
    /// Percent
    pub unemployment_rate: f64,
    /// 0..1
    pub education_index: f64,
}

impl CityRecord {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Population => self.population as f64,
            Metric::GdpTotal => self.gdp_total,
            Metric::GdpPerCapita => self.gdp_per_capita,
            Metric::UnemploymentRate => self.unemployment_rate,
            Metric::EducationIndex => self.education_index,
        }
    }
}

/// Dataset-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub total_cities: usize,
    pub total_states: usize,
    pub total_regions: usize,
    pub avg_population: f64,
    pub avg_gdp_per_capita: f64,
    pub avg_unemployment_rate: f64,
    pub avg_education_index: f64,
    pub total_gdp: f64,
}

/// Per-region aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region: String,
    pub num_cities: usize,
    pub total_population: u64,
    pub avg_population: f64,
    pub total_gdp: f64,
    /// Total GDP over total population
    pub gdp_per_capita: f64,
    pub avg_unemployment_rate: f64,
}

/// Pearson correlation of two metrics; `None` when undefined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub a: Metric,
    pub b: Metric,
    pub coefficient: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub pairs: Vec<Correlation>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        self.pairs
            .iter()
            .find(|c| (c.a == a && c.b == b) || (c.a == b && c.b == a))
            .and_then(|c| c.coefficient)
    }
}

/// Pairs reported by `correlation_matrix`
pub const CORRELATION_PAIRS: [(Metric, Metric); 4] = [
    (Metric::Population, Metric::GdpTotal),
    (Metric::GdpPerCapita, Metric::EducationIndex),
    (Metric::UnemploymentRate, Metric::EducationIndex),
    (Metric::Population, Metric::UnemploymentRate),
];

/// Query interface over the analytical dataset.
///
/// Every call may fail with a `DataError`; callers treat that as
/// recoverable.
pub trait DataService: Send + Sync {
    fn summary(&self) -> Result<DatasetSummary, DataError>;

    /// Records ordered by `metric`, highest first
    fn top_by(&self, metric: Metric, limit: usize) -> Result<Vec<CityRecord>, DataError>;

    /// Case-insensitive match on city, state or region
    fn search(&self, term: &str) -> Result<Vec<CityRecord>, DataError>;

    /// One aggregate per region, highest total GDP first
    fn aggregate_by_region(&self) -> Result<Vec<RegionAggregate>, DataError>;

    fn correlation_matrix(&self) -> Result<CorrelationMatrix, DataError>;
}

/// Fixed in-process dataset
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    records: Vec<CityRecord>,
}

impl InMemoryDataset {
    pub fn new(records: Vec<CityRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    /// The ten largest Brazilian capital economies
    pub fn brazilian_capitals() -> Self {
        let rows: [(&str, &str, &str, u64, f64, f64, f64, f64); 10] = [
            ("São Paulo", "SP", "Sudeste", 12_325_232, 748.8e9, 60_750.0, 7.8, 0.87),
            ("Rio de Janeiro", "RJ", "Sudeste", 6_747_815, 364.5e9, 54_000.0, 8.9, 0.84),
            ("Brasília", "DF", "Centro-Oeste", 3_055_149, 254.3e9, 83_250.0, 6.5, 0.89),
            ("Belo Horizonte", "MG", "Sudeste", 2_523_794, 198.5e9, 78_650.0, 7.2, 0.82),
            ("Curitiba", "PR", "Sul", 1_948_626, 185.2e9, 95_050.0, 5.8, 0.88),
            ("Porto Alegre", "RS", "Sul", 1_483_771, 152.8e9, 103_000.0, 7.5, 0.85),
            ("Salvador", "BA", "Nordeste", 2_886_698, 118.9e9, 41_200.0, 12.8, 0.73),
            ("Fortaleza", "CE", "Nordeste", 2_686_612, 98.5e9, 36_650.0, 11.9, 0.71),
            ("Recife", "PE", "Nordeste", 1_653_461, 87.5e9, 52_900.0, 13.5, 0.76),
            ("Goiânia", "GO", "Centro-Oeste", 1_536_097, 78.5e9, 51_100.0, 8.3, 0.79),
        ];
        let records = rows
            .iter()
            .map(|&(city, state, region, population, gdp, per_capita, unemployment, education)| {
                CityRecord {
                    city: city.to_string(),
                    state: state.to_string(),
                    region: region.to_string(),
                    population,
                    gdp_total: gdp,
                    gdp_per_capita: per_capita,
                    unemployment_rate: unemployment,
                    education_index: education,
                }
            })
            .collect();
        Self::new(records)
    }

    fn require_records(&self) -> Result<&[CityRecord], DataError> {
        if self.records.is_empty() {
            Err(DataError::Unavailable("dataset is empty".to_string()))
        } else {
            Ok(&self.records)
        }
    }
}

impl Default for InMemoryDataset {
    fn default() -> Self {
        Self::brazilian_capitals()
    }
}

impl DataService for InMemoryDataset {
    fn summary(&self) -> Result<DatasetSummary, DataError> {
        let records = self.require_records()?;
        let n = records.len() as f64;

        let mut cities: Vec<&str> = records.iter().map(|r| r.city.as_str()).collect();
        let mut states: Vec<&str> = records.iter().map(|r| r.state.as_str()).collect();
        let mut regions: Vec<&str> = records.iter().map(|r| r.region.as_str()).collect();
        for list in [&mut cities, &mut states, &mut regions] {
            list.sort_unstable();
            list.dedup();
        }

        Ok(DatasetSummary {
            total_records: records.len(),
            total_cities: cities.len(),
            total_states: states.len(),
            total_regions: regions.len(),
            avg_population: records.iter().map(|r| r.population as f64).sum::<f64>() / n,
            avg_gdp_per_capita: records.iter().map(|r| r.gdp_per_capita).sum::<f64>() / n,
            avg_unemployment_rate: records.iter().map(|r| r.unemployment_rate).sum::<f64>() / n,
            avg_education_index: records.iter().map(|r| r.education_index).sum::<f64>() / n,
            total_gdp: records.iter().map(|r| r.gdp_total).sum(),
        })
    }

    fn top_by(&self, metric: Metric, limit: usize) -> Result<Vec<CityRecord>, DataError> {
        let mut sorted = self.records.clone();
        sorted.sort_by(|a, b| b.value(metric).total_cmp(&a.value(metric)));
        sorted.truncate(limit);
        Ok(sorted)
    }

    fn search(&self, term: &str) -> Result<Vec<CityRecord>, DataError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .iter()
            .filter(|r| {
                r.city.to_lowercase().contains(&needle)
                    || r.state.to_lowercase().contains(&needle)
                    || r.region.to_lowercase().contains(&needle)
                    || region_alias(&r.region).is_some_and(|alias| alias.contains(&needle))
            })
            .cloned()
            .collect())
    }

    fn aggregate_by_region(&self) -> Result<Vec<RegionAggregate>, DataError> {
        let records = self.require_records()?;
        let mut aggregates: Vec<RegionAggregate> = Vec::new();

        for record in records {
            let idx = match aggregates.iter().position(|a| a.region == record.region) {
                Some(idx) => idx,
                None => {
                    aggregates.push(RegionAggregate {
                        region: record.region.clone(),
                        num_cities: 0,
                        total_population: 0,
                        avg_population: 0.0,
                        total_gdp: 0.0,
                        gdp_per_capita: 0.0,
                        avg_unemployment_rate: 0.0,
                    });
                    aggregates.len() - 1
                }
            };
            let agg = &mut aggregates[idx];
            agg.num_cities += 1;
            agg.total_population += record.population;
            agg.total_gdp += record.gdp_total;
            // Summed here, divided below
            agg.avg_unemployment_rate += record.unemployment_rate;
        }

        for agg in &mut aggregates {
            let n = agg.num_cities as f64;
            agg.avg_population = agg.total_population as f64 / n;
            agg.avg_unemployment_rate /= n;
            if agg.total_population > 0 {
                agg.gdp_per_capita = agg.total_gdp / agg.total_population as f64;
            }
        }

        aggregates.sort_by(|a, b| b.total_gdp.total_cmp(&a.total_gdp));
        Ok(aggregates)
    }

    fn correlation_matrix(&self) -> Result<CorrelationMatrix, DataError> {
        let records = self.require_records()?;
        if records.len() < 2 {
            return Err(DataError::Unavailable(
                "correlation needs at least two records".to_string(),
            ));
        }

        let pairs = CORRELATION_PAIRS
            .iter()
            .map(|&(a, b)| {
                let xs: Vec<f64> = records.iter().map(|r| r.value(a)).collect();
                let ys: Vec<f64> = records.iter().map(|r| r.value(b)).collect();
                Correlation {
                    a,
                    b,
                    coefficient: pearson(&xs, &ys),
                }
            })
            .collect();

        Ok(CorrelationMatrix { pairs })
    }
}

/// English name of a Portuguese region, lowercase
fn region_alias(region: &str) -> Option<&'static str> {
    match region {
        "Norte" => Some("north"),
        "Nordeste" => Some("northeast"),
        "Sudeste" => Some("southeast"),
        "Sul" => Some("south"),
        "Centro-Oeste" => Some("central-west"),
        _ => None,
    }
}

/// Does a stored region name match a user term (either language)?
pub fn region_matches(region: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    region.to_lowercase() == term || region_alias(region) == Some(term.as_str())
}

/// Pearson correlation coefficient; `None` for zero variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let data = InMemoryDataset::brazilian_capitals();
        let summary = data.summary().unwrap();
        assert_eq!(summary.total_records, data.records().len());
        assert_eq!(summary.total_records, 10);
        assert_eq!(summary.total_cities, 10);
        assert_eq!(summary.total_states, 10);
        assert_eq!(summary.total_regions, 4);
        assert!(summary.total_gdp > 2.0e12);
    }

    #[test]
    fn test_top_by_gdp() {
        let data = InMemoryDataset::brazilian_capitals();
        let top = data.top_by(Metric::GdpTotal, 3).unwrap();
        let names: Vec<&str> = top.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(names, vec!["São Paulo", "Rio de Janeiro", "Brasília"]);
    }

    #[test]
    fn test_top_by_per_capita() {
        let data = InMemoryDataset::brazilian_capitals();
        let top = data.top_by(Metric::GdpPerCapita, 1).unwrap();
        assert_eq!(top[0].city, "Porto Alegre");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let data = InMemoryDataset::brazilian_capitals();
        assert_eq!(data.search("recife").unwrap().len(), 1);
        assert_eq!(data.search("NORDESTE").unwrap().len(), 3);
        assert_eq!(data.search("northeast").unwrap().len(), 3);
        assert_eq!(data.search("SP").unwrap()[0].city, "São Paulo");
        assert!(data.search("Manaus").unwrap().is_empty());
        assert!(data.search("   ").unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_by_region_sorted_by_gdp() {
        let data = InMemoryDataset::brazilian_capitals();
        let regions = data.aggregate_by_region().unwrap();
        assert_eq!(regions.len(), 4);
        assert_eq!(regions[0].region, "Sudeste");
        assert_eq!(regions[0].num_cities, 3);
        assert!(regions.windows(2).all(|w| w[0].total_gdp >= w[1].total_gdp));
        let nordeste = regions.iter().find(|r| r.region == "Nordeste").unwrap();
        assert!((nordeste.avg_unemployment_rate - (12.8 + 11.9 + 13.5) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_matrix() {
        let data = InMemoryDataset::brazilian_capitals();
        let matrix = data.correlation_matrix().unwrap();
        assert_eq!(matrix.pairs.len(), 4);
        let pop_gdp = matrix.get(Metric::GdpTotal, Metric::Population).unwrap();
        assert!(pop_gdp > 0.9, "population and GDP should correlate strongly: {}", pop_gdp);
        let unemp_edu = matrix.get(Metric::UnemploymentRate, Metric::EducationIndex).unwrap();
        assert!(unemp_edu < 0.0);
    }

    #[test]
    fn test_empty_dataset_is_unavailable() {
        let data = InMemoryDataset::new(Vec::new());
        assert!(matches!(data.summary(), Err(DataError::Unavailable(_))));
        assert!(matches!(data.correlation_matrix(), Err(DataError::Unavailable(_))));
        assert!(data.top_by(Metric::GdpTotal, 5).unwrap().is_empty());
    }

    #[test]
    fn test_region_matches() {
        assert!(region_matches("Nordeste", "nordeste"));
        assert!(region_matches("Centro-Oeste", "Central-West"));
        assert!(!region_matches("Nordeste", "norte"));
    }

    #[test]
    fn test_pearson() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), Some(1.0));
        assert_eq!(pearson(&[1.0, 1.0], &[1.0, 2.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_metric_synonyms() {
        assert_eq!(Metric::from_name("PIB"), Some(Metric::GdpTotal));
        assert_eq!(Metric::from_name("população"), Some(Metric::Population));
        assert_eq!(Metric::from_name("pib per capita"), Some(Metric::GdpPerCapita));
        assert_eq!(Metric::from_name("gdp_total"), Some(Metric::GdpTotal));
        assert_eq!(Metric::from_name("happiness"), None);
    }
}
