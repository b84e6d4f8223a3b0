//! Intent - the classified purpose of a user question.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user wants from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// General statistics and metric analysis
    DataAnalysis,
    /// Look up specific cities, states or regions
    DataSearch,
    /// Business insights and recommendations
    InsightGeneration,
    /// Questions about earlier interactions
    MemorySearch,
    /// Side-by-side comparison of cities or regions
    Comparison,
    /// Top-N by some metric
    Ranking,
    /// Profile of a single city
    CityProfile,
    /// Aggregates per region
    RegionalAnalysis,
    /// Nothing usable was recognised
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::DataAnalysis,
        Intent::DataSearch,
        Intent::InsightGeneration,
        Intent::MemorySearch,
        Intent::Comparison,
        Intent::Ranking,
        Intent::CityProfile,
        Intent::RegionalAnalysis,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DataAnalysis => "data_analysis",
            Intent::DataSearch => "data_search",
            Intent::InsightGeneration => "insight_generation",
            Intent::MemorySearch => "memory_search",
            Intent::Comparison => "comparison",
            Intent::Ranking => "ranking",
            Intent::CityProfile => "city_profile",
            Intent::RegionalAnalysis => "regional_analysis",
            Intent::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.as_str() == s)
    }

    /// Short tag for terminal output
    pub fn indicator(&self) -> &'static str {
        match self {
            Intent::DataAnalysis => "[A]",
            Intent::DataSearch => "[S]",
            Intent::InsightGeneration => "[I]",
            Intent::MemorySearch => "[M]",
            Intent::Comparison => "[C]",
            Intent::Ranking => "[R]",
            Intent::CityProfile => "[P]",
            Intent::RegionalAnalysis => "[G]",
            Intent::Unknown => "[?]",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trip() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_str(intent.as_str()), Some(intent));
        }
        assert_eq!(Intent::from_str("nonsense"), None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Intent::RegionalAnalysis).unwrap();
        assert_eq!(json, "\"regional_analysis\"");
    }
}
