use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Interpretation of a change in open interest against the price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    #[serde(rename = "FRESH LONG")]
    FreshLong,
    #[serde(rename = "LONG UNWIND")]
    LongUnwind,
    #[serde(rename = "FRESH SHORT")]
    FreshShort,
    #[serde(rename = "SHORT COVERING")]
    ShortCovering,
    #[serde(rename = "-")]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::FreshLong => "FRESH LONG",
            Sentiment::LongUnwind => "LONG UNWIND",
            Sentiment::FreshShort => "FRESH SHORT",
            Sentiment::ShortCovering => "SHORT COVERING",
            Sentiment::Neutral => "-",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side (CE or PE) of an annotated row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSnapshot {
    pub sentiment: Sentiment,
    pub open_interest: Option<i64>,
    pub change_in_open_interest: Option<i64>,
    pub total_traded_volume: Option<i64>,
    pub implied_volatility: Option<f64>,
    pub last_price: Option<f64>,
    pub percent_change: Option<f64>,
}

/// One strike of the rendered table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRow {
    /// Quoted strike rounded to the nearest 50. Absent when the entry quotes no strike.
    pub strike: Option<i64>,
    pub ce: SideSnapshot,
    pub pe: SideSnapshot,
}

/// Strike holding the largest open interest on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaxOpenInterest {
    pub strike: i64,
    pub open_interest: i64,
}

/// Directional bias derived from the CE/PE open-interest change sums.
///
/// `percent` is `|ce - pe| / pe * 100`, or `0` when the PE sum is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparisonLabel {
    CeHigher { percent: f64 },
    PeHigher { percent: f64 },
    Sideways { percent: f64 },
}

impl ComparisonLabel {
    pub fn percent(&self) -> f64 {
        match *self {
            ComparisonLabel::CeHigher { percent }
            | ComparisonLabel::PeHigher { percent }
            | ComparisonLabel::Sideways { percent } => percent,
        }
    }

    /// False only for a "PE is X% higher" label
    pub fn ce_higher(&self) -> bool {
        !matches!(self, ComparisonLabel::PeHigher { .. })
    }

    /// Two-decimal percentage, only for sideways labels
    pub fn sideways_percentage(&self) -> Option<String> {
        match self {
            ComparisonLabel::Sideways { percent } => Some(format!("{:.2}", percent)),
            _ => None,
        }
    }
}

impl fmt::Display for ComparisonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonLabel::CeHigher { percent } => write!(f, "CE is {:.2}% higher", percent),
            ComparisonLabel::PeHigher { percent } => write!(f, "PE is {:.2}% higher", percent),
            ComparisonLabel::Sideways { percent } => write!(f, "Sideways ({:.2}% change)", percent),
        }
    }
}

impl Serialize for ComparisonLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComparisonLabel", 4)?;
        state.serialize_field("label", &self.to_string())?;
        state.serialize_field("percent", &self.percent())?;
        state.serialize_field("ce_higher", &self.ce_higher())?;
        state.serialize_field("sideways_percentage", &self.sideways_percentage())?;
        state.end()
    }
}

/// Summary figures shown above the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub underlying_value: f64,
    pub ce_change_in_oi_sum: i64,
    pub pe_change_in_oi_sum: i64,
    pub comparison: ComparisonLabel,
    pub max_ce: Option<MaxOpenInterest>,
    pub max_pe: Option<MaxOpenInterest>,
}

/// Result of transforming one option-chain snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainView {
    pub rows: Vec<AnnotatedRow>,
    pub summary: SummaryMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body of `GET /api/option-chain`
#[derive(Debug, Clone, Serialize)]
pub struct OptionChainResponse {
    pub symbol: String,
    pub fetched_at: DateTime<Utc>,
    #[serde(flatten)]
    pub view: ChainView,
}
