use serde::Deserialize;
use serde_json::Value;

use crate::error::ChainError;
use crate::models::chain_view::{
    AnnotatedRow, ChainView, ComparisonLabel, MaxOpenInterest, Sentiment, SideSnapshot,
    SummaryMetrics,
};
use crate::models::option_chain::{OptionQuote, RawChainEntry};

/// Spacing between listed NIFTY strikes
pub const STRIKE_STEP: f64 = 50.0;

/// Rows kept on each side of the rounded underlying (7 strikes at 50-point spacing)
pub const BAND_HALF_WIDTH: i64 = 350;

/// Rows summed at the tail (CE) and head (PE) of the filtered table
pub const SUM_WINDOW: usize = 9;

const DOMINANCE_THRESHOLD_PCT: f64 = 50.0;

/// Classify an OI change against the price move.
/// A zero or absent value on either side gives `Sentiment::Neutral`.
pub fn classify_sentiment(change_in_oi: Option<i64>, percent_change: Option<f64>) -> Sentiment {
    let (Some(change_in_oi), Some(percent_change)) = (change_in_oi, percent_change) else {
        return Sentiment::Neutral;
    };

    if change_in_oi > 0 && percent_change > 0.0 {
        Sentiment::FreshLong
    } else if change_in_oi < 0 && percent_change < 0.0 {
        Sentiment::LongUnwind
    } else if change_in_oi > 0 && percent_change < 0.0 {
        Sentiment::FreshShort
    } else if change_in_oi < 0 && percent_change > 0.0 {
        Sentiment::ShortCovering
    } else {
        Sentiment::Neutral
    }
}

/// Round a price to the nearest strike step, ties away from zero (1225 -> 1250)
pub fn normalize_strike(price: f64) -> i64 {
    ((price / STRIKE_STEP).round() * STRIKE_STEP) as i64
}

fn snapshot(quote: Option<&OptionQuote>) -> SideSnapshot {
    let Some(quote) = quote else {
        return SideSnapshot {
            sentiment: Sentiment::Neutral,
            open_interest: None,
            change_in_open_interest: None,
            total_traded_volume: None,
            implied_volatility: None,
            last_price: None,
            percent_change: None,
        };
    };

    SideSnapshot {
        sentiment: classify_sentiment(quote.change_in_open_interest, quote.percent_change),
        open_interest: quote.open_interest,
        change_in_open_interest: quote.change_in_open_interest,
        total_traded_volume: quote.total_traded_volume,
        implied_volatility: quote.implied_volatility,
        last_price: quote.last_price,
        percent_change: quote.percent_change,
    }
}

/// Annotate one raw strike. Sentiment is assigned before any filtering.
pub fn build_row(entry: &RawChainEntry) -> AnnotatedRow {
    AnnotatedRow {
        strike: entry.quoted_strike().map(normalize_strike),
        ce: snapshot(entry.call.as_ref()),
        pe: snapshot(entry.put.as_ref()),
    }
}

/// Underlying value from the first PE record exposing it, in payload order
pub fn find_underlying_value(entries: &[RawChainEntry]) -> Option<f64> {
    entries
        .iter()
        .filter_map(|entry| entry.put.as_ref())
        .find_map(|put| put.underlying_value)
}

/// Keep rows whose strike lies within ±350 of the rounded underlying, order preserved
pub fn filter_band(rows: Vec<AnnotatedRow>, underlying_value: f64) -> Vec<AnnotatedRow> {
    let center = normalize_strike(underlying_value);
    let band = (center - BAND_HALF_WIDTH)..=(center + BAND_HALF_WIDTH);

    rows.into_iter()
        .filter(|row| row.strike.is_some_and(|strike| band.contains(&strike)))
        .collect()
}

/// Largest open interest on one side; first occurrence wins ties, absent values are skipped
fn max_open_interest(
    rows: &[AnnotatedRow],
    side: impl Fn(&AnnotatedRow) -> &SideSnapshot,
) -> Option<MaxOpenInterest> {
    let mut best: Option<MaxOpenInterest> = None;

    for row in rows {
        let (Some(strike), Some(open_interest)) = (row.strike, side(row).open_interest) else {
            continue;
        };
        if best.is_none_or(|b| open_interest > b.open_interest) {
            best = Some(MaxOpenInterest {
                strike,
                open_interest,
            });
        }
    }

    best
}

/// Bias label from the CE tail sum and PE head sum.
///
/// The ratio checks are only evaluated when their denominator is non-zero;
/// with both guards failing the label is sideways.
pub fn compare_oi_change(ce_sum: i64, pe_sum: i64) -> ComparisonLabel {
    let ce = ce_sum as f64;
    let pe = pe_sum as f64;

    let percent = if pe_sum != 0 {
        (ce - pe).abs() / pe * 100.0
    } else {
        0.0
    };

    if pe_sum != 0 && (ce - pe) / pe * 100.0 > DOMINANCE_THRESHOLD_PCT {
        if ce_sum >= pe_sum {
            ComparisonLabel::CeHigher { percent }
        } else {
            ComparisonLabel::PeHigher { percent }
        }
    } else if ce_sum != 0 && (pe - ce) / ce * 100.0 > DOMINANCE_THRESHOLD_PCT {
        ComparisonLabel::PeHigher { percent }
    } else {
        ComparisonLabel::Sideways { percent }
    }
}

/// Sum the present values, failing instead of wrapping on overflow
fn checked_oi_sum<'a>(
    rows: impl Iterator<Item = &'a AnnotatedRow>,
    side: impl Fn(&AnnotatedRow) -> &SideSnapshot,
    label: &str,
) -> Result<i64, ChainError> {
    rows.filter_map(|row| side(row).change_in_open_interest)
        .try_fold(0i64, |acc, value| acc.checked_add(value))
        .ok_or_else(|| {
            ChainError::MalformedPayload(format!("{} change in open interest overflows", label))
        })
}

/// Summary over the filtered, order-preserved rows
pub fn summarize(rows: &[AnnotatedRow], underlying_value: f64) -> Result<SummaryMetrics, ChainError> {
    let tail_start = rows.len().saturating_sub(SUM_WINDOW);

    let ce_change_in_oi_sum = checked_oi_sum(rows[tail_start..].iter(), |row| &row.ce, "CE")?;
    let pe_change_in_oi_sum = checked_oi_sum(rows.iter().take(SUM_WINDOW), |row| &row.pe, "PE")?;

    Ok(SummaryMetrics {
        underlying_value,
        ce_change_in_oi_sum,
        pe_change_in_oi_sum,
        comparison: compare_oi_change(ce_change_in_oi_sum, pe_change_in_oi_sum),
        max_ce: max_open_interest(rows, |row| &row.ce),
        max_pe: max_open_interest(rows, |row| &row.pe),
    })
}

fn parse_entries(payload: &Value) -> Result<Vec<RawChainEntry>, ChainError> {
    let data = payload
        .get("filtered")
        .and_then(|filtered| filtered.get("data"))
        .and_then(Value::as_array)
        .ok_or_else(|| ChainError::MalformedPayload("missing `filtered.data` array".to_string()))?;

    data.iter()
        .enumerate()
        .map(|(index, entry)| {
            RawChainEntry::deserialize(entry).map_err(|e| {
                ChainError::MalformedPayload(format!("entry {}: {}", index, e))
            })
        })
        .collect()
}

/// Turn a raw option-chain payload into the annotated table and its summary
pub fn format_option_chain(payload: &Value) -> Result<ChainView, ChainError> {
    let entries = parse_entries(payload).inspect_err(|e| {
        let preview: String = payload.to_string().chars().take(200).collect();
        tracing::error!("{} (payload starts with: {})", e, preview);
    })?;

    let underlying_value = find_underlying_value(&entries).ok_or_else(|| {
        tracing::warn!(
            "None of the {} option chain entries carries an underlying value",
            entries.len()
        );
        ChainError::MissingUnderlyingValue
    })?;

    let rows: Vec<AnnotatedRow> = entries.iter().map(build_row).collect();
    let rows = filter_band(rows, underlying_value);

    if rows.is_empty() {
        let center = normalize_strike(underlying_value);
        tracing::warn!(
            "None of the {} option chain strikes lies within {} of {}",
            entries.len(),
            BAND_HALF_WIDTH,
            center
        );
        return Err(ChainError::NoStrikesInBand {
            center,
            band: BAND_HALF_WIDTH,
        });
    }

    let summary = summarize(&rows, underlying_value).inspect_err(|e| tracing::error!("{}", e))?;

    tracing::debug!(
        "Kept {} of {} strikes around underlying {} ({})",
        rows.len(),
        entries.len(),
        underlying_value,
        summary.comparison
    );

    let timestamp = payload
        .pointer("/records/timestamp")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ChainView {
        rows,
        summary,
        timestamp,
    })
}
