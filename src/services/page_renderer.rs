use chrono::{DateTime, Utc};
use std::fmt::Display;

use crate::models::chain_view::{AnnotatedRow, ChainView, MaxOpenInterest, SideSnapshot};

/// Column order of the option-chain table: CE side mirrored around the strike
pub const TABLE_COLUMNS: [&str; 15] = [
    "CE_Sign",
    "CE_OI",
    "CE_COI",
    "CE_Volume",
    "CE_IV",
    "CE_LTP",
    "CE_PChange",
    "Strike",
    "PE_PChange",
    "PE_LTP",
    "PE_IV",
    "PE_Volume",
    "PE_COI",
    "PE_OI",
    "PE_Sign",
];

const STYLE: &str = "body{font-family:sans-serif;margin:1.5rem}\
table{border-collapse:collapse;font-size:0.85rem}\
th,td{border:1px solid #ccc;padding:0.25rem 0.5rem;text-align:right}\
td.strike{font-weight:bold;background:#f3f3f3;text-align:center}\
.bullish{color:#1a7f37}.bearish{color:#cf222e}\
dl{display:grid;grid-template-columns:max-content auto;gap:0.25rem 1rem}";

/// Escape text for HTML element content and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn side_cells(side: &SideSnapshot) -> [String; 7] {
    [
        side.sentiment.to_string(),
        cell(side.open_interest),
        cell(side.change_in_open_interest),
        cell(side.total_traded_volume),
        cell(side.implied_volatility),
        cell(side.last_price),
        cell(side.percent_change),
    ]
}

fn row_cells(row: &AnnotatedRow) -> Vec<String> {
    let mut cells: Vec<String> = side_cells(&row.ce).into();
    cells.push(cell(row.strike));
    // PE side reads outward from the strike
    cells.extend(side_cells(&row.pe).into_iter().rev());
    cells
}

fn render_table(rows: &[AnnotatedRow]) -> String {
    let mut html = String::from("<table class=\"option-chain\">\n<thead><tr>");
    for column in TABLE_COLUMNS {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>");
        for (column, value) in TABLE_COLUMNS.iter().zip(row_cells(row)) {
            if *column == "Strike" {
                html.push_str(&format!("<td class=\"strike\">{}</td>", escape_html(&value)));
            } else {
                html.push_str(&format!("<td>{}</td>", escape_html(&value)));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

fn max_details(max: Option<MaxOpenInterest>) -> String {
    match max {
        Some(m) => format!("{} (OI {})", m.strike, m.open_interest),
        None => "-".to_string(),
    }
}

/// Render the full dashboard page for one snapshot
pub fn render_index_page(symbol: &str, view: &ChainView, fetched_at: DateTime<Utc>) -> String {
    let summary = &view.summary;
    let comparison = summary.comparison;
    let bias_class = if comparison.ce_higher() { "bullish" } else { "bearish" };
    let symbol = escape_html(symbol);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{} Option Chain</title>\n", symbol));
    html.push_str(&format!("<style>{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{} Option Chain</h1>\n", symbol));

    let as_of = match &view.timestamp {
        Some(timestamp) => format!("As of {}, ", escape_html(timestamp)),
        None => String::new(),
    };
    html.push_str(&format!(
        "<p class=\"timestamp\">{}fetched {}</p>\n",
        as_of,
        fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    html.push_str(&format!(
        "<h2 id=\"comparison\" class=\"{}\" data-ce-higher=\"{}\">{}</h2>\n",
        bias_class,
        comparison.ce_higher(),
        escape_html(&comparison.to_string())
    ));

    if let Some(percentage) = comparison.sideways_percentage() {
        html.push_str(&format!(
            "<p id=\"sideways\">Market is range-bound: CE/PE change differs by {}%</p>\n",
            escape_html(&percentage)
        ));
    }

    html.push_str("<dl class=\"summary\">\n");
    let summary_items = [
        ("Underlying", summary.underlying_value.to_string()),
        ("CE change in OI (last 9)", summary.ce_change_in_oi_sum.to_string()),
        ("PE change in OI (first 9)", summary.pe_change_in_oi_sum.to_string()),
        ("Max CE OI", max_details(summary.max_ce)),
        ("Max PE OI", max_details(summary.max_pe)),
    ];
    for (label, value) in summary_items {
        html.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>\n",
            label,
            escape_html(&value)
        ));
    }
    html.push_str("</dl>\n");

    html.push_str(&render_table(&view.rows));
    html.push_str("\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chain_view::{ComparisonLabel, Sentiment, SummaryMetrics};
    use chrono::TimeZone;

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, 20, 10, 0, 5).unwrap()
    }

    fn side(sentiment: Sentiment, oi: i64, coi: i64) -> SideSnapshot {
        SideSnapshot {
            sentiment,
            open_interest: Some(oi),
            change_in_open_interest: Some(coi),
            total_traded_volume: Some(1500),
            implied_volatility: Some(12.5),
            last_price: None,
            percent_change: Some(-3.2),
        }
    }

    fn sample_view(comparison: ComparisonLabel) -> ChainView {
        ChainView {
            rows: vec![AnnotatedRow {
                strike: Some(19750),
                ce: side(Sentiment::FreshShort, 1000, 200),
                pe: side(Sentiment::LongUnwind, 800, -50),
            }],
            summary: SummaryMetrics {
                underlying_value: 19732.45,
                ce_change_in_oi_sum: 200,
                pe_change_in_oi_sum: -50,
                comparison,
                max_ce: Some(MaxOpenInterest { strike: 19750, open_interest: 1000 }),
                max_pe: None,
            },
            timestamp: Some("20-Oct-2023 15:30:00".to_string()),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">R&D's</a>"),
            "&lt;a href=&quot;x&quot;&gt;R&amp;D&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_row_cells_follow_column_order() {
        let view = sample_view(ComparisonLabel::Sideways { percent: 1.0 });
        let cells = row_cells(&view.rows[0]);

        assert_eq!(cells.len(), TABLE_COLUMNS.len());
        assert_eq!(cells[0], "FRESH SHORT");
        assert_eq!(cells[1], "1000");
        assert_eq!(cells[5], "");
        assert_eq!(cells[7], "19750");
        assert_eq!(cells[8], "-3.2");
        assert_eq!(cells[12], "-50");
        assert_eq!(cells[13], "800");
        assert_eq!(cells[14], "LONG UNWIND");
    }

    #[test]
    fn test_page_contains_summary() {
        let html = render_index_page(
            "NIFTY",
            &sample_view(ComparisonLabel::CeHigher { percent: 500.0 }),
            fetched_at(),
        );

        assert!(html.contains("<title>NIFTY Option Chain</title>"));
        assert!(html.contains("CE is 500.00% higher"));
        assert!(html.contains("data-ce-higher=\"true\""));
        assert!(html.contains("19732.45"));
        assert!(html.contains("19750 (OI 1000)"));
        assert!(html.contains("As of 20-Oct-2023 15:30:00, fetched 2023-10-20 10:00:05 UTC"));
        assert!(!html.contains("id=\"sideways\""));
    }

    #[test]
    fn test_page_pe_higher_is_bearish() {
        let html = render_index_page(
            "NIFTY",
            &sample_view(ComparisonLabel::PeHigher { percent: 80.0 }),
            fetched_at(),
        );

        assert!(html.contains("class=\"bearish\""));
        assert!(html.contains("data-ce-higher=\"false\""));
    }

    #[test]
    fn test_page_shows_sideways_percentage() {
        let html = render_index_page(
            "NIFTY",
            &sample_view(ComparisonLabel::Sideways { percent: 16.666 }),
            fetched_at(),
        );

        assert!(html.contains("Sideways (16.67% change)"));
        assert!(html.contains("differs by 16.67%"));
    }
}
