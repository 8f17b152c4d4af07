use crate::domain::record::SymbolRecord;
use crate::pipeline::ScreenReport;

pub const NO_MATCHES: &str = "No penny stocks meet the criteria.";
pub const HEADING: &str = "Penny Stocks with Bullish Signals (Potential for Price Increase):";
pub const RISK_NOTE: &str =
    "Note: These are not guaranteed to skyrocket. Conduct thorough research and consider risks.";

const COLUMNS: [&str; 5] = ["Symbol", "Price", "MarketCap", "AvgVolume", "PriceChange5D"];

pub fn render_report(report: &ScreenReport) -> String {
    if report.matches.is_empty() {
        return NO_MATCHES.to_string();
    }

    format!(
        "\n{HEADING}\n{}\n\n{RISK_NOTE}",
        render_table(&report.matches)
    )
}

/// Right-aligned text table, one row per record.
pub fn render_table(records: &[SymbolRecord]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.symbol.clone(),
                format!("{:.2}", r.price),
                format!("{:.0}", r.market_cap),
                format!("{:.0}", r.avg_volume),
                r.price_change_5d
                    .map(|c| format!("{c:.2}"))
                    .unwrap_or_else(|| "NaN".to_string()),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(join_row(COLUMNS.iter().copied(), &widths));
    for row in &rows {
        lines.push(join_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn join_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize; 5]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:>w$}"))
        .collect::<Vec<_>>()
        .join("  ")
}
