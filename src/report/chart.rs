//! Text bar charts for terminal output

use crate::api::types::TopProduct;
use crate::report::formatter::format_amount;

/// Number of products shown per chart
pub const CHART_TOP_N: usize = 10;

/// Default bar width in characters
pub const DEFAULT_BAR_WIDTH: usize = 40;

const BAR_CHAR: char = '█';

/// Horizontal bar chart, one line per `(label, value)` pair, in input order
///
/// Bars are scaled against the largest value. Negative values draw no bar.
pub fn render_bar_chart(title: &str, bars: &[(String, f64)], width: usize, decimals: usize) -> String {
    let mut out = format!("{}\n", title);
    if bars.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    for (label, value) in bars {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        let pad = label_width - label.chars().count();
        out.push_str(&format!(
            "{}{} | {} {}\n",
            label,
            " ".repeat(pad),
            BAR_CHAR.to_string().repeat(len),
            format_amount(*value, decimals)
        ));
    }

    out
}

/// Top products by quantity and by amount (thousands of RUB), largest first
pub fn top_products_chart(rows: &[TopProduct]) -> String {
    let mut by_count: Vec<&TopProduct> = rows.iter().collect();
    by_count.sort_by(|a, b| b.sales_count.cmp(&a.sales_count));
    let count_bars: Vec<(String, f64)> = by_count
        .iter()
        .take(CHART_TOP_N)
        .map(|p| (p.product.clone(), p.sales_count as f64))
        .collect();

    let mut by_amount: Vec<&TopProduct> = rows.iter().collect();
    by_amount.sort_by(|a, b| b.sales_amount.total_cmp(&a.sales_amount));
    let amount_bars: Vec<(String, f64)> = by_amount
        .iter()
        .take(CHART_TOP_N)
        .map(|p| (p.product.clone(), p.sales_amount / 1000.0))
        .collect();

    let mut out = render_bar_chart(
        &format!("Top {} products by quantity", CHART_TOP_N),
        &count_bars,
        DEFAULT_BAR_WIDTH,
        0,
    );
    out.push('\n');
    out.push_str(&render_bar_chart(
        &format!("Top {} products by amount, thousand RUB", CHART_TOP_N),
        &amount_bars,
        DEFAULT_BAR_WIDTH,
        1,
    ));
    out
}
