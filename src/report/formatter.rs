// Console and markdown rendering of report data

use crate::api::types::{ReportResponse, SlowQuery, TopProduct};

fn table_line<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(AsRef::<str>::as_ref).collect();
    format!("| {} |\n", cells.join(" | "))
}

/// Markdown table with a header row and one line per row
pub fn build_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = table_line(headers);
    table.push('|');
    table.push_str(&"---|".repeat(headers.len()));
    table.push('\n');
    table.extend(rows.iter().map(|row| table_line(row.as_slice())));
    table
}

/// One item per line, numbered from 1 or bulleted
pub fn build_list(items: &[String], ordered: bool) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match ordered {
            true => format!("{}. {}\n", i + 1, item),
            false => format!("- {}\n", item),
        })
        .collect()
}

/// Format an amount with space thousand separators and fixed precision
///
/// 1234567.891 with 2 decimals -> "1 234 567.89"
pub fn format_amount(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals);

    let (integer_part, fractional_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let len = integer_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer_part.chars().enumerate() {
        grouped.push(ch);
        // Space every 3 digits from the right (but not at the end)
        if (len - i - 1) % 3 == 0 && i < len - 1 {
            grouped.push(' ');
        }
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match fractional_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Markdown table of report rows: product, quantity, amount, period, then
/// any extra server columns
pub fn top_products_table(rows: &[TopProduct]) -> String {
    let extra = TopProduct::extra_columns(rows);
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.product.clone(),
                row.sales_count.to_string(),
                format_amount(row.sales_amount, 2),
                row.period.clone(),
            ];
            cells.extend(extra.iter().map(|column| row.extra_text(column)));
            cells
        })
        .collect();

    let mut headers = vec!["Product", "Sold, pcs", "Amount, RUB", "Period"];
    headers.extend(extra.iter().copied());
    build_table(&headers, &body)
}

/// Console summary of a top-products report
///
/// A logical failure renders the server's error message instead of the rows.
pub fn render_top_products(report: &ReportResponse) -> String {
    if !report.success {
        let message = report
            .error
            .as_ref()
            .map(|e| e.message.as_str())
            .or(report.message.as_deref())
            .unwrap_or("unknown error");
        return format!("Error: {}\n", message);
    }

    let mut out = String::from("Top products:\n");
    if let Some(meta) = &report.metadata {
        out.push_str(&format!("Generated in: {} s\n", meta.generated_in));
        out.push_str(&format!("From cache: {}\n", if meta.cached { "yes" } else { "no" }));
    }
    out.push('\n');

    for (i, row) in report.data.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, row.product));
        out.push_str(&format!("   Sold: {} pcs\n", row.sales_count));
        out.push_str(&format!("   Amount: {} RUB\n", format_amount(row.sales_amount, 2)));
        out.push_str(&format!("   Period: {}\n\n", row.period));
    }

    out
}

/// Numbered list of slow queries with average duration and call count
pub fn render_slow_queries(queries: &[SlowQuery]) -> String {
    let items: Vec<String> = queries
        .iter()
        .map(|q| {
            format!(
                "{}: {:.3} s avg, {} calls",
                q.query_name, q.avg_duration, q.call_count
            )
        })
        .collect();

    build_list(&items, true)
}
