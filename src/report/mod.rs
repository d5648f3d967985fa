// Report helpers
//
// Rendering of top-product reports and slow-query listings for the terminal
// (markdown tables, summaries, bar charts) and CSV export.

pub mod chart;
pub mod formatter;

#[cfg(feature = "export")]
pub mod export;

pub use chart::top_products_chart;
pub use formatter::{render_slow_queries, render_top_products, top_products_table};

#[cfg(feature = "export")]
pub use export::{export_to_csv, ExportError};
