pub mod formatter;

pub use formatter::{
    format_bar_chart, format_json, format_matrix_table, format_number, format_reasoning_table,
    format_recommendation, format_report, format_top_factor, format_tsv, should_use_colors,
    truncate_text, ReportOptions,
};
