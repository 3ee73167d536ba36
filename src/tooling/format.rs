//! Format records, statistics and diagnostics as text.

use crate::codec::RowWarning;
use crate::types::LocatedRecord;
use crate::views::Statistics;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Render a record list as a table, or a one-line notice when empty.
pub fn format_records_text(title: &str, records: &[LocatedRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading(title)));
    if records.is_empty() {
        out.push_str("No records.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Price", "Stock", "Location", "Description"]);
    for item in records {
        table.add_row(vec![
            item.record.id.clone(),
            item.record.name.clone(),
            format!("{:.2}", item.record.price),
            item.record.stock.to_string(),
            item.location.to_string(),
            item.record.description.clone(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} records.\n", records.len()));
    out
}

/// Render a single record as key/value lines.
pub fn format_record_detail(item: &LocatedRecord) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.add_row(vec!["Id".to_string(), item.record.id.clone()]);
    table.add_row(vec!["Name".to_string(), item.record.name.clone()]);
    table.add_row(vec!["Price".to_string(), format!("{:.2}", item.record.price)]);
    table.add_row(vec!["Stock".to_string(), item.record.stock.to_string()]);
    table.add_row(vec!["Description".to_string(), item.record.description.clone()]);
    table.add_row(vec!["Location".to_string(), item.location.to_string()]);
    format!("{}\n", table)
}

pub fn format_statistics_text(stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Statistics")));
    out.push_str(&format!("  Records: {}\n", stats.count));
    if !stats.has_data() {
        out.push_str("  Mean price: n/a\n");
        return out;
    }
    out.push_str(&format!("  Mean price: {:.2}\n", stats.mean_price));
    out.push_str(&format!("  Total stock: {}\n\n", stats.total_stock));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Category", "Records"]);
    for (category, count) in &stats.count_by_level1 {
        table.add_row(vec![category.clone(), count.to_string()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// One line per skipped row, or nothing.
pub fn format_warnings_text(warnings: &[RowWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "\n{} {} malformed row(s) skipped:\n",
        "warning:".yellow(),
        warnings.len()
    );
    for warning in warnings {
        out.push_str(&format!("  {}\n", warning));
    }
    out
}

/// Rows a rewrite could not carry over, or nothing.
pub fn format_dropped_text(dropped: &[RowWarning]) -> String {
    if dropped.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "\n{} rewrite removed {} malformed row(s):\n",
        "warning:".yellow(),
        dropped.len()
    );
    for warning in dropped {
        out.push_str(&format!("  {}\n", warning));
    }
    out
}
