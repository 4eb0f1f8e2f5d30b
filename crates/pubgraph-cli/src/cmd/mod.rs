//! CLI subcommands

pub mod fetch;
pub mod summary;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// Two-column table with a cyan `title | Value` header
fn key_value_table(title: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header([title, "Value"].map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = key_value_table(title);
    for (label, value) in rows {
        table.add_row([*label, value.as_str()]);
    }
    eprintln!("\n{table}");
}
