//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use dvvy_core::domain::round_to_cents;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Print any serializable value as pretty JSON
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Amount with currency symbol and two decimals, sign in front: `-₹30.00`
pub fn money(symbol: &str, amount: Decimal) -> String {
    let rounded = round_to_cents(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{:.2}", symbol, rounded.abs())
    } else {
        format!("{}{:.2}", symbol, rounded.abs())
    }
}

/// Right-aligned money cell
pub fn money_cell(symbol: &str, amount: Decimal) -> Cell {
    Cell::new(money(symbol, amount)).set_alignment(CellAlignment::Right)
}

/// Money colored by direction: green when owed money, red when owing
pub fn signed_money(symbol: &str, amount: Decimal) -> String {
    let text = money(symbol, amount);
    if dvvy_core::domain::balance::is_settled(amount) {
        text.dimmed().to_string()
    } else if amount.is_sign_positive() {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}
