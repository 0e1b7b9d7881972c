//! Output formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints rows as a rounded table, or `empty` if there are none.
pub fn table<T: Tabled>(rows: &[T], empty: &str) {
    if rows.is_empty() {
        info(empty);
    } else {
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
}

/// Prints a value as pretty JSON.
pub fn json<T: serde::Serialize>(value: &T) -> crate::CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
