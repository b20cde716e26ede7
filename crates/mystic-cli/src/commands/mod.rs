pub mod card;
pub mod deck;
pub mod read;

use mystic_core::{Catalog, build_catalog};

/// The catalog every command works from.
fn catalog() -> Catalog {
    build_catalog()
}

/// Shorten text for a table cell.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
