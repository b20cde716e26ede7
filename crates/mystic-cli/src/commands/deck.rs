use comfy_table::{ContentArrangement, Table};

use mystic_core::Suit;

pub fn run(suit: Option<&str>) -> Result<(), String> {
    let catalog = super::catalog();

    let cards: Vec<_> = match suit {
        Some(raw) => {
            let suit = Suit::parse(raw).ok_or_else(|| format!("unknown suit: {raw}"))?;
            catalog.by_suit(suit).collect()
        }
        None => catalog.cards().iter().collect(),
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Suit", "Keywords"]);

    for card in &cards {
        table.add_row(vec![
            card.id.to_string(),
            card.name.clone(),
            card.suit.to_string(),
            super::truncate(&card.keywords.join(", "), 40),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} cards", cards.len());

    Ok(())
}
