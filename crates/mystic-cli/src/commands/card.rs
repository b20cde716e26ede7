use colored::Colorize;

pub fn run(name: &str) -> Result<(), String> {
    let catalog = super::catalog();
    let card = catalog.find(name).map_err(|e| e.to_string())?;

    println!("{}", card.name.bold());
    println!("  Id:          {}", card.id);
    println!("  Suit:        {}", card.suit);
    println!("  Rank:        {}", card.rank);
    println!("  Keywords:    {}", card.keywords.join(", "));
    println!("  Description: {}", card.description);
    println!("  Artwork:     {}", card.artwork.primary);
    if let Some(backup) = &card.artwork.backup {
        println!("  Backup:      {backup}");
    }

    Ok(())
}
