use std::sync::Arc;

use crate::card::{ArtworkRefs, CardDefinition, CardId, CardRank, Rank, Suit};
use crate::error::{CoreError, CoreResult};

/// Names of the 22 major arcana, indexed 0 (The Fool) to 21 (The World).
pub const MAJOR_ARCANA: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

/// Total number of cards in a full deck.
pub const DECK_SIZE: usize = 78;

/// Base location of the primary artwork set (`ar00.jpg`, `wa01.jpg`, ...).
pub const PRIMARY_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/ekelen/tarot-api/static/cards/";

/// Base location of the backup artwork set (`two-of-wands.png`, ...).
pub const BACKUP_BASE_URL: &str = "https://www.trustedtarot.com/img/cards/";

const NUMERAL_WORDS: [(&str, &str); 9] = [
    ("2", "two"),
    ("3", "three"),
    ("4", "four"),
    ("5", "five"),
    ("6", "six"),
    ("7", "seven"),
    ("8", "eight"),
    ("9", "nine"),
    ("10", "ten"),
];

/// Where the two artwork tiers live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkSources {
    /// Prefix of every primary locator.
    pub primary_base: String,
    /// Prefix of every backup locator.
    pub backup_base: String,
}

impl Default for ArtworkSources {
    fn default() -> Self {
        Self {
            primary_base: PRIMARY_BASE_URL.to_string(),
            backup_base: BACKUP_BASE_URL.to_string(),
        }
    }
}

impl ArtworkSources {
    /// Use custom base locations for both tiers.
    pub fn new(primary_base: impl Into<String>, backup_base: impl Into<String>) -> Self {
        Self {
            primary_base: primary_base.into(),
            backup_base: backup_base.into(),
        }
    }

    /// Primary locator of a major card: `ar` + two-digit index.
    pub fn primary_major(&self, index: u8) -> String {
        format!("{}ar{index:02}.jpg", self.primary_base)
    }

    /// Primary locator of a minor card: suit code + two-digit rank number.
    pub fn primary_minor(&self, suit: Suit, rank: Rank) -> String {
        let code = suit.artwork_code().unwrap_or("wa");
        format!("{}{code}{:02}.jpg", self.primary_base, rank.number())
    }

    /// Backup locator derived from the display name.
    pub fn backup(&self, name: &str) -> String {
        format!("{}{}.png", self.backup_base, backup_slug(name))
    }
}

/// Slug used by the backup artwork set.
///
/// Lower-cases the name, spells out a leading numeral 2-10 that is
/// followed by a space, then turns every whitespace run into one hyphen:
/// "2 of Wands" becomes "two-of-wands".
pub fn backup_slug(name: &str) -> String {
    let mut lower = name.to_lowercase();

    for (digit, word) in NUMERAL_WORDS {
        if lower.starts_with(digit) && lower[digit.len()..].starts_with(' ') {
            lower.replace_range(..digit.len(), word);
            break;
        }
    }

    let mut slug = String::with_capacity(lower.len());
    let mut in_whitespace = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}

/// The full, immutable deck of card definitions.
///
/// Cards are shared through `Arc` so that drawn cards can reference their
/// definition without copying it.
#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<Arc<CardDefinition>>,
}

impl Catalog {
    /// Build the catalog with the given artwork sources.
    ///
    /// Order: the 22 major arcana, then Wands, Cups, Swords, Pentacles,
    /// each Ace through King.
    pub fn with_sources(sources: &ArtworkSources) -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);

        for (index, name) in MAJOR_ARCANA.iter().enumerate() {
            let index = index as u8;
            cards.push(Arc::new(CardDefinition {
                id: CardId::new(format!("major-{index}")),
                name: (*name).to_string(),
                rank: CardRank::Major(index),
                suit: Suit::Major,
                keywords: vec!["Destiny".to_string(), "Archetype".to_string()],
                description: format!("The {name} represents a significant soul lesson."),
                artwork: ArtworkRefs {
                    primary: sources.primary_major(index),
                    backup: Some(sources.backup(name)),
                },
            }));
        }

        for suit in Suit::MINOR {
            let suit_key = suit.to_string().to_lowercase();
            for (index, rank) in Rank::ALL.iter().enumerate() {
                let name = format!("{rank} of {suit}");
                cards.push(Arc::new(CardDefinition {
                    id: CardId::new(format!("{suit_key}-{index}")),
                    rank: CardRank::Minor(*rank),
                    suit,
                    keywords: vec![suit.to_string(), rank.label().to_string()],
                    description: format!("The {rank} of {suit}."),
                    artwork: ArtworkRefs {
                        primary: sources.primary_minor(suit, *rank),
                        backup: Some(sources.backup(&name)),
                    },
                    name,
                }));
            }
        }

        Self { cards }
    }

    /// All cards in catalog order.
    pub fn cards(&self) -> &[Arc<CardDefinition>] {
        &self.cards
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look up a card by id.
    pub fn get(&self, id: &str) -> Option<&Arc<CardDefinition>> {
        self.cards.iter().find(|c| c.id.as_str() == id)
    }

    /// Look up a card by display name (case-insensitive) or id.
    pub fn find(&self, query: &str) -> CoreResult<&Arc<CardDefinition>> {
        let needle = query.trim();
        self.cards
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(needle) || c.id.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownCard(needle.to_string()))
    }

    /// Cards of one suit, in catalog order.
    pub fn by_suit(&self, suit: Suit) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.iter().filter(move |c| c.suit == suit)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        build_catalog()
    }
}

/// Build the standard catalog with the default artwork sources.
pub fn build_catalog() -> Catalog {
    Catalog::with_sources(&ArtworkSources::default())
}
