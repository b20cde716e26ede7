use std::fmt;

use serde::{Deserialize, Serialize};

/// Card suit. The major arcana are modelled as their own suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// Fire; will and action.
    Wands,
    /// Water; feeling and relationship.
    Cups,
    /// Air; thought and conflict.
    Swords,
    /// Earth; work and material things.
    Pentacles,
    /// The 22 trump cards.
    Major,
}

impl Suit {
    /// The four minor suits in catalog order.
    pub const MINOR: [Suit; 4] = [Suit::Wands, Suit::Cups, Suit::Swords, Suit::Pentacles];

    /// Two-letter code used by the primary artwork source (`None` for Major).
    pub fn artwork_code(self) -> Option<&'static str> {
        match self {
            Self::Wands => Some("wa"),
            Self::Cups => Some("cu"),
            Self::Swords => Some("sw"),
            Self::Pentacles => Some("pe"),
            Self::Major => None,
        }
    }

    /// Parse a suit name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wands" => Some(Self::Wands),
            "cups" => Some(Self::Cups),
            "swords" => Some(Self::Swords),
            "pentacles" => Some(Self::Pentacles),
            "major" | "major arcana" | "arcana" => Some(Self::Major),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wands => write!(f, "Wands"),
            Self::Cups => write!(f, "Cups"),
            Self::Swords => write!(f, "Swords"),
            Self::Pentacles => write!(f, "Pentacles"),
            Self::Major => write!(f, "Major"),
        }
    }
}

/// Rank of a minor arcana card, Ace through King.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// Ace (1).
    Ace,
    /// Two.
    Two,
    /// Three.
    Three,
    /// Four.
    Four,
    /// Five.
    Five,
    /// Six.
    Six,
    /// Seven.
    Seven,
    /// Eight.
    Eight,
    /// Nine.
    Nine,
    /// Ten.
    Ten,
    /// Page (11).
    Page,
    /// Knight (12).
    Knight,
    /// Queen (13).
    Queen,
    /// King (14).
    King,
}

impl Rank {
    /// All fourteen ranks in catalog order.
    pub const ALL: [Rank; 14] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Page,
        Rank::Knight,
        Rank::Queen,
        Rank::King,
    ];

    /// 1-based rank number (Ace = 1, King = 14).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Label as it appears in the card name ("Ace", "7", "Queen").
    pub fn label(self) -> &'static str {
        match self {
            Self::Ace => "Ace",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Page => "Page",
            Self::Knight => "Knight",
            Self::Queen => "Queen",
            Self::King => "King",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal of a major card or rank of a minor card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRank {
    /// Major arcana index, 0 (The Fool) to 21 (The World).
    Major(u8),
    /// Minor arcana rank.
    Minor(Rank),
}

impl fmt::Display for CardRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major(n) => write!(f, "{n}"),
            Self::Minor(rank) => write!(f, "{rank}"),
        }
    }
}

/// Stable identifier of a card definition (`major-12`, `cups-6`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two artwork locators of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRefs {
    /// Preferred, high-resolution source.
    pub primary: String,
    /// Secondary source tried once when the primary fails.
    pub backup: Option<String>,
}

/// An immutable card of the deck, built once by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier.
    pub id: CardId,
    /// Display name, e.g. "The Hanged Man" or "7 of Cups".
    pub name: String,
    /// Index (major) or rank (minor).
    pub rank: CardRank,
    /// Suit, `Major` for trumps.
    pub suit: Suit,
    /// Short tags, never empty.
    pub keywords: Vec<String>,
    /// Short prose used when nothing richer is available.
    pub description: String,
    /// Primary and backup artwork locators.
    pub artwork: ArtworkRefs,
}

impl CardDefinition {
    /// Whether this is a major arcana card.
    pub fn is_major(&self) -> bool {
        self.suit == Suit::Major
    }
}

/// Slot of the three-card spread. Fixed by draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpreadPosition {
    /// First card drawn.
    Past,
    /// Second card drawn.
    Present,
    /// Third card drawn.
    Future,
}

impl SpreadPosition {
    /// Positions in draw order.
    pub const ALL: [SpreadPosition; 3] = [
        SpreadPosition::Past,
        SpreadPosition::Present,
        SpreadPosition::Future,
    ];

    /// Position for the n-th draw (0-based), if within the spread.
    pub fn for_draw(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for SpreadPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Past => write!(f, "Past"),
            Self::Present => write!(f, "Present"),
            Self::Future => write!(f, "Future"),
        }
    }
}

/// Whether a drawn card landed upright or reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Normal reading.
    Upright,
    /// Inverted reading.
    Reversed,
}

impl Orientation {
    /// Orientation from a reversal flag.
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            Self::Reversed
        } else {
            Self::Upright
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upright => write!(f, "Upright"),
            Self::Reversed => write!(f, "Reversed"),
        }
    }
}
