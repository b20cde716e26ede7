//! Serializable summary of a finished reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mystic_core::{CardId, Orientation, SpreadPosition};

use crate::session::Session;

/// One card of a recorded reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    /// Spread slot.
    pub position: SpreadPosition,
    /// Catalog id.
    pub card_id: CardId,
    /// Display name.
    pub name: String,
    /// Upright or reversed.
    pub orientation: Orientation,
    /// Card keywords.
    pub keywords: Vec<String>,
}

/// A reading as it can be printed or exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Session id.
    pub id: Uuid,
    /// When the question was submitted.
    pub started_at: DateTime<Utc>,
    /// The seeker's question.
    pub question: String,
    /// Cards in Past, Present, Future order.
    pub cards: Vec<CardEntry>,
    /// The narrative (or fallback text).
    pub interpretation: Option<String>,
}

impl ReadingRecord {
    /// Capture the current contents of a session.
    pub fn from_session(session: &Session) -> Self {
        let cards = session
            .spread
            .in_position_order()
            .into_iter()
            .map(|drawn| CardEntry {
                position: drawn.position(),
                card_id: drawn.card().id.clone(),
                name: drawn.card().name.clone(),
                orientation: drawn.orientation(),
                keywords: drawn.card().keywords.clone(),
            })
            .collect();

        Self {
            id: session.id,
            started_at: session.started_at,
            question: session.question.clone(),
            cards,
            interpretation: session.interpretation.clone(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Markdown document: question, spread table, then the narrative.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Tarot Reading\n\n");
        out.push_str(&format!(
            "*{}*\n\n",
            self.started_at.format("%Y-%m-%d %H:%M UTC")
        ));
        out.push_str(&format!("**Question**: {}\n\n", self.question));

        out.push_str("## The Spread\n\n");
        for card in &self.cards {
            out.push_str(&format!(
                "- **{}**: {} ({})\n",
                card.position, card.name, card.orientation
            ));
        }
        out.push('\n');

        if let Some(text) = &self.interpretation {
            out.push_str("## The Reading\n\n");
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }
}
