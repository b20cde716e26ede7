use async_trait::async_trait;

use mystic_core::{Orientation, SpreadPosition};
use mystic_session::{CardSummary, NarrativeError, NarrativeRequest, NarrativeService};

/// Composes a reading locally from card names, orientation and keywords.
///
/// Output depends only on the request, so the same spread always reads
/// the same way.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNarrator;

impl OfflineNarrator {
    /// A new offline narrator.
    pub fn new() -> Self {
        Self
    }
}

fn position_phrase(position: SpreadPosition) -> &'static str {
    match position {
        SpreadPosition::Past => "过去的回响",
        SpreadPosition::Present => "此刻的微光",
        SpreadPosition::Future => "未来的潮汐",
    }
}

fn orientation_phrase(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Upright => "正位，力量顺畅流动",
        Orientation::Reversed => "逆位，力量受阻，需向内探寻",
    }
}

fn card_paragraph(card: &CardSummary) -> String {
    format!(
        "**{}** · {} ({})：{}。关键词：{}。",
        card.position,
        card.name,
        card.orientation,
        orientation_phrase(card.orientation),
        card.keywords.join("、")
    )
}

#[async_trait]
impl NarrativeService for OfflineNarrator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        if request.cards.is_empty() {
            return Err(NarrativeError::Empty);
        }

        let mut out = String::new();
        out.push_str("### 虚空的低语\n\n");
        out.push_str(&format!(
            "求问者带着「{}」来到星辰之前，三张牌已揭开面纱。\n\n",
            request.question
        ));

        out.push_str("### 牌面启示\n\n");
        for card in &request.cards {
            out.push_str(&format!("- {}\n", card_paragraph(card)));
        }
        out.push('\n');

        let reversed = request
            .cards
            .iter()
            .filter(|c| c.orientation == Orientation::Reversed)
            .count();
        out.push_str("### 综合指引\n\n");
        let synthesis = match reversed {
            0 => "三张牌皆为正位，道路清晰，顺势而行。",
            1 => "一张逆位的牌投下暗影，提醒你留意被忽略的羁绊。",
            2 => "两张逆位的牌交织成迷雾，答案需要耐心等待。",
            _ => "三张牌皆为逆位，此刻宜静观其变，向内寻找力量。",
        };
        out.push_str(synthesis);
        out.push_str("\n\n");

        out.push_str("### 命运的箴言\n\n");
        if let Some(future) = request
            .cards
            .iter()
            .find(|c| c.position == SpreadPosition::Future)
        {
            out.push_str(&format!(
                "{}指向 {}，让它成为你前行的灯塔。\n",
                position_phrase(future.position),
                future.name
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use mystic_session::PERSONA;

    use super::*;

    fn card(position: SpreadPosition, name: &str, orientation: Orientation) -> CardSummary {
        CardSummary {
            position,
            name: name.into(),
            orientation,
            keywords: vec!["Destiny".into(), "Archetype".into()],
        }
    }

    fn request(reversed_future: bool) -> NarrativeRequest {
        NarrativeRequest {
            persona: PERSONA.into(),
            question: "Will I find clarity?".into(),
            cards: vec![
                card(SpreadPosition::Past, "The Star", Orientation::Upright),
                card(SpreadPosition::Present, "The Moon", Orientation::Reversed),
                card(
                    SpreadPosition::Future,
                    "The Sun",
                    Orientation::from_reversed(reversed_future),
                ),
            ],
        }
    }

    #[tokio::test]
    async fn covers_every_card_and_section() {
        let text = OfflineNarrator::new().generate(&request(false)).await.unwrap();
        for needle in [
            "### 虚空的低语",
            "### 牌面启示",
            "### 综合指引",
            "### 命运的箴言",
            "Will I find clarity?",
            "**Past** · The Star (Upright)",
            "**Present** · The Moon (Reversed)",
            "**Future** · The Sun (Upright)",
            "Destiny、Archetype",
        ] {
            assert!(text.contains(needle), "missing {needle:?}");
        }
        assert!(text.contains("一张逆位"));
    }

    #[tokio::test]
    async fn deterministic_for_the_same_request() {
        let n = OfflineNarrator::new();
        let a = n.generate(&request(true)).await.unwrap();
        let b = n.generate(&request(true)).await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("两张逆位"));
    }

    #[tokio::test]
    async fn empty_spread_is_an_error() {
        let mut req = request(false);
        req.cards.clear();
        assert_eq!(
            OfflineNarrator::new().generate(&req).await,
            Err(NarrativeError::Empty)
        );
    }
}
