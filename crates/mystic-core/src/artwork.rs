//! Per-card artwork resolution.
//!
//! Each card has a primary and a backup locator. Loading starts on the
//! primary; a failure moves to the backup exactly once, and a second
//! failure is terminal. Whatever happens, the card can still be shown
//! through its [`TextFace`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::card::{ArtworkRefs, CardDefinition, Orientation};
use crate::error::ArtworkLoadFailure;

/// Which of the two artwork sources is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageTier {
    /// The preferred source.
    Primary,
    /// The fallback source.
    Backup,
}

impl fmt::Display for ImageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Backup => write!(f, "backup"),
        }
    }
}

/// Load state of one card's artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtworkState {
    /// Waiting on the given tier.
    Loading(ImageTier),
    /// The given tier loaded successfully.
    Loaded(ImageTier),
    /// Every available tier failed; render the text face.
    Failed,
}

/// Two-tier artwork state machine for a single card.
#[derive(Debug, Clone)]
pub struct ArtworkResolver {
    refs: ArtworkRefs,
    state: ArtworkState,
}

impl ArtworkResolver {
    /// Start resolving the given locators on the primary tier.
    pub fn new(refs: ArtworkRefs) -> Self {
        Self {
            refs,
            state: ArtworkState::Loading(ImageTier::Primary),
        }
    }

    /// Start resolving a card's artwork.
    pub fn for_card(card: &CardDefinition) -> Self {
        Self::new(card.artwork.clone())
    }

    /// Current state.
    pub fn state(&self) -> ArtworkState {
        self.state
    }

    /// Whether no further load events will change the state.
    pub fn is_settled(&self) -> bool {
        !matches!(self.state, ArtworkState::Loading(_))
    }

    /// The locator to fetch or display, `None` once failed.
    pub fn current_source(&self) -> Option<&str> {
        match self.state {
            ArtworkState::Loading(tier) | ArtworkState::Loaded(tier) => self.source_for(tier),
            ArtworkState::Failed => None,
        }
    }

    fn source_for(&self, tier: ImageTier) -> Option<&str> {
        match tier {
            ImageTier::Primary => Some(self.refs.primary.as_str()),
            ImageTier::Backup => self.refs.backup.as_deref(),
        }
    }

    /// The pending source finished loading.
    pub fn on_load_success(&mut self) -> ArtworkState {
        if let ArtworkState::Loading(tier) = self.state {
            self.state = ArtworkState::Loaded(tier);
        }
        self.state
    }

    /// The pending source failed to load.
    ///
    /// From the primary tier this moves to the backup if one is defined;
    /// anything else ends in [`ArtworkState::Failed`]. Events arriving
    /// after the state settled are ignored.
    pub fn on_load_failure(&mut self) -> ArtworkState {
        self.state = match self.state {
            ArtworkState::Loading(ImageTier::Primary) if self.refs.backup.is_some() => {
                ArtworkState::Loading(ImageTier::Backup)
            }
            ArtworkState::Loading(_) => ArtworkState::Failed,
            settled => settled,
        };
        self.state
    }
}

/// Something that can fetch an artwork locator.
#[async_trait]
pub trait ArtworkProbe: Send + Sync {
    /// Try to load `source`; `tier` is passed through for diagnostics.
    async fn load(&self, source: &str, tier: ImageTier) -> Result<(), ArtworkLoadFailure>;
}

/// Drive a card's resolver against a probe until it settles.
///
/// Makes at most two load attempts.
pub async fn resolve_artwork<P>(probe: &P, card: &CardDefinition) -> ArtworkResolver
where
    P: ArtworkProbe + ?Sized,
{
    let mut resolver = ArtworkResolver::for_card(card);

    while let ArtworkState::Loading(tier) = resolver.state() {
        let Some(source) = resolver.current_source().map(str::to_owned) else {
            resolver.on_load_failure();
            continue;
        };

        match probe.load(&source, tier).await {
            Ok(()) => {
                resolver.on_load_success();
            }
            Err(failure) => {
                tracing::warn!(card = %card.name, %failure, "artwork source failed");
                resolver.on_load_failure();
            }
        }
    }

    if resolver.state() == ArtworkState::Failed {
        tracing::warn!(card = %card.name, "no artwork available, using text face");
    }
    resolver
}

/// Text rendering of a card: always available, whatever the artwork did.
#[derive(Debug, Clone, Copy)]
pub struct TextFace<'a> {
    card: &'a CardDefinition,
    orientation: Orientation,
}

impl<'a> TextFace<'a> {
    /// Text face of a card in the given orientation.
    pub fn new(card: &'a CardDefinition, orientation: Orientation) -> Self {
        Self { card, orientation }
    }
}

impl fmt::Display for TextFace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let card = self.card;
        if card.is_major() {
            write!(f, "{} (Major Arcana {})", card.name, card.rank)?;
        } else {
            write!(f, "{} ({})", card.name, card.suit)?;
        }
        if self.orientation == Orientation::Reversed {
            write!(f, " [Reversed]")?;
        }
        write!(f, "\n  {}", card.keywords.join(" · "))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::catalog::build_catalog;

    fn refs(backup: bool) -> ArtworkRefs {
        ArtworkRefs {
            primary: "p.jpg".to_string(),
            backup: backup.then(|| "b.png".to_string()),
        }
    }

    #[test]
    fn starts_on_primary() {
        let r = ArtworkResolver::new(refs(true));
        assert_eq!(r.state(), ArtworkState::Loading(ImageTier::Primary));
        assert_eq!(r.current_source(), Some("p.jpg"));
        assert!(!r.is_settled());
    }

    #[test]
    fn primary_success() {
        let mut r = ArtworkResolver::new(refs(true));
        assert_eq!(r.on_load_success(), ArtworkState::Loaded(ImageTier::Primary));
        assert_eq!(r.current_source(), Some("p.jpg"));
        assert!(r.is_settled());
    }

    #[test]
    fn primary_failure_switches_to_backup_once() {
        let mut r = ArtworkResolver::new(refs(true));
        assert_eq!(r.on_load_failure(), ArtworkState::Loading(ImageTier::Backup));
        assert_eq!(r.current_source(), Some("b.png"));
        assert_eq!(r.on_load_success(), ArtworkState::Loaded(ImageTier::Backup));
    }

    #[test]
    fn both_failing_is_terminal() {
        let mut r = ArtworkResolver::new(refs(true));
        r.on_load_failure();
        assert_eq!(r.on_load_failure(), ArtworkState::Failed);
        assert_eq!(r.current_source(), None);
        // No loop back to the primary.
        assert_eq!(r.on_load_failure(), ArtworkState::Failed);
        assert_eq!(r.on_load_success(), ArtworkState::Failed);
    }

    #[test]
    fn no_backup_fails_directly() {
        let mut r = ArtworkResolver::new(refs(false));
        assert_eq!(r.on_load_failure(), ArtworkState::Failed);
    }

    #[test]
    fn late_failure_after_load_is_ignored() {
        let mut r = ArtworkResolver::new(refs(true));
        r.on_load_success();
        assert_eq!(r.on_load_failure(), ArtworkState::Loaded(ImageTier::Primary));
    }

    #[test]
    fn text_face_for_minor() {
        let catalog = build_catalog();
        let card = catalog.get("cups-6").unwrap();
        let face = TextFace::new(card, Orientation::Reversed).to_string();
        assert!(face.starts_with("7 of Cups (Cups) [Reversed]"));
        assert!(face.contains("Cups · 7"));
    }

    #[test]
    fn text_face_for_major() {
        let catalog = build_catalog();
        let card = catalog.get("major-12").unwrap();
        let face = TextFace::new(card, Orientation::Upright).to_string();
        assert!(face.starts_with("The Hanged Man (Major Arcana 12)"));
        assert!(!face.contains("Reversed"));
    }

    /// Probe that fails the listed tiers and records every attempt.
    struct ScriptedProbe {
        failing: Vec<ImageTier>,
        attempts: Mutex<Vec<(String, ImageTier)>>,
    }

    impl ScriptedProbe {
        fn failing(failing: Vec<ImageTier>) -> Self {
            Self {
                failing,
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<(String, ImageTier)> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtworkProbe for ScriptedProbe {
        async fn load(&self, source: &str, tier: ImageTier) -> Result<(), ArtworkLoadFailure> {
            self.attempts.lock().unwrap().push((source.to_string(), tier));
            if self.failing.contains(&tier) {
                Err(ArtworkLoadFailure::new(tier, "404"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn resolve_uses_primary_when_it_loads() {
        let catalog = build_catalog();
        let card = catalog.get("major-0").unwrap();
        let probe = ScriptedProbe::failing(vec![]);
        let r = resolve_artwork(&probe, card).await;
        assert_eq!(r.state(), ArtworkState::Loaded(ImageTier::Primary));
        assert_eq!(probe.attempts().len(), 1);
    }

    #[tokio::test]
    async fn resolve_falls_back_to_backup() {
        let catalog = build_catalog();
        let card = catalog.get("wands-1").unwrap();
        let probe = ScriptedProbe::failing(vec![ImageTier::Primary]);
        let r = resolve_artwork(&probe, card).await;
        assert_eq!(r.state(), ArtworkState::Loaded(ImageTier::Backup));
        assert!(r.current_source().unwrap().ends_with("two-of-wands.png"));

        let attempts = probe.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].1, ImageTier::Primary);
        assert_eq!(attempts[1].1, ImageTier::Backup);
    }

    #[tokio::test]
    async fn resolve_gives_up_after_two_attempts() {
        let catalog = build_catalog();
        let card = catalog.get("swords-9").unwrap();
        let probe = ScriptedProbe::failing(vec![ImageTier::Primary, ImageTier::Backup]);
        let r = resolve_artwork(&probe, card).await;
        assert_eq!(r.state(), ArtworkState::Failed);
        assert_eq!(probe.attempts().len(), 2);

        let face = TextFace::new(card, Orientation::Upright).to_string();
        assert!(face.contains("10 of Swords"));
    }
}
