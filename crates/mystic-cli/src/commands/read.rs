use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::task::JoinHandle;

use mystic_core::{ArtworkState, DrawnCard, ImageTier, Orientation, TextFace, resolve_artwork};
use mystic_remote::{ChatCompletionsNarrator, HttpArtworkProbe, NarratorConfig, OfflineNarrator};
use mystic_session::{
    NarrativeService, RevealTiming, SessionConfig, SessionDriver, SessionEvent, SessionObserver,
    SessionState,
};

pub struct ReadOptions {
    pub question: Option<String>,
    pub seed: Option<u64>,
    pub offline: bool,
    pub fast: bool,
    pub auto: bool,
    pub json: bool,
    pub export: Option<PathBuf>,
    pub probe_artwork: bool,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

pub fn run(opts: ReadOptions) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    runtime.block_on(reading(opts))
}

/// Shown in turn while the narrative is on its way.
const LOADING_MESSAGES: [&str; 6] = [
    "Consulting the stars...",
    "Stirring the ether...",
    "Drawing from the Well of Fate...",
    "Listening to ancient whispers...",
    "Deciphering the cosmic code...",
    "Aligning the constellations...",
];

const LOADING_INTERVAL: Duration = Duration::from_secs(3);

fn loading_message(tick: usize) -> &'static str {
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()]
}

/// Prints the session as it unfolds. Silent in JSON mode.
struct TerminalObserver {
    quiet: bool,
    service: String,
    ticker: Option<JoinHandle<()>>,
}

impl TerminalObserver {
    fn say(&self, line: impl std::fmt::Display) {
        if !self.quiet {
            println!("{line}");
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for TerminalObserver {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

impl SessionObserver for TerminalObserver {
    fn state_changed(&mut self, _from: SessionState, to: SessionState) {
        match to {
            SessionState::Shuffling => self.say(format!("  {}", "Shuffling the deck...".dimmed())),
            SessionState::Drawing => self.say(format!("  {}\n", "The deck is ready.".dimmed())),
            SessionState::Revealing => {
                self.say(format!("\n  {}", "The cards turn...".dimmed()));
            }
            SessionState::Intro | SessionState::Reading => {}
        }
    }

    fn card_drawn(&mut self, _index: usize, card: &DrawnCard) {
        self.say(format!(
            "  {} a card is placed face down.",
            format!("{}:", card.position()).bold()
        ));
    }

    fn card_revealed(&mut self, _index: usize, card: &DrawnCard) {
        let face = TextFace::new(card.card(), card.orientation()).to_string();
        let face = match card.orientation() {
            Orientation::Upright => face.cyan(),
            Orientation::Reversed => face.magenta(),
        };
        self.say(format!("  {} {face}", format!("{}:", card.position()).bold()));
    }

    fn interpreting(&mut self) {
        if self.quiet {
            return;
        }
        self.say(format!("\n  {} ({})", loading_message(0).dimmed(), self.service));

        self.stop_ticker();
        self.ticker = Some(tokio::spawn(async {
            let mut interval = tokio::time::interval(LOADING_INTERVAL);
            interval.tick().await;
            let mut tick = 0;
            loop {
                interval.tick().await;
                tick += 1;
                println!("  {}", loading_message(tick).dimmed());
            }
        }));
    }

    fn interpretation_ready(&mut self, text: &str) {
        self.stop_ticker();
        self.say(format!("\n{}\n\n{}\n", "The Reading".bold().underline(), text.trim_end()));
    }
}

fn narrator(opts: &ReadOptions) -> Result<(Arc<dyn NarrativeService>, NarratorConfig), String> {
    // Offline readings never look at the narrator environment.
    if opts.offline {
        return Ok((Arc::new(OfflineNarrator::new()), NarratorConfig::default()));
    }

    let mut config = NarratorConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(base) = &opts.api_base {
        config = config.with_api_base(base.clone());
    }
    if let Some(model) = &opts.model {
        config = config.with_model(model.clone());
    }

    if !config.has_api_key() {
        tracing::warn!("no API key configured, using the offline narrator");
        return Ok((Arc::new(OfflineNarrator::new()), config));
    }

    let remote = ChatCompletionsNarrator::new(&config).map_err(|e| e.to_string())?;
    Ok((Arc::new(remote), config))
}

async fn prompt_line(
    reader: &mut BufReader<Stdin>,
    prompt: &str,
    show: bool,
) -> Result<Option<String>, String> {
    if show {
        print!("{prompt}");
        std::io::stdout().flush().map_err(|e| e.to_string())?;
    }
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|e| e.to_string())?;
    Ok((read > 0).then(|| line.trim().to_string()))
}

async fn reading(opts: ReadOptions) -> Result<(), String> {
    let (service, narrator_config) = narrator(&opts)?;
    let show = !opts.json;

    let mut config = SessionConfig::default();
    if let Some(seed) = opts.seed {
        config = config.with_seed(seed);
    }
    if opts.fast {
        config = config.with_timing(RevealTiming::instant());
    }
    if let Some(timeout) = narrator_config.timeout {
        config = config.with_timeout(timeout);
    }

    let observer = TerminalObserver {
        quiet: opts.json,
        service: service.name().to_string(),
        ticker: None,
    };
    let mut driver = SessionDriver::new(mystic_core::build_catalog(), &config, service, observer);
    let mut stdin = BufReader::new(tokio::io::stdin());

    if show {
        println!("  {}", "Mystic Oracle".bold());
        println!("  Past · Present · Future\n");
    }

    // Only a fully interactive reading offers another round.
    let offer_again = opts.question.is_none() && !opts.auto && !opts.json;
    loop {
        one_reading(&mut driver, &mut stdin, &opts).await?;

        if !offer_again {
            return Ok(());
        }
        let again = prompt_line(&mut stdin, "\n  Ask another question? [y/N] ", show).await?;
        let again = again
            .is_some_and(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"));
        if !again {
            return Ok(());
        }
        driver
            .dispatch(SessionEvent::Reset)
            .await
            .map_err(|e| e.to_string())?;
        println!();
    }
}

async fn one_reading(
    driver: &mut SessionDriver<TerminalObserver>,
    stdin: &mut BufReader<Stdin>,
    opts: &ReadOptions,
) -> Result<(), String> {
    let show = !opts.json;

    let question = match &opts.question {
        Some(q) => q.clone(),
        None => prompt_line(stdin, "  Your question: ", show)
            .await?
            .ok_or("no question given")?,
    };
    driver
        .dispatch(SessionEvent::SubmitQuestion(question))
        .await
        .map_err(|e| e.to_string())?;

    let mut interactive = !opts.auto;
    while driver.state() == SessionState::Drawing {
        if interactive {
            let position = driver
                .machine()
                .session()
                .and_then(|s| s.spread().next_position())
                .map(|p| p.to_string())
                .unwrap_or_default();
            let prompt = format!("  Press Enter to draw the {position} card ");
            // Out of input: draw the rest without asking.
            if prompt_line(stdin, &prompt, show).await?.is_none() {
                interactive = false;
            }
        }
        driver
            .dispatch(SessionEvent::Draw)
            .await
            .map_err(|e| e.to_string())?;
    }

    let record = driver
        .record()
        .ok_or("the reading did not complete")?;

    if opts.probe_artwork {
        probe_artwork(driver, show).await?;
    }

    if opts.json {
        let json = record.to_json().map_err(|e| e.to_string())?;
        println!("{json}");
    }

    if let Some(path) = &opts.export {
        std::fs::write(path, record.to_markdown())
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        if show {
            println!("  Reading saved to {}", path.display());
        }
    }

    Ok(())
}

async fn probe_artwork<O: SessionObserver>(
    driver: &SessionDriver<O>,
    show: bool,
) -> Result<(), String> {
    let Some(session) = driver.machine().session() else {
        return Ok(());
    };
    let probe = HttpArtworkProbe::new().map_err(|e| e.to_string())?;

    if show {
        println!("{}", "Artwork".bold().underline());
    }
    for drawn in session.spread().in_position_order() {
        let resolver = resolve_artwork(&probe, drawn.card()).await;
        let status = match resolver.state() {
            ArtworkState::Loaded(ImageTier::Primary) => "primary image".green(),
            ArtworkState::Loaded(ImageTier::Backup) => "backup image".yellow(),
            _ => "text face".red(),
        };
        if show {
            println!("  {}: {} ({status})", drawn.position(), drawn.card().name);
        }
    }
    if show {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_messages_rotate_in_order() {
        assert_eq!(loading_message(0), "Consulting the stars...");
        assert_eq!(loading_message(1), "Stirring the ether...");
        assert_eq!(loading_message(5), "Aligning the constellations...");
        assert_eq!(loading_message(6), loading_message(0));
    }

    #[tokio::test]
    async fn ticker_stops_when_the_reading_arrives() {
        let mut observer = TerminalObserver {
            quiet: false,
            service: "offline".into(),
            ticker: None,
        };
        observer.interpreting();
        assert!(observer.ticker.is_some());

        observer.interpretation_ready("text");
        assert!(observer.ticker.is_none());
    }

    #[test]
    fn quiet_observer_starts_no_ticker() {
        let mut observer = TerminalObserver {
            quiet: true,
            service: "offline".into(),
            ticker: None,
        };
        observer.interpreting();
        assert!(observer.ticker.is_none());
    }
}
