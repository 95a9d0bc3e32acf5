//! Game status and score from free text.
//!
//! Upstream marks a running game either with an asterisk after the score
//! (`"2:1*"`) or only with a textual marker in the time/label cell and no
//! score yet. Both are honoured: the numeric rules decide first, the keyword
//! rule can then only upgrade the result to live.

use crate::GameStatus;
use regex::Regex;
use std::sync::LazyLock;

/// Case-insensitive substrings meaning "game in progress".
pub const LIVE_MARKERS: [&str; 3] = ["live", "läuft", "in progress"];

static SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*[:\-]\s*(\d+)\s*(\*)?").expect("score pattern is valid")
});

static PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d)\.\s*(?:drittel|periode|period)").expect("period pattern is valid")
});

static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}:\d{2})\b").expect("clock pattern is valid"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedScore {
    pub status: GameStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

/// Derives status and scores from the score cell text and the time/label
/// cell text.
pub fn parse_score(score_text: &str, label_text: &str) -> ParsedScore {
    let mut parsed = match SCORE.captures(score_text.trim()) {
        Some(caps) => {
            let home = caps[1].parse::<u32>().ok();
            let away = caps[2].parse::<u32>().ok();
            match home.zip(away) {
                Some((h, a)) => ParsedScore {
                    status: if caps.get(3).is_some() {
                        GameStatus::Live
                    } else {
                        GameStatus::Finished
                    },
                    home_score: Some(h),
                    away_score: Some(a),
                },
                None => ParsedScore::default(),
            }
        }
        None => ParsedScore::default(),
    };

    if has_live_marker(label_text) || has_live_marker(score_text) {
        parsed.status = GameStatus::Live;
    }
    parsed
}

pub fn has_live_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    LIVE_MARKERS.iter().any(|m| lower.contains(m))
}

/// `"2. Drittel"` → `Some(2)`.
pub fn parse_period(text: &str) -> Option<u8> {
    PERIOD.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Running clock shown under a live score, e.g. `"34:12"`.
pub fn parse_clock(text: &str) -> Option<String> {
    CLOCK.captures(text).map(|caps| caps[1].to_owned())
}
