//! Classification of game-event narratives.
//!
//! The table is scanned top to bottom and the first pattern contained in
//! the description wins, so order is significant: `2+2'-Strafe` contains
//! `2'-Strafe` and must come first, `Penaltyschiessen` must precede the bare
//! `Penalty`, and `Spielbeginn`/`Spielende` precede `Beginn`/`Ende`.

use crate::{DisplayMode, EventIcon, EventKind, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: EventKind,
    pub icon: EventIcon,
    pub display: DisplayMode,
}

const fn class(kind: EventKind, icon: EventIcon, display: DisplayMode) -> Classification {
    Classification { kind, icon, display }
}

pub const UNCLASSIFIED: Classification =
    class(EventKind::Other, EventIcon::Info, DisplayMode::Inline);

/// Lower-case pattern → classification, in match order.
pub const EVENT_TABLE: [(&str, Classification); 16] = [
    ("eigentor", class(EventKind::OwnGoal, EventIcon::Goal, DisplayMode::Badge)),
    ("torschütze", class(EventKind::Goal, EventIcon::Goal, DisplayMode::Badge)),
    ("penaltyschiessen", class(EventKind::Shootout, EventIcon::Goal, DisplayMode::Neutral)),
    ("2+2'-strafe", class(EventKind::PenaltyDouble, EventIcon::Penalty, DisplayMode::Inline)),
    ("2'-strafe", class(EventKind::PenaltyMinor, EventIcon::Penalty, DisplayMode::Inline)),
    ("5'-strafe", class(EventKind::PenaltyMajor, EventIcon::Penalty, DisplayMode::Inline)),
    ("10'-strafe", class(EventKind::PenaltyMisconduct, EventIcon::Penalty, DisplayMode::Inline)),
    ("matchstrafe", class(EventKind::PenaltyMatch, EventIcon::Penalty, DisplayMode::Inline)),
    ("penalty", class(EventKind::PenaltyShot, EventIcon::Penalty, DisplayMode::Inline)),
    ("spielbeginn", class(EventKind::GameStart, EventIcon::Whistle, DisplayMode::Neutral)),
    ("spielende", class(EventKind::GameEnd, EventIcon::Whistle, DisplayMode::Neutral)),
    ("verlängerung", class(EventKind::Overtime, EventIcon::Clock, DisplayMode::Neutral)),
    ("beginn", class(EventKind::PeriodStart, EventIcon::Clock, DisplayMode::Neutral)),
    ("ende", class(EventKind::PeriodEnd, EventIcon::Clock, DisplayMode::Neutral)),
    ("timeout", class(EventKind::Timeout, EventIcon::Timeout, DisplayMode::Neutral)),
    ("bester spieler", class(EventKind::BestPlayer, EventIcon::Star, DisplayMode::Badge)),
];

pub fn classify(description: &str) -> Classification {
    let lower = description.to_lowercase();
    EVENT_TABLE
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, c)| *c)
        .unwrap_or(UNCLASSIFIED)
}

/// Exact match of the event's team name against the two team names.
pub fn team_side(team_name: &str, home: &str, away: &str) -> TeamSide {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        TeamSide::Neutral
    } else if team_name == home {
        TeamSide::Home
    } else if team_name == away {
        TeamSide::Away
    } else {
        TeamSide::Neutral
    }
}

/// `"Name (Assist)"` → `("Name", Some("Assist"))`.
pub fn split_player(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_suffix(')')
        && let Some(open) = inner.rfind('(')
    {
        let player = inner[..open].trim().to_owned();
        let assist = inner[open + 1..].trim();
        let assist = (!assist.is_empty()).then(|| assist.to_owned());
        return (player, assist);
    }
    (raw.to_owned(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goals() {
        let c = classify("Torschütze 4:4");
        assert_eq!(c.kind, EventKind::Goal);
        assert_eq!(c.icon, EventIcon::Goal);
        assert_eq!(c.display, DisplayMode::Badge);
        assert_eq!(classify("Eigentor 1:2").kind, EventKind::OwnGoal);
    }

    #[test]
    fn specific_penalty_wins_over_contained_one() {
        assert!("2+2'-Strafe".to_lowercase().contains("2'-strafe"));
        assert_eq!(classify("2+2'-Strafe (Stockschlag)").kind, EventKind::PenaltyDouble);
        assert_eq!(classify("2'-Strafe (Haken)").kind, EventKind::PenaltyMinor);
        assert_eq!(classify("10'-Strafe").kind, EventKind::PenaltyMisconduct);
        assert_eq!(classify("5'-Strafe").kind, EventKind::PenaltyMajor);
        assert_eq!(classify("Matchstrafe").kind, EventKind::PenaltyMatch);
        assert_eq!(classify("Penaltyschiessen").kind, EventKind::Shootout);
        assert_eq!(classify("Penalty verschossen").kind, EventKind::PenaltyShot);
    }

    #[test]
    fn table_order_is_significant() {
        // every pattern that contains an earlier-or-later pattern must sit
        // above it, otherwise the general entry would shadow it
        for (i, (general, _)) in EVENT_TABLE.iter().enumerate() {
            for (j, (specific, _)) in EVENT_TABLE.iter().enumerate() {
                if i != j && specific.contains(general) {
                    assert!(j < i, "{specific:?} must precede {general:?}");
                }
            }
        }
    }

    #[test]
    fn every_entry_classifies_its_own_pattern() {
        for (pattern, expected) in EVENT_TABLE {
            assert_eq!(classify(pattern), expected, "{pattern}");
        }
    }

    #[test]
    fn boundaries() {
        assert_eq!(classify("Spielbeginn").kind, EventKind::GameStart);
        assert_eq!(classify("Spielende").kind, EventKind::GameEnd);
        assert_eq!(classify("Ende 1. Drittel").kind, EventKind::PeriodEnd);
        assert_eq!(classify("Beginn 2. Drittel").kind, EventKind::PeriodStart);
        assert_eq!(classify("Beginn Verlängerung").kind, EventKind::Overtime);
        assert_eq!(classify("Timeout").kind, EventKind::Timeout);
        assert_eq!(classify("Bester Spieler").kind, EventKind::BestPlayer);
    }

    #[test]
    fn unknown_text_is_other() {
        assert_eq!(classify("Videobeweis"), UNCLASSIFIED);
        assert_eq!(classify(""), UNCLASSIFIED);
        assert_eq!(UNCLASSIFIED.kind, EventKind::Other);
        assert_eq!(UNCLASSIFIED.icon, EventIcon::Info);
        assert_eq!(UNCLASSIFIED.display, DisplayMode::Inline);
    }

    #[test]
    fn sides() {
        assert_eq!(team_side("UHC Uster", "UHC Uster", "Zug United"), TeamSide::Home);
        assert_eq!(team_side("Zug United", "UHC Uster", "Zug United"), TeamSide::Away);
        assert_eq!(team_side("", "UHC Uster", "Zug United"), TeamSide::Neutral);
        assert_eq!(team_side("uhc uster", "UHC Uster", "Zug United"), TeamSide::Neutral);
    }

    #[test]
    fn player_and_assist() {
        assert_eq!(
            split_player("Müller M. (Meier K.)"),
            ("Müller M.".to_owned(), Some("Meier K.".to_owned()))
        );
        assert_eq!(split_player("Müller M."), ("Müller M.".to_owned(), None));
        assert_eq!(split_player("Müller M. ()"), ("Müller M.".to_owned(), None));
        assert_eq!(split_player(""), (String::new(), None));
    }
}
