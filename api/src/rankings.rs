//! Ranking table selection.
//!
//! `/rankings` ignores every filter except `season` and answers with all the
//! standings tables it knows, one per tab. Picking the table a caller meant
//! happens here, in stages that only ever narrow the candidate set.

use crate::layout::{map_rows, ranking_row};
use crate::wire::TabularResponse;
use crate::RankingTable;
use log::debug;
use serde::Serialize;

/// Game class upstream uses for women's competitions.
pub const WOMEN_GAME_CLASS: &str = "21";
/// Game class upstream uses for men's competitions.
pub const MEN_GAME_CLASS: &str = "11";

/// German and French markers, matched inside words (`Damenliga`).
/// Checked before [`MEN_MARKERS`].
pub const WOMEN_MARKERS: [&str; 4] = ["damen", "frauen", "juniorinnen", "dames"];
pub const MEN_MARKERS: [&str; 4] = ["herren", "männer", "junioren", "hommes"];
/// English markers, matched as whole words only: `men` sits inside club
/// names such as `Emmental` or `Mendrisiotto`.
pub const WOMEN_WORDS: [&str; 2] = ["women", "womens"];
pub const MEN_WORDS: [&str; 2] = ["men", "mens"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Women,
    Men,
}

impl Gender {
    pub fn detect(text: &str) -> Option<Gender> {
        let lower = text.to_lowercase();
        let has_word = |words: &[&str]| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| words.contains(&token))
        };
        if WOMEN_MARKERS.iter().any(|m| lower.contains(m)) || has_word(&WOMEN_WORDS) {
            Some(Gender::Women)
        } else if MEN_MARKERS.iter().any(|m| lower.contains(m)) || has_word(&MEN_WORDS) {
            Some(Gender::Men)
        } else {
            None
        }
    }

    pub fn game_class(self) -> &'static str {
        match self {
            Gender::Women => WOMEN_GAME_CLASS,
            Gender::Men => MEN_GAME_CLASS,
        }
    }
}

/// What the caller is looking for. Every field is optional; ids are strings
/// as they arrive from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingRequest {
    pub season: Option<String>,
    /// Numeric league id, or a league name resolved among the candidates.
    pub league: Option<String>,
    pub game_class: Option<String>,
    pub group: Option<String>,
    pub league_name: Option<String>,
    pub team_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCandidate {
    pub league_id: String,
    pub game_class: Option<String>,
    pub group: Option<String>,
    pub season: Option<String>,
    pub league_name: String,
    pub full_name: String,
}

impl RankingCandidate {
    /// Query parameters selecting exactly this table.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("league", self.league_id.clone())];
        if let Some(season) = &self.season {
            params.push(("season", season.clone()));
        }
        if let Some(game_class) = &self.game_class {
            params.push(("game_class", game_class.clone()));
        }
        if let Some(group) = &self.group {
            params.push(("group", group.clone()));
        }
        params
    }
}

/// Returned instead of a table when no candidate survives, so callers can
/// offer the alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingDiagnostic {
    pub candidates: Vec<RankingCandidate>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RankingOutcome {
    Table(RankingTable),
    NoMatch(RankingDiagnostic),
}

/// One candidate per tab, in upstream order. Keys missing from a tab's
/// context fall back to the response context. Without tabs the response
/// context itself describes the single candidate.
pub fn candidates(response: &TabularResponse) -> Vec<RankingCandidate> {
    let title = response.title.trim();
    let inherited = |key: &str| response.context_str(key);

    if response.tabs.is_empty() {
        let Some(league_id) = inherited("league") else {
            return Vec::new();
        };
        let full_name = inherited("name").unwrap_or_else(|| title.to_owned());
        return vec![RankingCandidate {
            league_id,
            game_class: inherited("game_class"),
            group: inherited("group"),
            season: inherited("season"),
            league_name: title.to_owned(),
            full_name,
        }];
    }

    response
        .tabs
        .iter()
        .filter_map(|tab| {
            let get = |key: &str| tab.context_str(key).or_else(|| inherited(key));
            let league_id = get("league")?;
            let label = tab.text.trim();
            let league_name = if label.is_empty() { title } else { label };
            let full_name = tab
                .context_str("name")
                .unwrap_or_else(|| format!("{title} {label}").trim().to_owned());
            Some(RankingCandidate {
                league_id,
                game_class: get("game_class"),
                group: get("group"),
                season: get("season"),
                league_name: league_name.to_owned(),
                full_name,
            })
        })
        .collect()
}

fn narrow<'a>(
    survivors: Vec<&'a RankingCandidate>,
    keep: impl Fn(&RankingCandidate) -> bool,
) -> Vec<&'a RankingCandidate> {
    survivors.into_iter().filter(|c| keep(c)).collect()
}

/// Like [`narrow`] but keeps the previous set when nothing would survive.
fn narrow_softly<'a>(
    survivors: Vec<&'a RankingCandidate>,
    keep: impl Fn(&RankingCandidate) -> bool,
) -> Vec<&'a RankingCandidate> {
    let narrowed: Vec<_> = survivors.iter().copied().filter(|c| keep(c)).collect();
    if narrowed.is_empty() { survivors } else { narrowed }
}

fn by_gender<'a>(survivors: Vec<&'a RankingCandidate>, gender: Option<Gender>) -> Vec<&'a RankingCandidate> {
    match gender {
        Some(gender) if survivors.len() > 1 => narrow_softly(survivors, |c| {
            c.game_class.as_deref() == Some(gender.game_class())
        }),
        _ => survivors,
    }
}

fn wanted(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Narrows `all` to the tables matching `request`. The survivors keep
/// upstream order; an empty result means nothing matched.
pub fn disambiguate<'a>(all: &'a [RankingCandidate], request: &RankingRequest) -> Vec<&'a RankingCandidate> {
    let mut survivors: Vec<&RankingCandidate> = all.iter().collect();

    if let Some(league) = wanted(&request.league) {
        let ids: Vec<&str> = if league.chars().all(|c| c.is_ascii_digit()) {
            vec![league]
        } else {
            let league = league.to_lowercase();
            all.iter()
                .filter(|c| c.league_name.trim().to_lowercase() == league)
                .map(|c| c.league_id.as_str())
                .collect()
        };
        survivors = narrow(survivors, |c| ids.contains(&c.league_id.as_str()));
        debug!("rankings: {} candidates after league {league:?}", survivors.len());
    }

    if let Some(game_class) = wanted(&request.game_class) {
        survivors = narrow(survivors, |c| c.game_class.as_deref() == Some(game_class));
    }

    if let Some(name) = wanted(&request.league_name) {
        let query = name.to_lowercase();
        let matches = |candidate: &str| {
            let candidate = candidate.trim().to_lowercase();
            !candidate.is_empty() && (candidate.contains(&query) || query.contains(&candidate))
        };
        survivors = narrow(survivors, |c| matches(&c.league_name) || matches(&c.full_name));
        survivors = by_gender(survivors, Gender::detect(name));
        debug!("rankings: {} candidates after league name {name:?}", survivors.len());
    }

    if let Some(group) = wanted(&request.group) {
        survivors = narrow(survivors, |c| c.group.as_deref().map(str::trim) == Some(group));
    }

    if survivors.len() > 1 {
        let gender = request.team_names.iter().find_map(|name| Gender::detect(name));
        survivors = by_gender(survivors, gender);
    }

    survivors
}

pub fn no_match(all: Vec<RankingCandidate>, request: &RankingRequest) -> RankingDiagnostic {
    let message = if all.is_empty() {
        "upstream listed no ranking tables".to_owned()
    } else {
        format!(
            "no ranking table matches {}; {} candidates available",
            describe(request),
            all.len()
        )
    };
    RankingDiagnostic { candidates: all, message }
}

fn describe(request: &RankingRequest) -> String {
    let parts: Vec<String> = [
        ("league", wanted(&request.league)),
        ("game class", wanted(&request.game_class)),
        ("league name", wanted(&request.league_name)),
        ("group", wanted(&request.group)),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| format!("{label} {v:?}")))
    .collect();
    if parts.is_empty() {
        "the request".to_owned()
    } else {
        parts.join(", ")
    }
}

/// Standings rows of the chosen table.
pub fn ranking_table(response: &TabularResponse, chosen: &RankingCandidate) -> RankingTable {
    let rows = map_rows(response, "ranking", |index, _, row| ranking_row(row, index as u32 + 1));
    RankingTable {
        league_id: chosen.league_id.clone(),
        league_name: chosen.full_name.clone(),
        season: chosen
            .season
            .clone()
            .or_else(|| response.context_str("season"))
            .unwrap_or_default(),
        rows,
    }
}
