pub mod client;
pub mod events;
pub mod extract;
pub mod layout;
pub mod normalize;
pub mod pagination;
pub mod rankings;
pub mod resolver;
pub mod status;
pub mod wire;

pub use client::{ApiConfig, ApiError, ApiResult, UnihockeyApi};
pub use normalize::{GamesQuery, Normalizer};
pub use rankings::{RankingCandidate, RankingDiagnostic, RankingOutcome, RankingRequest};
pub use resolver::{LeagueResolver, NoLeagueResolver, ResolvedLeague};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Domain types, independent of the upstream tabular format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    /// Upstream team id, or a synthetic id derived from the name.
    pub id: String,
    pub name: String,
    pub short_name_derived: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeagueRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Upcoming,
    Live,
    Finished,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: String,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: GameStatus,
    /// `HH:MM` as shown upstream; empty when upstream shows none.
    pub start_time: String,
    /// ISO `YYYY-MM-DD`; empty when no date could be recovered.
    pub game_date: String,
    pub league: LeagueRef,
    pub location: Option<String>,
    pub period: Option<u8>,
    pub live_clock: Option<String>,
}

impl GameSummary {
    pub fn is_live(&self) -> bool {
        self.status == GameStatus::Live
    }

    pub fn score(&self) -> Option<(u32, u32)> {
        self.home_score.zip(self.away_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    #[serde(flatten)]
    pub summary: GameSummary,
    pub venue: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub referees: Vec<String>,
    pub spectators: Option<u32>,
    pub resolved_league: Option<ResolvedLeague>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Goal,
    OwnGoal,
    Shootout,
    PenaltyDouble,
    PenaltyMinor,
    PenaltyMajor,
    PenaltyMisconduct,
    PenaltyMatch,
    PenaltyShot,
    GameStart,
    GameEnd,
    Overtime,
    PeriodStart,
    PeriodEnd,
    Timeout,
    BestPlayer,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventIcon {
    Goal,
    Penalty,
    Whistle,
    Clock,
    Timeout,
    Star,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Inline,
    Badge,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: String,
    pub game_id: String,
    pub time: String,
    pub description: String,
    pub team_side: TeamSide,
    pub player: String,
    pub assist: Option<String>,
    pub event_type: EventKind,
    pub icon: EventIcon,
    pub display_mode: DisplayMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub position: u32,
    pub team_id: String,
    pub team_name: String,
    pub team_logo: Option<String>,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub overtime_wins: Option<u32>,
    pub overtime_losses: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingTable {
    pub league_id: String,
    pub league_name: String,
    pub season: String,
    pub rows: Vec<RankingRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfile {
    pub id: String,
    pub name: String,
    pub short_name_derived: String,
    pub logo: Option<String>,
    pub league: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatLine {
    pub games: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub penalty_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub id: String,
    pub number: Option<String>,
    pub name: String,
    pub position: Option<String>,
    pub birth_year: Option<u16>,
    pub stats: Option<PlayerStatLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub club: Option<String>,
    pub number: Option<String>,
    pub position: Option<String>,
    pub birth_year: Option<u16>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub portrait: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeasonStats {
    pub season: String,
    pub league: String,
    pub team: String,
    pub games: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub penalty_minutes: u32,
}
