//! Row layout resolution.
//!
//! Upstream never says which cell arrangement a row uses, so each endpoint's
//! variants are told apart structurally (cell count, where images sit) and
//! selected once into a named-field struct. Mapping code after that point
//! never indexes cells by number again. A new upstream arrangement is a new
//! enum case with its own discriminator branch.

use crate::events::{classify, split_player, team_side};
use crate::extract::{
    coordinates, goal_pair, has_image, image_url, int, int_or_zero, joined, line, link_id,
    names_list, optional_text, parse_date, parse_int, parse_time, required_text, short_name,
    signed_int, synthetic_id, team_id, text,
};
use crate::status::{parse_clock, parse_period, parse_score};
use crate::wire::{Cell, Row, TabularResponse};
use crate::{
    GameEvent, GameStatus, GameSummary, GeoPoint, LeagueRef, PlayerProfile, PlayerSeasonStats,
    PlayerStatLine, RankingRow, RosterPlayer, TeamProfile, TeamRef,
};
use chrono::NaiveDate;
use log::warn;

/// Rows shorter than this never describe a game in any listing layout.
pub const MIN_LISTING_CELLS: usize = 5;
const MIN_LIST_LAYOUT_CELLS: usize = 8;

/// Maps every row of every region with `map`, logging and skipping the rows
/// it rejects. Sibling rows are never affected by a bad row.
pub fn map_rows<T>(
    response: &TabularResponse,
    what: &str,
    mut map: impl FnMut(usize, &str, &Row) -> Option<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    for (index, (label, row)) in response.rows().enumerate() {
        match map(index, label, row) {
            Some(record) => out.push(record),
            None => warn!(
                "skipping {what} row {index} ({} cells, id {:?}) in region {label:?}",
                row.cells.len(),
                row.id
            ),
        }
    }
    out
}

/// Facts about a listing that are not carried by its rows.
#[derive(Debug, Clone)]
pub struct ListingContext {
    /// Date rows without a date of their own belong to; also the anchor for
    /// relative words like "heute".
    pub reference_date: NaiveDate,
    /// League id from the response context, if upstream sent one.
    pub league_id: Option<String>,
}

impl ListingContext {
    pub fn new(reference_date: NaiveDate, response: &TabularResponse) -> Self {
        Self { reference_date, league_id: response.context_str("league") }
    }

    fn league(&self, label: &str) -> LeagueRef {
        LeagueRef {
            id: self.league_id.clone().unwrap_or_else(|| synthetic_id(label)),
            name: label.trim().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Game rows: listing (current / list), team schedule, head-to-head
// ---------------------------------------------------------------------------

/// The cells of one game row, whatever layout they came from.
#[derive(Debug, Clone, Copy, Default)]
struct GameCells<'a> {
    /// Date, time or both (`text[0]`/`text[1]`).
    when: Option<&'a Cell>,
    location: Option<&'a Cell>,
    league: Option<&'a Cell>,
    home: Option<&'a Cell>,
    home_logo: Option<&'a Cell>,
    away: Option<&'a Cell>,
    away_logo: Option<&'a Cell>,
    score: Option<&'a Cell>,
}

/// `GET /games?mode=list` and `mode=current` rows.
#[derive(Debug, Clone, Copy)]
pub enum ListingLayout<'a> {
    /// `[datetime, location, home, homeLogo, sep, awayLogo, away, score, …]`
    List(ListCells<'a>),
    /// `[time, home, sep, away, score]`
    Current(CurrentCells<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct ListCells<'a> {
    pub datetime: &'a Cell,
    pub location: &'a Cell,
    pub home: &'a Cell,
    pub home_logo: &'a Cell,
    pub away_logo: &'a Cell,
    pub away: &'a Cell,
    pub score: &'a Cell,
}

#[derive(Debug, Clone, Copy)]
pub struct CurrentCells<'a> {
    pub time: &'a Cell,
    pub home: &'a Cell,
    pub away: &'a Cell,
    pub score: &'a Cell,
}

impl<'a> ListingLayout<'a> {
    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        if c.len() < MIN_LISTING_CELLS {
            return None;
        }
        if c.len() >= MIN_LIST_LAYOUT_CELLS && has_image(c.get(3)) {
            return Some(ListingLayout::List(ListCells {
                datetime: &c[0],
                location: &c[1],
                home: &c[2],
                home_logo: &c[3],
                away_logo: &c[5],
                away: &c[6],
                score: &c[7],
            }));
        }
        Some(ListingLayout::Current(CurrentCells {
            time: &c[0],
            home: &c[1],
            away: &c[3],
            score: &c[4],
        }))
    }

    fn cells(&self) -> GameCells<'a> {
        match *self {
            ListingLayout::List(l) => GameCells {
                when: Some(l.datetime),
                location: Some(l.location),
                home: Some(l.home),
                home_logo: Some(l.home_logo),
                away: Some(l.away),
                away_logo: Some(l.away_logo),
                score: Some(l.score),
                ..Default::default()
            },
            ListingLayout::Current(c) => GameCells {
                when: Some(c.time),
                home: Some(c.home),
                away: Some(c.away),
                score: Some(c.score),
                ..Default::default()
            },
        }
    }
}

/// `GET /games?mode=team` rows: `[datetime, location, league, home, away,
/// score]`, the game id sits on the row link.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleLayout<'a> {
    pub datetime: &'a Cell,
    pub location: &'a Cell,
    pub league: &'a Cell,
    pub home: &'a Cell,
    pub away: &'a Cell,
    pub score: &'a Cell,
}

impl<'a> ScheduleLayout<'a> {
    pub const MIN_CELLS: usize = 6;

    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        (c.len() >= Self::MIN_CELLS).then(|| ScheduleLayout {
            datetime: &c[0],
            location: &c[1],
            league: &c[2],
            home: &c[3],
            away: &c[4],
            score: &c[5],
        })
    }

    fn cells(&self) -> GameCells<'a> {
        GameCells {
            when: Some(self.datetime),
            location: Some(self.location),
            league: Some(self.league),
            home: Some(self.home),
            away: Some(self.away),
            score: Some(self.score),
            ..Default::default()
        }
    }
}

/// `GET /games?mode=direct` rows: `[datetime, location, home, away, score]`.
#[derive(Debug, Clone, Copy)]
pub struct HeadToHeadLayout<'a> {
    pub datetime: &'a Cell,
    pub location: &'a Cell,
    pub home: &'a Cell,
    pub away: &'a Cell,
    pub score: &'a Cell,
}

impl<'a> HeadToHeadLayout<'a> {
    pub const MIN_CELLS: usize = 5;

    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        (c.len() >= Self::MIN_CELLS).then(|| HeadToHeadLayout {
            datetime: &c[0],
            location: &c[1],
            home: &c[2],
            away: &c[3],
            score: &c[4],
        })
    }

    fn cells(&self) -> GameCells<'a> {
        GameCells {
            when: Some(self.datetime),
            location: Some(self.location),
            home: Some(self.home),
            away: Some(self.away),
            score: Some(self.score),
            ..Default::default()
        }
    }
}

pub fn game_from_listing(row: &Row, label: &str, ctx: &ListingContext) -> Option<GameSummary> {
    let layout = ListingLayout::detect(row)?;
    build_game(row, layout.cells(), label, ctx)
}

pub fn game_from_schedule(row: &Row, label: &str, ctx: &ListingContext) -> Option<GameSummary> {
    let layout = ScheduleLayout::detect(row)?;
    build_game(row, layout.cells(), label, ctx)
}

pub fn game_from_head_to_head(row: &Row, label: &str, ctx: &ListingContext) -> Option<GameSummary> {
    let layout = HeadToHeadLayout::detect(row)?;
    build_game(row, layout.cells(), label, ctx)
}

pub fn team_ref(name_cell: Option<&Cell>, logo_cell: Option<&Cell>) -> Option<TeamRef> {
    let name = required_text(name_cell)?;
    Some(TeamRef {
        id: team_id(name_cell, &name),
        short_name_derived: short_name(&name),
        logo: image_url(logo_cell).or_else(|| image_url(name_cell)),
        name,
    })
}

fn build_game(row: &Row, cells: GameCells<'_>, label: &str, ctx: &ListingContext) -> Option<GameSummary> {
    let home_team = team_ref(cells.home, cells.home_logo)?;
    let away_team = team_ref(cells.away, cells.away_logo)?;

    let when = joined(cells.when);
    let game_date = parse_date(&when, ctx.reference_date).unwrap_or(ctx.reference_date);
    let start_time = parse_time(&line(cells.when, 1))
        .or_else(|| parse_time(&when))
        .unwrap_or_default();

    let score_text = text(cells.score);
    let parsed = parse_score(&score_text, &when);
    let (period, live_clock) = live_progress(parsed.status, &when, cells.score);

    let league = match cells.league.and_then(|c| required_text(Some(c))) {
        Some(name) => LeagueRef { id: team_id(cells.league, &name), name },
        None => ctx.league(label),
    };

    let id = game_id(row, cells.score, &game_date, &home_team, &away_team);

    Some(GameSummary {
        id,
        home_team,
        away_team,
        home_score: parsed.home_score,
        away_score: parsed.away_score,
        status: parsed.status,
        start_time,
        game_date: game_date.format("%Y-%m-%d").to_string(),
        league,
        location: optional_text(cells.location),
        period,
        live_clock,
    })
}

/// Period and running clock, only for live games.
fn live_progress(status: GameStatus, when: &str, score: Option<&Cell>) -> (Option<u8>, Option<String>) {
    if status != GameStatus::Live {
        return (None, None);
    }
    (
        parse_period(when).or_else(|| parse_period(&joined(score))),
        parse_clock(&line(score, 1)),
    )
}

/// Row link, row id, score-cell link, then a synthetic id.
fn game_id(row: &Row, score: Option<&Cell>, date: &NaiveDate, home: &TeamRef, away: &TeamRef) -> String {
    row.link
        .as_ref()
        .and_then(|l| l.ids.first())
        .filter(|id| !id.is_empty())
        .cloned()
        .or_else(|| row.id.clone())
        .or_else(|| link_id(score))
        .unwrap_or_else(|| format!("{}_{}_{}", date.format("%Y%m%d"), home.id, away.id))
}

// ---------------------------------------------------------------------------
// Game detail
// ---------------------------------------------------------------------------

/// `GET /games/{id}` rows.
#[derive(Debug, Clone, Copy)]
pub enum DetailLayout<'a> {
    /// `[homeLogo, home, awayLogo, away, score, date, time, venue, referees,
    /// spectators]`
    Full(FullDetailCells<'a>),
    /// `[home, away, score, datetime, venue?, referees?, spectators?]`
    Compact(CompactDetailCells<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct FullDetailCells<'a> {
    pub home_logo: &'a Cell,
    pub home: &'a Cell,
    pub away_logo: &'a Cell,
    pub away: &'a Cell,
    pub score: &'a Cell,
    pub date: &'a Cell,
    pub time: &'a Cell,
    pub venue: &'a Cell,
    pub referees: &'a Cell,
    pub spectators: &'a Cell,
}

#[derive(Debug, Clone, Copy)]
pub struct CompactDetailCells<'a> {
    pub home: &'a Cell,
    pub away: &'a Cell,
    pub score: &'a Cell,
    pub datetime: &'a Cell,
    pub venue: Option<&'a Cell>,
    pub referees: Option<&'a Cell>,
    pub spectators: Option<&'a Cell>,
}

impl<'a> DetailLayout<'a> {
    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        if c.len() >= 10 && has_image(c.first()) && has_image(c.get(2)) {
            return Some(DetailLayout::Full(FullDetailCells {
                home_logo: &c[0],
                home: &c[1],
                away_logo: &c[2],
                away: &c[3],
                score: &c[4],
                date: &c[5],
                time: &c[6],
                venue: &c[7],
                referees: &c[8],
                spectators: &c[9],
            }));
        }
        if c.len() >= 5 {
            return Some(DetailLayout::Compact(CompactDetailCells {
                home: &c[0],
                away: &c[1],
                score: &c[2],
                datetime: &c[3],
                venue: c.get(4),
                referees: c.get(5),
                spectators: c.get(6),
            }));
        }
        None
    }
}

/// A game detail row before the league resolver has been consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub summary: GameSummary,
    pub venue: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub referees: Vec<String>,
    pub spectators: Option<u32>,
}

pub fn game_detail(game_id: &str, row: &Row, label: &str, ctx: &ListingContext) -> Option<DetailRecord> {
    let layout = DetailLayout::detect(row)?;
    let (cells, date_text, time_text, venue, referees, spectators) = match layout {
        DetailLayout::Full(f) => (
            GameCells {
                when: Some(f.date),
                home: Some(f.home),
                home_logo: Some(f.home_logo),
                away: Some(f.away),
                away_logo: Some(f.away_logo),
                score: Some(f.score),
                location: Some(f.venue),
                ..Default::default()
            },
            joined(Some(f.date)),
            joined(Some(f.time)),
            Some(f.venue),
            Some(f.referees),
            Some(f.spectators),
        ),
        DetailLayout::Compact(c) => (
            GameCells {
                when: Some(c.datetime),
                home: Some(c.home),
                away: Some(c.away),
                score: Some(c.score),
                location: c.venue,
                ..Default::default()
            },
            joined(Some(c.datetime)),
            line(Some(c.datetime), 1),
            c.venue,
            c.referees,
            c.spectators,
        ),
    };

    let mut summary = build_game(row, cells, label, ctx)?;
    summary.id = game_id.to_owned();
    if let Some(time) = parse_time(&time_text).or_else(|| parse_time(&date_text)) {
        summary.start_time = time;
    }
    // the time cell can be the only one carrying the live marker
    let when = format!("{date_text} {time_text}");
    let reparsed = parse_score(&text(cells.score), &when);
    summary.status = reparsed.status;
    (summary.period, summary.live_clock) = live_progress(reparsed.status, &when, cells.score);

    let point = coordinates(venue).or_else(|| row.cells.iter().find_map(|c| coordinates(Some(c))));

    Some(DetailRecord {
        summary,
        venue: optional_text(venue),
        coordinates: point,
        referees: names_list(&joined(referees)),
        spectators: int(spectators),
    })
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

/// `GET /game_events/{id}` rows: `[time, description, team?, player?]`.
#[derive(Debug, Clone, Copy)]
pub struct EventLayout<'a> {
    pub time: &'a Cell,
    pub description: &'a Cell,
    pub team: Option<&'a Cell>,
    pub player: Option<&'a Cell>,
}

impl<'a> EventLayout<'a> {
    pub const MIN_CELLS: usize = 2;

    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        (c.len() >= Self::MIN_CELLS).then(|| EventLayout {
            time: &c[0],
            description: &c[1],
            team: c.get(2),
            player: c.get(3),
        })
    }
}

pub fn game_event(row: &Row, index: usize, game_id: &str, home: &str, away: &str) -> Option<GameEvent> {
    let layout = EventLayout::detect(row)?;
    let description = joined(Some(layout.description));
    if description.is_empty() {
        return None;
    }
    let class = classify(&description);
    let (player, assist) = split_player(&joined(layout.player));
    Some(GameEvent {
        id: row.id.clone().unwrap_or_else(|| format!("{game_id}-{index}")),
        game_id: game_id.to_owned(),
        time: text(Some(layout.time)),
        team_side: team_side(&text(layout.team), home, away),
        description,
        player,
        assist,
        event_type: class.kind,
        icon: class.icon,
        display_mode: class.display,
    })
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// `GET /rankings` standings rows.
#[derive(Debug, Clone, Copy)]
pub enum RankingLayout<'a> {
    /// `[rank, logo, team, games, wins, otWins, otLosses, losses, goals,
    /// diff, points]`
    Extended(ExtendedRankingCells<'a>),
    /// `[rank, logo, team, games, wins, draws, losses, goals, points]`
    Standard(StandardRankingCells<'a>),
    /// `[rank, team, games, wins, draws, losses, goals, points]`
    Plain(StandardRankingCells<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct ExtendedRankingCells<'a> {
    pub rank: &'a Cell,
    pub logo: &'a Cell,
    pub team: &'a Cell,
    pub games: &'a Cell,
    pub wins: &'a Cell,
    pub ot_wins: &'a Cell,
    pub ot_losses: &'a Cell,
    pub losses: &'a Cell,
    pub goals: &'a Cell,
    pub diff: &'a Cell,
    pub points: &'a Cell,
}

#[derive(Debug, Clone, Copy)]
pub struct StandardRankingCells<'a> {
    pub rank: &'a Cell,
    pub logo: Option<&'a Cell>,
    pub team: &'a Cell,
    pub games: &'a Cell,
    pub wins: &'a Cell,
    pub draws: &'a Cell,
    pub losses: &'a Cell,
    pub goals: &'a Cell,
    pub points: &'a Cell,
}

impl<'a> RankingLayout<'a> {
    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        let logo_at_1 = has_image(c.get(1));
        if c.len() >= 11 && logo_at_1 {
            return Some(RankingLayout::Extended(ExtendedRankingCells {
                rank: &c[0],
                logo: &c[1],
                team: &c[2],
                games: &c[3],
                wins: &c[4],
                ot_wins: &c[5],
                ot_losses: &c[6],
                losses: &c[7],
                goals: &c[8],
                diff: &c[9],
                points: &c[10],
            }));
        }
        if c.len() >= 9 && logo_at_1 {
            return Some(RankingLayout::Standard(StandardRankingCells {
                rank: &c[0],
                logo: Some(&c[1]),
                team: &c[2],
                games: &c[3],
                wins: &c[4],
                draws: &c[5],
                losses: &c[6],
                goals: &c[7],
                points: &c[8],
            }));
        }
        if c.len() >= 8 && !logo_at_1 {
            return Some(RankingLayout::Plain(StandardRankingCells {
                rank: &c[0],
                logo: None,
                team: &c[1],
                games: &c[2],
                wins: &c[3],
                draws: &c[4],
                losses: &c[5],
                goals: &c[6],
                points: &c[7],
            }));
        }
        None
    }
}

/// Upstream leaves the rank blank for tied teams; `fallback_position` is the
/// row's ordinal in that case.
pub fn ranking_row(row: &Row, fallback_position: u32) -> Option<RankingRow> {
    let layout = RankingLayout::detect(row)?;
    let (rank, logo, team, games, wins, draws, losses, goals, points, extra) = match layout {
        RankingLayout::Extended(e) => (
            e.rank,
            Some(e.logo),
            e.team,
            e.games,
            e.wins,
            None,
            e.losses,
            e.goals,
            e.points,
            Some((e.ot_wins, e.ot_losses, e.diff)),
        ),
        RankingLayout::Standard(s) | RankingLayout::Plain(s) => (
            s.rank, s.logo, s.team, s.games, s.wins, Some(s.draws), s.losses, s.goals, s.points,
            None,
        ),
    };

    let team_name = required_text(Some(team))?;
    let (goals_for, goals_against) = goal_pair(&text(Some(goals))).unwrap_or((0, 0));
    let computed_diff = (i64::from(goals_for) - i64::from(goals_against))
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

    Some(RankingRow {
        position: parse_int(text(Some(rank)).trim_end_matches('.')).unwrap_or(fallback_position),
        team_id: team_id(Some(team), &team_name),
        team_logo: image_url(logo).or_else(|| image_url(Some(team))),
        team_name,
        games: int_or_zero(Some(games)),
        wins: int_or_zero(Some(wins)),
        draws: draws.map(|d| int_or_zero(Some(d))).unwrap_or(0),
        losses: int_or_zero(Some(losses)),
        goals_for,
        goals_against,
        goal_difference: extra
            .and_then(|(_, _, diff)| signed_int(Some(diff)))
            .unwrap_or(computed_diff),
        points: int_or_zero(Some(points)),
        overtime_wins: extra.map(|(w, _, _)| int_or_zero(Some(w))),
        overtime_losses: extra.map(|(_, l, _)| int_or_zero(Some(l))),
    })
}

// ---------------------------------------------------------------------------
// Team roster and player statistics
// ---------------------------------------------------------------------------

/// `GET /teams/{id}/players` rows.
#[derive(Debug, Clone, Copy)]
pub enum RosterLayout<'a> {
    /// `[number, name, position, birthYear, games, goals, assists, points]`
    WithStats(RosterCells<'a>, RosterStatCells<'a>),
    /// `[number, name, position, birthYear?]`
    Basic(RosterCells<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct RosterCells<'a> {
    pub number: &'a Cell,
    pub name: &'a Cell,
    pub position: &'a Cell,
    pub birth_year: Option<&'a Cell>,
}

#[derive(Debug, Clone, Copy)]
pub struct RosterStatCells<'a> {
    pub games: &'a Cell,
    pub goals: &'a Cell,
    pub assists: &'a Cell,
    pub points: &'a Cell,
    pub penalty_minutes: Option<&'a Cell>,
}

impl<'a> RosterLayout<'a> {
    pub fn detect(row: &'a Row) -> Option<Self> {
        let c = &row.cells;
        if c.len() < 3 {
            return None;
        }
        let base = RosterCells {
            number: &c[0],
            name: &c[1],
            position: &c[2],
            birth_year: c.get(3),
        };
        if c.len() >= 8 {
            return Some(RosterLayout::WithStats(
                base,
                RosterStatCells {
                    games: &c[4],
                    goals: &c[5],
                    assists: &c[6],
                    points: &c[7],
                    penalty_minutes: c.get(8),
                },
            ));
        }
        Some(RosterLayout::Basic(base))
    }
}

pub fn roster_player(row: &Row) -> Option<RosterPlayer> {
    let layout = RosterLayout::detect(row)?;
    let (base, stats) = match layout {
        RosterLayout::WithStats(base, stats) => (base, Some(stats)),
        RosterLayout::Basic(base) => (base, None),
    };
    let name = required_text(Some(base.name))?;
    let id = link_id(Some(base.name))
        .or_else(|| row.link.as_ref().and_then(|l| l.ids.first().cloned()))
        .unwrap_or_else(|| synthetic_id(&name));
    Some(RosterPlayer {
        id,
        number: optional_text(Some(base.number)),
        name,
        position: optional_text(Some(base.position)),
        birth_year: birth_year(base.birth_year),
        stats: stats.map(|s| PlayerStatLine {
            games: int_or_zero(Some(s.games)),
            goals: int_or_zero(Some(s.goals)),
            assists: int_or_zero(Some(s.assists)),
            points: int_or_zero(Some(s.points)),
            penalty_minutes: int(s.penalty_minutes),
        }),
    })
}

fn birth_year(cell: Option<&Cell>) -> Option<u16> {
    int(cell)
        .and_then(|y| u16::try_from(y).ok())
        .filter(|y| (1900..=2100).contains(y))
}

/// `GET /players/{id}/statistics` rows: `[season, league, team, games,
/// goals, assists, points, penaltyMinutes?]`.
pub fn player_season(row: &Row) -> Option<PlayerSeasonStats> {
    let c = &row.cells;
    if c.len() < 7 {
        return None;
    }
    let season = required_text(c.first())?;
    Some(PlayerSeasonStats {
        season,
        league: text(c.get(1)),
        team: text(c.get(2)),
        games: int_or_zero(c.get(3)),
        goals: int_or_zero(c.get(4)),
        assists: int_or_zero(c.get(5)),
        points: int_or_zero(c.get(6)),
        penalty_minutes: int_or_zero(c.get(7)),
    })
}

// ---------------------------------------------------------------------------
// Profiles: single-row responses whose columns are named by headers
// ---------------------------------------------------------------------------

/// Picks a profile column by header label, falling back to a fixed position
/// when upstream sent no headers.
struct Columns<'a> {
    response: &'a TabularResponse,
    row: &'a Row,
}

impl<'a> Columns<'a> {
    fn get(&self, labels: &[&str], fallback: Option<usize>) -> Option<&'a Cell> {
        let index = if self.response.headers.is_empty() {
            fallback
        } else {
            self.response.header_index(labels)
        };
        index.and_then(|i| self.row.cells.get(i))
    }
}

pub fn team_profile(response: &TabularResponse, team_id_hint: &str) -> Option<TeamProfile> {
    let (_, row) = response.rows().next()?;
    let cols = Columns { response, row };
    let name_cell = cols.get(&["name", "team"], Some(1));
    let name = required_text(name_cell).or_else(|| {
        let title = response.title.trim();
        (!title.is_empty()).then(|| title.to_owned())
    })?;
    let logo = image_url(cols.get(&["logo"], Some(0)))
        .or_else(|| row.cells.iter().find_map(|c| image_url(Some(c))));
    Some(TeamProfile {
        id: team_id_hint.to_owned(),
        short_name_derived: short_name(&name),
        name,
        logo,
        league: optional_text(cols.get(&["liga", "league"], Some(2))),
        website: optional_text(cols.get(&["website", "homepage", "web"], Some(3))),
    })
}

pub fn player_profile(response: &TabularResponse, player_id: &str) -> Option<PlayerProfile> {
    let (_, row) = response.rows().next()?;
    let cols = Columns { response, row };
    let name = required_text(cols.get(&["name"], None)).or_else(|| {
        let title = response.title.trim();
        (!title.is_empty()).then(|| title.to_owned())
    })?;
    Some(PlayerProfile {
        id: player_id.to_owned(),
        name,
        club: optional_text(cols.get(&["club", "verein", "team"], Some(1))),
        number: optional_text(cols.get(&["nummer", "number", "nr", "#"], Some(2))),
        position: optional_text(cols.get(&["position"], Some(3))),
        birth_year: birth_year(cols.get(&["jahrgang", "born", "geburt"], Some(4))),
        height: optional_text(cols.get(&["grösse", "größe", "height"], Some(5))),
        weight: optional_text(cols.get(&["gewicht", "weight"], Some(6))),
        portrait: row.cells.iter().find_map(|c| image_url(Some(c))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Coordinates, EntityLink, Header, Image, Region};
    use crate::{DisplayMode, EventKind, TeamSide};

    fn t(text: &str) -> Cell {
        Cell {
            text: if text.is_empty() { vec![] } else { vec![text.to_owned()] },
            ..Default::default()
        }
    }

    fn lines(a: &str, b: &str) -> Cell {
        Cell { text: vec![a.to_owned(), b.to_owned()], ..Default::default() }
    }

    fn linked(text: &str, id: &str) -> Cell {
        Cell { link: Some(EntityLink { ids: vec![id.to_owned()] }), ..t(text) }
    }

    fn img(url: &str) -> Cell {
        Cell { image: Some(Image { url: url.to_owned() }), ..Default::default() }
    }

    fn row(cells: Vec<Cell>) -> Row {
        Row { cells, ..Default::default() }
    }

    fn ctx() -> ListingContext {
        ListingContext {
            reference_date: NaiveDate::from_ymd_opt(2024, 10, 12).unwrap(),
            league_id: None,
        }
    }

    fn current_row(time: &str, home: &str, away: &str, score: &str) -> Row {
        row(vec![t(time), t(home), t("-"), t(away), t(score)])
    }

    fn list_row(score: &str) -> Row {
        row(vec![
            lines("Sa, 05.10.2024", "19:30"),
            t("Sporthalle Buchholz"),
            linked("UHC Uster", "429"),
            img("https://x/uster.png"),
            t("-"),
            img("https://x/zug.png"),
            linked("Zug United", "430"),
            t(score),
        ])
    }

    #[test]
    fn short_rows_are_dropped_in_every_listing_layout() {
        for n in 0..MIN_LISTING_CELLS {
            let mut cells: Vec<Cell> = (0..n).map(|i| t(&format!("c{i}"))).collect();
            assert!(game_from_listing(&row(cells.clone()), "NLB", &ctx()).is_none());
            if n > 3 {
                cells[3] = img("https://x/logo.png");
            }
            assert!(ListingLayout::detect(&row(cells)).is_none(), "{n} cells");
        }
    }

    #[test]
    fn image_at_index_3_with_8_cells_selects_list_layout() {
        let r = list_row("5:3");
        assert!(matches!(ListingLayout::detect(&r), Some(ListingLayout::List(_))));

        // seven cells are too few even with the image in place
        let mut short = list_row("5:3");
        short.cells.truncate(7);
        assert!(matches!(ListingLayout::detect(&short), Some(ListingLayout::Current(_))));

        // eight cells without the image fall back to the current layout
        let mut plain = list_row("5:3");
        plain.cells[3] = t("");
        assert!(matches!(ListingLayout::detect(&plain), Some(ListingLayout::Current(_))));
    }

    #[test]
    fn list_layout_maps_all_fields() {
        let game = game_from_listing(&list_row("5:3"), "Herren NLB", &ctx()).unwrap();
        assert_eq!(game.home_team.id, "429");
        assert_eq!(game.home_team.name, "UHC Uster");
        assert_eq!(game.home_team.short_name_derived, "Uster");
        assert_eq!(game.home_team.logo.as_deref(), Some("https://x/uster.png"));
        assert_eq!(game.away_team.id, "430");
        assert_eq!(game.away_team.logo.as_deref(), Some("https://x/zug.png"));
        assert_eq!(game.game_date, "2024-10-05");
        assert_eq!(game.start_time, "19:30");
        assert_eq!(game.location.as_deref(), Some("Sporthalle Buchholz"));
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.score(), Some((5, 3)));
        assert_eq!(game.league.name, "Herren NLB");
        assert_eq!(game.league.id, "herren_nlb");
    }

    #[test]
    fn current_layout_uses_reference_date_and_synthetic_ids() {
        let game = game_from_listing(&current_row("19:30", "UHC Uster", "Zug United", ""), "NLB", &ctx())
            .unwrap();
        assert_eq!(game.home_team.id, "uhc_uster");
        assert_eq!(game.away_team.id, "zug_united");
        assert_eq!(game.game_date, "2024-10-12");
        assert_eq!(game.start_time, "19:30");
        assert_eq!(game.status, GameStatus::Upcoming);
        assert_eq!(game.score(), None);
        assert_eq!(game.id, "20241012_uhc_uster_zug_united");
        assert!(game.location.is_none());
    }

    #[test]
    fn status_is_identical_across_layouts() {
        for score in ["2:1*", "2:1", ""] {
            let list = game_from_listing(&list_row(score), "NLB", &ctx()).unwrap();
            let current =
                game_from_listing(&current_row("19:30", "UHC Uster", "Zug United", score), "NLB", &ctx())
                    .unwrap();
            assert_eq!(list.status, current.status, "{score}");
            assert_eq!(list.score(), current.score(), "{score}");
        }
    }

    #[test]
    fn live_game_from_marker_and_asterisk() {
        let mut r = current_row("Spiel läuft", "UHC Uster", "Zug United", "2:1*");
        r.cells[4] = lines("2:1*", "34:12");
        let game = game_from_listing(&r, "NLB", &ctx()).unwrap();
        assert_eq!(game.status, GameStatus::Live);
        assert_eq!(game.score(), Some((2, 1)));
        assert_eq!(game.live_clock.as_deref(), Some("34:12"));

        let r = current_row("2. Drittel", "UHC Uster", "Zug United", "1:0*");
        let game = game_from_listing(&r, "NLB", &ctx()).unwrap();
        assert_eq!(game.period, Some(2));
    }

    #[test]
    fn rows_without_team_names_are_dropped() {
        assert!(game_from_listing(&current_row("19:30", "", "Zug United", "1:0"), "NLB", &ctx()).is_none());
        assert!(game_from_listing(&current_row("19:30", "UHC Uster", "  ", "1:0"), "NLB", &ctx()).is_none());
    }

    #[test]
    fn game_id_precedence() {
        let mut r = current_row("19:30", "A", "B", "1:0");
        r.cells[4] = linked("1:0", "s-1");
        assert_eq!(game_from_listing(&r, "", &ctx()).unwrap().id, "s-1");
        r.id = Some("r-1".into());
        assert_eq!(game_from_listing(&r, "", &ctx()).unwrap().id, "r-1");
        r.link = Some(EntityLink { ids: vec!["l-1".into()] });
        assert_eq!(game_from_listing(&r, "", &ctx()).unwrap().id, "l-1");
    }

    #[test]
    fn league_id_prefers_response_context() {
        let ctx = ListingContext { league_id: Some("2".into()), ..ctx() };
        let game = game_from_listing(&current_row("19:30", "A", "B", ""), "Herren NLB", &ctx).unwrap();
        assert_eq!(game.league, LeagueRef { id: "2".into(), name: "Herren NLB".into() });
    }

    #[test]
    fn schedule_rows() {
        let mut r = row(vec![
            lines("So, 06.10.2024", "16:00"),
            t("Eishalle"),
            linked("Herren NLB", "2"),
            t("Zug United"),
            t("UHC Uster"),
            t("4:7"),
        ]);
        r.link = Some(EntityLink { ids: vec!["1001".into()] });
        let game = game_from_schedule(&r, "", &ctx()).unwrap();
        assert_eq!(game.id, "1001");
        assert_eq!(game.league, LeagueRef { id: "2".into(), name: "Herren NLB".into() });
        assert_eq!(game.game_date, "2024-10-06");
        assert_eq!(game.score(), Some((4, 7)));
        r.cells.truncate(5);
        assert!(game_from_schedule(&r, "", &ctx()).is_none());
    }

    #[test]
    fn head_to_head_rows() {
        let r = row(vec![t("12.01.2024 20:00"), t("Halle"), t("A"), t("B"), t("3-3")]);
        let game = game_from_head_to_head(&r, "Cup", &ctx()).unwrap();
        assert_eq!(game.game_date, "2024-01-12");
        assert_eq!(game.start_time, "20:00");
        assert_eq!(game.status, GameStatus::Finished);
        assert!(game_from_head_to_head(&row(vec![t("x"); 4]), "", &ctx()).is_none());
    }

    #[test]
    fn full_detail_layout() {
        let mut venue = t("Sporthalle Buchholz");
        venue.coordinates = Some(Coordinates { lat: 47.35, lng: 8.72 });
        let r = row(vec![
            img("https://x/uster.png"),
            linked("UHC Uster", "429"),
            img("https://x/zug.png"),
            linked("Zug United", "430"),
            t("6:4"),
            t("05.10.2024"),
            t("19:30"),
            venue,
            t("Meier / Müller"),
            t("1'234"),
        ]);
        assert!(matches!(DetailLayout::detect(&r), Some(DetailLayout::Full(_))));
        let d = game_detail("1001", &r, "NLB", &ctx()).unwrap();
        assert_eq!(d.summary.id, "1001");
        assert_eq!(d.summary.home_team.logo.as_deref(), Some("https://x/uster.png"));
        assert_eq!(d.summary.start_time, "19:30");
        assert_eq!(d.summary.game_date, "2024-10-05");
        assert_eq!(d.venue.as_deref(), Some("Sporthalle Buchholz"));
        assert_eq!(d.coordinates, Some(GeoPoint { lat: 47.35, lng: 8.72 }));
        assert_eq!(d.referees, vec!["Meier", "Müller"]);
        assert_eq!(d.spectators, Some(1234));
        assert_eq!(d.summary.status, GameStatus::Finished);
    }

    #[test]
    fn compact_detail_layout_and_live_time_cell() {
        let r = row(vec![t("A"), t("B"), t("1:1*"), lines("12.10.2024", "Spiel läuft")]);
        assert!(DetailLayout::detect(&r).is_none());

        let r = row(vec![t("A"), t("B"), t(""), lines("12.10.2024", "Spiel läuft"), t("Halle")]);
        let d = game_detail("7", &r, "", &ctx()).unwrap();
        assert_eq!(d.summary.status, GameStatus::Live);
        assert_eq!(d.summary.score(), None);
        assert_eq!(d.venue.as_deref(), Some("Halle"));
        assert!(d.referees.is_empty());
        assert_eq!(d.spectators, None);
        assert_eq!(d.summary.period, None);
    }

    #[test]
    fn live_detail_from_time_cell_keeps_period_and_clock() {
        let r = row(vec![
            img("https://x/uster.png"),
            linked("UHC Uster", "429"),
            img("https://x/zug.png"),
            linked("Zug United", "430"),
            lines("3:2", "41:05"),
            t("05.10.2024"),
            t("2. Drittel läuft"),
            t("Sporthalle Buchholz"),
            t("Meier / Müller"),
            t("812"),
        ]);
        assert!(matches!(DetailLayout::detect(&r), Some(DetailLayout::Full(_))));
        let d = game_detail("1001", &r, "NLB", &ctx()).unwrap();
        assert_eq!(d.summary.status, GameStatus::Live);
        assert_eq!(d.summary.score(), Some((3, 2)));
        assert_eq!(d.summary.period, Some(2));
        assert_eq!(d.summary.live_clock.as_deref(), Some("41:05"));
    }

    #[test]
    fn events_map_sides_and_assists() {
        let r = row(vec![
            t("59:47"),
            t("Torschütze 4:4"),
            t("UHC Uster"),
            t("Müller M. (Meier K.)"),
        ]);
        let e = game_event(&r, 0, "1001", "UHC Uster", "Zug United").unwrap();
        assert_eq!(e.id, "1001-0");
        assert_eq!(e.event_type, EventKind::Goal);
        assert_eq!(e.team_side, TeamSide::Home);
        assert_eq!(e.player, "Müller M.");
        assert_eq!(e.assist.as_deref(), Some("Meier K."));
        assert_eq!(e.display_mode, DisplayMode::Badge);

        let r = row(vec![t("60:00"), t("Bester Spieler")]);
        let e = game_event(&r, 3, "1001", "UHC Uster", "Zug United").unwrap();
        assert_eq!(e.team_side, TeamSide::Neutral);
        assert_eq!(e.player, "");

        assert!(game_event(&row(vec![t("1:00")]), 0, "1", "A", "B").is_none());
        assert!(game_event(&row(vec![t("1:00"), t("")]), 0, "1", "A", "B").is_none());
    }

    #[test]
    fn ranking_layouts() {
        let extended = row(vec![
            t("1."),
            img("https://x/a.png"),
            linked("UHC Uster", "429"),
            t("22"),
            t("15"),
            t("2"),
            t("1"),
            t("4"),
            t("140:90"),
            t("+50"),
            t("50"),
        ]);
        let r = ranking_row(&extended, 1).unwrap();
        assert_eq!(r.position, 1);
        assert_eq!(r.team_id, "429");
        assert_eq!(r.team_logo.as_deref(), Some("https://x/a.png"));
        assert_eq!((r.games, r.wins, r.draws, r.losses), (22, 15, 0, 4));
        assert_eq!((r.goals_for, r.goals_against, r.goal_difference), (140, 90, 50));
        assert_eq!((r.overtime_wins, r.overtime_losses), (Some(2), Some(1)));
        assert_eq!(r.points, 50);

        let standard = row(vec![
            t(""),
            img("https://x/b.png"),
            t("Zug United"),
            t("10"),
            t("5"),
            t("2"),
            t("3"),
            t("30:33"),
            t("17"),
        ]);
        let r = ranking_row(&standard, 4).unwrap();
        assert!(matches!(RankingLayout::detect(&standard), Some(RankingLayout::Standard(_))));
        assert_eq!(r.position, 4);
        assert_eq!(r.team_id, "zug_united");
        assert_eq!(r.goal_difference, -3);
        assert_eq!(r.overtime_wins, None);

        let plain = row(vec![t("2"), t("Team"), t("1"), t("1"), t("0"), t("0"), t("3:1"), t("3")]);
        assert!(matches!(RankingLayout::detect(&plain), Some(RankingLayout::Plain(_))));
        assert_eq!(ranking_row(&plain, 9).unwrap().position, 2);

        assert!(ranking_row(&row(vec![t("1"); 5]), 1).is_none());
    }

    #[test]
    fn goal_difference_saturates_on_huge_goal_counts() {
        let r = row(vec![t("1"), t("Team"), t("1"), t("1"), t("0"), t("0"), t("0:2147483648"), t("3")]);
        let ranked = ranking_row(&r, 1).unwrap();
        assert_eq!(ranked.goals_against, 2_147_483_648);
        assert_eq!(ranked.goal_difference, i32::MIN);

        let r = row(vec![t("1"), t("Team"), t("1"), t("1"), t("0"), t("0"), t("4000000000:1"), t("3")]);
        assert_eq!(ranking_row(&r, 1).unwrap().goal_difference, i32::MAX);
    }

    #[test]
    fn roster_layouts() {
        let full = row(vec![
            t("17"),
            linked("Meier Kevin", "555"),
            t("Stürmer"),
            t("1998"),
            t("20"),
            t("11"),
            t("9"),
            t("20"),
        ]);
        let p = roster_player(&full).unwrap();
        assert_eq!(p.id, "555");
        assert_eq!(p.birth_year, Some(1998));
        assert_eq!(p.stats.unwrap().points, 20);
        assert_eq!(p.stats.unwrap().penalty_minutes, None);

        let basic = row(vec![t(""), t("Müller Jan"), t("Torhüter")]);
        let p = roster_player(&basic).unwrap();
        assert_eq!(p.id, "mller_jan");
        assert_eq!(p.number, None);
        assert_eq!(p.position.as_deref(), Some("Torhüter"));
        assert!(p.stats.is_none());

        assert!(roster_player(&row(vec![t("1"), t("")])).is_none());
    }

    #[test]
    fn player_seasons() {
        let r = row(vec![t("2023/24"), t("NLB"), t("UHC Uster"), t("22"), t("10"), t("5"), t("15"), t("8")]);
        let s = player_season(&r).unwrap();
        assert_eq!(s.season, "2023/24");
        assert_eq!((s.games, s.goals, s.assists, s.points, s.penalty_minutes), (22, 10, 5, 15, 8));
        assert!(player_season(&row(vec![t("x"); 6])).is_none());
    }

    #[test]
    fn map_rows_skips_bad_rows_without_aborting() {
        let response = TabularResponse {
            regions: vec![Region {
                label: "NLB".into(),
                rows: vec![
                    current_row("19:30", "A", "B", "1:0"),
                    row(vec![t("broken")]),
                    current_row("20:00", "C", "D", ""),
                ],
            }],
            ..Default::default()
        };
        let games = map_rows(&response, "game", |_, label, r| game_from_listing(r, label, &ctx()));
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].home_team.name, "A");
        assert_eq!(games[1].home_team.name, "C");
    }

    #[test]
    fn team_profile_by_headers_and_position() {
        let r = row(vec![img("https://x/logo.png"), t("UHC Uster"), t("NLB"), t("https://uhcuster.ch")]);
        let positional = TabularResponse {
            regions: vec![Region { label: String::new(), rows: vec![r.clone()] }],
            ..Default::default()
        };
        let p = team_profile(&positional, "429").unwrap();
        assert_eq!(p.name, "UHC Uster");
        assert_eq!(p.short_name_derived, "Uster");
        assert_eq!(p.logo.as_deref(), Some("https://x/logo.png"));
        assert_eq!(p.league.as_deref(), Some("NLB"));
        assert_eq!(p.website.as_deref(), Some("https://uhcuster.ch"));

        let reordered = TabularResponse {
            headers: ["Website", "Liga", "Teamname", "Logo"]
                .iter()
                .map(|h| Header { text: h.to_string() })
                .collect(),
            regions: vec![Region {
                label: String::new(),
                rows: vec![row(vec![t("https://w"), t("L-UPL"), t("Zug United"), img("https://x/z.png")])],
            }],
            ..Default::default()
        };
        let p = team_profile(&reordered, "430").unwrap();
        assert_eq!(p.name, "Zug United");
        assert_eq!(p.league.as_deref(), Some("L-UPL"));
        assert_eq!(p.website.as_deref(), Some("https://w"));
        assert_eq!(p.logo.as_deref(), Some("https://x/z.png"));
    }

    #[test]
    fn player_profile_uses_title_for_name() {
        let response = TabularResponse {
            title: "Kevin Meier".into(),
            headers: ["", "Club", "Nr.", "Position", "Jahrgang", "Grösse", "Gewicht"]
                .iter()
                .map(|h| Header { text: h.to_string() })
                .collect(),
            regions: vec![Region {
                label: String::new(),
                rows: vec![row(vec![
                    img("https://x/p.jpg"),
                    t("UHC Uster"),
                    t("17"),
                    t("Stürmer"),
                    t("1998"),
                    t("182 cm"),
                    t("80 kg"),
                ])],
            }],
            ..Default::default()
        };
        let p = player_profile(&response, "555").unwrap();
        assert_eq!(p.name, "Kevin Meier");
        assert_eq!(p.club.as_deref(), Some("UHC Uster"));
        assert_eq!(p.number.as_deref(), Some("17"));
        assert_eq!(p.birth_year, Some(1998));
        assert_eq!(p.height.as_deref(), Some("182 cm"));
        assert_eq!(p.portrait.as_deref(), Some("https://x/p.jpg"));

        assert!(player_profile(&TabularResponse::default(), "1").is_none());
    }
}
