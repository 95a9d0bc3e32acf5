//! Public entry points. Every operation here is total: transport and shape
//! failures are logged once, at this boundary, and turned into an empty list
//! or `None`. Nothing below this module decides a fallback.

use crate::client::{ApiError, ApiResult, UnihockeyApi};
use crate::layout::{
    game_detail, game_event, game_from_head_to_head, game_from_listing, game_from_schedule,
    map_rows, player_profile, player_season, roster_player, team_profile, DetailRecord,
    ListingContext,
};
use crate::pagination::collect_pages;
use crate::rankings::{candidates, disambiguate, no_match, ranking_table, RankingOutcome, RankingRequest};
use crate::resolver::{LeagueResolver, NoLeagueResolver, ResolvedLeague};
use crate::wire::Row;
use crate::{
    GameDetail, GameEvent, GameSummary, PlayerProfile, PlayerSeasonStats, RosterPlayer, TeamProfile,
};
use chrono::NaiveDate;
use futures_util::future::join;
use log::{debug, error, warn};

/// Filters for the `mode=list` game listing. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamesQuery {
    pub season: Option<String>,
    pub league: Option<String>,
    pub game_class: Option<String>,
    pub group: Option<String>,
    pub on_date: Option<String>,
    pub before_date: Option<String>,
}

impl GamesQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("mode", "list".to_owned())];
        for (key, value) in [
            ("season", &self.season),
            ("league", &self.league),
            ("game_class", &self.game_class),
            ("group", &self.group),
            ("on_date", &self.on_date),
            ("before_date", &self.before_date),
        ] {
            if let Some(value) = value.as_deref().map(str::trim)
                && !value.is_empty()
            {
                params.push((key, value.to_owned()));
            }
        }
        params
    }

    /// The date rows without their own date belong to.
    fn reference_date(&self) -> NaiveDate {
        self.on_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .unwrap_or_else(today)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Logs a failed operation and substitutes its empty value.
fn settle<T: Default>(what: &str, result: ApiResult<T>) -> T {
    result.unwrap_or_else(|e| {
        if e.is_not_found() {
            warn!("{what}: {e}");
        } else {
            error!("{what}: {e}");
        }
        T::default()
    })
}

pub struct Normalizer<R = NoLeagueResolver> {
    api: UnihockeyApi,
    resolver: R,
}

impl Normalizer {
    pub fn new(api: UnihockeyApi) -> Self {
        Self { api, resolver: NoLeagueResolver }
    }
}

impl<R: LeagueResolver> Normalizer<R> {
    pub fn with_resolver(api: UnihockeyApi, resolver: R) -> Self {
        Self { api, resolver }
    }

    pub fn api(&self) -> &UnihockeyApi {
        &self.api
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    /// Games running or scheduled right now (`mode=current`).
    pub async fn get_current_games(&self) -> Vec<GameSummary> {
        debug!("loading current games");
        let result = self
            .listing(&[("mode", "current".to_owned())], today(), game_from_listing)
            .await;
        settle("current games", result)
    }

    pub async fn get_games(&self, query: &GamesQuery) -> Vec<GameSummary> {
        debug!("loading games for {query:?}");
        let result = self
            .listing(&query.params(), query.reference_date(), game_from_listing)
            .await;
        settle("games", result)
    }

    /// Previous meetings of the two teams playing `game_id` (`mode=direct`).
    pub async fn get_head_to_head(&self, game_id: &str) -> Vec<GameSummary> {
        debug!("loading head-to-head for game {game_id}");
        let params = [("mode", "direct".to_owned()), ("game_id", game_id.trim().to_owned())];
        let result = self.listing(&params, today(), game_from_head_to_head).await;
        settle("head-to-head", result)
    }

    /// A team's whole schedule for `season`, fetched page by page.
    pub async fn get_team_games(&self, team_id: &str, season: Option<&str>) -> Vec<GameSummary> {
        debug!("loading schedule for team {team_id}");
        let api = &self.api;
        let reference = today();
        let mut base = vec![("mode", "team".to_owned()), ("team_id", team_id.trim().to_owned())];
        if let Some(season) = season.map(str::trim).filter(|s| !s.is_empty()) {
            base.push(("season", season.to_owned()));
        }
        collect_pages("team schedule", |page| {
            let mut params = base.clone();
            params.push(("page", page.to_string()));
            async move {
                let response = api.fetch_games(&params).await?;
                let ctx = ListingContext::new(reference, &response);
                let games = map_rows(&response, "schedule", |_, label, row| {
                    game_from_schedule(row, label, &ctx)
                });
                Ok::<_, ApiError>((response.rows().count(), games))
            }
        })
        .await
    }

    async fn listing(
        &self,
        params: &[(&str, String)],
        reference: NaiveDate,
        map: fn(&Row, &str, &ListingContext) -> Option<GameSummary>,
    ) -> ApiResult<Vec<GameSummary>> {
        let response = self.api.fetch_games(params).await?;
        let ctx = ListingContext::new(reference, &response);
        Ok(map_rows(&response, "game", |_, label, row| map(row, label, &ctx)))
    }

    pub async fn get_game_details(&self, game_id: &str) -> Option<GameDetail> {
        debug!("loading game detail {game_id}");
        settle("game detail", self.game_details(game_id).await)
    }

    async fn game_details(&self, game_id: &str) -> ApiResult<Option<GameDetail>> {
        let response = self.api.fetch_game(game_id).await?;
        let ctx = ListingContext::new(today(), &response);
        let Some(record) = response
            .rows()
            .find_map(|(label, row)| game_detail(game_id, row, label, &ctx))
        else {
            warn!("game detail {game_id}: no row could be mapped");
            return Ok(None);
        };
        let DetailRecord { mut summary, venue, coordinates, referees, spectators } = record;

        let resolved_league = self.resolve_league(&summary.home_team.id, &summary.away_team.id).await;

        if summary.home_team.logo.is_none() || summary.away_team.logo.is_none() {
            let (home_logo, away_logo) = join(
                self.team_logo(&summary.home_team.id, summary.home_team.logo.is_none()),
                self.team_logo(&summary.away_team.id, summary.away_team.logo.is_none()),
            )
            .await;
            summary.home_team.logo = summary.home_team.logo.or(home_logo);
            summary.away_team.logo = summary.away_team.logo.or(away_logo);
        }

        Ok(Some(GameDetail {
            summary,
            venue,
            coordinates,
            referees,
            spectators,
            resolved_league,
        }))
    }

    async fn resolve_league(&self, home_id: &str, away_id: &str) -> Option<ResolvedLeague> {
        if home_id.is_empty() || away_id.is_empty() {
            return None;
        }
        match self.resolver.resolve(home_id, away_id).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("league resolver failed for {home_id} vs {away_id}: {e}");
                None
            }
        }
    }

    async fn team_logo(&self, team_id: &str, wanted: bool) -> Option<String> {
        if !wanted {
            return None;
        }
        match self.api.fetch_team(team_id).await {
            Ok(response) => team_profile(&response, team_id).and_then(|t| t.logo),
            Err(e) => {
                debug!("no logo for team {team_id}: {e}");
                None
            }
        }
    }

    /// Events in upstream order (newest first). The game itself is fetched
    /// alongside to tell home from away.
    pub async fn get_game_events(&self, game_id: &str) -> Vec<GameEvent> {
        debug!("loading events for game {game_id}");
        let (game, events) = join(self.api.fetch_game(game_id), self.api.fetch_game_events(game_id)).await;
        let (home, away) = match game {
            Ok(response) => {
                let ctx = ListingContext::new(today(), &response);
                response
                    .rows()
                    .find_map(|(label, row)| game_detail(game_id, row, label, &ctx))
                    .map(|d| (d.summary.home_team.name, d.summary.away_team.name))
                    .unwrap_or_default()
            }
            Err(e) => {
                warn!("game {game_id}: team names unavailable, events stay neutral: {e}");
                Default::default()
            }
        };
        let result = events.map(|response| {
            map_rows(&response, "event", |index, _, row| game_event(row, index, game_id, &home, &away))
        });
        settle("game events", result)
    }

    // -----------------------------------------------------------------------
    // Teams and players
    // -----------------------------------------------------------------------

    pub async fn get_team(&self, team_id: &str) -> Option<TeamProfile> {
        debug!("loading team {team_id}");
        let result = self.api.fetch_team(team_id).await.map(|r| team_profile(&r, team_id.trim()));
        settle("team", result)
    }

    pub async fn get_team_players(&self, team_id: &str) -> Vec<RosterPlayer> {
        debug!("loading roster for team {team_id}");
        let result = self
            .api
            .fetch_team_players(team_id)
            .await
            .map(|r| map_rows(&r, "roster", |_, _, row| roster_player(row)));
        settle("team players", result)
    }

    pub async fn get_player(&self, player_id: &str) -> Option<PlayerProfile> {
        debug!("loading player {player_id}");
        let result = self
            .api
            .fetch_player(player_id)
            .await
            .map(|r| player_profile(&r, player_id.trim()));
        settle("player", result)
    }

    pub async fn get_player_statistics(&self, player_id: &str) -> Vec<PlayerSeasonStats> {
        debug!("loading statistics for player {player_id}");
        let result = self
            .api
            .fetch_player_statistics(player_id)
            .await
            .map(|r| map_rows(&r, "player statistics", |_, _, row| player_season(row)));
        settle("player statistics", result)
    }

    // -----------------------------------------------------------------------
    // Rankings
    // -----------------------------------------------------------------------

    /// The standings table best matching `request`, or the candidates when
    /// none does. `None` only when upstream could not be reached.
    pub async fn get_rankings(&self, request: &RankingRequest) -> Option<RankingOutcome> {
        debug!("loading rankings for {request:?}");
        settle("rankings", self.rankings(request).await.map(Some))
    }

    async fn rankings(&self, request: &RankingRequest) -> ApiResult<RankingOutcome> {
        let mut params = Vec::new();
        if let Some(season) = request.season.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("season", season.to_owned()));
        }
        let listing = self.api.fetch_rankings(&params).await?;
        let all = candidates(&listing);
        let chosen = disambiguate(&all, request).into_iter().next().cloned();
        let Some(chosen) = chosen else {
            warn!("rankings: no table matches {request:?} among {} candidates", all.len());
            return Ok(RankingOutcome::NoMatch(no_match(all, request)));
        };
        debug!("rankings: chose {} ({:?})", chosen.full_name, chosen.game_class);

        // without tabs the listing already is the only table
        if listing.tabs.is_empty() {
            return Ok(RankingOutcome::Table(ranking_table(&listing, &chosen)));
        }
        let standings = self.api.fetch_rankings(&chosen.params()).await?;
        Ok(RankingOutcome::Table(ranking_table(&standings, &chosen)))
    }
}
