//! The league resolver is an external service mapping two teams to the
//! league, game class and group they play each other in. Game details use it
//! after the team ids are known; a failure only leaves the league unresolved.

use crate::client::ApiResult;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLeague {
    pub id: String,
    pub game_class: Option<u32>,
    pub group: Option<String>,
}

pub trait LeagueResolver {
    fn resolve(
        &self,
        team_a: &str,
        team_b: &str,
    ) -> impl Future<Output = ApiResult<Option<ResolvedLeague>>> + Send;
}

/// Resolver for deployments without the league service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLeagueResolver;

impl LeagueResolver for NoLeagueResolver {
    async fn resolve(&self, _team_a: &str, _team_b: &str) -> ApiResult<Option<ResolvedLeague>> {
        Ok(None)
    }
}
