use crate::wire::{Envelope, TabularResponse};
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_BASE_URL: &str = "https://api-v2.swissunihockey.ch/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = "scoreline/0.1 (score normalizer)";

/// Transport settings. `from_env` reads `UNIHOCKEY_API_URL`,
/// `UNIHOCKEY_TIMEOUT_SECS` and `UNIHOCKEY_LOCALE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Sent as `locale=` on every request when set, e.g. `de-CH`.
    pub locale: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            locale: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("UNIHOCKEY_API_URL")
            && !url.trim().is_empty()
        {
            config.base_url = url.trim().trim_end_matches('/').to_owned();
        }
        if let Some(secs) = lookup("UNIHOCKEY_TIMEOUT_SECS").and_then(|s| s.trim().parse::<u64>().ok())
            && secs > 0
        {
            config.timeout = Duration::from_secs(secs);
        }
        config.locale = lookup("UNIHOCKEY_LOCALE")
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty());
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

/// Client for the Swiss Unihockey v2 API. Every endpoint answers with the
/// same tabular envelope; this type only fetches and decodes it.
#[derive(Debug, Clone)]
pub struct UnihockeyApi {
    client: Client,
    config: ApiConfig,
}

impl Default for UnihockeyApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status(StatusCode, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status(status, url) => write!(f, "API error for {url}: HTTP {status}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Upstream answers 400 once a paginated listing runs past its end.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ApiError::Status(status, _) if *status == StatusCode::BAD_REQUEST)
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Status(status, _) => *status == StatusCode::NOT_FOUND,
            ApiError::NotFound(_) => true,
            _ => false,
        }
    }
}

impl UnihockeyApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(config.user_agent.clone())
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET /games` with the given mode and filters.
    pub async fn fetch_games(&self, params: &[(&str, String)]) -> ApiResult<TabularResponse> {
        self.table("/games", params).await
    }

    pub async fn fetch_game(&self, game_id: &str) -> ApiResult<TabularResponse> {
        self.table(&format!("/games/{}", path_segment(game_id)?), &[]).await
    }

    pub async fn fetch_game_events(&self, game_id: &str) -> ApiResult<TabularResponse> {
        self.table(&format!("/game_events/{}", path_segment(game_id)?), &[]).await
    }

    pub async fn fetch_team(&self, team_id: &str) -> ApiResult<TabularResponse> {
        self.table(&format!("/teams/{}", path_segment(team_id)?), &[]).await
    }

    pub async fn fetch_team_players(&self, team_id: &str) -> ApiResult<TabularResponse> {
        self.table(&format!("/teams/{}/players", path_segment(team_id)?), &[])
            .await
    }

    /// `GET /rankings`. Upstream honours `season` and ignores most other
    /// filters, so callers must narrow the result themselves.
    pub async fn fetch_rankings(&self, params: &[(&str, String)]) -> ApiResult<TabularResponse> {
        self.table("/rankings", params).await
    }

    pub async fn fetch_player(&self, player_id: &str) -> ApiResult<TabularResponse> {
        self.table(&format!("/players/{}", path_segment(player_id)?), &[]).await
    }

    pub async fn fetch_player_statistics(&self, player_id: &str) -> ApiResult<TabularResponse> {
        self.table(&format!("/players/{}/statistics", path_segment(player_id)?), &[])
            .await
    }

    async fn table(&self, path: &str, params: &[(&str, String)]) -> ApiResult<TabularResponse> {
        let url = self.url(path, params)?;
        let envelope: Envelope = self.get(url.as_str()).await?;
        Ok(envelope.data)
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> ApiResult<Url> {
        let raw = format!("{}{path}", self.config.base_url);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::Other(format!("invalid url {raw}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(locale) = &self.config.locale {
                query.append_pair("locale", locale);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status, url.to_owned()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

/// Ids are interpolated into paths; anything but a plain token is refused.
fn path_segment(id: &str) -> ApiResult<&str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ApiError::NotFound(format!("invalid id {id:?}")));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_without_env() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn config_reads_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("UNIHOCKEY_API_URL", "http://localhost:9000/api/"),
            ("UNIHOCKEY_TIMEOUT_SECS", "3"),
            ("UNIHOCKEY_LOCALE", "fr-CH"),
        ]));
        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.locale.as_deref(), Some("fr-CH"));
    }

    #[test]
    fn config_ignores_garbage() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("UNIHOCKEY_API_URL", "  "),
            ("UNIHOCKEY_TIMEOUT_SECS", "soon"),
            ("UNIHOCKEY_LOCALE", ""),
        ]));
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn urls_carry_params_and_locale() {
        let mut config = ApiConfig::default().with_base_url("http://h/api/");
        config.locale = Some("de-CH".into());
        let api = UnihockeyApi::new(config);
        let url = api
            .url("/games", &[("mode", "list".into()), ("on_date", "2024-10-12".into())])
            .unwrap();
        assert_eq!(url.as_str(), "http://h/api/games?mode=list&on_date=2024-10-12&locale=de-CH");

        let api = UnihockeyApi::new(ApiConfig::default().with_base_url("http://h/api"));
        assert_eq!(api.url("/games/1", &[]).unwrap().as_str(), "http://h/api/games/1");
    }

    #[test]
    fn path_segments_are_validated() {
        assert_eq!(path_segment(" 1001 ").unwrap(), "1001");
        assert!(path_segment("").is_err());
        assert!(path_segment("1/../2").is_err());
    }

    #[test]
    fn error_classification() {
        let bad = ApiError::Status(StatusCode::BAD_REQUEST, "u".into());
        assert!(bad.is_bad_request());
        assert!(!bad.is_not_found());
        let missing = ApiError::Status(StatusCode::NOT_FOUND, "u".into());
        assert!(missing.is_not_found());
        assert!(!ApiError::Other("x".into()).is_bad_request());
        assert!(bad.to_string().contains("400"));
    }
}
