use unihockey_api::{GamesQuery, RankingRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Current,
    Games(GamesQuery),
    Game(String),
    Events(String),
    HeadToHead(String),
    Team(String),
    Players(String),
    Schedule { team_id: String, season: Option<String> },
    Rankings(RankingRequest),
    Player(String),
    PlayerStats(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Version,
    Run { command: Command, verbose: bool },
}

pub fn usage_text() -> &'static str {
    "scoreline - normalized Swiss Unihockey scores as JSON

Usage:
  scoreline [-v] current
  scoreline [-v] games [--season S] [--league L] [--game-class C] [--group G] [--date YYYY-MM-DD] [--before YYYY-MM-DD]
  scoreline [-v] game <game_id>
  scoreline [-v] events <game_id>
  scoreline [-v] h2h <game_id>
  scoreline [-v] team <team_id>
  scoreline [-v] players <team_id>
  scoreline [-v] schedule <team_id> [--season S]
  scoreline [-v] rankings [--season S] [--league L] [--game-class C] [--group G] [--league-name N] [--team NAME]...
  scoreline [-v] player <player_id>
  scoreline [-v] player-stats <player_id>
  scoreline --help
  scoreline --version

Environment:
  UNIHOCKEY_API_URL        API base URL (default https://api-v2.swissunihockey.ch/api)
  UNIHOCKEY_TIMEOUT_SECS   Request timeout in seconds (default 10)
  UNIHOCKEY_LOCALE         Locale sent with every request, e.g. de-CH
  RUST_LOG                 Log filter (default warn, -v means debug)"
}

pub fn parse<I>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut verbose = false;
    while let Some(flag) = args.next_if(|a| a.starts_with('-')) {
        match flag.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "-V" | "--version" => return Ok(Invocation::Version),
            "-v" | "--verbose" => verbose = true,
            _ => return Err(format!("Unknown argument: {flag}")),
        }
    }

    let Some(name) = args.next() else {
        return Err("Missing command".to_owned());
    };
    let rest: Vec<String> = args.collect();

    let command = match name.as_str() {
        "current" => {
            no_options(&rest)?;
            Command::Current
        }
        "games" => {
            let opts = Options::parse(&rest, &["--season", "--league", "--game-class", "--group", "--date", "--before"])?;
            Command::Games(GamesQuery {
                season: opts.get("--season"),
                league: opts.get("--league"),
                game_class: opts.get("--game-class"),
                group: opts.get("--group"),
                on_date: opts.get("--date"),
                before_date: opts.get("--before"),
            })
        }
        "game" => Command::Game(single_id(&name, &rest)?),
        "events" => Command::Events(single_id(&name, &rest)?),
        "h2h" => Command::HeadToHead(single_id(&name, &rest)?),
        "team" => Command::Team(single_id(&name, &rest)?),
        "players" => Command::Players(single_id(&name, &rest)?),
        "player" => Command::Player(single_id(&name, &rest)?),
        "player-stats" => Command::PlayerStats(single_id(&name, &rest)?),
        "schedule" => {
            let (team_id, tail) = rest
                .split_first()
                .ok_or_else(|| format!("{name} needs a team id"))?;
            let opts = Options::parse(tail, &["--season"])?;
            Command::Schedule { team_id: team_id.clone(), season: opts.get("--season") }
        }
        "rankings" => {
            let opts = Options::parse(
                &rest,
                &["--season", "--league", "--game-class", "--group", "--league-name", "--team"],
            )?;
            Command::Rankings(RankingRequest {
                season: opts.get("--season"),
                league: opts.get("--league"),
                game_class: opts.get("--game-class"),
                group: opts.get("--group"),
                league_name: opts.get("--league-name"),
                team_names: opts.all("--team"),
            })
        }
        other => return Err(format!("Unknown command: {other}")),
    };
    Ok(Invocation::Run { command, verbose })
}

fn no_options(rest: &[String]) -> Result<(), String> {
    match rest.first() {
        Some(extra) => Err(format!("Unexpected argument: {extra}")),
        None => Ok(()),
    }
}

fn single_id(command: &str, rest: &[String]) -> Result<String, String> {
    match rest {
        [id] if !id.starts_with('-') => Ok(id.clone()),
        [] => Err(format!("{command} needs an id")),
        _ => Err(format!("{command} takes exactly one id")),
    }
}

/// `--flag value` pairs, flags may repeat.
struct Options(Vec<(String, String)>);

impl Options {
    fn parse(rest: &[String], known: &[&str]) -> Result<Self, String> {
        let mut pairs = Vec::new();
        let mut iter = rest.iter();
        while let Some(flag) = iter.next() {
            if !known.contains(&flag.as_str()) {
                return Err(format!("Unknown option: {flag}"));
            }
            let value = iter.next().ok_or_else(|| format!("{flag} needs a value"))?;
            pairs.push((flag.clone(), value.clone()));
        }
        Ok(Self(pairs))
    }

    fn get(&self, flag: &str) -> Option<String> {
        self.0.iter().rev().find(|(f, _)| f == flag).map(|(_, v)| v.clone())
    }

    fn all(&self, flag: &str) -> Vec<String> {
        self.0.iter().filter(|(f, _)| f == flag).map(|(_, v)| v.clone()).collect()
    }
}
