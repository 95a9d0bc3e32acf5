mod cli;
mod settings;

use crate::cli::{Command, Invocation};
use crate::settings::Settings;
use log::debug;
use serde::Serialize;
use unihockey_api::{Normalizer, UnihockeyApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let invocation = match cli::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{message}\n\n{}", cli::usage_text());
            std::process::exit(2);
        }
    };

    let (command, verbose) = match invocation {
        Invocation::Help => {
            println!("{}", cli::usage_text());
            return Ok(());
        }
        Invocation::Version => {
            println!("scoreline {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Invocation::Run { command, verbose } => (command, verbose),
    };

    better_panic::install();

    let settings = Settings::load(verbose);
    settings.init_logger();
    debug!("using {}", settings.api.base_url);

    let normalizer = Normalizer::new(UnihockeyApi::new(settings.api));
    run(&normalizer, command).await
}

async fn run(normalizer: &Normalizer, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Current => print(&normalizer.get_current_games().await),
        Command::Games(query) => print(&normalizer.get_games(&query).await),
        Command::Game(id) => print(&normalizer.get_game_details(&id).await),
        Command::Events(id) => print(&normalizer.get_game_events(&id).await),
        Command::HeadToHead(id) => print(&normalizer.get_head_to_head(&id).await),
        Command::Team(id) => print(&normalizer.get_team(&id).await),
        Command::Players(id) => print(&normalizer.get_team_players(&id).await),
        Command::Schedule { team_id, season } => {
            print(&normalizer.get_team_games(&team_id, season.as_deref()).await)
        }
        Command::Rankings(request) => print(&normalizer.get_rankings(&request).await),
        Command::Player(id) => print(&normalizer.get_player(&id).await),
        Command::PlayerStats(id) => print(&normalizer.get_player_statistics(&id).await),
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
