use log::LevelFilter;
use unihockey_api::ApiConfig;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn load(verbose: bool) -> Self {
        Self {
            api: ApiConfig::from_env(),
            log_level: if verbose { LevelFilter::Debug } else { LevelFilter::Warn },
        }
    }

    pub fn init_logger(&self) {
        let level = self.log_level.to_string().to_lowercase();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .format_timestamp(None)
            .init();
    }
}
