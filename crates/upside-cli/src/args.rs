//! Command-line arguments.

use std::time::Duration;

use clap::Parser;
use upside_app::AppConfig;
use upside_core::{
    feed::{DEFAULT_COLLECTION, FeedConfig},
    session::SessionConfig,
};
use upside_proto::Mode;

/// Command-line arguments for `upside`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "upside")]
#[command(about = "Broadcast messages as timed light, color, beep, or grid signals")]
#[command(version)]
pub struct Args {
    /// Log in as this user id at startup
    #[arg(short, long, env = "UPSIDE_USER")]
    pub user: Option<String>,

    /// Store collection holding the broadcast feed
    #[arg(long, default_value = DEFAULT_COLLECTION, env = "UPSIDE_COLLECTION")]
    pub collection: String,

    /// Milliseconds between sanity decay ticks
    #[arg(
        long,
        default_value_t = 2000,
        env = "UPSIDE_DECAY_PERIOD_MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub decay_period_ms: u64,

    /// Seed for grid noise; random when absent
    #[arg(long, env = "UPSIDE_SEED")]
    pub seed: Option<u64>,

    /// Mode for outgoing messages: morse, color, beep, or grid
    #[arg(short, long, default_value = "morse", env = "UPSIDE_MODE")]
    pub mode: Mode,
}

impl Args {
    /// Application configuration these arguments describe.
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            session: SessionConfig {
                decay_period: Duration::from_millis(self.decay_period_ms),
                ..SessionConfig::default()
            },
            feed: FeedConfig { collection: self.collection.clone() },
            initial_mode: self.mode,
            ..AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_app_defaults() {
        let args = Args::try_parse_from(["upside"]).unwrap();

        assert_eq!(args.user, None);
        assert_eq!(args.seed, None);
        assert_eq!(args.app_config(), AppConfig::default());
    }

    #[test]
    fn flags_reach_config() {
        let args = Args::try_parse_from([
            "upside",
            "--user",
            "eleven",
            "--collection",
            "hawkins",
            "--decay-period-ms",
            "500",
            "--mode",
            "GRID",
            "--seed",
            "42",
        ])
        .unwrap();

        let config = args.app_config();
        assert_eq!(args.user.as_deref(), Some("eleven"));
        assert_eq!(args.seed, Some(42));
        assert_eq!(config.session.decay_period, Duration::from_millis(500));
        assert_eq!(config.feed.collection, "hawkins");
        assert_eq!(config.initial_mode, Mode::Grid);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Args::try_parse_from(["upside", "--mode", "smoke"]).is_err());
    }

    #[test]
    fn rejects_zero_decay_period() {
        assert!(Args::try_parse_from(["upside", "--decay-period-ms", "0"]).is_err());
    }
}
