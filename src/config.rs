use std::net::SocketAddr;

use clap::Parser;

/// Tennis tournament simulation and prediction service
#[derive(Parser, Debug, Clone)]
#[command(name = "courtside", version, about)]
pub struct Config {
    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: String,

    /// Seed for all stochastic paths (shuffle, match noise, scorelines).
    /// When set, each request draws from a freshly seeded generator so
    /// responses are reproducible.
    #[arg(long, env = "RNG_SEED")]
    pub rng_seed: Option<u64>,

    /// Skip training the win-probability model on the built-in historical
    /// matches; every prediction then uses the deterministic heuristic.
    #[arg(long, env = "SKIP_TRAINING", default_value = "false")]
    pub skip_training: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr '{}' is not a valid socket address",
                self.listen_addr
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::parse_from(["courtside"]);
        assert!(config.validate().is_ok());
        assert!(config.rng_seed.is_none());
        assert!(!config.skip_training);
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let config = Config::parse_from(["courtside", "--listen-addr", "not-an-addr"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn seed_flag_is_parsed() {
        let config = Config::parse_from(["courtside", "--rng-seed", "42"]);
        assert_eq!(config.rng_seed, Some(42));
    }
}
