//! Runtime settings for the web front-end, read from environment variables.

/// Server and game settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the player table (`:memory:` for an ephemeral one).
    pub db_path: String,
    /// Fixed seed for role shuffles; `None` uses system entropy.
    pub seed: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "mafia.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            seed: None,
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `MAFIA_DB` and `MAFIA_SEED`. Missing or unparseable values fall
    /// back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(default_host);
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or_else(default_port);
        let db_path = lookup("MAFIA_DB")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(default_db_path);
        let seed = lookup("MAFIA_SEED").and_then(|s| s.trim().parse().ok());
        Self {
            host,
            port,
            db_path,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("MAFIA_DB", ":memory:"),
            ("MAFIA_SEED", "42"),
        ]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.db_path, ":memory:");
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config_from(&[("PORT", "http"), ("MAFIA_SEED", "-1"), ("HOST", " ")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed, None);
        assert_eq!(config.host, "0.0.0.0");
    }
}
