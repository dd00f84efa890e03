use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_DATA_DIR: &str = "bot_data";
pub const DEFAULT_QUESTIONS_PER_TEST: usize = 25;
pub const DEFAULT_QUESTION_TIME_LIMIT_SECS: u64 = 20;
pub const DEFAULT_BROADCAST_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Webhook {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bot_token: String,
    pub super_admin_id: i64,
    pub admin_ids: Vec<i64>,
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
    pub questions_per_test: usize,
    pub question_time_limit: Duration,
    pub broadcast_delay: Duration,
    pub webhook: Option<Webhook>,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = var("TELOXIDE_TOKEN")
            .or_else(|| var("BOT_TOKEN"))
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let super_admin_id = parse(
            "SUPER_ADMIN_ID",
            var("SUPER_ADMIN_ID").ok_or(ConfigError::Missing("SUPER_ADMIN_ID"))?,
        )?;

        let admin_ids = match var("ADMIN_IDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse("ADMIN_IDS", s.to_owned()))
                .collect::<Result<Vec<i64>, _>>()?,
            None => Vec::new(),
        };

        let questions_per_test = var("QUESTIONS_PER_TEST")
            .map(|v| parse("QUESTIONS_PER_TEST", v))
            .transpose()?
            .unwrap_or(DEFAULT_QUESTIONS_PER_TEST);
        if questions_per_test == 0 {
            return Err(ConfigError::Invalid {
                name: "QUESTIONS_PER_TEST",
                value: "0".to_owned(),
            });
        }

        let question_time_limit = var("QUESTION_TIME_LIMIT_SECS")
            .map(|v| parse("QUESTION_TIME_LIMIT_SECS", v))
            .transpose()?
            .unwrap_or(DEFAULT_QUESTION_TIME_LIMIT_SECS);

        let broadcast_delay = var("BROADCAST_DELAY_MS")
            .map(|v| parse("BROADCAST_DELAY_MS", v))
            .transpose()?
            .unwrap_or(DEFAULT_BROADCAST_DELAY_MS);

        let webhook = match (var("WEBHOOK_URL"), var("WEBHOOK_ADDR")) {
            (Some(url), Some(addr)) => Some(Webhook {
                url: parse("WEBHOOK_URL", url)?,
                addr: parse("WEBHOOK_ADDR", addr)?,
            }),
            _ => None,
        };

        Ok(Self {
            bot_token,
            super_admin_id,
            admin_ids,
            database_url: var("DATABASE_URL"),
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            questions_per_test,
            question_time_limit: Duration::from_secs(question_time_limit),
            broadcast_delay: Duration::from_millis(broadcast_delay),
            webhook,
        })
    }

    /// Admins named in the environment, the super admin included.
    pub fn is_static_admin(&self, user_id: i64) -> bool {
        user_id == self.super_admin_id || self.admin_ids.contains(&user_id)
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = config(&[("TELOXIDE_TOKEN", "123:abc"), ("SUPER_ADMIN_ID", "42")]).unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.super_admin_id, 42);
        assert!(config.admin_ids.is_empty());
        assert_eq!(config.database_url, None);
        assert_eq!(config.data_dir, PathBuf::from("bot_data"));
        assert_eq!(config.questions_per_test, 25);
        assert_eq!(config.question_time_limit, Duration::from_secs(20));
        assert_eq!(config.broadcast_delay, Duration::from_millis(100));
        assert_eq!(config.webhook, None);
    }

    #[test]
    fn bot_token_falls_back_to_legacy_name() {
        let config = config(&[("BOT_TOKEN", "t"), ("SUPER_ADMIN_ID", "1")]).unwrap();
        assert_eq!(config.bot_token, "t");
    }

    #[test]
    fn missing_token_is_reported() {
        let err = config(&[("SUPER_ADMIN_ID", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELOXIDE_TOKEN")));
    }

    #[test]
    fn admin_ids_are_comma_separated() {
        let config = config(&[
            ("TELOXIDE_TOKEN", "t"),
            ("SUPER_ADMIN_ID", "1"),
            ("ADMIN_IDS", " 5, 6 ,,7"),
        ])
        .unwrap();

        assert_eq!(config.admin_ids, vec![5, 6, 7]);
        assert!(config.is_static_admin(1));
        assert!(config.is_static_admin(6));
        assert!(!config.is_static_admin(8));
    }

    #[test]
    fn bad_number_names_the_variable() {
        let err = config(&[
            ("TELOXIDE_TOKEN", "t"),
            ("SUPER_ADMIN_ID", "1"),
            ("QUESTIONS_PER_TEST", "many"),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid { name: "QUESTIONS_PER_TEST", .. }
        ));
    }

    #[test]
    fn webhook_needs_both_url_and_addr() {
        let only_url = config(&[
            ("TELOXIDE_TOKEN", "t"),
            ("SUPER_ADMIN_ID", "1"),
            ("WEBHOOK_URL", "https://example.org/hook"),
        ])
        .unwrap();
        assert_eq!(only_url.webhook, None);

        let both = config(&[
            ("TELOXIDE_TOKEN", "t"),
            ("SUPER_ADMIN_ID", "1"),
            ("WEBHOOK_URL", "https://example.org/hook"),
            ("WEBHOOK_ADDR", "0.0.0.0:8443"),
        ])
        .unwrap();
        let webhook = both.webhook.unwrap();
        assert_eq!(webhook.addr.port(), 8443);
        assert_eq!(webhook.url.path(), "/hook");
    }
}
