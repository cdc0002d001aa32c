//! Relay configuration.
//!
//! Defaults reproduce the classic run: 1000 words of 3..=15 letters,
//! lengths 2..=14 counted by 13 tasks, 10ms gate polling.
//! `from_env` overlays `RELAY_*` variables on top of the defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::fanout::FanOutCounter;
use crate::gate::TurnGate;
use crate::generator::WordGenerator;
use crate::store::FileStore;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub data_path: PathBuf,
    pub poll_interval: Duration,
    pub dispatch_delay: Duration,
    pub start_length: usize,
    pub batch_size: usize,
    pub word_count: usize,
    pub min_word_length: usize,
    pub max_word_length: usize,
    pub alphabet: String,
    /// Fixed generator seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            data_path: FileStore::default_path(),
            poll_interval: TurnGate::DEFAULT_POLL_INTERVAL,
            dispatch_delay: FanOutCounter::DEFAULT_DISPATCH_DELAY,
            start_length: FanOutCounter::DEFAULT_START_LENGTH,
            batch_size: FanOutCounter::DEFAULT_BATCH_SIZE,
            word_count: WordGenerator::DEFAULT_WORD_COUNT,
            min_word_length: WordGenerator::DEFAULT_MIN_LENGTH,
            max_word_length: WordGenerator::DEFAULT_MAX_LENGTH,
            alphabet: WordGenerator::DEFAULT_ALPHABET.to_string(),
            seed: None,
        }
    }
}

impl RelayConfig {
    pub const ENV_DATA_PATH: &'static str = "RELAY_DATA_PATH";
    pub const ENV_SEED: &'static str = "RELAY_SEED";
    pub const ENV_WORD_COUNT: &'static str = "RELAY_WORD_COUNT";
    pub const ENV_POLL_INTERVAL_MS: &'static str = "RELAY_POLL_INTERVAL_MS";
    pub const ENV_DISPATCH_DELAY_MS: &'static str = "RELAY_DISPATCH_DELAY_MS";

    /// Largest accepted word count. The whole blob is held in memory.
    pub const MAX_WORD_COUNT: usize = 10_000_000;

    /// Defaults overlaid with `RELAY_*` environment variables, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`RelayConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(Self::ENV_DATA_PATH).filter(|p| !p.is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(seed) = parse_var(&lookup, Self::ENV_SEED)? {
            config.seed = Some(seed);
        }
        if let Some(count) = parse_var(&lookup, Self::ENV_WORD_COUNT)? {
            config.word_count = count;
        }
        if let Some(ms) = parse_var(&lookup, Self::ENV_POLL_INTERVAL_MS)? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, Self::ENV_DISPATCH_DELAY_MS)? {
            config.dispatch_delay = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.start_length == 0 {
            return Err(ConfigError::ZeroStartLength);
        }
        if self.min_word_length == 0 || self.min_word_length > self.max_word_length {
            return Err(ConfigError::WordLengthRange {
                min: self.min_word_length,
                max: self.max_word_length,
            });
        }
        if self.alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        if self.word_count > Self::MAX_WORD_COUNT {
            return Err(ConfigError::WordCountTooLarge {
                count: self.word_count,
                max: Self::MAX_WORD_COUNT,
            });
        }
        Ok(())
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_dispatch_delay(mut self, dispatch_delay: Duration) -> Self {
        self.dispatch_delay = dispatch_delay;
        self
    }

    pub fn with_word_count(mut self, word_count: usize) -> Self {
        self.word_count = word_count;
        self
    }

    pub fn with_batch(mut self, start_length: usize, batch_size: usize) -> Self {
        self.start_length = start_length;
        self.batch_size = batch_size;
        self
    }

    pub fn generator(&self) -> WordGenerator {
        WordGenerator::new(self.word_count, self.min_word_length, self.max_word_length)
            .with_alphabet(&self.alphabet)
    }

    pub fn fan_out(&self) -> FanOutCounter {
        FanOutCounter::new(self.start_length, self.batch_size).with_dispatch_delay(self.dispatch_delay)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { var, value: raw })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_match_classic_run() {
        let config = RelayConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.dispatch_delay, Duration::from_millis(1));
        assert_eq!(config.fan_out().lengths(), 2..15);
        assert_eq!(config.word_count, 1000);
        assert_eq!((config.min_word_length, config.max_word_length), (3, 15));
        assert!(config.seed.is_none());
        assert!(config.data_path.ends_with("data.txt"));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("RELAY_DATA_PATH", "/tmp/relay/blob.txt"),
            ("RELAY_SEED", "99"),
            ("RELAY_WORD_COUNT", " 250 "),
            ("RELAY_POLL_INTERVAL_MS", "3"),
            ("RELAY_DISPATCH_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/tmp/relay/blob.txt"));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.word_count, 250);
        assert_eq!(config.poll_interval, Duration::from_millis(3));
        assert_eq!(config.dispatch_delay, Duration::ZERO);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config =
            RelayConfig::from_lookup(lookup(&[("RELAY_SEED", ""), ("RELAY_DATA_PATH", "")])).unwrap();
        assert!(config.seed.is_none());
        assert!(config.data_path.ends_with("data.txt"));
    }

    #[test]
    fn malformed_value_is_rejected() {
        let err = RelayConfig::from_lookup(lookup(&[("RELAY_SEED", "forty-two")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                var: "RELAY_SEED",
                value: "forty-two".to_string()
            }
        );
    }

    #[test]
    fn oversized_word_count_is_rejected() {
        let huge = usize::MAX.to_string();
        let err = RelayConfig::from_lookup(lookup(&[("RELAY_WORD_COUNT", huge.as_str())])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WordCountTooLarge {
                count: usize::MAX,
                max: RelayConfig::MAX_WORD_COUNT
            }
        );

        let at_limit = RelayConfig::default().with_word_count(RelayConfig::MAX_WORD_COUNT);
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn validation_catches_bad_ranges() {
        let base = RelayConfig::default();

        assert_eq!(
            base.clone().with_batch(2, 0).validate(),
            Err(ConfigError::EmptyBatch)
        );
        assert_eq!(
            base.clone().with_batch(0, 13).validate(),
            Err(ConfigError::ZeroStartLength)
        );

        let mut inverted = base.clone();
        inverted.min_word_length = 9;
        inverted.max_word_length = 4;
        assert_eq!(
            inverted.validate(),
            Err(ConfigError::WordLengthRange { min: 9, max: 4 })
        );

        let mut no_letters = base;
        no_letters.alphabet.clear();
        assert_eq!(no_letters.validate(), Err(ConfigError::EmptyAlphabet));
    }
}
