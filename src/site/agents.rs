//! User-Agent rotation

use crate::config::UserAgentConfig;
use crate::ConfigError;
use rand::seq::SliceRandom;

/// A non-empty pool of `User-Agent` header values
///
/// Every request draws one entry uniformly at random.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Builds a pool, rejecting an empty list
    pub fn new(agents: Vec<String>) -> Result<Self, ConfigError> {
        if agents.is_empty() {
            return Err(ConfigError::Validation(
                "user-agent pool cannot be empty".to_string(),
            ));
        }
        Ok(Self { agents })
    }

    /// Builds the pool described by the `[user-agent]` config section
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, ConfigError> {
        Self::new(config.pool.clone())
    }

    /// Picks one agent uniformly at random
    pub fn pick(&self) -> &str {
        let mut rng = rand::thread_rng();
        self.agents
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or(self.agents[0].as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
