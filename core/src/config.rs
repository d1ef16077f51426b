/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fluxwire.
 *
 * Fluxwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fluxwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fluxwire.  If not, see <http://www.gnu.org/licenses/>.
 */

//! HTTP engine settings: receive buffer bound and connect/write/response deadlines.
//! Serializable so an embedding application can keep them in its own JSON configuration;
//! missing fields take their defaults. A timeout of `null` disables that deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upper bound for one buffered response (status line, headers and body).
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 32 * 1024 * 1024;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 30_000;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Settings shared by every request an `HttpClient` makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Largest response accepted, in bytes; beyond this the call fails with `ResponseTooLarge`.
    pub max_response_size: usize,
    pub connect_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
    /// Deadline for the whole receive phase, from the first read to the last.
    pub response_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            connect_timeout_ms: Some(DEFAULT_CONNECT_TIMEOUT_MS),
            write_timeout_ms: Some(DEFAULT_WRITE_TIMEOUT_MS),
            response_timeout_ms: Some(DEFAULT_RESPONSE_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// No deadlines at all: a silent peer blocks the call until it closes the connection.
    pub fn unbounded() -> Self {
        Self {
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            connect_timeout_ms: None,
            write_timeout_ms: None,
            response_timeout_ms: None,
        }
    }

    /// Parse from JSON, e.g. `{"max_response_size": 1048576, "response_timeout_ms": null}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_response_size == 0 {
            return Err(ConfigError::Invalid("max_response_size must be greater than zero"));
        }
        if [self.connect_timeout_ms, self.write_timeout_ms, self.response_timeout_ms].contains(&Some(0)) {
            return Err(ConfigError::Invalid("timeouts must be positive or null"));
        }
        Ok(())
    }

    pub fn with_max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout_ms = timeout.map(duration_to_ms);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout_ms = timeout.map(duration_to_ms);
        self
    }

    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout_ms = timeout.map(duration_to_ms);
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

/// Millisecond resolution, rounded up so a sub-millisecond timeout does not become zero.
fn duration_to_ms(d: Duration) -> u64 {
    let ms = d.as_millis();
    let ms = if Duration::from_millis(ms as u64) < d { ms + 1 } else { ms };
    u64::try_from(ms).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let c = ClientConfig::from_json(r#"{"max_response_size": 1024}"#).unwrap();
        assert_eq!(c.max_response_size, 1024);
        assert_eq!(c.connect_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(c.response_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn null_disables_timeout() {
        let c = ClientConfig::from_json(r#"{"response_timeout_ms": null}"#).unwrap();
        assert_eq!(c.response_timeout(), None);
        assert_eq!(c.write_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_zero_limit_and_zero_timeouts() {
        assert!(matches!(
            ClientConfig::from_json(r#"{"max_response_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ClientConfig::from_json(r#"{"connect_timeout_ms": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(ClientConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn builders_round_up_to_millis() {
        let c = ClientConfig::unbounded().with_response_timeout(Some(Duration::from_micros(1500)));
        assert_eq!(c.response_timeout_ms, Some(2));
        assert_eq!(c.connect_timeout(), None);
    }

    #[test]
    fn serializes_back_to_json() {
        let c = ClientConfig::default().with_max_response_size(4096);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(ClientConfig::from_json(&json).unwrap(), c);
    }
}
