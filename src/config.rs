use std::time::Duration;

use crate::error::{GraphError, Result};
use crate::layout::LayoutConfig;
use crate::source::GraphSource;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings shared by the controller and the HTTP client.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_url: String,
    /// Start against the live backend instead of the fixture.
    pub live: bool,
    pub debounce: Duration,
    pub request_timeout: Duration,
    pub layout: LayoutConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            live: false,
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            layout: LayoutConfig::default(),
        }
    }
}

impl Settings {
    pub fn validate(self) -> Result<Self> {
        if self.api_url.trim().is_empty() {
            return Err(GraphError::InvalidConfig("API URL must not be empty".to_owned()));
        }
        if self.request_timeout.is_zero() {
            return Err(GraphError::InvalidConfig(
                "request timeout must be positive".to_owned(),
            ));
        }
        let layout = &self.layout;
        if layout.width <= layout.padding * 2.0 || layout.height <= layout.padding * 2.0 {
            return Err(GraphError::InvalidConfig(format!(
                "canvas {}x{} leaves no room inside a padding of {}",
                layout.width, layout.height, layout.padding
            )));
        }
        Ok(self)
    }

    /// Builds the source for the requested mode.
    pub fn source(&self, live: bool) -> Result<GraphSource> {
        if live {
            GraphSource::remote(&self.api_url, self.request_timeout)
        } else {
            Ok(GraphSource::fixture())
        }
    }

    pub fn initial_source(&self) -> Result<GraphSource> {
        self.source(self.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_start_on_fixture() {
        let settings = Settings::default().validate().unwrap();
        assert_eq!(settings.debounce, Duration::from_millis(300));
        assert!(!settings.initial_source().unwrap().is_remote());
        assert!(settings.source(true).unwrap().is_remote());
    }

    #[test]
    fn rejects_unusable_values() {
        let empty_url = Settings {
            api_url: " ".to_owned(),
            ..Settings::default()
        };
        assert!(empty_url.validate().is_err());

        let no_timeout = Settings {
            request_timeout: Duration::ZERO,
            ..Settings::default()
        };
        assert!(no_timeout.validate().is_err());

        let mut cramped = Settings::default();
        cramped.layout.padding = 700.0;
        assert!(cramped.validate().is_err());
    }
}
