//! API Config

use clap::Args;
use reqwest::Url;

use crate::{config::ConfigError, remote::CartsApiConfig};

/// Remote cart service settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront REST API
    #[arg(
        long,
        env = "ROUGE_API_URL",
        default_value = "http://localhost:8080/api",
        global = true
    )]
    pub api_url: String,
}

impl ApiConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason,
        };

        let url = Url::parse(&self.api_url).map_err(|error| invalid(error.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(format!("unsupported scheme {scheme:?}"))),
        }
    }
}

impl From<&ApiConfig> for CartsApiConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ApiConfig {
        ApiConfig {
            api_url: url.to_string(),
        }
    }

    #[test]
    fn accepts_http_and_https_urls() {
        assert!(config("http://localhost:8080/api").validate().is_ok());
        assert!(config("https://shop.example/api/").validate().is_ok());
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        assert!(matches!(
            config("/api").validate(),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            config("ftp://shop.example").validate(),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
    }
}
