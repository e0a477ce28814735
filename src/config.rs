use crate::error::{ConfigError, ServiceError};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_TRACKING_URL: &str = "https://express.tnt.com/expressconnect/track.do";
pub const DEFAULT_SHIPPING_URL: &str = "https://express.tnt.com/expressconnect/shipping/ship";

// Credentials and account context shared by both services
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_id: String,
    pub password: String,
    pub account_number: String,
    pub account_country_code: String,
    pub origin_country_code: String,
    pub tracking_url: String,
    pub shipping_url: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            password: String::new(),
            account_number: String::new(),
            account_country_code: String::new(),
            origin_country_code: String::new(),
            tracking_url: DEFAULT_TRACKING_URL.to_string(),
            shipping_url: DEFAULT_SHIPPING_URL.to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn new(user_id: &str, password: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    pub fn with_account(mut self, number: &str, country_code: &str) -> Self {
        self.account_number = number.to_string();
        self.account_country_code = country_code.to_string();
        self
    }

    pub fn with_origin_country(mut self, country_code: &str) -> Self {
        self.origin_country_code = country_code.to_string();
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn require_account(&self) -> Result<(&str, &str), ServiceError> {
        let number = require(&self.account_number, "account_number")?;
        let country = require(&self.account_country_code, "account_country_code")?;
        Ok((number, country))
    }

    pub fn require_origin(&self) -> Result<&str, ServiceError> {
        require(&self.origin_country_code, "origin_country_code")
    }

    pub fn require_login(&self) -> Result<(&str, &str), ServiceError> {
        let user = require(&self.user_id, "user_id")?;
        let password = require(&self.password, "password")?;
        Ok((user, password))
    }
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::MissingConfiguration(field))
    } else {
        Ok(value)
    }
}
