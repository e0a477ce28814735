use crate::config::ClientConfig;
use crate::error::TransportError;
use std::time::Duration;
use tracing::{debug, info};

// "Send bytes, get bytes back". Implementations own connection handling,
// TLS and any retry policy; the services never retry.
pub trait Transport {
    fn send(&self, body: &str) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        (**self).send(body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        (**self).send(body)
    }
}

// Form-posts the document as `xml_in` with basic auth
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
    user_id: String,
    password: String,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(url: &str, config: &ClientConfig) -> Result<Self, TransportError> {
        if url.trim().is_empty() {
            return Err(TransportError::InvalidConfig("empty endpoint URL".to_string()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            user_id: config.user_id.clone(),
            password: config.password.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        debug!(url = %self.url, bytes = body.len(), "posting request");

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user_id, Some(&self.password))
            .form(&[("xml_in", body)])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout_ms)
                } else {
                    TransportError::from(e)
                }
            })?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        info!(url = %self.url, status = status.as_u16(), bytes = text.len(), "reply received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_url() {
        let config = ClientConfig::new("acme", "secret");
        assert!(matches!(
            HttpTransport::new("  ", &config),
            Err(TransportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builds_for_configured_endpoint() {
        let config = ClientConfig::new("acme", "secret");
        let transport = HttpTransport::new(&config.tracking_url, &config).unwrap();
        assert_eq!(transport.url(), crate::config::DEFAULT_TRACKING_URL);
    }
}
