//! HTTP client wrapper for the SciTech search endpoint.
//!
//! Requests are issued once; transient failures surface to the caller, which
//! owns any retry policy.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::config::FetcherConfig;
use crate::error::Result;

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("scitech-harvester/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` with the configured timeout and user agent.
pub fn create_client(config: &FetcherConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GET a URL and return the response body.
///
/// Non-success status codes are turned into errors.
pub fn download_bytes(client: &Client, url: Url) -> reqwest::Result<Vec<u8>> {
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

/// Decode a payload as UTF-8, replacing invalid sequences.
///
/// Logs a warning naming `context` when replacement was necessary.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            tracing::warn!(context, "Invalid UTF-8 replaced while decoding");
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_bytes_to_string_valid() {
        assert_eq!(bytes_to_string("Fusión".as_bytes(), "test"), "Fusión");
    }

    #[test]
    fn test_bytes_to_string_lossy() {
        let decoded = bytes_to_string(&[b'a', 0xff, b'b'], "test");
        assert_eq!(decoded, "a\u{fffd}b");
    }
}
