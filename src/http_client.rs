//! A small blocking HTTP client for grabbing HTML from source sites.
//!
//! This module can be disabled by building this crate without default features.

use crate::config::HttpConfig;
use crate::error::*;
use rand::Rng;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use serde::Serialize;
use std::io::Read;
use std::thread;
use std::time::Duration;

/// Fetches pages with the headers, timeout and pacing of an `HttpConfig`.
pub struct Downloader {
    client: Client,
    config: HttpConfig
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ErrorKind::InvalidConfig(format!("header value '{}'", value)).into())
}

impl Downloader {
    /// Create a HTTP client configured from `config`.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .gzip(true)
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Provide your own client for use by this struct.
    ///
    /// `config` is then only used for pacing between pages.
    #[inline]
    pub fn with_client(client: Client, config: HttpConfig) -> Self {
        Self {
            client,
            config
        }
    }

    #[inline]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Get the body of the given URL as a string.
    pub fn get_string(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let mut resp = check_status(self.client.get(url).send()?)?;
        let mut content = String::new();
        resp.read_to_string(&mut content)?;

        Ok(content)
    }

    /// Get the raw body of the given URL.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        let mut resp = check_status(self.client.get(url).send()?)?;
        let mut content = vec![];
        resp.read_to_end(&mut content)?;

        Ok(content)
    }

    /// POST a JSON body with bearer authentication and decode the JSON reply.
    pub fn post_json<B: Serialize>(&self, url: &str, bearer: &str, body: &B) -> Result<serde_json::Value> {
        debug!("POST {}", url);

        let resp = self.client
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()?;

        Ok(check_status(resp)?.json()?)
    }

    /// Sleeps for a random time within the configured page delay, to avoid
    /// hammering a site while following pagination.
    pub fn pause_between_pages(&self) {
        let (min, max) = self.config.page_delay_ms();

        if max == 0 {
            return;
        }

        let millis = rand::thread_rng().gen_range(min..=max);
        debug!("Waiting {}ms before the next page", millis);
        thread::sleep(Duration::from_millis(millis));
    }
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();

    if !status.is_success() {
        bail!(ErrorKind::NonSuccessStatus(status.as_u16()));
    }

    Ok(resp)
}
