//! Cloud logging adapter.
//!
//! Implements [`UploadPort`] as a single HTTP GET against the channel's
//! update endpoint, with the API key and eight numeric fields in the query
//! string (see [`crate::upload`]).  Any 2xx counts as accepted.
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in an
//!   `embedded_svc` client, TLS via the ESP-IDF certificate bundle.
//! - **other targets**: the request URL is logged and kept for inspection.

use log::{debug, info};

use crate::app::ports::{UploadError, UploadPort};
use crate::config::StationConfig;
use crate::radio::Reading;
use crate::upload::{UploadRecord, request_url};

#[cfg(target_os = "espidf")]
const TIMEOUT_MS: u64 = 10_000;

pub struct HttpUploader {
    base_url: String,
    api_key: String,
    #[cfg(not(target_os = "espidf"))]
    sent: Vec<String>,
}

impl HttpUploader {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            base_url: config.upload_url.clone(),
            api_key: config.upload_api_key.clone(),
            #[cfg(not(target_os = "espidf"))]
            sent: Vec::new(),
        }
    }

    /// URLs "sent" so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    #[cfg(target_os = "espidf")]
    fn get(&mut self, url: &str) -> Result<(), UploadError> {
        use embedded_svc::http::Method;
        use embedded_svc::http::client::Client;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conf = Configuration {
            timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&conf).map_err(|e| {
            log::warn!("Upload: connection setup failed: {}", e);
            UploadError::Transport
        })?;
        let mut client = Client::wrap(connection);
        let response = client
            .request(Method::Get, url, &[])
            .and_then(|req| req.submit())
            .map_err(|e| {
                log::warn!("Upload: request failed: {:?}", e);
                UploadError::Transport
            })?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(UploadError::Status(status));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn get(&mut self, url: &str) -> Result<(), UploadError> {
        info!("Upload(sim): GET {}", url);
        self.sent.push(url.to_owned());
        Ok(())
    }
}

impl UploadPort for HttpUploader {
    fn publish(&mut self, reading: &Reading) -> Result<(), UploadError> {
        if self.api_key.is_empty() {
            return Err(UploadError::Disabled);
        }
        let record = UploadRecord::from(reading);
        let url = request_url(&self.base_url, &self.api_key, &record);
        debug!("Upload: {}", record.query());
        self.get(&url)
    }
}
