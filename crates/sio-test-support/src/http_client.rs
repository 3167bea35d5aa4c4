use sio_protocol::{DecodedFrame, Message};

/// Drives the HTTP long-polling style transports (xhr-polling,
/// xhr-multipart, htmlfile, jsonp-polling) against a running gateway.
/// Thin wrapper over [`reqwest`]; every method decodes the raw wire bytes
/// it gets back so tests assert on [`Message`] values rather than bytes.
pub struct HttpTestClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// `GET` against an xhr-polling/xhr-multipart/htmlfile style endpoint
    /// and decodes whatever body comes back. A timed-out poll decodes to
    /// an empty vec, same as a genuinely empty response body.
    pub async fn get(&self, path: &str) -> Result<Vec<DecodedFrame>, Box<dyn std::error::Error>> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(format!("GET {path} -> {status}: {}", String::from_utf8_lossy(&body)).into());
        }
        if body.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sio_protocol::decode(&body)?)
    }

    /// Raw variant of [`Self::get`] returning the status and body
    /// untouched, for tests asserting on error status codes.
    pub async fn get_raw(&self, path: &str) -> Result<(u16, Vec<u8>), Box<dyn std::error::Error>> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }

    /// `POST`s a single already-encoded wire frame as the `data` form field.
    pub async fn post_raw(&self, path: &str, encoded: &[u8]) -> Result<(u16, String), Box<dyn std::error::Error>> {
        let data = String::from_utf8_lossy(encoded).into_owned();
        let response = self
            .client
            .post(self.url(path))
            .form(&[("data", data)])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Encodes `message` and posts it as a single frame.
    pub async fn post(&self, path: &str, message: Message) -> Result<(u16, String), Box<dyn std::error::Error>> {
        self.post_raw(path, &message.encode()).await
    }
}
