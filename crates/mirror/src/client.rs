use crate::{
    error::MirrorError,
    types::{ApiError, MirrorRecord, NewCertificate},
};
use reqwest::{StatusCode, Url};

/// HTTP client for a mirror server.
#[derive(Clone, Debug)]
pub struct MirrorClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl MirrorClient {
    /// Creates a client for the mirror at `base_url`, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(base_url)?.join("/api/certificates")?;
        Ok(Self { http: reqwest::Client::new(), endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetches every mirrored record.
    pub async fn list(&self) -> Result<Vec<MirrorRecord>, MirrorError> {
        let resp = self.http.get(self.endpoint.clone()).send().await?;
        let resp = check(resp, None).await?;
        Ok(resp.json().await?)
    }

    /// Stores `new`, returning the stored record.
    pub async fn create(&self, new: &NewCertificate) -> Result<MirrorRecord, MirrorError> {
        let resp = self.http.post(self.endpoint.clone()).json(new).send().await?;
        let resp = check(resp, Some(&new.certificate_id)).await?;
        Ok(resp.json().await?)
    }
}

async fn check(
    resp: reqwest::Response,
    certificate_id: Option<&str>,
) -> Result<reqwest::Response, MirrorError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if let (StatusCode::CONFLICT, Some(certificate_id)) = (status, certificate_id) {
        return Err(MirrorError::Duplicate { certificate_id: certificate_id.to_string() });
    }
    let body = resp.text().await.unwrap_or_default();
    let (message, field) = match serde_json::from_str::<ApiError>(&body) {
        Ok(err) => (err.message, err.field),
        Err(_) => (body, None),
    };
    Err(MirrorError::Status { status: status.as_u16(), message, field })
}
