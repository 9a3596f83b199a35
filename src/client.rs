use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::ClientError;
use crate::models::{ApplicationRecord, ApplicationStatus, MessageBody, NewApplication, StatusUpdate};

/// Blocking client for the `/api/applications` endpoints.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn list(&self) -> Result<Vec<ApplicationRecord>, ClientError> {
        let response = self.client.get(&self.base_url).send()?;
        let response = check(response, None)?;
        Ok(response.json()?)
    }

    /// Like `list`, but any failure yields an empty collection.
    pub fn fetch_applications(&self) -> Vec<ApplicationRecord> {
        match self.list() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, url = %self.base_url, "Error fetching applications");
                Vec::new()
            }
        }
    }

    pub fn create(&self, app: &NewApplication) -> Result<ApplicationRecord, ClientError> {
        let response = self.client.post(&self.base_url).json(app).send()?;
        let response = check(response, None)?;
        Ok(response.json()?)
    }

    pub fn update_status(
        &self,
        id: &str,
        status: &ApplicationStatus,
    ) -> Result<ApplicationRecord, ClientError> {
        let body = StatusUpdate {
            status: status.clone(),
        };
        let response = self
            .client
            .put(self.item_url(id))
            .json(&body)
            .send()?;
        let response = check(response, Some(id))?;
        Ok(response.json()?)
    }

    pub fn delete(&self, id: &str) -> Result<String, ClientError> {
        let response = self.client.delete(self.item_url(id)).send()?;
        let response = check(response, Some(id))?;
        let body: MessageBody = response.json()?;
        Ok(body.message)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

fn check(response: Response, id: Option<&str>) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<MessageBody>()
        .map(|b| b.message)
        .unwrap_or_else(|_| status.to_string());

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(ClientError::NotFound(id.to_string())),
        _ => Err(ClientError::Status {
            status: status.as_u16(),
            message,
        }),
    }
}
