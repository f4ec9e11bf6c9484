// Duffel API client: create a one-way offer request, then list the computed
// offers. Two network calls per quote, which is what makes the quote cache
// worthwhile.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ScanConfig;
use crate::offer::{CabinClass, CreatedOfferRequest, Offer, OfferList, OfferRequestBody};

pub const DUFFEL_BASE_URL: &str = "https://api.duffel.com";
const DUFFEL_VERSION: &str = "v2";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream request failed with status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    Decode(String),
}

// Seam for quoting a one-way itinerary. The grid search depends on this
// trait so tests can substitute a fixed offer universe.
#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn quote_one_way(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        cabin: CabinClass,
    ) -> Result<Vec<Offer>, ApiError>;
}

pub struct DuffelClient {
    base_url: String,
    token: String,
    offer_limit: u32,
    client: reqwest::Client,
}

impl DuffelClient {
    pub fn new(config: &ScanConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: DUFFEL_BASE_URL.to_string(),
            token: config.duffel_token.clone(),
            offer_limit: config.offer_limit,
            client,
        })
    }

    // Point the client at a different host. Tests use this to target a
    // local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn create_offer_request(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        cabin: CabinClass,
    ) -> Result<String, ApiError> {
        let body = OfferRequestBody::one_way(origin, destination, date, cabin);
        let response = self
            .client
            .post(format!("{}/air/offer_requests", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Duffel-Version", DUFFEL_VERSION)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let created: CreatedOfferRequest = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(created.data.id)
    }

    async fn list_offers(&self, offer_request_id: &str) -> Result<Vec<Offer>, ApiError> {
        let limit = self.offer_limit.to_string();
        let response = self
            .client
            .get(format!("{}/air/offers", self.base_url))
            .query(&[
                ("offer_request_id", offer_request_id),
                ("limit", limit.as_str()),
            ])
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Duffel-Version", DUFFEL_VERSION)
            .send()
            .await?;
        let response = check_status(response).await?;

        let offers: OfferList = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(offers.data)
    }
}

#[async_trait]
impl OfferSource for DuffelClient {
    async fn quote_one_way(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        cabin: CabinClass,
    ) -> Result<Vec<Offer>, ApiError> {
        let request_id = self
            .create_offer_request(origin, destination, date, cabin)
            .await?;
        self.list_offers(&request_id).await
    }
}

// Preserve the response body on failure; it is the only diagnostic the
// provider gives for rejected searches.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(status = status.as_u16(), %body, "duffel request failed");
    Err(ApiError::UpstreamStatus {
        status: status.as_u16(),
        body,
    })
}
