//! Typed client for the `/api/v1` endpoints.
//!
//! Each call is one POST with a JSON body and one JSON response, the same
//! exchange the browser front end performs.

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{
    LeapMonthPossibleRequest, LeapMonthPossibleResponse, LunarBirthdayCalendarRequest,
    LunarBirthdayCalendarResponse, LunarBirthdayForYearRequest, LunarBirthdayForYearResponse,
    SolarToLunarRequest, SolarToLunarResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status; `body` is the raw response text.
    #[error("Server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { http, base_url }
    }

    pub async fn lunar_birthday_for_year(
        &self,
        req: &LunarBirthdayForYearRequest,
    ) -> ClientResult<LunarBirthdayForYearResponse> {
        self.post("lunar-birthday-for-year/", req).await
    }

    pub async fn solar_to_lunar(&self, req: &SolarToLunarRequest) -> ClientResult<SolarToLunarResponse> {
        self.post("solar-to-lunar/", req).await
    }

    pub async fn lunar_birthday_calendar(
        &self,
        req: &LunarBirthdayCalendarRequest,
    ) -> ClientResult<LunarBirthdayCalendarResponse> {
        self.post("lunar-birthday-calendar/", req).await
    }

    pub async fn leap_month_possible(
        &self,
        req: &LeapMonthPossibleRequest,
    ) -> ClientResult<LeapMonthPossibleResponse> {
        self.post("leap-month-possible/", req).await
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/v1/{}", self.base_url, endpoint);
        tracing::debug!("POST {}", url);

        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(ClientError::Status { status, body });
        }

        Ok(resp.json::<R>().await?)
    }
}
