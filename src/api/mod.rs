//! Typed client for the remote attendance API.

mod span;

use crate::config;
use crate::matrix::AttendanceSource;
use crate::model::{
    AttendanceRecord, AttendanceSheet, BulkImport, ImportedStudent, NewStudent, Student,
    StudentId, StudentUpdate, Workshop, WorkshopForm, WorkshopId,
};
use anyhow::Context;
use chrono::NaiveDate;
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Response, StatusCode, Url};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use thiserror::Error;
use tracing::{debug, instrument, trace};

pub use span::ApiSpanBackend;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("server responded {status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl ApiError {
    /// The part of the error worth showing to a user: the server's own message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            e => e.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Prefers the `error` field of a JSON body, then the raw body, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_str(body) {
        return error;
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.chars().take(200).collect()
    }
}

async fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status,
        message: error_message(status, &body),
    })
}

pub struct ApiClient {
    reqwest: reqwest_middleware::ClientWithMiddleware,
    base_url: Url,
    limiter: DefaultDirectRateLimiter,
}

impl ApiClient {
    pub fn new(config: &config::Api) -> anyhow::Result<Self> {
        let rpm = NonZeroU32::new(config.rpm).context("api.rpm must be positive")?;
        let burst = NonZeroU32::new(config.max_burst).context("api.max_burst must be positive")?;

        let client = reqwest::ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .context("Building http client")?;

        Ok(ApiClient {
            reqwest: reqwest_middleware::ClientBuilder::new(client)
                .with(TracingMiddleware::<ApiSpanBackend>::new())
                .build(),
            base_url: config.base_url.clone(),
            limiter: RateLimiter::direct(Quota::per_minute(rpm).allow_burst(burst)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn send(
        &self,
        request: reqwest_middleware::RequestBuilder,
    ) -> Result<Response, ApiError> {
        self.limiter.until_ready().await;
        let res = request.send().await?;
        check_status(res).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let res = self.send(self.reqwest.get(url)).await?;
        Ok(res.json().await?)
    }

    async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), ApiError> {
        self.send(self.reqwest.post(url).json(body)).await?;
        Ok(())
    }

    async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), ApiError> {
        self.send(self.reqwest.put(url).json(body)).await?;
        Ok(())
    }

    async fn delete(&self, url: Url) -> Result<(), ApiError> {
        self.send(self.reqwest.delete(url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn workshops(&self) -> Result<Vec<Workshop>, ApiError> {
        let workshops: Vec<Workshop> = self.get(self.endpoint("talleres")?).await?;
        debug!("Loaded {} workshops", workshops.len());
        Ok(workshops)
    }

    #[instrument(skip(self))]
    pub async fn create_workshop(&self, form: &WorkshopForm) -> Result<(), ApiError> {
        self.post(self.endpoint("talleres")?, form).await
    }

    #[instrument(skip(self))]
    pub async fn update_workshop(&self, id: WorkshopId, form: &WorkshopForm) -> Result<(), ApiError> {
        self.put(self.endpoint(&format!("talleres/{}", id))?, form)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_workshop(&self, id: WorkshopId) -> Result<(), ApiError> {
        self.delete(self.endpoint(&format!("talleres/{}", id))?).await
    }

    #[instrument(skip(self))]
    pub async fn students(&self) -> Result<Vec<Student>, ApiError> {
        let students: Vec<Student> = self.get(self.endpoint("alumnos")?).await?;
        debug!("Loaded {} students", students.len());
        Ok(students)
    }

    #[instrument(skip(self))]
    pub async fn create_student(&self, student: &NewStudent) -> Result<(), ApiError> {
        self.post(self.endpoint("alumnos")?, student).await
    }

    #[instrument(skip(self))]
    pub async fn update_student(&self, id: StudentId, update: &StudentUpdate) -> Result<(), ApiError> {
        self.put(self.endpoint(&format!("alumnos/{}", id))?, update)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_student(&self, id: StudentId) -> Result<(), ApiError> {
        self.delete(self.endpoint(&format!("alumnos/{}", id))?).await
    }

    #[instrument(skip(self, students), fields(count = students.len()))]
    pub async fn import_students(&self, students: &[ImportedStudent]) -> Result<(), ApiError> {
        self.post(self.endpoint("alumnos/bulk")?, &BulkImport { students })
            .await
    }

    #[instrument(skip(self))]
    pub async fn enroll(&self, student: StudentId, workshop: WorkshopId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("alumnos/{}/talleres/{}", student, workshop))?;
        self.send(self.reqwest.post(url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unenroll(&self, student: StudentId, workshop: WorkshopId) -> Result<(), ApiError> {
        self.delete(self.endpoint(&format!("alumnos/{}/talleres/{}", student, workshop))?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_attendance(
        &self,
        workshop: WorkshopId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        trace!("Fetching attendance of {} on {}", workshop, date);

        let request = self
            .reqwest
            .get(self.endpoint("asistencias")?)
            .query(&attendance_query(workshop, date));
        let res = self.send(request).await?;
        Ok(res.json().await?)
    }

    #[instrument(skip(self, sheet), fields(taller_id = %sheet.workshop_id, fecha = %sheet.date))]
    pub async fn save_attendance(&self, sheet: &AttendanceSheet) -> Result<(), ApiError> {
        self.post(self.endpoint("asistencias")?, sheet).await
    }
}

impl AttendanceSource for ApiClient {
    fn attendance(
        &self,
        workshop: WorkshopId,
        date: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<AttendanceRecord>, ApiError>> {
        Box::pin(self.fetch_attendance(workshop, date))
    }
}

/// Query pairs of `GET /asistencias`; the date goes out as `YYYY-MM-DD`.
fn attendance_query(workshop: WorkshopId, date: NaiveDate) -> [(&'static str, String); 2] {
    [
        ("taller_id", workshop.to_string()),
        ("fecha", date.format("%Y-%m-%d").to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn attendance_query_uses_iso_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let request = reqwest::Client::new()
            .get("http://localhost:3000/api/asistencias")
            .query(&attendance_query(WorkshopId(1), date))
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("taller_id=1&fecha=2025-02-03"));
    }

    #[test]
    fn prefers_server_error_field() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error": "fecha inválida"}"#),
            "fecha inválida"
        );
    }

    #[test]
    fn falls_back_to_body_then_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down\n"),
            "upstream down"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }

    #[test]
    fn user_message_hides_status_prefix() {
        let e = ApiError::Status {
            status: StatusCode::CONFLICT,
            message: "ya existe".into(),
        };
        assert_eq!(e.user_message(), "ya existe");
        assert_eq!(e.to_string(), "server responded 409 Conflict: ya existe");
    }

    #[test]
    fn builds_endpoints_under_base_path() {
        let mut api = config::Api::with_base_url(
            config::parse_base_url("http://localhost:3000/api").unwrap(),
        );
        api.timeout = Duration::from_secs(1);
        let client = ApiClient::new(&api).unwrap();

        assert_eq!(
            client.endpoint("alumnos/4/talleres/2").unwrap().as_str(),
            "http://localhost:3000/api/alumnos/4/talleres/2"
        );
    }

    #[test]
    fn rejects_zero_rate() {
        let mut api = config::Api::with_base_url(Url::parse("http://localhost/").unwrap());
        api.rpm = 0;
        assert!(ApiClient::new(&api).is_err());
    }
}
