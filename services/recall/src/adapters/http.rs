//! services/recall/src/adapters/http.rs
//!
//! The HTTP adapter, the concrete implementation of the `NotesGateway` port.
//! Every call goes through one request pipeline that attaches the bearer
//! credential, classifies failures into `PortError`s and unwraps the response
//! envelope. No request is retried here.

use async_trait::async_trait;
use recall_core::domain::{
    AiSummary, AuthToken, Category, Credentials, Note, NoteFilter, NoteInput, NoteListItem,
    Registration, ReviewOutcome, ReviewSubmission, ReviewTask, User,
};
use recall_core::ports::{NotesGateway, PortError, PortResult};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapters::wire::{
    AiSummaryRecord, CategoryBody, CategoryRecord, Envelope, LoginBody, LoginRecord, NoteBody,
    NoteListItemRecord, NoteRecord, RegisterBody, ReviewOutcomeRecord, SubmitReviewBody,
    SummarizeBody, TaskRecord, UserRecord,
};
use crate::session::SessionStore;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the `NotesGateway` port.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpGateway {
    /// Creates a new `HttpGateway` rooted at `base_url` (e.g. `http://host/api`).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json")
    }

    //=====================================================================================
    // Request Pipeline
    //=====================================================================================

    /// Sends a request and returns the successful response, or the classified failure.
    async fn dispatch(&self, request: RequestBuilder) -> PortResult<Response> {
        let token = self.session.token()?;
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!("Request failed without a response: {}", e);
            PortError::Network(if e.is_timeout() {
                "The request timed out".to_string()
            } else {
                "Network error, please check your connection".to_string()
            })
        })?;

        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(self.reject(status.as_u16(), message));
        }

        Ok(response)
    }

    /// Turns a failing status into a `PortError`. A 401 also ends the session.
    fn reject(&self, status: u16, message: Option<String>) -> PortError {
        if status == StatusCode::UNAUTHORIZED.as_u16() {
            self.session.mark_unauthorized();
        }
        classify(status, message.filter(|m| !m.trim().is_empty()))
    }

    /// Sends a request and unwraps the `data` field of the response envelope.
    /// The envelope `code` is authoritative even inside a 2xx response.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let response = self.dispatch(request).await?;
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("malformed response body: {}", e))
        })?;

        if envelope.code >= 400 {
            return Err(match u16::try_from(envelope.code) {
                Ok(code) => self.reject(code, envelope.message),
                Err(_) => PortError::Unexpected(envelope.message.unwrap_or_else(|| {
                    format!("Unexpected response code {}", envelope.code)
                })),
            });
        }
        self.session.confirm();

        envelope
            .data
            .ok_or_else(|| PortError::Unexpected("response carried no data".to_string()))
    }

    /// Sends a request whose success carries no payload (e.g. 204 No Content).
    async fn execute(&self, request: RequestBuilder) -> PortResult<()> {
        self.dispatch(request).await?;
        self.session.confirm();
        Ok(())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.request(method, path).json(body)).await
    }
}

/// Maps a failing status to the domain taxonomy, preferring the server's own message.
fn classify(status: u16, message: Option<String>) -> PortError {
    let or = |fallback: &str| message.clone().unwrap_or_else(|| fallback.to_string());
    match status {
        401 => PortError::Unauthorized,
        403 => PortError::Forbidden(or("You do not have permission to access this resource")),
        404 => PortError::NotFound(or("The requested resource does not exist")),
        409 => PortError::Conflict(or("The operation conflicts with existing data")),
        400 | 422 => PortError::BadRequest(or("The request was rejected")),
        500..=599 => PortError::Server(or("Server error, please try again later")),
        other => PortError::Unexpected(or(&format!("Unexpected response status {}", other))),
    }
}

//=========================================================================================
// The `NotesGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotesGateway for HttpGateway {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthToken> {
        let body = LoginBody {
            username: &credentials.username,
            password: &credentials.password,
        };
        let record: LoginRecord = self.send_json(Method::POST, "/auth/login", &body).await?;
        Ok(record.to_domain())
    }

    async fn register(&self, registration: &Registration) -> PortResult<User> {
        let body = RegisterBody {
            username: &registration.username,
            password: &registration.password,
            email: &registration.email,
        };
        let record: UserRecord = self.send_json(Method::POST, "/auth/register", &body).await?;
        Ok(record.to_domain())
    }

    async fn list_notes(&self, filter: NoteFilter) -> PortResult<Vec<NoteListItem>> {
        let request = self.request(Method::GET, "/notes");
        let request = match filter {
            NoteFilter::All => request,
            NoteFilter::Category(id) => request.query(&[("categoryId", id)]),
            // The backend reads category 0 as "no category".
            NoteFilter::Uncategorized => request.query(&[("categoryId", 0)]),
        };
        let records: Vec<NoteListItemRecord> = self.fetch(request).await?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_note(&self, note_id: i64) -> PortResult<Note> {
        let record: NoteRecord = self
            .fetch(self.request(Method::GET, &format!("/notes/{}", note_id)))
            .await?;
        record.to_domain()
    }

    async fn create_note(&self, input: &NoteInput) -> PortResult<Note> {
        let record: NoteRecord = self
            .send_json(Method::POST, "/notes", &NoteBody::from(input))
            .await?;
        record.to_domain()
    }

    async fn update_note(&self, note_id: i64, input: &NoteInput) -> PortResult<Note> {
        let record: NoteRecord = self
            .send_json(
                Method::PUT,
                &format!("/notes/{}", note_id),
                &NoteBody::from(input),
            )
            .await?;
        record.to_domain()
    }

    async fn delete_note(&self, note_id: i64) -> PortResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/notes/{}", note_id)))
            .await
    }

    async fn summarize_note(&self, note_id: i64) -> PortResult<AiSummary> {
        let record: AiSummaryRecord = self
            .send_json(Method::POST, "/ai/summarize", &SummarizeBody { note_id })
            .await?;
        record.to_domain()
    }

    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let records: Vec<CategoryRecord> =
            self.fetch(self.request(Method::GET, "/categories")).await?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn create_category(&self, name: &str) -> PortResult<Category> {
        let record: CategoryRecord = self
            .send_json(Method::POST, "/categories", &CategoryBody { name })
            .await?;
        record.to_domain()
    }

    async fn update_category(&self, category_id: i64, name: &str) -> PortResult<Category> {
        let record: CategoryRecord = self
            .send_json(
                Method::PUT,
                &format!("/categories/{}", category_id),
                &CategoryBody { name },
            )
            .await?;
        record.to_domain()
    }

    async fn delete_category(&self, category_id: i64) -> PortResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/categories/{}", category_id)))
            .await
    }

    async fn today_tasks(&self) -> PortResult<Vec<ReviewTask>> {
        let records: Vec<TaskRecord> = self.fetch(self.request(Method::GET, "/tasks/today")).await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn submit_review(&self, submission: &ReviewSubmission) -> PortResult<ReviewOutcome> {
        let record: ReviewOutcomeRecord = self
            .send_json(
                Method::POST,
                "/reviews/submit",
                &SubmitReviewBody::from(submission),
            )
            .await?;
        Ok(record.to_domain())
    }
}
