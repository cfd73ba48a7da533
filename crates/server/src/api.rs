//! JSON API under `/api`.
//!
//! - `GET    /api/`                             service banner
//! - `POST   /api/chat`                         one chat turn
//! - `POST   /api/leads`, `GET /api/leads`      manual entry and listing
//! - `PATCH  /api/leads/{id}/status?status=`    status change
//! - `DELETE /api/leads/{id}`
//! - `GET    /api/stats`                        lead counts by status
//! - `POST   /api/email/send-quote?lead_id=`    simulated quote email
//! - `POST   /api/email/send-review-request?lead_id=`
//! - `GET    /api/email/logs?lead_id=`
//! - `GET    /api/email/preview/{lead_id}`
//! - `POST   /api/sms/send?lead_id=`            simulated SMS

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use leadbot_agent::{AgentRuntime, ChatReply, EmailPreview, LeadDesk};
use leadbot_core::domain::email::EmailLog;
use leadbot_core::domain::lead::{Lead, LeadId, LeadStats, NewLead};
use leadbot_core::domain::session::SessionId;
use leadbot_core::errors::{ApplicationError, InterfaceError};

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<AgentRuntime>,
    desk: Arc<LeadDesk>,
}

impl ApiState {
    pub fn new(runtime: Arc<AgentRuntime>, desk: Arc<LeadDesk>) -> Self {
        Self { runtime, desk }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/chat", post(chat))
        .route("/api/leads", post(create_lead).get(list_leads))
        .route("/api/leads/{id}", delete(delete_lead))
        .route("/api/leads/{id}/status", patch(update_lead_status))
        .route("/api/stats", get(stats))
        .route("/api/email/send-quote", post(send_quote))
        .route("/api/email/send-review-request", post(send_review_request))
        .route("/api/email/logs", get(email_logs))
        .route("/api/email/preview/{lead_id}", get(preview_emails))
        .route("/api/sms/send", post(send_sms))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct LeadQuery {
    pub lead_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailLogQuery {
    pub lead_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceBanner {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusUpdated {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailSent {
    pub message: String,
    pub lead_id: String,
    pub email: EmailLog,
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SmsSent {
    pub message: String,
    pub lead_id: String,
    pub sms_sent: bool,
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub correlation_id: String,
}

const EMAIL_NOTE: &str = "Email delivery is simulated; the message is recorded in the email log.";
const SMS_NOTE: &str = "SMS delivery is simulated; only the lead flag is updated.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    fn malformed(rejection: JsonRejection, correlation_id: &str) -> Self {
        Self(InterfaceError::BadRequest {
            message: rejection.body_text(),
            correlation_id: correlation_id.to_string(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let interface = self.0;
        let (status, detail) = match &interface {
            InterfaceError::BadRequest { message, .. } => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, interface.user_message().to_string())
            }
            InterfaceError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, interface.user_message().to_string())
            }
        };

        if status.is_server_error() {
            error!(
                event_name = "api.request.failed",
                correlation_id = %interface.correlation_id(),
                error = %interface,
                "request failed"
            );
        } else {
            warn!(
                event_name = "api.request.rejected",
                correlation_id = %interface.correlation_id(),
                error = %interface,
                "request rejected"
            );
        }

        let body =
            ErrorBody { detail, correlation_id: interface.correlation_id().to_string() };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn correlation_id() -> String {
    format!("req-{}", Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        message: "Add Power Electrics Chatbot API".to_string(),
        status: "online".to_string(),
    })
}

async fn chat(
    State(state): State<ApiState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatReply> {
    let correlation_id = correlation_id();
    let Json(request) = body.map_err(|rejection| ApiError::malformed(rejection, &correlation_id))?;

    let session_id = SessionId(request.session_id);
    let reply = state
        .runtime
        .handle_message(&correlation_id, &session_id, &request.message)
        .await
        .map_err(|error| ApiError::application(error.into(), &correlation_id))?;
    Ok(Json(reply))
}

async fn create_lead(
    State(state): State<ApiState>,
    body: Result<Json<NewLead>, JsonRejection>,
) -> ApiResult<Lead> {
    let correlation_id = correlation_id();
    let Json(draft) = body.map_err(|rejection| ApiError::malformed(rejection, &correlation_id))?;

    let lead = state
        .desk
        .create(&correlation_id, draft)
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(lead))
}

async fn list_leads(State(state): State<ApiState>) -> ApiResult<Vec<Lead>> {
    let correlation_id = correlation_id();
    let leads =
        state.desk.list().await.map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(leads))
}

async fn update_lead_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<StatusUpdated> {
    let correlation_id = correlation_id();
    let status = state
        .desk
        .update_status(&correlation_id, &LeadId(id), &query.status)
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;

    Ok(Json(StatusUpdated {
        message: "Status updated".to_string(),
        status: status.as_str().to_string(),
    }))
}

async fn delete_lead(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let correlation_id = correlation_id();
    state
        .desk
        .delete(&correlation_id, &LeadId(id))
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(MessageResponse { message: "Lead deleted".to_string() }))
}

async fn stats(State(state): State<ApiState>) -> ApiResult<LeadStats> {
    let correlation_id = correlation_id();
    let stats =
        state.desk.stats().await.map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(stats))
}

async fn send_quote(
    State(state): State<ApiState>,
    Query(query): Query<LeadQuery>,
) -> ApiResult<EmailSent> {
    let correlation_id = correlation_id();
    let email = state
        .desk
        .send_quote(&LeadId(query.lead_id.clone()))
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;

    Ok(Json(EmailSent {
        message: "Quote email simulated".to_string(),
        lead_id: query.lead_id,
        email,
        note: EMAIL_NOTE.to_string(),
    }))
}

async fn send_review_request(
    State(state): State<ApiState>,
    Query(query): Query<LeadQuery>,
) -> ApiResult<EmailSent> {
    let correlation_id = correlation_id();
    let email = state
        .desk
        .send_review_request(&LeadId(query.lead_id.clone()))
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;

    Ok(Json(EmailSent {
        message: "Review request email simulated".to_string(),
        lead_id: query.lead_id,
        email,
        note: EMAIL_NOTE.to_string(),
    }))
}

async fn email_logs(
    State(state): State<ApiState>,
    Query(query): Query<EmailLogQuery>,
) -> ApiResult<Vec<EmailLog>> {
    let correlation_id = correlation_id();
    let lead_id = query.lead_id.filter(|id| !id.is_empty()).map(LeadId);
    let logs = state
        .desk
        .email_logs(lead_id.as_ref())
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(logs))
}

async fn preview_emails(
    State(state): State<ApiState>,
    Path(lead_id): Path<String>,
) -> ApiResult<EmailPreview> {
    let correlation_id = correlation_id();
    let preview = state
        .desk
        .preview_emails(&LeadId(lead_id))
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;
    Ok(Json(preview))
}

async fn send_sms(
    State(state): State<ApiState>,
    Query(query): Query<LeadQuery>,
) -> ApiResult<SmsSent> {
    let correlation_id = correlation_id();
    let lead = state
        .desk
        .send_sms(&LeadId(query.lead_id))
        .await
        .map_err(|error| ApiError::application(error, &correlation_id))?;

    Ok(Json(SmsSent {
        message: "SMS notification simulated".to_string(),
        lead_id: lead.id.to_string(),
        sms_sent: lead.sms_sent,
        note: SMS_NOTE.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use leadbot_agent::{AgentRuntime, ChatReply, EmailTemplates, LeadDesk, MockEmailNotifier};
    use leadbot_core::domain::lead::{Lead, LeadStats};
    use leadbot_db::repositories::{
        InMemoryEmailLogRepository, InMemoryLeadRepository, InMemorySessionRepository,
        LeadRepository, SqlSessionRepository,
    };

    use super::{router, ApiState, EmailSent, ErrorBody, ServiceBanner, SmsSent, StatusUpdated};

    fn app() -> Router {
        let sessions = Arc::new(InMemorySessionRepository::default());
        let leads = Arc::new(InMemoryLeadRepository::default());
        let email_logs = Arc::new(InMemoryEmailLogRepository::default());
        let notifier = Arc::new(MockEmailNotifier::new(
            Arc::new(EmailTemplates::new().expect("templates")),
            leads.clone(),
            email_logs.clone(),
        ));
        let runtime = Arc::new(AgentRuntime::new(sessions, leads.clone(), notifier.clone()));
        let desk = Arc::new(LeadDesk::new(leads, email_logs, notifier));
        router(ApiState::new(runtime, desk))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body bytes");
        (status, bytes.to_vec())
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).expect("json body")
    }

    async fn create_lead(app: &Router) -> Lead {
        let (status, body) = send(
            app,
            "POST",
            "/api/leads",
            Some(
                r#"{"name":"John Smith","phone":"0448195614","suburb":"Clyde North","job_description":"Install powerpoints"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        decode(&body)
    }

    #[tokio::test]
    async fn root_reports_online() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/", None).await;
        assert_eq!(status, StatusCode::OK);
        let banner: ServiceBanner = decode(&body);
        assert_eq!(banner.message, "Add Power Electrics Chatbot API");
        assert_eq!(banner.status, "online");
    }

    #[tokio::test]
    async fn chat_turns_follow_the_booking_flow() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/chat",
            Some(r#"{"message":"book a job","session_id":"web-1"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reply: ChatReply = decode(&body);
        assert_eq!(reply.action.as_deref(), Some("collect_name"));
        assert!(reply.lead_data.is_none());

        let (_, body) =
            send(&app, "POST", "/api/chat", Some(r#"{"message":"John","session_id":"web-1"}"#))
                .await;
        let reply: ChatReply = decode(&body);
        assert_eq!(reply.action.as_deref(), Some("collect_phone"));
    }

    #[tokio::test]
    async fn malformed_chat_body_is_a_bad_request() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/chat", Some(r#"{"message":"hi"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = decode(&body);
        assert!(error.correlation_id.starts_with("req-"));
    }

    #[tokio::test]
    async fn chat_answers_503_when_the_session_store_is_down() {
        let pool = leadbot_db::connect("sqlite::memory:").await.expect("connect");
        pool.close().await;

        let leads = Arc::new(InMemoryLeadRepository::default());
        let email_logs = Arc::new(InMemoryEmailLogRepository::default());
        let notifier = Arc::new(MockEmailNotifier::new(
            Arc::new(EmailTemplates::new().expect("templates")),
            leads.clone(),
            email_logs.clone(),
        ));
        let sessions = Arc::new(SqlSessionRepository::new(pool));
        let runtime = Arc::new(AgentRuntime::new(sessions, leads.clone(), notifier.clone()));
        let desk = Arc::new(LeadDesk::new(leads.clone(), email_logs, notifier));
        let app = router(ApiState::new(runtime, desk));

        let (status, body) = send(
            &app,
            "POST",
            "/api/chat",
            Some(r#"{"message":"book a job","session_id":"web-down"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorBody = decode(&body);
        assert_eq!(error.detail, "The service is temporarily unavailable. Please retry shortly.");
        assert!(!error.detail.contains("database"));
        assert!(error.correlation_id.starts_with("req-"));
        assert!(leads.list(10).await.expect("leads").is_empty());
    }

    #[tokio::test]
    async fn manual_lead_requires_every_field() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/leads",
            Some(r#"{"name":"Jo","phone":" ","suburb":"Berwick","job_description":"Lights"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = decode(&body);
        assert!(error.detail.contains("Phone"));

        let (status, _) =
            send(&app, "POST", "/api/leads", Some(r#"{"name":"Jo","phone":"0412345678"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_changes_feed_the_stats() {
        let app = app();
        let lead = create_lead(&app).await;

        let uri = format!("/api/leads/{}/status?status=archived", lead.id);
        let (status, _) = send(&app, "PATCH", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, "PATCH", "/api/leads/missing/status?status=booked", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/api/leads/{}/status?status=booked", lead.id);
        let (status, body) = send(&app, "PATCH", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let updated: StatusUpdated = decode(&body);
        assert_eq!(updated.status, "booked");

        let (_, body) = send(&app, "GET", "/api/stats", None).await;
        let stats: LeadStats = decode(&body);
        assert_eq!(stats.total_leads, 1);
        assert_eq!(stats.booked, 1);
        assert_eq!(stats.new_leads, 0);
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let app = app();
        let lead = create_lead(&app).await;
        let uri = format!("/api/leads/{}", lead.id);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ErrorBody = decode(&body);
        assert!(error.detail.contains("not found"));

        let (_, body) = send(&app, "GET", "/api/leads", None).await;
        let leads: Vec<Lead> = decode(&body);
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn follow_up_emails_are_logged() {
        let app = app();
        let lead = create_lead(&app).await;

        let (status, body) =
            send(&app, "POST", &format!("/api/email/send-quote?lead_id={}", lead.id), None).await;
        assert_eq!(status, StatusCode::OK);
        let sent: EmailSent = decode(&body);
        assert!(sent.email.subject.starts_with("Your Free Quote Request"));

        let review = format!("/api/email/send-review-request?lead_id={}", lead.id);
        let (status, body) = send(&app, "POST", &review, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = decode(&body);
        assert!(error.detail.contains("completed jobs"));

        let complete = format!("/api/leads/{}/status?status=completed", lead.id);
        send(&app, "PATCH", &complete, None).await;
        let (status, _) = send(&app, "POST", &review, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) =
            send(&app, "GET", &format!("/api/email/logs?lead_id={}", lead.id), None).await;
        let logs: Vec<serde_json::Value> = decode(&body);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["email_type"], "review_request");

        let (_, body) = send(&app, "GET", "/api/leads", None).await;
        let leads: Vec<Lead> = decode(&body);
        assert!(leads[0].quote_sent);
        assert!(leads[0].review_requested);
    }

    #[tokio::test]
    async fn preview_and_sms_need_a_known_lead() {
        let app = app();
        let (status, _) = send(&app, "GET", "/api/email/preview/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "POST", "/api/sms/send?lead_id=unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let lead = create_lead(&app).await;
        let (status, body) =
            send(&app, "GET", &format!("/api/email/preview/{}", lead.id), None).await;
        assert_eq!(status, StatusCode::OK);
        let preview: serde_json::Value = decode(&body);
        let confirmation = preview["confirmation"]["body"].as_str().unwrap_or_default();
        assert!(confirmation.contains("John Smith"));

        let (status, body) =
            send(&app, "POST", &format!("/api/sms/send?lead_id={}", lead.id), None).await;
        assert_eq!(status, StatusCode::OK);
        let sms: SmsSent = decode(&body);
        assert!(sms.sms_sent);
    }
}
