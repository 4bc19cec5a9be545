use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "xkeysib-mock";

/// Template ids the mock account knows about.
pub const REGISTERED_TEMPLATES: [i64; 3] = [1, 2, 3];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Account,
    Contacts,
    SmtpEmail,
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub resource: Resource,
    pub body: Value,
}

#[derive(Clone, Debug)]
pub struct Contact {
    pub id: i64,
    pub email: String,
    pub attributes: Map<String, Value>,
    pub list_ids: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    pub email: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub update_enabled: bool,
    pub list_ids: Option<Vec<i64>>,
}

#[derive(Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmtpEmail {
    #[serde(default)]
    pub to: Vec<Recipient>,
    pub template_id: i64,
}

#[derive(Default)]
struct Inner {
    contacts: HashMap<String, Contact>,
    next_id: i64,
    calls: Vec<RecordedCall>,
}

/// Shared mock state. Clones share the same store, so a test can keep one
/// handle while the router owns another.
#[derive(Clone)]
pub struct MockState {
    api_key: Arc<str>,
    inner: Arc<RwLock<Inner>>,
}

impl MockState {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.inner.read().await.calls.clone()
    }

    pub async fn call_count(&self, resource: Resource) -> usize {
        self.inner
            .read()
            .await
            .calls
            .iter()
            .filter(|call| call.resource == resource)
            .count()
    }

    pub async fn contact(&self, email: &str) -> Option<Contact> {
        self.inner.read().await.contacts.get(email).cloned()
    }

    async fn record(&self, resource: Resource, body: Value) {
        tracing::debug!(?resource, "mock Brevo call");
        self.inner.write().await.calls.push(RecordedCall { resource, body });
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), MockError> {
        match headers.get("api-key").and_then(|v| v.to_str().ok()) {
            Some(key) if key == &*self.api_key => Ok(()),
            _ => Err(MockError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Key not found")),
        }
    }
}

/// Error body in Brevo's `{code, message}` shape.
#[derive(Debug)]
pub struct MockError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl MockError {
    fn new(status: StatusCode, code: &'static str, message: &str) -> Self {
        Self {
            status,
            code,
            message: message.to_string(),
        }
    }

    fn bad_request(code: &'static str, message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }
}

/// Bodies are read as raw bytes so malformed JSON still gets Brevo's error shape.
fn parse_body(bytes: &[u8]) -> Result<Value, MockError> {
    serde_json::from_slice(bytes).map_err(|e| MockError::bad_request("invalid_parameter", &e.to_string()))
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "code": self.code, "message": self.message })),
        )
            .into_response()
    }
}

pub fn app() -> Router {
    app_with_state(MockState::new(DEFAULT_API_KEY))
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route("/v3/account", get(get_account))
        .route("/v3/contacts", post(create_contact))
        .route("/v3/smtp/email", post(send_email))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, MockState::new(DEFAULT_API_KEY)).await
}

pub async fn serve(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn get_account(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<Value>, MockError> {
    state.record(Resource::Account, Value::Null).await;
    state.authorize(&headers)?;
    Ok(Json(json!({
        "email": "ops@example.com",
        "firstName": "Mock",
        "lastName": "Operator",
        "companyName": "Mock Company",
        "plan": [{ "type": "free", "credits": 300, "creditsType": "sendLimit" }],
    })))
}

async fn create_contact(
    State(state): State<MockState>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Response, MockError> {
    let body = parse_body(&bytes);
    state.record(Resource::Contacts, body.as_ref().ok().cloned().unwrap_or_default()).await;
    state.authorize(&headers)?;

    let input: CreateContact =
        serde_json::from_value(body?).map_err(|e| MockError::bad_request("invalid_parameter", &e.to_string()))?;
    if !input.email.contains('@') {
        return Err(MockError::bad_request("invalid_parameter", "Invalid email address"));
    }

    let mut inner = state.inner.write().await;
    if let Some(existing) = inner.contacts.get_mut(&input.email) {
        if !input.update_enabled {
            return Err(MockError::bad_request("duplicate_parameter", "Contact already exist"));
        }
        existing.attributes.extend(input.attributes);
        for id in input.list_ids.unwrap_or_default() {
            if !existing.list_ids.contains(&id) {
                existing.list_ids.push(id);
            }
        }
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    inner.next_id += 1;
    let contact = Contact {
        id: inner.next_id,
        email: input.email.clone(),
        attributes: input.attributes,
        list_ids: input.list_ids.unwrap_or_default(),
    };
    let id = contact.id;
    inner.contacts.insert(input.email, contact);
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

async fn send_email(
    State(state): State<MockState>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<(StatusCode, Json<Value>), MockError> {
    let body = parse_body(&bytes);
    state.record(Resource::SmtpEmail, body.as_ref().ok().cloned().unwrap_or_default()).await;
    state.authorize(&headers)?;

    let input: SendSmtpEmail =
        serde_json::from_value(body?).map_err(|e| MockError::bad_request("invalid_parameter", &e.to_string()))?;
    if input.to.is_empty() {
        return Err(MockError::bad_request("missing_parameter", "to is missing"));
    }
    if let Some(bad) = input.to.iter().find(|r| !r.email.contains('@')) {
        return Err(MockError::bad_request(
            "invalid_parameter",
            &format!("email is not valid in to: {}", bad.email),
        ));
    }
    if !REGISTERED_TEMPLATES.contains(&input.template_id) {
        return Err(MockError::bad_request("invalid_parameter", "Template not found"));
    }

    let message_id = format!("<{}@smtp-relay.mailin.fr>", Uuid::new_v4());
    Ok((StatusCode::CREATED, Json(json!({ "messageId": message_id }))))
}
