//! Stateless HTTP request builder and response parser for the Brevo API.
//!
//! # Design
//! `BrevoClient` holds the API root, the API key and the deployment
//! environment, and carries no mutable state between calls. Each operation is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. The round-trip in between
//! belongs to a `Transport` or to the host.
//!
//! Parse methods return vendor failures raw as `ApiError::Vendor`;
//! normalization is the service layer's job.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, Environment};
use crate::error::{ApiError, BrevoError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Account, Attachment, AttachmentContent, ContactAttributes, CreateContact, CreatedContact,
    EmailData, ListId, Recipient, SendSmtpEmail, SentEmail, TemplateId,
};

/// Tag attached to every send outside production.
pub const TEST_TAG: &str = "test";

/// `productKey` value that classifies a send as SGV; every other key is RLV.
pub const SGV_PRODUCT_KEY: &str = "Sterbegeldversicherung";

/// Synchronous, stateless client for the three Brevo resources in use.
#[derive(Debug, Clone)]
pub struct BrevoClient {
    base_url: String,
    api_key: SecretString,
    environment: Environment,
}

impl BrevoClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            environment: config.environment,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn build_get_account(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/account", self.base_url),
            headers: self.headers(false),
            body: None,
        }
    }

    /// Upsert a contact keyed by `email`. `updateEnabled` is always set, and
    /// `listIds` is only sent when `list_ids` is `Some`.
    pub fn build_create_contact(
        &self,
        email: &str,
        attributes: &ContactAttributes,
        list_ids: Option<&[ListId]>,
    ) -> Result<HttpRequest, ApiError> {
        let payload = CreateContact {
            email: email.to_string(),
            attributes: attributes.clone(),
            update_enabled: true,
            list_ids: list_ids.map(<[ListId]>::to_vec),
        };
        self.post("contacts", &payload)
    }

    /// Send a templated transactional email.
    ///
    /// Tags start as `["test"]` outside production and empty in production.
    /// `data` becomes the template params and adds a product tag when the
    /// params sent carry a non-empty `productKey`. Attachments are only sent when non-empty.
    pub fn build_send_email(
        &self,
        recipients: &[Recipient],
        template_id: TemplateId,
        attachments: Option<&[Attachment]>,
        data: Option<&EmailData>,
    ) -> Result<HttpRequest, ApiError> {
        let mut tags = Vec::new();
        if !self.environment.is_production() {
            tags.push(TEST_TAG.to_string());
        }
        let params = data.map(EmailData::to_params);
        let product_key = params
            .as_ref()
            .and_then(|p| p.get("productKey"))
            .and_then(Value::as_str);
        if let Some(tag) = product_tag(product_key) {
            tags.push(tag.to_string());
        }

        let attachment = attachments
            .filter(|list| !list.is_empty())
            .map(|list| list.iter().map(AttachmentContent::from).collect());

        let payload = SendSmtpEmail {
            to: recipients.to_vec(),
            template_id,
            tags,
            params,
            attachment,
        };
        self.post("smtp/email", &payload)
    }

    pub fn parse_get_account(&self, response: HttpResponse) -> Result<Account, ApiError> {
        check_status(&response, &[200])?;
        parse_json(&response.body)
    }

    /// `201` carries the new contact id; `204` means an existing contact was
    /// updated and there is no body.
    pub fn parse_create_contact(&self, response: HttpResponse) -> Result<CreatedContact, ApiError> {
        check_status(&response, &[201, 204])?;
        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(CreatedContact::default());
        }
        parse_json(&response.body)
    }

    pub fn parse_send_email(&self, response: HttpResponse) -> Result<SentEmail, ApiError> {
        check_status(&response, &[200, 201, 202])?;
        parse_json(&response.body)
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("api-key".to_string(), self.api_key.expose_secret().to_string()),
        ];
        if with_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers
    }

    fn post<T: Serialize>(&self, resource: &str, payload: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/{resource}", self.base_url),
            headers: self.headers(true),
            body: Some(body),
        })
    }
}

/// Classify a send by its product key: SGV for the sentinel, RLV for any other
/// non-empty key, nothing when the key is missing or empty.
pub fn product_tag(product_key: Option<&str>) -> Option<&'static str> {
    match product_key {
        None | Some("") => None,
        Some(SGV_PRODUCT_KEY) => Some("Product: SGV"),
        Some(_) => Some("Product: RLV"),
    }
}

/// Any status outside `expected` is a vendor failure.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::Vendor(BrevoError::from_response(response)))
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::types::{DataId, Gender};

    fn client() -> BrevoClient {
        BrevoClient::new(&Config::new("xkeysib-test").with_base_url("https://api.brevo.com/v3"))
    }

    fn production_client() -> BrevoClient {
        BrevoClient::new(&Config::new("xkeysib-test").with_environment(Environment::Production))
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn recipients() -> Vec<Recipient> {
        vec![Recipient::new("recipient@example.com")]
    }

    #[test]
    fn build_get_account_produces_correct_request() {
        let req = client().build_get_account();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "https://api.brevo.com/v3/account");
        assert_eq!(req.header("api-key"), Some("xkeysib-test"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_contact_forces_update_enabled() {
        let attributes = ContactAttributes {
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            ..Default::default()
        };
        let req = client()
            .build_create_contact("test@example.com", &attributes, Some(&[ListId::EXAMPLE_ONE]))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "https://api.brevo.com/v3/contacts");
        assert_eq!(req.header("content-type"), Some("application/json"));

        let body = body(&req);
        assert_eq!(body["email"], "test@example.com");
        assert_eq!(body["attributes"], json!({ "FIRSTNAME": "John", "LASTNAME": "Doe" }));
        assert_eq!(body["listIds"], json!([1]));
        assert_eq!(body["updateEnabled"], true);
    }

    #[test]
    fn build_create_contact_with_empty_attributes() {
        let req = client()
            .build_create_contact("test@example.com", &ContactAttributes::default(), None)
            .unwrap();
        let body = body(&req);
        assert_eq!(body["attributes"], json!({}));
        assert_eq!(body["updateEnabled"], true);
    }

    #[test]
    fn list_ids_absent_and_empty_are_distinct() {
        let attributes = ContactAttributes::default();

        let absent = body(&client().build_create_contact("a@example.com", &attributes, None).unwrap());
        assert!(absent.get("listIds").is_none());

        let empty = body(&client().build_create_contact("a@example.com", &attributes, Some(&[])).unwrap());
        assert_eq!(empty["listIds"], json!([]));
    }

    #[test]
    fn build_create_contact_passes_invalid_email_through() {
        let req = client()
            .build_create_contact("invalid-email", &ContactAttributes::default(), None)
            .unwrap();
        assert_eq!(body(&req)["email"], "invalid-email");
    }

    #[test]
    fn salutation_carries_gender_code() {
        let attributes = ContactAttributes {
            salutation: Some(Gender::Woman.as_attribute()),
            ..Default::default()
        };
        let req = client().build_create_contact("a@example.com", &attributes, None).unwrap();
        assert_eq!(body(&req)["attributes"]["ANREDE"], "1");
    }

    #[test]
    fn build_send_email_minimal() {
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "https://api.brevo.com/v3/smtp/email");

        let body = body(&req);
        assert_eq!(body["to"], json!([{ "email": "recipient@example.com" }]));
        assert_eq!(body["templateId"], 1);
        assert_eq!(body["tags"], json!(["test"]));
        assert!(body.get("params").is_none());
        assert!(body.get("attachment").is_none());
    }

    #[test]
    fn production_sends_have_no_test_tag() {
        let req = production_client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_TWO, None, None)
            .unwrap();
        assert_eq!(body(&req)["tags"], json!([]));
    }

    #[test]
    fn sgv_product_key_adds_sgv_tag() {
        let data = EmailData {
            product_key: Some(SGV_PRODUCT_KEY.to_string()),
            ..Default::default()
        };
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, Some(&data))
            .unwrap();
        assert_eq!(body(&req)["tags"], json!(["test", "Product: SGV"]));
    }

    #[test]
    fn other_product_key_adds_rlv_tag() {
        let data = EmailData {
            product_key: Some("Risikolebensversicherung".to_string()),
            ..Default::default()
        };
        let req = production_client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, Some(&data))
            .unwrap();
        assert_eq!(body(&req)["tags"], json!(["Product: RLV"]));
    }

    #[test]
    fn data_without_product_key_adds_no_product_tag() {
        let data = EmailData {
            id: Some(DataId::Text("quote-1".to_string())),
            firstname: Some("Daisy".to_string()),
            ..Default::default()
        };
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, Some(&data))
            .unwrap();
        let body = body(&req);
        assert_eq!(body["tags"], json!(["test"]));
        assert_eq!(body["params"], json!({ "id": "quote-1", "firstname": "Daisy" }));
    }

    #[test]
    fn product_key_in_extra_still_tags() {
        let mut data = EmailData::default();
        data.extra.insert("productKey".to_string(), json!(SGV_PRODUCT_KEY));
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, Some(&data))
            .unwrap();
        let body = body(&req);
        assert_eq!(body["tags"], json!(["test", "Product: SGV"]));
        assert_eq!(body["params"]["productKey"], SGV_PRODUCT_KEY);
    }

    #[test]
    fn typed_product_key_wins_over_extra() {
        let mut data = EmailData {
            product_key: Some(SGV_PRODUCT_KEY.to_string()),
            ..Default::default()
        };
        data.extra.insert("productKey".to_string(), json!("Other"));
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, Some(&data))
            .unwrap();

        let raw = req.body.as_deref().unwrap();
        assert_eq!(raw.matches("\"productKey\"").count(), 1);
        let body = body(&req);
        assert_eq!(body["tags"], json!(["test", "Product: SGV"]));
        assert_eq!(body["params"]["productKey"], SGV_PRODUCT_KEY);
    }

    #[test]
    fn null_id_is_sent_as_null() {
        let data = EmailData {
            id: Some(DataId::Null),
            firstname: Some("D".to_string()),
            ..Default::default()
        };
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, None, Some(&data))
            .unwrap();
        assert_eq!(body(&req)["params"], json!({ "id": null, "firstname": "D" }));
    }

    #[test]
    fn attachments_are_mapped_in_order() {
        let attachments = vec![
            Attachment { name: "a".to_string(), value: "v".to_string() },
            Attachment { name: "b.pdf".to_string(), value: "JVBERi0=".to_string() },
        ];
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, Some(&attachments), None)
            .unwrap();
        assert_eq!(
            body(&req)["attachment"],
            json!([
                { "name": "a", "content": "v" },
                { "name": "b.pdf", "content": "JVBERi0=" },
            ])
        );
    }

    #[test]
    fn empty_attachments_are_omitted() {
        let req = client()
            .build_send_email(&recipients(), TemplateId::EXAMPLE_ONE, Some(&[]), None)
            .unwrap();
        assert!(body(&req).get("attachment").is_none());
    }

    #[test]
    fn product_tag_policy() {
        assert_eq!(product_tag(Some("Sterbegeldversicherung")), Some("Product: SGV"));
        assert_eq!(product_tag(Some("anything")), Some("Product: RLV"));
        assert_eq!(product_tag(Some("")), None);
        assert_eq!(product_tag(None), None);
    }

    #[test]
    fn parse_get_account_success() {
        let account = client()
            .parse_get_account(response(200, r#"{"email":"ops@example.com","companyName":"Test Company"}"#))
            .unwrap();
        assert_eq!(account.company_name.as_deref(), Some("Test Company"));
    }

    #[test]
    fn parse_get_account_unauthorized() {
        let err = client()
            .parse_get_account(response(401, r#"{"code":"unauthorized","message":"Key not found"}"#))
            .unwrap_err();
        match err {
            ApiError::Vendor(e) => {
                assert_eq!(e.code, "unauthorized");
                assert_eq!(e.status_code, 401);
            }
            other => panic!("expected vendor error, got {other:?}"),
        }
    }

    #[test]
    fn parse_create_contact_created_and_updated() {
        let created = client().parse_create_contact(response(201, r#"{"id":123}"#)).unwrap();
        assert_eq!(created.id, Some(123));

        let updated = client().parse_create_contact(response(204, "")).unwrap();
        assert_eq!(updated.id, None);
    }

    #[test]
    fn parse_create_contact_invalid_email() {
        let err = client()
            .parse_create_contact(response(400, r#"{"code":"invalid_parameter","message":"Invalid email"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");
        assert_eq!(err.code(), Some("invalid_parameter"));
    }

    #[test]
    fn parse_send_email_success() {
        let sent = client().parse_send_email(response(201, r#"{"messageId":"abc123"}"#)).unwrap();
        assert_eq!(sent.message_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn parse_send_email_bad_json() {
        let err = client().parse_send_email(response(201, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let mut config = Config::new("k");
        config.base_url = "http://localhost:3000/v3/".to_string();
        let req = BrevoClient::new(&config).build_get_account();
        assert_eq!(req.path, "http://localhost:3000/v3/account");
    }
}
