//! Domain DTOs for the Brevo contact and transactional-email resources.
//!
//! # Design
//! Inbound arguments (`ContactAttributes`, `Recipient`, `Attachment`,
//! `EmailData`) and outbound request payloads (`CreateContact`,
//! `SendSmtpEmail`) are separate types so that request shaping lives in one
//! place (`BrevoClient`). Optional fields are skipped when unset: Brevo
//! treats an absent attribute differently from an empty one.
//!
//! Template and list ids are plain integer newtypes. Brevo owns the registry
//! of valid ids; an unregistered id is accepted here and rejected remotely.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Transactional template registered in the Brevo account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub i64);

impl TemplateId {
    pub const EXAMPLE_ONE: Self = Self(1);
    pub const EXAMPLE_TWO: Self = Self(2);
    pub const EXAMPLE_THREE: Self = Self(3);
}

/// Contact list registered in the Brevo account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub i64);

impl ListId {
    pub const EXAMPLE_ONE: Self = Self(1);
    pub const EXAMPLE_TWO: Self = Self(2);
    pub const EXAMPLE_THREE: Self = Self(3);
}

/// Salutation code stored in the `ANREDE` contact attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Woman = 1,
    Man = 2,
}

impl Gender {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The attribute value Brevo expects, e.g. `"1"`.
    pub fn as_attribute(self) -> String {
        self.code().to_string()
    }
}

impl FromStr for Gender {
    type Err = ApiError;

    /// Looks the gender up by its registered name. Names are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "woman" => Ok(Gender::Woman),
            "man" => Ok(Gender::Man),
            other => Err(ApiError::UnknownKey {
                kind: "gender",
                key: other.to_string(),
            }),
        }
    }
}

/// Product stored in the `PRODUCT` contact attribute, serialized as its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    ProductOne = 1,
    ProductTwo = 2,
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Product::ProductOne),
            2 => Ok(Product::ProductTwo),
            other => Err(serde::de::Error::custom(format!("unknown product code {other}"))),
        }
    }
}

/// Fixed-schema contact attributes. Every field is optional; unset fields are
/// left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactAttributes {
    #[serde(rename = "FIRSTNAME", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "LASTNAME", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "ANREDE", skip_serializing_if = "Option::is_none")]
    pub salutation: Option<String>,
    #[serde(rename = "GEBURTSTAG", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(rename = "TELEFONNUMMER", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "PRODUCT", skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(rename = "ANTRAGSNUMMER", skip_serializing_if = "Option::is_none")]
    pub application_number: Option<String>,
    #[serde(rename = "OPT_IN", skip_serializing_if = "Option::is_none")]
    pub opt_in: Option<bool>,
    #[serde(rename = "TRANSACTIONAL_ID", skip_serializing_if = "Option::is_none")]
    pub transactional_id: Option<String>,
    #[serde(rename = "TRANSACTIONAL_PRODUCT", skip_serializing_if = "Option::is_none")]
    pub transactional_product: Option<String>,
    #[serde(rename = "TRANSACTIONAL_DATE", skip_serializing_if = "Option::is_none")]
    pub transactional_date: Option<String>,
    #[serde(rename = "VARIANT", skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(rename = "CONTINUE_URL", skip_serializing_if = "Option::is_none")]
    pub continue_url: Option<String>,
}

/// One addressee of a transactional email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Attachment as handed in by the caller. `value` is base64 or plain text and
/// is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub value: String,
}

/// Attachment in the shape the send endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentContent {
    pub name: String,
    pub content: String,
}

impl From<&Attachment> for AttachmentContent {
    fn from(attachment: &Attachment) -> Self {
        Self {
            name: attachment.name.clone(),
            content: attachment.value.clone(),
        }
    }
}

/// Identifier placed in template params; quotes use strings, policies numbers.
/// `Null` is an id that was given explicitly as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataId {
    Number(i64),
    Text(String),
    Null,
}

impl From<&DataId> for Value {
    fn from(id: &DataId) -> Self {
        match id {
            DataId::Number(n) => Value::from(*n),
            DataId::Text(s) => Value::String(s.clone()),
            DataId::Null => Value::Null,
        }
    }
}

/// Template parameters. Known keys are typed; anything else rides in `extra`
/// and is flattened back into the same JSON object.
///
/// Serialization goes through `to_params`, so a typed key always replaces an
/// `extra` entry of the same name and the object never repeats a key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmailData {
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<DataId>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(rename = "productKey", default)]
    pub product_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmailData {
    /// The params object as sent to Brevo.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = self.extra.clone();
        if let Some(id) = &self.id {
            params.insert("id".to_string(), Value::from(id));
        }
        if let Some(firstname) = &self.firstname {
            params.insert("firstname".to_string(), Value::String(firstname.clone()));
        }
        if let Some(lastname) = &self.lastname {
            params.insert("lastname".to_string(), Value::String(lastname.clone()));
        }
        if let Some(product_key) = &self.product_key {
            params.insert("productKey".to_string(), Value::String(product_key.clone()));
        }
        params
    }
}

impl Serialize for EmailData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_params().serialize(serializer)
    }
}

// A present `"id": null` stays `Some(DataId::Null)`; only a missing key is `None`.
fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DataId>, D::Error> {
    DataId::deserialize(deserializer).map(Some)
}

/// Request payload for `POST /contacts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    pub email: String,
    pub attributes: ContactAttributes,
    pub update_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_ids: Option<Vec<ListId>>,
}

/// Request payload for `POST /smtp/email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmtpEmail {
    pub to: Vec<Recipient>,
    pub template_id: TemplateId,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Vec<AttachmentContent>>,
}

/// Account record returned by `GET /account`. Fields not modelled here are
/// kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a contact upsert. `id` is absent when an existing contact was
/// updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Send confirmation. Brevo answers with `messageId`, or `messageIds` when
/// the message was split per recipient version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ids: Option<Vec<String>>,
}
