//! Brevo contact and transactional-email integration.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for three
//! Brevo resources: account lookup, contact upsert and templated
//! transactional send. `BrevoService` runs one round-trip per operation over a
//! `Transport` and routes vendor failures through the error normalizer.
//!
//! # Design
//! - `BrevoClient` is stateless: API root, API key and environment come from
//!   an injected `Config`, never from globals.
//! - Each operation is split into `build_*` and `parse_*`, so the outbound
//!   request can be inspected without any network.
//! - `normalize_error` logs a vendor failure once and re-raises it keyed by
//!   the vendor code.
//! - No local validation of emails, recipients or template ids: Brevo is the
//!   authority and its errors surface through the normalizer.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod normalize;
pub mod quote;
pub mod service;
pub mod transport;
pub mod types;

pub use client::{product_tag, BrevoClient};
pub use config::{Config, ConfigError, Environment};
pub use error::{ApiError, BrevoError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use logger::{Logger, TracingLogger};
pub use normalize::{normalize_error, CallSite, DEFAULT_BREADCRUMB};
pub use quote::{Notifier, PolicyHolder, Quote, QuoteMailer, QuoteNotification};
pub use service::BrevoService;
pub use transport::{Transport, UreqTransport};
pub use types::{
    Account, Attachment, AttachmentContent, ContactAttributes, CreateContact, CreatedContact,
    DataId, EmailData, Gender, ListId, Product, Recipient, SendSmtpEmail, SentEmail, TemplateId,
};
