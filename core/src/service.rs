//! Executes Brevo operations end to end: build, one round-trip, parse.
//!
//! # Design
//! Every vendor failure goes through `normalize_error`, whichever operation
//! raised it, so callers always see `ApiError::Code`. Transport and serde
//! failures never reached the vendor and are returned untouched.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::client::BrevoClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::logger::{Logger, TracingLogger};
use crate::normalize::{normalize_error, CallSite};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    Account, Attachment, ContactAttributes, CreatedContact, EmailData, ListId, Recipient,
    SentEmail, TemplateId,
};

pub struct BrevoService<T = UreqTransport> {
    client: BrevoClient,
    transport: T,
    logger: Arc<dyn Logger>,
}

impl BrevoService<UreqTransport> {
    /// Service with the default ureq transport and `tracing` logger.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            BrevoClient::new(config),
            UreqTransport::from_config(config),
            Arc::new(TracingLogger),
        )
    }
}

impl<T: Transport> BrevoService<T> {
    pub fn new(client: BrevoClient, transport: T, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            transport,
            logger,
        }
    }

    pub fn client(&self) -> &BrevoClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub fn get_account(&self, site: &CallSite) -> Result<Account, ApiError> {
        let request = self.client.build_get_account();
        let response = self.transport.execute(&request)?;
        let outcome = self.client.parse_get_account(response);
        self.settle("Brevo Get Account", &request, site, outcome)
    }

    pub fn create_contact(
        &self,
        email: &str,
        attributes: &ContactAttributes,
        list_ids: Option<&[ListId]>,
        site: &CallSite,
    ) -> Result<CreatedContact, ApiError> {
        let request = self.client.build_create_contact(email, attributes, list_ids)?;
        let response = self.transport.execute(&request)?;
        let outcome = self.client.parse_create_contact(response);
        self.settle("Brevo Create Contact", &request, site, outcome)
    }

    pub fn send_email(
        &self,
        recipients: &[Recipient],
        template_id: TemplateId,
        attachments: Option<&[Attachment]>,
        data: Option<&EmailData>,
        site: &CallSite,
    ) -> Result<SentEmail, ApiError> {
        let request = self
            .client
            .build_send_email(recipients, template_id, attachments, data)?;
        let response = self.transport.execute(&request)?;
        let outcome = self.client.parse_send_email(response);
        self.settle("Brevo Send Email", &request, site, outcome)
    }

    fn settle<R: Serialize>(
        &self,
        operation: &str,
        request: &HttpRequest,
        site: &CallSite,
        outcome: Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        match outcome {
            Ok(value) => {
                self.logger.info(
                    &format!("{operation}: API called successfully. Returned data:"),
                    &json!({ "data": &value }),
                );
                Ok(value)
            }
            Err(ApiError::Vendor(mut error)) => {
                error.request = request.summary();
                Err(normalize_error(
                    self.logger.as_ref(),
                    &error,
                    &site.breadcrumb,
                    &site.context,
                ))
            }
            Err(other) => Err(other),
        }
    }
}

impl<T> std::fmt::Debug for BrevoService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrevoService")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
