//! Quote application mails: upsert the applicant as a contact and send the
//! confirmation template.
//!
//! The two calls are independent. A failed contact upsert is logged and
//! reported but does not stop the email; a failed email additionally pings
//! the team through the `Notifier`.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map};

use crate::error::ApiError;
use crate::normalize::CallSite;
use crate::service::BrevoService;
use crate::transport::Transport;
use crate::types::{
    ContactAttributes, CreatedContact, DataId, EmailData, Gender, ListId, Recipient, SentEmail,
    TemplateId,
};

pub const CREATE_CONTACT_BREADCRUMB: &str = "QuoteApplication.applyQuote.brevo.createContact";
pub const SEND_EMAIL_BREADCRUMB: &str = "QuoteApplication.applyQuote.brevo.sendEmail";

/// Posts an operational alert to the team, e.g. a chat channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, context: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyHolder {
    pub first_name: String,
    pub last_name: String,
    /// Registered gender name, `"woman"` or `"man"`.
    pub gender: String,
    pub birthday: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    #[serde(default)]
    pub product_key: Option<String>,
    pub policy_holder: PolicyHolder,
}

/// Outcome of both calls, reported separately.
#[derive(Debug)]
pub struct QuoteNotification {
    pub contact: Result<CreatedContact, ApiError>,
    pub email: Result<SentEmail, ApiError>,
}

pub struct QuoteMailer<'a, T> {
    service: &'a BrevoService<T>,
    notifier: &'a dyn Notifier,
}

impl<'a, T: Transport> QuoteMailer<'a, T> {
    pub fn new(service: &'a BrevoService<T>, notifier: &'a dyn Notifier) -> Self {
        Self { service, notifier }
    }

    /// Upsert the policy holder and send the application template.
    ///
    /// Fails before any network call when the gender is not registered.
    pub fn notify_applicant(&self, quote: &Quote, today: NaiveDate) -> Result<QuoteNotification, ApiError> {
        let holder = &quote.policy_holder;
        let gender: Gender = holder.gender.parse()?;
        let context = json!({ "applicationId": quote.id });

        let attributes = ContactAttributes {
            first_name: Some(holder.first_name.clone()),
            last_name: Some(holder.last_name.clone()),
            salutation: Some(gender.as_attribute()),
            birthday: Some(holder.birthday.clone()),
            transactional_id: Some(quote.id.clone()),
            transactional_date: Some(german_date(today)),
            ..Default::default()
        };
        let contact = self.service.create_contact(
            &holder.email,
            &attributes,
            Some(&[ListId::EXAMPLE_ONE]),
            &CallSite::new(CREATE_CONTACT_BREADCRUMB).with_context(context.clone()),
        );

        let data = EmailData {
            id: Some(DataId::Text(quote.id.clone())),
            firstname: Some(holder.first_name.clone()),
            lastname: Some(holder.last_name.clone()),
            product_key: quote.product_key.clone(),
            extra: Map::new(),
        };
        let recipient = Recipient::new(&holder.email)
            .with_name(format!("{} {}", holder.first_name, holder.last_name));
        let email = self.service.send_email(
            &[recipient],
            TemplateId::EXAMPLE_ONE,
            None,
            Some(&data),
            &CallSite::new(SEND_EMAIL_BREADCRUMB).with_context(context),
        );

        if let Err(err) = &email {
            self.notifier.notify(
                &format!("Brevo email for quote application {} failed: {err}", quote.id),
                SEND_EMAIL_BREADCRUMB,
            );
        }

        Ok(QuoteNotification { contact, email })
    }

    /// Same as `notify_applicant`, dated with the local calendar day.
    pub fn notify_applicant_today(&self, quote: &Quote) -> Result<QuoteNotification, ApiError> {
        self.notify_applicant(quote, chrono::Local::now().date_naive())
    }
}

/// `de-DE` short date, e.g. `1.2.2024`.
fn german_date(date: NaiveDate) -> String {
    date.format("%-d.%-m.%Y").to_string()
}
