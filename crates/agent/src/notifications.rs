//! Customer notifications. Delivery is simulated: every send is rendered, written to the
//! email log and announced in the service log, and nothing leaves the process.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::info;

use leadbot_core::domain::email::{EmailContent, EmailKind, EmailLog};
use leadbot_core::domain::lead::{Lead, NotificationFlag};
use leadbot_core::errors::ApplicationError;
use leadbot_db::repositories::{EmailLogRepository, LeadRepository, RepositoryError};

use crate::faq::BUSINESS_NAME;

pub const BUSINESS_PHONE: &str = "0448 195 614";
pub const REVIEW_LINK: &str = "https://g.page/r/YOUR-GOOGLE-REVIEW-LINK/review";

const CONFIRMATION_TEMPLATE: &str = "confirmation.txt";
const QUOTE_TEMPLATE: &str = "quote.txt";
const REVIEW_TEMPLATE: &str = "review_request.txt";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email template failed: {0}")]
    Template(#[from] tera::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<NotificationError> for ApplicationError {
    fn from(value: NotificationError) -> Self {
        match value {
            NotificationError::Template(error) => {
                ApplicationError::Configuration(format!("email template failed: {error}"))
            }
            NotificationError::Repository(error) => error.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailPreview {
    pub confirmation: EmailContent,
    pub quote: EmailContent,
    pub review_request: EmailContent,
}

pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, NotificationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (
                CONFIRMATION_TEMPLATE,
                include_str!("../../../templates/email/confirmation.txt"),
            ),
            (QUOTE_TEMPLATE, include_str!("../../../templates/email/quote.txt")),
            (REVIEW_TEMPLATE, include_str!("../../../templates/email/review_request.txt")),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, kind: EmailKind, lead: &Lead) -> Result<EmailContent, NotificationError> {
        let (template, subject) = match kind {
            EmailKind::Confirmation => {
                (CONFIRMATION_TEMPLATE, format!("Thanks for contacting {BUSINESS_NAME}! ⚡"))
            }
            EmailKind::Quote => {
                (QUOTE_TEMPLATE, format!("Your Free Quote Request - {BUSINESS_NAME} ⚡"))
            }
            EmailKind::ReviewRequest => {
                (REVIEW_TEMPLATE, format!("How did we do? ⭐ - {BUSINESS_NAME}"))
            }
        };

        let mut context = Context::new();
        context.insert("name", &lead.name);
        context.insert("phone", &lead.phone);
        context.insert("suburb", &lead.suburb);
        context.insert("job_description", &lead.job_description);
        context.insert("business_name", BUSINESS_NAME);
        context.insert("business_phone", BUSINESS_PHONE);
        context.insert("review_link", REVIEW_LINK);

        let body = self.tera.render(template, &context)?;
        Ok(EmailContent { subject, body: body.trim_end().to_string() })
    }

    pub fn preview(&self, lead: &Lead) -> Result<EmailPreview, NotificationError> {
        Ok(EmailPreview {
            confirmation: self.render(EmailKind::Confirmation, lead)?,
            quote: self.render(EmailKind::Quote, lead)?,
            review_request: self.render(EmailKind::ReviewRequest, lead)?,
        })
    }
}

/// Called once per captured lead, after the lead row is stored.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn on_lead_captured(&self, lead: &Lead) -> Result<EmailLog, NotificationError>;
}

pub struct MockEmailNotifier {
    templates: Arc<EmailTemplates>,
    leads: Arc<dyn LeadRepository>,
    email_logs: Arc<dyn EmailLogRepository>,
}

impl MockEmailNotifier {
    pub fn new(
        templates: Arc<EmailTemplates>,
        leads: Arc<dyn LeadRepository>,
        email_logs: Arc<dyn EmailLogRepository>,
    ) -> Self {
        Self { templates, leads, email_logs }
    }

    pub fn templates(&self) -> &EmailTemplates {
        &self.templates
    }

    /// Renders and records one email, then raises the matching flag on the lead.
    pub async fn send(&self, kind: EmailKind, lead: &Lead) -> Result<EmailLog, NotificationError> {
        let content = self.templates.render(kind, lead)?;
        let log = EmailLog::record(lead, kind, content);
        self.email_logs.insert(&log).await?;
        self.leads.mark_notification(&lead.id, kind.notification_flag()).await?;

        info!(
            event_name = "notification.email.mocked",
            correlation_id = %log.id,
            lead_id = %lead.id,
            email_type = kind.as_str(),
            "[MOCKED EMAIL] {} sent to {} ({})",
            kind.as_str(),
            lead.name,
            lead.phone
        );

        Ok(log)
    }

    pub async fn send_sms(&self, lead: &Lead) -> Result<(), NotificationError> {
        self.leads.mark_notification(&lead.id, NotificationFlag::SmsSent).await?;

        info!(
            event_name = "notification.sms.mocked",
            correlation_id = %lead.id,
            lead_id = %lead.id,
            "[MOCKED SMS] new lead from {} ({}), {}: {}",
            lead.name,
            lead.phone,
            lead.suburb,
            lead.job_description
        );

        Ok(())
    }
}

#[async_trait]
impl LeadNotifier for MockEmailNotifier {
    async fn on_lead_captured(&self, lead: &Lead) -> Result<EmailLog, NotificationError> {
        self.send(EmailKind::Confirmation, lead).await
    }
}
