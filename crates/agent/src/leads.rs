//! Back-office operations on captured leads: manual entry, status changes, and the
//! simulated follow-up emails and SMS.

use std::sync::Arc;

use tracing::info;

use leadbot_core::domain::email::{EmailKind, EmailLog};
use leadbot_core::domain::lead::{Lead, LeadId, LeadStats, LeadStatus, NewLead};
use leadbot_core::errors::{ApplicationError, DomainError};
use leadbot_db::repositories::{
    EmailLogRepository, LeadRepository, MAX_EMAIL_LOG_PAGE, MAX_LEAD_PAGE,
};

use crate::notifications::{EmailPreview, MockEmailNotifier};

pub struct LeadDesk {
    leads: Arc<dyn LeadRepository>,
    email_logs: Arc<dyn EmailLogRepository>,
    notifier: Arc<MockEmailNotifier>,
}

impl LeadDesk {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        email_logs: Arc<dyn EmailLogRepository>,
        notifier: Arc<MockEmailNotifier>,
    ) -> Self {
        Self { leads, email_logs, notifier }
    }

    pub async fn create(
        &self,
        correlation_id: &str,
        draft: NewLead,
    ) -> Result<Lead, ApplicationError> {
        draft.validate()?;
        let lead = Lead::new(NewLead {
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            suburb: draft.suburb.trim().to_string(),
            job_description: draft.job_description.trim().to_string(),
        });
        self.leads.insert(&lead).await?;

        info!(
            event_name = "lead.created_manually",
            correlation_id = %correlation_id,
            lead_id = %lead.id,
            "lead created"
        );
        Ok(lead)
    }

    pub async fn list(&self) -> Result<Vec<Lead>, ApplicationError> {
        Ok(self.leads.list(MAX_LEAD_PAGE).await?)
    }

    pub async fn update_status(
        &self,
        correlation_id: &str,
        id: &LeadId,
        raw_status: &str,
    ) -> Result<LeadStatus, ApplicationError> {
        let status = raw_status.parse::<LeadStatus>()?;
        if !self.leads.update_status(id, status).await? {
            return Err(not_found(id));
        }

        info!(
            event_name = "lead.status_updated",
            correlation_id = %correlation_id,
            lead_id = %id,
            status = status.as_str(),
            "lead status updated"
        );
        Ok(status)
    }

    pub async fn delete(&self, correlation_id: &str, id: &LeadId) -> Result<(), ApplicationError> {
        if !self.leads.delete(id).await? {
            return Err(not_found(id));
        }
        info!(
            event_name = "lead.deleted",
            correlation_id = %correlation_id,
            lead_id = %id,
            "lead deleted"
        );
        Ok(())
    }

    pub async fn stats(&self) -> Result<LeadStats, ApplicationError> {
        Ok(self.leads.count_by_status().await?)
    }

    pub async fn send_quote(&self, id: &LeadId) -> Result<EmailLog, ApplicationError> {
        let lead = self.require(id).await?;
        Ok(self.notifier.send(EmailKind::Quote, &lead).await?)
    }

    /// Review requests only go out once the job is done.
    pub async fn send_review_request(&self, id: &LeadId) -> Result<EmailLog, ApplicationError> {
        let lead = self.require(id).await?;
        if lead.status != LeadStatus::Completed {
            return Err(DomainError::ReviewBeforeCompletion {
                status: lead.status.as_str().to_string(),
            }
            .into());
        }
        Ok(self.notifier.send(EmailKind::ReviewRequest, &lead).await?)
    }

    pub async fn email_logs(
        &self,
        lead_id: Option<&LeadId>,
    ) -> Result<Vec<EmailLog>, ApplicationError> {
        Ok(self.email_logs.list(lead_id, MAX_EMAIL_LOG_PAGE).await?)
    }

    pub async fn preview_emails(&self, id: &LeadId) -> Result<EmailPreview, ApplicationError> {
        let lead = self.require(id).await?;
        Ok(self.notifier.templates().preview(&lead)?)
    }

    pub async fn send_sms(&self, id: &LeadId) -> Result<Lead, ApplicationError> {
        let mut lead = self.require(id).await?;
        self.notifier.send_sms(&lead).await?;
        lead.sms_sent = true;
        Ok(lead)
    }

    async fn require(&self, id: &LeadId) -> Result<Lead, ApplicationError> {
        self.leads.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &LeadId) -> ApplicationError {
    ApplicationError::NotFound { resource: "lead", id: id.to_string() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leadbot_core::domain::email::EmailKind;
    use leadbot_core::domain::lead::{LeadId, LeadStatus, NewLead};
    use leadbot_core::errors::{ApplicationError, DomainError};
    use leadbot_db::repositories::{InMemoryEmailLogRepository, InMemoryLeadRepository};

    use super::LeadDesk;
    use crate::notifications::{EmailTemplates, MockEmailNotifier};

    fn desk() -> LeadDesk {
        let leads = Arc::new(InMemoryLeadRepository::default());
        let email_logs = Arc::new(InMemoryEmailLogRepository::default());
        let notifier = Arc::new(MockEmailNotifier::new(
            Arc::new(EmailTemplates::new().expect("templates")),
            leads.clone(),
            email_logs.clone(),
        ));
        LeadDesk::new(leads, email_logs, notifier)
    }

    fn draft() -> NewLead {
        NewLead {
            name: " Jane Doe ".to_string(),
            phone: "0412345678".to_string(),
            suburb: "Berwick".to_string(),
            job_description: "Replace switchboard".to_string(),
        }
    }

    #[tokio::test]
    async fn manual_leads_are_trimmed_and_counted() {
        let desk = desk();
        let lead = desk.create("req", draft()).await.expect("create");
        assert_eq!(lead.name, "Jane Doe");
        assert_eq!(lead.status, LeadStatus::New);

        let stats = desk.stats().await.expect("stats");
        assert_eq!(stats.total_leads, 1);
        assert_eq!(stats.new_leads, 1);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_storage() {
        let desk = desk();
        let mut draft = draft();
        draft.suburb = "  ".to_string();

        let error = desk.create("req", draft).await.expect_err("blank suburb");
        assert!(matches!(error, ApplicationError::Domain(DomainError::IncompleteLead { .. })));
        assert!(desk.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn status_updates_validate_value_then_lead() {
        let desk = desk();
        let lead = desk.create("req", draft()).await.expect("create");

        let error = desk.update_status("req", &lead.id, "archived").await.expect_err("bad status");
        assert!(matches!(error, ApplicationError::Domain(DomainError::InvalidLeadStatus(_))));

        let missing = LeadId("missing".to_string());
        let error = desk.update_status("req", &missing, "booked").await.expect_err("no lead");
        assert!(matches!(error, ApplicationError::NotFound { resource: "lead", .. }));

        assert_eq!(
            desk.update_status("req", &lead.id, "booked").await.expect("update"),
            LeadStatus::Booked
        );
    }

    #[tokio::test]
    async fn review_requests_wait_for_completion() {
        let desk = desk();
        let lead = desk.create("req", draft()).await.expect("create");

        let error = desk.send_review_request(&lead.id).await.expect_err("not completed");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::ReviewBeforeCompletion { ref status })
                if status == "new"
        ));

        desk.update_status("req", &lead.id, "completed").await.expect("complete");
        let log = desk.send_review_request(&lead.id).await.expect("review");
        assert_eq!(log.email_type, EmailKind::ReviewRequest);

        let stored = desk.list().await.expect("list");
        assert!(stored[0].review_requested);
    }

    #[tokio::test]
    async fn quote_and_sms_raise_their_flags() {
        let desk = desk();
        let lead = desk.create("req", draft()).await.expect("create");

        desk.send_quote(&lead.id).await.expect("quote");
        let sms = desk.send_sms(&lead.id).await.expect("sms");
        assert!(sms.sms_sent);

        let stored = desk.list().await.expect("list");
        assert!(stored[0].quote_sent);
        assert!(stored[0].sms_sent);
        assert!(!stored[0].email_sent);

        let logs = desk.email_logs(Some(&lead.id)).await.expect("logs");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].email_type, EmailKind::Quote);
    }

    #[tokio::test]
    async fn unknown_leads_are_not_found_everywhere() {
        let desk = desk();
        let missing = LeadId("nope".to_string());

        let not_found = |error: ApplicationError| matches!(error, ApplicationError::NotFound { .. });

        assert!(not_found(desk.delete("req", &missing).await.expect_err("delete")));
        assert!(not_found(desk.send_quote(&missing).await.expect_err("quote")));
        assert!(not_found(desk.preview_emails(&missing).await.expect_err("preview")));
        assert!(not_found(desk.send_sms(&missing).await.expect_err("sms")));
    }
}
