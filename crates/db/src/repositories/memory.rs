use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use leadbot_core::domain::email::EmailLog;
use leadbot_core::domain::lead::{Lead, LeadId, LeadStats, LeadStatus, NotificationFlag};
use leadbot_core::domain::session::{CollectedFields, Session, SessionId};
use leadbot_core::flows::ConversationState;

use super::{
    EmailLogRepository, LeadRepository, RepositoryError, SessionRepository, MAX_EMAIL_LOG_PAGE,
    MAX_LEAD_PAGE,
};

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id.as_str()).cloned())
    }

    async fn create(
        &self,
        session_id: &SessionId,
        initial: ConversationState,
    ) -> Result<Session, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.as_str().to_string())
            .or_insert_with(|| Session::new(session_id.clone(), initial));
        Ok(session.clone())
    }

    async fn update(
        &self,
        session_id: &SessionId,
        state: ConversationState,
        fields: &CollectedFields,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.as_str().to_string())
            .or_insert_with(|| Session::new(session_id.clone(), state));
        session.state = state;
        session.collected_fields = fields.clone();
        session.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<HashMap<String, Lead>>,
}

impl InMemoryLeadRepository {
    async fn modify(&self, id: &LeadId, change: impl FnOnce(&mut Lead)) -> bool {
        let mut leads = self.leads.write().await;
        match leads.get_mut(&id.0) {
            Some(lead) => {
                change(lead);
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
        let mut leads = self.leads.write().await;
        leads.insert(lead.id.0.clone(), lead.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let leads = self.leads.read().await;
        Ok(leads.get(&id.0).cloned())
    }

    async fn list(&self, limit: u32) -> Result<Vec<Lead>, RepositoryError> {
        let leads = self.leads.read().await;
        let mut listed = leads.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listed.truncate(limit.min(MAX_LEAD_PAGE) as usize);
        Ok(listed)
    }

    async fn update_status(&self, id: &LeadId, status: LeadStatus) -> Result<bool, RepositoryError> {
        Ok(self.modify(id, |lead| lead.status = status).await)
    }

    async fn mark_notification(
        &self,
        id: &LeadId,
        flag: NotificationFlag,
    ) -> Result<bool, RepositoryError> {
        Ok(self.modify(id, |lead| lead.raise_flag(flag)).await)
    }

    async fn delete(&self, id: &LeadId) -> Result<bool, RepositoryError> {
        let mut leads = self.leads.write().await;
        Ok(leads.remove(&id.0).is_some())
    }

    async fn count_by_status(&self) -> Result<LeadStats, RepositoryError> {
        let leads = self.leads.read().await;
        let mut stats = LeadStats::default();
        for lead in leads.values() {
            stats.record(lead.status, 1);
        }
        Ok(stats)
    }
}

#[derive(Default)]
pub struct InMemoryEmailLogRepository {
    logs: RwLock<Vec<EmailLog>>,
}

#[async_trait::async_trait]
impl EmailLogRepository for InMemoryEmailLogRepository {
    async fn insert(&self, log: &EmailLog) -> Result<(), RepositoryError> {
        let mut logs = self.logs.write().await;
        logs.push(log.clone());
        Ok(())
    }

    async fn list(
        &self,
        lead_id: Option<&LeadId>,
        limit: u32,
    ) -> Result<Vec<EmailLog>, RepositoryError> {
        let logs = self.logs.read().await;
        Ok(logs
            .iter()
            .rev()
            .filter(|log| lead_id.map_or(true, |id| &log.lead_id == id))
            .take(limit.min(MAX_EMAIL_LOG_PAGE) as usize)
            .cloned()
            .collect())
    }
}
