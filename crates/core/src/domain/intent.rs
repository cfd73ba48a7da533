use serde::{Deserialize, Serialize};

/// Coarse classification of a single utterance. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    DiyWarning,
    StartLead,
    Faq,
    Affirmative,
    Negative,
    ExploreServices,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::DiyWarning => "diy_warning",
            Self::StartLead => "start_lead",
            Self::Faq => "faq",
            Self::Affirmative => "affirmative",
            Self::Negative => "negative",
            Self::ExploreServices => "explore_services",
            Self::Unknown => "unknown",
        }
    }

    /// Intents that carry a domain answer the user can be given mid-collection.
    pub fn answers_question(&self) -> bool {
        matches!(self, Self::Faq | Self::DiyWarning)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub response: Option<String>,
}

impl Classification {
    pub fn new(intent: Intent, response: impl Into<String>) -> Self {
        Self { intent, response: Some(response.into()) }
    }

    pub fn bare(intent: Intent) -> Self {
        Self { intent, response: None }
    }

    pub fn response_or_empty(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }
}
