use thiserror::Error;

use crate::{domain::session::LeadField, flows::FlowTransitionError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error("invalid lead status `{0}`; expected one of new, contacted, booked, completed")]
    InvalidLeadStatus(String),
    #[error("lead is missing required fields: {missing:?}")]
    IncompleteLead { missing: Vec<LeadField> },
    #[error("can only request reviews for completed jobs; lead is `{status}`")]
    ReviewBeforeCompletion { status: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("{resource} `{id}` not found")]
    NotFound { resource: &'static str, id: String },
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested resource was not found.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let unassigned = || "unassigned".to_owned();
        match value {
            ApplicationError::Domain(DomainError::FlowTransition(_)) => Self::BadRequest {
                message: "domain validation failed".to_owned(),
                correlation_id: unassigned(),
            },
            ApplicationError::Domain(error @ DomainError::InvalidLeadStatus(_))
            | ApplicationError::Domain(error @ DomainError::IncompleteLead { .. })
            | ApplicationError::Domain(error @ DomainError::ReviewBeforeCompletion { .. }) => {
                Self::BadRequest { message: error.to_string(), correlation_id: unassigned() }
            }
            error @ ApplicationError::NotFound { .. } => {
                Self::NotFound { message: error.to_string(), correlation_id: unassigned() }
            }
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id: unassigned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: unassigned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::session::LeadField;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::flows::{ConversationState, FlowEvent, FlowTransitionError};

    #[test]
    fn invalid_status_maps_to_bad_request_with_reason() {
        let interface = ApplicationError::from(DomainError::InvalidLeadStatus("archived".into()))
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert!(interface.message().contains("archived"));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn incomplete_lead_names_missing_fields() {
        let interface = ApplicationError::from(DomainError::IncompleteLead {
            missing: vec![LeadField::Phone],
        })
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert!(interface.message().contains("Phone"));
    }

    #[test]
    fn early_review_request_is_rejected_with_reason() {
        let interface = ApplicationError::from(DomainError::ReviewBeforeCompletion {
            status: "booked".into(),
        })
        .into_interface("req-6");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert!(interface.message().contains("completed jobs"));
    }

    #[test]
    fn every_domain_error_is_a_client_error() {
        let errors = [
            DomainError::FlowTransition(FlowTransitionError::InvalidTransition {
                state: ConversationState::Greeting,
                event: FlowEvent::QuestionInterrupted,
            }),
            DomainError::InvalidLeadStatus("archived".into()),
            DomainError::IncompleteLead { missing: vec![LeadField::Suburb] },
            DomainError::ReviewBeforeCompletion { status: "new".into() },
        ];

        for error in errors {
            // Exhaustive: a new variant must join this list.
            match &error {
                DomainError::FlowTransition(_)
                | DomainError::InvalidLeadStatus(_)
                | DomainError::IncompleteLead { .. }
                | DomainError::ReviewBeforeCompletion { .. } => {}
            }
            let interface = ApplicationError::from(error).into_interface("req-7");
            assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        }

        let transition = ApplicationError::from(DomainError::FlowTransition(
            FlowTransitionError::InvalidTransition {
                state: ConversationState::Faq,
                event: FlowEvent::QuestionInterrupted,
            },
        ))
        .into_interface("req-8");
        assert_eq!(transition.message(), "domain validation failed");
    }

    #[test]
    fn missing_resource_maps_to_not_found() {
        let interface = ApplicationError::NotFound { resource: "lead", id: "abc".into() }
            .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.message(), "lead `abc` not found");
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn persistence_error_maps_to_service_unavailable() {
        let interface = ApplicationError::Persistence("database lock timeout".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("bad bind address".to_owned()).into_interface("req-5");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
