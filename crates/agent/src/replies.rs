//! Canned turn texts and the quick-reply suggestion chips shown with them.
//!
//! Quick replies are a UI affordance only; nothing reads them back.

use leadbot_core::domain::lead::Lead;
use leadbot_core::domain::session::LeadField;

use crate::faq::BUSINESS_NAME;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuickReplyContext {
    Greeting,
    FaqFollowup,
    DiyWarning,
    AfterBookingOffer,
    CollectName,
    CollectPhone,
    CollectSuburb,
    CollectJob,
    LeadSaved,
    Negative,
    ServicesMenu,
    QuestionInterrupt,
}

const QUICK_REPLIES: &[(QuickReplyContext, &[&str])] = &[
    (QuickReplyContext::Greeting, &["Get a free quote", "What areas do you service?", "Emergency help"]),
    (QuickReplyContext::FaqFollowup, &["Yes, book now", "No thanks", "Tell me more"]),
    (QuickReplyContext::DiyWarning, &["Yes, get a quote", "No thanks"]),
    (QuickReplyContext::AfterBookingOffer, &["Yes please", "Maybe later", "Just browsing"]),
    (QuickReplyContext::CollectName, &[]),
    (QuickReplyContext::CollectPhone, &[]),
    (QuickReplyContext::CollectSuburb, &["Clyde North", "Cranbourne", "Berwick", "Pakenham", "Other"]),
    (
        QuickReplyContext::CollectJob,
        &["Powerpoint installation", "Switchboard upgrade", "Lighting", "EV charger", "Other"],
    ),
    (QuickReplyContext::LeadSaved, &["Ask another question", "That's all, thanks"]),
    (QuickReplyContext::Negative, &["Actually, yes book me in", "Ask another question"]),
    (
        QuickReplyContext::ServicesMenu,
        &["Powerpoints", "Switchboards", "Lighting", "EV Chargers", "Smoke Alarms", "Other"],
    ),
    (QuickReplyContext::QuestionInterrupt, &["Continue booking", "Cancel"]),
];

pub fn quick_replies(context: QuickReplyContext) -> Vec<String> {
    QUICK_REPLIES
        .iter()
        .find(|(key, _)| *key == context)
        .map(|(_, replies)| replies.iter().map(|reply| reply.to_string()).collect())
        .unwrap_or_default()
}

pub fn collection_start() -> String {
    "Great! I'd love to help you book a service. Let me grab a few details so we can get back to you quickly. 👤 What's your name?".to_string()
}

pub fn invalid_name() -> String {
    "I didn't quite catch that. Could you please tell me your name?".to_string()
}

pub fn ask_phone(name: &str) -> String {
    format!("Thanks {name}! 📱 What's the best phone number to reach you on?")
}

pub fn invalid_phone() -> String {
    "Hmm, that doesn't look like a valid phone number. Could you please enter your Australian mobile or landline number? (e.g., 0412 345 678)".to_string()
}

pub fn ask_suburb() -> String {
    "Perfect! 📍 What suburb are you located in?".to_string()
}

pub fn missing_suburb() -> String {
    "Sorry, I didn't catch that. 📍 What suburb are you located in?".to_string()
}

pub fn ask_job() -> String {
    "Great! 🔧 Now, briefly describe the electrical work you need done:".to_string()
}

pub fn missing_job() -> String {
    "Sorry, I didn't catch that. 🔧 Briefly describe the electrical work you need done:"
        .to_string()
}

/// Canned answer first, then a nudge back to the field being collected.
pub fn answer_then_remind(answer: &str, field: LeadField) -> String {
    format!(
        "{answer}\n\n---\n\n📝 By the way, I was just collecting your details for a quote. Would you like to continue? Just tell me your **{}**.",
        field.label()
    )
}

pub fn pricing_reminder(field: LeadField) -> String {
    format!(
        "Great question! Pricing depends on the specific job - that's why we offer free quotes. Once I have your details, we can give you an accurate price.\n\n📝 What's your **{}**?",
        field.label()
    )
}

pub fn lead_saved(lead: &Lead) -> String {
    format!(
        "Awesome! ✅ Thanks {name}! I've passed your details to the team at {BUSINESS_NAME} and sent you a confirmation.\n\n📋 **Your Request:**\n• Name: {name}\n• Phone: {phone}\n• Suburb: {suburb}\n• Job: {job}\n\n📧 A confirmation has been sent to you!\n\nWe'll be in touch shortly! Is there anything else I can help with?",
        name = lead.name,
        phone = lead.phone,
        suburb = lead.suburb,
        job = lead.job_description,
    )
}
