//! Rule-based intent classification.
//!
//! Checks run in a fixed priority order and the first hit wins: greeting, DIY warning,
//! booking, FAQ table, affirmative, negative, exploration, then unknown. Matching is plain
//! substring containment on the trimmed, lower-cased utterance, so short keywords also
//! fire inside longer words ("hi" inside "this").

use leadbot_core::domain::intent::{Classification, Intent};

use crate::faq::{self, BUSINESS_NAME, DIY_SAFETY_ANSWER};

const GREETING_WORDS: &[&str] =
    &["hi", "hello", "hey", "g'day", "gday", "good morning", "good afternoon"];

const DIY_PHRASES: &[&str] = &[
    "how to",
    "how do i",
    "how can i",
    "diy",
    "myself",
    "manually",
    "tutorial",
    "guide",
    "steps to",
    "can i do it myself",
];

const BOOKING_WORDS: &[&str] =
    &["book", "appointment", "schedule", "come out", "visit", "call me", "contact"];

const AFFIRMATIVE_WORDS: &[&str] =
    &["yes", "yeah", "yep", "sure", "ok", "okay", "please", "definitely", "absolutely"];

const NEGATIVE_WORDS: &[&str] = &["no", "nah", "not", "don't", "nope"];

const EXPLORE_PHRASES: &[&str] =
    &["tell me more", "more info", "what else", "other services", "what do you do", "services"];

const QUESTION_INDICATORS: &[&str] = &[
    "how much", "how to", "how do", "how can", "how long", "what is", "what's", "what are",
    "what do", "when", "where", "why", "which", "can you", "can i", "do you", "is it",
    "are you", "cost", "price", "charge", "rate", "?",
];

const PRICING_WORDS: &[&str] = &["how much", "cost", "price", "charge"];

pub const BOOKING_PROMPT: &str = "Great! I'd love to help you book a service. Let me grab a few details so we can get back to you quickly. What's your name?";

pub const NEGATIVE_RESPONSE: &str = "No worries! Is there anything else I can help you with today?";

pub const EXPLORE_RESPONSE: &str = "We offer a wide range of electrical services! Here are some of our most popular ones - tap to learn more, or type your own question:";

pub const UNKNOWN_RESPONSE: &str = "I'm here to help with electrical questions! What would you like to know about? Tap a service below or type your question:";

pub fn greeting_response() -> String {
    format!(
        "G'day! 👋 Welcome to {BUSINESS_NAME} - your trusted local sparky in Greater Melbourne with a 5-star rating! How can I help you today? I can answer questions about our services or help you book a job."
    )
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, utterance: &str) -> Classification {
        let normalized = normalize_text(utterance);
        let text = normalized.as_str();

        if contains_any(text, GREETING_WORDS) {
            return Classification::new(Intent::Greeting, greeting_response());
        }
        if contains_any(text, DIY_PHRASES) {
            return Classification::new(Intent::DiyWarning, DIY_SAFETY_ANSWER);
        }
        if contains_any(text, BOOKING_WORDS) {
            return Classification::new(Intent::StartLead, BOOKING_PROMPT);
        }
        if let Some(entry) = faq::lookup(text) {
            return Classification::new(Intent::Faq, faq::answer_with_upsell(entry));
        }
        if is_affirmative(text) {
            return Classification::bare(Intent::Affirmative);
        }
        if NEGATIVE_WORDS.contains(&text) {
            return Classification::new(Intent::Negative, NEGATIVE_RESPONSE);
        }
        if contains_any(text, EXPLORE_PHRASES) {
            return Classification::new(Intent::ExploreServices, EXPLORE_RESPONSE);
        }

        Classification::new(Intent::Unknown, UNKNOWN_RESPONSE)
    }
}

/// Interrogative phrasing, used to tell a question apart from field data mid-collection.
pub fn looks_like_question(utterance: &str) -> bool {
    contains_any(&normalize_text(utterance), QUESTION_INDICATORS)
}

pub fn mentions_pricing(utterance: &str) -> bool {
    contains_any(&normalize_text(utterance), PRICING_WORDS)
}

// Token boundaries only at the ends of the utterance; an affirmative word in the middle
// of a sentence does not count. Known heuristic: "ok but no" still reads as affirmative.
fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE_WORDS.iter().any(|word| {
        text == *word
            || text.strip_prefix(word).is_some_and(|rest| rest.starts_with(' '))
            || text.strip_suffix(word).is_some_and(|rest| rest.ends_with(' '))
    })
}

fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
