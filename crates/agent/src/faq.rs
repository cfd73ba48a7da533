//! Ordered keyword table answering common customer questions.
//!
//! Entries are scanned top to bottom and the first entry with a keyword contained in the
//! utterance wins. Narrow topics sit above the broad catch-alls, so reordering the table
//! changes which answer overlapping questions receive.

pub const BUSINESS_NAME: &str = "Add Power Electrics";

pub const BOOKING_UPSELL: &str =
    "\n\nWould you like to book a job or get a free quote? I can grab your details!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaqEntry {
    pub topic: &'static str,
    pub keywords: &'static [&'static str],
    pub answer: &'static str,
}

impl FaqEntry {
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|keyword| normalized.contains(keyword))
    }
}

pub const DIY_SAFETY_ANSWER: &str = "⚠️ For your safety, we strongly recommend NOT doing electrical work yourself. In Australia, DIY electrical work is actually illegal and can void your insurance, cause fires, or serious injury.\n\nWe offer affordable rates and can usually come out within 24-48 hours. Want me to grab your details for a free quote?";

pub const FAQ_TABLE: &[FaqEntry] = &[
    FaqEntry {
        topic: "ev_charger",
        keywords: &["ev", "electric vehicle", "ev charger", "tesla charger", "car charger", "charging station"],
        answer: "EV charger installation is one of our growing specialties! We install home charging stations for Tesla, BYD, Hyundai, and all other electric vehicles. We can set up 7kW single-phase or 22kW three-phase chargers. What type of EV do you have, and do you know if you have single or three-phase power?",
    },
    FaqEntry {
        topic: "powerpoints",
        keywords: &["powerpoint", "power point", "outlet", "socket", "gpo"],
        answer: "Yes, we install powerpoints! Whether you need additional outlets, USB powerpoints, or outdoor weatherproof GPOs, we've got you covered. Where do you need them installed?",
    },
    FaqEntry {
        topic: "switchboard",
        keywords: &["switchboard", "fuse box", "safety switch", "rcd", "circuit breaker"],
        answer: "Switchboard upgrades are one of our specialties! We can upgrade old fuse boxes to modern safety switch boards, add circuits, or install new RCDs. Is your switchboard giving you trouble?",
    },
    FaqEntry {
        topic: "lighting",
        keywords: &["light", "lights", "downlight", "led", "lighting", "lamp"],
        answer: "We're experts in lighting! LED downlights, pendant lights, outdoor security lighting, sensor lights - you name it. Looking to upgrade to energy-efficient LEDs?",
    },
    FaqEntry {
        topic: "ceiling_fans",
        keywords: &["ceiling fan", "fan", "cooling"],
        answer: "Ceiling fan installation is a popular service! We can install new fans or replace existing ones. Do you have existing wiring or need new cabling run?",
    },
    FaqEntry {
        topic: "smoke_alarms",
        keywords: &["smoke alarm", "smoke detector", "fire alarm"],
        answer: "Smoke alarm installation and testing is essential for safety! We install interconnected smoke alarms that comply with Australian regulations. Need your alarms checked?",
    },
    FaqEntry {
        topic: "tv_data",
        keywords: &["tv", "television", "antenna", "data", "network", "internet"],
        answer: "Yes! We do TV wall mounting and antenna installation with attention to detail - clean cable management included. Where would you like your TV mounted?",
    },
    FaqEntry {
        topic: "power_faults",
        keywords: &["tripping", "trip", "power out", "no power", "blackout", "fault"],
        answer: "Power tripping can be caused by faulty appliances, overloaded circuits, or safety switch issues. This needs attention! Can I grab your details so we can help diagnose the issue?",
    },
    FaqEntry {
        topic: "hot_water",
        keywords: &["hot water", "water heater"],
        answer: "We can help with hot water system electrical connections and troubleshooting. Is your hot water system electric or do you need electrical work for a new installation?",
    },
    FaqEntry {
        topic: "service_area",
        keywords: &["area", "areas", "suburb", "location", "where", "clyde", "melbourne", "service area"],
        answer: "We service the entire Greater Melbourne area! From the CBD to all outer suburbs - Clyde North, Cranbourne, Berwick, Pakenham, Werribee, you name it. Wherever you are in Melbourne, we can help. Are you in Greater Melbourne?",
    },
    FaqEntry {
        topic: "availability",
        keywords: &["available", "today", "urgent", "emergency", "asap", "quick"],
        answer: "We try to accommodate urgent jobs where possible! For emergencies, we prioritise safety issues. Let me grab your details and we'll get back to you ASAP with availability.",
    },
    FaqEntry {
        topic: "pricing",
        keywords: &["quote", "cost", "price", "how much", "pricing", "rates", "charge"],
        answer: "We offer free quotes for most jobs! Pricing depends on the scope of work. Would you like us to come out and provide a no-obligation quote?",
    },
    FaqEntry {
        topic: "licensing",
        keywords: &["license", "licensed", "insured", "insurance", "qualified", "certified"],
        answer: "Absolutely! Add Power Electrics is fully licensed and insured. All our work meets Australian electrical standards and we provide certificates of compliance.",
    },
    FaqEntry {
        topic: "diy_safety",
        keywords: &["how to", "how do i", "how can i", "diy", "myself", "manually", "tutorial", "guide", "steps to", "can i do"],
        answer: DIY_SAFETY_ANSWER,
    },
    FaqEntry {
        topic: "general",
        keywords: &["help", "service", "work", "job", "need", "looking", "install"],
        answer: "We offer a full range of residential and commercial electrical services! This includes powerpoints, lighting, switchboards, smoke alarms, ceiling fans, EV chargers, and more. What can we help you with today?",
    },
];

/// First matching entry for an already lower-cased utterance.
pub fn lookup(normalized: &str) -> Option<&'static FaqEntry> {
    FAQ_TABLE.iter().find(|entry| entry.matches(normalized))
}

/// The canned answer followed by the booking invitation.
pub fn answer_with_upsell(entry: &FaqEntry) -> String {
    format!("{}{BOOKING_UPSELL}", entry.answer)
}

#[cfg(test)]
mod tests {
    use super::{answer_with_upsell, lookup, BOOKING_UPSELL, FAQ_TABLE};

    fn topic(text: &str) -> Option<&'static str> {
        lookup(text).map(|entry| entry.topic)
    }

    #[test]
    fn narrow_topics_win_over_catch_alls() {
        assert_eq!(topic("need a switchboard upgrade"), Some("switchboard"));
        assert_eq!(topic("install a ceiling fan"), Some("ceiling_fans"));
        assert_eq!(topic("smoke alarm beeping"), Some("smoke_alarms"));
    }

    #[test]
    fn order_resolves_overlapping_keywords() {
        // "socket" matches powerpoints before the later pricing entry sees "price".
        assert_eq!(topic("price of a socket"), Some("powerpoints"));
        // "downlight" contains "light" and lighting precedes the general bucket.
        assert_eq!(topic("need downlights"), Some("lighting"));
    }

    #[test]
    fn general_bucket_is_the_last_resort() {
        assert_eq!(FAQ_TABLE.last().map(|entry| entry.topic), Some("general"));
        assert_eq!(topic("i need some help"), Some("general"));
        assert_eq!(topic("zzz"), None);
    }

    #[test]
    fn answers_carry_the_booking_invitation() {
        let entry = lookup("hot water").expect("hot water entry");
        let answer = answer_with_upsell(entry);
        assert!(answer.starts_with("We can help with hot water"));
        assert!(answer.ends_with(BOOKING_UPSELL));
    }
}
