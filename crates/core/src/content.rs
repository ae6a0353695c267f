//! Static informational content served alongside the shop.

use serde::{Deserialize, Serialize};

/// A single FAQ entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

/// Frequently asked questions, in display order.
pub const FAQ: [FaqEntry; 8] = [
    FaqEntry {
        question: "What is Jesse A. Eisenbalm made of?",
        answer: "Jesse A. Eisenbalm is made with a premium natural beeswax formula designed for \
                 all-day hydration. It's crafted to keep your lips moisturized while serving as a \
                 daily reminder of your humanity.",
    },
    FaqEntry {
        question: "How much does it cost?",
        answer: "Each tube is $8.99 USD with free shipping on all orders. All proceeds go to charity.",
    },
    FaqEntry {
        question: "Is shipping free?",
        answer: "Yes, shipping is free on all orders. We ship to the US, Canada, UK, Australia, \
                 Germany, France, Italy, Spain, Netherlands, and Belgium.",
    },
    FaqEntry {
        question: "What does 'Limited Edition Release 001' mean?",
        answer: "Each tube is individually hand numbered as part of our first limited production \
                 run, Release 001. This makes every unit unique and collectible.",
    },
    FaqEntry {
        question: "Where do the proceeds go?",
        answer: "All proceeds from Jesse A. Eisenbalm go to charity. We believe premium lip care \
                 can do good in the world while keeping you human.",
    },
    FaqEntry {
        question: "What is the 'Stop. Breathe. Balm.' ritual?",
        answer: "It's a mindfulness practice built into the product experience. Before applying, \
                 you stop what you're doing, take a deep breath, and then apply the balm. It's a \
                 small human ritual for an AI-everywhere world, a moment to be present in your body.",
    },
    FaqEntry {
        question: "Is Jesse A. Eisenbalm cruelty-free?",
        answer: "Yes. Our products are ethically made and we are committed to cruelty-free practices.",
    },
    FaqEntry {
        question: "How do I contact you?",
        answer: "You can reach us at contact@jesseaeisenbalm.com or connect with us on LinkedIn. \
                 For privacy-related inquiries, email privacy@jesseaeisenbalm.com.",
    },
];

/// Countries orders ship to, as ISO 3166-1 alpha-2 codes.
pub const SHIPPING_COUNTRIES: [&str; 10] =
    ["US", "CA", "GB", "AU", "DE", "FR", "IT", "ES", "NL", "BE"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_entries_are_complete() {
        for entry in &FAQ {
            assert!(entry.question.ends_with('?'), "{}", entry.question);
            assert!(!entry.answer.is_empty());
        }
    }

    #[test]
    fn test_faq_mentions_price_and_shipping() {
        assert!(FAQ.iter().any(|e| e.answer.contains("$8.99")));
        assert!(FAQ.iter().any(|e| e.answer.contains("free on all orders")));
    }
}
