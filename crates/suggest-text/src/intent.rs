//! Shallow intent detection over the normalized query.
//!
//! Intent is advisory metadata: it selects suggestion templates and shows
//! up in debug output, but never hard-filters candidates.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Book,
    Hire,
    Review,
    Compare,
    Generic,
}

const BOOK_KEYWORDS: [&str; 3] = ["book", "schedule", "reserve"];
const HIRE_KEYWORDS: [&str; 4] = ["hire", "find", "near me", "nearby"];
const REVIEW_KEYWORDS: [&str; 3] = ["review", "reviews", "rating"];
const COMPARE_KEYWORDS: [&str; 3] = ["compare", "vs", "best"];

const GENERIC_TEMPLATES: [&str; 5] = [
    "Top-rated {base} near you",
    "Affordable {base} in {city}",
    "Trusted {base} nearby",
    "Best {base} in {city}",
    "Experienced {base} near me",
];

impl Intent {
    pub fn detect(normalized_query: &str) -> Self {
        let q = normalized_query;
        if BOOK_KEYWORDS.iter().any(|w| q.contains(w)) {
            return Self::Book;
        }
        if HIRE_KEYWORDS.iter().any(|w| q.contains(w)) {
            return Self::Hire;
        }
        if REVIEW_KEYWORDS.iter().any(|w| q.contains(w)) {
            return Self::Review;
        }
        if COMPARE_KEYWORDS.iter().any(|w| q.contains(w)) {
            return Self::Compare;
        }
        Self::Generic
    }

    /// Ordered suggestion templates with `{base}` and `{city}` placeholders.
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            Self::Book => &[
                "Book {base} in {city}",
                "Schedule with {base} near you",
                "Reserve {base} today",
            ],
            Self::Hire => &[
                "Top-rated {base} near you",
                "Best {base} in {city}",
                "Trusted {base} nearby",
            ],
            Self::Review => &[
                "Highest-rated {base} in {city}",
                "{base} with great reviews",
                "Most trusted {base} near you",
            ],
            Self::Compare => &[
                "Compare {base} in {city}",
                "Top {base} options near you",
                "Best {base} nearby",
            ],
            Self::Generic => &GENERIC_TEMPLATES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Hire => "hire",
            Self::Review => "review",
            Self::Compare => "compare",
            Self::Generic => "generic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_intents_in_priority_order() {
        assert_eq!(Intent::detect("book a plumber"), Intent::Book);
        assert_eq!(Intent::detect("doctor near me"), Intent::Hire);
        assert_eq!(Intent::detect("dentist reviews"), Intent::Review);
        assert_eq!(Intent::detect("compare electricians"), Intent::Compare);
        assert_eq!(Intent::detect("sushi"), Intent::Generic);
        // booking verbs win over hire words
        assert_eq!(Intent::detect("book a doctor near me"), Intent::Book);
    }

    #[test]
    fn every_intent_has_a_cityless_template() {
        for intent in [
            Intent::Book,
            Intent::Hire,
            Intent::Review,
            Intent::Compare,
            Intent::Generic,
        ] {
            assert!(
                intent.templates().iter().any(|t| !t.contains("{city}")),
                "{} needs a template usable without a resolved city",
                intent.as_str()
            );
        }
    }
}
