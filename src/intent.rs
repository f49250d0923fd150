//! Intent classification for post-activation utterances.
//!
//! Maps an utterance to one of the deterministic intents (date, time,
//! day-of-week, calendar) or to no intent at all, in which case the
//! dispatcher hands the text to the conversational responder.
//!
//! Two passes over the lowercased text:
//!
//! 1. **Pattern pass**: a table of regex templates, sorted by group
//!    priority (Date, Time, Day, Calendar). Date runs first: it is the
//!    most specific group and disambiguates overlapping vocabulary like
//!    "day" and "month". The first matching template wins.
//! 2. **Keyword fallback**: per-intent keyword sets checked in the same
//!    precedence order when no template matched.
//!
//! Classification is total: after construction it never errors, and
//! empty input classifies to no intent.

use crate::config::IntentConfig;
use crate::error::{AssistantError, Result};
use regex::Regex;

/// A deterministic query intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Today's full date.
    Date,
    /// The current time of day.
    Time,
    /// The current day of the week.
    Day,
    /// Facts about the current month.
    Calendar,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Day => write!(f, "day"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

/// Group evaluation order. Lower priority value runs first.
const GROUP_ORDER: &[Intent] = &[Intent::Date, Intent::Time, Intent::Day, Intent::Calendar];

// ── Default pattern and keyword tables ──────────────────────────────

/// Date query templates.
pub const DATE_PATTERNS: &[&str] = &[
    r"what(?:'s| is) (?:the )?date(?:.*?today)?",
    r"today's date",
    r"what (?:is the )?date",
    r"tell me (?:the |today's )?date",
    r"(?:can you )?tell me (?:the )?date",
    r"what (?:is the )?date (?:today|now)",
    r"what day of the month is it",
    r"which date is (?:it|today)",
    r"(?:what|which) date (?:do we have|is it)",
    r"date please",
    r"give me the date",
    r"(?:what|which) date",
    r"date",
];

/// Time query templates.
pub const TIME_PATTERNS: &[&str] = &[
    r"what(?:'s| is) the time",
    r"tell me the time",
    r"current time",
    r"time now",
    r"what time (?:is it|do we have)",
    r"(?:can you )?tell me what time it is",
    r"do you know the time",
    r"check the time",
];

/// Day-of-week query templates.
pub const DAY_PATTERNS: &[&str] = &[
    r"what day is (?:it|today)",
    r"which day is (?:it|today)",
    r"tell me the day",
    r"(?:can you )?tell me what day it is",
    r"what day of the week is it",
    r"is it (?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
];

/// Calendar query templates.
pub const CALENDAR_PATTERNS: &[&str] = &[
    r"(?:read|tell) me this month's calendar",
    r"how many days (?:are )?(?:in|this) (?:this )?month",
    r"tell me about this month",
    r"what month is it",
    r"give me (?:the )?month(?:'s)? details",
    r"tell me about (?:the )?current month",
    r"how long is this month",
];

/// Fallback keywords per intent, checked when no template matched.
pub const DATE_KEYWORDS: &[&str] = &["date", "today", "day", "month"];
/// Time fallback keywords.
pub const TIME_KEYWORDS: &[&str] = &["time", "clock", "hour"];

// ── Classifier ──────────────────────────────────────────────────────

/// One compiled classification rule.
struct IntentRule {
    intent: Intent,
    pattern: Regex,
    priority: u8,
}

/// Regex-table intent classifier.
///
/// All templates are compiled at construction; [`classify`](Self::classify)
/// itself cannot fail.
pub struct IntentClassifier {
    /// Rules sorted by group priority.
    rules: Vec<IntentRule>,
    /// (intent, keywords) fallback, in precedence order.
    fallbacks: Vec<(Intent, Vec<String>)>,
}

impl IntentClassifier {
    /// Compile the classifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the offending template if any regex
    /// fails to compile.
    pub fn new(config: &IntentConfig) -> Result<Self> {
        let mut rules = Vec::new();
        for (priority, intent) in GROUP_ORDER.iter().copied().enumerate() {
            for template in config.patterns_for(intent) {
                let pattern = Regex::new(template).map_err(|e| {
                    AssistantError::Config(format!("invalid {intent} pattern '{template}': {e}"))
                })?;
                rules.push(IntentRule {
                    intent,
                    pattern,
                    priority: priority as u8,
                });
            }
        }
        rules.sort_by_key(|r| r.priority);

        let fallbacks = GROUP_ORDER
            .iter()
            .copied()
            .map(|intent| (intent, config.keywords_for(intent).to_vec()))
            .collect();

        Ok(Self { rules, fallbacks })
    }

    /// Classify an utterance.
    ///
    /// Returns `None` for empty input and for text that matches neither
    /// a template nor a fallback keyword. Never panics.
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<Intent> {
        let text = text.to_lowercase();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        for rule in &self.rules {
            if rule.pattern.is_match(text) {
                return Some(rule.intent);
            }
        }

        for (intent, keywords) in &self.fallbacks {
            if keywords.iter().any(|kw| text.contains(kw.as_str())) {
                return Some(*intent);
            }
        }

        None
    }
}
