//! Keyword router — maps an utterance to the set of data sources to pull.
//!
//! Routing is a pure function of the lower-cased utterance text and a static
//! trigger table. The table is data, not control flow: each category owns an
//! ordered list of trigger substrings, and a category is selected when any
//! of its triggers occurs anywhere in the utterance. Overlap across
//! categories is allowed and common ("search my schedule" pulls both).

use std::collections::BTreeSet;

use deskmate_core::collaborator::SourceTag;

/// The trigger table: category → trigger substrings.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    rules: Vec<(SourceTag, Vec<String>)>,
}

impl RoutingTable {
    /// The built-in trigger set.
    pub fn new() -> Self {
        Self {
            rules: vec![
                (
                    SourceTag::Academic,
                    to_owned(&[
                        "due", "homework", "assignment", "grade", "class", "course", "missing",
                        "overdue", "submit", "exam", "quiz", "syllabus",
                    ]),
                ),
                (
                    SourceTag::Calendar,
                    to_owned(&[
                        "calendar", "schedule", "event", "meeting", "appointment", "agenda",
                        "busy", "free time",
                    ]),
                ),
                (
                    SourceTag::Search,
                    to_owned(&[
                        "search", "look up", "google", "news", "latest", "current", "who is",
                        "what is", "when did",
                    ]),
                ),
                (
                    SourceTag::Weather,
                    to_owned(&[
                        "weather", "temperature", "forecast", "rain", "snow", "umbrella",
                        "sunny", "cold out", "hot out",
                    ]),
                ),
            ],
        }
    }

    /// Append extra triggers to a category.
    pub fn with_triggers(mut self, tag: SourceTag, extra: &[&str]) -> Self {
        if let Some((_, triggers)) = self.rules.iter_mut().find(|(t, _)| *t == tag) {
            triggers.extend(extra.iter().map(|s| s.to_lowercase()));
        }
        self
    }

    /// Select the source categories for one utterance.
    ///
    /// Deterministic, no I/O, cannot fail. Returns the empty set when no
    /// trigger matches — the cheapest path, no collaborator is invoked.
    pub fn route(&self, utterance: &str) -> BTreeSet<SourceTag> {
        let lowered = utterance.to_lowercase();
        self.rules
            .iter()
            .filter(|(_, triggers)| triggers.iter().any(|t| lowered.contains(t.as_str())))
            .map(|(tag, _)| *tag)
            .collect()
    }

    /// The trigger terms for a category (for diagnostics and docs).
    pub fn triggers(&self, tag: SourceTag) -> &[String] {
        self.rules
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, triggers)| triggers.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

fn to_owned(triggers: &[&str]) -> Vec<String> {
    triggers.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keywords_returns_empty_set() {
        let table = RoutingTable::new();
        assert!(table.route("hello there, how are you?").is_empty());
        assert!(table.route("tell me a joke").is_empty());
    }

    #[test]
    fn single_category_returns_singleton() {
        let table = RoutingTable::new();

        let academic = table.route("what's due this week");
        assert_eq!(academic.len(), 1);
        assert!(academic.contains(&SourceTag::Academic));

        let weather = table.route("do I need an umbrella today?");
        assert_eq!(weather.len(), 1);
        assert!(weather.contains(&SourceTag::Weather));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let table = RoutingTable::new();
        let tags = table.route("WHAT IS DUE FOR HOMEWORK");
        assert!(tags.contains(&SourceTag::Academic));
    }

    #[test]
    fn overlapping_categories_all_selected() {
        let table = RoutingTable::new();
        let tags = table.route("search for my schedule");
        assert!(tags.contains(&SourceTag::Search));
        assert!(tags.contains(&SourceTag::Calendar));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn substring_matches_anywhere_in_utterance() {
        let table = RoutingTable::new();
        let tags = table.route("ugh, I completely forgot about that assignment");
        assert!(tags.contains(&SourceTag::Academic));
    }

    #[test]
    fn routing_is_deterministic() {
        let table = RoutingTable::new();
        let a = table.route("search the news and check my grade");
        let b = table.route("search the news and check my grade");
        assert_eq!(a, b);
    }

    #[test]
    fn extra_triggers_extend_a_category() {
        let table = RoutingTable::new().with_triggers(SourceTag::Academic, &["canvas"]);
        let tags = table.route("anything new on canvas?");
        assert!(tags.contains(&SourceTag::Academic));
    }

    #[test]
    fn result_iterates_in_assembly_order() {
        let table = RoutingTable::new();
        let tags = table.route("weather and homework and my schedule and the latest news");
        let order: Vec<SourceTag> = tags.into_iter().collect();
        assert_eq!(order, SourceTag::ASSEMBLY_ORDER.to_vec());
    }

    #[test]
    fn multi_word_trigger_matches() {
        let table = RoutingTable::new();
        let tags = table.route("look up the mars rover mission");
        assert!(tags.contains(&SourceTag::Search));
    }
}
