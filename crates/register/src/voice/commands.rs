//! Voice command registry and resolution.

use serde::Serialize;
use tracing::debug;

use super::matcher::{
    CONTAINMENT_SCORE, MATCH_THRESHOLD, PAGE_PRIMARY_SCORE, normalize, similarity,
};

/// A spoken command and what it does.
///
/// `command` names the command. The first phrase is the primary phrase, the
/// rest are alternates. A command without phrases answers to its name; once
/// phrases are given, `command` is only a label and is never matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCommand<A> {
    pub command: String,
    pub phrases: Vec<String>,
    pub action: A,
}

impl<A> VoiceCommand<A> {
    /// A command answering to its own name.
    pub fn new(command: impl Into<String>, action: A) -> Self {
        Self {
            command: command.into(),
            phrases: Vec::new(),
            action,
        }
    }

    /// Set the phrases, primary first.
    #[must_use]
    pub fn with_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Phrases in match order, each flagged whether it is the primary one.
    fn phrase_list(&self) -> impl Iterator<Item = (&str, bool)> {
        let phrases: &[String] = if self.phrases.is_empty() {
            std::slice::from_ref(&self.command)
        } else {
            &self.phrases
        };
        phrases
            .iter()
            .enumerate()
            .map(|(i, phrase)| (phrase.as_str(), i == 0))
    }
}

/// Where a command is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Active on the current page only.
    Page,
    /// Always active.
    Global,
}

/// How a transcript matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Containment,
    Fuzzy,
}

/// A resolved command.
#[derive(Debug, Clone, Copy)]
pub struct VoiceMatch<'a, A> {
    pub command: &'a VoiceCommand<A>,
    pub scope: Scope,
    pub phrase: &'a str,
    pub kind: MatchKind,
    pub score: f64,
}

impl<A> VoiceMatch<'_, A> {
    #[must_use]
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            command: self.command.command.clone(),
            scope: self.scope,
            phrase: self.phrase.to_string(),
            kind: self.kind,
            score: self.score,
        }
    }
}

/// Owned description of a match, for responses and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub command: String,
    pub scope: Scope,
    pub phrase: String,
    pub kind: MatchKind,
    pub score: f64,
}

/// Global and page-scoped voice commands.
#[derive(Debug, Clone)]
pub struct VoiceDispatcher<A> {
    global: Vec<VoiceCommand<A>>,
    page: Vec<VoiceCommand<A>>,
    page_name: Option<String>,
}

impl<A> VoiceDispatcher<A> {
    /// A dispatcher with the given always-active commands and no page commands.
    #[must_use]
    pub const fn new(global: Vec<VoiceCommand<A>>) -> Self {
        Self {
            global,
            page: Vec::new(),
            page_name: None,
        }
    }

    /// Replace every page-scoped command.
    pub fn set_page_commands(&mut self, page: impl Into<String>, commands: Vec<VoiceCommand<A>>) {
        let page = page.into();
        debug!(%page, count = commands.len(), "Page voice commands registered");
        self.page = commands;
        self.page_name = Some(page);
    }

    /// Drop the page-scoped commands.
    pub fn clear_page_commands(&mut self) {
        self.page.clear();
        self.page_name = None;
    }

    #[must_use]
    pub fn page_name(&self) -> Option<&str> {
        self.page_name.as_deref()
    }

    /// Commands in discovery order: page-scoped first.
    pub fn commands(&self) -> impl Iterator<Item = (Scope, &VoiceCommand<A>)> {
        self.page
            .iter()
            .map(|c| (Scope::Page, c))
            .chain(self.global.iter().map(|c| (Scope::Global, c)))
    }

    /// Find the command a final transcript refers to.
    ///
    /// An exact phrase match wins immediately. Otherwise every phrase the
    /// transcript contains, or that scores at least [`MATCH_THRESHOLD`], is a
    /// candidate and the highest score wins; ties go to the earliest
    /// candidate.
    #[must_use]
    pub fn resolve(&self, transcript: &str) -> Option<VoiceMatch<'_, A>> {
        let transcript = normalize(transcript);
        if transcript.is_empty() {
            return None;
        }

        for (scope, command) in self.commands() {
            for (phrase, _) in command.phrase_list() {
                if normalize(phrase) == transcript {
                    return Some(VoiceMatch {
                        command,
                        scope,
                        phrase,
                        kind: MatchKind::Exact,
                        score: 1.0,
                    });
                }
            }
        }

        let mut best: Option<VoiceMatch<'_, A>> = None;
        for (scope, command) in self.commands() {
            for (phrase, primary) in command.phrase_list() {
                let normalized = normalize(phrase);
                if normalized.is_empty() {
                    continue;
                }
                let (kind, score) = if transcript.contains(&normalized) {
                    let score = if primary && scope == Scope::Page {
                        PAGE_PRIMARY_SCORE
                    } else {
                        CONTAINMENT_SCORE
                    };
                    (MatchKind::Containment, score)
                } else {
                    (MatchKind::Fuzzy, similarity(&transcript, &normalized))
                };
                if score < MATCH_THRESHOLD {
                    continue;
                }
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(VoiceMatch {
                        command,
                        scope,
                        phrase,
                        kind,
                        score,
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn global() -> Vec<VoiceCommand<&'static str>> {
        vec![
            VoiceCommand::new("home", "nav:home").with_phrases(["home", "go home", "dashboard"]),
            VoiceCommand::new("orders", "nav:orders").with_phrases(["orders", "show orders"]),
        ]
    }

    #[test]
    fn test_exact_global_beats_page_containment() {
        let mut voice = VoiceDispatcher::new(global());
        voice.set_page_commands(
            "pos",
            vec![VoiceCommand::new("fries", "add:fries").with_phrases(["add home fries"])],
        );

        let found = voice.resolve("Home").unwrap();
        assert_eq!(found.action_ref(), &"nav:home");
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn test_page_primary_containment_outranks_global() {
        let mut voice = VoiceDispatcher::new(global());
        voice.set_page_commands(
            "orders",
            vec![VoiceCommand::new("refund", "refund").with_phrases(["orders refund"])],
        );

        let found = voice.resolve("please orders refund now").unwrap();
        assert_eq!(found.command.command, "refund");
        assert!((found.score - PAGE_PRIMARY_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let mut voice = VoiceDispatcher::new(global());
        voice.set_page_commands(
            "pos",
            vec![VoiceCommand::new("receipts", "receipts").with_phrases(["receipts", "show orders"])],
        );

        // Page alternate and global primary both score 0.9; the page one was found first.
        let found = voice.resolve("please show orders").unwrap();
        assert_eq!(found.command.command, "receipts");
        assert_eq!(found.scope, Scope::Page);
    }

    #[test]
    fn test_whole_word_overlap_is_brittle() {
        let voice = VoiceDispatcher::new(vec![
            VoiceCommand::new("products", ()).with_phrases(["show products", "product list"]),
        ]);
        assert!(voice.resolve("show me the products list").is_none());
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let voice = VoiceDispatcher::new(vec![
            VoiceCommand::new("orders", ()).with_phrases(["open orders page"]),
        ]);
        let found = voice.resolve("open the orders page").unwrap();
        assert_eq!(found.kind, MatchKind::Fuzzy);
        assert!((found.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_command_name_is_default_phrase() {
        let voice = VoiceDispatcher::new(vec![VoiceCommand::new("logout", ())]);
        assert_eq!(voice.resolve("logout").unwrap().kind, MatchKind::Exact);
    }

    #[test]
    fn test_page_commands_replaced_wholesale() {
        let mut voice = VoiceDispatcher::new(global());
        voice.set_page_commands("pos", vec![VoiceCommand::new("checkout", "checkout")]);
        voice.set_page_commands("orders", vec![VoiceCommand::new("refund", "refund")]);

        assert!(voice.resolve("checkout").is_none());
        assert!(voice.resolve("refund").is_some());
        assert_eq!(voice.page_name(), Some("orders"));

        voice.clear_page_commands();
        assert!(voice.resolve("refund").is_none());
    }

    #[test]
    fn test_resolve_returns_matched_action() {
        let voice = VoiceDispatcher::new(vec![
            VoiceCommand::new("home", 1).with_phrases(["go home"]),
            VoiceCommand::new("orders", 2).with_phrases(["show orders"]),
        ]);

        assert!(voice.resolve("go somewhere else entirely").is_none());
        let found = voice.resolve("please show orders").unwrap();
        assert_eq!(found.summary().command, "orders");
        assert_eq!(found.command.action, 2);
    }

    #[test]
    fn test_label_not_matched_once_phrases_given() {
        let voice = VoiceDispatcher::new(vec![
            VoiceCommand::new("checkout", ()).with_phrases(["pay now"]),
        ]);
        assert!(voice.resolve("checkout").is_none());
        assert!(voice.resolve("pay now").is_some());
    }

    #[test]
    fn test_blank_transcript_ignored() {
        let voice = VoiceDispatcher::new(global());
        assert!(voice.resolve("   ").is_none());
    }

    impl<A> VoiceMatch<'_, A> {
        fn action_ref(&self) -> &A {
            &self.command.action
        }
    }
}
