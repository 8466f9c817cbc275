//! Intent classification engine
//!
//! An utterance is normalized and run through an ordered list of rules; the first rule
//! that matches decides the intent. Termination and device control come before search
//! because search patterns are broad, and named sites come before the default search.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lexicon::{Keywords, Lexicon, TimerLexicon};
use crate::query::{QueryExtractor, normalize};
use crate::types::{ClassificationResult, Intent, Parameter};

static DEFAULT_CLASSIFIER: LazyLock<IntentClassifier> = LazyLock::new(IntentClassifier::new);

/// Classify an utterance with the built-in lexicon
pub fn classify(text: &str) -> ClassificationResult {
    DEFAULT_CLASSIFIER.classify(text)
}

/// How a rule recognizes its intent and what it extracts
#[derive(Debug, Clone)]
enum Matcher {
    /// Any form of one concept
    AnyOf(Keywords),
    /// At least one form of every concept, e.g. a volume noun and a direction
    AllOf(Vec<Keywords>),
    /// "<digits> <unit> [filler] <keyword>", yields minutes
    Timer(Regex),
    /// "<site> [filler] <query> <search keyword>", yields the encoded query
    SiteSearch(Keywords),
    /// "<query> <search keyword>", yields the encoded query
    GenericSearch,
}

/// One entry in the ordered rule cascade
#[derive(Debug, Clone)]
pub struct Rule {
    intent: Intent,
    matcher: Matcher,
}

impl Rule {
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Returns the parameter when the rule matches the normalized text
    fn evaluate(&self, text: &str, queries: &QueryExtractor) -> Option<Parameter> {
        match &self.matcher {
            Matcher::AnyOf(keywords) => keywords.is_match(text).then_some(Parameter::None),
            Matcher::AllOf(sets) => sets
                .iter()
                .all(|set| set.is_match(text))
                .then_some(Parameter::None),
            Matcher::Timer(pattern) => pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
                .find(|minutes| *minutes > 0)
                .map(Parameter::Minutes),
            Matcher::SiteSearch(sites) => queries.site_query(text, sites).map(Parameter::Query),
            Matcher::GenericSearch => queries.generic_query(text).map(Parameter::Query),
        }
    }
}

fn alternation(words: &[String]) -> String {
    let mut words: Vec<&String> = words.iter().collect();
    // longest first so a longer form is not shadowed by its prefix
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

fn timer_pattern(timer: &TimerLexicon) -> Result<Regex> {
    let filler = if timer.fillers.is_empty() {
        String::new()
    } else {
        format!("(?:{})?", alternation(&timer.fillers))
    };
    let pattern = format!(
        r"([0-9]+)\s*(?:{}){}\s*(?:{})",
        alternation(&timer.units),
        filler,
        alternation(&timer.keywords)
    );
    Regex::new(&pattern).map_err(|e| Error::Config(format!("invalid timer pattern: {e}")))
}

/// Rule-based intent classifier
///
/// Holds no state beyond the compiled lexicon, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<Rule>,
    queries: QueryExtractor,
}

impl IntentClassifier {
    /// Create a classifier with the built-in lexicon
    pub fn new() -> Self {
        Self::from_lexicon(&Lexicon::default()).expect("built-in lexicon compiles")
    }

    /// Compile a classifier from a lexicon, validating it first
    pub fn from_lexicon(lexicon: &Lexicon) -> Result<Self> {
        let lexicon = lexicon.normalized();
        lexicon.validate()?;

        let volume_nouns = Keywords::new(&lexicon.volume.nouns)?;
        let launch_actions = Keywords::new(&lexicon.launch_actions)?;

        let rules = vec![
            Rule {
                intent: Intent::Exit,
                matcher: Matcher::AnyOf(Keywords::new(&lexicon.exit)?),
            },
            Rule {
                intent: Intent::SetTimer,
                matcher: Matcher::Timer(timer_pattern(&lexicon.timer)?),
            },
            Rule {
                intent: Intent::VolumeUp,
                matcher: Matcher::AllOf(vec![
                    volume_nouns.clone(),
                    Keywords::new(&lexicon.volume.increase)?,
                ]),
            },
            Rule {
                intent: Intent::VolumeDown,
                matcher: Matcher::AllOf(vec![
                    volume_nouns,
                    Keywords::new(&lexicon.volume.decrease)?,
                ]),
            },
            Rule {
                intent: Intent::OpenCalculator,
                matcher: Matcher::AllOf(vec![
                    Keywords::new(&lexicon.calculator)?,
                    launch_actions.clone(),
                ]),
            },
            Rule {
                intent: Intent::OpenNotepad,
                matcher: Matcher::AllOf(vec![
                    Keywords::new(&lexicon.notepad)?,
                    launch_actions,
                ]),
            },
            Rule {
                intent: Intent::SearchYoutube,
                matcher: Matcher::SiteSearch(Keywords::new(&lexicon.search.youtube)?),
            },
            Rule {
                intent: Intent::SearchNaver,
                matcher: Matcher::SiteSearch(Keywords::new(&lexicon.search.naver)?),
            },
            Rule {
                intent: Intent::SearchGoogle,
                matcher: Matcher::GenericSearch,
            },
        ];

        debug!("Compiled intent classifier with {} rules", rules.len());

        Ok(Self {
            rules,
            queries: QueryExtractor::new(&lexicon.search)?,
        })
    }

    /// Classify an utterance. Never fails; unmatched input is `Intent::Unknown`.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let text = normalize(text);

        for rule in &self.rules {
            if let Some(parameter) = rule.evaluate(&text, &self.queries) {
                debug!("Classified {:?} as {}", text, rule.intent);
                return ClassificationResult::new(rule.intent, parameter);
            }
        }

        debug!("No rule matched {:?}", text);
        ClassificationResult::unknown()
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
