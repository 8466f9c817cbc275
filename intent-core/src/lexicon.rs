//! Keyword lexicon driving the intent rules
//!
//! Each field is a canonical concept mapped to the surface forms that express it.
//! The built-in default is the Korean deployment; a JSON override may replace any field.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn forms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Surface forms for every concept the rules look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Termination keywords, checked before everything else
    pub exit: Vec<String>,
    pub timer: TimerLexicon,
    pub volume: VolumeLexicon,
    /// Verbs that make an app mention a launch request
    pub launch_actions: Vec<String>,
    /// Calculator names, including common misrecognitions
    pub calculator: Vec<String>,
    pub notepad: Vec<String>,
    pub search: SearchLexicon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerLexicon {
    /// Unit-of-minutes words that follow the number
    pub units: Vec<String>,
    /// Optional words attached to the unit ("5분짜리")
    pub fillers: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeLexicon {
    /// Volume/sound nouns; direction words only count when one of these is present
    pub nouns: Vec<String>,
    pub increase: Vec<String>,
    pub decrease: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLexicon {
    /// Search verbs that end a query
    pub keywords: Vec<String>,
    /// "at"/"from" markers attached to a site name
    pub site_fillers: Vec<String>,
    /// Trailing grammatical markers stripped from a query (one at most)
    pub particles: Vec<String>,
    pub youtube: Vec<String>,
    pub naver: Vec<String>,
    /// Names of the default search destination, removed as a leading qualifier
    pub google: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            exit: forms(&["종료", "그만", "끝내"]),
            timer: TimerLexicon::default(),
            volume: VolumeLexicon::default(),
            launch_actions: forms(&["열어", "켜", "실행"]),
            calculator: forms(&["계산기", "게산기", "개산기"]),
            notepad: forms(&["메모장", "매모장", "노트"]),
            search: SearchLexicon::default(),
        }
    }
}

impl Default for TimerLexicon {
    fn default() -> Self {
        Self {
            units: forms(&["분"]),
            fillers: forms(&["짜리"]),
            keywords: forms(&["타이머"]),
        }
    }
}

impl Default for VolumeLexicon {
    fn default() -> Self {
        Self {
            nouns: forms(&["볼륨", "소리"]),
            increase: forms(&["높여", "올려", "높이"]),
            decrease: forms(&["낮춰", "줄여", "낮추"]),
        }
    }
}

impl Default for SearchLexicon {
    fn default() -> Self {
        Self {
            keywords: forms(&["검색", "찾아"]),
            site_fillers: forms(&["에서", "에"]),
            particles: forms(&["에서", "을", "를", "은", "는", "도"]),
            youtube: forms(&["유튜브", "유투브"]),
            naver: forms(&["네이버", "내이버"]),
            google: forms(&["구글"]),
        }
    }
}

impl Lexicon {
    /// Parse a lexicon from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lower-case and trim every surface form, dropping duplicates
    pub fn normalized(&self) -> Self {
        fn norm(words: &[String]) -> Vec<String> {
            let mut out: Vec<String> = Vec::with_capacity(words.len());
            for word in words {
                let word = word.trim().to_lowercase();
                if !out.contains(&word) {
                    out.push(word);
                }
            }
            out
        }

        Self {
            exit: norm(&self.exit),
            timer: TimerLexicon {
                units: norm(&self.timer.units),
                fillers: norm(&self.timer.fillers),
                keywords: norm(&self.timer.keywords),
            },
            volume: VolumeLexicon {
                nouns: norm(&self.volume.nouns),
                increase: norm(&self.volume.increase),
                decrease: norm(&self.volume.decrease),
            },
            launch_actions: norm(&self.launch_actions),
            calculator: norm(&self.calculator),
            notepad: norm(&self.notepad),
            search: SearchLexicon {
                keywords: norm(&self.search.keywords),
                site_fillers: norm(&self.search.site_fillers),
                particles: norm(&self.search.particles),
                youtube: norm(&self.search.youtube),
                naver: norm(&self.search.naver),
                google: norm(&self.search.google),
            },
        }
    }

    /// Check that every required concept has at least one form and no form is blank
    pub fn validate(&self) -> Result<()> {
        let required: [(&str, &[String]); 12] = [
            ("exit", &self.exit),
            ("timer.units", &self.timer.units),
            ("timer.keywords", &self.timer.keywords),
            ("volume.nouns", &self.volume.nouns),
            ("volume.increase", &self.volume.increase),
            ("volume.decrease", &self.volume.decrease),
            ("launch_actions", &self.launch_actions),
            ("calculator", &self.calculator),
            ("notepad", &self.notepad),
            ("search.keywords", &self.search.keywords),
            ("search.youtube", &self.search.youtube),
            ("search.naver", &self.search.naver),
        ];
        for (name, words) in required {
            if words.is_empty() {
                return Err(Error::Config(format!("lexicon.{name} must not be empty")));
            }
        }

        let optional: [(&str, &[String]); 4] = [
            ("timer.fillers", &self.timer.fillers),
            ("search.site_fillers", &self.search.site_fillers),
            ("search.particles", &self.search.particles),
            ("search.google", &self.search.google),
        ];
        for (name, words) in required.iter().chain(optional.iter()) {
            if words.iter().any(|w| w.trim().is_empty()) {
                return Err(Error::Config(format!("lexicon.{name} contains a blank entry")));
            }
        }
        Ok(())
    }
}

/// Compiled set of surface forms for one concept
///
/// Leftmost-longest matching, so "에서" wins over "에" at the same position.
#[derive(Debug, Clone)]
pub struct Keywords {
    automaton: Option<AhoCorasick>,
    words: Vec<String>,
}

/// Byte range of a keyword occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
}

impl Keywords {
    pub fn new(words: &[String]) -> Result<Self> {
        let automaton = if words.is_empty() {
            None
        } else {
            let ac = AhoCorasickBuilder::new()
                .match_kind(MatchKind::LeftmostLongest)
                .build(words)
                .map_err(|e| Error::Config(format!("failed to compile keywords: {e}")))?;
            Some(ac)
        };

        Ok(Self {
            automaton,
            words: words.to_vec(),
        })
    }

    /// Check if text contains any of the forms
    pub fn is_match(&self, text: &str) -> bool {
        self.automaton
            .as_ref()
            .is_some_and(|ac| ac.is_match(text))
    }

    /// Leftmost occurrence at or after byte offset `from`
    pub fn find_from(&self, text: &str, from: usize) -> Option<Hit> {
        let ac = self.automaton.as_ref()?;
        let rest = text.get(from..)?;
        ac.find(rest).map(|m| Hit {
            start: from + m.start(),
            end: from + m.end(),
        })
    }

    /// All non-overlapping occurrences, left to right
    pub fn find_all(&self, text: &str) -> Vec<Hit> {
        let Some(ac) = self.automaton.as_ref() else {
            return Vec::new();
        };
        ac.find_iter(text)
            .map(|m| Hit {
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    /// Longest form that `text` ends with
    pub fn suffix_of<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.words
            .iter()
            .filter(|w| text.ends_with(w.as_str()))
            .max_by_key(|w| w.len())
            .map(String::as_str)
    }

    /// Longest form that `text` starts with
    pub fn prefix_of<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.words
            .iter()
            .filter(|w| text.starts_with(w.as_str()))
            .max_by_key(|w| w.len())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_is_valid() {
        Lexicon::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let lexicon = Lexicon::from_json(r#"{"exit": ["stop", "quit"]}"#).unwrap();
        assert_eq!(lexicon.exit, vec!["stop".to_string(), "quit".to_string()]);
        assert_eq!(lexicon.calculator, Lexicon::default().calculator);
        assert_eq!(lexicon.search.youtube, Lexicon::default().search.youtube);
    }

    #[test]
    fn test_nested_partial_json() {
        let lexicon = Lexicon::from_json(r#"{"search": {"keywords": ["search"]}}"#).unwrap();
        assert_eq!(lexicon.search.keywords, vec!["search".to_string()]);
        assert_eq!(lexicon.search.naver, Lexicon::default().search.naver);
    }

    #[test]
    fn test_empty_required_set_rejected() {
        let mut lexicon = Lexicon::default();
        lexicon.exit.clear();
        let err = lexicon.validate().unwrap_err();
        assert!(err.to_string().contains("lexicon.exit"));

        let mut lexicon = Lexicon::default();
        lexicon.search.naver.clear();
        assert!(lexicon.validate().is_err());
    }

    #[test]
    fn test_blank_entry_rejected() {
        let mut lexicon = Lexicon::default();
        lexicon.search.particles.push("  ".to_string());
        let err = lexicon.validate().unwrap_err();
        assert!(err.to_string().contains("search.particles"));
    }

    #[test]
    fn test_optional_sets_may_be_empty() {
        let mut lexicon = Lexicon::default();
        lexicon.timer.fillers.clear();
        lexicon.search.particles.clear();
        lexicon.search.google.clear();
        lexicon.validate().unwrap();
    }

    #[test]
    fn test_normalized_lowercases_and_dedups() {
        let lexicon = Lexicon {
            exit: forms(&[" Stop ", "stop", "QUIT"]),
            ..Lexicon::default()
        };
        assert_eq!(lexicon.normalized().exit, forms(&["stop", "quit"]));
    }

    #[test]
    fn test_keywords_leftmost_longest() {
        let fillers = Keywords::new(&forms(&["에", "에서"])).unwrap();
        let hit = fillers.find_from("유튜브에서", 0).unwrap();
        assert_eq!(&"유튜브에서"[hit.start..hit.end], "에서");
        assert_eq!(fillers.prefix_of("에서 고양이"), Some("에서"));
        assert_eq!(fillers.suffix_of("학교에"), Some("에"));
    }

    #[test]
    fn test_find_from_offsets_are_absolute() {
        let keywords = Keywords::new(&forms(&["검색"])).unwrap();
        let text = "검색 고양이 검색";
        let first = keywords.find_from(text, 0).unwrap();
        let second = keywords.find_from(text, first.end).unwrap();
        assert_eq!(first.start, 0);
        assert_eq!(&text[second.start..second.end], "검색");
        assert!(second.start > first.end);
        assert_eq!(keywords.find_all(text).len(), 2);
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let keywords = Keywords::new(&[]).unwrap();
        assert!(!keywords.is_match("anything"));
        assert!(keywords.find_from("anything", 0).is_none());
        assert!(keywords.find_all("anything").is_empty());
    }
}
