//! Action dispatch for classified intents
//!
//! Each intent maps to one collaborator behind a trait. Collaborator failures are caught
//! here, logged and reported to the user; they never stop the listening loop.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::system::AppCommands;
use crate::types::{App, ClassificationResult, Intent};

/// Whether the assistant keeps listening after an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Surfaces short messages to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// System output volume, as a scalar in [0.0, 1.0]
pub trait VolumeControl: Send + Sync {
    fn level(&self) -> Result<f32>;

    fn set_level(&self, level: f32) -> Result<()>;
}

pub trait AppLauncher: Send + Sync {
    fn launch(&self, app: App) -> Result<()>;
}

pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Schedules a one-shot notification; must not block the caller
pub trait TimerScheduler: Send + Sync {
    fn schedule(&self, minutes: u32) -> Result<()>;
}

/// Notifier that writes to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!("{}", message);
    }
}

/// Search result page templates; `{query}` is replaced by the encoded query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchUrls {
    pub youtube: String,
    pub google: String,
    pub naver: String,
}

impl Default for SearchUrls {
    fn default() -> Self {
        Self {
            youtube: "https://www.youtube.com/results?search_query={query}".to_string(),
            google: "https://www.google.com/search?q={query}".to_string(),
            naver: "https://search.naver.com/search.naver?query={query}".to_string(),
        }
    }
}

impl SearchUrls {
    /// Build the results URL for a search intent
    pub fn url_for(&self, intent: Intent, encoded_query: &str) -> Option<String> {
        let template = match intent {
            Intent::SearchYoutube => &self.youtube,
            Intent::SearchGoogle => &self.google,
            Intent::SearchNaver => &self.naver,
            _ => return None,
        };
        Some(template.replace("{query}", encoded_query))
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Volume change per command, as a fraction of full scale
    pub volume_step: f32,
    pub search_urls: SearchUrls,
    pub apps: AppCommands,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            volume_step: 0.1,
            search_urls: SearchUrls::default(),
            apps: AppCommands::default(),
        }
    }
}

/// Routes classification results to their collaborators
pub struct Dispatcher {
    config: DispatchConfig,
    volume: Arc<dyn VolumeControl>,
    launcher: Arc<dyn AppLauncher>,
    browser: Arc<dyn BrowserOpener>,
    timer: Arc<dyn TimerScheduler>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(
        config: DispatchConfig,
        volume: Arc<dyn VolumeControl>,
        launcher: Arc<dyn AppLauncher>,
        browser: Arc<dyn BrowserOpener>,
        timer: Arc<dyn TimerScheduler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            volume,
            launcher,
            browser,
            timer,
            notifier,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Perform the action for a result. Only `Intent::Exit` stops the loop.
    pub fn dispatch(&self, result: &ClassificationResult) -> Flow {
        match result.intent {
            Intent::Exit => {
                self.notifier.notify("Stop command received, exiting.");
                return Flow::Exit;
            }
            Intent::SetTimer => match result.parameter.minutes() {
                Some(minutes) => {
                    self.notifier
                        .notify(&format!("Setting a {minutes} minute timer."));
                    self.report("set the timer", self.timer.schedule(minutes));
                }
                None => self.reject(result),
            },
            Intent::VolumeUp => {
                let step = self.config.volume_step;
                self.report_volume(self.adjust_volume(step));
            }
            Intent::VolumeDown => {
                let step = self.config.volume_step;
                self.report_volume(self.adjust_volume(-step));
            }
            Intent::OpenCalculator | Intent::OpenNotepad => {
                if let Some(app) = App::for_intent(result.intent) {
                    self.notifier
                        .notify(&format!("Opening the {}...", app.display_name()));
                    let action = format!("open the {}", app.display_name());
                    self.report(&action, self.launcher.launch(app));
                }
            }
            Intent::SearchYoutube | Intent::SearchGoogle | Intent::SearchNaver => {
                match result.parameter.query() {
                    Some(encoded) => self.open_search(result.intent, encoded),
                    None => self.reject(result),
                }
            }
            Intent::Unknown => {
                self.notifier
                    .notify("Sorry, I didn't understand that. Please try again.");
            }
        }

        Flow::Continue
    }

    /// Move the volume by `delta`, clamped to [0.0, 1.0]. Returns the new level.
    pub fn adjust_volume(&self, delta: f32) -> Result<f32> {
        let current = self.volume.level()?;
        let level = (current + delta).clamp(0.0, 1.0);
        self.volume.set_level(level)?;
        Ok(level)
    }

    fn open_search(&self, intent: Intent, encoded: &str) {
        let Some(url) = self.config.search_urls.url_for(intent, encoded) else {
            return;
        };
        let shown = urlencoding::decode(encoded)
            .map(|q| q.into_owned())
            .unwrap_or_else(|_| encoded.to_string());

        info!("Opening {} results: {}", intent, url);
        self.notifier
            .notify(&format!("Searching for \"{shown}\", opening the browser."));
        self.report("open the browser", self.browser.open(&url));
    }

    fn report_volume(&self, outcome: Result<f32>) {
        match outcome {
            Ok(level) => {
                let percent = (level * 100.0).round() as u32;
                self.notifier.notify(&format!("Volume set to {percent}%."));
            }
            Err(e) => self.report("change the volume", Err(e)),
        }
    }

    fn report(&self, action: &str, outcome: Result<()>) {
        if let Err(e) = outcome {
            error!("Failed to {}: {}", action, e);
            self.notifier.notify(&format!("Could not {action}: {e}"));
        }
    }

    fn reject(&self, result: &ClassificationResult) {
        warn!(
            "Ignoring {} with unexpected parameter {:?}",
            result.intent, result.parameter
        );
        self.notifier
            .notify("Sorry, I didn't understand that. Please try again.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_templates() {
        let urls = SearchUrls::default();
        assert_eq!(
            urls.url_for(Intent::SearchYoutube, "%EA%B3%A0").unwrap(),
            "https://www.youtube.com/results?search_query=%EA%B3%A0"
        );
        assert_eq!(
            urls.url_for(Intent::SearchGoogle, "a%20b").unwrap(),
            "https://www.google.com/search?q=a%20b"
        );
        assert_eq!(
            urls.url_for(Intent::SearchNaver, "x").unwrap(),
            "https://search.naver.com/search.naver?query=x"
        );
        assert!(urls.url_for(Intent::VolumeUp, "x").is_none());
    }

    #[test]
    fn test_dispatch_config_defaults() {
        let config: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
        assert!((config.volume_step - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_search_urls() {
        let config: DispatchConfig = serde_json::from_str(
            r#"{"volume_step": 0.05, "search_urls": {"google": "https://duckduckgo.com/?q={query}"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.search_urls.url_for(Intent::SearchGoogle, "q").unwrap(),
            "https://duckduckgo.com/?q=q"
        );
        assert_eq!(config.search_urls.naver, SearchUrls::default().naver);
    }
}
