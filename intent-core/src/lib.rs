//! Voice Intent - rule-based command classification for a voice assistant
//!
//! Maps a transcribed utterance to one of a fixed set of commands plus an optional
//! parameter, then dispatches it to system collaborators (volume, apps, browser, timers).

pub mod assistant;
pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ffi;
pub mod lexicon;
pub mod query;
pub mod system;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

// Export FFI functions at crate root for C header generation
pub use ffi::*;

pub use assistant::Assistant;
pub use classifier::{IntentClassifier, Rule, classify};
pub use config::Config;
pub use dispatch::{
    AppLauncher, BrowserOpener, DispatchConfig, Dispatcher, Flow, LogNotifier, Notifier,
    SearchUrls, TimerScheduler, VolumeControl,
};
pub use lexicon::Lexicon;
pub use system::{
    AppCommands, SoftwareVolume, SystemAppLauncher, SystemBrowser, TokioTimer, system_dispatcher,
};
