//! Default collaborators backed by the host system
//!
//! Launchers spawn the platform's own tools and return immediately; the timer runs on the
//! tokio runtime so scheduling never blocks the listening loop.

use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::dispatch::{
    AppLauncher, BrowserOpener, DispatchConfig, Dispatcher, Notifier, TimerScheduler,
    VolumeControl,
};
use crate::error::{Error, Result};
use crate::types::App;

fn command_line(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Command lines used to launch each app; the first element is the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppCommands {
    pub calculator: Vec<String>,
    pub notepad: Vec<String>,
}

impl Default for AppCommands {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self {
                calculator: command_line(&["calc.exe"]),
                notepad: command_line(&["notepad.exe"]),
            }
        } else if cfg!(target_os = "macos") {
            Self {
                calculator: command_line(&["open", "-a", "Calculator"]),
                notepad: command_line(&["open", "-a", "TextEdit"]),
            }
        } else {
            Self {
                calculator: command_line(&["gnome-calculator"]),
                notepad: command_line(&["gedit"]),
            }
        }
    }
}

impl AppCommands {
    pub fn for_app(&self, app: App) -> &[String] {
        match app {
            App::Calculator => &self.calculator,
            App::Notepad => &self.notepad,
        }
    }
}

fn spawn_detached(parts: &[String]) -> Result<()> {
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| Error::Launch("empty command line".to_string()))?;

    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Launch(format!("{program}: {e}")))?;
    Ok(())
}

/// Launches apps by spawning their configured command lines
#[derive(Debug, Clone, Default)]
pub struct SystemAppLauncher {
    commands: AppCommands,
}

impl SystemAppLauncher {
    pub fn new(commands: AppCommands) -> Self {
        Self { commands }
    }
}

impl AppLauncher for SystemAppLauncher {
    fn launch(&self, app: App) -> Result<()> {
        let parts = self.commands.for_app(app);
        debug!("Launching {:?} via {:?}", app, parts);
        spawn_detached(parts)
    }
}

/// Opens URLs with the platform's default browser handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let parts = if cfg!(target_os = "windows") {
            command_line(&["rundll32", "url.dll,FileProtocolHandler", url])
        } else if cfg!(target_os = "macos") {
            command_line(&["open", url])
        } else {
            command_line(&["xdg-open", url])
        };
        spawn_detached(&parts)
    }
}

/// In-process volume level, for hosts without a mixer API and for tests
#[derive(Debug)]
pub struct SoftwareVolume {
    level: Mutex<f32>,
}

impl SoftwareVolume {
    pub fn new(initial: f32) -> Self {
        Self {
            level: Mutex::new(initial.clamp(0.0, 1.0)),
        }
    }
}

impl Default for SoftwareVolume {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl VolumeControl for SoftwareVolume {
    fn level(&self) -> Result<f32> {
        Ok(*self.level.lock())
    }

    fn set_level(&self, level: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(Error::Volume(format!("level {level} out of range")));
        }
        *self.level.lock() = level;
        Ok(())
    }
}

/// One-shot timers as tokio tasks that notify when they elapse
pub struct TokioTimer {
    handle: Handle,
    notifier: Arc<dyn Notifier>,
}

impl TokioTimer {
    pub fn new(handle: Handle, notifier: Arc<dyn Notifier>) -> Self {
        Self { handle, notifier }
    }

    /// Bind to the runtime of the calling context
    pub fn current(notifier: Arc<dyn Notifier>) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::Timer(format!("no tokio runtime: {e}")))?;
        Ok(Self::new(handle, notifier))
    }
}

impl TimerScheduler for TokioTimer {
    fn schedule(&self, minutes: u32) -> Result<()> {
        let notifier = Arc::clone(&self.notifier);
        let delay = Duration::from_secs(u64::from(minutes) * 60);

        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            info!("{} minute timer elapsed", minutes);
            notifier.notify(&format!("Your {minutes} minute timer is done!"));
        });
        Ok(())
    }
}

/// Dispatcher wired to the default system collaborators.
///
/// Must be called inside a tokio runtime, which hosts the timers.
pub fn system_dispatcher(
    config: DispatchConfig,
    volume: Arc<dyn VolumeControl>,
    notifier: Arc<dyn Notifier>,
) -> Result<Dispatcher> {
    let timer = TokioTimer::current(Arc::clone(&notifier))?;
    let launcher = SystemAppLauncher::new(config.apps.clone());

    Ok(Dispatcher::new(
        config,
        volume,
        Arc::new(launcher),
        Arc::new(SystemBrowser),
        Arc::new(timer),
        notifier,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    #[test]
    fn test_software_volume_clamps_initial() {
        assert_eq!(SoftwareVolume::new(1.7).level().unwrap(), 1.0);
        assert_eq!(SoftwareVolume::new(-0.2).level().unwrap(), 0.0);
    }

    #[test]
    fn test_software_volume_rejects_out_of_range() {
        let volume = SoftwareVolume::default();
        assert!(volume.set_level(1.5).is_err());
        volume.set_level(0.8).unwrap();
        assert_eq!(volume.level().unwrap(), 0.8);
    }

    #[test]
    fn test_empty_command_line_is_launch_error() {
        let launcher = SystemAppLauncher::new(AppCommands {
            calculator: Vec::new(),
            notepad: Vec::new(),
        });
        let err = launcher.launch(App::Calculator).unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let launcher = SystemAppLauncher::new(AppCommands {
            calculator: command_line(&["definitely-not-a-real-program-xyz"]),
            notepad: Vec::new(),
        });
        assert!(launcher.launch(App::Calculator).is_err());
    }

    #[test]
    fn test_timer_requires_runtime() {
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
        assert!(TokioTimer::current(notifier).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_notifies_after_delay() {
        let recorder = Arc::new(RecordingNotifier::default());
        let notifier: Arc<dyn Notifier> = recorder.clone();
        let timer = TokioTimer::current(notifier).unwrap();

        timer.schedule(2).unwrap();

        tokio::time::sleep(Duration::from_secs(119)).await;
        tokio::task::yield_now().await;
        assert!(recorder.messages.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(
            recorder.messages.lock().as_slice(),
            ["Your 2 minute timer is done!".to_string()]
        );
    }
}
