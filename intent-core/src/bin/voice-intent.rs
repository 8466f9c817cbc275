//! Voice Intent CLI
//!
//! Reads one transcribed utterance per line from stdin and acts on it, standing in for the
//! speech recognizer. Exits on a stop command or at end of input.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use voice_intent::{
    Assistant, Config, Intent, IntentClassifier, Notifier, SoftwareVolume, system_dispatcher,
};

#[derive(Debug, Parser)]
#[command(name = "voice-intent", version, about = "Classify and run spoken commands")]
struct Args {
    /// Path to a JSON config file (lexicon and dispatch settings)
    #[arg(short, long, env = "VOICE_INTENT_CONFIG")]
    config: Option<PathBuf>,

    /// Print each classification as JSON instead of acting on it
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Starting level for the in-process volume control
    #[arg(long, default_value_t = 0.5)]
    volume: f32,
}

/// Writes user-facing messages to stdout
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("> {message}");
    }
}

/// Print one JSON result per non-blank input line, stopping after the first EXIT
fn dry_run(
    classifier: &IntentClassifier,
    input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = classifier.classify(&line);
        writeln!(output, "{}", result.to_json())?;
        if result.intent == Intent::Exit {
            break;
        }
    }
    output.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref()).context("loading config")?;

    if args.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let classifier =
        IntentClassifier::from_lexicon(&config.lexicon).context("compiling lexicon")?;

    if args.dry_run {
        return tokio::task::spawn_blocking(move || {
            dry_run(&classifier, std::io::stdin().lock(), std::io::stdout().lock())
        })
        .await?;
    }

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let volume = Arc::new(SoftwareVolume::new(args.volume));
    let dispatcher = system_dispatcher(config.dispatch, volume, notifier)?;
    let assistant = Assistant::new(classifier, dispatcher);

    // blocking stdin reads stay off the runtime so a stop command can end the process
    let (tx, rx) = mpsc::channel::<String>(16);
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    assistant.run(rx).await;
    Ok(())
}
