//! Utterance handling loop
//!
//! Ties the classifier to the dispatcher. Utterances arrive as final transcripts over a
//! channel; the loop ends on a stop command or when the sender goes away.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::classifier::IntentClassifier;
use crate::dispatch::{Dispatcher, Flow};
use crate::types::ClassificationResult;

pub struct Assistant {
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
}

impl Assistant {
    pub fn new(classifier: IntentClassifier, dispatcher: Dispatcher) -> Self {
        Self {
            classifier,
            dispatcher,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Classify a transcript without acting on it
    pub fn interpret(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    /// Classify and dispatch one transcript. Blank transcripts are ignored.
    pub fn handle_utterance(&self, text: &str) -> Flow {
        let text = text.trim();
        if text.is_empty() {
            return Flow::Continue;
        }

        info!("Recognized: {:?}", text);
        let result = self.classifier.classify(text);
        debug!("Dispatching {} ({:?})", result.intent, result.parameter);
        self.dispatcher.dispatch(&result)
    }

    /// Handle utterances until a stop command or until the channel closes
    pub async fn run(&self, mut utterances: mpsc::Receiver<String>) -> Flow {
        while let Some(text) = utterances.recv().await {
            if self.handle_utterance(&text) == Flow::Exit {
                info!("Stop command received, leaving the listening loop");
                return Flow::Exit;
            }
        }

        debug!("Utterance channel closed");
        Flow::Continue
    }
}
