use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::kernel::event::{RecognitionFault, RecognitionResult};
use crate::speech::{RecognitionEngine, RecognitionOptions, RecognitionSink};

struct Listening {
    sink: RecognitionSink,
    options: RecognitionOptions,
    heard: Vec<RecognitionResult>,
}

/// Recognition engine fed by text lines, one line per recognized phrase.
///
/// Behaves like a platform recognizer: ambient runs accumulate results until
/// stopped, command runs end after the first line, stopping fires `End`, and
/// starting while a run is still open is rejected with `Busy`.
#[derive(Clone)]
pub struct ConsoleRecognizer {
    listening: Arc<Mutex<Option<Listening>>>,
}

impl ConsoleRecognizer {
    pub fn stdin() -> Self {
        Self::spawn(BufReader::new(tokio::io::stdin()))
    }

    pub fn spawn<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let recognizer = Self {
            listening: Arc::new(Mutex::new(None)),
        };

        let feed = recognizer.clone();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                feed.hear(&line);
            }
            info!("Console input closed");
            feed.close();
        });

        recognizer
    }

    fn hear(&self, line: &str) {
        let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        let Some(listening) = slot.as_mut() else {
            debug!("Not listening; dropped console line");
            return;
        };

        listening.heard.push(RecognitionResult::final_(line.trim()));
        listening.sink.results(listening.heard.clone());

        if !listening.options.continuous {
            listening.sink.end();
            *slot = None;
        }
    }

    fn close(&self) {
        let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(listening) = slot.take() {
            listening.sink.error(RecognitionFault::Aborted);
        }
    }
}

impl RecognitionEngine for ConsoleRecognizer {
    fn start(&mut self, options: &RecognitionOptions, sink: RecognitionSink) -> Result<(), EngineError> {
        let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().map(|l| !l.sink.is_closed()).unwrap_or(false) {
            return Err(EngineError::Busy);
        }

        *slot = Some(Listening {
            sink,
            options: options.clone(),
            heard: Vec::new(),
        });
        Ok(())
    }

    fn stop(&mut self) {
        let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(listening) = slot.take() {
            listening.sink.end();
        }
    }
}
