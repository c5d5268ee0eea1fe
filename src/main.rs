use std::sync::Arc;

use smart_home_voice::config::VoiceConfig;
use smart_home_voice::inputs::ConsoleRecognizer;
use smart_home_voice::kernel::controller::{DialogueConfig, DialogueController};
use smart_home_voice::kernel::reactor::Reactor;
use smart_home_voice::outputs::{ConsoleSpeaker, ProcessSpeaker};
use smart_home_voice::services::firestore::FirestoreStore;
use smart_home_voice::services::llm::GeminiClient;
use smart_home_voice::services::memory::InMemoryReminderStore;
use smart_home_voice::services::offline::{KeywordClassifier, OfflineContent};
use smart_home_voice::services::{ContentService, IntentClassifier, ReminderStore, Services};
use smart_home_voice::speech::{RecognitionSession, SynthesisChannel, SynthesisEngine};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn build_services(config: &VoiceConfig) -> Services {
    let (classifier, content): (Arc<dyn IntentClassifier>, Arc<dyn ContentService>) =
        match GeminiClient::from_config(&config.gemini) {
            Some(gemini) => {
                tracing::info!("Using Gemini model '{}'", config.gemini.model);
                let gemini = Arc::new(gemini);
                let classifier: Arc<dyn IntentClassifier> = gemini.clone();
                let content: Arc<dyn ContentService> = gemini;
                (classifier, content)
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not set; using offline keyword classifier");
                let classifier: Arc<dyn IntentClassifier> = Arc::new(KeywordClassifier);
                let content: Arc<dyn ContentService> = Arc::new(OfflineContent);
                (classifier, content)
            }
        };

    let reminders: Arc<dyn ReminderStore> = match FirestoreStore::from_config(&config.firestore) {
        Some(store) => {
            tracing::info!("Storing reminders in Firestore collection '{}'", config.firestore.collection);
            Arc::new(store)
        }
        None => {
            tracing::warn!("Firestore not configured; reminders are kept in memory");
            Arc::new(InMemoryReminderStore::new())
        }
    };

    Services {
        classifier,
        content,
        reminders,
    }
}

fn build_speaker(config: &VoiceConfig) -> Box<dyn SynthesisEngine> {
    match config.tts.program.as_deref() {
        Some(program) => Box::new(ProcessSpeaker::new(program, &config.tts)),
        None => Box::new(ConsoleSpeaker),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("Smart Home voice controller booting...");

    let config = VoiceConfig::load()?;

    let controller = DialogueController::new(DialogueConfig::from(&config));
    let recognition = RecognitionSession::new(Box::new(ConsoleRecognizer::stdin()), config.recognition.language.clone());
    let synthesis = SynthesisChannel::new(build_speaker(&config));
    let services = build_services(&config);

    let mut reactor = Reactor::new(controller, recognition, synthesis, services, config.timeouts.clone());

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let wake = config.wake.phrases.first().map(String::as_str).unwrap_or("olá smart home");
    println!("Type '{}' to wake the assistant, then your command. Ctrl+C to stop.", wake);
    reactor.run(shutdown).await;

    let snapshot = reactor.controller.telemetry.snapshot();
    tracing::info!(
        wakes = snapshot.cycle_stats.wakes,
        completed = snapshot.cycle_stats.completed,
        recoveries = snapshot.cycle_stats.recoveries,
        fallbacks = snapshot.service_stats.classifier_fallbacks + snapshot.service_stats.content_fallbacks + snapshot.service_stats.reminder_fallbacks,
        stale = snapshot.session_stats.stale_sessions + snapshot.session_stats.stale_speech + snapshot.session_stats.stale_requests,
        "Session summary"
    );

    Ok(())
}
