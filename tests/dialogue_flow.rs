use smart_home_voice::config::SpeechConfig;
use smart_home_voice::error::ServiceError;
use smart_home_voice::kernel::controller::{DialogueConfig, DialogueController};
use smart_home_voice::kernel::event::{
    Alternative, Event, RecognitionEvent, RecognitionFault, RecognitionMode, RecognitionResult, RequestId,
    SessionId, SideEffect, UtteranceId,
};
use smart_home_voice::kernel::intent::{Intent, ReminderKind};
use smart_home_voice::kernel::state::DialogueState;

fn controller() -> DialogueController {
    DialogueController::new(DialogueConfig::default())
}

fn lines() -> SpeechConfig {
    SpeechConfig::default()
}

fn started(effects: &[SideEffect], expected: RecognitionMode) -> SessionId {
    effects
        .iter()
        .find_map(|e| match e {
            SideEffect::StartRecognition { session, mode } if *mode == expected => Some(*session),
            _ => None,
        })
        .unwrap_or_else(|| panic!("expected a {:?} session start in {:?}", expected, effects))
}

fn spoken(effects: &[SideEffect]) -> (UtteranceId, String, f32) {
    effects
        .iter()
        .find_map(|e| match e {
            SideEffect::Speak { utterance, text, rate } => Some((*utterance, text.clone(), *rate)),
            _ => None,
        })
        .unwrap_or_else(|| panic!("expected speech in {:?}", effects))
}

fn classify_request(effects: &[SideEffect]) -> (RequestId, String) {
    effects
        .iter()
        .find_map(|e| match e {
            SideEffect::Classify { request, transcript } => Some((*request, transcript.clone())),
            _ => None,
        })
        .unwrap_or_else(|| panic!("expected a classifier call in {:?}", effects))
}

fn heard(session: SessionId, results: Vec<RecognitionResult>) -> Event {
    Event::Recognition {
        session,
        event: RecognitionEvent::Results(results),
    }
}

fn done(utterance: UtteranceId) -> Event {
    Event::SpeechDone { utterance }
}

/// Boot, wake, finish the acknowledgement. Returns the command session.
fn capture(c: &mut DialogueController) -> SessionId {
    let ambient = started(&c.boot(), RecognitionMode::Ambient);
    let effects = c.step(heard(ambient, vec![RecognitionResult::partial("olá smart home")]));
    let (ack, _, _) = spoken(&effects);
    let effects = c.step(done(ack));
    assert_eq!(c.current(), DialogueState::CapturingCommand);
    started(&effects, RecognitionMode::Command)
}

#[test]
fn wake_phrase_stops_ambient_before_acknowledging() {
    let mut c = controller();
    let ambient = started(&c.boot(), RecognitionMode::Ambient);

    let effects = c.step(heard(
        ambient,
        vec![
            RecognitionResult::final_("bom dia pessoal "),
            RecognitionResult::partial("e aí olá smart home"),
        ],
    ));

    assert_eq!(c.current(), DialogueState::Acknowledging);
    let stop = effects
        .iter()
        .position(|e| *e == SideEffect::StopRecognition { session: ambient })
        .expect("ambient session stopped");
    let speak = effects
        .iter()
        .position(|e| matches!(e, SideEffect::Speak { .. }))
        .expect("acknowledgement spoken");
    assert!(stop < speak, "recognition must stop before synthesis starts");
    assert_eq!(spoken(&effects).1, lines().acknowledgement);
    assert!(!c.session().is_active());
}

#[test]
fn partial_transcript_without_wake_phrase_keeps_listening() {
    let mut c = controller();
    let ambient = started(&c.boot(), RecognitionMode::Ambient);

    let effects = c.step(heard(ambient, vec![RecognitionResult::partial("olá casa")]));
    assert!(effects.is_empty());
    assert_eq!(c.current(), DialogueState::Ambient);
    assert!(c.session().is_current(ambient));
}

#[test]
fn reminder_is_committed_then_confirmed() {
    let mut c = controller();
    let command = capture(&mut c);

    let effects = c.step(heard(command, vec![RecognitionResult::final_("adicione lembrete: comprar leite")]));
    assert_eq!(c.current(), DialogueState::Classifying);
    assert!(effects.contains(&SideEffect::StopRecognition { session: command }));
    let (request, transcript) = classify_request(&effects);
    assert_eq!(transcript, "adicione lembrete: comprar leite");

    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::add_reminder("comprar leite", ReminderKind::Info, "Adicionado: comprar leite")),
    });
    assert_eq!(c.current(), DialogueState::Executing);
    let commit = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::CommitReminder { request, text, kind } => Some((*request, text.clone(), *kind)),
            _ => None,
        })
        .expect("reminder committed");
    assert_eq!(commit.1, "comprar leite");
    assert_eq!(commit.2, ReminderKind::Info);

    let effects = c.step(Event::ReminderCommitted {
        request: commit.0,
        outcome: Ok(()),
    });
    let (utterance, text, _) = spoken(&effects);
    assert_eq!(text, "Adicionado: comprar leite");

    let effects = c.step(done(utterance));
    assert_eq!(c.current(), DialogueState::Ambient);
    started(&effects, RecognitionMode::Ambient);
}

#[test]
fn bare_news_request_chains_a_follow_up_round() {
    let mut c = controller();
    let command = capture(&mut c);

    let effects = c.step(heard(command, vec![RecognitionResult::final_("notícias")]));
    let (request, _) = classify_request(&effects);

    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::follow_topic(None, "Qual notícia?")),
    });
    let (question, text, _) = spoken(&effects);
    assert_eq!(text, "Qual notícia?");
    assert!(c.follow_up().pending);
    assert!(!c.session().is_active(), "no recognition while the question plays");

    let effects = c.step(done(question));
    assert_eq!(c.current(), DialogueState::AwaitingFollowUp);
    assert!(c.follow_up().pending);
    started(&effects, RecognitionMode::Command);
    assert!(!effects.iter().any(|e| matches!(e, SideEffect::Speak { .. })));
}

#[test]
fn follow_up_answer_skips_the_classifier() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("notícias")]));
    let (request, _) = classify_request(&effects);
    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::follow_topic(None, "Qual notícia?")),
    });
    let effects = c.step(done(spoken(&effects).0));
    let follow_up = started(&effects, RecognitionMode::Command);

    let effects = c.step(heard(follow_up, vec![RecognitionResult::final_("eleições")]));
    assert!(!effects.iter().any(|e| matches!(e, SideEffect::Classify { .. })));
    assert!(!c.follow_up().pending);
    assert_eq!(c.current(), DialogueState::Executing);
    let narration = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::FetchNarration { request, topic } => Some((*request, topic.clone())),
            _ => None,
        })
        .expect("topic fetched directly");
    assert_eq!(narration.1, "eleições");

    let effects = c.step(Event::NarrationReady {
        request: narration.0,
        outcome: Ok("As eleições municipais começam em outubro.".into()),
    });
    let (utterance, text, rate) = spoken(&effects);
    assert_eq!(text, "As eleições municipais começam em outubro.");
    assert_eq!(rate, lines().narration_rate);
    assert!(rate > lines().rate);

    c.step(done(utterance));
    assert_eq!(c.current(), DialogueState::Ambient);
    assert!(!c.follow_up().pending);
}

#[test]
fn topic_in_first_utterance_is_fetched_immediately() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("notícias de esportes")]));
    let (request, _) = classify_request(&effects);

    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::follow_topic(Some("esportes".into()), "Buscando")),
    });
    assert!(effects.iter().any(|e| matches!(e, SideEffect::FetchNarration { topic, .. } if topic == "esportes")));
    assert!(!c.follow_up().pending);
}

#[test]
fn recognizer_error_while_capturing_recovers_to_ambient() {
    let mut c = controller();
    let command = capture(&mut c);

    let effects = c.step(Event::Recognition {
        session: command,
        event: RecognitionEvent::Error(RecognitionFault::NoSpeech),
    });
    assert_eq!(c.current(), DialogueState::Recovering);
    assert!(!c.session().is_active(), "no command session left dangling");
    let (apology, text, _) = spoken(&effects);
    assert_eq!(text, lines().apology);

    let effects = c.step(done(apology));
    assert_eq!(c.current(), DialogueState::Ambient);
    started(&effects, RecognitionMode::Ambient);
}

#[test]
fn command_session_ending_silently_recovers() {
    let mut c = controller();
    let command = capture(&mut c);

    let effects = c.step(Event::Recognition {
        session: command,
        event: RecognitionEvent::End,
    });
    assert_eq!(c.current(), DialogueState::Recovering);
    assert_eq!(spoken(&effects).1, lines().apology);
}

#[test]
fn second_wake_match_in_same_run_is_ignored() {
    let mut c = controller();
    let ambient = started(&c.boot(), RecognitionMode::Ambient);

    let first = c.step(heard(ambient, vec![RecognitionResult::partial("olá smart home")]));
    let second = c.step(heard(
        ambient,
        vec![RecognitionResult::final_("olá smart home"), RecognitionResult::partial(" olá smart home")],
    ));

    assert_eq!(first.iter().filter(|e| matches!(e, SideEffect::Speak { .. })).count(), 1);
    assert!(second.is_empty());
    assert_eq!(c.current(), DialogueState::Acknowledging);
    assert_eq!(c.telemetry.snapshot().session_stats.stale_sessions, 1);
}

#[test]
fn malformed_results_are_silent_no_ops() {
    let mut c = controller();
    let ambient = started(&c.boot(), RecognitionMode::Ambient);

    let empty = RecognitionResult {
        alternatives: vec![],
        is_final: true,
    };
    assert!(c.step(heard(ambient, vec![])).is_empty());
    assert!(c.step(heard(ambient, vec![empty.clone()])).is_empty());
    assert_eq!(c.current(), DialogueState::Ambient);

    let mut c = controller();
    let command = capture(&mut c);
    assert!(c.step(heard(command, vec![empty])).is_empty());
    assert!(c
        .step(heard(
            command,
            vec![RecognitionResult {
                alternatives: vec![Alternative::new("   ")],
                is_final: true,
            }]
        ))
        .is_empty());
    assert_eq!(c.current(), DialogueState::CapturingCommand);
    assert!(c.session().is_current(command));
    assert_eq!(c.telemetry.snapshot().session_stats.malformed_results, 3);
}

#[test]
fn classifier_failure_speaks_fallback_apology() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("qualquer coisa")]));
    let (request, _) = classify_request(&effects);

    let effects = c.step(Event::Classified {
        request,
        outcome: Err(ServiceError::Timeout),
    });
    assert_eq!(c.current(), DialogueState::Executing);
    let (utterance, text, _) = spoken(&effects);
    assert_eq!(text, lines().fallback);

    c.step(done(utterance));
    assert_eq!(c.current(), DialogueState::Ambient);
    let snapshot = c.telemetry.snapshot();
    assert_eq!(snapshot.service_stats.classifier_fallbacks, 1);
    assert_eq!(snapshot.service_stats.timeouts, 1);
}

#[test]
fn store_failure_is_spoken_softly() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("lembrete pagar luz")]));
    let (request, _) = classify_request(&effects);
    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::add_reminder("pagar luz", ReminderKind::Task, "Adicionado: pagar luz")),
    });
    let commit = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::CommitReminder { request, .. } => Some(*request),
            _ => None,
        })
        .unwrap();

    let effects = c.step(Event::ReminderCommitted {
        request: commit,
        outcome: Err(ServiceError::Status(503)),
    });
    let (utterance, text, _) = spoken(&effects);
    assert_eq!(text, lines().store_failed);
    c.step(done(utterance));
    assert_eq!(c.current(), DialogueState::Ambient);
}

#[test]
fn narration_failure_apologizes() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("notícias de cultura")]));
    let (request, _) = classify_request(&effects);
    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::follow_topic(Some("cultura".into()), "Buscando")),
    });
    let fetch = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::FetchNarration { request, .. } => Some(*request),
            _ => None,
        })
        .unwrap();

    let effects = c.step(Event::NarrationReady {
        request: fetch,
        outcome: Err(ServiceError::Transport("connection reset".into())),
    });
    assert_eq!(spoken(&effects).1, lines().narration_failed);
}

#[test]
fn stale_classifier_response_is_discarded() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("oi")]));
    let (request, _) = classify_request(&effects);

    let stale = c.step(Event::Classified {
        request: RequestId(request.0 + 100),
        outcome: Ok(Intent::chat("intruso")),
    });
    assert!(stale.is_empty());
    assert_eq!(c.current(), DialogueState::Classifying);
    assert!(c.request_in_flight());
}

#[test]
fn ambient_end_restarts_listening_with_a_new_session() {
    let mut c = controller();
    let first = started(&c.boot(), RecognitionMode::Ambient);

    let effects = c.step(Event::Recognition {
        session: first,
        event: RecognitionEvent::End,
    });
    let second = started(&effects, RecognitionMode::Ambient);
    assert_ne!(first, second);
    assert!(!effects.iter().any(|e| matches!(e, SideEffect::StopRecognition { .. })));
    assert_eq!(c.current(), DialogueState::Ambient);
}

#[test]
fn ambient_error_rearms_after_backoff() {
    let mut c = controller();
    let first = started(&c.boot(), RecognitionMode::Ambient);

    let effects = c.step(Event::Recognition {
        session: first,
        event: RecognitionEvent::Error(RecognitionFault::Network),
    });
    assert!(!c.session().is_active());
    let timer = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::ArmTimer { timer, .. } => Some(*timer),
            _ => None,
        })
        .expect("retry timer armed");

    let effects = c.step(Event::TimerElapsed { timer });
    started(&effects, RecognitionMode::Ambient);
    assert!(c.step(Event::TimerElapsed { timer }).is_empty());
}

#[test]
fn follow_up_failure_clears_pending() {
    let mut c = controller();
    let command = capture(&mut c);
    let effects = c.step(heard(command, vec![RecognitionResult::final_("notícias")]));
    let (request, _) = classify_request(&effects);
    let effects = c.step(Event::Classified {
        request,
        outcome: Ok(Intent::follow_topic(None, "Qual notícia?")),
    });
    let effects = c.step(done(spoken(&effects).0));
    let follow_up = started(&effects, RecognitionMode::Command);

    let effects = c.step(Event::Recognition {
        session: follow_up,
        event: RecognitionEvent::Error(RecognitionFault::Aborted),
    });
    assert_eq!(c.current(), DialogueState::Recovering);
    assert!(!c.follow_up().pending);

    c.step(done(spoken(&effects).0));
    assert_eq!(c.current(), DialogueState::Ambient);

    // The next command goes through the classifier again.
    let command = {
        let ambient = c.session().current().unwrap().id;
        let effects = c.step(heard(ambient, vec![RecognitionResult::partial("ola smart home")]));
        let effects = c.step(done(spoken(&effects).0));
        started(&effects, RecognitionMode::Command)
    };
    let effects = c.step(heard(command, vec![RecognitionResult::final_("eleições")]));
    classify_request(&effects);
}
