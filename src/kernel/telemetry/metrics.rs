use std::collections::VecDeque;

use super::event::{FallbackReason, FaultKind, ServiceKind, StaleSource, TelemetryEvent};
use crate::kernel::event::RecognitionMode;
use crate::kernel::state::DialogueState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub cycle_stats: CycleStats,
    pub session_stats: SessionStats,
    pub fault_stats: FaultStats,
    pub service_stats: ServiceStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleStats {
    pub transitions: u64,
    pub wakes: u64,
    pub completed: u64,
    pub recoveries: u64,
    pub follow_up_rounds: u64,
    pub avg_cycle_ticks: f64,
    pub max_cycle_ticks: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub ambient_started: u64,
    pub command_started: u64,
    pub stale_sessions: u64,
    pub stale_speech: u64,
    pub stale_requests: u64,
    pub stale_timers: u64,
    pub malformed_results: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultStats {
    pub total: u64,
    pub no_speech: u64,
    pub ended_empty: u64,
    pub start_rejected: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceStats {
    pub classifier_fallbacks: u64,
    pub content_fallbacks: u64,
    pub reminder_fallbacks: u64,
    pub timeouts: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_cycle_ticks = 0u64;

    for event in events {
        match event {
            TelemetryEvent::Transition { from, to, .. } => {
                snap.cycle_stats.transitions += 1;
                match (from, to) {
                    (DialogueState::Ambient, DialogueState::Acknowledging) => snap.cycle_stats.wakes += 1,
                    (_, DialogueState::Recovering) => snap.cycle_stats.recoveries += 1,
                    _ => {}
                }
            }
            TelemetryEvent::SessionStarted { mode } => match mode {
                RecognitionMode::Ambient => snap.session_stats.ambient_started += 1,
                RecognitionMode::Command => snap.session_stats.command_started += 1,
            },
            TelemetryEvent::StaleDiscarded { source } => match source {
                StaleSource::Session => snap.session_stats.stale_sessions += 1,
                StaleSource::Speech => snap.session_stats.stale_speech += 1,
                StaleSource::Request => snap.session_stats.stale_requests += 1,
                StaleSource::Timer => snap.session_stats.stale_timers += 1,
            },
            TelemetryEvent::MalformedResults => snap.session_stats.malformed_results += 1,
            TelemetryEvent::RecognizerFault { kind, .. } => {
                snap.fault_stats.total += 1;
                match kind {
                    FaultKind::NoSpeech => snap.fault_stats.no_speech += 1,
                    FaultKind::EndedEmpty => snap.fault_stats.ended_empty += 1,
                    FaultKind::StartRejected => snap.fault_stats.start_rejected += 1,
                    _ => snap.fault_stats.other += 1,
                }
            }
            TelemetryEvent::ServiceFallback { service, reason } => {
                match service {
                    ServiceKind::Classifier => snap.service_stats.classifier_fallbacks += 1,
                    ServiceKind::Content => snap.service_stats.content_fallbacks += 1,
                    ServiceKind::Reminders => snap.service_stats.reminder_fallbacks += 1,
                }
                if *reason == FallbackReason::Timeout {
                    snap.service_stats.timeouts += 1;
                }
            }
            TelemetryEvent::CycleCompleted {
                duration_ticks,
                follow_up_rounds,
            } => {
                snap.cycle_stats.completed += 1;
                snap.cycle_stats.follow_up_rounds += u64::from(*follow_up_rounds);
                total_cycle_ticks += duration_ticks;
                snap.cycle_stats.max_cycle_ticks = snap.cycle_stats.max_cycle_ticks.max(*duration_ticks);
            }
        }
    }

    if snap.cycle_stats.completed > 0 {
        snap.cycle_stats.avg_cycle_ticks = total_cycle_ticks as f64 / snap.cycle_stats.completed as f64;
    }

    snap
}
