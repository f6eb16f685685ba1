//! Timer authority bridge.
//!
//! Keeps exactly one writer of the shared timer state. On the host, every
//! local timer transition is coalesced into a full snapshot and published
//! tagged with the triggering action; on a guest, incoming snapshots reseed
//! the local engine and are never published back. The authority flag is the
//! first guard in every mutating method, so a guest reaching these calls is
//! a no-op rather than an error.
//!
//! The bridge depends on the [`CountdownEngine`] and [`SnapshotPublisher`]
//! traits, not on the state machine or the socket, so the one-directional
//! flow is testable in isolation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tomodoro_server::infrastructure::dto::websocket::{
    ClientEvent, TimerActionKind, TimerStateDto,
};

use crate::channel::EventSink;
use crate::engine::{CountdownEngine, TimerSettings};
use crate::error::ClientError;

/// Outbound seam for host snapshots
pub trait SnapshotPublisher: Send + Sync {
    fn publish(&self, action: TimerActionKind, snapshot: &TimerStateDto)
    -> Result<(), ClientError>;
}

/// Publishes snapshots as `timer-action` events through the channel
pub struct ChannelPublisher {
    sink: Arc<dyn EventSink>,
}

impl ChannelPublisher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

impl SnapshotPublisher for ChannelPublisher {
    fn publish(
        &self,
        action: TimerActionKind,
        snapshot: &TimerStateDto,
    ) -> Result<(), ClientError> {
        self.sink.send(&ClientEvent::TimerAction {
            action,
            timer_state: snapshot.clone(),
        })
    }
}

/// The single-writer arbiter between the local engine and the channel
#[derive(Clone)]
pub struct TimerAuthorityBridge {
    engine: Arc<dyn CountdownEngine>,
    publisher: Arc<dyn SnapshotPublisher>,
    authorized: Arc<AtomicBool>,
}

impl TimerAuthorityBridge {
    pub fn new(engine: Arc<dyn CountdownEngine>, publisher: Arc<dyn SnapshotPublisher>) -> Self {
        Self {
            engine,
            publisher,
            authorized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register the phase-completion hook: a host pushes the completion
    /// snapshot, a guest's completions stay local.
    pub fn wire_phase_completion(&self) {
        let publisher = self.publisher.clone();
        let authorized = self.authorized.clone();
        self.engine
            .set_phase_complete_handler(Arc::new(move |snapshot| {
                if authorized.load(Ordering::SeqCst) {
                    if let Err(e) = publisher.publish(TimerActionKind::PhaseCompleted, &snapshot) {
                        tracing::warn!("Failed to publish phase completion: {}", e);
                    }
                }
            }));
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    /// Grant authority without touching the engine (session creator: the
    /// engine already holds the fresh default state).
    pub fn grant_authority(&self) {
        self.authorized.store(true, Ordering::SeqCst);
    }

    /// Grant authority and seed the engine from the last known shared
    /// snapshot, so a promotion does not visibly jump the timer.
    pub fn adopt_authority(&self, last_known: &TimerStateDto) {
        self.authorized.store(true, Ordering::SeqCst);
        self.engine.seed(last_known);
    }

    /// Drop authority and halt the local countdown.
    pub fn release_authority(&self) {
        self.authorized.store(false, Ordering::SeqCst);
        self.engine.pause();
    }

    /// Apply a remotely-sourced snapshot (guest path). Stops any running
    /// local countdown, reseeds, and restarts if the snapshot is running.
    /// Never publishes: received state is not re-broadcast.
    pub fn apply_remote(&self, snapshot: &TimerStateDto) {
        self.engine.seed(snapshot);
    }

    pub fn snapshot(&self) -> TimerStateDto {
        self.engine.snapshot()
    }

    pub fn start(&self) {
        self.host_action(TimerActionKind::Start, |engine| engine.start());
    }

    pub fn pause(&self) {
        self.host_action(TimerActionKind::Pause, |engine| engine.pause());
    }

    pub fn resume(&self) {
        self.host_action(TimerActionKind::Resume, |engine| engine.start());
    }

    pub fn stop(&self) {
        self.host_action(TimerActionKind::Stop, |engine| engine.reset());
    }

    pub fn skip_phase(&self) {
        self.host_action(TimerActionKind::SkipPhase, |engine| engine.skip_phase());
    }

    pub fn configure(&self, settings: &TimerSettings) {
        self.host_action(TimerActionKind::SettingsChange, |engine| {
            engine.configure(settings)
        });
    }

    fn host_action(&self, action: TimerActionKind, mutate: impl FnOnce(&dyn CountdownEngine)) {
        // Authority check comes first in every mutating method.
        if !self.is_authorized() {
            return;
        }

        mutate(self.engine.as_ref());

        let snapshot = self.engine.snapshot();
        if let Err(e) = self.publisher.publish(action, &snapshot) {
            tracing::warn!("Failed to publish timer action {:?}: {}", action, e);
        }
    }
}
