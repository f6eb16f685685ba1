//! Local countdown engine.
//!
//! Both roles run one: the host's engine is the session's single source of
//! timer transitions, a guest's engine only extrapolates remaining time
//! between snapshots so the UI counts down smoothly instead of freezing
//! until the next push. Reseeding from each incoming snapshot bounds drift;
//! there is no finer correction than that.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;

use tomodoro_server::infrastructure::dto::websocket::{TimerPhaseDto, TimerStateDto};

/// Long break replaces the short one after every N completed study rounds
const LONG_BREAK_EVERY: u32 = 4;

/// Phase durations and the session's round goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub study_secs: u32,
    pub short_break_secs: u32,
    pub long_break_secs: u32,
    pub total_rounds: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            study_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            total_rounds: 4,
        }
    }
}

impl TimerSettings {
    fn phase_duration(&self, phase: TimerPhaseDto) -> u32 {
        match phase {
            TimerPhaseDto::Study => self.study_secs,
            TimerPhaseDto::ShortBreak => self.short_break_secs,
            TimerPhaseDto::LongBreak => self.long_break_secs,
        }
    }
}

/// Invoked with the fresh snapshot whenever a phase runs to completion
pub type PhaseCompleteHandler = Arc<dyn Fn(TimerStateDto) + Send + Sync>;

/// Countdown engine interface, the seam between the timer bridge and the
/// concrete ticking implementation
pub trait CountdownEngine: Send + Sync {
    /// Stop any running countdown and adopt the snapshot wholesale; resumes
    /// ticking when the snapshot says the timer is running. This is the one
    /// entry point for remotely-sourced state, so there are never two
    /// ticking sources.
    fn seed(&self, snapshot: &TimerStateDto);

    /// Begin or resume ticking
    fn start(&self);

    /// Halt ticking, keeping the remaining time
    fn pause(&self);

    /// Halt ticking and reset the current phase to its full duration
    fn reset(&self);

    /// Advance to the next phase; skipping a study counts the round
    fn skip_phase(&self);

    /// Apply new durations; an idle phase is re-filled under the new settings
    fn configure(&self, settings: &TimerSettings);

    /// Current state as a pushable snapshot
    fn snapshot(&self) -> TimerStateDto;

    /// Register the phase-completion callback
    fn set_phase_complete_handler(&self, handler: PhaseCompleteHandler);
}

struct EngineState {
    running: bool,
    phase: TimerPhaseDto,
    remaining_secs: u32,
    rounds_completed: u32,
    settings: TimerSettings,
}

impl EngineState {
    fn snapshot(&self) -> TimerStateDto {
        TimerStateDto {
            is_running: self.running,
            current_phase: self.phase,
            time_remaining_seconds: self.remaining_secs,
            rounds_completed: self.rounds_completed,
            total_rounds: self.settings.total_rounds,
        }
    }

    /// Move to the next phase of the pomodoro cycle and refill the clock.
    fn advance_phase(&mut self) {
        match self.phase {
            TimerPhaseDto::Study => {
                self.rounds_completed += 1;
                self.phase = if self.rounds_completed % LONG_BREAK_EVERY == 0 {
                    TimerPhaseDto::LongBreak
                } else {
                    TimerPhaseDto::ShortBreak
                };
            }
            TimerPhaseDto::ShortBreak | TimerPhaseDto::LongBreak => {
                self.phase = TimerPhaseDto::Study;
            }
        }
        self.remaining_secs = self.settings.phase_duration(self.phase);
    }
}

/// Ticking countdown engine over a 1 second interval task.
///
/// Cloneable handle; all clones share the same state.
#[derive(Clone)]
pub struct LocalCountdown {
    state: Arc<Mutex<EngineState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    handler: Arc<Mutex<Option<PhaseCompleteHandler>>>,
}

impl LocalCountdown {
    pub fn new() -> Self {
        Self::with_settings(TimerSettings::default())
    }

    pub fn with_settings(settings: TimerSettings) -> Self {
        let remaining_secs = settings.study_secs;
        Self {
            state: Arc::new(Mutex::new(EngineState {
                running: false,
                phase: TimerPhaseDto::Study,
                remaining_secs,
                rounds_completed: 0,
                settings,
            })),
            ticker: Arc::new(Mutex::new(None)),
            handler: Arc::new(Mutex::new(None)),
        }
    }

    fn spawn_ticker(&self) {
        let mut ticker = self.ticker.lock().unwrap();
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let handler = self.handler.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            // The first tick of a tokio interval fires immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                let completed = {
                    let mut state = state.lock().unwrap();
                    if !state.running {
                        break;
                    }
                    state.remaining_secs = state.remaining_secs.saturating_sub(1);
                    if state.remaining_secs == 0 {
                        state.advance_phase();
                        Some(state.snapshot())
                    } else {
                        None
                    }
                };

                // Callback runs outside the state lock.
                if let Some(snapshot) = completed {
                    let handler = handler.lock().unwrap().clone();
                    if let Some(handler) = handler {
                        handler(snapshot);
                    }
                }
            }
        });

        *ticker = Some(handle);
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Default for LocalCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownEngine for LocalCountdown {
    fn seed(&self, snapshot: &TimerStateDto) {
        self.cancel_ticker();
        {
            let mut state = self.state.lock().unwrap();
            state.phase = snapshot.current_phase;
            state.remaining_secs = snapshot.time_remaining_seconds;
            state.rounds_completed = snapshot.rounds_completed;
            state.settings.total_rounds = snapshot.total_rounds;
            state.running = snapshot.is_running;
        }
        if snapshot.is_running {
            self.spawn_ticker();
        }
    }

    fn start(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.running {
                return;
            }
            state.running = true;
        }
        self.spawn_ticker();
    }

    fn pause(&self) {
        self.state.lock().unwrap().running = false;
        self.cancel_ticker();
    }

    fn reset(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.running = false;
            state.remaining_secs = state.settings.phase_duration(state.phase);
        }
        self.cancel_ticker();
    }

    fn skip_phase(&self) {
        let mut state = self.state.lock().unwrap();
        state.advance_phase();
    }

    fn configure(&self, settings: &TimerSettings) {
        let mut state = self.state.lock().unwrap();
        state.settings = settings.clone();
        if !state.running {
            state.remaining_secs = state.settings.phase_duration(state.phase);
        }
    }

    fn snapshot(&self) -> TimerStateDto {
        self.state.lock().unwrap().snapshot()
    }

    fn set_phase_complete_handler(&self, handler: PhaseCompleteHandler) {
        *self.handler.lock().unwrap() = Some(handler);
    }
}
