//! Call-session lifecycle controller for the simulated video chat.
//!
//! Owns the `Idle → Armed → Connecting → Connected → Locked` state machine,
//! the elapsed-time ticker, the scripted chat playback, and the paywall
//! deadline. All deferred work goes through an internal deterministic
//! scheduler; the host drives it by calling [`SessionController::advance`]
//! with elapsed wall time.

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use media_capture::{CaptureConstraints, CaptureError, CaptureProvider, MediaHandle};
use shared::{
    domain::{format_elapsed, ChatSender, Panel, SessionState},
    script::{self, ScriptedMessage},
};
use thiserror::Error;
use tracing::{debug, info, warn};

mod scheduler;

use scheduler::{Entry, Scheduler, Task};

const DEFAULT_VIDEO_COUNT: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(count) => count,
    None => unreachable!(),
};
const DEFAULT_CONNECT_LATENCY: Duration = Duration::from_millis(2_000);
// 600ms slide-out plus 800ms slide-in.
const DEFAULT_SWITCH_LATENCY: Duration = Duration::from_millis(1_400);
const DEFAULT_PAYWALL_DELAY: Duration = Duration::from_secs(35);
const TICK_PERIOD: Duration = Duration::from_secs(1);
const DEFAULT_DISPLAY_NAME: &str = "Guest";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera and microphone access is required to start the call")]
    MediaAccessDenied(#[from] CaptureError),
}

/// Rendering capabilities the controller calls through; presentation is
/// entirely the host's concern.
pub trait SessionSurface: Send + Sync {
    fn set_video_source(&self, index: usize);
    fn show_panel(&self, panel: Panel);
    fn hide_panel(&self, panel: Panel);
    fn render_message(&self, sender: ChatSender, text: &str);
    fn clear_messages(&self);
    fn set_timer_text(&self, text: &str);
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Length of the externally owned video list; indices stay in `[0, N)`.
    pub video_count: NonZeroUsize,
    pub connect_latency: Duration,
    pub switch_latency: Duration,
    pub paywall_delay: Duration,
    pub default_display_name: String,
    pub chat_script: Vec<ScriptedMessage>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            video_count: DEFAULT_VIDEO_COUNT,
            connect_latency: DEFAULT_CONNECT_LATENCY,
            switch_latency: DEFAULT_SWITCH_LATENCY,
            paywall_delay: DEFAULT_PAYWALL_DELAY,
            default_display_name: DEFAULT_DISPLAY_NAME.to_string(),
            chat_script: script::default_script(),
        }
    }
}

pub struct SessionController {
    config: SessionConfig,
    surface: Arc<dyn SessionSurface>,
    capture: Arc<dyn CaptureProvider>,
    scheduler: Scheduler,
    state: SessionState,
    /// Bumped on every chat reset; pending chat entries from older epochs
    /// are cancelled eagerly and double-checked at fire time.
    epoch: u64,
    elapsed_seconds: u64,
    ticker_running: bool,
    current_video_index: usize,
    display_name: String,
    media: Option<Box<dyn MediaHandle>>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        surface: Arc<dyn SessionSurface>,
        capture: Arc<dyn CaptureProvider>,
    ) -> Self {
        Self {
            config,
            surface,
            capture,
            scheduler: Scheduler::new(),
            state: SessionState::Idle,
            epoch: 0,
            elapsed_seconds: 0,
            ticker_running: false,
            current_video_index: 0,
            display_name: String::new(),
            media: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn current_video_index(&self) -> usize {
        self.current_video_index
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_locked(&self) -> bool {
        self.state == SessionState::Locked
    }

    /// Starts the call: requests local capture and, once granted, runs the
    /// connect simulation and arms the paywall deadline. The deadline is
    /// absolute from this call and is never rescheduled.
    pub fn start(&mut self, display_name: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            warn!(state = ?self.state, "start ignored: session already underway");
            return Ok(());
        }

        let trimmed = display_name.trim();
        let name = if trimmed.is_empty() {
            self.config.default_display_name.clone()
        } else {
            trimmed.to_string()
        };

        let media = self
            .capture
            .request_capture(CaptureConstraints::audio_video())?;

        self.media = Some(media);
        self.display_name = name;
        self.state = SessionState::Armed;
        info!(display_name = %self.display_name, "local capture granted, call armed");

        self.surface.hide_panel(Panel::Landing);
        self.surface.show_panel(Panel::CallScreen);
        self.surface.set_video_source(self.current_video_index);

        self.begin_connecting(self.config.connect_latency);
        self.scheduler
            .schedule_in(self.config.paywall_delay, None, Task::Lock);
        Ok(())
    }

    /// Drops the current fake peer and dials the next video in the list.
    /// Only legal while `Connected`; a second call racing the transition is
    /// ignored because the state is already `Connecting`.
    pub fn switch_peer(&mut self) {
        if self.state != SessionState::Connected {
            debug!(state = ?self.state, "switch_peer ignored");
            return;
        }

        let stale_epoch = self.epoch;
        self.epoch += 1;
        self.scheduler.cancel_epoch(stale_epoch);
        self.surface.clear_messages();

        self.current_video_index =
            (self.current_video_index + 1) % self.config.video_count.get();
        self.surface.set_video_source(self.current_video_index);
        info!(video_index = self.current_video_index, "switching to next peer");

        self.begin_connecting(self.config.switch_latency);
    }

    /// Terminal transition fired by the paywall deadline. Idempotent:
    /// repeated calls are no-ops.
    pub fn lock(&mut self) {
        if self.state == SessionState::Locked {
            debug!("lock ignored: already locked");
            return;
        }

        if let Some(media) = self.media.take() {
            media.stop_tracks();
        }
        self.scheduler.clear_pending();
        self.ticker_running = false;
        self.state = SessionState::Locked;

        self.surface.clear_messages();
        self.surface.hide_panel(Panel::Loading);
        self.surface.hide_panel(Panel::ChatBox);
        self.surface.hide_panel(Panel::Controls);
        self.surface.show_panel(Panel::Paywall);
        info!(
            elapsed_seconds = self.elapsed_seconds,
            "session locked behind paywall"
        );
    }

    /// Renders one user-tagged chat message. Whitespace-only input and
    /// anything after lock are no-ops.
    pub fn post_user_message(&mut self, text: &str) {
        if self.state == SessionState::Locked {
            debug!("user message dropped: session locked");
            return;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        self.surface.render_message(ChatSender::User, trimmed);
    }

    /// Advances the virtual clock and runs every deferred callback that has
    /// come due, in non-decreasing due order.
    pub fn advance(&mut self, dt: Duration) {
        self.scheduler.advance_clock(dt);
        while let Some(entry) = self.scheduler.pop_due() {
            self.dispatch(entry);
        }
    }

    fn dispatch(&mut self, entry: Entry) {
        match entry.task {
            Task::CompleteConnection => self.complete_connection(),
            Task::ChatMessage { text } => self.deliver_scripted_message(entry.epoch, &text),
            Task::Tick => self.on_tick(entry.due),
            Task::Lock => self.lock(),
        }
    }

    fn begin_connecting(&mut self, latency: Duration) {
        self.state = SessionState::Connecting;
        self.surface.show_panel(Panel::Loading);
        self.scheduler
            .schedule_in(latency, None, Task::CompleteConnection);
    }

    /// Connect simulation finished: show the remote peer, make sure the
    /// ticker runs, and queue the scripted chat under the current epoch.
    fn complete_connection(&mut self) {
        if self.state != SessionState::Connecting {
            debug!(state = ?self.state, "stale connection completion dropped");
            return;
        }

        self.state = SessionState::Connected;
        self.surface.hide_panel(Panel::Loading);
        info!(video_index = self.current_video_index, "call connected");

        if !self.ticker_running {
            self.ticker_running = true;
            self.surface.set_timer_text(&format_elapsed(self.elapsed_seconds));
            self.scheduler.schedule_in(TICK_PERIOD, None, Task::Tick);
        }

        for message in &self.config.chat_script {
            self.scheduler.schedule_in(
                message.delay(),
                Some(self.epoch),
                Task::ChatMessage {
                    text: message.render(&self.display_name),
                },
            );
        }
    }

    fn deliver_scripted_message(&mut self, epoch: Option<u64>, text: &str) {
        if epoch != Some(self.epoch) {
            debug!("scripted message from stale epoch dropped");
            return;
        }
        if self.state != SessionState::Connected {
            debug!(state = ?self.state, "scripted message suppressed");
            return;
        }
        self.surface.render_message(ChatSender::Remote, text);
    }

    fn on_tick(&mut self, due: Duration) {
        if self.state == SessionState::Locked {
            return;
        }
        self.elapsed_seconds += 1;
        self.surface.set_timer_text(&format_elapsed(self.elapsed_seconds));
        // Re-arm relative to this tick's due time so coarse `advance`
        // steps do not lose ticks.
        self.scheduler.schedule_at(due + TICK_PERIOD, None, Task::Tick);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
