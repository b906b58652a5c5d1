//! # Backend Stream Controller
//!
//! The shared state machine behind every concrete backend controller. One
//! `StreamController` exclusively owns one underlying player, one audio
//! session, and one remote command surface, consumes system events from the
//! bus, and runs the interruption/stall/lifecycle policy over them.
//!
//! ## Scheduling model
//!
//! All public operations, remote commands, and event handlers serialize on a
//! single operation gate (`tokio::sync::Mutex<()>`), the async equivalent of
//! a main-actor context: no two handlers mutate control state concurrently,
//! and `playback_intended` needs no further synchronization discipline
//! beyond the short internal state lock. Only the reconnect loop suspends
//! while waiting out a backoff interval; everything else completes inline.
//!
//! ## Reconnect loop
//!
//! A stall pauses the player and spawns a reconnect task guarded by a
//! `CancellationToken`. `pause()` and `stop()` cancel the token, and every
//! attempt re-checks both the token and the intent flag after acquiring the
//! operation gate, so a cancelled loop can never re-issue play behind the
//! user's back. The loop self-terminates the moment the player reports a
//! non-zero rate.

use crate::backoff::ExponentialBackoff;
use crate::controller::{AudioBufferHandler, MetadataHandler, PlaybackController, PlaybackState};
use crate::error::{PlaybackError, Result};
use bridge_traits::analytics::AnalyticsSink;
use bridge_traits::player::{StreamItem, StreamPlayer};
use bridge_traits::remote::{
    CommandOutcome, RemoteCommand, RemoteCommandCenter, RemoteCommandHandler,
};
use bridge_traits::session::AudioSession;
use core_runtime::config::PlaybackConfig;
use core_runtime::events::{
    EventBus, InterruptionPhase, InterruptionReason, LifecycleEvent, PlayerEvent, RecvError,
    SystemEvent,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Environment capabilities a backend controller is constructed over.
///
/// Each backend instance must receive its own player, session, and remote
/// command surface; the manager's stop-before-construct switching relies on
/// exclusive ownership.
#[derive(Clone)]
pub struct ControllerDeps {
    /// The underlying real-time media player.
    pub player: Arc<dyn StreamPlayer>,
    /// The exclusive audio-output session.
    pub session: Arc<dyn AudioSession>,
    /// External play/pause/toggle/stop command surface.
    pub remote: Arc<dyn RemoteCommandCenter>,
    /// Fire-and-forget analytics sink.
    pub analytics: Arc<dyn AnalyticsSink>,
    /// Bus delivering OS/system notifications as typed events.
    pub events: EventBus,
    /// Controller tuning.
    pub config: PlaybackConfig,
}

/// How a backend treats its source item when (re)starting playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourcePolicy {
    /// Re-issue `replace_source` before every resume so the live stream
    /// rejoins the live edge instead of draining a stale buffer.
    RejoinLiveEdge,
    /// Load the source once and let the player handle live-edge tracking.
    ReuseSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    Playing,
    Paused,
    Reconnecting,
}

struct ControlState {
    phase: Phase,
    /// Whether the user's last explicit action was to start playback.
    /// OS-driven transient pauses never clear this.
    playback_intended: bool,
    source_loaded: bool,
    activation_failed: bool,
    play_started_at: Option<Instant>,
    last_play_reason: Option<String>,
}

impl ControlState {
    fn new() -> Self {
        Self {
            phase: Phase::Stopped,
            playback_intended: false,
            source_loaded: false,
            activation_failed: false,
            play_started_at: None,
            last_play_reason: None,
        }
    }
}

/// The shared backend state machine. Concrete backends wrap one of these
/// with their source item and quirk policy.
pub struct StreamController {
    inner: Arc<ControllerInner>,
    event_task: JoinHandle<()>,
}

struct ControllerInner {
    player: Arc<dyn StreamPlayer>,
    session: Arc<dyn AudioSession>,
    remote: Arc<dyn RemoteCommandCenter>,
    analytics: Arc<dyn AnalyticsSink>,
    item: StreamItem,
    source_policy: SourcePolicy,
    /// Single logical scheduling context: held for the duration of every
    /// public operation, remote command, and event handler.
    op_gate: tokio::sync::Mutex<()>,
    /// Short-lived data lock; never held across an await point.
    state: parking_lot::Mutex<ControlState>,
    backoff: parking_lot::Mutex<ExponentialBackoff>,
    reconnect: parking_lot::Mutex<Option<CancellationToken>>,
    audio_handler: parking_lot::RwLock<Option<AudioBufferHandler>>,
    metadata_handler: parking_lot::RwLock<Option<MetadataHandler>>,
}

impl StreamController {
    pub(crate) fn new(deps: ControllerDeps, item: StreamItem, source_policy: SourcePolicy) -> Self {
        let inner = Arc::new(ControllerInner {
            player: deps.player,
            session: deps.session,
            remote: deps.remote,
            analytics: deps.analytics,
            item,
            source_policy,
            op_gate: tokio::sync::Mutex::new(()),
            state: parking_lot::Mutex::new(ControlState::new()),
            backoff: parking_lot::Mutex::new(ExponentialBackoff::from_config(
                &deps.config.backoff,
            )),
            reconnect: parking_lot::Mutex::new(None),
            audio_handler: parking_lot::RwLock::new(None),
            metadata_handler: parking_lot::RwLock::new(None),
        });

        inner.remote.register_handler(Self::remote_handler(&inner));

        let mut receiver = deps.events.subscribe();
        let task_inner = Arc::clone(&inner);
        let event_task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => task_inner.handle_event(event).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "event subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { inner, event_task }
    }

    fn remote_handler(inner: &Arc<ControllerInner>) -> RemoteCommandHandler {
        let weak = Arc::downgrade(inner);
        Arc::new(move |command| {
            let weak = weak.clone();
            Box::pin(async move {
                let Some(inner) = weak.upgrade() else {
                    return CommandOutcome::Failed;
                };
                inner.handle_remote_command(command).await
            })
        })
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.event_task.abort();
        self.inner.cancel_reconnect();
        self.inner.remote.clear_handler();
    }
}

#[async_trait::async_trait]
impl PlaybackController for StreamController {
    fn is_playing(&self) -> bool {
        self.inner.player.rate() > 0.0
    }

    fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    fn playback_state(&self) -> PlaybackState {
        self.inner.playback_state()
    }

    async fn play(&self, reason: &str) -> Result<()> {
        let _turn = self.inner.op_gate.lock().await;
        self.inner.play_locked(reason).await
    }

    async fn pause(&self) {
        let _turn = self.inner.op_gate.lock().await;
        self.inner.pause_locked().await;
    }

    async fn toggle(&self, reason: &str) -> Result<()> {
        let _turn = self.inner.op_gate.lock().await;
        self.inner.toggle_locked(reason).await
    }

    async fn stop(&self) {
        let _turn = self.inner.op_gate.lock().await;
        self.inner.stop_locked().await;
    }

    fn set_audio_buffer_handler(&self, handler: Option<AudioBufferHandler>) {
        *self.inner.audio_handler.write() = handler;
    }

    fn set_metadata_handler(&self, handler: Option<MetadataHandler>) {
        *self.inner.metadata_handler.write() = handler;
    }

    async fn handle_app_did_enter_background(&self) {
        let _turn = self.inner.op_gate.lock().await;
        self.inner.entered_background_locked().await;
    }

    async fn handle_app_will_enter_foreground(&self) {
        let _turn = self.inner.op_gate.lock().await;
        self.inner.will_enter_foreground_locked().await;
    }
}

impl ControllerInner {
    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn is_loading(&self) -> bool {
        let st = self.state.lock();
        st.playback_intended
            && (self.player.is_buffering() || st.phase == Phase::Reconnecting)
    }

    fn playback_state(&self) -> PlaybackState {
        let st = self.state.lock();
        if st.activation_failed {
            return PlaybackState::Error;
        }
        match st.phase {
            Phase::Stopped => PlaybackState::Stopped,
            Phase::Reconnecting => PlaybackState::Buffering,
            Phase::Playing | Phase::Paused => {
                if self.player.rate() > 0.0 {
                    PlaybackState::Playing
                } else if st.playback_intended && self.player.is_buffering() {
                    PlaybackState::Buffering
                } else {
                    PlaybackState::Paused
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Core operations (gate held by caller)
    // ------------------------------------------------------------------

    async fn play_locked(&self, reason: &str) -> Result<()> {
        {
            let mut st = self.state.lock();
            st.activation_failed = false;
            st.playback_intended = true;
            if self.player.rate() > 0.0 {
                debug!(reason, "play requested while already playing");
                return Ok(());
            }
        }

        if let Err(e) = self.session.activate().await {
            warn!(error = %e, reason, "audio session activation failed");
            self.state.lock().activation_failed = true;
            let mut properties = HashMap::new();
            properties.insert("reason".to_string(), reason.to_string());
            properties.insert("error".to_string(), e.to_string());
            self.analytics.capture("session_activation_failed", properties);
            return Err(PlaybackError::SessionActivation(e));
        }

        let needs_source = {
            let st = self.state.lock();
            !st.source_loaded || self.source_policy == SourcePolicy::RejoinLiveEdge
        };
        if needs_source {
            match self.player.replace_source(self.item.clone()).await {
                Ok(()) => self.state.lock().source_loaded = true,
                Err(e) => warn!(error = %e, "failed to replace player source"),
            }
        }

        if let Err(e) = self.player.play().await {
            warn!(error = %e, "player play command failed");
        }

        {
            let mut st = self.state.lock();
            // Optimistic; the player's rate events confirm or correct it.
            st.phase = Phase::Playing;
            if st.play_started_at.is_none() {
                st.play_started_at = Some(Instant::now());
                st.last_play_reason = Some(reason.to_string());
            }
        }

        info!(reason, "playback requested");
        self.analytics.play(reason);
        Ok(())
    }

    async fn pause_locked(&self) {
        self.cancel_reconnect();

        let (listened, reason) = {
            let mut st = self.state.lock();
            st.playback_intended = false;
            st.activation_failed = false;
            if st.phase != Phase::Stopped {
                st.phase = Phase::Paused;
            }
            (
                st.play_started_at.take().map(|t| t.elapsed()).unwrap_or_default(),
                st.last_play_reason.take(),
            )
        };

        if let Err(e) = self.player.pause().await {
            warn!(error = %e, "player pause command failed");
        }

        info!(listened_secs = listened.as_secs(), "playback paused");
        self.analytics.pause(listened, reason.as_deref());
    }

    async fn toggle_locked(&self, reason: &str) -> Result<()> {
        if self.player.rate() > 0.0 {
            self.pause_locked().await;
            Ok(())
        } else {
            self.play_locked(reason).await
        }
    }

    async fn stop_locked(&self) {
        self.cancel_reconnect();

        {
            let mut st = self.state.lock();
            st.playback_intended = false;
            st.activation_failed = false;
            st.phase = Phase::Stopped;
            st.play_started_at = None;
            st.last_play_reason = None;
        }

        if let Err(e) = self.player.pause().await {
            warn!(error = %e, "player pause command failed");
        }
        if let Err(e) = self.session.deactivate().await {
            warn!(error = %e, "failed to deactivate audio session on stop");
        }
        info!("playback stopped");
    }

    // ------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------

    async fn handle_event(self: &Arc<Self>, event: SystemEvent) {
        let _turn = self.op_gate.lock().await;
        match event {
            SystemEvent::Player(PlayerEvent::RateChanged { rate }) => {
                self.rate_changed_locked(rate);
            }
            SystemEvent::Player(PlayerEvent::Stalled) => {
                self.stall_locked().await;
            }
            SystemEvent::Player(PlayerEvent::Interrupted {
                phase,
                should_resume,
                reason,
            }) => {
                self.interruption_locked(phase, should_resume, reason).await;
            }
            SystemEvent::Player(PlayerEvent::RouteChanged { description }) => {
                let route = self.session.current_route();
                debug!(
                    %description,
                    external_output = route.has_external_output(),
                    "audio route changed"
                );
                let mut properties = HashMap::new();
                properties.insert("description".to_string(), description);
                properties.insert(
                    "external_output".to_string(),
                    route.has_external_output().to_string(),
                );
                self.analytics.capture("route_changed", properties);
            }
            SystemEvent::Player(PlayerEvent::MetadataReceived { fields }) => {
                let handler = self.metadata_handler.read().clone();
                if let Some(handler) = handler {
                    handler(fields);
                }
            }
            SystemEvent::Player(PlayerEvent::AudioBufferReady { chunk }) => {
                let handler = self.audio_handler.read().clone();
                if let Some(handler) = handler {
                    handler(chunk);
                }
            }
            SystemEvent::Lifecycle(LifecycleEvent::EnteredBackground) => {
                self.entered_background_locked().await;
            }
            SystemEvent::Lifecycle(LifecycleEvent::WillEnterForeground) => {
                self.will_enter_foreground_locked().await;
            }
        }
    }

    fn rate_changed_locked(&self, rate: f32) {
        let mut st = self.state.lock();
        if rate > 0.0 {
            debug!(rate, "player confirmed playing");
            st.phase = Phase::Playing;
        } else if st.phase == Phase::Playing {
            debug!("player reported silent");
            st.phase = Phase::Paused;
        }
    }

    async fn stall_locked(self: &Arc<Self>) {
        if !self.state.lock().playback_intended {
            debug!("stall while playback not intended, ignoring");
            return;
        }

        warn!("playback stalled, entering reconnect");
        if let Err(e) = self.player.pause().await {
            warn!(error = %e, "player pause command failed");
        }
        self.state.lock().phase = Phase::Reconnecting;
        self.begin_reconnect();
    }

    async fn interruption_locked(
        &self,
        phase: InterruptionPhase,
        should_resume: bool,
        reason: Option<InterruptionReason>,
    ) {
        match phase {
            InterruptionPhase::Began => {
                // A route-disconnect interruption is never balanced by an
                // Ended notification; pausing here would strand the
                // controller.
                if matches!(reason, Some(InterruptionReason::RouteDisconnected)) {
                    info!("interruption began for disconnected route, leaving state untouched");
                    self.analytics
                        .capture("interruption_route_disconnected", HashMap::new());
                    return;
                }
                if let Some(InterruptionReason::Unrecognized(tag)) = &reason {
                    warn!(reason = %tag, "unrecognized interruption reason, ignoring");
                    return;
                }
                if should_resume {
                    debug!("interruption began with resume hint, OS will resume playback");
                    return;
                }
                if self.player.rate() > 0.0 {
                    info!("interruption began, pausing player");
                    if let Err(e) = self.player.pause().await {
                        warn!(error = %e, "player pause command failed");
                    }
                    // Intent deliberately stays set: this pause is the OS's
                    // doing, not the user's.
                    let mut st = self.state.lock();
                    if st.phase == Phase::Playing {
                        st.phase = Phase::Paused;
                    }
                }
            }
            InterruptionPhase::Ended => {
                if should_resume && self.state.lock().playback_intended {
                    info!("interruption ended, resuming playback");
                    if let Err(e) = self.play_locked("interruption_ended").await {
                        warn!(error = %e, "failed to resume after interruption");
                    }
                } else {
                    debug!("interruption ended without resume");
                }
            }
        }
    }

    async fn entered_background_locked(&self) {
        if self.state.lock().playback_intended {
            debug!("backgrounded while playback intended, keeping session active");
            return;
        }
        match self.session.deactivate().await {
            Ok(()) => debug!("session deactivated on backgrounding"),
            Err(e) => warn!(error = %e, "failed to deactivate session on backgrounding"),
        }
    }

    async fn will_enter_foreground_locked(&self) {
        if self.state.lock().playback_intended {
            if let Err(e) = self.play_locked("foreground").await {
                warn!(error = %e, "failed to resume playback on foregrounding");
            }
        } else {
            // Explicit pause so the play/pause affordance reflects reality
            // after whatever happened while backgrounded.
            if let Err(e) = self.player.pause().await {
                warn!(error = %e, "player pause command failed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Remote commands
    // ------------------------------------------------------------------

    async fn handle_remote_command(&self, command: RemoteCommand) -> CommandOutcome {
        let _turn = self.op_gate.lock().await;
        debug!(command = command.as_str(), "remote command received");

        let result = match command {
            RemoteCommand::Play => self.play_locked("remote_command").await,
            RemoteCommand::Pause => {
                self.pause_locked().await;
                Ok(())
            }
            RemoteCommand::Toggle => self.toggle_locked("remote_command").await,
            RemoteCommand::Stop => {
                self.stop_locked().await;
                Ok(())
            }
        };

        match result {
            Ok(()) => CommandOutcome::Handled,
            Err(e) => {
                warn!(error = %e, command = command.as_str(), "remote command failed");
                CommandOutcome::Failed
            }
        }
    }

    // ------------------------------------------------------------------
    // Reconnect loop
    // ------------------------------------------------------------------

    fn cancel_reconnect(&self) {
        if let Some(token) = self.reconnect.lock().take() {
            token.cancel();
        }
    }

    fn begin_reconnect(self: &Arc<Self>) {
        let token = CancellationToken::new();
        if let Some(previous) = self.reconnect.lock().replace(token.clone()) {
            previous.cancel();
        }

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_reconnect(token).await;
        });
    }

    async fn run_reconnect(self: Arc<Self>, token: CancellationToken) {
        loop {
            {
                let _turn = self.op_gate.lock().await;
                if token.is_cancelled() || !self.state.lock().playback_intended {
                    debug!("reconnect loop cancelled");
                    return;
                }
                if self.player.rate() > 0.0 {
                    info!("stream recovered");
                    self.backoff.lock().reset();
                    let mut st = self.state.lock();
                    if st.phase == Phase::Reconnecting {
                        st.phase = Phase::Playing;
                    }
                    return;
                }
            }

            let wait = self.backoff.lock().next_wait_time();
            debug!(wait_ms = wait.as_millis() as u64, "scheduling reconnect attempt");
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(wait) => {}
            }

            let _turn = self.op_gate.lock().await;
            if token.is_cancelled() || !self.state.lock().playback_intended {
                debug!("reconnect loop cancelled");
                return;
            }
            if self.player.rate() > 0.0 {
                continue;
            }
            if let Err(e) = self.play_locked("stall_reconnect").await {
                warn!(error = %e, "reconnect attempt failed");
            }
            if self.player.rate() <= 0.0 {
                let mut st = self.state.lock();
                if st.playback_intended {
                    st.phase = Phase::Reconnecting;
                }
            }
        }
    }
}
