// Player session: stream loading, tick-driven progress and episode advance

use crate::controls::ControlsVisibility;
use crate::error::PlaybackError;
use crate::store::ListStore;
use crate::subtitles::CueTrack;
use crate::watch_state::WatchStateEngine;
use media_watch_config::SubtitleConfig;
use media_watch_models::{convert_duration_to_seconds, format_clock, EpisodeRef, MediaKind, MediaRef};
use media_watch_sources::{ContentProvider, SourceError, SubtitleFetcher};
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Seconds moved by the rewind/forward buttons
pub const SKIP_SECONDS: f64 = 10.0;

/// Adaptive loader knobs handed to the surface on attach
#[derive(Debug, Clone, PartialEq)]
pub struct HlsTuning {
    /// -1 lets the loader pick; the top rendition is forced once the manifest is parsed
    pub start_level: i32,
    /// Seconds of media to buffer ahead
    pub max_buffer_length: f64,
    /// Bytes
    pub max_buffer_size: u64,
    /// Largest gap in seconds the loader jumps over
    pub max_buffer_hole: f64,
    pub low_latency_mode: bool,
    /// Segments behind the live edge
    pub live_sync_duration_count: u32,
}

impl Default for HlsTuning {
    fn default() -> Self {
        Self {
            start_level: -1,
            max_buffer_length: 30.0,
            max_buffer_size: 60 * 1000 * 1000,
            max_buffer_hole: 0.5,
            low_latency_mode: true,
            live_sync_duration_count: 3,
        }
    }
}

/// The host's video element plus adaptive loader.
pub trait MediaSurface {
    fn attach(&mut self, url: &str, tuning: &HlsTuning);
    fn detach(&mut self);
    fn set_level(&mut self, level: usize);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// 0.0 to 1.0
    fn set_volume(&mut self, volume: f64);
    fn set_fullscreen(&mut self, fullscreen: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    TimeUpdate { current_time: f64 },
    LoadedMetadata { duration: f64 },
    Play,
    Pause,
    FullscreenChange { fullscreen: bool },
    ManifestParsed { levels: usize },
    StreamError { fatal: bool, details: String },
    PointerMoved { at: Instant },
    PointerLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Closed,
    Error,
}

impl PlaybackState {
    fn is_active(self) -> bool {
        matches!(self, PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused)
    }
}

/// Identifies one load request. Only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stream lookup the caller must resolve and hand back through
/// [`PlaybackController::complete_load`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub ticket: LoadTicket,
    /// Movie id, or episode id for episodic works
    pub id: String,
    pub parent_id: Option<String>,
}

/// Where a closed session left off
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub media_id: String,
    pub episode_id: Option<String>,
    pub position: f64,
    /// `None` when the duration was unparseable
    pub finish: Option<f64>,
    pub reached_end: bool,
}

struct Session {
    media: MediaRef,
    episode_id: Option<String>,
    /// Infinite when unknown, so an episode never completes on a guess
    finish: f64,
    elapsed: f64,
    duration: Option<f64>,
}

impl Session {
    fn new(media: MediaRef, episode_id: Option<&str>) -> Result<Self, PlaybackError> {
        let (episode_id, finish) = match (&media.kind, episode_id) {
            (MediaKind::Movie { .. }, _) => (None, convert_duration_to_seconds(&media.duration).as_seconds()),
            (kind, Some(id)) => {
                let episode = kind.find_episode(id).ok_or(PlaybackError::NoEpisode)?;
                (Some(id.to_string()), media.episode_finish(episode.episode))
            }
            (_, None) => return Err(PlaybackError::NoEpisode),
        };
        Ok(Self {
            media,
            episode_id,
            finish: finish.unwrap_or(f64::INFINITY),
            elapsed: 0.0,
            duration: None,
        })
    }

    fn episode(&self) -> Option<EpisodeRef<'_>> {
        self.episode_id
            .as_deref()
            .and_then(|id| self.media.kind.find_episode(id))
    }

    fn title(&self) -> String {
        self.media.display_title(self.episode().as_ref())
    }

    /// (lookup id, parent id) for provider calls
    fn provider_ids(&self) -> (String, Option<String>) {
        match &self.episode_id {
            Some(episode_id) => (episode_id.clone(), Some(self.media.id.clone())),
            None => (self.media.id.clone(), None),
        }
    }
}

/// Drives one player surface.
///
/// Stream resolution is split into [`begin_load`](Self::begin_load) and
/// [`complete_load`](Self::complete_load) so that a resolution finishing after
/// a newer request (or after close) is recognized and dropped. [`load`](Self::load)
/// and [`advance_episode`](Self::advance_episode) run both halves against a
/// provider.
pub struct PlaybackController<M: MediaSurface> {
    surface: M,
    tuning: HlsTuning,
    state: PlaybackState,
    session: Option<Session>,
    pending: Option<(LoadTicket, Session)>,
    generation: u64,
    cues: CueTrack,
    controls: ControlsVisibility,
    elapsed_text: String,
    duration_text: String,
    volume: f64,
    fullscreen: bool,
}

impl<M: MediaSurface> PlaybackController<M> {
    pub fn new(surface: M) -> Self {
        Self::with_tuning(surface, HlsTuning::default())
    }

    pub fn with_tuning(surface: M, tuning: HlsTuning) -> Self {
        Self {
            surface,
            tuning,
            state: PlaybackState::Idle,
            session: None,
            pending: None,
            generation: 0,
            cues: CueTrack::default(),
            controls: ControlsVisibility::default(),
            elapsed_text: format_clock(0.0),
            duration_text: format_clock(0.0),
            volume: 100.0,
            fullscreen: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    pub fn current_media(&self) -> Option<&MediaRef> {
        self.session.as_ref().map(|s| &s.media)
    }

    pub fn current_episode(&self) -> Option<EpisodeRef<'_>> {
        self.session.as_ref().and_then(|s| s.episode())
    }

    pub fn now_playing(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.title())
    }

    pub fn elapsed_text(&self) -> &str {
        &self.elapsed_text
    }

    pub fn duration_text(&self) -> &str {
        &self.duration_text
    }

    pub fn subtitle_text(&self) -> &str {
        self.cues.displayed()
    }

    pub fn cue_track(&self) -> &CueTrack {
        &self.cues
    }

    pub fn controls_visible(&self, now: Instant) -> bool {
        self.controls.is_visible(now)
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Start loading `media` (and `episode_id` for Show/Anime).
    ///
    /// Supersedes any load still in flight. Whatever is playing keeps playing
    /// until the new stream resolves.
    pub fn begin_load(&mut self, media: MediaRef, episode_id: Option<&str>) -> Result<StreamRequest, PlaybackError> {
        let session = Session::new(media, episode_id)?;
        self.generation += 1;
        let ticket = LoadTicket(self.generation);
        let (id, parent_id) = session.provider_ids();

        info!(ticket = %ticket, title = %session.title(), "Resolving stream");
        if let Some((superseded, _)) = self.pending.replace((ticket, session)) {
            debug!(superseded = %superseded, "Pending load superseded");
        }
        if self.session.is_none() {
            self.state = PlaybackState::Loading;
        }
        Ok(StreamRequest { ticket, id, parent_id })
    }

    /// Hand back a stream resolution.
    ///
    /// On success the new stream is attached and the controller waits in
    /// `Loading` for the manifest. A failed resolution leaves a running session
    /// untouched; with nothing running the controller goes to `Error`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        resolved: Result<Option<String>, SourceError>,
    ) -> Result<(), PlaybackError> {
        let session = match self.pending.take() {
            Some((pending, session)) if pending == ticket => session,
            other => {
                self.pending = other;
                warn!(ticket = %ticket, current = self.generation, "Discarding stale stream resolution");
                return Err(PlaybackError::Stale {
                    ticket: ticket.generation(),
                    current: self.generation,
                });
            }
        };

        let url = match resolved {
            Ok(Some(url)) => url,
            Ok(None) => {
                self.load_failed();
                return Err(PlaybackError::StreamUnavailable(session.title()));
            }
            Err(e) => {
                self.load_failed();
                return Err(PlaybackError::Upstream(e));
            }
        };

        if self.session.is_some() {
            self.surface.detach();
        }
        self.surface.attach(&url, &self.tuning);
        info!(ticket = %ticket, title = %session.title(), "Stream attached");

        self.session = Some(session);
        self.state = PlaybackState::Loading;
        self.cues.clear();
        self.elapsed_text = format_clock(0.0);
        self.duration_text = format_clock(0.0);
        Ok(())
    }

    fn load_failed(&mut self) {
        if self.session.is_none() {
            self.state = PlaybackState::Error;
        }
    }

    pub async fn load(
        &mut self,
        provider: &dyn ContentProvider,
        media: MediaRef,
        episode_id: Option<&str>,
    ) -> Result<(), PlaybackError> {
        let request = self.begin_load(media, episode_id)?;
        let resolved = provider
            .get_stream_url(&request.id, request.parent_id.as_deref())
            .await;
        self.complete_load(request.ticket, resolved)
    }

    /// Look up the episode after the current one and start loading it.
    ///
    /// Running off the end is [`PlaybackError::EndOfSeries`], which is not a
    /// failure and leaves the session as it was.
    pub fn begin_next_episode(&mut self) -> Result<StreamRequest, PlaybackError> {
        let session = self.session.as_ref().ok_or(PlaybackError::NotLoaded)?;
        let current = session.episode().ok_or(PlaybackError::NoEpisode)?;
        let next = match session.media.kind.next_episode(&current) {
            Some(next) => next,
            None => {
                info!(title = %session.title(), "Reached the last episode");
                return Err(PlaybackError::EndOfSeries {
                    number: current.episode.number,
                });
            }
        };
        let next_id = next.episode.id.clone();
        let media = session.media.clone();
        self.begin_load(media, Some(&next_id))
    }

    pub async fn advance_episode(&mut self, provider: &dyn ContentProvider) -> Result<(), PlaybackError> {
        let request = self.begin_next_episode()?;
        let resolved = provider
            .get_stream_url(&request.id, request.parent_id.as_deref())
            .await;
        self.complete_load(request.ticket, resolved)
    }

    /// Fetch and parse captions for the current session.
    ///
    /// Any failure only leaves the cue track empty. Returns whether cues were loaded.
    pub async fn load_subtitles(
        &mut self,
        provider: &dyn ContentProvider,
        fetcher: &SubtitleFetcher,
        config: &SubtitleConfig,
    ) -> bool {
        self.cues.clear();
        let Some(session) = &self.session else {
            return false;
        };
        if !config.enabled {
            return false;
        }
        if session.media.kind.is_anime() && !config.fetch_for_anime {
            debug!(id = %session.media.id, "Subtitles for anime are disabled");
            return false;
        }

        let (id, parent_id) = session.provider_ids();
        let text = match provider.get_subtitle_url(&id, parent_id.as_deref()).await {
            Ok(Some(url)) => fetcher.fetch(&url).await,
            Ok(None) => {
                debug!(id = %id, "No subtitles available");
                return false;
            }
            Err(e) => Err(e),
        };

        match text {
            Ok(text) => {
                self.cues = CueTrack::from_text(&text, config.strip_markup);
                info!(cues = self.cues.cues().len(), "Subtitles loaded");
                !self.cues.is_empty()
            }
            Err(e) => {
                warn!("Subtitles unavailable: {}", e);
                false
            }
        }
    }

    pub fn handle_event<S: ListStore>(
        &mut self,
        event: PlayerEvent,
        engine: &mut WatchStateEngine<S>,
    ) -> Result<(), PlaybackError> {
        match event {
            PlayerEvent::TimeUpdate { current_time } => self.on_time_update(current_time, engine)?,
            PlayerEvent::LoadedMetadata { duration } => {
                if duration.is_finite() {
                    self.duration_text = format_clock(duration);
                    if let Some(session) = self.session.as_mut() {
                        session.duration = Some(duration);
                    }
                }
            }
            PlayerEvent::Play => {
                if self.state.is_active() {
                    self.state = PlaybackState::Playing;
                }
            }
            PlayerEvent::Pause => {
                if self.state.is_active() {
                    self.state = PlaybackState::Paused;
                }
            }
            PlayerEvent::FullscreenChange { fullscreen } => self.fullscreen = fullscreen,
            PlayerEvent::ManifestParsed { levels } => self.on_manifest_parsed(levels, engine)?,
            PlayerEvent::StreamError { fatal, details } => self.on_stream_error(fatal, details)?,
            PlayerEvent::PointerMoved { at } => self.controls.on_pointer_move(at),
            PlayerEvent::PointerLeft => self.controls.on_pointer_leave(),
        }
        Ok(())
    }

    fn on_manifest_parsed<S: ListStore>(
        &mut self,
        levels: usize,
        engine: &mut WatchStateEngine<S>,
    ) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Loading {
            debug!(state = ?self.state, "Manifest parsed outside of loading, ignoring");
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        if levels > 0 {
            self.surface.set_level(levels - 1);
        }
        if session.media.kind.is_movie() {
            if let Some(position) = engine.resume_position(&session.media.id)?.filter(|p| *p > 0.0) {
                let position = position.min(session.finish);
                info!(id = %session.media.id, position, "Resuming movie");
                self.surface.seek(position);
                session.elapsed = position;
            }
        }
        self.surface.play();
        self.state = PlaybackState::Ready;
        Ok(())
    }

    fn on_time_update<S: ListStore>(
        &mut self,
        current_time: f64,
        engine: &mut WatchStateEngine<S>,
    ) -> Result<(), PlaybackError> {
        if !self.state.is_active() || !current_time.is_finite() {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let position = current_time.clamp(0.0, session.finish);
        session.elapsed = position;
        self.elapsed_text = format_clock(current_time);
        self.cues.on_time_update(current_time);

        let touched = match &session.episode_id {
            None => engine.record_progress(&session.media.id, position)?,
            Some(episode_id) => {
                engine.record_episode_progress(&session.media.id, episode_id, position, session.finish)?
            }
        };
        trace!(position, lists = ?touched, "Progress recorded");
        Ok(())
    }

    fn on_stream_error(&mut self, fatal: bool, details: String) -> Result<(), PlaybackError> {
        if !fatal {
            warn!(details = %details, "Stream error");
            return Ok(());
        }
        error!(details = %details, "Fatal stream error, ending session");
        self.surface.detach();
        self.session = None;
        self.pending = None;
        self.generation += 1;
        self.cues.clear();
        self.state = PlaybackState::Error;
        Err(PlaybackError::StreamFatal(details))
    }

    /// End the session.
    ///
    /// Episodic works get one last episode update with the last elapsed time,
    /// which may flip the episode to completed. Any load still in flight is
    /// invalidated.
    pub fn close<S: ListStore>(
        &mut self,
        engine: &mut WatchStateEngine<S>,
    ) -> Result<Option<SessionOutcome>, PlaybackError> {
        self.generation += 1;
        self.pending = None;
        self.cues.clear();
        self.state = PlaybackState::Closed;
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        self.surface.detach();

        if let Some(episode_id) = &session.episode_id {
            engine.update_episode_watch_time(&session.media.id, episode_id, session.elapsed, session.finish)?;
        }
        info!(title = %session.title(), position = session.elapsed, "Player closed");

        Ok(Some(SessionOutcome {
            reached_end: session.elapsed >= session.finish,
            finish: session.finish.is_finite().then_some(session.finish),
            position: session.elapsed,
            media_id: session.media.id,
            episode_id: session.episode_id,
        }))
    }

    pub fn toggle_play(&mut self) {
        match self.state {
            PlaybackState::Playing => self.surface.pause(),
            PlaybackState::Ready | PlaybackState::Paused => self.surface.play(),
            _ => {}
        }
    }

    /// Seek within `[0, duration]`
    pub fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        let session = self.session.as_ref().ok_or(PlaybackError::NotLoaded)?;
        if !seconds.is_finite() {
            return Ok(());
        }
        let limit = session.duration.unwrap_or(session.finish).max(0.0);
        self.surface.seek(seconds.clamp(0.0, limit));
        Ok(())
    }

    /// Relative seek, e.g. `skip(-SKIP_SECONDS)` to rewind
    pub fn skip(&mut self, delta: f64) -> Result<(), PlaybackError> {
        let elapsed = self.session.as_ref().ok_or(PlaybackError::NotLoaded)?.elapsed;
        self.seek(elapsed + delta)
    }

    /// Volume in percent
    pub fn set_volume(&mut self, percent: f64) {
        let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        self.volume = percent;
        self.surface.set_volume(percent / 100.0);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.surface.set_fullscreen(!self.fullscreen);
    }
}
