use super::catalog::fetch_media;
use super::Context;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_watch_core::{
    HlsTuning, ListStore, MediaSurface, PlaybackController, PlaybackError, PlayerEvent, SessionOutcome,
    WatchStateEngine,
};
use media_watch_models::{format_clock, MediaRef};
use media_watch_sources::SubtitleFetcher;
use serde_json::json;
use tracing::{debug, trace};

pub struct PlayOptions {
    pub episode: Option<String>,
    /// Position reached before the session is closed
    pub to: Option<f64>,
    pub next: bool,
    pub subtitles: bool,
}

/// Headless surface: remembers what the controller asked for and logs it
#[derive(Debug, Default)]
struct ConsoleSurface {
    url: Option<String>,
    position: f64,
}

impl MediaSurface for ConsoleSurface {
    fn attach(&mut self, url: &str, tuning: &HlsTuning) {
        debug!(url, max_buffer_length = tuning.max_buffer_length, "Attaching stream");
        self.url = Some(url.to_string());
        self.position = 0.0;
    }

    fn detach(&mut self) {
        debug!("Detaching stream");
        self.url = None;
    }

    fn set_level(&mut self, level: usize) {
        debug!(level, "Rendition selected");
    }

    fn play(&mut self) {
        trace!("play");
    }

    fn pause(&mut self) {
        trace!("pause");
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        trace!(volume, "volume");
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        trace!(fullscreen, "fullscreen");
    }
}

pub async fn run_play(ctx: &Context, id: &str, options: PlayOptions, output: &Output) -> Result<()> {
    let provider = ctx.provider().await?;
    let media = fetch_media(provider.as_ref(), id).await?;
    let mut engine = ctx.engine()?;

    engine.start_watching(media.clone())?;
    let episode_id = match options.episode {
        Some(episode_id) => Some(episode_id),
        None => pick_episode(&engine, &media)?,
    };

    let mut player = PlaybackController::new(ConsoleSurface::default());
    player.load(provider.as_ref(), media, episode_id.as_deref()).await?;
    if let Some(url) = &player.surface().url {
        output.info(format!("Streaming {}", url));
    }

    let fetcher = if options.subtitles { Some(SubtitleFetcher::new()?) } else { None };
    start(&mut player, &mut engine, fetcher.as_ref(), provider.as_ref(), ctx, output).await?;

    if let Some(to) = options.to {
        player.handle_event(PlayerEvent::TimeUpdate { current_time: to }, &mut engine)?;
        output.info(format!("At {} / {}", player.elapsed_text(), player.duration_text()));
        if !player.subtitle_text().is_empty() {
            output.info(format!("  \"{}\"", player.subtitle_text()));
        }
    }

    if options.next {
        match player.advance_episode(provider.as_ref()).await {
            Ok(()) => start(&mut player, &mut engine, fetcher.as_ref(), provider.as_ref(), ctx, output).await?,
            Err(PlaybackError::EndOfSeries { number }) => {
                output.warn(format!("Episode {} is the last one, nothing to move on to", number));
            }
            Err(e) => return Err(e.into()),
        }
    }

    match player.close(&mut engine)? {
        Some(outcome) => report(&outcome, output),
        None => output.warn("Nothing was playing"),
    }
    Ok(())
}

/// Bring a freshly attached stream to playing, resuming where the lists say
async fn start<S: ListStore>(
    player: &mut PlaybackController<ConsoleSurface>,
    engine: &mut WatchStateEngine<S>,
    fetcher: Option<&SubtitleFetcher>,
    provider: &dyn media_watch_sources::ContentProvider,
    ctx: &Context,
    output: &Output,
) -> Result<()> {
    if let Some(fetcher) = fetcher {
        if player.load_subtitles(provider, fetcher, &ctx.config.subtitles).await {
            debug!(cues = player.cue_track().cues().len(), "Captions ready");
        }
    }

    player.handle_event(PlayerEvent::ManifestParsed { levels: 1 }, engine)?;
    player.handle_event(PlayerEvent::Play, engine)?;

    let title = player
        .now_playing()
        .ok_or_else(|| eyre!("Stream attached but no session is active"))?;
    let position = player.surface().position;
    if position > 0.0 {
        output.success(format!("Playing {} from {}", title, format_clock(position)));
    } else {
        output.success(format!("Playing {}", title));
    }
    Ok(())
}

/// First episode not yet completed, by stored progress when there is some
fn pick_episode<S: ListStore>(engine: &WatchStateEngine<S>, media: &MediaRef) -> Result<Option<String>> {
    if media.kind.is_movie() {
        return Ok(None);
    }
    let stored = engine
        .get_watching_list()?
        .into_iter()
        .find(|item| item.id() == media.id);
    let kind = stored.as_ref().map(|item| &item.media.kind).unwrap_or(&media.kind);

    let episodes = kind.episodes();
    let pick = episodes
        .iter()
        .find(|e| !e.episode.completed.unwrap_or(false))
        .or_else(|| episodes.first())
        .ok_or_else(|| eyre!("{} has no episodes", media.title))?;
    Ok(Some(pick.episode.id.clone()))
}

fn report(outcome: &SessionOutcome, output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "mediaId": outcome.media_id,
            "episodeId": outcome.episode_id,
            "position": outcome.position,
            "finish": outcome.finish,
            "reachedEnd": outcome.reached_end,
        }));
        return;
    }

    let position = format_clock(outcome.position);
    let finish = outcome.finish.map(format_clock).unwrap_or_else(|| "N/A".to_string());
    match &outcome.episode_id {
        Some(episode_id) => output.success(format!(
            "Stopped {} episode {} at {} of {}",
            outcome.media_id, episode_id, position, finish
        )),
        None => output.success(format!("Stopped {} at {} of {}", outcome.media_id, position, finish)),
    }
    if outcome.reached_end {
        output.info(format!(
            "Reached the end. Run `streamflix watching complete {}` once the whole title is done",
            outcome.media_id
        ));
    }
}
