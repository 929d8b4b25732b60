use super::Context;
use crate::output::{new_table, Output};
use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use comfy_table::Table;
use media_watch_models::{convert_minutes_to_hours, format_clock, ListName, WatchlistItem};
use serde_json::json;

pub fn run_list(ctx: &Context, list: Option<ListName>, output: &Output) -> Result<()> {
    let engine = ctx.engine()?;
    let lists: Vec<ListName> = match list {
        Some(list) => vec![list],
        None => ListName::ALL.to_vec(),
    };

    if !output.is_human() {
        let mut data = serde_json::Map::new();
        for list in lists {
            data.insert(list.key().to_string(), serde_json::to_value(engine.get_list(list)?)?);
        }
        output.json(&serde_json::Value::Object(data));
        return Ok(());
    }

    for list in lists {
        let items = engine.get_list(list)?;
        output.heading(&format!("{} ({})", list.label(), items.len()));
        if items.is_empty() {
            output.info("  (empty)");
        } else {
            output.table(&items_table(&items));
        }
    }
    Ok(())
}

pub fn run_continue(ctx: &Context, output: &Output) -> Result<()> {
    let items = ctx.engine()?.continue_watching()?;

    if !output.is_human() {
        output.json(&json!({ "continue": items }));
        return Ok(());
    }
    if items.is_empty() {
        output.info("Nothing in progress");
        return Ok(());
    }
    output.heading(ListName::WatchingList.label());
    output.table(&items_table(&items));
    Ok(())
}

pub fn run_watchlist_remove(ctx: &Context, id: &str, output: &Output) -> Result<()> {
    if ctx.engine()?.remove_from_watchlist(id)? {
        output.success(format!("Removed {} from the watchlist", id));
    } else {
        output.info(format!("{} is not on the watchlist", id));
    }
    Ok(())
}

pub fn run_watching_remove(ctx: &Context, id: &str, output: &Output) -> Result<()> {
    if ctx.engine()?.remove_from_watching_list(id)? {
        output.success(format!("Removed {} from {}", id, ListName::WatchingList.label()));
    } else {
        output.info(format!("{} is not in progress", id));
    }
    Ok(())
}

pub fn run_complete(ctx: &Context, id: &str, output: &Output) -> Result<()> {
    let mut engine = ctx.engine()?;
    if !engine.mark_as_complete_in_watching_list(id)? {
        output.warn(format!("{} is not in progress; start watching it first", id));
        return Ok(());
    }
    let times = engine
        .get_completed_list()?
        .iter()
        .find(|item| item.id() == id)
        .map(WatchlistItem::times_watched)
        .unwrap_or(1);
    output.success(format!("Marked {} as watched ({} time{})", id, times, plural(times)));
    Ok(())
}

pub fn run_progress(
    ctx: &Context,
    id: &str,
    seconds: f64,
    episode: Option<&str>,
    output: &Output,
) -> Result<()> {
    if !seconds.is_finite() {
        bail!("Position must be a finite number of seconds");
    }
    let mut engine = ctx.engine()?;

    let item = [ListName::WatchingList, ListName::Watchlist]
        .into_iter()
        .map(|list| engine.get_list(list))
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .find(|item| item.id() == id)
        .ok_or_else(|| eyre!("{} is not on the watchlist or in progress", id))?;

    let touched = match episode {
        None => {
            if !item.media.kind.is_movie() {
                bail!("{} is a {}; pass --episode", id, item.media.kind.type_name());
            }
            let position = clamp_position(seconds, item.finish_timestamp);
            engine.record_progress(id, position)?
        }
        Some(episode_id) => {
            let episode = item
                .media
                .kind
                .find_episode(episode_id)
                .ok_or_else(|| eyre!("{} has no episode {}", id, episode_id))?;
            let finish = item.media.episode_finish(episode.episode);
            let position = clamp_position(seconds, finish);
            engine.record_episode_progress(id, episode_id, position, finish.unwrap_or(f64::INFINITY))?
        }
    };

    let names: Vec<&str> = touched.iter().map(|list| list.key()).collect();
    output.success(format!("Recorded {} for {} in {}", format_clock(seconds), id, names.join(", ")));
    Ok(())
}

/// Positions are kept within `[0, finish]`; unknown finish only floors at zero
fn clamp_position(seconds: f64, finish: Option<f64>) -> f64 {
    seconds.clamp(0.0, finish.unwrap_or(f64::INFINITY))
}

fn items_table(items: &[WatchlistItem]) -> Table {
    let mut table = new_table(&["ID", "Title", "Type", "Progress", "Watched", "Runtime"]);
    for item in items {
        table.add_row(vec![
            item.id().to_string(),
            item.media.title.clone(),
            item.media.kind.type_name().to_string(),
            progress_cell(item),
            watched_cell(item),
            convert_minutes_to_hours(&item.media.duration),
        ]);
    }
    table
}

fn progress_cell(item: &WatchlistItem) -> String {
    match (item.movie_timestamp(), item.progress()) {
        (Some(position), Some(fraction)) => {
            format!("{} ({:.0}%)", format_clock(position), fraction * 100.0)
        }
        (_, Some(fraction)) => format!("{:.0}%", fraction * 100.0),
        _ => "-".to_string(),
    }
}

fn watched_cell(item: &WatchlistItem) -> String {
    match item.times_watched {
        Some(times) if item.is_completed() => format!("✓ x{}", times),
        Some(times) if times > 0 => format!("x{}", times),
        _ => "-".to_string(),
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_watch_models::{MediaKind, MediaRef};

    fn movie(timestamp: Option<f64>) -> WatchlistItem {
        let media: MediaRef = serde_json::from_value(json!({
            "id": "m1",
            "title": "Heat",
            "duration": "100 min",
            "type": "Movie",
        }))
        .unwrap();
        let mut item = WatchlistItem::for_playback(media);
        item.media.kind = MediaKind::Movie { timestamp };
        item
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(-5.0, Some(600.0)), 0.0);
        assert_eq!(clamp_position(900.0, Some(600.0)), 600.0);
        assert_eq!(clamp_position(900.0, None), 900.0);
    }

    #[test]
    fn test_progress_cell() {
        assert_eq!(progress_cell(&movie(Some(3000.0))), "50:00 (50%)");
        assert_eq!(progress_cell(&movie(None)), "0%");
    }

    #[test]
    fn test_watched_cell() {
        let mut item = movie(None);
        assert_eq!(watched_cell(&item), "-");
        item.completed = Some(true);
        item.times_watched = Some(2);
        assert_eq!(watched_cell(&item), "✓ x2");
    }
}
