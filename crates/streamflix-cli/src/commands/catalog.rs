use super::Context;
use crate::output::{new_table, Output};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_watch_models::{convert_minutes_to_hours, ListName, MediaRef, WatchlistItem};
use media_watch_sources::{ContentProvider, SourceError};
use serde_json::json;
use tracing::debug;

pub async fn run_search(ctx: &Context, query: &str, output: &Output) -> Result<()> {
    let provider = ctx.provider().await?;
    let results = provider.search(query).await?;
    debug!(provider = provider.provider_name(), query, count = results.len(), "Search finished");

    if !output.is_human() {
        output.json(&json!({ "query": query, "results": results }));
        return Ok(());
    }
    if results.is_empty() {
        output.info(format!("No results for \"{}\"", query));
        return Ok(());
    }

    let mut table = new_table(&["ID", "Title", "Type", "Episodes", "Runtime", "Rating", "Released"]);
    for media in &results {
        let episodes = media.kind.episodes().len();
        table.add_row(vec![
            media.id.clone(),
            media.title.clone(),
            media.kind.type_name().to_string(),
            if media.kind.is_movie() { "-".to_string() } else { episodes.to_string() },
            convert_minutes_to_hours(&media.duration),
            media.rating.to_string(),
            media.release_date.clone(),
        ]);
    }
    output.table(&table);
    Ok(())
}

pub async fn run_watchlist_add(ctx: &Context, id: &str, output: &Output) -> Result<()> {
    let provider = ctx.provider().await?;
    let media = fetch_media(provider.as_ref(), id).await?;
    let title = media.title.clone();

    if ctx.engine()?.add_to_watchlist(WatchlistItem::saved(media))? {
        output.success(format!("Added {} to the watchlist", title));
    } else {
        output.info(format!("{} is already on the watchlist", title));
    }
    Ok(())
}

pub async fn run_start(ctx: &Context, id: &str, output: &Output) -> Result<()> {
    let provider = ctx.provider().await?;
    let media = fetch_media(provider.as_ref(), id).await?;
    let title = media.title.clone();

    if ctx.engine()?.start_watching(media)? {
        output.success(format!("Added {} to {}", title, ListName::WatchingList.label()));
    } else {
        output.info(format!("{} is already in progress", title));
    }
    Ok(())
}

pub(crate) async fn fetch_media(provider: &dyn ContentProvider, id: &str) -> Result<MediaRef> {
    match provider.get_media_info(id).await {
        Ok(media) => Ok(media),
        Err(SourceError::NotFound(_)) => Err(eyre!(
            "No title with id {} in the {} provider",
            id,
            provider.provider_name()
        )),
        Err(e) => Err(e.into()),
    }
}
