// Watch-state rules across the watchlist, watching and completed lists

use crate::error::StoreError;
use crate::store::ListStore;
use chrono::Utc;
use media_watch_models::{ListName, MediaKind, MediaRef, WatchlistItem};
use tracing::{debug, info};

/// Stored progress of a single episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeProgress {
    pub timestamp: Option<f64>,
    pub completed: bool,
}

/// Business rules over the three persisted lists.
///
/// Every operation reads the lists it needs, mutates them in memory and writes
/// them back whole. Mutations take `&mut self`, so there is exactly one writer
/// at a time and no read-modify-write sequence can interleave with another.
/// Lookups are linear scans by exact id; a miss is always a silent no-op.
pub struct WatchStateEngine<S: ListStore> {
    store: S,
}

impl<S: ListStore> WatchStateEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn get_list(&self, list: ListName) -> Result<Vec<WatchlistItem>, StoreError> {
        self.store.get(list)
    }

    pub fn get_watchlist(&self) -> Result<Vec<WatchlistItem>, StoreError> {
        self.store.get(ListName::Watchlist)
    }

    pub fn get_watching_list(&self) -> Result<Vec<WatchlistItem>, StoreError> {
        self.store.get(ListName::WatchingList)
    }

    pub fn get_completed_list(&self) -> Result<Vec<WatchlistItem>, StoreError> {
        self.store.get(ListName::CompletedList)
    }

    pub fn is_in_watchlist(&self, id: &str) -> Result<bool, StoreError> {
        self.contains(ListName::Watchlist, id)
    }

    pub fn is_in_watching_list(&self, id: &str) -> Result<bool, StoreError> {
        self.contains(ListName::WatchingList, id)
    }

    pub fn contains(&self, list: ListName, id: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(list)?.iter().any(|item| item.id() == id))
    }

    /// Append to the watchlist unless the id is already there.
    /// Returns whether the item was added.
    pub fn add_to_watchlist(&mut self, item: WatchlistItem) -> Result<bool, StoreError> {
        self.add_to(ListName::Watchlist, item)
    }

    /// Append to the watching list unless the id is already there.
    ///
    /// The item should come from [`WatchlistItem::for_playback`] so it carries
    /// its finish time, zeroed counters and the full episode list.
    pub fn add_to_watching_list(&mut self, item: WatchlistItem) -> Result<bool, StoreError> {
        self.add_to(ListName::WatchingList, item)
    }

    /// Record that a work was opened for playback.
    pub fn start_watching(&mut self, media: MediaRef) -> Result<bool, StoreError> {
        self.add_to_watching_list(WatchlistItem::for_playback(media))
    }

    fn add_to(&mut self, list: ListName, item: WatchlistItem) -> Result<bool, StoreError> {
        let mut items = self.store.get(list)?;
        if items.iter().any(|existing| existing.id() == item.id()) {
            debug!(list = %list, id = item.id(), "Already present, not adding");
            return Ok(false);
        }
        info!(list = %list, id = item.id(), title = %item.media.title, "Adding item");
        items.push(item);
        self.store.set(list, &items)?;
        Ok(true)
    }

    pub fn remove_from_watchlist(&mut self, id: &str) -> Result<bool, StoreError> {
        self.remove_from(ListName::Watchlist, id)
    }

    pub fn remove_from_watching_list(&mut self, id: &str) -> Result<bool, StoreError> {
        self.remove_from(ListName::WatchingList, id)
    }

    fn remove_from(&mut self, list: ListName, id: &str) -> Result<bool, StoreError> {
        let items = self.store.get(list)?;
        let before = items.len();
        let kept: Vec<WatchlistItem> = items.into_iter().filter(|item| item.id() != id).collect();
        if kept.len() == before {
            return Ok(false);
        }
        info!(list = %list, id, "Removed item");
        self.store.set(list, &kept)?;
        Ok(true)
    }

    pub fn update_watchlist_movie_time(&mut self, id: &str, seconds: f64) -> Result<bool, StoreError> {
        self.update_movie_time(ListName::Watchlist, id, seconds)
    }

    pub fn update_watching_list_movie_time(&mut self, id: &str, seconds: f64) -> Result<bool, StoreError> {
        self.update_movie_time(ListName::WatchingList, id, seconds)
    }

    fn update_movie_time(&mut self, list: ListName, id: &str, seconds: f64) -> Result<bool, StoreError> {
        let mut items = self.store.get(list)?;
        if !set_movie_time(&mut items, id, seconds) {
            return Ok(false);
        }
        self.store.set(list, &items)?;
        Ok(true)
    }

    /// Set an episode's position in the watching list and flag it completed
    /// once `seconds >= finish_seconds`.
    ///
    /// Completing an episode never promotes the parent work; only
    /// [`Self::mark_as_complete_in_watching_list`] does that.
    pub fn update_episode_watch_time(
        &mut self,
        media_id: &str,
        episode_id: &str,
        seconds: f64,
        finish_seconds: f64,
    ) -> Result<bool, StoreError> {
        let mut items = self.store.get(ListName::WatchingList)?;
        if !set_episode_time(&mut items, media_id, episode_id, seconds, finish_seconds) {
            return Ok(false);
        }
        self.store.set(ListName::WatchingList, &items)?;
        Ok(true)
    }

    /// Movie position fanned out to every active list holding `id`, in one write.
    /// Returns the lists that were touched.
    pub fn record_progress(&mut self, id: &str, seconds: f64) -> Result<Vec<ListName>, StoreError> {
        self.fan_out(|items| set_movie_time(items, id, seconds))
    }

    /// Episode position fanned out to every active list holding `media_id`, in one write.
    pub fn record_episode_progress(
        &mut self,
        media_id: &str,
        episode_id: &str,
        seconds: f64,
        finish_seconds: f64,
    ) -> Result<Vec<ListName>, StoreError> {
        self.fan_out(|items| set_episode_time(items, media_id, episode_id, seconds, finish_seconds))
    }

    fn fan_out<F>(&mut self, mut apply: F) -> Result<Vec<ListName>, StoreError>
    where
        F: FnMut(&mut Vec<WatchlistItem>) -> bool,
    {
        let mut changed = Vec::new();
        for list in [ListName::WatchingList, ListName::Watchlist] {
            let mut items = self.store.get(list)?;
            if apply(&mut items) {
                changed.push((list, items));
            }
        }
        if changed.is_empty() {
            return Ok(Vec::new());
        }

        let writes: Vec<(ListName, &[WatchlistItem])> = changed
            .iter()
            .map(|(list, items)| (*list, items.as_slice()))
            .collect();
        self.store.set_many(&writes)?;
        Ok(changed.into_iter().map(|(list, _)| list).collect())
    }

    /// Promote a work from the watching list to the completed list.
    ///
    /// The promoted copy is flagged completed and its watch count bumped by
    /// one. If the completed list already holds the id (a re-watch), that entry
    /// is replaced and its count carried forward.
    pub fn mark_as_complete_in_watching_list(&mut self, media_id: &str) -> Result<bool, StoreError> {
        let moved = self.move_item(
            ListName::WatchingList,
            ListName::CompletedList,
            media_id,
            |mut item, previous| {
                let carried = previous.map(|p| p.times_watched()).unwrap_or(0);
                item.completed = Some(true);
                item.times_watched = Some(item.times_watched().max(carried) + 1);
                item
            },
        )?;
        if moved {
            info!(id = media_id, "Marked as completed");
        }
        Ok(moved)
    }

    /// Move one entry between lists as a single all-or-nothing write.
    ///
    /// `transform` receives the entry being moved and any entry with the same
    /// id already in `to`, which the result replaces in place.
    pub fn move_item<F>(&mut self, from: ListName, to: ListName, id: &str, transform: F) -> Result<bool, StoreError>
    where
        F: FnOnce(WatchlistItem, Option<&WatchlistItem>) -> WatchlistItem,
    {
        if from == to {
            return Ok(false);
        }

        let mut source = self.store.get(from)?;
        let Some(position) = source.iter().position(|item| item.id() == id) else {
            debug!(from = %from, id, "Nothing to move");
            return Ok(false);
        };
        let item = source.remove(position);

        let mut target = self.store.get(to)?;
        let existing = target.iter().position(|t| t.id() == id);
        let moved = transform(item, existing.map(|i| &target[i]));
        match existing {
            Some(i) => target[i] = moved,
            None => target.push(moved),
        }

        self.store
            .set_many(&[(from, source.as_slice()), (to, target.as_slice())])?;
        Ok(true)
    }

    /// Stored movie position in the watching list.
    ///
    /// A position above zero is what turns "Watch Now" into "Continue Watching".
    pub fn resume_position(&self, id: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .store
            .get(ListName::WatchingList)?
            .iter()
            .find(|item| item.id() == id)
            .and_then(|item| item.movie_timestamp()))
    }

    pub fn episode_progress(&self, media_id: &str, episode_id: &str) -> Result<Option<EpisodeProgress>, StoreError> {
        let items = self.store.get(ListName::WatchingList)?;
        Ok(items
            .iter()
            .find(|item| item.id() == media_id)
            .and_then(|item| item.media.kind.find_episode(episode_id))
            .map(|e| EpisodeProgress {
                timestamp: e.episode.timestamp,
                completed: e.episode.completed.unwrap_or(false),
            }))
    }

    /// Watching-list entries that are still in progress, most recently
    /// watched first. Entries never watched keep their list order at the end.
    pub fn continue_watching(&self) -> Result<Vec<WatchlistItem>, StoreError> {
        let mut items: Vec<WatchlistItem> = self
            .store
            .get(ListName::WatchingList)?
            .into_iter()
            .filter(|item| !item.is_completed())
            .collect();
        items.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
        Ok(items)
    }
}

fn set_movie_time(items: &mut [WatchlistItem], id: &str, seconds: f64) -> bool {
    let Some(item) = items.iter_mut().find(|item| item.id() == id) else {
        return false;
    };
    match &mut item.media.kind {
        MediaKind::Movie { timestamp } => {
            *timestamp = Some(seconds);
            item.last_watched_at = Some(Utc::now());
            true
        }
        kind => {
            debug!(id, kind = kind.type_name(), "Movie time update on an episodic entry ignored");
            false
        }
    }
}

fn set_episode_time(
    items: &mut [WatchlistItem],
    media_id: &str,
    episode_id: &str,
    seconds: f64,
    finish_seconds: f64,
) -> bool {
    let Some(item) = items.iter_mut().find(|item| item.id() == media_id) else {
        return false;
    };
    let Some(episode) = item.media.kind.episode_mut(episode_id) else {
        return false;
    };
    let completed = seconds >= finish_seconds;
    if completed && !episode.completed.unwrap_or(false) {
        info!(media_id, episode_id, "Episode finished");
    }
    episode.timestamp = Some(seconds);
    episode.completed = Some(completed);
    item.last_watched_at = Some(Utc::now());
    true
}

#[cfg(test)]
mod tests;
