use super::*;
use crate::store::MemoryListStore;
use media_watch_models::{Episode, Rating, SeasonEpisode};

fn media(id: &str, kind: MediaKind) -> MediaRef {
    MediaRef {
        id: id.to_string(),
        title: format!("Title {}", id),
        thumbnail: format!("https://img.example/{}.jpg", id),
        cover: String::new(),
        description: String::new(),
        genres: vec!["Drama".to_string()],
        actors: Vec::new(),
        country: Vec::new(),
        rating: Rating::Score(7.5),
        production: String::new(),
        release_date: "2021".to_string(),
        duration: "20 min".to_string(),
        kind,
    }
}

fn movie(id: &str) -> MediaRef {
    media(id, MediaKind::Movie { timestamp: None })
}

fn episode(id: &str, number: u32) -> Episode {
    Episode {
        id: id.to_string(),
        title: format!("Episode {}", number),
        number,
        thumbnail: String::new(),
        description: String::new(),
        duration: None,
        timestamp: None,
        completed: None,
    }
}

fn show(id: &str) -> MediaRef {
    media(
        id,
        MediaKind::Show {
            episodes: vec![
                SeasonEpisode { season: 1, episode: episode("e1", 1) },
                SeasonEpisode { season: 1, episode: episode("e2", 2) },
            ],
        },
    )
}

fn engine() -> WatchStateEngine<MemoryListStore> {
    WatchStateEngine::new(MemoryListStore::new())
}

fn raw_snapshot(engine: &WatchStateEngine<MemoryListStore>) -> Vec<Option<String>> {
    ListName::ALL
        .iter()
        .map(|list| engine.store().raw(*list).map(|s| s.to_string()))
        .collect()
}

#[test]
fn test_add_to_watchlist_is_idempotent() {
    let mut engine = engine();
    assert!(engine.add_to_watchlist(WatchlistItem::saved(movie("m1"))).unwrap());
    assert!(!engine.add_to_watchlist(WatchlistItem::saved(movie("m1"))).unwrap());

    let list = engine.get_watchlist().unwrap();
    assert_eq!(list.iter().filter(|i| i.id() == "m1").count(), 1);
}

#[test]
fn test_add_preserves_arrival_order() {
    let mut engine = engine();
    for id in ["c", "a", "b"] {
        engine.add_to_watchlist(WatchlistItem::saved(movie(id))).unwrap();
    }
    let ids: Vec<_> = engine
        .get_watchlist()
        .unwrap()
        .iter()
        .map(|i| i.id().to_string())
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn test_remove_missing_id_is_noop() {
    let mut engine = engine();
    engine.add_to_watchlist(WatchlistItem::saved(movie("m1"))).unwrap();
    let before = raw_snapshot(&engine);

    assert!(!engine.remove_from_watchlist("missing").unwrap());
    assert!(!engine.remove_from_watching_list("m1").unwrap());
    assert_eq!(raw_snapshot(&engine), before);

    assert!(engine.remove_from_watchlist("m1").unwrap());
    assert!(!engine.is_in_watchlist("m1").unwrap());
}

#[test]
fn test_update_episode_on_missing_ids_leaves_store_unchanged() {
    let mut engine = engine();
    engine.start_watching(show("s1")).unwrap();
    engine.add_to_watchlist(WatchlistItem::saved(movie("m1"))).unwrap();
    let before = raw_snapshot(&engine);

    assert!(!engine.update_episode_watch_time("missing", "e1", 10.0, 100.0).unwrap());
    assert!(!engine.update_episode_watch_time("s1", "missing", 10.0, 100.0).unwrap());
    assert!(!engine.update_watching_list_movie_time("missing", 10.0).unwrap());
    assert!(!engine.update_watchlist_movie_time("missing", 10.0).unwrap());
    assert!(engine.record_progress("missing", 10.0).unwrap().is_empty());

    assert_eq!(raw_snapshot(&engine), before);
}

#[test]
fn test_episode_completion_boundary_is_inclusive() {
    let mut engine = engine();
    engine.start_watching(show("s1")).unwrap();

    assert!(engine.update_episode_watch_time("s1", "e1", 1199.0, 1200.0).unwrap());
    let progress = engine.episode_progress("s1", "e1").unwrap().unwrap();
    assert_eq!(progress.timestamp, Some(1199.0));
    assert!(!progress.completed);

    assert!(engine.update_episode_watch_time("s1", "e1", 1200.0, 1200.0).unwrap());
    let progress = engine.episode_progress("s1", "e1").unwrap().unwrap();
    assert!(progress.completed);
}

#[test]
fn test_episode_completion_does_not_promote_parent() {
    let mut engine = engine();
    engine.start_watching(show("s1")).unwrap();
    engine.update_episode_watch_time("s1", "e1", 1200.0, 1200.0).unwrap();
    engine.update_episode_watch_time("s1", "e2", 1200.0, 1200.0).unwrap();

    assert!(engine.is_in_watching_list("s1").unwrap());
    assert!(engine.get_completed_list().unwrap().is_empty());
    let entry = &engine.get_watching_list().unwrap()[0];
    assert!(!entry.is_completed());
    assert_eq!(entry.progress(), Some(1.0));
}

#[test]
fn test_promotion_transfers_and_increments() {
    let mut engine = engine();
    let mut item = WatchlistItem::for_playback(movie("m1"));
    item.times_watched = None;
    engine.add_to_watching_list(item).unwrap();

    assert!(engine.mark_as_complete_in_watching_list("m1").unwrap());
    assert!(!engine.is_in_watching_list("m1").unwrap());
    let completed = engine.get_completed_list().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id(), "m1");
    assert_eq!(completed[0].completed, Some(true));
    assert_eq!(completed[0].times_watched, Some(1));

    // Second full cycle
    engine.start_watching(movie("m1")).unwrap();
    assert!(engine.mark_as_complete_in_watching_list("m1").unwrap());
    let completed = engine.get_completed_list().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].times_watched, Some(2));
}

#[test]
fn test_mark_complete_missing_is_noop() {
    let mut engine = engine();
    engine.start_watching(movie("m1")).unwrap();
    let before = raw_snapshot(&engine);
    assert!(!engine.mark_as_complete_in_watching_list("m2").unwrap());
    assert_eq!(raw_snapshot(&engine), before);
}

#[test]
fn test_lists_are_independent() {
    let mut engine = engine();
    engine.add_to_watchlist(WatchlistItem::saved(movie("m1"))).unwrap();
    assert!(!engine.is_in_watching_list("m1").unwrap());
    assert!(engine.store().raw(ListName::WatchingList).is_none());

    engine.start_watching(movie("m2")).unwrap();
    assert!(!engine.is_in_watchlist("m2").unwrap());

    engine.update_watching_list_movie_time("m1", 30.0).unwrap();
    let watchlist = engine.get_watchlist().unwrap();
    assert_eq!(watchlist[0].movie_timestamp(), None);
}

#[test]
fn test_start_watching_only_once() {
    let mut engine = engine();
    assert!(engine.start_watching(movie("m1")).unwrap());
    engine.update_watching_list_movie_time("m1", 300.0).unwrap();
    assert!(!engine.start_watching(movie("m1")).unwrap());
    assert_eq!(engine.resume_position("m1").unwrap(), Some(300.0));
}

#[test]
fn test_record_progress_fans_out_to_both_lists() {
    let mut engine = engine();
    engine.add_to_watchlist(WatchlistItem::saved(movie("m1"))).unwrap();
    engine.start_watching(movie("m1")).unwrap();

    let touched = engine.record_progress("m1", 61.5).unwrap();
    assert_eq!(touched, vec![ListName::WatchingList, ListName::Watchlist]);
    assert_eq!(engine.resume_position("m1").unwrap(), Some(61.5));
    assert_eq!(engine.get_watchlist().unwrap()[0].movie_timestamp(), Some(61.5));
    assert!(engine.get_watchlist().unwrap()[0].last_watched_at.is_some());
}

#[test]
fn test_record_episode_progress_only_where_present() {
    let mut engine = engine();
    engine.start_watching(show("s1")).unwrap();

    let touched = engine.record_episode_progress("s1", "e2", 50.0, 1200.0).unwrap();
    assert_eq!(touched, vec![ListName::WatchingList]);
    assert!(engine.store().raw(ListName::Watchlist).is_none());
}

#[test]
fn test_movie_time_on_show_entry_is_ignored() {
    let mut engine = engine();
    engine.start_watching(show("s1")).unwrap();
    assert!(!engine.update_watching_list_movie_time("s1", 10.0).unwrap());
}

#[test]
fn test_continue_watching_skips_completed_entries() {
    let mut engine = engine();
    engine.start_watching(movie("m1")).unwrap();
    let mut stale = WatchlistItem::for_playback(movie("m2"));
    stale.completed = Some(true);
    engine.add_to_watching_list(stale).unwrap();

    let ids: Vec<_> = engine
        .continue_watching()
        .unwrap()
        .iter()
        .map(|i| i.id().to_string())
        .collect();
    assert_eq!(ids, vec!["m1"]);
}

#[test]
fn test_move_item_same_list_is_noop() {
    let mut engine = engine();
    engine.start_watching(movie("m1")).unwrap();
    let moved = engine
        .move_item(ListName::WatchingList, ListName::WatchingList, "m1", |item, _| item)
        .unwrap();
    assert!(!moved);
    assert!(engine.is_in_watching_list("m1").unwrap());
}

#[test]
fn test_continue_watching_orders_by_last_watched() {
    use chrono::{Duration, Utc};

    let mut engine = engine();
    let now = Utc::now();
    for (id, watched) in [("m1", Some(now - Duration::hours(2))), ("m2", Some(now)), ("m3", None)] {
        let mut item = WatchlistItem::for_playback(movie(id));
        item.last_watched_at = watched;
        engine.add_to_watching_list(item).unwrap();
    }

    let ids: Vec<_> = engine
        .continue_watching()
        .unwrap()
        .iter()
        .map(|i| i.id().to_string())
        .collect();
    assert_eq!(ids, vec!["m2", "m1", "m3"]);
}
