//! End-to-end tests for tier runs
//!
//! Every test opens real SQLite stores in a temporary directory and runs tiers
//! through the same `SyncManager` the CLI builds.

mod common;

use common::{
    TestApp, NOWPLAYING_URL, PONYFM_PAGE_1_URL, PONYFM_PAGE_2_URL, SONG_1_ARTIST, SONG_1_TITLE,
    SONG_2_ARTIST, SONG_2_TITLE, START_TIME,
};
use radio_sync_server::background_jobs::{JobRunStatus, TierRunOutcome, TierRunReport};
use radio_sync_server::nowplaying::{NowPlaying, StreamStatus};
use radio_sync_server::settings_store::set_i64_setting;
use radio_sync_server::songs::{song_hash, SongDescription};
use radio_sync_server::station_store::NewSongHistoryEntry;
use radio_sync_server::SyncTier;
use serde_json::json;

const DAY: i64 = 86_400;

fn run(test_app: &TestApp, tier: SyncTier) -> TierRunReport {
    match test_app.manager.run_tier(tier, false).unwrap() {
        TierRunOutcome::Ran(report) => report,
        TierRunOutcome::Skipped { last_started_at } => {
            panic!("{} unexpectedly skipped (started at {})", tier, last_started_at)
        }
    }
}

fn song_1_text() -> String {
    format!("{} - {}", SONG_1_ARTIST, SONG_1_TITLE)
}

// =============================================================================
// Now playing tier
// =============================================================================

#[test]
fn test_nowplaying_tier_records_snapshot_song_and_history() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    test_app.fetcher.set_body(NOWPLAYING_URL, song_1_text());

    let report = run(&test_app, SyncTier::NowPlaying);
    assert_eq!(report.completed_at, Some(START_TIME));
    assert_eq!(report.jobs[0].status, JobRunStatus::Completed);

    let stored = test_app
        .app
        .station_store
        .get_nowplaying(stream.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.updated_at, START_TIME);
    assert_eq!(stored.nowplaying.meta.status, StreamStatus::Online);
    assert_eq!(stored.nowplaying.current_song.artist, SONG_1_ARTIST);
    assert_eq!(stored.nowplaying.current_song.title, SONG_1_TITLE);

    let song_id = song_hash(&SongDescription::from(song_1_text()));
    let song = test_app.app.song_store.get_song(&song_id).unwrap().unwrap();
    assert_eq!(song.play_count, 1);
    assert_eq!(song.last_played, START_TIME);

    let history = test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song_id, song_id);
}

#[test]
fn test_unchanged_song_is_not_played_twice() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    test_app.fetcher.set_body(NOWPLAYING_URL, song_1_text());

    run(&test_app, SyncTier::NowPlaying);
    test_app.clock.advance(30);
    run(&test_app, SyncTier::NowPlaying);

    let history = test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap();
    assert_eq!(history.len(), 1);

    test_app.clock.advance(30);
    test_app.fetcher.set_body(
        NOWPLAYING_URL,
        format!("{} - {}", SONG_2_ARTIST, SONG_2_TITLE),
    );
    run(&test_app, SyncTier::NowPlaying);

    let history = test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(test_app.app.song_store.count_songs().unwrap(), 2);
}

#[test]
fn test_unreachable_stream_is_stored_offline_and_tier_completes() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();

    let report = run(&test_app, SyncTier::NowPlaying);
    assert!(report.completed_at.is_some());

    let stored = test_app
        .app
        .station_store
        .get_nowplaying(stream.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.nowplaying.meta.status, StreamStatus::Offline);
    assert!(test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap()
        .is_empty());
    assert_eq!(test_app.app.song_store.count_songs().unwrap(), 0);
}

#[test]
fn test_disabled_stream_is_not_fetched_and_reads_offline() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    test_app.fetcher.set_body(NOWPLAYING_URL, song_1_text());
    assert!(test_app
        .app
        .station_store
        .set_stream_active(stream.id, false)
        .unwrap());

    let report = run(&test_app, SyncTier::NowPlaying);
    assert!(report.completed_at.is_some());

    let stored = test_app
        .app
        .station_store
        .get_nowplaying(stream.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.nowplaying, NowPlaying::offline());
    assert_eq!(test_app.fetcher.requests_to(NOWPLAYING_URL), 0);
    assert!(test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap()
        .is_empty());
    assert_eq!(test_app.app.song_store.count_songs().unwrap(), 0);

    test_app
        .app
        .station_store
        .set_stream_active(stream.id, true)
        .unwrap();
    test_app.clock.advance(60);
    run(&test_app, SyncTier::NowPlaying);
    assert_eq!(test_app.fetcher.requests_to(NOWPLAYING_URL), 1);
}

#[test]
fn test_disabled_station_is_not_fetched() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    test_app.fetcher.set_body(NOWPLAYING_URL, song_1_text());
    test_app
        .app
        .station_store
        .set_station_active(stream.station_id, false)
        .unwrap();

    run(&test_app, SyncTier::NowPlaying);

    let stored = test_app
        .app
        .station_store
        .get_nowplaying(stream.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.nowplaying, NowPlaying::offline());
    assert_eq!(test_app.fetcher.requests_to(NOWPLAYING_URL), 0);
}

#[test]
fn test_nowplaying_run_in_flight_is_skipped_unless_forced() {
    let test_app = TestApp::new();
    test_app.add_text_station();
    set_i64_setting(
        test_app.app.settings.as_ref(),
        SyncTier::NowPlaying.started_key(),
        START_TIME - 10,
    )
    .unwrap();

    let outcome = test_app
        .manager
        .run_tier(SyncTier::NowPlaying, false)
        .unwrap();
    assert!(matches!(
        outcome,
        TierRunOutcome::Skipped { last_started_at } if last_started_at == START_TIME - 10
    ));
    assert_eq!(test_app.fetcher.requests_to(NOWPLAYING_URL), 0);

    let outcome = test_app.manager.run_tier(SyncTier::NowPlaying, true).unwrap();
    assert!(matches!(outcome, TierRunOutcome::Ran(_)));
    assert_eq!(test_app.fetcher.requests_to(NOWPLAYING_URL), 1);
}

// =============================================================================
// Short and medium tiers
// =============================================================================

#[test]
fn test_short_tier_marks_stale_snapshots_offline() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    test_app.fetcher.set_body(NOWPLAYING_URL, song_1_text());
    run(&test_app, SyncTier::NowPlaying);

    test_app.clock.advance(60);
    run(&test_app, SyncTier::Short);
    let stored = test_app
        .app
        .station_store
        .get_nowplaying(stream.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.nowplaying.meta.status, StreamStatus::Online);

    test_app.clock.advance(600);
    run(&test_app, SyncTier::Short);
    let stored = test_app
        .app
        .station_store
        .get_nowplaying(stream.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.nowplaying.meta.status, StreamStatus::Offline);
}

#[test]
fn test_merged_song_plays_are_credited_to_canonical() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    let resolver = test_app.app.song_resolver();

    let canonical = resolver
        .get_or_create(&SongDescription::from_artist_title(SONG_1_ARTIST, SONG_1_TITLE), false)
        .unwrap();
    let duplicate = resolver
        .get_or_create(&SongDescription::from("Mane 6 - Winter Wrap-Up (Radio Edit)"), false)
        .unwrap();
    resolver.merge_song(&duplicate.id, &canonical.id).unwrap();

    test_app
        .fetcher
        .set_body(NOWPLAYING_URL, "Mane 6 - Winter Wrap-Up (Radio Edit)");
    run(&test_app, SyncTier::NowPlaying);

    let history = test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song_id, canonical.id);

    let report = run(&test_app, SyncTier::Medium);
    assert_eq!(report.jobs[0].status, JobRunStatus::Completed);
}

// =============================================================================
// Long tier
// =============================================================================

#[test]
fn test_long_tier_mirrors_catalog_and_deduplicates_against_radio_plays() {
    let test_app = TestApp::new();
    test_app.add_text_station();
    test_app.fetcher.set_body(NOWPLAYING_URL, song_1_text());
    run(&test_app, SyncTier::NowPlaying);
    assert_eq!(test_app.app.song_store.count_songs().unwrap(), 1);

    let page_1 = json!({
        "total_pages": 3,
        "tracks": [
            {"id": 11, "title": SONG_1_TITLE, "user": {"name": SONG_1_ARTIST}, "url": "http://catalog.test/t/11"},
            {"id": 12, "title": SONG_2_TITLE, "user": {"name": SONG_2_ARTIST}},
            {"id": 13, "title": "No Artist"}
        ]
    });
    let page_3 = json!({
        "total_pages": 3,
        "tracks": [
            {"id": 31, "title": "Hearts as Strong as Horses", "user": {"name": "Applejack"}}
        ]
    });
    test_app
        .fetcher
        .set_body(PONYFM_PAGE_1_URL, page_1.to_string());
    test_app.fetcher.set_body(
        "http://catalog.test/ponyfm?page=3&client=radiosync",
        page_3.to_string(),
    );

    let report = run(&test_app, SyncTier::Long);
    assert!(report.completed_at.is_some());
    assert_eq!(report.failed_jobs().count(), 0);
    assert_eq!(test_app.fetcher.requests_to(PONYFM_PAGE_2_URL), 1);

    let mirrored = test_app
        .app
        .song_store
        .get_external_song_ids("ponyfm")
        .unwrap();
    assert_eq!(mirrored.len(), 3);
    assert_eq!(
        mirrored["11"],
        song_hash(&SongDescription::from(song_1_text()))
    );
    // Song 1 was already known from the radio play.
    assert_eq!(test_app.app.song_store.count_songs().unwrap(), 3);
}

#[test]
fn test_long_tier_fails_catalog_job_when_first_page_is_down() {
    let test_app = TestApp::new();
    test_app.fetcher.remove(PONYFM_PAGE_1_URL);

    let report = run(&test_app, SyncTier::Long);

    let failed: Vec<_> = report.failed_jobs().map(|j| j.job_id).collect();
    assert_eq!(failed, vec!["catalog_sync_ponyfm"]);
    // A remote outage does not hold back the tier watermark.
    assert!(report.completed_at.is_some());
    let eqbeats = report
        .jobs
        .iter()
        .find(|j| j.job_id == "catalog_sync_eqbeats")
        .unwrap();
    assert_eq!(eqbeats.status, JobRunStatus::NotRegistered);
}

#[test]
fn test_long_tier_prunes_old_song_history() {
    let test_app = TestApp::new();
    let stream = test_app.add_text_station();
    for (song_id, age_days) in [("old", 45), ("recent", 2)] {
        test_app
            .app
            .station_store
            .record_song_history(&NewSongHistoryEntry {
                station_id: stream.station_id,
                stream_id: stream.id,
                song_id: song_id.to_string(),
                timestamp: START_TIME - age_days * DAY,
                listeners: 0,
            })
            .unwrap();
    }

    run(&test_app, SyncTier::Long);

    let history = test_app
        .app
        .station_store
        .get_song_history(stream.id, 10)
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song_id, "recent");
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn test_sync_times_reflect_completed_tiers() {
    let test_app = TestApp::new();

    let before = test_app.manager.sync_times().unwrap();
    assert_eq!(before.len(), 4);
    assert!(before.iter().all(|s| s.last_run_at == 0));
    assert!(before.iter().all(|s| s.human_readable_age == "never"));

    run(&test_app, SyncTier::Short);
    test_app.clock.advance(120);

    let after = test_app.manager.sync_times().unwrap();
    let short = after.iter().find(|s| s.key == "short").unwrap();
    assert_eq!(short.last_run_at, START_TIME);
    assert_eq!(short.seconds_since_last_run, 120);
    assert_eq!(short.human_readable_age, "2 minutes");
    assert_eq!(short.contents, vec!["Stale Now Playing Sweep"]);
}
