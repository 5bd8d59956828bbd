//! Controller integration tests
//!
//! Runs the controller task on a paused tokio clock so the progress ticker
//! and back-button timers are deterministic.

mod common;

use common::{locator, DecoderCall, RecordingDecoder, StaticCatalog};
use melos_core::{MemoryStore, TrackId};
use melos_playback::{
    CommandStatus, ControlCommand, ControlHandle, DecoderEvents, PlaybackConfig, PlaybackEvent,
    PlaybackSession, PlaybackState, PlayerController, QueueEngine, RemoteCommand,
    RemoteCommandCenter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

// ===== Test Helpers =====

struct Player {
    handle: ControlHandle,
    decoder: RecordingDecoder,
    decoder_events: DecoderEvents,
    task: JoinHandle<()>,
}

fn spawn_player(queued: &[&str], current: usize) -> Player {
    let decoder = RecordingDecoder::new();
    let catalog = Arc::new(StaticCatalog::with_tracks(&[
        ("a", 100.0),
        ("b", 200.0),
        ("c", 300.0),
    ]));
    let config = PlaybackConfig::default();

    let mut queue = QueueEngine::new(Arc::new(MemoryStore::new()));
    queue.replace(queued.iter().map(|&id| TrackId::new(id)), current);

    let session = PlaybackSession::new(Box::new(decoder.clone()), catalog, config);
    let (decoder_events, decoder_stream) = DecoderEvents::channel();
    let (controller, handle) =
        PlayerController::new(queue, session, decoder_stream, config.progress_interval);

    Player {
        handle,
        decoder,
        decoder_events,
        task: controller.spawn(),
    }
}

impl Player {
    /// Apply a command and wait until the controller has processed it
    async fn apply(&self, command: ControlCommand) -> melos_playback::SessionSnapshot {
        self.handle.send(command).unwrap();
        self.handle.query_snapshot().await.unwrap()
    }
}

// ===== Startup =====

#[tokio::test(start_paused = true)]
async fn test_startup_cues_restored_entry_paused() {
    let player = spawn_player(&["a", "b"], 1);

    let snapshot = player.handle.query_snapshot().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Paused);
    assert_eq!(snapshot.track_id, Some(TrackId::new("b")));
    assert_eq!(snapshot.queue_position, Some(1));
    assert_eq!(player.decoder.calls(), vec![DecoderCall::Load(locator("b"))]);
}

#[tokio::test(start_paused = true)]
async fn test_startup_with_empty_queue_is_idle() {
    let player = spawn_player(&[], 0);

    let snapshot = player.handle.query_snapshot().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Stopped);
    assert_eq!(snapshot.queue_position, None);
    assert_eq!(snapshot.queue_length, 0);
}

// ===== Commands =====

#[tokio::test(start_paused = true)]
async fn test_play_resumes_cued_track() {
    let player = spawn_player(&["a", "b"], 0);

    let snapshot = player.apply(ControlCommand::Play).await;

    assert!(snapshot.is_playing);
    assert_eq!(snapshot.track_id, Some(TrackId::new("a")));
    assert_eq!(player.decoder.calls().last(), Some(&DecoderCall::Resume));
}

#[tokio::test(start_paused = true)]
async fn test_replace_starts_playing_at_index() {
    let player = spawn_player(&[], 0);

    let snapshot = player
        .apply(ControlCommand::Replace {
            track_ids: vec![TrackId::new("c"), TrackId::new("a"), TrackId::new("b")],
            start_index: 1,
        })
        .await;

    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.track_id, Some(TrackId::new("a")));
    assert_eq!(snapshot.queue_length, 3);
}

#[tokio::test(start_paused = true)]
async fn test_queue_mutations_are_applied_in_order() {
    let player = spawn_player(&["a"], 0);

    player
        .handle
        .send(ControlCommand::Append(vec![TrackId::new("b"), TrackId::new("c")]))
        .unwrap();
    player
        .handle
        .send(ControlCommand::InsertNext(TrackId::new("c")))
        .unwrap();
    player
        .handle
        .send(ControlCommand::Move { from: vec![3], to: 0 })
        .unwrap();
    player.handle.send(ControlCommand::Remove(vec![2])).unwrap();

    let entries = player.handle.queue().await.unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.track_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.queue_position, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_clear_queue_stops_playback() {
    let player = spawn_player(&["a", "b"], 0);
    player.apply(ControlCommand::Play).await;

    let snapshot = player.apply(ControlCommand::ClearQueue).await;

    assert_eq!(snapshot.state, PlaybackState::Stopped);
    assert_eq!(snapshot.queue_length, 0);
    assert_eq!(player.decoder.calls().last(), Some(&DecoderCall::Unload));
}

// ===== Decoder Events =====

#[tokio::test(start_paused = true)]
async fn test_finished_event_advances_queue() {
    let player = spawn_player(&["a", "b"], 1);
    player.apply(ControlCommand::Play).await;

    assert!(player.decoder_events.finished(player.decoder.last_load_id()));
    // Let the controller pick up the decoder event
    tokio::time::sleep(Duration::from_millis(1)).await;

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.track_id, Some(TrackId::new("a")));
    assert_eq!(snapshot.queue_position, Some(0));
    assert!(snapshot.is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_decode_error_is_broadcast() {
    let player = spawn_player(&["a"], 0);
    let mut events = player.handle.subscribe();
    player.apply(ControlCommand::Play).await;

    player.decoder_events.decode_error(player.decoder.last_load_id(), "bad frame");
    tokio::time::sleep(Duration::from_millis(1)).await;

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Paused);

    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        if event == (PlaybackEvent::Error {
            message: "bad frame".to_string(),
        }) {
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test(start_paused = true)]
async fn test_stale_finished_after_next_does_not_advance_again() {
    let player = spawn_player(&["a", "b", "c"], 0);
    player.apply(ControlCommand::Play).await;
    let first_load = player.decoder.last_load_id();

    player.apply(ControlCommand::SkipToNext).await;
    // End-of-track report for "a" arrives after the user already moved on
    assert!(player.decoder_events.finished(first_load));
    tokio::time::sleep(Duration::from_millis(1)).await;

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.track_id, Some(TrackId::new("b")));
    assert_eq!(snapshot.queue_position, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_finished_after_stop_keeps_player_stopped() {
    let player = spawn_player(&["a", "b"], 0);
    player.apply(ControlCommand::Play).await;
    let load_id = player.decoder.last_load_id();

    player.apply(ControlCommand::Stop).await;
    player.decoder_events.finished(load_id);
    tokio::time::sleep(Duration::from_millis(1)).await;

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Stopped);
    assert_eq!(snapshot.track_id, None);
    assert_eq!(snapshot.queue_position, Some(0));
}

// ===== Back Gesture =====

#[tokio::test(start_paused = true)]
async fn test_single_back_tap_restarts_after_window() {
    let player = spawn_player(&["a", "b"], 1);
    player.apply(ControlCommand::Play).await;
    player.apply(ControlCommand::Seek(50.0)).await;

    let snapshot = player.apply(ControlCommand::BackGesture).await;
    assert_eq!(snapshot.elapsed_secs, 50.0);

    tokio::time::sleep(Duration::from_millis(450)).await;

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.track_id, Some(TrackId::new("b")));
    assert_eq!(snapshot.elapsed_secs, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_double_back_tap_goes_to_previous_without_restart() {
    let player = spawn_player(&["a", "b"], 1);
    player.apply(ControlCommand::Play).await;

    player.apply(ControlCommand::BackGesture).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let snapshot = player.apply(ControlCommand::BackGesture).await;
    assert_eq!(snapshot.track_id, Some(TrackId::new("a")));

    player.apply(ControlCommand::Seek(20.0)).await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    // The first tap's restart must not fire on the previous track
    let seeks: Vec<_> = player
        .decoder
        .calls()
        .into_iter()
        .filter(|c| matches!(c, DecoderCall::Seek(_)))
        .collect();
    assert_eq!(seeks, vec![DecoderCall::Seek(20.0)]);
}

// ===== Interruptions =====

#[tokio::test(start_paused = true)]
async fn test_interruption_pauses_and_resumes_when_asked() {
    let player = spawn_player(&["a"], 0);
    player.apply(ControlCommand::Play).await;

    let snapshot = player.apply(ControlCommand::InterruptionBegan).await;
    assert!(!snapshot.is_playing);

    let snapshot = player
        .apply(ControlCommand::InterruptionEnded {
            should_resume: false,
        })
        .await;
    assert!(!snapshot.is_playing);

    player.apply(ControlCommand::InterruptionBegan).await;
    let snapshot = player
        .apply(ControlCommand::InterruptionEnded {
            should_resume: true,
        })
        .await;
    assert!(snapshot.is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_route_lost_pauses() {
    let player = spawn_player(&["a"], 0);
    player.apply(ControlCommand::Play).await;

    let snapshot = player.apply(ControlCommand::RouteLost).await;

    assert_eq!(snapshot.state, PlaybackState::Paused);
}

// ===== Progress =====

#[tokio::test(start_paused = true)]
async fn test_progress_ticks_publish_position() {
    let player = spawn_player(&["a"], 0);
    let mut watch = player.handle.watch();
    player.apply(ControlCommand::Play).await;

    player.decoder.set_elapsed(7.5);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let snapshot = watch.borrow_and_update().clone();
    assert_eq!(snapshot.elapsed_secs, 7.5);
    assert_eq!(player.handle.snapshot().elapsed_secs, 7.5);
}

// ===== Remote Commands =====

#[tokio::test(start_paused = true)]
async fn test_remote_commands_reach_controller() {
    let player = spawn_player(&["a", "b"], 0);
    let center = RemoteCommandCenter::new(player.handle.clone());

    assert_eq!(center.dispatch(RemoteCommand::Play), CommandStatus::Success);
    assert_eq!(center.dispatch(RemoteCommand::NextTrack), CommandStatus::Success);
    assert_eq!(
        center.dispatch(RemoteCommand::ChangePlaybackPosition(f64::NAN)),
        CommandStatus::CommandFailed
    );

    let snapshot = player.handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.track_id, Some(TrackId::new("b")));
    assert!(snapshot.is_playing);

    let info = center.now_playing().expect("a track is loaded");
    assert_eq!(info.title, "B");
    assert_eq!(info.playback_rate, 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_remote_after_detach_or_shutdown_has_nothing_to_control() {
    let player = spawn_player(&["a"], 0);
    let mut detached = RemoteCommandCenter::new(player.handle.clone());
    let attached = RemoteCommandCenter::new(player.handle.clone());

    detached.detach();
    assert_eq!(detached.dispatch(RemoteCommand::Play), CommandStatus::NoActionableItem);

    player.handle.shutdown().unwrap();
    player.task.await.unwrap();

    assert!(!attached.is_attached());
    assert_eq!(
        attached.dispatch(RemoteCommand::TogglePlayPause),
        CommandStatus::NoActionableItem
    );
    assert!(player.handle.send(ControlCommand::Play).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_decoder() {
    let player = spawn_player(&["a"], 0);
    player.apply(ControlCommand::Play).await;

    player.handle.shutdown().unwrap();
    player.task.await.unwrap();

    assert_eq!(player.decoder.calls().last(), Some(&DecoderCall::Unload));
    assert_eq!(player.handle.snapshot().state, PlaybackState::Stopped);
}
