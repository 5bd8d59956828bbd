//! Interactive headless player
//!
//! Spawns the controller over the persisted queue and library, then reads
//! one command per line until `quit` or end of input. Transport commands
//! go through the remote command center, the same path system media keys
//! would take.

use crate::commands::{format_time, Workspace};
use crate::config::MelosConfig;
use crate::error::Result;
use crate::headless::HeadlessDecoder;
use melos_core::TrackCatalog;
use melos_playback::{
    CommandStatus, ControlCommand, DecoderEvents, NowPlayingInfo, PlaybackEvent, PlaybackSession,
    PlayerController, RemoteCommand, RemoteCommandCenter, SessionSnapshot,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::RecvError;

const HELP: &str = "\
Commands:
  play | pause | toggle     transport
  next | prev               change track
  back                      restart, or previous track when tapped twice
  ff | rew                  skip forward/backward by the skip interval
  seek <secs>               jump to a position
  status                    show what is playing
  queue                     list the queue
  quit                      stop and exit";

/// One line of player input
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    Remote(RemoteCommand),
    Back,
    Status,
    Queue,
    Help,
    Quit,
}

/// Parse a line; `None` for anything unrecognized
pub fn parse_input(line: &str) -> Option<PlayerInput> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();

    let input = match command.as_str() {
        "play" => PlayerInput::Remote(RemoteCommand::Play),
        "pause" => PlayerInput::Remote(RemoteCommand::Pause),
        "toggle" | "p" => PlayerInput::Remote(RemoteCommand::TogglePlayPause),
        "next" | "n" => PlayerInput::Remote(RemoteCommand::NextTrack),
        "prev" | "previous" => PlayerInput::Remote(RemoteCommand::PreviousTrack),
        "ff" => PlayerInput::Remote(RemoteCommand::SkipForward),
        "rew" => PlayerInput::Remote(RemoteCommand::SkipBackward),
        "seek" => {
            let secs = words.next()?.parse::<f64>().ok()?;
            PlayerInput::Remote(RemoteCommand::ChangePlaybackPosition(secs))
        }
        "back" | "b" => PlayerInput::Back,
        "status" | "s" => PlayerInput::Status,
        "queue" | "q" => PlayerInput::Queue,
        "help" | "?" => PlayerInput::Help,
        "quit" | "exit" => PlayerInput::Quit,
        _ => return None,
    };

    if words.next().is_some() {
        return None;
    }
    Some(input)
}

/// Run the player until `quit`, end of input or Ctrl-C
///
/// `start` is sent before any input is read (`Play`, or `PlayFrom` for
/// `queue play-from`).
pub async fn run<R, W>(
    ws: &Workspace,
    config: &MelosConfig,
    start: ControlCommand,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let playback = config.playback_config(&ws.settings());
    let (decoder_events, decoder_stream) = DecoderEvents::channel();
    let durations: Vec<_> = ws
        .library
        .tracks()
        .iter()
        .map(|track| (ws.library.locator(track), track.duration_secs))
        .collect();
    let decoder = HeadlessDecoder::new(decoder_events).with_durations(durations);

    let session = PlaybackSession::new(Box::new(decoder), ws.library.clone(), playback);
    let (controller, handle) =
        PlayerController::new(ws.queue(), session, decoder_stream, playback.progress_interval);
    let task = controller.spawn();
    tracing::info!("Player started");

    let mut remote = RemoteCommandCenter::new(handle.clone());
    let mut events = handle.subscribe();
    handle.send(start)?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }

                match parse_input(&line) {
                    Some(PlayerInput::Quit) => break,
                    Some(PlayerInput::Remote(command)) => {
                        let status = remote.dispatch(command);
                        if status != CommandStatus::Success {
                            writeln!(out, "{:?}: {:?}", command, status)?;
                        }
                    }
                    Some(PlayerInput::Back) => handle.back()?,
                    Some(PlayerInput::Status) => {
                        let snapshot = handle.query_snapshot().await?;
                        write_status(out, &snapshot)?;
                    }
                    Some(PlayerInput::Queue) => {
                        let entries = handle.queue().await?;
                        let snapshot = handle.query_snapshot().await?;
                        for (index, entry) in entries.iter().enumerate() {
                            let marker = if snapshot.queue_position == Some(index) { '>' } else { ' ' };
                            let title = ws
                                .library
                                .resolve(&entry.track_id)
                                .map_or_else(|| "<missing>".to_string(), |t| t.title);
                            writeln!(out, "{} {:>3}  {}", marker, index, title)?;
                        }
                    }
                    Some(PlayerInput::Help) => writeln!(out, "{}", HELP)?,
                    None => writeln!(out, "Unknown command: {} (try 'help')", line.trim())?,
                }
            }
            event = events.recv() => match event {
                Ok(event) => write_event(ws, out, &event)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Player output skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    remote.detach();
    if handle.shutdown().is_ok() {
        if let Err(e) = task.await {
            tracing::error!("Player task failed: {}", e);
        }
    }
    tracing::info!("Player stopped");
    Ok(())
}

fn write_status(out: &mut impl Write, snapshot: &SessionSnapshot) -> Result<()> {
    let Some(info) = NowPlayingInfo::from_snapshot(snapshot) else {
        writeln!(out, "Nothing playing")?;
        return Ok(());
    };

    let state = if info.playback_rate > 0.0 { "playing" } else { "paused" };
    let position = snapshot
        .queue_position
        .map(|p| format!(" [{}/{}]", p + 1, snapshot.queue_length))
        .unwrap_or_default();
    writeln!(
        out,
        "{} ({}) {} / {}{}",
        info.title,
        state,
        format_time(info.elapsed_secs),
        format_time(info.duration_secs),
        position
    )?;
    Ok(())
}

fn write_event(ws: &Workspace, out: &mut impl Write, event: &PlaybackEvent) -> Result<()> {
    match event {
        PlaybackEvent::TrackChanged { track_id, .. } => {
            if let Some(track) = ws.library.get(track_id) {
                writeln!(out, "Now playing: {}", track.title)?;
            }
        }
        PlaybackEvent::TrackSkipped { track_id } => {
            writeln!(out, "Skipped missing track {}", track_id)?;
        }
        PlaybackEvent::Error { message } => {
            writeln!(out, "Playback error: {}", message)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transport_words() {
        assert_eq!(
            parse_input("toggle"),
            Some(PlayerInput::Remote(RemoteCommand::TogglePlayPause))
        );
        assert_eq!(
            parse_input("  NEXT "),
            Some(PlayerInput::Remote(RemoteCommand::NextTrack))
        );
        assert_eq!(parse_input("back"), Some(PlayerInput::Back));
        assert_eq!(parse_input("quit"), Some(PlayerInput::Quit));
    }

    #[test]
    fn seek_needs_a_number() {
        assert_eq!(
            parse_input("seek 42.5"),
            Some(PlayerInput::Remote(RemoteCommand::ChangePlaybackPosition(42.5)))
        );
        assert_eq!(parse_input("seek"), None);
        assert_eq!(parse_input("seek soon"), None);
    }

    #[test]
    fn trailing_words_are_rejected() {
        assert_eq!(parse_input("pause now"), None);
        assert_eq!(parse_input("seek 1 2"), None);
        assert_eq!(parse_input("dance"), None);
    }
}
