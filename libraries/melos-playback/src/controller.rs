//! Player controller
//!
//! A single tokio task owns the queue and the session. Everything that
//! touches them is marshaled into that task through channels:
//!
//! ```text
//!  ControlHandle ──commands──►┐
//!  DecoderEvents ──finished──►│  PlayerController  ──watch──►  SessionSnapshot
//!  restart timers ──tokens───►│  (queue, session)  ──broadcast─► PlaybackEvent
//!  progress ticker ──────────►┘
//! ```

use crate::back_gesture::RestartToken;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::queue::QueueEngine;
use crate::session::PlaybackSession;
use crate::types::SessionSnapshot;
use melos_core::{LoadId, QueueEntry, TrackId};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Buffer size of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Commands accepted by the controller
#[derive(Debug)]
pub enum ControlCommand {
    /// Resume if paused, otherwise play the current entry
    Play,
    /// Resume a paused track
    Resume,
    /// Pause playback
    Pause,
    /// Flip between playing and paused
    TogglePlayPause,
    /// Stop and release the decoder
    Stop,
    /// Move the playhead (seconds)
    Seek(f64),
    /// Jump ahead by the skip interval
    SkipForward,
    /// Jump back by the skip interval
    SkipBackward,
    /// Next entry (wrapping)
    SkipToNext,
    /// Previous entry (wrapping)
    SkipToPrevious,
    /// Back button: restart, or previous on double tap
    BackGesture,
    /// Jump to an entry and play it
    PlayFrom(usize),
    /// Add tracks at the end of the queue
    Append(Vec<TrackId>),
    /// Add a track after the current entry
    InsertNext(TrackId),
    /// Replace the queue and start playing at `start_index`
    Replace {
        /// New queue contents
        track_ids: Vec<TrackId>,
        /// Entry to start at (clamped)
        start_index: usize,
    },
    /// Delete queue entries
    Remove(Vec<usize>),
    /// Reorder queue entries
    Move {
        /// Entries to move
        from: Vec<usize>,
        /// Destination (before the entry originally here)
        to: usize,
    },
    /// Stop and empty the queue
    ClearQueue,
    /// Change the skip interval (seconds)
    SetSkipInterval(u32),
    /// Another app took the audio output
    InterruptionBegan,
    /// Audio output given back
    InterruptionEnded {
        /// Whether the system asks us to resume
        should_resume: bool,
    },
    /// Output device went away (e.g. headphones unplugged)
    RouteLost,
    /// Reply with the queue entries
    QueryQueue(oneshot::Sender<Vec<QueueEntry>>),
    /// Reply with a fresh snapshot
    QuerySnapshot(oneshot::Sender<SessionSnapshot>),
    /// Stop the controller task
    Shutdown,
}

/// Events reported by the decoder driver
///
/// Each event names the load it belongs to. Events from a load the session
/// has since replaced or released are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    /// The loaded track played to its end
    Finished {
        /// Load that finished
        load_id: LoadId,
    },
    /// Decoding failed mid-track
    DecodeError {
        /// Load that failed
        load_id: LoadId,
        /// Decoder's description of the failure
        message: String,
    },
}

/// Sending half handed to the decoder driver
#[derive(Debug, Clone)]
pub struct DecoderEvents {
    tx: mpsc::UnboundedSender<DecoderEvent>,
}

/// Receiving half consumed by the controller
#[derive(Debug)]
pub struct DecoderEventStream {
    rx: mpsc::UnboundedReceiver<DecoderEvent>,
}

impl DecoderEvents {
    /// Create a connected sender/stream pair
    pub fn channel() -> (DecoderEvents, DecoderEventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DecoderEvents { tx }, DecoderEventStream { rx })
    }

    /// Report that the track loaded as `load_id` finished
    ///
    /// Returns false once the controller is gone.
    pub fn finished(&self, load_id: LoadId) -> bool {
        self.tx.send(DecoderEvent::Finished { load_id }).is_ok()
    }

    /// Report a decode error for `load_id`
    pub fn decode_error(&self, load_id: LoadId, message: impl Into<String>) -> bool {
        self.tx
            .send(DecoderEvent::DecodeError {
                load_id,
                message: message.into(),
            })
            .is_ok()
    }
}

impl DecoderEventStream {
    /// Wait for the next decoder event
    ///
    /// Returns `None` once every `DecoderEvents` sender was dropped.
    pub async fn recv(&mut self) -> Option<DecoderEvent> {
        self.rx.recv().await
    }
}

/// Cloneable handle for sending commands and observing state
#[derive(Debug, Clone)]
pub struct ControlHandle {
    commands: mpsc::UnboundedSender<ControlCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl ControlHandle {
    /// Send a command
    ///
    /// Fails only when the controller task has stopped.
    pub fn send(&self, command: ControlCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Resume, or play the current entry when stopped
    pub fn play(&self) -> Result<()> {
        self.send(ControlCommand::Play)
    }

    /// Pause playback
    pub fn pause(&self) -> Result<()> {
        self.send(ControlCommand::Pause)
    }

    /// Flip between playing and paused
    pub fn toggle_play_pause(&self) -> Result<()> {
        self.send(ControlCommand::TogglePlayPause)
    }

    /// Next entry
    pub fn skip_to_next(&self) -> Result<()> {
        self.send(ControlCommand::SkipToNext)
    }

    /// Previous entry
    pub fn skip_to_previous(&self) -> Result<()> {
        self.send(ControlCommand::SkipToPrevious)
    }

    /// Move the playhead
    pub fn seek(&self, position_secs: f64) -> Result<()> {
        self.send(ControlCommand::Seek(position_secs))
    }

    /// Back button tap
    pub fn back(&self) -> Result<()> {
        self.send(ControlCommand::BackGesture)
    }

    /// Stop the controller task
    pub fn shutdown(&self) -> Result<()> {
        self.send(ControlCommand::Shutdown)
    }

    /// Last published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that wakes on every snapshot change
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Ask the controller for the queue entries
    ///
    /// Commands sent earlier from this handle are applied first.
    pub async fn queue(&self) -> Result<Vec<QueueEntry>> {
        let (tx, rx) = oneshot::channel();
        self.send(ControlCommand::QueryQueue(tx))?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Ask the controller for a fresh snapshot
    ///
    /// Commands sent earlier from this handle are applied first.
    pub async fn query_snapshot(&self) -> Result<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(ControlCommand::QuerySnapshot(tx))?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Whether the controller task has stopped
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Actor owning the queue and the session
pub struct PlayerController {
    queue: QueueEngine,
    session: PlaybackSession,
    progress_interval: Duration,

    commands: mpsc::UnboundedReceiver<ControlCommand>,
    decoder_events: DecoderEventStream,
    restart_tx: mpsc::UnboundedSender<RestartToken>,
    restart_rx: mpsc::UnboundedReceiver<RestartToken>,

    snapshot_tx: watch::Sender<SessionSnapshot>,
    event_tx: broadcast::Sender<PlaybackEvent>,
}

impl PlayerController {
    /// Create a controller and its handle
    ///
    /// Nothing runs until [`PlayerController::run`] (or `spawn`) is called.
    pub fn new(
        queue: QueueEngine,
        session: PlaybackSession,
        decoder_events: DecoderEventStream,
        progress_interval: Duration,
    ) -> (Self, ControlHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (restart_tx, restart_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(&queue));
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let handle = ControlHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
            events: event_tx.clone(),
        };

        let controller = Self {
            queue,
            session,
            progress_interval,
            commands: command_rx,
            decoder_events,
            restart_tx,
            restart_rx,
            snapshot_tx,
            event_tx,
        };

        (controller, handle)
    }

    /// Run the controller on a new tokio task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Controller loop
    ///
    /// Cues the restored queue (paused), then serves commands, decoder
    /// events, restart timers and progress ticks until `Shutdown` or until
    /// every handle is dropped.
    pub async fn run(mut self) {
        self.session.cue_current(&self.queue);
        self.publish();
        tracing::info!("Playback controller started ({} queued)", self.queue.len());

        let mut ticker = tokio::time::interval(self.progress_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(ControlCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.decoder_events.recv() => self.handle_decoder_event(event),
                Some(token) = self.restart_rx.recv() => {
                    if self.session.deferred_restart(token) {
                        tracing::debug!("Restarted track (back tap {})", token.generation());
                    }
                }
                _ = ticker.tick() => {
                    self.session.refresh_position();
                }
            }
            self.publish();
        }

        self.session.stop();
        self.publish();
        tracing::info!("Playback controller stopped");
    }

    fn handle_command(&mut self, command: ControlCommand) {
        tracing::trace!("Command: {:?}", command);
        let queue = &mut self.queue;
        let session = &mut self.session;

        match command {
            ControlCommand::Play => {
                if session.state().is_loaded() {
                    session.resume();
                } else {
                    session.play_current(queue);
                }
            }
            ControlCommand::Resume => session.resume(),
            ControlCommand::Pause | ControlCommand::RouteLost | ControlCommand::InterruptionBegan => {
                session.pause();
            }
            ControlCommand::TogglePlayPause => session.toggle_play_pause(),
            ControlCommand::Stop => session.stop(),
            ControlCommand::Seek(position) => session.seek(position),
            ControlCommand::SkipForward => session.skip_forward(),
            ControlCommand::SkipBackward => session.skip_backward(),
            ControlCommand::SkipToNext => session.skip_to_next(queue),
            ControlCommand::SkipToPrevious => session.skip_to_previous(queue),
            ControlCommand::BackGesture => {
                let now = Instant::now().into_std();
                if let Some(token) = session.back_gesture(now, queue) {
                    self.schedule_restart(token);
                }
            }
            ControlCommand::PlayFrom(index) => {
                if queue.jump_to(index) {
                    session.play_current(queue);
                }
                self.emit_queue_changed();
            }
            ControlCommand::Append(track_ids) => {
                queue.append_many(track_ids);
                self.emit_queue_changed();
            }
            ControlCommand::InsertNext(track_id) => {
                queue.insert_next(track_id);
                self.emit_queue_changed();
            }
            ControlCommand::Replace {
                track_ids,
                start_index,
            } => {
                queue.replace(track_ids, start_index);
                session.play_current(queue);
                self.emit_queue_changed();
            }
            ControlCommand::Remove(indices) => {
                queue.remove(&indices);
                self.emit_queue_changed();
            }
            ControlCommand::Move { from, to } => {
                queue.move_entries(&from, to);
                self.emit_queue_changed();
            }
            ControlCommand::ClearQueue => {
                session.stop();
                queue.clear();
                self.emit_queue_changed();
            }
            ControlCommand::SetSkipInterval(secs) => session.set_skip_interval(secs),
            ControlCommand::InterruptionEnded { should_resume } => {
                if should_resume {
                    session.resume();
                }
            }
            ControlCommand::QueryQueue(reply) => {
                let _ = reply.send(queue.entries().to_vec());
            }
            ControlCommand::QuerySnapshot(reply) => {
                let _ = reply.send(session.snapshot(queue));
            }
            // Handled by the loop
            ControlCommand::Shutdown => {}
        }
    }

    fn handle_decoder_event(&mut self, event: DecoderEvent) {
        match event {
            DecoderEvent::Finished { load_id } => {
                self.session.handle_finished(load_id, &mut self.queue);
            }
            DecoderEvent::DecodeError { load_id, message } => {
                self.session.handle_decode_error(load_id, &message);
            }
        }
    }

    fn schedule_restart(&self, token: RestartToken) {
        let tx = self.restart_tx.clone();
        let window = self.session.double_tap_window();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = tx.send(token);
        });
    }

    fn emit_queue_changed(&mut self) {
        let _ = self.event_tx.send(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });
    }

    /// Forward pending events and publish the snapshot if it changed
    fn publish(&mut self) {
        for event in self.session.drain_events() {
            // No subscribers is fine
            let _ = self.event_tx.send(event);
        }

        let snapshot = self.session.snapshot(&self.queue);
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
