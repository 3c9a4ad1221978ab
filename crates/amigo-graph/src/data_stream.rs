//! Single-writer event log backing one turn's SSE response.
//!
//! Every event gets the next sequence index under the same lock that
//! enqueues it, so index order is transport order no matter how many
//! handles write concurrently. The same state counts artifacts whose
//! `clear` has been written without a matching `finish`.

use std::sync::Arc;

use amigo_types::{DataPart, SequencedEvent, StreamEvent};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("data stream closed by the client")]
pub struct StreamClosed;

struct WriterState {
    next_index: u64,
    open_artifacts: usize,
    tx: mpsc::Sender<SequencedEvent>,
}

impl WriterState {
    fn record(&mut self, event: &StreamEvent) {
        self.next_index += 1;
        match event.as_data() {
            Some(DataPart::Clear(_)) => self.open_artifacts += 1,
            Some(DataPart::Finish) => self.open_artifacts = self.open_artifacts.saturating_sub(1),
            _ => {}
        }
    }
}

#[derive(Clone)]
pub struct DataStreamWriter {
    state: Arc<Mutex<WriterState>>,
}

impl DataStreamWriter {
    /// Writer plus the receiving end that feeds the HTTP response
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SequencedEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let writer = Self {
            state: Arc::new(Mutex::new(WriterState {
                next_index: 0,
                open_artifacts: 0,
                tx,
            })),
        };
        (writer, rx)
    }

    /// Enqueue an event, returning the index it was given
    pub async fn write(&self, event: StreamEvent) -> Result<u64, StreamClosed> {
        let mut state = self.state.lock().await;
        let index = state.next_index;
        let sequenced = SequencedEvent::new(index, event);
        state.tx.send(sequenced.clone()).await.map_err(|_| StreamClosed)?;
        state.record(&sequenced.event);
        Ok(index)
    }

    pub async fn write_data(&self, part: DataPart) -> Result<u64, StreamClosed> {
        self.write(StreamEvent::data(part)).await
    }

    /// Non-blocking write for paths that cannot await, such as `Drop`.
    /// Returns false if the lock is held, the buffer is full or the stream is gone.
    pub fn try_write(&self, event: StreamEvent) -> bool {
        let Ok(mut state) = self.state.try_lock() else {
            return false;
        };
        let index = state.next_index;
        let sequenced = SequencedEvent::new(index, event);
        match state.tx.try_send(sequenced.clone()) {
            Ok(()) => {
                state.record(&sequenced.event);
                true
            }
            Err(_) => false,
        }
    }

    /// Writes `finish` for every artifact still open, waiting for buffer space.
    /// Returns how many were closed.
    pub async fn finish_open_artifacts(&self) -> Result<usize, StreamClosed> {
        let mut state = self.state.lock().await;
        let mut closed = 0;
        while state.open_artifacts > 0 {
            let index = state.next_index;
            let finish = StreamEvent::data(DataPart::Finish);
            state
                .tx
                .send(SequencedEvent::new(index, finish.clone()))
                .await
                .map_err(|_| StreamClosed)?;
            state.record(&finish);
            closed += 1;
        }
        Ok(closed)
    }

    pub async fn open_artifacts(&self) -> usize {
        self.state.lock().await.open_artifacts
    }

    /// Drop-path finish; skipped when nothing is open anymore
    fn try_finish_artifact(&self) -> bool {
        let Ok(mut state) = self.state.try_lock() else {
            return false;
        };
        if state.open_artifacts == 0 {
            return true;
        }
        let index = state.next_index;
        let finish = StreamEvent::data(DataPart::Finish);
        match state.tx.try_send(SequencedEvent::new(index, finish.clone())) {
            Ok(()) => {
                state.record(&finish);
                true
            }
            Err(_) => false,
        }
    }

    /// Number of events written so far
    pub async fn written(&self) -> u64 {
        self.state.lock().await.next_index
    }

    pub fn artifact(&self) -> ArtifactWriter {
        ArtifactWriter {
            writer: self.clone(),
            open: false,
        }
    }
}

/// Brackets one artifact generation between `clear` and `finish`.
///
/// Once `clear` is written, `finish` follows exactly once: explicitly via
/// [`ArtifactWriter::finish`], best-effort when the writer is dropped, or
/// from [`DataStreamWriter::finish_open_artifacts`] when the turn unwinds.
pub struct ArtifactWriter {
    writer: DataStreamWriter,
    open: bool,
}

impl ArtifactWriter {
    pub async fn write_header(&self, id: &str, title: &str, kind: amigo_types::DocumentKind) -> Result<(), StreamClosed> {
        self.writer.write_data(DataPart::Id(id.to_string())).await?;
        self.writer.write_data(DataPart::Title(title.to_string())).await?;
        self.writer.write_data(DataPart::Kind(kind)).await?;
        Ok(())
    }

    pub async fn clear(&mut self, content: impl Into<String>) -> Result<(), StreamClosed> {
        self.writer.write_data(DataPart::Clear(content.into())).await?;
        self.open = true;
        Ok(())
    }

    pub async fn delta(&self, part: DataPart) -> Result<(), StreamClosed> {
        self.writer.write_data(part).await.map(|_| ())
    }

    pub async fn finish(&mut self) -> Result<(), StreamClosed> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.writer.write_data(DataPart::Finish).await.map(|_| ())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for ArtifactWriter {
    fn drop(&mut self) {
        if self.open && !self.writer.try_finish_artifact() {
            tracing::warn!("Artifact dropped without finish; left for the turn to close");
        }
    }
}
