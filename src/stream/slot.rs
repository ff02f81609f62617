use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct SlotState<T> {
    pending: Option<T>,
    /// Bumped on every offer; identifies the newest frame.
    generation: u64,
    dropped: u64,
    closed: bool,
}

/// Single-element "latest wins" hand-off between a frame producer and an
/// analysis consumer. Offering a frame while one is pending drops the older
/// one, so the consumer never works through a backlog.
#[derive(Debug)]
pub struct FrameSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                pending: None,
                generation: 0,
                dropped: 0,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Store `frame`, replacing any pending one. Returns its generation, or
    /// `None` if the slot has been closed.
    pub fn offer(&self, frame: T) -> Option<u64> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return None;
        }
        if state.pending.replace(frame).is_some() {
            state.dropped += 1;
            tracing::trace!("Dropped stale frame (generation {})", state.generation);
        }
        state.generation += 1;
        let generation = state.generation;
        drop(state);

        self.ready.notify_one();
        Some(generation)
    }

    /// Take the pending frame, if any, without waiting.
    pub fn take(&self) -> Option<(u64, T)> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = state.generation;
        state.pending.take().map(|frame| (generation, frame))
    }

    /// Wait up to `timeout` for a frame. Returns `None` on timeout or once
    /// the slot is closed and empty.
    pub fn wait_take(&self, timeout: Duration) -> Option<(u64, T)> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |s| s.pending.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        let generation = state.generation;
        state.pending.take().map(|frame| (generation, frame))
    }

    /// Generation of the newest frame ever offered.
    pub fn latest_generation(&self) -> u64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).generation
    }

    /// Whether a frame newer than `generation` has been offered.
    pub fn is_superseded(&self, generation: u64) -> bool {
        self.latest_generation() > generation
    }

    pub fn dropped(&self) -> u64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).dropped
    }

    /// Stop accepting frames and wake any waiting consumer.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.closed = true;
        drop(state);
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).closed
    }
}
