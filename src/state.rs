use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::StateError;

/// Phase of a recording session.
///
/// - `PreRecording`: the session is being set up; input must not be processed yet.
/// - `Recording`: input is classified into geometry and drawn onto the canvas.
/// - `Calibrating`: screen layout changed; drawing is suspended until it settles.
/// - `Paused`: the user paused tracking; nothing is drawn until resumed.
/// - `Stopped`: the session is over and the canvas is being finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    PreRecording,
    Recording,
    Calibrating,
    Paused,
    Stopped,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreRecording => "pre-recording",
            Self::Recording => "recording",
            Self::Calibrating => "calibrating",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl From<LifecycleState> for u8 {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::PreRecording => 0,
            LifecycleState::Recording => 1,
            LifecycleState::Calibrating => 2,
            LifecycleState::Paused => 3,
            LifecycleState::Stopped => 4,
        }
    }
}

impl TryFrom<u8> for LifecycleState {
    type Error = StateError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::PreRecording),
            1 => Ok(Self::Recording),
            2 => Ok(Self::Calibrating),
            3 => Ok(Self::Paused),
            4 => Ok(Self::Stopped),
            other => Err(StateError::InvalidDiscriminant(other)),
        }
    }
}

/// Shared, thread-visible holder of the current [`LifecycleState`].
///
/// Cloning yields another handle onto the same cell, so the UI, the input
/// producer and the render engine all observe every write. The cell does not
/// validate transitions; callers pick legal ones. A fresh cell starts out
/// `Stopped`, meaning no session is active.
#[derive(Debug, Clone)]
pub struct RecorderState {
    cell: Arc<AtomicU8>,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::new(LifecycleState::Stopped)
    }
}

impl RecorderState {
    pub fn new(initial: LifecycleState) -> Self {
        Self {
            cell: Arc::new(AtomicU8::new(initial.into())),
        }
    }

    pub fn get(&self) -> LifecycleState {
        // Only this type writes the cell, so every stored value decodes
        LifecycleState::try_from(self.cell.load(Ordering::SeqCst)).unwrap_or(LifecycleState::Stopped)
    }

    /// Store a new state, returning the one it replaced
    pub fn set(&self, state: LifecycleState) -> LifecycleState {
        let previous = self.cell.swap(state.into(), Ordering::SeqCst);
        LifecycleState::try_from(previous).unwrap_or(LifecycleState::Stopped)
    }

    /// Store a state that may be missing; a missing state is rejected and the
    /// cell is left untouched
    pub fn set_state(&self, state: Option<LifecycleState>) -> Result<LifecycleState, StateError> {
        let state = state.ok_or(StateError::Unset)?;
        Ok(self.set(state))
    }

    /// Swap `current` for `new` only if the cell still holds `current`
    pub fn transition(&self, current: LifecycleState, new: LifecycleState) -> bool {
        self.cell
            .compare_exchange(current.into(), new.into(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_recording(&self) -> bool {
        self.get() == LifecycleState::Recording
    }

    pub fn is_paused(&self) -> bool {
        self.get() == LifecycleState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.get() == LifecycleState::Stopped
    }

    pub fn is_calibrating(&self) -> bool {
        self.get() == LifecycleState::Calibrating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stopped() {
        let state = RecorderState::default();
        assert!(state.is_stopped());
        assert!(!state.is_recording());
    }

    #[test]
    fn test_predicates_follow_writes() {
        let state = RecorderState::new(LifecycleState::PreRecording);
        assert!(!state.is_recording());

        state.set(LifecycleState::Recording);
        assert!(state.is_recording());

        state.set(LifecycleState::Paused);
        assert!(state.is_paused());

        state.set(LifecycleState::Calibrating);
        assert!(state.is_calibrating());

        state.set(LifecycleState::Stopped);
        assert!(state.is_stopped());
    }

    #[test]
    fn test_set_state_rejects_missing_state() {
        let state = RecorderState::new(LifecycleState::Recording);
        assert_eq!(state.set_state(None), Err(StateError::Unset));
        // The rejected write must not disturb the current state
        assert!(state.is_recording());

        assert_eq!(state.set_state(Some(LifecycleState::Paused)), Ok(LifecycleState::Recording));
        assert!(state.is_paused());
    }

    #[test]
    fn test_clones_share_the_cell() {
        let ui = RecorderState::default();
        let engine = ui.clone();
        ui.set(LifecycleState::Recording);
        assert!(engine.is_recording());
    }

    #[test]
    fn test_transition_only_from_expected_state() {
        let state = RecorderState::new(LifecycleState::Recording);
        assert!(state.transition(LifecycleState::Recording, LifecycleState::Paused));
        assert!(!state.transition(LifecycleState::Recording, LifecycleState::Calibrating));
        assert!(state.is_paused());
    }

    #[test]
    fn test_discriminant_decoding() {
        for state in [
            LifecycleState::PreRecording,
            LifecycleState::Recording,
            LifecycleState::Calibrating,
            LifecycleState::Paused,
            LifecycleState::Stopped,
        ] {
            assert_eq!(LifecycleState::try_from(u8::from(state)), Ok(state));
        }
        assert_eq!(LifecycleState::try_from(9), Err(StateError::InvalidDiscriminant(9)));
    }

    #[test]
    fn test_visible_across_threads() {
        let state = RecorderState::new(LifecycleState::Recording);
        let worker = state.clone();
        let handle = std::thread::spawn(move || {
            while !worker.is_stopped() {
                std::thread::yield_now();
            }
            worker.get()
        });
        state.set(LifecycleState::Stopped);
        assert_eq!(handle.join().unwrap(), LifecycleState::Stopped);
    }
}
