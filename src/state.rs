//! Cryptographic state of an envelope.
//!
//! The payload state and the presence of an error are independent, so a state
//! is a pair of the two rather than a single flag word.

use std::fmt;

/// Where the payload is in the encrypt/seal pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PayloadState {
    /// Nothing is known about the payload.
    #[default]
    None,
    /// Decrypted and available as a [`crate::api::Payload`].
    Clear,
    /// Encrypted, with the key and secret in the clear.
    Unsealed,
    /// Encrypted, with the key and secret wrapped for a recipient.
    Sealed,
    /// The message is structurally invalid and cannot move to another state.
    Corrupted,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct State {
    pub payload: PayloadState,
    pub has_error: bool,
}

impl State {
    pub const UNKNOWN: State = State::new(PayloadState::None, false);
    /// No payload, only a rejection.
    pub const ERROR: State = State::new(PayloadState::None, true);
    pub const CLEAR: State = State::new(PayloadState::Clear, false);
    pub const CLEAR_ERROR: State = State::new(PayloadState::Clear, true);
    pub const UNSEALED: State = State::new(PayloadState::Unsealed, false);
    pub const UNSEALED_ERROR: State = State::new(PayloadState::Unsealed, true);
    pub const SEALED: State = State::new(PayloadState::Sealed, false);
    pub const SEALED_ERROR: State = State::new(PayloadState::Sealed, true);
    pub const CORRUPTED: State = State::new(PayloadState::Corrupted, false);

    pub const fn new(payload: PayloadState, has_error: bool) -> Self {
        Self { payload, has_error }
    }

    /// The same payload state with the error flag set.
    pub const fn with_error(self) -> Self {
        match self.payload {
            PayloadState::Corrupted => self,
            payload => Self::new(payload, true),
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.payload == PayloadState::Corrupted
    }

    pub fn name(&self) -> &'static str {
        match (self.payload, self.has_error) {
            (PayloadState::None, false) => "unknown",
            (PayloadState::None, true) => "error",
            (PayloadState::Clear, false) => "clear",
            (PayloadState::Clear, true) => "clear-error",
            (PayloadState::Unsealed, false) => "unsealed",
            (PayloadState::Unsealed, true) => "unsealed-error",
            (PayloadState::Sealed, false) => "sealed",
            (PayloadState::Sealed, true) => "sealed-error",
            (PayloadState::Corrupted, _) => "corrupted",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({})", self.name())
    }
}
