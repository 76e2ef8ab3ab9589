#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod error;
pub mod render;
pub mod rng;
pub mod rules;
pub mod sim;
pub mod tape;
pub mod verify;

pub use error::{RuleCode, VerifyError};
pub use rules::{Layout, Rules};
pub use sim::{GameMode, LiveGame, MenuKind, Phase, StepEvents, WorldSnapshot};
pub use tape::FrameInput;
pub use verify::{verify_tape, VerificationJournal};
