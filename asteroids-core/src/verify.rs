use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::rules::{Layout, Rules};
use crate::sim::{replay_strict, ReplayResult, ReplayViolation};
use crate::tape::parse_tape;

/// Summary of a tape that replayed cleanly under strict rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationJournal {
    pub seed: u32,
    pub layout: Layout,
    pub starting_lives: u8,
    pub asteroid_slots: u8,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_rng_state: u32,
    pub tape_checksum: u32,
}

pub fn verify_tape(bytes: &[u8], max_frames: u32) -> Result<VerificationJournal, VerifyError> {
    verify_tape_with_replay(bytes, max_frames, |seed, rules, inputs| {
        replay_strict(seed, rules, inputs)
    })
}

fn verify_tape_with_replay<F>(
    bytes: &[u8],
    max_frames: u32,
    replay_fn: F,
) -> Result<VerificationJournal, VerifyError>
where
    F: FnOnce(u32, &Rules, &[u8]) -> Result<ReplayResult, ReplayViolation>,
{
    let tape = parse_tape(bytes, max_frames)?;
    let rules = tape.header.rules()?;
    let replay_result = replay_fn(tape.header.seed, &rules, tape.inputs).map_err(|err| {
        VerifyError::RuleViolation {
            frame: err.frame_count,
            rule: err.rule,
        }
    })?;

    if replay_result.frame_count != tape.header.frame_count {
        return Err(VerifyError::FrameCountMismatch {
            claimed: tape.header.frame_count,
            computed: replay_result.frame_count,
        });
    }

    if replay_result.final_score != tape.footer.final_score {
        return Err(VerifyError::ScoreMismatch {
            claimed: tape.footer.final_score,
            computed: replay_result.final_score,
        });
    }

    if replay_result.final_rng_state != tape.footer.final_rng_state {
        return Err(VerifyError::RngMismatch {
            claimed: tape.footer.final_rng_state,
            computed: replay_result.final_rng_state,
        });
    }

    Ok(VerificationJournal {
        seed: tape.header.seed,
        layout: rules.layout,
        starting_lives: tape.header.starting_lives,
        asteroid_slots: tape.header.asteroid_slots,
        frame_count: tape.header.frame_count,
        final_score: replay_result.final_score,
        final_rng_state: replay_result.final_rng_state,
        tape_checksum: tape.footer.checksum,
    })
}
