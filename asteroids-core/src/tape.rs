use alloc::{vec, vec::Vec};
use serde::{Deserialize, Serialize};

use crate::constants::{
    INPUT_CONFIRM, INPUT_FIRE, INPUT_LEFT, INPUT_PAUSE, INPUT_RESERVED_MASK, INPUT_RESTART,
    INPUT_RIGHT, TAPE_FOOTER_SIZE, TAPE_HEADER_SIZE, TAPE_MAGIC, TAPE_VERSION,
};
use crate::error::VerifyError;
use crate::rules::{Layout, Rules};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeHeader {
    pub magic: u32,
    pub version: u8,
    pub rules_tag: u8,
    pub starting_lives: u8,
    pub asteroid_slots: u8,
    pub seed: u32,
    pub frame_count: u32,
}

impl TapeHeader {
    /// Rebuilds the rules the tape was recorded under.
    pub fn rules(&self) -> Result<Rules, VerifyError> {
        let layout = Layout::from_tag(self.rules_tag).ok_or(VerifyError::UnknownRulesTag {
            found: self.rules_tag,
        })?;
        Rules::customized(layout, self.starting_lives, self.asteroid_slots)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeFooter {
    pub final_score: u32,
    pub final_rng_state: u32,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeView<'a> {
    pub header: TapeHeader,
    pub inputs: &'a [u8],
    pub footer: TapeFooter,
}

/// Keys held during one frame. One byte per frame on the tape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub pause: bool,
    pub restart: bool,
    pub confirm: bool,
}

impl FrameInput {
    pub const NONE: Self = Self {
        left: false,
        right: false,
        fire: false,
        pause: false,
        restart: false,
        confirm: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

#[inline]
pub fn encode_input_byte(input: FrameInput) -> u8 {
    (if input.left { INPUT_LEFT } else { 0 })
        | (if input.right { INPUT_RIGHT } else { 0 })
        | (if input.fire { INPUT_FIRE } else { 0 })
        | (if input.pause { INPUT_PAUSE } else { 0 })
        | (if input.restart { INPUT_RESTART } else { 0 })
        | (if input.confirm { INPUT_CONFIRM } else { 0 })
}

#[inline]
pub fn decode_input_byte(byte: u8) -> FrameInput {
    FrameInput {
        left: (byte & INPUT_LEFT) != 0,
        right: (byte & INPUT_RIGHT) != 0,
        fire: (byte & INPUT_FIRE) != 0,
        pause: (byte & INPUT_PAUSE) != 0,
        restart: (byte & INPUT_RESTART) != 0,
        confirm: (byte & INPUT_CONFIRM) != 0,
    }
}

pub fn parse_tape(bytes: &[u8], max_frames: u32) -> Result<TapeView<'_>, VerifyError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(VerifyError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(VerifyError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(VerifyError::UnsupportedVersion { found: version });
    }

    let header = TapeHeader {
        magic,
        version,
        rules_tag: bytes[5],
        starting_lives: bytes[6],
        asteroid_slots: bytes[7],
        seed: read_u32_le(bytes, 8),
        frame_count: read_u32_le(bytes, 12),
    };
    header.rules()?;

    let frame_count = header.frame_count;
    if frame_count == 0 || frame_count > max_frames {
        return Err(VerifyError::FrameCountOutOfRange {
            frame_count,
            max_frames,
        });
    }

    let expected_len = TAPE_HEADER_SIZE + frame_count as usize + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(VerifyError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let inputs_start = TAPE_HEADER_SIZE;
    let inputs_end = inputs_start + frame_count as usize;
    let inputs = &bytes[inputs_start..inputs_end];

    let final_score = read_u32_le(bytes, inputs_end);
    let final_rng_state = read_u32_le(bytes, inputs_end + 4);
    let checksum = read_u32_le(bytes, inputs_end + 8);

    let computed = crc32_and_validate_inputs(bytes, inputs_start, inputs_end)?;
    if checksum != computed {
        return Err(VerifyError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(TapeView {
        header,
        inputs,
        footer: TapeFooter {
            final_score,
            final_rng_state,
            checksum,
        },
    })
}

pub fn serialize_tape(
    rules: &Rules,
    seed: u32,
    inputs: &[u8],
    final_score: u32,
    final_rng_state: u32,
) -> Vec<u8> {
    let total_len = TAPE_HEADER_SIZE + inputs.len() + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = TAPE_VERSION;
    data[5] = rules.tag();
    data[6] = rules.starting_lives;
    data[7] = rules.asteroid_slots as u8;
    write_u32_le(&mut data, 8, seed);
    write_u32_le(&mut data, 12, inputs.len() as u32);

    let body_start = TAPE_HEADER_SIZE;
    let body_end = body_start + inputs.len();
    data[body_start..body_end].copy_from_slice(inputs);

    write_u32_le(&mut data, body_end, final_score);
    write_u32_le(&mut data, body_end + 4, final_rng_state);

    let checksum = crc32(&data[..body_end]);
    write_u32_le(&mut data, body_end + 8, checksum);

    data
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;

        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }

        table[i] = c;
        i += 1;
    }

    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;

    for byte in data {
        let idx = ((crc ^ (*byte as u32)) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    crc ^ 0xFFFF_FFFFu32
}

fn crc32_and_validate_inputs(
    bytes: &[u8],
    inputs_start: usize,
    inputs_end: usize,
) -> Result<u32, VerifyError> {
    let mut crc = 0xFFFF_FFFFu32;

    for (i, &byte) in bytes[..inputs_end].iter().enumerate() {
        if i >= inputs_start && (byte & INPUT_RESERVED_MASK) != 0 {
            return Err(VerifyError::ReservedInputBitsNonZero {
                frame: (i - inputs_start) as u32,
                byte,
            });
        }

        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    Ok(crc ^ 0xFFFF_FFFFu32)
}
