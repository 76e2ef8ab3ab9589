use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    ModeLivesConsistency,
    LivesRange,
    ShipBounds,
    BulletState,
    AsteroidState,
    ScoreDelta,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeLivesConsistency => write!(f, "MODE_LIVES_CONSISTENCY"),
            Self::LivesRange => write!(f, "LIVES_RANGE"),
            Self::ShipBounds => write!(f, "SHIP_BOUNDS"),
            Self::BulletState => write!(f, "BULLET_STATE"),
            Self::AsteroidState => write!(f, "ASTEROID_STATE"),
            Self::ScoreDelta => write!(f, "SCORE_DELTA"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    UnknownRulesTag { found: u8 },
    InvalidStartingLives { found: u8 },
    InvalidAsteroidSlots { found: u8 },
    FrameCountOutOfRange { frame_count: u32, max_frames: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    ReservedInputBitsNonZero { frame: u32, byte: u8 },
    CrcMismatch { stored: u32, computed: u32 },
    RuleViolation { frame: u32, rule: RuleCode },
    FrameCountMismatch { claimed: u32, computed: u32 },
    ScoreMismatch { claimed: u32, computed: u32 },
    RngMismatch { claimed: u32, computed: u32 },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::UnknownRulesTag { found } => write!(f, "unknown rules tag: {found}"),
            Self::InvalidStartingLives { found } => {
                write!(f, "starting lives out of range: {found}")
            }
            Self::InvalidAsteroidSlots { found } => {
                write!(f, "asteroid slot count out of range: {found}")
            }
            Self::FrameCountOutOfRange {
                frame_count,
                max_frames,
            } => write!(
                f,
                "frame count out of range: {frame_count} (allowed 1..={max_frames})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::ReservedInputBitsNonZero { frame, byte } => write!(
                f,
                "input byte reserved bits set at frame {frame}: 0x{byte:02x}"
            ),
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
            Self::RuleViolation { frame, rule } => {
                write!(f, "rule violation at frame {frame}: {rule}")
            }
            Self::FrameCountMismatch { claimed, computed } => {
                write!(
                    f,
                    "frame-count mismatch: claimed={claimed}, computed={computed}"
                )
            }
            Self::ScoreMismatch { claimed, computed } => {
                write!(f, "score mismatch: claimed={claimed}, computed={computed}")
            }
            Self::RngMismatch { claimed, computed } => {
                write!(
                    f,
                    "rng mismatch: claimed=0x{claimed:08x}, computed=0x{computed:08x}"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {}
