//! Fixed numbers shared by the rules presets, the tape codec and the renderers.

// Tape layout
pub const TAPE_MAGIC: u32 = 0x4B43_4F52; // "ROCK"
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 16;
pub const TAPE_FOOTER_SIZE: usize = 12;
pub const MAX_FRAMES_DEFAULT: u32 = 100_000;

// Input byte bits
pub const INPUT_LEFT: u8 = 0x01;
pub const INPUT_RIGHT: u8 = 0x02;
pub const INPUT_FIRE: u8 = 0x04;
pub const INPUT_PAUSE: u8 = 0x08;
pub const INPUT_RESTART: u8 = 0x10;
pub const INPUT_CONFIRM: u8 = 0x20;
pub const INPUT_RESERVED_MASK: u8 = 0xC0;

// Rules tags stored in the tape header
pub const RULES_TAG_CONSOLE: u8 = 1;
pub const RULES_TAG_PIXEL: u8 = 2;

// Limits on rules overrides
pub const ASTEROID_SLOTS_MAX: usize = 8;
pub const ASTEROID_SLOTS_DEFAULT: usize = 3;
pub const STARTING_LIVES_DEFAULT: u8 = 3;
pub const STARTING_LIVES_MAX: u8 = 9;

// The HUD prints the score with three digits, so it wraps at 1000.
pub const SCORE_DIGITS: usize = 3;
pub const SCORE_DISPLAY_MODULUS: u32 = 1_000;

// Console (text grid) layout
pub const CONSOLE_WIDTH: i32 = 80;
pub const CONSOLE_HEIGHT: i32 = 25;
pub const CONSOLE_FRAME_MS: u64 = 35;
pub const CONSOLE_SHIP_WIDTH: i32 = 5;

// Pixel layout
pub const PIXEL_WIDTH: i32 = 1024;
pub const PIXEL_HEIGHT: i32 = 768;
pub const PIXEL_FRAME_MS: u64 = 50;
pub const PIXEL_SHIP_WIDTH: i32 = 71;
pub const PIXEL_SHIP_HEIGHT: i32 = 30;
pub const PIXEL_BULLET_HEIGHT: i32 = 10;
pub const PIXEL_GROUND_MARGIN: i32 = 55;
