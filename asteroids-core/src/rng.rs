use core::num::ParseIntError;

/// Linear congruential generator with the classic `rand()` constants.
///
/// Only spawn columns draw from it, so replaying the same seed and inputs
/// always reproduces the same field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

const LCG_MULTIPLIER: u32 = 1_103_515_245;
const LCG_INCREMENT: u32 = 12_345;

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Upper bits only; the low bits of an LCG cycle with short periods.
    pub fn next_int(&mut self, max: u32) -> u32 {
        (self.next() / 65_536) % max
    }

    pub fn next_range(&mut self, min: i32, max_exclusive: i32) -> i32 {
        debug_assert!(max_exclusive > min);
        let span = (max_exclusive - min) as u32;
        min + self.next_int(span) as i32
    }
}

/// Parses a seed written in decimal or as `0x`-prefixed hex.
pub fn parse_seed(text: &str) -> Result<u32, ParseIntError> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_parse_as_hex_or_decimal() {
        assert_eq!(parse_seed("0xDEADBEEF"), Ok(0xDEAD_BEEF));
        assert_eq!(parse_seed("0XfF"), Ok(255));
        assert_eq!(parse_seed(" 42 "), Ok(42));
        assert!(parse_seed("").is_err());
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0xZZ").is_err());
        assert!(parse_seed("-1").is_err());
        assert!(parse_seed("0x1_0000_0000").is_err());
    }

    #[test]
    fn first_step_from_zero_is_the_increment() {
        let mut rng = SeededRng::new(0);
        assert_eq!(rng.next(), 12_345);
        assert_eq!(rng.state(), 12_345);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::new(0xDEAD_BEEF);
        let mut b = SeededRng::new(0xDEAD_BEEF);
        for _ in 0..64 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn next_range_stays_in_bounds() {
        let mut rng = SeededRng::new(42);
        for _ in 0..10_000 {
            let value = rng.next_range(1, 71);
            assert!((1..71).contains(&value), "value {value} out of range");
        }
    }

    #[test]
    fn next_range_covers_small_span() {
        let mut rng = SeededRng::new(7);
        let mut seen = [false; 4];
        for _ in 0..1_000 {
            seen[(rng.next_range(10, 14) - 10) as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }
}
