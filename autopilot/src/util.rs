use anyhow::{anyhow, Context, Result};
use asteroids_core::rng;
use std::fs;
use std::path::Path;

pub fn parse_seed(seed: &str) -> Result<u32> {
    rng::parse_seed(seed).with_context(|| format!("invalid seed: {}", seed.trim()))
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("0x{seed:08x}")
}

pub fn parse_seed_csv(input: &str) -> Result<Vec<u32>> {
    let seeds = input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_seed)
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        return Err(anyhow!("no seeds parsed from --seeds"));
    }
    Ok(seeds)
}

/// One seed per line; blank lines and `#` comments are skipped.
pub fn parse_seed_file(path: &Path) -> Result<Vec<u32>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    let seeds = data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_seed)
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        return Err(anyhow!("seed file {} had no seeds", path.display()));
    }
    Ok(seeds)
}

/// `count` seeds starting at `start`, each the LCG successor of the last.
pub fn seed_sequence(start: u32, count: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(count as usize);
    let mut cur = start;
    for _ in 0..count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_accept_hex_and_decimal() {
        assert_eq!(parse_seed("0x00000010").unwrap(), 16);
        assert_eq!(parse_seed("0XfF").unwrap(), 255);
        assert_eq!(parse_seed("4096").unwrap(), 4096);
        assert!(parse_seed("  ").is_err());
        assert!(parse_seed("0x1_0000_0000").is_err());
        assert_eq!(seed_to_hex(0xBEEF), "0x0000beef");
    }

    #[test]
    fn csv_skips_empty_tokens() {
        assert_eq!(parse_seed_csv("1, 0x2,,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_seed_csv(" , ").is_err());
        assert!(parse_seed_csv("1,two").is_err());
    }

    #[test]
    fn seed_file_ignores_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "# smoke seeds\n0xDEADBEEF\n\n  7  \n").unwrap();
        assert_eq!(parse_seed_file(&path).unwrap(), vec![0xDEAD_BEEF, 7]);

        fs::write(&path, "# nothing here\n").unwrap();
        assert!(parse_seed_file(&path).is_err());
    }

    #[test]
    fn seed_sequence_starts_at_the_given_seed() {
        assert_eq!(seed_sequence(0, 3), vec![0, 1_013_904_223, 1_196_435_762]);
        assert!(seed_sequence(5, 0).is_empty());
    }
}
