//! Headless bots that play seeded games, write tapes the strict verifier
//! accepts, and benchmark bots across many seeds.

pub mod benchmark;
pub mod bots;
pub mod runner;
pub mod util;
