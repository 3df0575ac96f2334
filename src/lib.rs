//! Kana Reader: learn Japanese kana and kanji by reading English sentences with
//! Japanese glyphs substituted in, plus per-character quiz questions.
//!
//! The engine modules (`text` to `progress`) are pure and take their randomness as
//! a parameter. `state`, `logic` and `routes` wrap them in a persisted session
//! served over HTTP and WebSocket.

pub mod util;
pub mod domain;
pub mod error;
pub mod text;
pub mod selector;
pub mod parser;
pub mod questions;
pub mod content;
pub mod progress;
pub mod seeds;
pub mod curriculum;
pub mod config;
pub mod persistence;
pub mod pronunciation;
pub mod state;
pub mod protocol;
pub mod logic;
pub mod routes;
pub mod telemetry;
