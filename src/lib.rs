//! Oddball Library
//!
//! Generates "Odd One Out" puzzles with Gemini models and persists them as a
//! JSON batch for a front-end to consume.

pub mod config;
pub mod generator;
pub mod models;
pub mod output;
pub mod puzzles;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;
