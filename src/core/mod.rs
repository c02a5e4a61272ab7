//! Core translation engine module

pub mod client;
pub mod config;
pub mod counter;
pub mod errors;
pub mod glossary;
pub mod prompt;
pub mod retry;
pub mod segmenter;

#[cfg(test)]
pub(crate) mod testing;
