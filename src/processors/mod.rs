//! Document processors built on the core translation engine

pub mod markdown;
