/// Compilation and playback stages, leaf-first.
pub mod builder;
pub mod commands;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod io;
pub mod player;
pub mod tokenizer;
