//! Scenemark — a markdown-flavored scripting language for branching stories.
//!
//! Scripts are compiled through a small front end (line tokenizer, scene
//! grouping, macro inlining, command-block lowering) into an immutable
//! [`ScriptGraph`], which the [`Player`] walks as a state machine against a
//! mutable [`RuntimeState`].

#[macro_use]
extern crate lazy_static;

pub mod core;
pub mod schema;

pub use crate::core::builder::{build, Compilation, CompileError};
pub use crate::core::compiler::{compile, Compiler};
pub use crate::core::condition::evaluate;
pub use crate::core::config::{CompileOptions, MacroExpansion, MalformedLinePolicy, PlayerConfig};
pub use crate::core::io::{
    ConsoleInput, ConsoleSink, Input, InputSource, OutputSink, ScriptedInput, Transcript,
};
pub use crate::core::player::{run, PlayError, Player, PlayerState};
pub use crate::core::tokenizer::tokenize;
pub use crate::schema::diagnostic::Warning;
pub use crate::schema::event::{Color, Event};
pub use crate::schema::scene::{Scene, ScriptGraph};
pub use crate::schema::token::Token;
pub use crate::schema::value::{RuntimeState, Value};
