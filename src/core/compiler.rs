/// Script compiler: tokenize, group, expand.

use std::path::Path;
use tracing::debug;

use crate::core::builder::{build_with, Compilation, CompileError};
use crate::core::config::CompileOptions;
use crate::core::tokenizer::Tokenizer;
use crate::schema::scene::ScriptGraph;

/// Compiles script text into a [`ScriptGraph`]. A script either compiles
/// fully or fails with the first structural error.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Load compile options from a RON file.
    pub fn from_options_file(path: &Path) -> Result<Self, CompileError> {
        Ok(Self::new(CompileOptions::load_from_ron(path)?))
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, script: &str) -> Result<Compilation, CompileError> {
        let mut tokenizer = Tokenizer::new(self.options.malformed_lines);
        let tokens = tokenizer.tokenize(script.lines());
        debug!(target: "builder", tokens = tokens.len(), "tokenized script");

        let mut warnings = tokenizer.into_warnings();
        let graph = build_with(tokens, &self.options, &mut warnings)?;
        debug!(target: "builder", scenes = graph.len(), warnings = warnings.len(), "compiled script");
        Ok(Compilation { graph, warnings })
    }

    pub fn compile_file(&self, path: &Path) -> Result<Compilation, CompileError> {
        let script = std::fs::read_to_string(path)?;
        self.compile(&script)
    }
}

/// Compile script text with default options, discarding warnings.
pub fn compile(script: &str) -> Result<ScriptGraph, CompileError> {
    Ok(Compiler::default().compile(script)?.graph)
}
