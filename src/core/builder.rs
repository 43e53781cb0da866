/// Scene graph builder — groups tokens into scenes, then inlines macros and
/// lowers fenced command blocks.

use thiserror::Error;
use tracing::debug;

use crate::core::commands;
use crate::core::config::{CompileOptions, ConfigError, MacroExpansion};
use crate::schema::diagnostic::Warning;
use crate::schema::event::Event;
use crate::schema::scene::{Scene, ScriptGraph};
use crate::schema::token::Token;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("line {line}: {kind} event appears before any scene header")]
    OutOfScope { line: usize, kind: &'static str },
    #[error("scene '{scene}' references macro '{name}', which is not a scene")]
    UnresolvedMacro { scene: String, name: String },
    #[error("macro cycle: {}", .chain.join(" -> "))]
    MacroCycle { chain: Vec<String> },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("options error: {0}")]
    Config(#[from] ConfigError),
}

/// A compiled graph together with the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub graph: ScriptGraph,
    pub warnings: Vec<Warning>,
}

/// Pass 1: group tokens into scenes.
///
/// A scene header always starts a fresh scene, replacing any earlier scene
/// of the same name.
pub fn group(tokens: Vec<(usize, Token)>) -> Result<ScriptGraph, CompileError> {
    let mut graph = ScriptGraph::new();
    let mut current: Option<String> = None;

    for (line, token) in tokens {
        if let Token::Scene { name } = token {
            debug!(target: "builder", scene = %name, "scene started");
            graph.insert(Scene::new(name.clone()));
            current = Some(name);
            continue;
        }

        let Some(event) = token.into_event() else {
            continue;
        };
        let scene = current.as_deref().and_then(|name| graph.get_mut(name));
        match scene {
            Some(scene) => scene.events.push(event),
            None => {
                return Err(CompileError::OutOfScope {
                    line,
                    kind: event.kind(),
                })
            }
        }
    }

    Ok(graph)
}

/// Pass 2: expand every scene of a grouped graph.
pub fn expand(
    raw: &ScriptGraph,
    mode: MacroExpansion,
    warnings: &mut Vec<Warning>,
) -> Result<ScriptGraph, CompileError> {
    let mut graph = ScriptGraph::new();
    for scene in raw.scenes() {
        let mut expander = Expander {
            raw,
            mode,
            warnings: &mut *warnings,
            stack: vec![scene.name.clone()],
        };
        let events = expander.expand_events(&scene.name, &scene.events)?;
        graph.insert(Scene {
            name: scene.name.clone(),
            events,
        });
    }
    Ok(graph)
}

struct Expander<'a> {
    raw: &'a ScriptGraph,
    mode: MacroExpansion,
    warnings: &'a mut Vec<Warning>,
    /// Scenes currently being inlined, outermost first.
    stack: Vec<String>,
}

impl Expander<'_> {
    fn expand_events(&mut self, scene: &str, events: &[Event]) -> Result<Vec<Event>, CompileError> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            match event {
                Event::Macro { name } => {
                    let raw = self.raw;
                    let target = raw.get(name).ok_or_else(|| CompileError::UnresolvedMacro {
                        scene: scene.to_string(),
                        name: name.clone(),
                    })?;
                    debug!(target: "builder", scene, macro_name = %name, events = target.events.len(), "inlining macro");
                    match self.mode {
                        MacroExpansion::Shallow => out.extend(target.events.iter().cloned()),
                        MacroExpansion::Transitive => {
                            if self.stack.iter().any(|s| s == name) {
                                let mut chain = self.stack.clone();
                                chain.push(name.clone());
                                return Err(CompileError::MacroCycle { chain });
                            }
                            self.stack.push(name.clone());
                            let inlined = self.expand_events(name, &target.events)?;
                            self.stack.pop();
                            out.extend(inlined);
                        }
                    }
                }
                Event::CodeBlock { lang, lines } => {
                    // Inlined blocks are warned about once, from their own scene.
                    let mut inlined = Vec::new();
                    let warnings = if self.stack.len() == 1 {
                        &mut *self.warnings
                    } else {
                        &mut inlined
                    };
                    match commands::lower(lang, lines, warnings) {
                        Some(lowered) => out.extend(lowered),
                        None => out.push(event.clone()),
                    }
                }
                other => out.push(other.clone()),
            }
        }
        Ok(out)
    }
}

/// Build a graph from tokens with the given options, collecting warnings.
pub fn build_with(
    tokens: Vec<(usize, Token)>,
    options: &CompileOptions,
    warnings: &mut Vec<Warning>,
) -> Result<ScriptGraph, CompileError> {
    let raw = group(tokens)?;
    expand(&raw, options.macro_expansion, warnings)
}

/// Build a graph from tokens with default options.
pub fn build(tokens: Vec<(usize, Token)>) -> Result<ScriptGraph, CompileError> {
    let mut warnings = Vec::new();
    build_with(tokens, &CompileOptions::default(), &mut warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::tokenize;

    fn graph_of(script: &str) -> ScriptGraph {
        build(tokenize(script.lines())).unwrap()
    }

    fn narration(text: &str) -> Event {
        Event::Narration {
            text: text.to_string(),
        }
    }

    #[test]
    fn groups_events_under_scenes() {
        let graph = graph_of("## Start\nHello.\n**Ava**: Hi\n## End\nBye.");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get("Start").unwrap().events.len(), 2);
        assert_eq!(graph.get("End").unwrap().events, vec![narration("Bye.")]);
    }

    #[test]
    fn event_before_scene_is_out_of_scope() {
        let err = build(tokenize("\n\nHello.\n## Start".lines())).unwrap_err();
        assert!(matches!(err, CompileError::OutOfScope { line: 3, kind: "narration" }));
        assert_eq!(
            err.to_string(),
            "line 3: narration event appears before any scene header"
        );
    }

    #[test]
    fn empty_script_is_empty_graph() {
        assert!(graph_of("").is_empty());
    }

    #[test]
    fn duplicate_scene_last_writer_wins() {
        let graph = graph_of("## A\nfirst\n## A\nsecond");
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("A").unwrap().events, vec![narration("second")]);
    }

    #[test]
    fn macro_inlines_raw_events() {
        let graph = graph_of("## A\nbefore\n![[B]]\nafter\n## B\nfrom b");
        assert_eq!(
            graph.get("A").unwrap().events,
            vec![narration("before"), narration("from b"), narration("after")]
        );
    }

    #[test]
    fn unresolved_macro_fails() {
        let err = build(tokenize("## A\n![[Missing]]".lines())).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedMacro { ref scene, ref name } if scene == "A" && name == "Missing"));
    }

    #[test]
    fn code_blocks_are_lowered() {
        let graph = graph_of("## A\n```char\nhide ava\n```\nafter");
        assert_eq!(
            graph.get("A").unwrap().events,
            vec![
                Event::CharHide {
                    id: "ava".to_string()
                },
                narration("after")
            ]
        );
    }

    #[test]
    fn unknown_command_warnings_are_collected() {
        let mut warnings = Vec::new();
        let tokens = tokenize("## A\n```transition\nwipe_left\n```".lines());
        let graph = build_with(tokens, &CompileOptions::default(), &mut warnings).unwrap();
        assert!(graph.get("A").unwrap().events.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn shallow_expansion_keeps_spliced_code_blocks_raw() {
        let graph = graph_of("## A\n![[B]]\n## B\n```char\nhide ava\n```");
        assert_eq!(
            graph.get("A").unwrap().events,
            vec![Event::CodeBlock {
                lang: "char".to_string(),
                lines: vec!["hide ava".to_string()],
            }]
        );
        // B itself is lowered normally.
        assert_eq!(
            graph.get("B").unwrap().events,
            vec![Event::CharHide {
                id: "ava".to_string()
            }]
        );
    }

    #[test]
    fn transitive_expansion_resolves_nested_macros() {
        let options = CompileOptions {
            macro_expansion: MacroExpansion::Transitive,
            ..CompileOptions::default()
        };
        let mut warnings = Vec::new();
        let tokens = tokenize("## A\n![[B]]\n## B\n![[C]]\n```char\nhide ava\n```\n## C\nfrom c".lines());
        let graph = build_with(tokens, &options, &mut warnings).unwrap();
        assert_eq!(
            graph.get("A").unwrap().events,
            vec![
                narration("from c"),
                Event::CharHide {
                    id: "ava".to_string()
                }
            ]
        );
    }

    #[test]
    fn transitive_expansion_detects_cycles() {
        let options = CompileOptions {
            macro_expansion: MacroExpansion::Transitive,
            ..CompileOptions::default()
        };
        let mut warnings = Vec::new();
        let tokens = tokenize("## A\n![[B]]\n## B\n![[A]]".lines());
        let err = build_with(tokens, &options, &mut warnings).unwrap_err();
        match err {
            CompileError::MacroCycle { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn shallow_expansion_tolerates_cycles() {
        let graph = graph_of("## A\n![[B]]\n## B\n![[A]]");
        assert_eq!(
            graph.get("A").unwrap().events,
            vec![Event::Macro {
                name: "A".to_string()
            }]
        );
    }

    #[test]
    fn transitive_expansion_warns_once_per_block() {
        let options = CompileOptions {
            macro_expansion: MacroExpansion::Transitive,
            ..CompileOptions::default()
        };
        let mut warnings = Vec::new();
        let tokens = tokenize("## A\n![[B]]\n## C\n![[B]]\n## B\n```char\ndance ava\n```".lines());
        build_with(tokens, &options, &mut warnings).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::UnknownCommand {
                lang: "char".to_string(),
                line: "dance ava".to_string(),
            }]
        );
    }
}
