/// The runtime engine: walks a compiled scene graph as a state machine.
///
/// Suspension happens only at dialogue/narration (one acknowledgement) and
/// at choice prompts (one selection attempt per step), both through the
/// injected [`InputSource`].

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::condition::evaluate;
use crate::core::config::PlayerConfig;
use crate::core::io::{InputSource, OutputSink};
use crate::schema::diagnostic::Warning;
use crate::schema::event::Event;
use crate::schema::scene::ScriptGraph;
use crate::schema::token::Assignment;
use crate::schema::value::{RuntimeState, Value};

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("scene '{target}' does not exist")]
    UnresolvedTarget {
        /// The scene holding the jump or choice; `None` for the start scene.
        from: Option<String>,
        target: String,
    },
    #[error("input closed while waiting")]
    InputClosed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One option of a pending choice prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub text: String,
    pub target: String,
    pub set: Option<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerState {
    Running {
        scene: String,
        cursor: usize,
    },
    AwaitingChoice {
        scene: String,
        cursor: usize,
        options: Vec<ChoiceOption>,
    },
    Halted,
}

/// A single playthrough over a borrowed, read-only graph.
pub struct Player<'g> {
    graph: &'g ScriptGraph,
    state: PlayerState,
    variables: RuntimeState,
    warnings: Vec<Warning>,
}

/// Builder for constructing a [`Player`].
pub struct PlayerBuilder<'g> {
    graph: &'g ScriptGraph,
    config: PlayerConfig,
}

impl<'g> PlayerBuilder<'g> {
    pub fn start(mut self, scene: impl Into<String>) -> Self {
        self.config.start_scene = scene.into();
        self
    }

    pub fn state(mut self, state: RuntimeState) -> Self {
        self.config.initial_state = state;
        self
    }

    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails if the start scene is not in the graph.
    pub fn build(self) -> Result<Player<'g>, PlayError> {
        let state = enter(self.graph, None, &self.config.start_scene)?;
        Ok(Player {
            graph: self.graph,
            state,
            variables: self.config.initial_state,
            warnings: Vec::new(),
        })
    }
}

fn enter(graph: &ScriptGraph, from: Option<&str>, target: &str) -> Result<PlayerState, PlayError> {
    if !graph.contains(target) {
        return Err(PlayError::UnresolvedTarget {
            from: from.map(str::to_string),
            target: target.to_string(),
        });
    }
    debug!(target: "player", from = ?from, scene = target, "entering scene");
    Ok(PlayerState::Running {
        scene: target.to_string(),
        cursor: 0,
    })
}

/// Parse a 1-based selection. Only plain digits in range are accepted.
fn parse_selection(input: &str, count: usize) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: usize = input.parse().ok()?;
    (1..=count).contains(&index).then(|| index - 1)
}

impl<'g> Player<'g> {
    pub fn builder(graph: &'g ScriptGraph) -> PlayerBuilder<'g> {
        PlayerBuilder {
            graph,
            config: PlayerConfig::default(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn variables(&self) -> &RuntimeState {
        &self.variables
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_halted(&self) -> bool {
        self.state == PlayerState::Halted
    }

    fn assign(&mut self, assignment: &Assignment) {
        let value = Value::parse(&assignment.value);
        debug!(target: "player", var = %assignment.var, %value, "assign");
        self.variables.set(assignment.var.clone(), value);
    }

    /// Advance by one transition. Returns `false` once halted.
    pub fn step(
        &mut self,
        input: &mut dyn InputSource,
        sink: &mut dyn OutputSink,
    ) -> Result<bool, PlayError> {
        let current = std::mem::replace(&mut self.state, PlayerState::Halted);
        self.state = match current {
            PlayerState::Halted => return Ok(false),
            PlayerState::Running { scene, cursor } => self.run_event(scene, cursor, input, sink)?,
            PlayerState::AwaitingChoice {
                scene,
                cursor,
                options,
            } => self.await_choice(scene, cursor, options, input, sink)?,
        };
        Ok(!self.is_halted())
    }

    fn run_event(
        &mut self,
        scene: String,
        cursor: usize,
        input: &mut dyn InputSource,
        sink: &mut dyn OutputSink,
    ) -> Result<PlayerState, PlayError> {
        let graph = self.graph;
        let events = graph.get(&scene).map(|s| s.events.as_slice()).unwrap_or(&[]);
        let Some(event) = events.get(cursor) else {
            debug!(target: "player", scene = %scene, "end of scene, halting");
            return Ok(PlayerState::Halted);
        };
        let next = PlayerState::Running {
            scene: scene.clone(),
            cursor: cursor + 1,
        };

        match event {
            Event::Dialogue { .. } | Event::Narration { .. } => {
                sink.say(&event.to_string());
                input.acknowledge()?;
                Ok(next)
            }
            Event::Set(assignment) => {
                self.assign(assignment);
                Ok(next)
            }
            Event::Jump { target, condition } => {
                let taken = condition
                    .as_deref()
                    .map_or(true, |c| evaluate(c, &self.variables));
                debug!(target: "player", scene = %scene, jump = %target, taken, "jump");
                if taken {
                    enter(graph, Some(scene.as_str()), target)
                } else {
                    Ok(next)
                }
            }
            Event::Choice { .. } => {
                let options: Vec<ChoiceOption> = events[cursor..]
                    .iter()
                    .map_while(|e| match e {
                        Event::Choice { text, target, set } => Some(ChoiceOption {
                            text: text.clone(),
                            target: target.clone(),
                            set: set.clone(),
                        }),
                        _ => None,
                    })
                    .collect();
                let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
                sink.prompt(&texts);
                Ok(PlayerState::AwaitingChoice {
                    scene,
                    cursor,
                    options,
                })
            }
            Event::CharShow { .. }
            | Event::CharHide { .. }
            | Event::CharMove { .. }
            | Event::CharExpr { .. }
            | Event::FadeOut { .. }
            | Event::FadeIn { .. }
            | Event::CodeBlock { .. } => {
                sink.present(event);
                Ok(next)
            }
            Event::Macro { .. } => {
                warn!(target: "player", scene = %scene, kind = event.kind(), "unrecognized event skipped");
                self.warnings.push(Warning::UnrecognizedEvent {
                    scene,
                    kind: event.kind().to_string(),
                });
                Ok(next)
            }
        }
    }

    fn await_choice(
        &mut self,
        scene: String,
        cursor: usize,
        options: Vec<ChoiceOption>,
        input: &mut dyn InputSource,
        sink: &mut dyn OutputSink,
    ) -> Result<PlayerState, PlayError> {
        let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
        let selection = input.select(&texts)?;

        match parse_selection(&selection, options.len()) {
            Some(index) => {
                let chosen = &options[index];
                debug!(target: "player", scene = %scene, choice = %chosen.text, "selected");
                if let Some(assignment) = &chosen.set {
                    self.assign(assignment);
                }
                enter(self.graph, Some(scene.as_str()), &chosen.target)
            }
            None => {
                warn!(target: "player", input = %selection, "invalid selection");
                sink.reject(&selection);
                self.warnings.push(Warning::InvalidSelection { input: selection });
                Ok(PlayerState::AwaitingChoice {
                    scene,
                    cursor,
                    options,
                })
            }
        }
    }

    /// Step until halted and return the final variables.
    pub fn run(
        &mut self,
        input: &mut dyn InputSource,
        sink: &mut dyn OutputSink,
    ) -> Result<RuntimeState, PlayError> {
        while self.step(input, sink)? {}
        Ok(self.variables.clone())
    }
}

/// Play `graph` from `start` with the given variables until it halts, and
/// return the final variables.
pub fn run(
    graph: &ScriptGraph,
    start: &str,
    state: RuntimeState,
    input: &mut dyn InputSource,
    sink: &mut dyn OutputSink,
) -> Result<RuntimeState, PlayError> {
    Player::builder(graph)
        .start(start)
        .state(state)
        .build()?
        .run(input, sink)
}
