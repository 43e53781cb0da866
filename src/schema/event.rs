use serde::{Deserialize, Serialize};
use std::fmt;

use super::token::Assignment;

/// An RGBA color used by screen transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// A fully lowered instruction consumed by the player.
///
/// Story events map one-to-one onto the tokens they came from. Code blocks
/// in a known sub-language are replaced by presentation events during
/// expansion; blocks in any other language stay as opaque `CodeBlock`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Dialogue {
        speaker: String,
        text: String,
    },
    Narration {
        text: String,
    },
    Choice {
        text: String,
        target: String,
        set: Option<Assignment>,
    },
    Jump {
        target: String,
        condition: Option<String>,
    },
    Set(Assignment),
    Macro {
        name: String,
    },
    CodeBlock {
        lang: String,
        lines: Vec<String>,
    },
    CharShow {
        id: String,
        image: String,
        x: f64,
        y: f64,
        scale: f64,
    },
    CharHide {
        id: String,
    },
    CharMove {
        id: String,
        x: f64,
        y: f64,
        duration: f64,
    },
    CharExpr {
        id: String,
        image: String,
    },
    FadeOut {
        duration: f64,
        color: Color,
    },
    FadeIn {
        duration: f64,
        color: Color,
    },
}

impl Event {
    /// Short name of the variant, used in warnings and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dialogue { .. } => "dialogue",
            Self::Narration { .. } => "narration",
            Self::Choice { .. } => "choice",
            Self::Jump { .. } => "jump",
            Self::Set(_) => "set",
            Self::Macro { .. } => "macro",
            Self::CodeBlock { .. } => "code_block",
            Self::CharShow { .. } => "char_show",
            Self::CharHide { .. } => "char_hide",
            Self::CharMove { .. } => "char_move",
            Self::CharExpr { .. } => "char_expr",
            Self::FadeOut { .. } => "fade_out",
            Self::FadeIn { .. } => "fade_in",
        }
    }

    /// True for staging events that go straight to the presentation sink.
    pub fn is_presentation(&self) -> bool {
        matches!(
            self,
            Self::CharShow { .. }
                | Self::CharHide { .. }
                | Self::CharMove { .. }
                | Self::CharExpr { .. }
                | Self::FadeOut { .. }
                | Self::FadeIn { .. }
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dialogue { speaker, text } => write!(f, "{}: {}", speaker, text),
            Self::Narration { text } => write!(f, "{}", text),
            Self::Choice { text, target, .. } => write!(f, "[{}] -> {}", text, target),
            Self::Jump { target, condition } => match condition {
                Some(cond) => write!(f, "jump {} if {}", target, cond),
                None => write!(f, "jump {}", target),
            },
            Self::Set(a) => write!(f, "set {} = {}", a.var, a.value),
            Self::Macro { name } => write!(f, "macro {}", name),
            Self::CodeBlock { lang, lines } => write!(f, "```{} ({} lines)", lang, lines.len()),
            Self::CharShow {
                id,
                image,
                x,
                y,
                scale,
            } => write!(f, "show {} {} at ({}, {}) x{}", id, image, x, y, scale),
            Self::CharHide { id } => write!(f, "hide {}", id),
            Self::CharMove { id, x, y, duration } => {
                write!(f, "move {} to ({}, {}) over {}s", id, x, y, duration)
            }
            Self::CharExpr { id, image } => write!(f, "expr {} {}", id, image),
            Self::FadeOut { duration, color } => write!(f, "fade_out {}s {}", duration, color),
            Self::FadeIn { duration, color } => write!(f, "fade_in {}s {}", duration, color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_color_is_opaque_black() {
        assert_eq!(Color::default(), Color::rgba(0, 0, 0, 255));
    }

    #[test]
    fn presentation_variants() {
        let hide = Event::CharHide {
            id: "ava".to_string(),
        };
        let fade = Event::FadeIn {
            duration: 1.0,
            color: Color::BLACK,
        };
        let line = Event::Narration {
            text: "Rain.".to_string(),
        };
        let block = Event::CodeBlock {
            lang: "sound".to_string(),
            lines: vec![],
        };
        assert!(hide.is_presentation());
        assert!(fade.is_presentation());
        assert!(!line.is_presentation());
        assert!(!block.is_presentation());
    }

    #[test]
    fn dialogue_renders_with_speaker() {
        let event = Event::Dialogue {
            speaker: "Ava".to_string(),
            text: "Hello".to_string(),
        };
        assert_eq!(event.to_string(), "Ava: Hello");
        assert_eq!(event.kind(), "dialogue");
    }

    #[test]
    fn transition_renders_color() {
        let event = Event::FadeOut {
            duration: 2.5,
            color: Color::rgba(255, 255, 255, 128),
        };
        assert_eq!(event.to_string(), "fade_out 2.5s (255,255,255,128)");
    }
}
