/// Line tokens produced by the tokenizer.

use serde::{Deserialize, Serialize};

use super::event::Event;

/// A `<var> = <value>` pair attached to `@` lines and choices.
///
/// The value is kept as written and parsed when the assignment runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub var: String,
    pub value: String,
}

/// One classified script line (or one fenced block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Scene {
        name: String,
    },
    Choice {
        text: String,
        target: String,
        set: Option<Assignment>,
    },
    Dialogue {
        speaker: String,
        text: String,
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
    Narration {
        text: String,
    },
}

impl Token {
    /// The event a token becomes once grouped into a scene. Scene headers
    /// have no event form.
    pub fn into_event(self) -> Option<Event> {
        let event = match self {
            Token::Scene { .. } => return None,
            Token::Choice { text, target, set } => Event::Choice { text, target, set },
            Token::Dialogue { speaker, text } => Event::Dialogue { speaker, text },
            Token::Jump { target, condition } => Event::Jump { target, condition },
            Token::Set(assignment) => Event::Set(assignment),
            Token::Macro { name } => Event::Macro { name },
            Token::CodeBlock { lang, lines } => Event::CodeBlock { lang, lines },
            Token::Narration { text } => Event::Narration { text },
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_has_no_event_form() {
        let token = Token::Scene {
            name: "Start".to_string(),
        };
        assert!(token.into_event().is_none());
    }

    #[test]
    fn choice_keeps_its_shape() {
        let token = Token::Choice {
            text: "Leave".to_string(),
            target: "End".to_string(),
            set: Some(Assignment {
                var: "left".to_string(),
                value: "true".to_string(),
            }),
        };
        assert!(matches!(
            token.into_event(),
            Some(Event::Choice { ref text, ref target, set: Some(ref a) })
                if text == "Leave" && target == "End" && a.var == "left"
        ));
    }

    #[test]
    fn code_block_survives_grouping() {
        let token = Token::CodeBlock {
            lang: "char".to_string(),
            lines: vec!["hide ava".to_string()],
        };
        assert_eq!(
            token.into_event(),
            Some(Event::CodeBlock {
                lang: "char".to_string(),
                lines: vec!["hide ava".to_string()],
            })
        );
    }
}
