/// Command lowering — turns the lines of fenced `char` and `transition`
/// blocks into presentation events.

use regex::{Captures, Regex};
use tracing::warn;

use crate::schema::diagnostic::Warning;
use crate::schema::event::{Color, Event};

const DEFAULT_SCALE: f64 = 1.0;
const DEFAULT_MOVE_DURATION: f64 = 0.5;
const DEFAULT_FADE_DURATION: f64 = 1.0;

type Lower = fn(&Captures) -> Option<Event>;

lazy_static! {
    static ref CHAR_COMMANDS: Vec<(Regex, Lower)> = vec![
        (
            Regex::new(r"^show\s+(\S+)\s+(\S+)\s+(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)(?:\s+(-?\d+(?:\.\d+)?))?$").unwrap(),
            show as Lower,
        ),
        (Regex::new(r"^hide\s+(\S+)$").unwrap(), hide),
        (
            Regex::new(r"^move\s+(\S+)\s+(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)(?:\s+(-?\d+(?:\.\d+)?))?$").unwrap(),
            move_to,
        ),
        (Regex::new(r"^expr\s+(\S+)\s+(\S+)$").unwrap(), expr),
    ];
    static ref TRANSITION_COMMANDS: Vec<(Regex, Lower)> = vec![
        (
            Regex::new(r"^fade_out(?:\s+(\d+(?:\.\d+)?))?(?:\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?$").unwrap(),
            fade_out as Lower,
        ),
        (
            Regex::new(r"^fade_in(?:\s+(\d+(?:\.\d+)?))?(?:\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?$").unwrap(),
            fade_in,
        ),
    ];
}

fn float(caps: &Captures, i: usize) -> Option<f64> {
    caps.get(i)?.as_str().parse().ok()
}

fn show(caps: &Captures) -> Option<Event> {
    Some(Event::CharShow {
        id: caps[1].to_string(),
        image: caps[2].to_string(),
        x: float(caps, 3)?,
        y: float(caps, 4)?,
        scale: float(caps, 5).unwrap_or(DEFAULT_SCALE),
    })
}

fn hide(caps: &Captures) -> Option<Event> {
    Some(Event::CharHide {
        id: caps[1].to_string(),
    })
}

fn move_to(caps: &Captures) -> Option<Event> {
    Some(Event::CharMove {
        id: caps[1].to_string(),
        x: float(caps, 2)?,
        y: float(caps, 3)?,
        duration: float(caps, 4).unwrap_or(DEFAULT_MOVE_DURATION),
    })
}

fn expr(caps: &Captures) -> Option<Event> {
    Some(Event::CharExpr {
        id: caps[1].to_string(),
        image: caps[2].to_string(),
    })
}

/// Optional `(r,g,b[,a])` starting at capture group 2. Channels above 255
/// make the whole command invalid.
fn color(caps: &Captures) -> Option<Color> {
    let channel = |i: usize| -> Option<u8> { caps[i].parse().ok() };
    if caps.get(2).is_none() {
        return Some(Color::default());
    }
    let a = match caps.get(5) {
        Some(m) => m.as_str().parse().ok()?,
        None => 255,
    };
    Some(Color::rgba(channel(2)?, channel(3)?, channel(4)?, a))
}

fn fade_out(caps: &Captures) -> Option<Event> {
    Some(Event::FadeOut {
        duration: float(caps, 1).unwrap_or(DEFAULT_FADE_DURATION),
        color: color(caps)?,
    })
}

fn fade_in(caps: &Captures) -> Option<Event> {
    Some(Event::FadeIn {
        duration: float(caps, 1).unwrap_or(DEFAULT_FADE_DURATION),
        color: color(caps)?,
    })
}

fn commands_for(lang: &str) -> Option<&'static [(Regex, Lower)]> {
    match lang {
        "char" => Some(CHAR_COMMANDS.as_slice()),
        "transition" => Some(TRANSITION_COMMANDS.as_slice()),
        _ => None,
    }
}

/// Whether `lang` is a sub-language this module can lower.
pub fn is_known_lang(lang: &str) -> bool {
    commands_for(lang).is_some()
}

/// Lower the lines of a fenced block.
///
/// Returns `None` when `lang` is not a known sub-language; the caller keeps
/// the block as is. Lines that match no command are dropped and recorded
/// in `warnings`.
pub fn lower(lang: &str, lines: &[String], warnings: &mut Vec<Warning>) -> Option<Vec<Event>> {
    let commands = commands_for(lang)?;
    let mut events = Vec::with_capacity(lines.len());

    for line in lines {
        let lowered = commands.iter().find_map(|(pattern, build)| {
            pattern.captures(line).and_then(|caps| build(&caps))
        });
        match lowered {
            Some(event) => events.push(event),
            None => {
                warn!(target: "commands", lang, line = %line, "unknown command dropped");
                warnings.push(Warning::UnknownCommand {
                    lang: lang.to_string(),
                    line: line.clone(),
                });
            }
        }
    }

    Some(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower_all(lang: &str, lines: &[&str]) -> (Option<Vec<Event>>, Vec<Warning>) {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let mut warnings = Vec::new();
        let events = lower(lang, &lines, &mut warnings);
        (events, warnings)
    }

    #[test]
    fn char_commands_with_defaults() {
        let (events, warnings) = lower_all(
            "char",
            &[
                "show ava happy 0.5 0.8",
                "show ben tired -1 2 1.5",
                "hide ava",
                "move ben 0.2 0.8",
                "move ben 0.2 0.8 3",
                "expr ben smiling",
            ],
        );
        assert!(warnings.is_empty());
        assert_eq!(
            events.unwrap(),
            vec![
                Event::CharShow {
                    id: "ava".to_string(),
                    image: "happy".to_string(),
                    x: 0.5,
                    y: 0.8,
                    scale: 1.0,
                },
                Event::CharShow {
                    id: "ben".to_string(),
                    image: "tired".to_string(),
                    x: -1.0,
                    y: 2.0,
                    scale: 1.5,
                },
                Event::CharHide {
                    id: "ava".to_string()
                },
                Event::CharMove {
                    id: "ben".to_string(),
                    x: 0.2,
                    y: 0.8,
                    duration: 0.5,
                },
                Event::CharMove {
                    id: "ben".to_string(),
                    x: 0.2,
                    y: 0.8,
                    duration: 3.0,
                },
                Event::CharExpr {
                    id: "ben".to_string(),
                    image: "smiling".to_string(),
                },
            ]
        );
    }

    #[test]
    fn transitions_with_colors() {
        let (events, warnings) = lower_all(
            "transition",
            &["fade_out", "fade_in 2.5", "fade_out 0.3 (255, 255, 255)", "fade_in (10,20,30,40)"],
        );
        assert!(warnings.is_empty());
        assert_eq!(
            events.unwrap(),
            vec![
                Event::FadeOut {
                    duration: 1.0,
                    color: Color::BLACK,
                },
                Event::FadeIn {
                    duration: 2.5,
                    color: Color::BLACK,
                },
                Event::FadeOut {
                    duration: 0.3,
                    color: Color::rgba(255, 255, 255, 255),
                },
                Event::FadeIn {
                    duration: 1.0,
                    color: Color::rgba(10, 20, 30, 40),
                },
            ]
        );
    }

    #[test]
    fn unknown_lines_are_dropped_with_warning() {
        let (events, warnings) = lower_all("char", &["dance ava", "hide ava", "show ava"]);
        assert_eq!(
            events.unwrap(),
            vec![Event::CharHide {
                id: "ava".to_string()
            }]
        );
        assert_eq!(warnings.len(), 2);
        assert!(matches!(&warnings[0], Warning::UnknownCommand { lang, line } if lang == "char" && line == "dance ava"));
    }

    #[test]
    fn out_of_range_channel_is_unknown() {
        let (events, warnings) = lower_all("transition", &["fade_in 1 (300,0,0)"]);
        assert!(events.unwrap().is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unknown_language_is_not_lowered() {
        let (events, warnings) = lower_all("sound", &["play rain.ogg"]);
        assert!(events.is_none());
        assert!(warnings.is_empty());
        assert!(!is_known_lang("sound"));
        assert!(is_known_lang("char"));
    }
}
