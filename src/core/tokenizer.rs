/// Line tokenizer — classifies raw script lines into typed tokens.

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::core::config::MalformedLinePolicy;
use crate::schema::diagnostic::Warning;
use crate::schema::token::{Assignment, Token};

type Classify = fn(&Captures) -> Token;

lazy_static! {
    /// Line grammars in priority order. The first pattern that matches wins.
    static ref GRAMMAR: Vec<(Regex, Classify)> = vec![
        (Regex::new(r"^##\s+(.+)$").unwrap(), scene as Classify),
        (
            Regex::new(r"^- \[(.+?)\]\((.+?)\)(?:\s+set\s+(\w+)\s*=\s*(.+))?$").unwrap(),
            choice,
        ),
        (Regex::new(r"^\*\*(.+?)\*\*:\s*(.+)$").unwrap(), dialogue),
        (Regex::new(r"^>\s*(.+?)(?:\s*\?\s*(.+))?$").unwrap(), jump),
        (Regex::new(r"^@\s*(\w+)\s*=\s*(.+)$").unwrap(), set),
        (Regex::new(r"^!\[\[(.+?)\]\]$").unwrap(), macro_ref),
    ];
    static ref FENCE_OPEN: Regex = Regex::new(r"^```(\w+)$").unwrap();
}

const FENCE_CLOSE: &str = "```";

/// Prefixes that announce one of the grammars above. A line that starts
/// with one of these but matches nothing is malformed rather than narration.
const SIGILS: &[&str] = &["## ", "- [", "**", "> ", "@ ", "![[", "```"];

fn scene(caps: &Captures) -> Token {
    Token::Scene {
        name: caps[1].trim().to_string(),
    }
}

fn choice(caps: &Captures) -> Token {
    let set = match (caps.get(3), caps.get(4)) {
        (Some(var), Some(value)) => Some(Assignment {
            var: var.as_str().to_string(),
            value: value.as_str().trim().to_string(),
        }),
        _ => None,
    };
    Token::Choice {
        text: caps[1].to_string(),
        target: caps[2].trim().to_string(),
        set,
    }
}

fn dialogue(caps: &Captures) -> Token {
    Token::Dialogue {
        speaker: caps[1].to_string(),
        text: caps[2].to_string(),
    }
}

fn jump(caps: &Captures) -> Token {
    Token::Jump {
        target: caps[1].trim().to_string(),
        condition: caps.get(2).map(|c| c.as_str().trim().to_string()),
    }
}

fn set(caps: &Captures) -> Token {
    Token::Set(Assignment {
        var: caps[1].to_string(),
        value: caps[2].trim().to_string(),
    })
}

fn macro_ref(caps: &Captures) -> Token {
    Token::Macro {
        name: caps[1].trim().to_string(),
    }
}

/// Classify a single trimmed, non-empty line outside a fenced block.
///
/// Returns `None` for a malformed sigil line.
pub fn classify(line: &str) -> Option<Token> {
    for (pattern, build) in GRAMMAR.iter() {
        if let Some(caps) = pattern.captures(line) {
            return Some(build(&caps));
        }
    }
    if SIGILS.iter().any(|sigil| line.starts_with(sigil)) {
        return None;
    }
    Some(Token::Narration {
        text: line.to_string(),
    })
}

/// An open fenced block being buffered.
struct Fence {
    line: usize,
    lang: String,
    lines: Vec<String>,
}

/// Stateful tokenizer. Owns fenced-block buffering and records warnings
/// for lines it could not classify.
#[derive(Debug, Default)]
pub struct Tokenizer {
    policy: MalformedLinePolicy,
    warnings: Vec<Warning>,
}

impl Tokenizer {
    pub fn new(policy: MalformedLinePolicy) -> Self {
        Self {
            policy,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Tokenize a sequence of raw lines. Token order follows line order, and
    /// each token is paired with the 1-based line it starts on.
    pub fn tokenize<'a, I>(&mut self, lines: I) -> Vec<(usize, Token)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tokens = Vec::new();
        let mut fence: Option<Fence> = None;

        for (index, raw) in lines.into_iter().enumerate() {
            let number = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if line == FENCE_CLOSE {
                if let Some(done) = fence.take() {
                    debug!(target: "tokenizer", lang = %done.lang, lines = done.lines.len(), "closed fenced block");
                    tokens.push((
                        done.line,
                        Token::CodeBlock {
                            lang: done.lang,
                            lines: done.lines,
                        },
                    ));
                    continue;
                }
            }
            if let Some(open) = fence.as_mut() {
                open.lines.push(line.to_string());
                continue;
            }

            if let Some(caps) = FENCE_OPEN.captures(line) {
                fence = Some(Fence {
                    line: number,
                    lang: caps[1].to_string(),
                    lines: Vec::new(),
                });
                continue;
            }

            match classify(line) {
                Some(token) => {
                    debug!(target: "tokenizer", line = number, ?token, "classified line");
                    tokens.push((number, token));
                }
                None => {
                    warn!(target: "tokenizer", line = number, text = %line, "malformed line");
                    self.warnings.push(Warning::MalformedLine {
                        line: line.to_string(),
                    });
                    if self.policy == MalformedLinePolicy::Narration {
                        tokens.push((
                            number,
                            Token::Narration {
                                text: line.to_string(),
                            },
                        ));
                    }
                }
            }
        }

        if let Some(open) = fence {
            warn!(target: "tokenizer", lang = %open.lang, "fenced block not closed before end of script");
            tokens.push((
                open.line,
                Token::CodeBlock {
                    lang: open.lang,
                    lines: open.lines,
                },
            ));
        }

        tokens
    }
}

/// Tokenize with the default policy (malformed sigil lines are dropped).
pub fn tokenize<'a, I>(lines: I) -> Vec<(usize, Token)>
where
    I: IntoIterator<Item = &'a str>,
{
    Tokenizer::default().tokenize(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(line: &str) -> Token {
        let tokens = tokenize([line]);
        assert_eq!(tokens.len(), 1, "expected one token for {:?}", line);
        tokens.into_iter().next().unwrap().1
    }

    #[test]
    fn scene_header() {
        assert_eq!(
            one("## Start"),
            Token::Scene {
                name: "Start".to_string()
            }
        );
        assert_eq!(
            one("##   The End"),
            Token::Scene {
                name: "The End".to_string()
            }
        );
    }

    #[test]
    fn choice_with_and_without_set() {
        assert_eq!(
            one("- [Leave](End)"),
            Token::Choice {
                text: "Leave".to_string(),
                target: "End".to_string(),
                set: None,
            }
        );
        assert_eq!(
            one("- [Trust her](Ally) set trust = 3"),
            Token::Choice {
                text: "Trust her".to_string(),
                target: "Ally".to_string(),
                set: Some(Assignment {
                    var: "trust".to_string(),
                    value: "3".to_string(),
                }),
            }
        );
    }

    #[test]
    fn dialogue_line() {
        assert_eq!(
            one("**Ava**: Hello there."),
            Token::Dialogue {
                speaker: "Ava".to_string(),
                text: "Hello there.".to_string(),
            }
        );
    }

    #[test]
    fn jump_with_condition() {
        assert_eq!(
            one("> Rich ? gold > 10"),
            Token::Jump {
                target: "Rich".to_string(),
                condition: Some("gold > 10".to_string()),
            }
        );
        assert_eq!(
            one("> The End"),
            Token::Jump {
                target: "The End".to_string(),
                condition: None,
            }
        );
    }

    #[test]
    fn assignment_and_macro() {
        assert_eq!(
            one("@ gold = 5"),
            Token::Set(Assignment {
                var: "gold".to_string(),
                value: "5".to_string(),
            })
        );
        assert_eq!(
            one("![[Intro]]"),
            Token::Macro {
                name: "Intro".to_string()
            }
        );
    }

    #[test]
    fn fallback_is_narration() {
        assert_eq!(
            one("  The rain kept falling.  "),
            Token::Narration {
                text: "The rain kept falling.".to_string()
            }
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(tokenize(["", "   ", "\t"]).is_empty());
    }

    #[test]
    fn fenced_block_is_buffered_verbatim() {
        let lines = ["```char", "## not a scene", "show ava happy 0.5 0.8", "```"];
        let tokens = tokenize(lines);
        assert_eq!(
            tokens,
            vec![(
                1,
                Token::CodeBlock {
                    lang: "char".to_string(),
                    lines: vec![
                        "## not a scene".to_string(),
                        "show ava happy 0.5 0.8".to_string()
                    ],
                }
            )]
        );
    }

    #[test]
    fn unclosed_fence_is_flushed_at_end() {
        let tokens = tokenize(["```transition", "fade_out"]);
        assert!(matches!(&tokens[..], [(1, Token::CodeBlock { lang, lines })] if lang == "transition" && lines.len() == 1));
    }

    #[test]
    fn malformed_sigil_lines_are_dropped() {
        let mut tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(["- [Broken choice", "**Ava** forgot the colon", "```"]);
        assert!(tokens.is_empty());
        assert_eq!(tokenizer.warnings().len(), 3);
    }

    #[test]
    fn malformed_lines_can_fall_back_to_narration() {
        let mut tokenizer = Tokenizer::new(MalformedLinePolicy::Narration);
        let tokens = tokenizer.tokenize(["- [Broken choice"]);
        assert_eq!(
            tokens,
            vec![(
                1,
                Token::Narration {
                    text: "- [Broken choice".to_string()
                }
            )]
        );
        assert_eq!(tokenizer.into_warnings().len(), 1);
    }

    #[test]
    fn tokens_carry_source_lines() {
        let lines = ["## Start", "", "**Ava**: Hi", "```char", "hide ava", "```", "", "Bye."];
        let numbers: Vec<usize> = tokenize(lines).iter().map(|(line, _)| *line).collect();
        assert_eq!(numbers, vec![1, 3, 4, 8]);
    }

    #[test]
    fn priority_order_is_first_match_wins() {
        // A dialogue-looking choice text is still a choice.
        assert!(matches!(one("- [**Ava**: hi](End)"), Token::Choice { .. }));
        // A scene header wins over everything else.
        assert!(matches!(one("## > Start"), Token::Scene { .. }));
        // Text that only contains a sigil later on is narration.
        assert!(matches!(one("She said > no."), Token::Narration { .. }));
    }
}
