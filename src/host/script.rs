//! Script text to command invocations
//!
//! Grammar, one pipeline per line:
//!
//! ```text
//! pipeline := stage ( '|' stage )*
//! stage    := name ( '-Param' [value] | '-Param:value' | value )*
//! ```
//!
//! Values are bare words or quoted strings. Double-quoted strings take
//! backtick escapes (`` `" `` and ``` `` ```); single-quoted strings are
//! literal, with `''` standing for one quote. A `#` at the start of a token
//! comments out the rest of the line.

use crate::command::CommandInvocation;
use crate::error::{Error, Result};

/// A parsed script
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    /// Pipelines in script order
    pub pipelines: Vec<ScriptPipeline>,
}

/// One line of a script: invocations chained with `|`
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptPipeline {
    /// 1-based source line
    pub line: usize,
    /// Stages in order; the first receives no upstream records
    pub stages: Vec<CommandInvocation>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Word { text: String, quoted: bool },
    Pipe,
}

/// Parse a whole script
///
/// # Errors
///
/// [`Error::ScriptParse`] for unterminated quotes, empty pipeline stages, or
/// a stage that does not start with a command name. Nothing in the script
/// runs if any line fails to parse.
pub fn parse_script(body: &str) -> Result<Script> {
    let mut pipelines = Vec::new();
    for (index, text) in body.lines().enumerate() {
        let line = index + 1;
        let tokens = tokenize(text).map_err(|message| Error::ScriptParse { line, message })?;
        if tokens.is_empty() {
            continue;
        }
        let stages = build_stages(tokens).map_err(|message| Error::ScriptParse { line, message })?;
        pipelines.push(ScriptPipeline { line, stages });
    }
    Ok(Script { pipelines })
}

fn tokenize(line: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => break,
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('`') => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => return Err("unterminated escape in string".to_string()),
                        },
                        Some(c) => text.push(c),
                        None => return Err("unterminated double-quoted string".to_string()),
                    }
                }
                tokens.push(Token::Word { text, quoted: true });
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            text.push('\'');
                        }
                        Some('\'') => break,
                        Some(c) => text.push(c),
                        None => return Err("unterminated single-quoted string".to_string()),
                    }
                }
                tokens.push(Token::Word { text, quoted: true });
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '|' {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                tokens.push(Token::Word {
                    text,
                    quoted: false,
                });
            }
        }
    }

    Ok(tokens)
}

/// Parameter name if the token is an unquoted `-Name` or `-Name:value`
fn parameter_token(token: &Token) -> Option<(&str, Option<&str>)> {
    match token {
        Token::Word {
            text,
            quoted: false,
        } => {
            let rest = text.strip_prefix('-')?;
            if !rest.chars().next().is_some_and(char::is_alphabetic) {
                return None;
            }
            match rest.split_once(':') {
                Some((name, value)) => Some((name, Some(value))),
                None => Some((rest, None)),
            }
        }
        _ => None,
    }
}

fn build_stages(tokens: Vec<Token>) -> std::result::Result<Vec<CommandInvocation>, String> {
    let mut stages = Vec::new();
    let mut groups: Vec<Vec<Token>> = vec![Vec::new()];
    for token in tokens {
        match token {
            Token::Pipe => groups.push(Vec::new()),
            word => {
                if let Some(group) = groups.last_mut() {
                    group.push(word);
                }
            }
        }
    }

    for (index, group) in groups.into_iter().enumerate() {
        let mut iter = group.into_iter().peekable();
        let name = match iter.next() {
            Some(Token::Word {
                text,
                quoted: false,
            }) => text,
            Some(_) => return Err(format!("stage {} must start with a command name", index + 1)),
            None => return Err(format!("empty pipeline element at stage {}", index + 1)),
        };

        let mut invocation = CommandInvocation::new(name);
        while let Some(token) = iter.next() {
            if let Some((param, inline_value)) = parameter_token(&token) {
                let param = param.to_string();
                let value = match inline_value {
                    Some(value) => value.to_string(),
                    None => match iter.peek() {
                        Some(next) if parameter_token(next).is_none() => match iter.next() {
                            Some(Token::Word { text, .. }) => text,
                            _ => "true".to_string(),
                        },
                        // Switch parameter
                        _ => "true".to_string(),
                    },
                };
                invocation = invocation.arg(param, value);
            } else if let Token::Word { text, .. } = token {
                invocation = invocation.positional(text);
            }
        }
        stages.push(invocation);
    }

    Ok(stages)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_parameter_with_quoted_value() {
        let script = parse_script(
            r#"Save-Track -TrackUrl "https://soundcloud.com/kevin-kiner/ahsoka-end-credits-from-ahsoka""#,
        )
        .unwrap();

        assert_eq!(script.pipelines.len(), 1);
        let stage = &script.pipelines[0].stages[0];
        assert_eq!(stage.name(), "Save-Track");
        assert_eq!(
            stage.named_arg("TrackUrl"),
            Some("https://soundcloud.com/kevin-kiner/ahsoka-end-credits-from-ahsoka")
        );
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let script = parse_script("\n# header\n  Get-Track a # trailing\n\n").unwrap();
        assert_eq!(script.pipelines.len(), 1);
        assert_eq!(script.pipelines[0].line, 3);
        assert_eq!(script.pipelines[0].stages[0].positional_args(), ["a"]);
    }

    #[test]
    fn pipes_split_stages() {
        let script = parse_script("Get-Track 'u'|Save-Track").unwrap();
        let stages = &script.pipelines[0].stages;
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].positional_args(), ["u"]);
        assert_eq!(stages[1].name(), "Save-Track");
    }

    #[test]
    fn quoted_pipe_is_literal() {
        let script = parse_script(r#"Get-Track "a|b""#).unwrap();
        assert_eq!(script.pipelines[0].stages.len(), 1);
        assert_eq!(script.pipelines[0].stages[0].positional_args(), ["a|b"]);
    }

    #[test]
    fn escapes_in_both_quote_styles() {
        let script = parse_script(r#"Cmd "say `"hi`"" 'it''s'"#).unwrap();
        assert_eq!(
            script.pipelines[0].stages[0].positional_args(),
            ["say \"hi\"", "it's"]
        );
    }

    #[test]
    fn switches_and_inline_values() {
        let script = parse_script("Cmd -Force -Password:secret -Name v -Last").unwrap();
        let stage = &script.pipelines[0].stages[0];
        assert_eq!(stage.named_arg("Force"), Some("true"));
        assert_eq!(stage.named_arg("Password"), Some("secret"));
        assert_eq!(stage.named_arg("Name"), Some("v"));
        assert_eq!(stage.named_arg("Last"), Some("true"));
    }

    #[test]
    fn negative_numbers_and_quoted_dashes_are_values() {
        let script = parse_script(r#"Cmd -5 "-NotAParam""#).unwrap();
        let stage = &script.pipelines[0].stages[0];
        assert_eq!(stage.positional_args(), ["-5", "-NotAParam"]);
        assert!(stage.named_args().is_empty());
    }

    #[test]
    fn unterminated_quote_reports_line() {
        let err = parse_script("Get-Track a\nSave-Track \"oops").unwrap_err();
        match err {
            Error::ScriptParse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("unterminated"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn empty_stage_is_rejected() {
        assert!(parse_script("Get-Track a | | Save-Track").is_err());
        assert!(parse_script("Get-Track a |").is_err());
        assert!(parse_script("| Save-Track").is_err());
    }

    #[test]
    fn stage_must_start_with_bare_name() {
        let err = parse_script(r#""Save-Track" x"#).unwrap_err();
        assert!(err.to_string().contains("command name"));
    }

    #[test]
    fn empty_script_has_no_pipelines() {
        assert!(parse_script("").unwrap().pipelines.is_empty());
    }
}
