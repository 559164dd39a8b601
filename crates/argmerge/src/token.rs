//! Shell-word tokenization.

use crate::error::MergeError;

/// Split an argument string into words using shell quoting rules.
///
/// Unescaped whitespace separates words. Single-quoted spans are taken
/// literally. Double-quoted spans honor `\"` and `\\` escapes. Outside
/// quotes a backslash escapes the next character. Quoted substrings stay
/// part of the surrounding word, so `--title="a b"` is one token.
pub fn tokenize(input: &str) -> Result<Vec<String>, MergeError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            Some(_) => match c {
                '"' => quote = None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => {
                        return Err(MergeError::DanglingEscape {
                            input: input.to_string(),
                        });
                    }
                },
                _ => current.push(c),
            },
            None => match c {
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        in_word = true;
                    }
                    None => {
                        return Err(MergeError::DanglingEscape {
                            input: input.to_string(),
                        });
                    }
                },
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(MergeError::UnbalancedQuote {
            input: input.to_string(),
        });
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
