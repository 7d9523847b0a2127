//! Expand compact character patterns such as `M?N^2(O|P)^3Q*R+` into random strings.
//!
//! The syntax:
//! - a letter or digit stands for itself,
//! - a postfix `^n` repeats the preceding item exactly `n` times (`n` is a single digit),
//! - a postfix `*` repeats it 0 to 5 times, `+` 1 to 5 times and `?` 0 or 1 times,
//! - `(A|B|C)` picks one of the listed characters; `(A|B)^n` makes `n` independent picks.
//!
//! Repetition counts are capped at [`MAX_REPEAT`].
//!
//! ```
//! use formlang::pattern::Pattern;
//!
//! let pattern = Pattern::parse("N^2(O|P)^3").unwrap();
//! let sample = pattern.sample(&mut rand::thread_rng());
//! assert!(sample.starts_with("NN"));
//! assert_eq!(sample.len(), 5);
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use rand::Rng;
use thiserror::Error;

/// Upper bound of every repetition.
pub const MAX_REPEAT: usize = 5;

/// Errors raised by [`Pattern::parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// A `(` without a matching `)`
    #[error("Unclosed group starting at position {0}")]
    UnclosedGroup(usize),

    /// `()`
    #[error("Empty group at position {0}")]
    EmptyGroup(usize),

    /// A `^` that is not followed by a digit
    #[error("Expected a repetition count after '^' at position {0}")]
    MissingCount(usize),

    /// A character that is not valid at this point of the pattern
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedChar {
        /// The offending character
        character: char,
        /// Its byte offset
        position: usize,
    },
}

/// How often an item is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Exactly `n` times
    Exact(usize),
    /// 0 to [`MAX_REPEAT`] times
    Star,
    /// 1 to [`MAX_REPEAT`] times
    Plus,
    /// 0 or 1 times
    Optional,
}

impl Repeat {
    fn count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Repeat::Exact(n) => *n,
            Repeat::Star => rng.gen_range(0..=MAX_REPEAT),
            Repeat::Plus => rng.gen_range(1..=MAX_REPEAT),
            Repeat::Optional => usize::from(rng.gen_bool(0.5)),
        }
    }
}

/// One element of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A literal character repeated according to `repeat`
    Literal {
        /// The character
        character: char,
        /// Its repetition
        repeat: Repeat,
    },
    /// `picks` independent choices among `choices`
    Group {
        /// The alternatives in the order they were written
        choices: Vec<char>,
        /// Number of picks
        picks: usize,
    },
}

/// A parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    items: Vec<Item>,
}

type Chars<'a> = Peekable<CharIndices<'a>>;

fn parse_count(chars: &mut Chars, caret: usize) -> Result<usize, PatternError> {
    match chars.next() {
        Some((_, c)) if c.is_ascii_digit() => Ok((c as usize - '0' as usize).min(MAX_REPEAT)),
        _ => Err(PatternError::MissingCount(caret)),
    }
}

fn parse_repeat(chars: &mut Chars) -> Result<Repeat, PatternError> {
    let repeat = match chars.peek() {
        Some(&(caret, '^')) => {
            chars.next();
            return Ok(Repeat::Exact(parse_count(chars, caret)?));
        },
        Some((_, '*')) => Repeat::Star,
        Some((_, '+')) => Repeat::Plus,
        Some((_, '?')) => Repeat::Optional,
        _ => return Ok(Repeat::Exact(1)),
    };

    chars.next();
    Ok(repeat)
}

fn parse_group(chars: &mut Chars, open: usize) -> Result<Item, PatternError> {
    let mut choices = Vec::new();
    let mut expect_choice = true;

    loop {
        let (position, c) = match chars.next() {
            Some(next) => next,
            None => return Err(PatternError::UnclosedGroup(open)),
        };

        match c {
            ')' if choices.is_empty() && expect_choice => return Err(PatternError::EmptyGroup(open)),
            ')' if !expect_choice => break,
            '|' if !expect_choice => expect_choice = true,
            c if c.is_alphanumeric() && expect_choice => {
                choices.push(c);
                expect_choice = false;
            },
            _ => {
                return Err(PatternError::UnexpectedChar {
                    character: c,
                    position,
                })
            },
        }
    }

    let picks = match chars.peek() {
        Some(&(caret, '^')) => {
            chars.next();
            parse_count(chars, caret)?
        },
        _ => 1,
    };

    Ok(Item::Group { choices, picks })
}

impl Pattern {
    /// Parse a pattern.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut items = Vec::new();
        let mut chars = source.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            if c == '(' {
                items.push(parse_group(&mut chars, position)?);
            } else if c.is_alphanumeric() {
                let repeat = parse_repeat(&mut chars)?;
                items.push(Item::Literal { character: c, repeat });
            } else {
                return Err(PatternError::UnexpectedChar {
                    character: c,
                    position,
                });
            }
        }

        Ok(Self { items })
    }

    /// The parsed items.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Produce one random string that matches the pattern.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut output = String::new();

        for item in &self.items {
            let start = output.len();

            match item {
                Item::Literal { character, repeat } => {
                    let count = repeat.count(rng);
                    output.extend(std::iter::repeat(*character).take(count));
                },
                Item::Group { choices, picks } => {
                    for _ in 0..*picks {
                        output.push(choices[rng.gen_range(0..choices.len())]);
                    }
                },
            }

            tracing::trace!("{:?} -> {:?}", item, &output[start..]);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_parse() {
        let pattern = Pattern::parse("M?N^2(O|P)^3Q*R+").unwrap();
        assert_eq!(
            pattern.items(),
            &[
                Item::Literal {
                    character: 'M',
                    repeat: Repeat::Optional
                },
                Item::Literal {
                    character: 'N',
                    repeat: Repeat::Exact(2)
                },
                Item::Group {
                    choices: vec!['O', 'P'],
                    picks: 3
                },
                Item::Literal {
                    character: 'Q',
                    repeat: Repeat::Star
                },
                Item::Literal {
                    character: 'R',
                    repeat: Repeat::Plus
                },
            ]
        );
    }

    #[test]
    fn test_cap() {
        let pattern = Pattern::parse("(X|Y|Z)^98^7").unwrap();
        assert_eq!(
            pattern.items(),
            &[
                Item::Group {
                    choices: vec!['X', 'Y', 'Z'],
                    picks: 5
                },
                Item::Literal {
                    character: '8',
                    repeat: Repeat::Exact(5)
                },
            ]
        );
    }

    #[test]
    fn test_sample() {
        let mut rng = StdRng::seed_from_u64(1234);
        let pattern = Pattern::parse("M?N^2(O|P)^3Q*R+").unwrap();

        for _ in 0..100 {
            let sample = pattern.sample(&mut rng);
            let rest = sample.strip_prefix('M').unwrap_or(&sample);
            let rest = rest.strip_prefix("NN").unwrap();
            let (group, rest) = rest.split_at(3);
            assert!(group.chars().all(|c| c == 'O' || c == 'P'));

            let rest = rest.trim_start_matches('Q');
            assert!(sample.len() - rest.len() <= 1 + 2 + 3 + MAX_REPEAT);
            assert!((1..=MAX_REPEAT).contains(&rest.len()));
            assert!(rest.chars().all(|c| c == 'R'));
        }
    }

    #[test]
    fn test_sample_groups() {
        let mut rng = StdRng::seed_from_u64(7);
        let pattern = Pattern::parse("(H|i)(J|K)L*N?").unwrap();

        for _ in 0..100 {
            let sample = pattern.sample(&mut rng);
            let mut chars = sample.chars();
            assert!(matches!(chars.next(), Some('H' | 'i')));
            assert!(matches!(chars.next(), Some('J' | 'K')));
            assert!(chars.all(|c| c == 'L' || c == 'N'));
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(Pattern::parse("A(B|C").unwrap_err(), PatternError::UnclosedGroup(1));
        assert_eq!(Pattern::parse("()").unwrap_err(), PatternError::EmptyGroup(0));
        assert_eq!(Pattern::parse("A^").unwrap_err(), PatternError::MissingCount(1));
        assert_eq!(Pattern::parse("A^x").unwrap_err(), PatternError::MissingCount(1));
        assert_eq!(Pattern::parse("(A|B)^").unwrap_err(), PatternError::MissingCount(5));
        assert_eq!(
            Pattern::parse("A**").unwrap_err(),
            PatternError::UnexpectedChar {
                character: '*',
                position: 2
            }
        );
        assert_eq!(
            Pattern::parse("(A|)").unwrap_err(),
            PatternError::UnexpectedChar {
                character: ')',
                position: 3
            }
        );
        assert_eq!(
            Pattern::parse("(AB)").unwrap_err(),
            PatternError::UnexpectedChar {
                character: 'B',
                position: 2
            }
        );
    }

    #[test]
    fn test_empty() {
        let pattern = Pattern::parse("").unwrap();
        assert!(pattern.items().is_empty());
        assert_eq!(pattern.sample(&mut rand::thread_rng()), "");
    }
}
