//! Embedded Fortran namelist location and parsing.
//!
//! Every MAGICC input file carries a `&THISFILE_SPECIFICATIONS ... /`
//! namelist between its prose header and its data table. This module finds
//! the namelist lines and turns the first group into flat metadata entries
//! keyed without their `THISFILE_` style namespace prefix.

use crate::constants::{MAX_REPEAT_COUNT, NAMELIST_CLOSE, NAMELIST_OPEN, NAMESPACE_SEPARATOR};
use crate::error::{MagiccError, Result};
use crate::models::MetadataValue;
use regex::Regex;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use std::sync::LazyLock;
use tracing::{debug, warn};

static REPEAT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\*(.*)$").expect("valid repeat pattern"));

static REAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eEdD][+-]?\d+)?$").expect("valid real pattern")
});

static TRUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\.?(t|true)\.?$").expect("valid logical pattern"));

static FALSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\.?(f|false)\.?$").expect("valid logical pattern"));

/// Line indices delimiting the embedded namelist, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamelistBounds {
    pub start: usize,
    pub end: usize,
}

impl NamelistBounds {
    /// Lines making up the namelist
    pub fn slice<'a>(&self, lines: &'a [String]) -> &'a [String] {
        &lines[self.start..=self.end]
    }
}

/// Find the namelist within the lines of a file.
///
/// The whole file is scanned: `start` is the first line opening with `&`
/// and `end` is the last line opening with `/`, even when several of
/// either exist.
pub fn locate_namelist(path: &Path, lines: &[String]) -> Result<NamelistBounds> {
    let mut start = None;
    let mut end = None;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if start.is_none() && trimmed.starts_with(NAMELIST_OPEN) {
            start = Some(index);
        }
        if trimmed.starts_with(NAMELIST_CLOSE) {
            end = Some(index);
        }
    }

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(MagiccError::NamelistNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if end < start {
        return Err(MagiccError::invalid_format(
            path,
            format!(
                "namelist terminator on line {} precedes its opening on line {}",
                end + 1,
                start + 1
            ),
        ));
    }

    debug!(
        "Located namelist in {}: lines {}..={}",
        path.display(),
        start,
        end
    );

    Ok(NamelistBounds { start, end })
}

/// Parse namelist lines into metadata entries.
///
/// Only the first group is read. Keys are lower-cased and stripped of
/// everything up to and including the first underscore.
pub fn parse_namelist(path: &Path, lines: &[String]) -> Result<BTreeMap<String, MetadataValue>> {
    let text = lines
        .iter()
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .collect::<Vec<_>>()
        .join("\n");

    let tokens = tokenize(&text).map_err(|reason| MagiccError::invalid_format(path, reason))?;
    let (group, raw_entries) =
        parse_group(tokens).map_err(|reason| MagiccError::invalid_format(path, reason))?;

    debug!(
        "Parsed namelist group '{}' with {} entries from {}",
        group,
        raw_entries.len(),
        path.display()
    );

    let mut entries = BTreeMap::new();
    for (key, value) in raw_entries {
        entries.insert(strip_namespace(&key), value);
    }
    Ok(entries)
}

/// Drop the namespace prefix of a namelist key
fn strip_namespace(key: &str) -> String {
    match key.split_once(NAMESPACE_SEPARATOR) {
        Some((_, name)) => name.to_string(),
        None => {
            warn!("Namelist key '{}' has no namespace prefix", key);
            key.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Group(String),
    Terminator,
    Equals,
    Comma,
    Quoted(String),
    Word(String),
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '!' => {
                while let Some(c) = chars.next() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '&' | '$' => {
                chars.next();
                let name = read_while(&mut chars, |c| c.is_alphanumeric() || c == '_');
                if name.is_empty() {
                    return Err("group marker without a name".to_string());
                }
                if name.eq_ignore_ascii_case("end") {
                    tokens.push(Token::Terminator);
                } else {
                    tokens.push(Token::Group(name.to_lowercase()));
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Terminator);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Equals);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '\'' | '"' => {
                chars.next();
                tokens.push(Token::Quoted(read_quoted(&mut chars, c)?));
            }
            _ => {
                let word = read_while(&mut chars, |c| {
                    !c.is_whitespace() && !matches!(c, ',' | '=' | '!' | '/' | '\'' | '"')
                });
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

fn read_while(chars: &mut Peekable<Chars<'_>>, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !keep(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

/// Read a quoted string whose opening quote was consumed. A doubled quote
/// stands for a literal one.
fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> std::result::Result<String, String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some(c) if c == quote => {
                if chars.peek() == Some(&quote) {
                    chars.next();
                    out.push(quote);
                } else {
                    return Ok(out);
                }
            }
            Some(c) => out.push(c),
            None => return Err(format!("unterminated string starting '{}{}'", quote, out)),
        }
    }
}

type RawEntries = Vec<(String, MetadataValue)>;

fn parse_group(tokens: Vec<Token>) -> std::result::Result<(String, RawEntries), String> {
    let mut tokens = tokens.into_iter().peekable();

    let group = match tokens.next() {
        Some(Token::Group(name)) => name,
        Some(other) => return Err(format!("namelist must open with a group, found {:?}", other)),
        None => return Err("namelist is empty".to_string()),
    };

    let mut entries: RawEntries = Vec::new();

    loop {
        match tokens.next() {
            Some(Token::Terminator) => return Ok((group, entries)),
            Some(Token::Comma) => continue,
            Some(Token::Word(key)) => {
                if tokens.next() != Some(Token::Equals) {
                    return Err(format!("expected '=' after '{}'", key));
                }

                let mut values = Vec::new();
                loop {
                    match tokens.peek() {
                        None | Some(Token::Terminator) | Some(Token::Group(_)) => break,
                        Some(Token::Equals) => {
                            return Err(format!("unexpected '=' in value of '{}'", key));
                        }
                        Some(Token::Comma) => {
                            tokens.next();
                        }
                        Some(Token::Quoted(_)) => {
                            if let Some(Token::Quoted(text)) = tokens.next() {
                                values.push(MetadataValue::Text(text));
                            }
                        }
                        Some(Token::Word(_)) => {
                            // A word directly followed by '=' starts the next assignment
                            let mut lookahead = tokens.clone();
                            lookahead.next();
                            if lookahead.peek() == Some(&Token::Equals) {
                                break;
                            }
                            if let Some(Token::Word(word)) = tokens.next() {
                                // `n*` directly followed by a string repeats the string
                                let quoted_next = matches!(tokens.peek(), Some(Token::Quoted(_)));
                                let count = if quoted_next { repeat_count(&word)? } else { None };
                                match count {
                                    Some(count) => {
                                        if let Some(Token::Quoted(text)) = tokens.next() {
                                            let text = MetadataValue::Text(text);
                                            values.extend(std::iter::repeat_n(text, count));
                                        }
                                    }
                                    None => values.extend(parse_word(&word)?),
                                }
                            }
                        }
                    }
                }

                let value = match values.len() {
                    1 => values.remove(0),
                    _ => MetadataValue::List(values),
                };
                entries.push((key.to_lowercase(), value));
            }
            Some(other) => return Err(format!("unexpected {:?} in namelist", other)),
            None => return Err(format!("namelist group '{}' is not terminated", group)),
        }
    }
}

/// Interpret an unquoted value, expanding `n*value` repeats. `n*` on its own
/// stands for `n` null values.
fn parse_word(word: &str) -> std::result::Result<Vec<MetadataValue>, String> {
    if word == "*" {
        return Ok(vec![MetadataValue::Null]);
    }
    if let Some(captures) = REPEAT_PATTERN.captures(word) {
        let count = parse_count(&captures[1])?;
        let inner = &captures[2];
        let value = if inner.is_empty() {
            MetadataValue::Null
        } else {
            parse_scalar(inner)
        };
        return Ok(vec![value; count]);
    }
    Ok(vec![parse_scalar(word)])
}

/// Count of a bare `n*` word, `None` when the word is not of that shape
fn repeat_count(word: &str) -> std::result::Result<Option<usize>, String> {
    match REPEAT_PATTERN.captures(word) {
        Some(captures) if captures[2].is_empty() => parse_count(&captures[1]).map(Some),
        _ => Ok(None),
    }
}

fn parse_count(digits: &str) -> std::result::Result<usize, String> {
    let count: usize = digits
        .parse()
        .map_err(|_| format!("repeat count '{}' is not a valid count", digits))?;
    if count > MAX_REPEAT_COUNT {
        return Err(format!(
            "repeat count {} exceeds the limit of {}",
            count, MAX_REPEAT_COUNT
        ));
    }
    Ok(count)
}

fn parse_scalar(word: &str) -> MetadataValue {
    if let Ok(value) = word.parse::<i64>() {
        return MetadataValue::Integer(value);
    }
    if REAL_PATTERN.is_match(word) {
        if let Ok(value) = word.replace(['d', 'D'], "e").parse::<f64>() {
            return MetadataValue::Real(value);
        }
    }
    if TRUE_PATTERN.is_match(word) {
        return MetadataValue::Logical(true);
    }
    if FALSE_PATTERN.is_match(word) {
        return MetadataValue::Logical(false);
    }
    MetadataValue::Text(word.to_string())
}
