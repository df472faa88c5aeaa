//! Pattern parsing for the automaton pipeline
//!
//! Recursive descent over the pattern bytes, producing a small syntax tree.
//! The supported subset: literals (including escaped punctuation and
//! `\xNN`), the class escapes `\d \D \w \W \s \S`, bracket classes with
//! ranges and negation, `.`, grouping (plain and `(?:`), alternation, the
//! quantifiers `* + ? {m} {m,} {m,n}`, and `^`/`$` anchors at the pattern
//! edges. Everything else is rejected so overlap verification can fail
//! closed rather than guess.

use thiserror::Error;

use super::class::ByteClass;

/// Counted repetitions beyond this bound make the NFA expansion explode.
const MAX_REPEAT: u32 = 64;

/// Why a pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Not valid regex syntax at all.
    #[error("invalid pattern: {0}")]
    Invalid(String),

    /// Valid for a richer engine, but outside the verifiable subset.
    #[error("unsupported pattern construct: {0}")]
    Unsupported(String),

    /// Within the subset, but compilation would exceed resource bounds.
    #[error("pattern too complex to verify: {0}")]
    TooComplex(String),
}

/// Pattern syntax tree.
#[derive(Debug, Clone)]
pub enum Ast {
    /// Matches the empty string.
    Empty,
    /// Matches one byte drawn from the class.
    Class(ByteClass),
    Concat(Vec<Ast>),
    Alt(Vec<Ast>),
    Repeat {
        node: Box<Ast>,
        min: u32,
        max: Option<u32>,
    },
}

/// A parsed pattern plus its edge anchors.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub ast: Ast,
    pub anchored_start: bool,
    pub anchored_end: bool,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let bytes = source.as_bytes();
        let mut anchored_start = false;
        let mut pos = 0;
        if bytes.first() == Some(&b'^') {
            anchored_start = true;
            pos = 1;
        }

        let mut parser = Parser {
            bytes,
            pos,
            anchored_end: false,
            top_level_alt: false,
        };
        let ast = parser.alternation(0)?;
        if parser.pos != parser.bytes.len() {
            return Err(PatternError::Invalid(format!(
                "unmatched ')' at byte {}",
                parser.pos
            )));
        }

        // "^a|b" would silently become "^(a|b)" under edge-anchor handling;
        // refuse the ambiguous combination instead.
        if parser.top_level_alt && (anchored_start || parser.anchored_end) {
            return Err(PatternError::Unsupported(
                "anchor combined with top-level alternation (group the alternation)".into(),
            ));
        }

        Ok(Pattern {
            ast,
            anchored_start,
            anchored_end: parser.anchored_end,
        })
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    anchored_end: bool,
    top_level_alt: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }

    fn alternation(&mut self, depth: usize) -> Result<Ast, PatternError> {
        let mut branches = vec![self.concat(depth)?];
        while self.peek() == Some(b'|') {
            self.pos += 1;
            branches.push(self.concat(depth)?);
        }
        if branches.len() == 1 {
            return Ok(branches.pop().unwrap_or(Ast::Empty));
        }
        if depth == 0 {
            self.top_level_alt = true;
        }
        Ok(Ast::Alt(branches))
    }

    fn concat(&mut self, depth: usize) -> Result<Ast, PatternError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'|') | Some(b')') => break,
                Some(b'$') => {
                    // An anchor only at the very last byte of the pattern.
                    if self.pos == self.bytes.len() - 1 && depth == 0 {
                        self.anchored_end = true;
                        self.pos += 1;
                        break;
                    }
                    return Err(PatternError::Unsupported(
                        "'$' anchor away from the pattern end".into(),
                    ));
                }
                Some(b'^') => {
                    return Err(PatternError::Unsupported(
                        "'^' anchor away from the pattern start".into(),
                    ));
                }
                _ => {
                    let atom = self.atom(depth)?;
                    parts.push(self.quantified(atom)?);
                }
            }
        }
        Ok(match parts.len() {
            0 => Ast::Empty,
            1 => parts.pop().unwrap_or(Ast::Empty),
            _ => Ast::Concat(parts),
        })
    }

    fn atom(&mut self, depth: usize) -> Result<Ast, PatternError> {
        match self.bump() {
            None => Err(PatternError::Invalid("unexpected end of pattern".into())),
            Some(b'(') => {
                if self.peek() == Some(b'?') {
                    // Only the non-capturing marker is a plain group; every
                    // other (?... extension changes matching semantics.
                    if self.bytes.get(self.pos + 1) == Some(&b':') {
                        self.pos += 2;
                    } else {
                        let tag = self
                            .bytes
                            .get(self.pos + 1)
                            .map(|&b| b as char)
                            .unwrap_or('?');
                        return Err(PatternError::Unsupported(format!(
                            "group extension '(?{tag}'"
                        )));
                    }
                }
                let inner = self.alternation(depth + 1)?;
                if self.bump() != Some(b')') {
                    return Err(PatternError::Invalid("unclosed group".into()));
                }
                Ok(inner)
            }
            Some(b'[') => self.class(),
            Some(b'.') => Ok(Ast::Class(ByteClass::dot())),
            Some(b'\\') => self.escape().map(Ast::Class),
            Some(b'*') | Some(b'+') | Some(b'?') => {
                Err(PatternError::Invalid("quantifier with nothing to repeat".into()))
            }
            Some(byte) => Ok(Ast::Class(ByteClass::single(byte))),
        }
    }

    /// Apply at most one quantifier to an atom.
    fn quantified(&mut self, atom: Ast) -> Result<Ast, PatternError> {
        let bounds = match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                Some((0, None))
            }
            Some(b'+') => {
                self.pos += 1;
                Some((1, None))
            }
            Some(b'?') => {
                self.pos += 1;
                Some((0, Some(1)))
            }
            Some(b'{') => self.counted()?,
            _ => None,
        };
        let Some((min, max)) = bounds else {
            return Ok(atom);
        };
        if min > MAX_REPEAT || max.unwrap_or(0) > MAX_REPEAT {
            return Err(PatternError::TooComplex(format!(
                "repetition bound above {MAX_REPEAT}"
            )));
        }
        if let Some(max) = max {
            if max < min {
                return Err(PatternError::Invalid(format!(
                    "repetition range {{{min},{max}}} is inverted"
                )));
            }
        }
        Ok(Ast::Repeat {
            node: Box::new(atom),
            min,
            max,
        })
    }

    /// Try to read `{m}`, `{m,}` or `{m,n}` at the cursor. A brace that does
    /// not form a counted repetition is a literal and nothing is consumed.
    fn counted(&mut self) -> Result<Option<(u32, Option<u32>)>, PatternError> {
        let mut cursor = self.pos + 1;
        let min = match read_number(self.bytes, &mut cursor) {
            Some(n) => n,
            None => return Ok(None),
        };
        let (max, end) = match self.bytes.get(cursor) {
            Some(b'}') => (Some(min), cursor + 1),
            Some(b',') => {
                cursor += 1;
                match self.bytes.get(cursor) {
                    Some(b'}') => (None, cursor + 1),
                    _ => {
                        let n = match read_number(self.bytes, &mut cursor) {
                            Some(n) => n,
                            None => return Ok(None),
                        };
                        if self.bytes.get(cursor) != Some(&b'}') {
                            return Ok(None);
                        }
                        (Some(n), cursor + 1)
                    }
                }
            }
            _ => return Ok(None),
        };
        self.pos = end;
        Ok(Some((min, max)))
    }

    fn escape(&mut self) -> Result<ByteClass, PatternError> {
        match self.bump() {
            None => Err(PatternError::Invalid("dangling escape".into())),
            Some(b'd') => Ok(ByteClass::digits()),
            Some(b'D') => Ok(ByteClass::digits().negate()),
            Some(b'w') => Ok(ByteClass::word()),
            Some(b'W') => Ok(ByteClass::word().negate()),
            Some(b's') => Ok(ByteClass::whitespace()),
            Some(b'S') => Ok(ByteClass::whitespace().negate()),
            Some(b'n') => Ok(ByteClass::single(b'\n')),
            Some(b't') => Ok(ByteClass::single(b'\t')),
            Some(b'r') => Ok(ByteClass::single(b'\r')),
            Some(b'f') => Ok(ByteClass::single(0x0c)),
            Some(b'v') => Ok(ByteClass::single(0x0b)),
            Some(b'0') => Ok(ByteClass::single(0x00)),
            Some(b'x') => self.hex_escape().map(ByteClass::single),
            Some(b'1'..=b'9') => Err(PatternError::Unsupported("backreference".into())),
            Some(b @ (b'b' | b'B' | b'A' | b'z' | b'Z')) => Err(PatternError::Unsupported(
                format!("zero-width assertion '\\{}'", b as char),
            )),
            Some(b) if b.is_ascii_alphanumeric() => Err(PatternError::Unsupported(format!(
                "escape '\\{}'",
                b as char
            ))),
            Some(b) => Ok(ByteClass::single(b)),
        }
    }

    fn hex_escape(&mut self) -> Result<u8, PatternError> {
        let hi = self.bump().and_then(hex_digit);
        let lo = self.bump().and_then(hex_digit);
        match (hi, lo) {
            (Some(hi), Some(lo)) => Ok(hi * 16 + lo),
            _ => Err(PatternError::Invalid("malformed \\x escape".into())),
        }
    }

    /// Bracket class body, after the opening `[`.
    fn class(&mut self) -> Result<Ast, PatternError> {
        let negated = if self.peek() == Some(b'^') {
            self.pos += 1;
            true
        } else {
            false
        };

        let mut ranges: Vec<(u8, u8)> = Vec::new();
        let mut first = true;
        loop {
            if !first && self.peek() == Some(b']') {
                self.pos += 1;
                break;
            }
            let item = self.class_item()?;
            first = false;

            let lo = match item {
                ClassItem::Set(set) => {
                    ranges.extend_from_slice(set.ranges());
                    continue;
                }
                ClassItem::Byte(b) => b,
            };

            // A '-' forms a range unless it closes the class.
            if self.peek() == Some(b'-') && self.bytes.get(self.pos + 1) != Some(&b']') {
                self.pos += 1;
                let hi = match self.class_item()? {
                    ClassItem::Byte(b) => b,
                    ClassItem::Set(_) => {
                        return Err(PatternError::Invalid(
                            "class escape as a range endpoint".into(),
                        ));
                    }
                };
                if lo > hi {
                    return Err(PatternError::Invalid(format!(
                        "inverted class range {}-{}",
                        lo as char, hi as char
                    )));
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }

        let mut class = ByteClass::from_ranges(ranges);
        if negated {
            class = class.negate();
        }
        Ok(Ast::Class(class))
    }

    fn class_item(&mut self) -> Result<ClassItem, PatternError> {
        match self.bump() {
            None => Err(PatternError::Invalid("unterminated character class".into())),
            Some(b'\\') => match self.escape()? {
                set if set.ranges().len() == 1 && set.ranges()[0].0 == set.ranges()[0].1 => {
                    Ok(ClassItem::Byte(set.ranges()[0].0))
                }
                set => Ok(ClassItem::Set(set)),
            },
            Some(b) if b >= 0x80 => Err(PatternError::Unsupported(
                "non-ASCII byte in character class".into(),
            )),
            Some(b) => Ok(ClassItem::Byte(b)),
        }
    }
}

enum ClassItem {
    Byte(u8),
    Set(ByteClass),
}

fn read_number(bytes: &[u8], cursor: &mut usize) -> Option<u32> {
    let start = *cursor;
    let mut value: u32 = 0;
    while let Some(b @ b'0'..=b'9') = bytes.get(*cursor) {
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
        *cursor += 1;
    }
    (*cursor > start).then_some(value)
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Pattern, PatternError> {
        Pattern::parse(source)
    }

    #[test]
    fn test_anchors_at_edges() {
        let p = parse("^rm -rf$").unwrap();
        assert!(p.anchored_start);
        assert!(p.anchored_end);

        let p = parse("rm").unwrap();
        assert!(!p.anchored_start);
        assert!(!p.anchored_end);
    }

    #[test]
    fn test_misplaced_anchors_rejected() {
        assert!(matches!(parse("a$b"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse("a^b"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse("(a$)"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse("^a|b"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse("a|b$"), Err(PatternError::Unsupported(_))));
        // Grouped alternation with edge anchors stays unambiguous.
        assert!(parse("^(a|b)$").is_ok());
    }

    #[test]
    fn test_unsupported_extensions() {
        assert!(matches!(parse("(?=a)"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse("(?!a)"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse("(?P<n>a)"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse(r"(a)\1"), Err(PatternError::Unsupported(_))));
        assert!(matches!(parse(r"\bx"), Err(PatternError::Unsupported(_))));
        assert!(parse("(?:ab)+").is_ok());
    }

    #[test]
    fn test_counted_repetition() {
        assert!(parse("a{3}").is_ok());
        assert!(parse("a{2,}").is_ok());
        assert!(parse("a{2,5}").is_ok());
        assert!(matches!(parse("a{5,2}"), Err(PatternError::Invalid(_))));
        assert!(matches!(parse("a{1000}"), Err(PatternError::TooComplex(_))));
        // Braces that do not form a repetition stay literal, as in the
        // runtime matcher.
        assert!(parse("a{").is_ok());
        assert!(parse("${HOME}").is_err()); // '$' mid-pattern is an anchor error
        assert!(parse(r"\$\{HOME\}").is_ok());
    }

    #[test]
    fn test_classes() {
        assert!(parse("[a-z0-9_]").is_ok());
        assert!(parse("[^/]+").is_ok());
        assert!(parse(r"[\d\s]").is_ok());
        assert!(parse("[]a]").is_ok());
        assert!(parse("[a-]").is_ok());
        assert!(matches!(parse("[z-a]"), Err(PatternError::Invalid(_))));
        assert!(matches!(parse("[abc"), Err(PatternError::Invalid(_))));
    }

    #[test]
    fn test_invalid_syntax() {
        assert!(matches!(parse("(ab"), Err(PatternError::Invalid(_))));
        assert!(matches!(parse("ab)"), Err(PatternError::Invalid(_))));
        assert!(matches!(parse("*a"), Err(PatternError::Invalid(_))));
        assert!(matches!(parse(r"trailing\"), Err(PatternError::Invalid(_))));
        assert!(matches!(parse(r"\xZZ"), Err(PatternError::Invalid(_))));
    }
}
