//! Python literal values and their textual renderings.

use std::fmt::Write;

/// A constant value appearing in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Text string with escapes decoded
    Str(String),
    /// Bytes literal, kept as written between the quotes
    Bytes(String),
    /// Integer, normalized to decimal when it fits
    Int(String),
    Float(f64),
    /// Imaginary number, kept as written
    Complex(String),
    Bool(bool),
    None,
    Ellipsis,
}

impl Literal {
    /// Rendering used for value representations (Python `repr`).
    pub fn repr(&self) -> String {
        match self {
            Literal::Str(s) => repr_str(s),
            Literal::Bytes(raw) => {
                let quote = if raw.contains('\'') && !raw.contains('"') {
                    '"'
                } else {
                    '\''
                };
                format!("b{quote}{raw}{quote}")
            }
            Literal::Int(digits) => digits.clone(),
            Literal::Float(value) => repr_float(*value),
            Literal::Complex(text) => text.clone(),
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::None => "None".to_string(),
            Literal::Ellipsis => "Ellipsis".to_string(),
        }
    }

    /// Rendering used when a literal stands in for a name (Python `str`).
    pub fn display(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            other => other.repr(),
        }
    }
}

/// A string literal split into its prefix flags and body.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub raw: bool,
    pub bytes: bool,
    pub formatted: bool,
    /// Body with escapes decoded (unless raw or bytes)
    pub value: String,
}

/// Split a string token such as `r"""text"""` into prefix and body.
pub fn parse_string(text: &str) -> Option<StringLiteral> {
    let prefix_len = text
        .find(|c: char| c == '"' || c == '\'')
        .filter(|&i| text[..i].chars().all(|c| "rRbBuUfFtT".contains(c)))?;
    let prefix = text[..prefix_len].to_ascii_lowercase();
    let rest = &text[prefix_len..];

    let quote = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        &rest[..3]
    } else {
        &rest[..1]
    };
    if rest.len() < quote.len() * 2 || !rest.ends_with(quote) {
        return None;
    }
    let body = &rest[quote.len()..rest.len() - quote.len()];

    let raw = prefix.contains('r');
    let bytes = prefix.contains('b');
    let formatted = prefix.contains('f') || prefix.contains('t');
    let value = if raw || bytes {
        body.to_string()
    } else {
        decode_escapes(body)
    };

    Some(StringLiteral {
        raw,
        bytes,
        formatted,
        value,
    })
}

/// Decode backslash escapes in a non-raw text literal.
fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut code = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                push_code_point(&mut out, code, &format!("\\{next}"));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next_if(char::is_ascii_hexdigit)).collect();
                match u32::from_str_radix(&digits, 16) {
                    Ok(code) if digits.len() == width => {
                        push_code_point(&mut out, code, &format!("\\{next}{digits}"))
                    }
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_code_point(out: &mut String, code: u32, fallback: &str) {
    match char::from_u32(code) {
        Some(ch) => out.push(ch),
        None => out.push_str(fallback),
    }
}

/// Python `repr` of a text string.
pub fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                let _ = if code < 0x100 {
                    write!(out, "\\x{code:02x}")
                } else if code < 0x10000 {
                    write!(out, "\\u{code:04x}")
                } else {
                    write!(out, "\\U{code:08x}")
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python `repr` of a float: shortest round-trip digits, exponent form
/// outside `1e-4 <= |x| < 1e16` with a signed, two-digit exponent.
pub fn repr_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Parse an integer token, normalizing to decimal.
pub fn parse_int(text: &str) -> Literal {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    if cleaned.ends_with(['j', 'J']) {
        return Literal::Complex(cleaned);
    }
    let cleaned = cleaned.trim_end_matches(['l', 'L']).to_ascii_lowercase();

    let parsed = if let Some(hex) = cleaned.strip_prefix("0x") {
        u128::from_str_radix(hex, 16)
    } else if let Some(oct) = cleaned.strip_prefix("0o") {
        u128::from_str_radix(oct, 8)
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        u128::from_str_radix(bin, 2)
    } else {
        cleaned.parse::<u128>()
    };

    match parsed {
        Ok(value) => Literal::Int(value.to_string()),
        Err(_) => Literal::Int(cleaned),
    }
}

/// Parse a float token.
pub fn parse_float(text: &str) -> Literal {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    if cleaned.ends_with(['j', 'J']) {
        return Literal::Complex(cleaned);
    }
    match cleaned.parse::<f64>() {
        Ok(value) => Literal::Float(value),
        Err(_) => Literal::Complex(cleaned),
    }
}

/// Normalize docstring indentation the way `inspect.cleandoc` does.
pub fn clean_doc(doc: &str) -> String {
    let mut lines: Vec<String> = doc.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_width(line))
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            let cut = margin.min(indent_width(line));
            *line = line[cut..].to_string();
        }
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.trim().is_empty()).count();

    lines[leading..].join("\n")
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_strings() {
        let s = parse_string("'hello'").unwrap();
        assert_eq!(s.value, "hello");
        assert!(!s.raw && !s.bytes && !s.formatted);

        let s = parse_string("\"\"\"multi\nline\"\"\"").unwrap();
        assert_eq!(s.value, "multi\nline");
    }

    #[test]
    fn test_parse_prefixed_strings() {
        let s = parse_string(r#"r"a\nb""#).unwrap();
        assert!(s.raw);
        assert_eq!(s.value, r"a\nb");

        assert!(parse_string("b'\\x00'").unwrap().bytes);
        assert!(parse_string("f'{x}'").unwrap().formatted);
        assert!(parse_string("Rb'x'").unwrap().raw);
    }

    #[test]
    fn test_decode_escapes() {
        let s = parse_string(r#""tab\there\n\x41é\101\\""#).unwrap();
        assert_eq!(s.value, "tab\there\nA\u{e9}A\\");
    }

    #[test]
    fn test_unknown_escape_kept() {
        let s = parse_string(r#""\d+""#).unwrap();
        assert_eq!(s.value, "\\d+");
    }

    #[test]
    fn test_repr_str_quoting() {
        assert_eq!(repr_str("abc"), "'abc'");
        assert_eq!(repr_str("it's"), "\"it's\"");
        assert_eq!(repr_str("a'b\"c"), "'a\\'b\"c'");
        assert_eq!(repr_str("line\n"), "'line\\n'");
        assert_eq!(repr_str("\u{01}"), "'\\x01'");
        assert_eq!(repr_str("caf\u{e9}"), "'caf\u{e9}'");
    }

    #[test]
    fn test_repr_float() {
        assert_eq!(repr_float(1.0), "1.0");
        assert_eq!(repr_float(0.1), "0.1");
        assert_eq!(repr_float(1e16), "1e+16");
        assert_eq!(repr_float(1.5e-7), "1.5e-07");
        assert_eq!(repr_float(123.456), "123.456");
    }

    #[test]
    fn test_parse_int_normalizes() {
        assert_eq!(parse_int("1_000"), Literal::Int("1000".to_string()));
        assert_eq!(parse_int("0x10"), Literal::Int("16".to_string()));
        assert_eq!(parse_int("0o17"), Literal::Int("15".to_string()));
        assert_eq!(parse_int("0b101"), Literal::Int("5".to_string()));
        assert_eq!(parse_int("3j"), Literal::Complex("3j".to_string()));
    }

    #[test]
    fn test_literal_repr_and_display() {
        assert_eq!(Literal::Str("x".to_string()).repr(), "'x'");
        assert_eq!(Literal::Str("x".to_string()).display(), "x");
        assert_eq!(Literal::Bool(true).repr(), "True");
        assert_eq!(Literal::None.display(), "None");
        assert_eq!(Literal::Bytes("ab".to_string()).repr(), "b'ab'");
        assert_eq!(parse_float("2.50").repr(), "2.5");
    }

    #[test]
    fn test_clean_doc() {
        let doc = "\n    Summary line.\n\n        Indented detail.\n    Back.\n    ";
        assert_eq!(clean_doc(doc), "Summary line.\n\n    Indented detail.\nBack.");
        assert_eq!(clean_doc("  one line  "), "one line  ");
        assert_eq!(clean_doc("First\n\tTabbed"), "First\nTabbed");
    }
}
