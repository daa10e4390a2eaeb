//! Rendering and decoding of Rust string literals.

/// How a snapshot literal is spelled in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralStyle {
    /// `"..."` with escapes. `multiline` literals keep real line breaks.
    Quoted { multiline: bool },
    /// `r"..."`, `r#"..."#`, ... without escapes.
    Raw { hashes: usize },
}

impl LiteralStyle {
    /// Detect the style from the literal's source text. Byte and C strings are not snapshots.
    pub fn of(source: &str) -> Option<Self> {
        if source.starts_with('"') {
            return Some(Self::Quoted {
                multiline: source.contains('\n'),
            });
        }
        let rest = source.strip_prefix('r')?;
        let hashes = rest.bytes().take_while(|&b| b == b'#').count();
        rest[hashes..]
            .starts_with('"')
            .then_some(Self::Raw { hashes })
    }
}

/// Spell `text` as a literal of the given style.
///
/// Raw literals get as many `#` as needed so that no `"#..` sequence in `text` closes them
/// early. A raw literal cannot carry a carriage return, so such text falls back to a quoted
/// literal.
pub fn render(style: LiteralStyle, text: &str) -> String {
    match style {
        LiteralStyle::Raw { .. } if text.contains('\r') => {
            render(LiteralStyle::Quoted { multiline: true }, text)
        }
        LiteralStyle::Raw { hashes } => {
            let fence = "#".repeat(hashes.max(required_hashes(text)));
            format!("r{fence}\"{text}\"{fence}")
        }
        LiteralStyle::Quoted { multiline } => {
            let mut out = String::with_capacity(text.len() + 2);
            out.push('"');
            for c in text.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\n' if multiline => out.push('\n'),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '\0' => out.push_str("\\0"),
                    c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
                    c => out.push(c),
                }
            }
            out.push('"');
            out
        }
    }
}

/// Smallest `#` count that lets `text` sit inside a raw literal.
fn required_hashes(text: &str) -> usize {
    text.match_indices('"')
        .map(|(at, _)| {
            let run = text[at + 1..].bytes().take_while(|&b| b == b'#').count();
            run + 1
        })
        .max()
        .unwrap_or(0)
}

/// Decode the value of a string literal from its source text.
pub fn decode(source: &str) -> Option<String> {
    match LiteralStyle::of(source)? {
        LiteralStyle::Raw { hashes } => {
            let fence = "#".repeat(hashes);
            let body = source[1 + hashes..].strip_prefix('"')?;
            let body = body.strip_suffix(fence.as_str())?.strip_suffix('"')?;
            Some(body.to_string())
        }
        LiteralStyle::Quoted { .. } => {
            let body = source.strip_prefix('"')?.strip_suffix('"')?;
            unescape(body)
        }
    }
}

fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                '\'' => out.push('\''),
                'x' => {
                    let hex: String = chars.by_ref().take(2).collect();
                    let byte = u8::from_str_radix(&hex, 16).ok()?;
                    out.push(char::from(byte));
                }
                'u' => {
                    if chars.next()? != '{' {
                        return None;
                    }
                    let hex: String = chars.by_ref().take_while(|&c| c != '}').collect();
                    let code = u32::from_str_radix(&hex.replace('_', ""), 16).ok()?;
                    out.push(char::from_u32(code)?);
                }
                // Line continuation: skip the break and the next line's leading whitespace.
                '\n' | '\r' => {
                    while chars.next_if(|c| c.is_whitespace()).is_some() {}
                }
                _ => return None,
            },
            '\r' if chars.peek() == Some(&'\n') => {}
            c => out.push(c),
        }
    }
    Some(out)
}
