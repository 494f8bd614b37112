use std::fs::File;
use std::io::Read;
use std::path::Path;

/// First read size; doubled on every refill until the clause resolves.
const INITIAL_CHUNK: usize = 4 * 1024;

/// Extracts the declared package name from the head of a Go source file.
///
/// Create one scanner per walker thread. The read buffer is reused across
/// files; no state survives a single `scan` call.
pub struct DeclScanner {
    buf: Vec<u8>,
}

impl DeclScanner {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(INITIAL_CHUNK),
        }
    }

    /// Returns the declared package name, or `None` when the file cannot be
    /// read or does not start with a well-formed package clause. A malformed
    /// file never aborts the caller; everything past the clause is ignored.
    pub fn scan(&mut self, path: &Path) -> Option<String> {
        let mut file = File::open(path).ok()?;
        self.buf.clear();

        let mut chunk = INITIAL_CHUNK;
        loop {
            let read = (&mut file)
                .take(chunk as u64)
                .read_to_end(&mut self.buf)
                .ok()?;
            let eof = read < chunk;
            match parse_package_clause(&self.buf, eof) {
                Clause::Found(name) => return Some(name.to_string()),
                Clause::Invalid => return None,
                Clause::NeedMore if eof => return None,
                Clause::NeedMore => chunk *= 2,
            }
        }
    }
}

impl Default for DeclScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Clause<'a> {
    Found(&'a str),
    /// The clause may still resolve with more input.
    NeedMore,
    Invalid,
}

/// Lexes `input` up to the package clause: optional BOM, then whitespace and
/// comments, then `package <identifier>`. `eof` marks `input` as the whole
/// file, turning still-open constructs into failures.
fn parse_package_clause(input: &[u8], eof: bool) -> Clause<'_> {
    let src = match std::str::from_utf8(input) {
        Ok(src) => src,
        // An incomplete multi-byte sequence at the buffer edge resolves on
        // the next refill; anything else is an encoding error.
        Err(err) if err.error_len().is_none() && !eof => return Clause::NeedMore,
        Err(_) => return Clause::Invalid,
    };
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);

    let rest = match skip_blank(src) {
        Blank::Token(rest) => rest,
        Blank::Exhausted | Blank::Open => {
            return if eof { Clause::Invalid } else { Clause::NeedMore };
        }
    };

    const KEYWORD: &str = "package";
    let after = match rest.strip_prefix(KEYWORD) {
        Some(after) => after,
        None if !eof && KEYWORD.starts_with(rest) => return Clause::NeedMore,
        None => return Clause::Invalid,
    };

    // A longer identifier such as `packages` is not the keyword.
    if after.chars().next().is_some_and(is_ident_char) {
        return Clause::Invalid;
    }

    let name_start = match skip_blank(after) {
        Blank::Token(rest) => rest,
        Blank::Exhausted | Blank::Open => {
            return if eof { Clause::Invalid } else { Clause::NeedMore };
        }
    };

    let end = name_start
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map(|(i, _)| i)
        .unwrap_or(name_start.len());
    if end == name_start.len() && !eof {
        // The name may continue past the end of the buffer.
        return Clause::NeedMore;
    }

    let name = &name_start[..end];
    match name.chars().next() {
        Some(c) if is_ident_start(c) => Clause::Found(name),
        _ => Clause::Invalid,
    }
}

enum Blank<'a> {
    /// The next token starts here.
    Token(&'a str),
    /// Clean end of input after blanks.
    Exhausted,
    /// Input ends inside a comment or a possible comment opener.
    Open,
}

fn skip_blank(mut rest: &str) -> Blank<'_> {
    loop {
        rest = rest.trim_start_matches([' ', '\t', '\r', '\n']);
        if rest.is_empty() {
            return Blank::Exhausted;
        }
        if let Some(after) = rest.strip_prefix("//") {
            match after.find('\n') {
                Some(i) => rest = &after[i + 1..],
                None => return Blank::Open,
            }
        } else if let Some(after) = rest.strip_prefix("/*") {
            match after.find("*/") {
                Some(i) => rest = &after[i + 2..],
                None => return Blank::Open,
            }
        } else if rest == "/" {
            return Blank::Open;
        } else {
            return Blank::Token(rest);
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_numeric()
}
