//! RTF to plain text

use std::iter::Peekable;
use std::str::Chars;

/// Destinations whose groups carry no body text
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "headerl",
    "headerr",
    "headerf",
    "footer",
    "footerl",
    "footerr",
    "footerf",
    "fldinst",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "filetbl",
    "revtbl",
];

/// Group state restored on `}`
#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    /// Fallback characters that follow a `\uN` escape
    unicode_skip: usize,
}

/// Strip RTF markup, keeping the visible text
///
/// Paragraph and line breaks become newlines, tabs and table cells become
/// tabs. `\'hh` escapes are read as Latin-1 and `\uN` escapes as Unicode.
pub fn rtf_to_text(rtf: &str) -> String {
    let mut out = String::new();
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState {
        skip: false,
        unicode_skip: 1,
    };
    // Fallback characters still to drop after a `\uN`
    let mut pending = 0usize;
    let mut chars = rtf.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                stack.push(state);
                pending = 0;
            }
            '}' => {
                if let Some(outer) = stack.pop() {
                    state = outer;
                }
                pending = 0;
            }
            '\\' => match chars.peek().copied() {
                None => break,
                Some(ch) if ch.is_ascii_alphabetic() => {
                    let (word, param) = control_word(&mut chars);
                    match word.as_str() {
                        "par" | "line" | "row" | "sect" | "page" => emit(&mut out, &state, '\n'),
                        "tab" | "cell" => emit(&mut out, &state, '\t'),
                        "uc" => state.unicode_skip = param.unwrap_or(1).max(0) as usize,
                        "u" => {
                            if let Some(code) = param {
                                let code = if code < 0 { code + 65536 } else { code };
                                let ch = char::from_u32(code as u32).unwrap_or('\u{fffd}');
                                emit(&mut out, &state, ch);
                                pending = state.unicode_skip;
                            }
                        }
                        "emdash" => emit(&mut out, &state, '\u{2014}'),
                        "endash" => emit(&mut out, &state, '\u{2013}'),
                        "bullet" => emit(&mut out, &state, '\u{2022}'),
                        "lquote" | "rquote" => emit(&mut out, &state, '\''),
                        "ldblquote" | "rdblquote" => emit(&mut out, &state, '"'),
                        w if SKIPPED_DESTINATIONS.contains(&w) => state.skip = true,
                        _ => {}
                    }
                }
                Some('*') => {
                    chars.next();
                    state.skip = true;
                }
                Some('\'') => {
                    chars.next();
                    let hex: String = chars.by_ref().take(2).collect();
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        if pending > 0 {
                            pending -= 1;
                        } else {
                            emit(&mut out, &state, byte as char);
                        }
                    }
                }
                Some(ch) => {
                    chars.next();
                    match ch {
                        '\\' | '{' | '}' => emit(&mut out, &state, ch),
                        '~' => emit(&mut out, &state, ' '),
                        '_' => emit(&mut out, &state, '-'),
                        '\n' | '\r' => emit(&mut out, &state, '\n'),
                        _ => {}
                    }
                }
            },
            '\r' | '\n' => {}
            _ => {
                if pending > 0 {
                    pending -= 1;
                } else {
                    emit(&mut out, &state, c);
                }
            }
        }
    }

    out.trim().to_string()
}

fn emit(out: &mut String, state: &GroupState, ch: char) {
    if !state.skip {
        out.push(ch);
    }
}

/// Read a control word and its optional numeric parameter; one delimiting
/// space is consumed
fn control_word(chars: &mut Peekable<Chars<'_>>) -> (String, Option<i32>) {
    let mut word = String::new();
    while let Some(&ch) = chars.peek() {
        if !ch.is_ascii_alphabetic() {
            break;
        }
        word.push(ch);
        chars.next();
    }

    let mut digits = String::new();
    if chars.peek() == Some(&'-') {
        digits.push('-');
        chars.next();
    }
    while let Some(&ch) = chars.peek() {
        if !ch.is_ascii_digit() {
            break;
        }
        digits.push(ch);
        chars.next();
    }

    if chars.peek() == Some(&' ') {
        chars.next();
    }

    (word, digits.parse().ok())
}
