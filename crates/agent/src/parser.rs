//! Action parser — extracts `ACTION: tool({...})` directives from model output.
//!
//! Grammar, case-sensitive, matched anywhere in the text:
//!
//! ```text
//! directive = "ACTION:" ws* ident ws* "(" ws* object ws* ")"
//! ident     = [A-Za-z_][A-Za-z0-9_]*
//! object    = "{" ... "}"        (may span lines)
//! ```
//!
//! The object's extent is found with a brace-balanced scan that skips over
//! JSON string literals. When that does not yield `{...} ws* )` (the text
//! ends mid-object, or something other than `)` follows the object), the
//! shortest `{ ... } ws* )` span is taken instead. A payload that is not a
//! JSON object still yields a directive, with empty arguments.

use synapse_core::action::ActionDirective;

pub const ACTION_MARKER: &str = "ACTION:";

/// Lazily parse every directive in `text`, in textual order.
///
/// The returned iterator is `Clone`; cloning it restarts from the same
/// position.
pub fn parse_actions(text: &str) -> Actions<'_> {
    Actions { text, pos: 0 }
}

#[derive(Debug, Clone)]
pub struct Actions<'a> {
    text: &'a str,
    pos: usize,
}

impl Iterator for Actions<'_> {
    type Item = ActionDirective;

    fn next(&mut self) -> Option<ActionDirective> {
        while let Some(offset) = self.text[self.pos..].find(ACTION_MARKER) {
            let start = self.pos + offset;
            match scan_directive(self.text, start) {
                Some(directive) => {
                    self.pos = directive.span.end;
                    return Some(directive);
                }
                None => self.pos = start + ACTION_MARKER.len(),
            }
        }
        self.pos = self.text.len();
        None
    }
}

impl std::iter::FusedIterator for Actions<'_> {}

/// Try to read one directive whose marker begins at `start`.
fn scan_directive(text: &str, start: usize) -> Option<ActionDirective> {
    let bytes = text.as_bytes();
    let mut i = skip_ws(bytes, start + ACTION_MARKER.len());

    let name_start = i;
    if !bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') {
        return None;
    }
    while bytes.get(i).is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') {
        i += 1;
    }
    let name = &text[name_start..i];

    i = skip_ws(bytes, i);
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i = skip_ws(bytes, i + 1);
    if bytes.get(i) != Some(&b'{') {
        return None;
    }
    let object_start = i;

    let (object_end, end) = balanced_object(bytes, object_start)
        .and_then(|close| closing_paren(bytes, close + 1).map(|end| (close + 1, end)))
        .or_else(|| shortest_object(bytes, object_start))?;

    let span = start..end;
    let payload = &text[object_start..object_end];
    Some(match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(args)) => ActionDirective::new(name, args, span),
        Ok(_) => ActionDirective::with_malformed_args(name, span, "payload is not a JSON object"),
        Err(e) => ActionDirective::with_malformed_args(name, span, e.to_string()),
    })
}

/// Index of the `}` closing the object opened at `open`, honoring string
/// literals and escapes. `None` if the text ends first.
fn balanced_object(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// The shortest `{ ... } ws* )` starting at `open`: (object end, directive end).
fn shortest_object(bytes: &[u8], open: usize) -> Option<(usize, usize)> {
    bytes
        .iter()
        .enumerate()
        .skip(open + 1)
        .filter(|(_, b)| **b == b'}')
        .find_map(|(close, _)| closing_paren(bytes, close + 1).map(|end| (close + 1, end)))
}

/// If `ws* )` follows at `from`, the index just past the `)`.
fn closing_paren(bytes: &[u8], from: usize) -> Option<usize> {
    let i = skip_ws(bytes, from);
    (bytes.get(i) == Some(&b')')).then_some(i + 1)
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

/// Convenience for callers that want every directive at once.
pub fn collect_actions(text: &str) -> Vec<ActionDirective> {
    parse_actions(text).collect()
}
