//! Input resolution for text commands.

use crate::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Resolves command input from, in order: the positional argument, a file, or
/// the given reader (normally stdin).
///
/// A single trailing newline is stripped from file and reader input.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if both text and a file are given, or if
/// the file or reader cannot be read as UTF-8.
pub fn read_input<R: Read>(text: Option<String>, file: Option<&Path>, mut reader: R) -> Result<String> {
    match (text, file) {
        (Some(_), Some(_)) => Err(Error::InvalidInput(
            "pass either TEXT or --file, not both".to_string(),
        )),
        (Some(text), None) => Ok(text),
        (None, Some(path)) => {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                Error::InvalidInput(format!("cannot read {}: {e}", path.display()))
            })?;
            Ok(strip_trailing_newline(contents))
        },
        (None, None) => {
            let mut contents = String::new();
            reader
                .read_to_string(&mut contents)
                .map_err(|e| Error::InvalidInput(format!("cannot read stdin: {e}")))?;
            Ok(strip_trailing_newline(contents))
        },
    }
}

fn strip_trailing_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}
