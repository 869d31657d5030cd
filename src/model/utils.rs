/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use crate::constants::IDENTIFIER_LENGTH;

/// Heuristic separating opaque identifiers from human codes.
///
/// A value of at least [`IDENTIFIER_LENGTH`] characters (the length of a
/// UUID) is used as an identifier as-is. Anything shorter is treated as a
/// code and resolved through a lookup first. No further format validation is
/// applied.
#[must_use]
pub fn is_opaque_identifier(value: &str) -> bool {
    value.chars().count() >= IDENTIFIER_LENGTH
}

/// Truncates `text` to at most `max_chars` characters, on a char boundary
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
