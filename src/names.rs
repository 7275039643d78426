//! Sign-in cell parsing.
//!
//! A role cell lists zero or more participants separated by `/`, for example
//! `"Alice / Bob"`. Placeholders written into the sheet instead of a name are
//! dropped.

/// Separator between names inside one cell.
pub const NAME_SEPARATOR: char = '/';

/// Written in place of a name when the slot is temporarily inactive.
pub const INACTIVE_PLACEHOLDER: &str = "暫停";

/// Literal left behind by spreadsheet exports for blank numeric cells.
pub const NAN_LITERAL: &str = "NaN";

/// Splits a cell into participant names.
///
/// Order follows the cell; a name listed twice is returned twice.
pub fn extract_names(cell: Option<&str>) -> Vec<String> {
    let Some(cell) = cell else {
        return Vec::new();
    };

    cell.split(NAME_SEPARATOR)
        .map(str::trim)
        .filter(|name| is_name(name))
        .map(str::to_string)
        .collect()
}

fn is_name(piece: &str) -> bool {
    !piece.is_empty() && piece != NAN_LITERAL && piece != INACTIVE_PLACEHOLDER
}
