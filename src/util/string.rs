//! Utilities for handling strings

/// Splits a list given as a single string into its entries
///
/// Entries may be separated by commas or newlines (as found in config files),
/// surrounding whitespace is trimmed and empty entries are dropped. Order is preserved.
/// # Arguments
/// * `list` - The string to split
pub fn split_list(list: &str) -> Vec<String> {
    list.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
