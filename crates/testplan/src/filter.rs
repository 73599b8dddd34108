//! HU (Historia de Usuario) detection by file name.

/// Whether `name` marks a user-story document: it contains `"hu"`,
/// case-insensitively, anywhere in the name.
#[must_use]
pub fn is_hu_filename(name: &str) -> bool {
    name.to_lowercase().contains("hu")
}

/// File name without its last extension; the whole name when there is none.
#[must_use]
pub fn stem_of(filename: &str) -> &str {
    filename.rsplit_once('.').map_or(filename, |(stem, _)| stem)
}
