//! Filesystem-safe transliteration of decoded values.

/// Characters that are illegal in a filename on at least one filesystem
/// the output directory might live on. The union of the Windows-reserved
/// set and the path separators; control characters are rejected too.
const ILLEGAL: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace every character illegal in a filename with an underscore.
///
/// An empty decoded value becomes a single underscore so the composed
/// output name never starts with its index.
pub fn safe_file_name(value: &str) -> String {
    if value.is_empty() {
        return "_".to_owned();
    }
    value
        .chars()
        .map(|c| if c.is_control() || ILLEGAL.contains(&c) { '_' } else { c })
        .collect()
}
