//! Helpers for taking declared upload names apart.

/// Returns the last path segment of `name`, treating both `/` and `\` as
/// separators. Clients send paths from any platform.
pub fn last_segment(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Splits `name` at its last `.` into `(base, extension)`, with the dot kept on
/// the extension.
///
/// Leading dots belong to the base, so `.profile` has no extension, and a name
/// without any dot yields an empty extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(idx) => name.split_at(leading_dots + idx),
        None => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("clip.mp4", ("clip", ".mp4"))]
    #[case::multiple_dots("lecture.part1.mkv", ("lecture.part1", ".mkv"))]
    #[case::no_extension("README", ("README", ""))]
    #[case::leading_dot(".profile", (".profile", ""))]
    #[case::leading_dot_with_extension(".hidden.mov", (".hidden", ".mov"))]
    #[case::trailing_dot("clip.", ("clip", "."))]
    #[case::only_dots("..", ("..", ""))]
    #[case::empty("", ("", ""))]
    fn test_split_extension(#[case] name: &str, #[case] expected: (&str, &str)) {
        assert_eq!(split_extension(name), expected);
    }

    #[rstest]
    #[case::bare("clip.mp4", "clip.mp4")]
    #[case::unix_path("videos/2024/clip.mp4", "clip.mp4")]
    #[case::windows_path(r"C:\Users\me\clip.mp4", "clip.mp4")]
    #[case::traversal("../../etc/passwd", "passwd")]
    #[case::trailing_separator("videos/", "")]
    fn test_last_segment(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(last_segment(name), expected);
    }
}
