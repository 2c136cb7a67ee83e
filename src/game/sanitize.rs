//! Markdown marker stripping for embed text.

/// Markers the game bot wraps around text: underline, bold, strikethrough.
const FORMATTING_MARKERS: [&str; 3] = ["__", "**", "~~"];

/// Remove formatting markers from `input`, keeping every other character in order.
///
/// Repeats until no marker is left, so text such as `_**_` cannot collapse into
/// a fresh `__` that a second call would strip.
pub fn strip_formatting(input: &str) -> String {
    let mut output = input.to_string();
    loop {
        let before = output.len();
        for marker in FORMATTING_MARKERS {
            output = output.replace(marker, "");
        }
        if output.len() == before {
            return output;
        }
    }
}
