/*!
 * Rendering of a timed element tree into SRT markup at a single instant.
 *
 * Colors become `<font color="...">` and italics become `<i>`. A child only
 * opens tags for style it does not already inherit from an enclosing element,
 * so an unchanged style is never wrapped twice.
 */

use std::time::Duration;

use crate::ttml::cleanup::cleanup;
use crate::ttml::styles::{Style, StyleSheet};
use crate::ttml::timing::TimedElement;

/// Tags that end with a line break
const BLOCK_TAGS: [&str; 3] = ["div", "p", "br"];

/// Renders subtitle markup with a fixed style table
#[derive(Debug, Clone, Copy)]
pub struct SubtitleRenderer<'s> {
    styles: &'s StyleSheet,
}

impl<'s> SubtitleRenderer<'s> {
    pub fn new(styles: &'s StyleSheet) -> Self {
        Self { styles }
    }

    /// Render `element` and its visible descendants at `instant`.
    ///
    /// Returns an empty string when the element itself is not visible.
    pub fn render(&self, element: &TimedElement<'_>, instant: Duration, inherited: &Style) -> String {
        if !element.is_active_at(instant) {
            return String::new();
        }

        let style = self.styles.compute_style(element.element, inherited);
        let font_color = style
            .color
            .as_deref()
            .filter(|&color| inherited.color.as_deref() != Some(color));
        let italic = style.is_italic() && !inherited.is_italic();

        let mut result = String::new();
        if let Some(color) = font_color {
            result.push_str(&format!("<font color=\"{}\">", color));
        }
        if italic {
            result.push_str("<i>");
        }

        result.push_str(&collapse_edge_whitespace(&element.element.text));
        for child in &element.children {
            result.push_str(&self.render(child, instant, &style));
            result.push_str(&collapse_edge_whitespace(&child.element.tail));
        }

        if font_color.is_some() || italic {
            // Whitespace after the last content belongs outside the closing tags
            let content_len = result.trim_end().len();
            let trailing = result.split_off(content_len);
            if italic {
                result.push_str("</i>");
            }
            if font_color.is_some() {
                result.push_str("</font>");
            }
            result.push_str(&trailing);
        }

        let mut result = cleanup(&result);
        if BLOCK_TAGS.contains(&element.element.name.as_str()) {
            result.push('\n');
        }
        result
    }
}

/// Replace leading and trailing whitespace runs with a single space each
pub fn collapse_edge_whitespace(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let start_trimmed = text.trim_start();
    if start_trimmed.is_empty() {
        return " ".to_string();
    }
    let core = start_trimmed.trim_end();

    let mut out = String::with_capacity(core.len() + 2);
    if start_trimmed.len() != text.len() {
        out.push(' ');
    }
    out.push_str(core);
    if core.len() != start_trimmed.len() {
        out.push(' ');
    }
    out
}
