/*!
 * Style resolution.
 *
 * Only two style dimensions reach SRT output: the text color and italics.
 * Named styles come from `<head><styling><style>`; elements may reference
 * them with `style="id [id...]"` and override them inline with `color` and
 * `fontStyle` attributes. Precedence is inline, then named, then inherited.
 */

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::ttml::document::{Document, Element};

/// Colors that are treated as "no color override"
const IGNORED_COLORS: [&str; 2] = ["#FFFFFF", "#000000"];

/// Font style as far as SRT markup is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Italic,
    Normal,
}

/// Resolved style for one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    /// CSS-like color token, e.g. `#FF0000` or `yellow`
    pub color: Option<String>,

    /// Italic or explicitly normal
    pub font_style: Option<FontStyle>,
}

impl Style {
    /// Style from a `<style>` definition. Non-italic font styles carry no information here.
    pub fn from_definition(element: &Element) -> Self {
        Self {
            color: element.attribute("color").and_then(filter_color),
            font_style: match element.attribute("fontStyle") {
                Some("italic") => Some(FontStyle::Italic),
                _ => None,
            },
        }
    }

    /// Inline overrides carried directly on a content element
    pub fn from_inline(element: &Element) -> Self {
        Self {
            color: element.attribute("color").and_then(filter_color),
            font_style: element.attribute("fontStyle").map(|value| match value {
                "italic" => FontStyle::Italic,
                _ => FontStyle::Normal,
            }),
        }
    }

    /// Returns a copy of `self` with every dimension set in `other` taken from `other`
    pub fn merged_with(&self, other: &Style) -> Style {
        Style {
            color: other.color.clone().or_else(|| self.color.clone()),
            font_style: other.font_style.or(self.font_style),
        }
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == Some(FontStyle::Italic)
    }
}

fn filter_color(color: &str) -> Option<String> {
    if IGNORED_COLORS.contains(&color) {
        None
    } else {
        Some(color.to_string())
    }
}

/// Named style table of a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
}

impl StyleSheet {
    /// Load all named styles of a document
    pub fn from_document(document: &Document) -> Self {
        let mut sheet = Self::default();

        for definition in document.style_definitions() {
            match definition.attribute("id") {
                Some(id) => sheet.insert(id, Style::from_definition(definition)),
                None => warn!("Skipping <style> definition without an id"),
            }
        }

        debug!("Loaded {} named styles", sheet.len());
        sheet
    }

    /// Adds or replaces a named style
    pub fn insert(&mut self, id: impl Into<String>, style: Style) {
        self.styles.insert(id.into(), style);
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve a `style` attribute value. Unknown ids contribute nothing.
    pub fn resolve(&self, reference: &str) -> Style {
        reference
            .split_whitespace()
            .filter_map(|id| self.styles.get(id))
            .fold(Style::default(), |acc, style| acc.merged_with(style))
    }

    /// Effective style of `element` given the style it inherits from its parent
    pub fn compute_style(&self, element: &Element, inherited: &Style) -> Style {
        let mut style = inherited.clone();
        if let Some(reference) = element.attribute("style") {
            style = style.merged_with(&self.resolve(reference));
        }
        style.merged_with(&Style::from_inline(element))
    }

    /// Style ids referenced somewhere under `root` that have no definition, in document order
    pub fn dangling_references(&self, root: &Element) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dangling = Vec::new();
        self.collect_dangling(root, &mut seen, &mut dangling);
        dangling
    }

    fn collect_dangling(&self, element: &Element, seen: &mut HashSet<String>, dangling: &mut Vec<String>) {
        if let Some(reference) = element.attribute("style") {
            for id in reference.split_whitespace() {
                if !self.styles.contains_key(id) && seen.insert(id.to_string()) {
                    dangling.push(id.to_string());
                }
            }
        }
        for child in &element.children {
            self.collect_dangling(child, seen, dangling);
        }
    }
}
