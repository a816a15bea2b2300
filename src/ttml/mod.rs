/*!
 * TTML to SRT conversion.
 *
 * The pipeline runs strictly in one direction:
 *
 * 1. [`document`]: XML text to a namespace-stripped element tree
 * 2. [`timing`]: absolute `[begin, end)` interval for every element
 * 3. [`sampler`]: the sorted instants at which visibility can change
 * 4. [`renderer`]: markup visible at each instant, styled through [`styles`]
 *    and tidied by [`cleanup`]
 * 5. [`crate::subtitle_processor`]: unchanged renderings merged into cues
 */

pub mod cleanup;
pub mod document;
pub mod renderer;
pub mod sampler;
pub mod styles;
pub mod time_expression;
pub mod timing;

use std::time::Duration;

use log::{debug, warn};

use crate::errors::ConversionError;
use crate::subtitle_processor::{RenderedFrame, SubtitleCollection};

pub use document::{Document, Element};
pub use renderer::SubtitleRenderer;
pub use styles::{FontStyle, Style, StyleSheet};
pub use time_expression::TimeExpressionParser;
pub use timing::TimedElement;

/// Render the body of `document` at every sampled instant
pub fn render_frames(document: &Document) -> Result<Vec<RenderedFrame>, ConversionError> {
    let body = document.body()?;
    let styles = StyleSheet::from_document(document);

    for id in styles.dangling_references(body) {
        warn!("Style '{}' is referenced but not defined; ignoring it", id);
    }

    let parser = TimeExpressionParser::new(document.tick_rate);
    let timed_body = TimedElement::annotate(body, &parser, Duration::ZERO)?;
    let instants = sampler::sample_instants(&timed_body);
    debug!("Sampled {} distinct instants", instants.len());

    let renderer = SubtitleRenderer::new(&styles);
    let frames = instants
        .into_iter()
        .map(|instant| {
            let markup = renderer.render(&timed_body, instant, &Style::default());
            RenderedFrame::new(instant, &markup)
        })
        .collect();

    Ok(frames)
}

/// Convert TTML text into subtitle cues
pub fn convert_document(xml: &str) -> Result<SubtitleCollection, ConversionError> {
    let document = Document::parse(xml)?;
    let frames = render_frames(&document)?;
    let collection = SubtitleCollection::from_frames(frames);
    debug!("Assembled {} cues", collection.entries.len());
    Ok(collection)
}

/// Convert TTML text into SRT text. A document without visible content yields an empty string.
pub fn convert_to_srt(xml: &str) -> Result<String, ConversionError> {
    Ok(convert_document(xml)?.to_srt_string())
}
