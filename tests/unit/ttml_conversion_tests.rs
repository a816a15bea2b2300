/*!
 * Tests for the TTML to SRT conversion pipeline
 */

use std::time::Duration;

use ttml2srt::errors::ConversionError;
use ttml2srt::ttml::{self, Document, StyleSheet, TimeExpressionParser, TimedElement};
use ttml2srt::{convert_document, convert_to_srt};
use crate::common;

fn body(content: &str) -> String {
    common::ttml_document("", content)
}

/// A single timed paragraph becomes a single cue
#[test]
fn test_convert_withSingleParagraph_shouldProduceOneCue() {
    let xml = body(r#"<p begin="00:00:01.000" end="00:00:03.000">Hello</p>"#);
    assert_eq!(
        convert_to_srt(&xml).unwrap(),
        "1\n00:00:01,000 --> 00:00:03,000\nHello\n\n"
    );
}

/// Non-overlapping siblings become sequential cues
#[test]
fn test_convert_withTwoSiblings_shouldNumberCuesInTimeOrder() {
    let xml = body(
        r#"<div>
            <p begin="3s" end="4s">Second</p>
            <p begin="1s" end="2s">First</p>
        </div>"#,
    );
    let collection = convert_document(&xml).unwrap();

    assert_eq!(collection.entries.len(), 2);
    assert_eq!(collection.entries[0].seq_num, 1);
    assert_eq!(collection.entries[0].text, "First");
    assert_eq!(collection.entries[0].start_time, Duration::from_secs(1));
    assert_eq!(collection.entries[0].end_time, Duration::from_secs(2));
    assert_eq!(collection.entries[1].seq_num, 2);
    assert_eq!(collection.entries[1].text, "Second");
    assert_eq!(collection.entries[1].start_time, Duration::from_secs(3));
}

/// White is not a color; red is
#[test]
fn test_convert_withWhiteAndRed_shouldOnlyWrapRed() {
    let xml = body(
        r##"<p begin="1s" end="2s" color="#FFFFFF">plain</p>
            <p begin="3s" end="4s" color="#FF0000">red</p>"##,
    );
    let collection = convert_document(&xml).unwrap();

    assert_eq!(collection.entries[0].text, "plain");
    assert_eq!(collection.entries[1].text, "<font color=\"#FF0000\">red</font>");
}

/// A duration counts from the inherited begin
#[test]
fn test_convert_withDurAndInheritedBegin_shouldEndAfterDuration() {
    let xml = body(r#"<div begin="1s"><p dur="2s">Hi</p></div>"#);
    assert_eq!(
        convert_to_srt(&xml).unwrap(),
        "1\n00:00:01,000 --> 00:00:03,000\nHi\n\n"
    );
}

/// A body without timed elements is a clean no-op
#[test]
fn test_convert_withoutTimedElements_shouldProduceNoCues() {
    assert!(convert_document(&body("")).unwrap().is_empty());
    assert!(convert_document(&body("just text")).unwrap().is_empty());
    assert_eq!(convert_to_srt(&body("   ")).unwrap(), "");
}

/// Nested colors never leave a double font wrapper
#[test]
fn test_convert_withNestedColors_shouldKeepInnermostColor() {
    let head = r##"<styling>
        <style xml:id="speaker" tts:color="#FF0000"/>
        <style xml:id="quote" tts:color="#00FF00"/>
    </styling>"##;
    let xml = common::ttml_document(
        head,
        r#"<p begin="1s" end="2s" style="speaker"><span style="quote">Hello there</span></p>"#,
    );
    let collection = convert_document(&xml).unwrap();

    assert_eq!(collection.entries.len(), 1);
    assert_eq!(collection.entries[0].text, "<font color=\"#00FF00\">Hello there</font>");
    assert_eq!(collection.entries[0].text.matches("<font").count(), 1);
}

/// Inline attributes beat named styles, which beat inherited ones
#[test]
fn test_convert_withInlineOverride_shouldPreferInline() {
    let head = r##"<styling><style xml:id="s" tts:color="#FF0000" tts:fontStyle="italic"/></styling>"##;
    let xml = common::ttml_document(
        head,
        r##"<p begin="0s" end="1s" style="s" tts:color="#0000FF" tts:fontStyle="normal">x</p>"##,
    );
    assert_eq!(
        convert_document(&xml).unwrap().entries[0].text,
        "<font color=\"#0000FF\">x</font>"
    );
}

/// Tick expressions use the declared tick rate
#[test]
fn test_convert_withTickRate_shouldConvertTicks() {
    let xml = r#"<tt xmlns="http://www.w3.org/ns/ttml" xmlns:ttp="http://www.w3.org/ns/ttml#parameter" ttp:tickRate="10000000">
        <body><div><p begin="15000000t" end="30000000t">Ticks</p></div></body>
    </tt>"#;
    assert_eq!(
        convert_to_srt(xml).unwrap(),
        "1\n00:00:01,500 --> 00:00:03,000\nTicks\n\n"
    );
}

/// Fatal time expression errors abort the conversion
#[test]
fn test_convert_withBadTimeExpressions_shouldFail() {
    assert_eq!(
        convert_to_srt(&body(r#"<p begin="25f">x</p>"#)).unwrap_err(),
        ConversionError::UnsupportedTimeUnit("25f".to_string())
    );
    assert_eq!(
        convert_to_srt(&body(r#"<p begin="00:00:01:12">x</p>"#)).unwrap_err(),
        ConversionError::UnsupportedTimeUnit("00:00:01:12".to_string())
    );
    assert_eq!(
        convert_to_srt(&body(r#"<p begin="100t">x</p>"#)).unwrap_err(),
        ConversionError::MissingTickRate("100t".to_string())
    );
    assert_eq!(
        convert_to_srt(&body(r#"<p end="soon">x</p>"#)).unwrap_err(),
        ConversionError::InvalidTimeExpression("soon".to_string())
    );
}

/// Structural problems are reported as errors
#[test]
fn test_convert_withBrokenDocument_shouldFail() {
    assert_eq!(
        convert_to_srt("<tt><head/></tt>").unwrap_err(),
        ConversionError::MissingBody
    );
    assert!(matches!(
        convert_to_srt("<tt><body><p>x</body></tt>").unwrap_err(),
        ConversionError::Xml(_)
    ));
    assert!(matches!(
        convert_to_srt(r#"<tt tickRate="0"><body/></tt>"#).unwrap_err(),
        ConversionError::InvalidTickRate(_)
    ));
}

/// Unknown style ids contribute nothing
#[test]
fn test_convert_withDanglingStyle_shouldRenderWithoutStyle() {
    let xml = body(r#"<p begin="0s" end="1s" style="nowhere">plain</p>"#);
    assert_eq!(convert_document(&xml).unwrap().entries[0].text, "plain");
}

/// A child may stay visible after its parent's stated end
#[test]
fn test_convert_withChildOutlivingParent_shouldNotClampChild() {
    let xml = body(r#"<div begin="0s" end="1s"><p end="2s">x</p></div>"#);
    let doc = Document::parse(&xml).unwrap();
    let parser = TimeExpressionParser::new(doc.tick_rate);
    let timed = TimedElement::annotate(doc.body().unwrap(), &parser, Duration::ZERO).unwrap();

    let p = &timed.children[0].children[0];
    assert_eq!(p.end, Some(Duration::from_secs(2)));
    // The parent hides it anyway once the parent has ended
    let collection = convert_document(&xml).unwrap();
    assert_eq!(collection.entries.len(), 1);
    assert_eq!(collection.entries[0].end_time, Duration::from_secs(1));
}

/// Every element starts no earlier than its parent
#[test]
fn test_annotate_shouldKeepChildrenInsideParentBegin() {
    let xml = body(
        r#"<div begin="2s">
            <p begin="1s"><span>a</span><span begin="00:00:01.000">b</span></p>
            <p>c</p>
        </div>"#,
    );
    let doc = Document::parse(&xml).unwrap();
    let parser = TimeExpressionParser::new(doc.tick_rate);
    let timed = TimedElement::annotate(doc.body().unwrap(), &parser, Duration::ZERO).unwrap();

    fn check(element: &TimedElement<'_>) {
        for child in &element.children {
            // Clock values are absolute, so only offset-derived begins are ordered
            if child.element.attribute("begin").is_none_or(|b| !b.contains(':')) {
                assert!(child.begin >= element.begin, "{} starts before its parent", child.element.name);
            }
            check(child);
        }
    }
    check(&timed);
}

/// Frames are rendered once per distinct instant
#[test]
fn test_render_frames_shouldMatchSampledInstants() {
    let xml = common::sample_ttml();
    let doc = Document::parse(&xml).unwrap();
    let frames = ttml::render_frames(&doc).unwrap();

    let instants: Vec<u128> = frames.iter().map(|f| f.instant.as_millis()).collect();
    assert_eq!(instants, vec![0, 1000, 2500, 3000, 4000]);
    assert_eq!(frames[1].text, "First line");
    assert_eq!(frames[2].text, "");
}

/// Multiple style ids in one attribute are merged left to right
#[test]
fn test_stylesheet_withMultipleIds_shouldMergeInOrder() {
    let head = r##"<styling>
        <style xml:id="red" tts:color="#FF0000"/>
        <style xml:id="italic" tts:fontStyle="italic"/>
        <style id="blue" color="#0000FF"/>
    </styling>"##;
    let doc = Document::parse(&common::ttml_document(head, "")).unwrap();
    let styles = StyleSheet::from_document(&doc);

    assert_eq!(styles.len(), 3);
    let merged = styles.resolve("red italic blue");
    assert_eq!(merged.color.as_deref(), Some("#0000FF"));
    assert!(merged.is_italic());
}

/// Line breaks and indentation collapse into clean cue lines
#[test]
fn test_convert_withLineBreaks_shouldKeepLines() {
    let xml = body(
        r#"
        <div>
            <p begin="0s" end="1s">
                Line one<br/>
                <span tts:fontStyle="italic">Line two</span>
            </p>
        </div>"#,
    );
    assert_eq!(
        convert_document(&xml).unwrap().entries[0].text,
        "Line one\n<i>Line two</i>"
    );
}
