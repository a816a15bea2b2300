/*!
 * Tests for markup cleanup through the public API
 */

use ttml2srt::ttml::cleanup::{CleanupStep, cleanup, render_tokens, tokenize};

/// Steps run in a fixed order
#[test]
fn test_cleanup_steps_shouldRunInFixedOrder() {
    assert_eq!(CleanupStep::ALL.len(), 7);
    assert_eq!(CleanupStep::ALL[0], CleanupStep::StripSpacesAfterOpeningTags);
    assert_eq!(CleanupStep::ALL[4], CleanupStep::CollapseNestedFonts);
    assert_eq!(CleanupStep::ALL[6], CleanupStep::DropEmptyFonts);
}

/// Clean markup passes through unchanged
#[test]
fn test_cleanup_withTidyMarkup_shouldBeStable() {
    let samples = [
        "Hello",
        "<i>Hello</i> world",
        "<font color=\"#FF0000\">Line one</font>\n<i>Line two</i>",
        "a < b",
    ];
    for sample in samples {
        assert_eq!(cleanup(sample), sample);
        assert_eq!(cleanup(&cleanup(sample)), cleanup(sample));
    }
}

/// Each step can be applied on its own
#[test]
fn test_cleanup_step_applyTo_shouldOnlyDoItsOwnRewrite() {
    let markup = "<i> a \n  b </i>";
    assert_eq!(CleanupStep::StripSpacesAfterOpeningTags.apply_to(markup), "<i>a \n  b </i>");
    assert_eq!(CleanupStep::StripSpacesBeforeClosingTags.apply_to(markup), "<i> a \n  b</i>");
    assert_eq!(CleanupStep::TrimIndentAfterNewlines.apply_to(markup), "<i> a \nb </i>");
    assert_eq!(CleanupStep::TrimWhitespaceBeforeNewlines.apply_to(markup), "<i> a\n  b </i>");
}

/// Tokens render back to the same text
#[test]
fn test_tokenize_shouldPreserveText() {
    let markup = "x <font color=\"yellow\"><i>y</i></font>\n</b>";
    assert_eq!(render_tokens(&tokenize(markup)), markup);
}

/// Nested fonts are collapsed by the full pipeline
#[test]
fn test_cleanup_withNestedFonts_shouldLeaveSingleFont() {
    let rendered = "<font color=\"#FF0000\"><font color=\"#0000FF\">Hi</font></font>";
    assert_eq!(cleanup(rendered), "<font color=\"#0000FF\">Hi</font>");
}
