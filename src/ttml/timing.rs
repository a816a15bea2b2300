/*!
 * Absolute interval computation.
 *
 * Produces a [`TimedElement`] tree that mirrors the source tree and carries
 * each element's absolute `[begin, end)` interval. The source tree is never
 * modified.
 */

use std::time::Duration;

use crate::errors::ConversionError;
use crate::ttml::document::Element;
use crate::ttml::time_expression::TimeExpressionParser;

/// An element together with its absolute visibility interval
#[derive(Debug, Clone, PartialEq)]
pub struct TimedElement<'a> {
    /// Source element
    pub element: &'a Element,

    /// Inclusive start of visibility
    pub begin: Duration,

    /// Exclusive end of visibility, `None` when the element never ends
    pub end: Option<Duration>,

    /// Annotated children in document order
    pub children: Vec<TimedElement<'a>>,
}

impl<'a> TimedElement<'a> {
    /// Annotate `element` and its subtree. `default_begin` is the begin of the
    /// nearest ancestor; it is the base of offset expressions and the begin of
    /// elements without a `begin` attribute.
    pub fn annotate(
        element: &'a Element,
        parser: &TimeExpressionParser,
        default_begin: Duration,
    ) -> Result<Self, ConversionError> {
        let begin = match element.attribute("begin") {
            Some(expression) => parser.parse(expression, default_begin)?,
            None => default_begin,
        };

        let raw_end = element
            .attribute("end")
            .map(|expression| parser.parse(expression, default_begin))
            .transpose()?;

        // Durations are always relative, never offset by an ancestor
        let raw_dur = element
            .attribute("dur")
            .map(|expression| parser.parse(expression, Duration::ZERO))
            .transpose()?;

        let end = match (raw_end, raw_dur) {
            (Some(end), Some(dur)) => Some(end.min(begin.saturating_add(dur))),
            (None, Some(dur)) => Some(begin.saturating_add(dur)),
            (end, None) => end,
        };

        let children = element
            .children
            .iter()
            .map(|child| Self::annotate(child, parser, begin))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            element,
            begin,
            end,
            children,
        })
    }

    /// Whether the element is visible at `instant`
    pub fn is_active_at(&self, instant: Duration) -> bool {
        instant >= self.begin && self.end.is_none_or(|end| instant < end)
    }

    /// Depth-first iterator over all strict descendants
    pub fn descendants(&self) -> impl Iterator<Item = &TimedElement<'a>> {
        let mut stack: Vec<&TimedElement<'a>> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
