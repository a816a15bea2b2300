/*!
 * Collection of the instants at which rendered content may change.
 */

use std::collections::BTreeSet;
use std::time::Duration;

use crate::ttml::timing::TimedElement;

/// Sorted, distinct begin and bounded end instants of every element below `root`.
///
/// The container itself does not contribute: its interval only bounds what its
/// descendants already report.
pub fn sample_instants(root: &TimedElement<'_>) -> Vec<Duration> {
    let mut instants = BTreeSet::new();
    for element in root.descendants() {
        instants.insert(element.begin);
        if let Some(end) = element.end {
            instants.insert(end);
        }
    }
    instants.into_iter().collect()
}
