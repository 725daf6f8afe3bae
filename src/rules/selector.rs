//! Match selection: pick the single most severe rule a message trips

use serde::Serialize;
use std::ops::Deref;

use crate::rules::{Rule, Severity};

/// The rule picked for a message and the text it matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Substring of the message the rule found
    pub matched_text: String,

    /// Severity of the winning rule
    pub severity: Severity,

    /// Source of the winning rule
    pub source: String,
}

/// Find the highest-severity rule that matches anywhere in `message`.
///
/// Rules are tried in the order `rules` yields them. A later rule only wins
/// with a strictly higher severity, so among equal severities the first one
/// visited wins. For the concurrent store that order is unspecified, which
/// makes the tie-break non-deterministic. The scan stops at the first
/// [`Severity::MAX`] match.
pub fn select<I>(message: &str, rules: I) -> Option<MatchResult>
where
    I: IntoIterator,
    I::Item: Deref<Target = Rule>,
{
    let mut best: Option<MatchResult> = None;

    for rule in rules {
        let rule: &Rule = &rule;
        if best.as_ref().is_some_and(|b| rule.severity <= b.severity) {
            continue;
        }

        let Some(found) = rule.regex.find(message) else {
            continue;
        };

        best = Some(MatchResult {
            matched_text: found.as_str().to_string(),
            severity: rule.severity,
            source: rule.source.clone(),
        });

        if rule.severity == Severity::MAX {
            break;
        }
    }

    best
}
