use std::collections::HashMap;
use std::fmt;

use super::metadata::ParamSpec;

/// Why a parameter kept its current value during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The artifact holds the parameter with a different shape.
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },
    /// The current model has the parameter but the artifact does not.
    Missing,
    /// The artifact has a parameter the current model does not know.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedParam {
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::ShapeMismatch { expected, found } => write!(
                f,
                "{}: shape mismatch (expected {:?}, found {:?})",
                self.name, expected, found
            ),
            SkipReason::Missing => write!(f, "{}: missing from artifact", self.name),
            SkipReason::Unexpected => write!(f, "{}: not part of current model", self.name),
        }
    }
}

/// Outcome of [`merge_parameters`]: which loaded tensors may replace the
/// current ones.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Names to overwrite from the artifact, in the current model's order.
    pub loaded: Vec<String>,
    /// Parameters left at their current values, plus unknown artifact entries.
    pub skipped: Vec<SkippedParam>,
}

impl MergeReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Whether the loaded tensor called `name` replaces the current one.
    pub fn accepts(&self, name: &str) -> bool {
        self.loaded.iter().any(|n| n == name)
    }
}

/// Match `loaded` against `current`. A loaded tensor is accepted only when
/// a current parameter has the same name and shape; everything else is
/// reported as skipped and keeps its current value.
pub fn merge_parameters(current: &[ParamSpec], loaded: &[ParamSpec]) -> MergeReport {
    let mut by_name: HashMap<&str, &ParamSpec> =
        loaded.iter().map(|p| (p.name.as_str(), p)).collect();

    let mut report = MergeReport::default();
    for param in current {
        let reason = match by_name.remove(param.name.as_str()) {
            Some(found) if found.shape == param.shape => {
                report.loaded.push(param.name.clone());
                continue;
            }
            Some(found) => SkipReason::ShapeMismatch {
                expected: param.shape.clone(),
                found: found.shape.clone(),
            },
            None => SkipReason::Missing,
        };
        report.skipped.push(SkippedParam {
            name: param.name.clone(),
            reason,
        });
    }

    let mut unexpected: Vec<&str> = by_name.into_keys().collect();
    unexpected.sort_unstable();
    report
        .skipped
        .extend(unexpected.into_iter().map(|name| SkippedParam {
            name: name.to_string(),
            reason: SkipReason::Unexpected,
        }));
    report
}
