// Stage matching: free-text stage values to board columns
//
// Upstream data encodes a stage either as a slug ("working_on_it"), as the
// label verbatim ("Working on it"), or as a backend-specific value ("New Lead").
// All three are exact comparisons; there is no substring or fuzzy matching.

use crate::models::Stage;

/// Lower-case a value and collapse each whitespace run into one underscore
pub fn normalize_id(value: &str) -> String {
    let mut normalized = String::with_capacity(value.len());
    let mut in_whitespace = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                normalized.push('_');
            }
            in_whitespace = true;
        } else {
            normalized.extend(ch.to_lowercase());
            in_whitespace = false;
        }
    }
    normalized
}

/// Whether an item's stage value belongs to `stage`
///
/// An empty or absent value only belongs to the `unassigned` stage.
pub fn matches(value: Option<&str>, stage: &Stage) -> bool {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return stage.is_unassigned(),
    };

    if normalize_id(value) == normalize_id(&stage.id) {
        return true;
    }

    let lowered = value.to_lowercase();
    lowered == stage.label.to_lowercase()
        || stage.aliases.iter().any(|alias| alias.to_lowercase() == lowered)
}

/// Position of the first stage (in configuration order) matching `value`
pub fn resolve_index(value: Option<&str>, stages: &[Stage]) -> Option<usize> {
    stages.iter().position(|stage| matches(value, stage))
}

/// First stage (in configuration order) matching `value`
pub fn resolve<'a>(value: Option<&str>, stages: &'a [Stage]) -> Option<&'a Stage> {
    resolve_index(value, stages).map(|idx| &stages[idx])
}
