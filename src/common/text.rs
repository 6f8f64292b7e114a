use std::collections::HashSet;

/// Trim every entry, drop blanks and duplicates (case-insensitive), keep the
/// first spelling and the original order.
pub fn normalize_set(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(fold_case(value)))
        .map(str::to_string)
        .collect()
}

/// Trim and drop blanks but keep duplicates; used for ordered lists such as
/// business processes.
pub fn normalize_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case folding shared by the list filters, free-text search, duplicate
/// detection and the statistics buckets.
pub fn fold_case(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
