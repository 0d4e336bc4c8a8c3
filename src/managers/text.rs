use super::restaurant::Restaurant;

/// Keeps restaurants whose name, description or cuisine contains `query`,
/// ignoring case. A blank query keeps everything in its original order.
pub fn filter_by_text(candidates: Vec<Restaurant>, query: Option<&str>) -> Vec<Restaurant> {
    let needle = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return candidates,
    };
    candidates
        .into_iter()
        .filter(|r| {
            [&r.name, &r.description, &r.cuisine]
                .iter()
                .any(|field| contains_ignore_case(field.as_deref(), &needle))
        })
        .collect()
}

fn contains_ignore_case(value: Option<&str>, needle_lower: &str) -> bool {
    value.map_or(false, |v| v.to_lowercase().contains(needle_lower))
}
