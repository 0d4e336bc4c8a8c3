use super::restaurant::Restaurant;
use std::collections::HashSet;

fn normalize<'a>(tags: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
    tags.into_iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Keeps restaurants carrying at least one of `tags`, ignoring case.
pub fn match_any(candidates: Vec<Restaurant>, tags: &[String]) -> Vec<Restaurant> {
    let needles = normalize(tags);
    if candidates.is_empty() || needles.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|r| !normalize(&r.tags).is_disjoint(&needles))
        .collect()
}

/// Keeps restaurants carrying every one of `tags`, ignoring case.
pub fn match_all(candidates: Vec<Restaurant>, tags: &[String]) -> Vec<Restaurant> {
    let needles = normalize(tags);
    if candidates.is_empty() || needles.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|r| normalize(&r.tags).is_superset(&needles))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: &str, tags: &[&str]) -> Restaurant {
        let mut r = Restaurant::new(id);
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    fn ids(restaurants: &[Restaurant]) -> Vec<&str> {
        restaurants.iter().map(|r| r.id.as_str()).collect()
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|t| t.to_string()).collect()
    }

    fn candidates() -> Vec<Restaurant> {
        vec![
            tagged("both", &["Vegan", "GLUTEN-FREE", "cosy"]),
            tagged("vegan", &["vegan"]),
            tagged("none", &[]),
            tagged("blank", &["", "  "]),
            tagged("gf", &["gluten-free", "outdoor"]),
        ]
    }

    #[test]
    fn all_requires_every_tag() {
        let kept = match_all(candidates(), &tags(&["vegan", "gluten-free"]));
        assert_eq!(ids(&kept), vec!["both"]);
    }

    #[test]
    fn any_requires_one_tag() {
        let kept = match_any(candidates(), &tags(&["VEGAN", "outdoor"]));
        assert_eq!(ids(&kept), vec!["both", "vegan", "gf"]);
    }

    #[test]
    fn empty_filter_is_a_noop() {
        assert_eq!(match_any(candidates(), &[]), candidates());
        assert_eq!(match_all(candidates(), &[]), candidates());
        assert_eq!(match_all(candidates(), &tags(&["", " "])), candidates());
    }

    #[test]
    fn blank_filter_entries_are_ignored() {
        let kept = match_all(candidates(), &tags(&["vegan", "  "]));
        assert_eq!(ids(&kept), vec!["both", "vegan"]);
    }

    #[test]
    fn empty_candidates_stay_empty() {
        assert!(match_any(vec![], &tags(&["vegan"])).is_empty());
    }
}
