//! Word inflection used to turn JSON field names into entity type names.
//!
//! Only the handful of rules AutoDNS field names need: English plural
//! endings, camel-casing of snake/camel identifiers and the reverse.

/// Strips a plural ending: `records` → `record`, `entries` → `entry`.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.len() <= 2 || ["ss", "us", "is"].iter().any(|end| lower.ends_with(end)) {
        return word.to_string();
    }
    let stem = |n: usize| word[..word.len() - n].to_string();
    if lower.ends_with("ies") {
        return format!("{}y", stem(3));
    }
    if ["sses", "shes", "ches", "xes", "zes"].iter().any(|end| lower.ends_with(end)) {
        return stem(2);
    }
    if lower.ends_with('s') {
        return stem(1);
    }
    word.to_string()
}

/// `zone_record` / `zoneRecord` → `ZoneRecord`. Existing capitals are kept.
pub fn camelize(word: &str) -> String {
    word.split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Singularize then camelize: `resource_records` → `ResourceRecord`.
pub fn classify(word: &str) -> String {
    camelize(&singularize(word))
}

/// `ZoneRecord` → `zone_record`.
pub fn snake_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for (i, ch) in word.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
