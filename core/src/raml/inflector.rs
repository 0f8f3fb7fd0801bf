#![deny(missing_docs)]

//! # Inflectors
//!
//! Named text transforms usable inside placeholders, e.g.
//! `<<resourcePathName | !singularize | !uppercamelcase>>`.
//!
//! Case conversions delegate to `heck`; number inflection is a small
//! rule-based English implementation.

use crate::error::{AppError, AppResult};
use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};

/// Names accepted by [`apply`], without the leading `!`.
pub const INFLECTORS: &[&str] = &[
    "singularize",
    "pluralize",
    "uppercamelcase",
    "lowercamelcase",
    "upperunderscorecase",
    "lowerunderscorecase",
    "upperhyphencase",
    "lowerhyphencase",
];

/// Singular/plural pairs that do not follow the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("goose", "geese"),
];

/// Words with the same singular and plural form.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "data",
];

/// `-o` words that only take `s`.
const O_TAKES_S: &[&str] = &["photo", "piano", "halo", "video", "radio", "zoo", "logo"];

/// Applies the inflector `name` (leading `!` optional, case-insensitive).
pub fn apply(name: &str, value: &str) -> AppResult<String> {
    let key = name.trim().trim_start_matches('!').to_ascii_lowercase();
    let out = match key.as_str() {
        "singularize" => singularize(value),
        "pluralize" => pluralize(value),
        "uppercamelcase" => value.to_upper_camel_case(),
        "lowercamelcase" => value.to_lower_camel_case(),
        "upperunderscorecase" => value.to_shouty_snake_case(),
        "lowerunderscorecase" => value.to_snake_case(),
        "upperhyphencase" => value.to_shouty_kebab_case(),
        "lowerhyphencase" => value.to_kebab_case(),
        _ => return Err(AppError::UnknownInflector(name.trim().to_string())),
    };
    Ok(out)
}

/// Simple English pluralization: `User` -> `Users`, `Potato` -> `Potatoes`,
/// `Policy` -> `Policies`.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, plural)) = IRREGULAR.iter().find(|(s, _)| lower == *s) {
        return swap_suffix(word, singular.len(), plural);
    }
    if IRREGULAR.iter().any(|(_, p)| lower == *p) {
        return word.to_string();
    }

    if let Some(stem) = lower.strip_suffix('y') {
        if stem.chars().last().is_some_and(is_consonant) {
            return swap_suffix(word, 1, "ies");
        }
        return swap_suffix(word, 0, "s");
    }
    if let Some(stem) = lower.strip_suffix('o') {
        if stem.chars().last().is_some_and(is_consonant) && !O_TAKES_S.contains(&lower.as_str())
        {
            return swap_suffix(word, 0, "es");
        }
        return swap_suffix(word, 0, "s");
    }
    if ["s", "x", "z", "sh", "ch"].iter().any(|s| lower.ends_with(s)) {
        return swap_suffix(word, 0, "es");
    }
    swap_suffix(word, 0, "s")
}

/// Simple English singularization: `Users` -> `User`, `Potatoes` -> `Potato`,
/// `Policies` -> `Policy`.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, plural)) = IRREGULAR.iter().find(|(_, p)| lower == *p) {
        return swap_suffix(word, plural.len(), singular);
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        if stem.chars().last().is_some_and(is_consonant) {
            return swap_suffix(word, 3, "y");
        }
    }
    if let Some(stem) = lower.strip_suffix("oes") {
        if stem.chars().last().is_some_and(is_consonant) {
            return swap_suffix(word, 2, "");
        }
    }
    if ["sses", "xes", "zes", "shes", "ches"]
        .iter()
        .any(|s| lower.ends_with(s))
    {
        return swap_suffix(word, 2, "");
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.ends_with('s') {
        return swap_suffix(word, 1, "");
    }
    word.to_string()
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !"aeiou".contains(c)
}

/// Replaces the last `drop` bytes of `word` with `suffix`, upper-casing the
/// suffix when the word is written in capitals.
fn swap_suffix(word: &str, drop: usize, suffix: &str) -> String {
    let keep = word.len().saturating_sub(drop);
    let stem = word.get(..keep).unwrap_or(word);
    let shouting = word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase);
    if shouting {
        format!("{}{}", stem, suffix.to_uppercase())
    } else {
        // Whole-word replacements keep the leading capital.
        let starts_upper = drop == word.len() && word.chars().next().is_some_and(char::is_uppercase);
        if starts_upper {
            let mut chars = suffix.chars();
            match chars.next() {
                Some(first) => format!("{}{}{}", stem, first.to_uppercase(), chars.as_str()),
                None => stem.to_string(),
            }
        } else {
            format!("{}{}", stem, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_singularize() {
        for (word, expected) in [
            ("Users", "User"),
            ("Books", "Book"),
            ("Potatoes", "Potato"),
            ("Students", "Student"),
            ("policies", "policy"),
            ("boxes", "box"),
            ("address", "address"),
            ("People", "Person"),
        ] {
            assert_eq!(singularize(word), expected, "singularize({word})");
        }
    }

    #[test]
    fn test_pluralize() {
        for (word, expected) in [
            ("User", "Users"),
            ("Book", "Books"),
            ("Potato", "Potatoes"),
            ("Student", "Students"),
            ("policy", "policies"),
            ("day", "days"),
            ("box", "boxes"),
            ("photo", "photos"),
            ("Person", "People"),
            ("USER", "USERS"),
        ] {
            assert_eq!(pluralize(word), expected, "pluralize({word})");
        }
    }

    #[test]
    fn test_case_inflectors() {
        let cases = [
            ("!lowercamelcase", ["userId", "userId", "userId", "userId"]),
            ("!uppercamelcase", ["UserId", "UserId", "UserId", "UserId"]),
            ("!lowerunderscorecase", ["user_id", "user_id", "user_id", "user_id"]),
            ("!upperunderscorecase", ["USER_ID", "USER_ID", "USER_ID", "USER_ID"]),
            ("!lowerhyphencase", ["user-id", "user-id", "user-id", "user-id"]),
            ("!upperhyphencase", ["USER-ID", "USER-ID", "USER-ID", "USER-ID"]),
        ];
        let inputs = ["userId", "UserId", "user_id", "user-id"];
        for (name, expected) in cases {
            for (input, want) in inputs.iter().zip(expected) {
                assert_eq!(apply(name, input).unwrap(), want, "{name}({input})");
            }
        }
    }

    #[test]
    fn test_apply_is_case_insensitive_and_bang_optional() {
        assert_eq!(apply("Singularize", "Users").unwrap(), "User");
        assert_eq!(apply(" !PLURALIZE ", "User").unwrap(), "Users");
    }

    #[test]
    fn test_unknown_inflector_is_an_error() {
        let err = apply("!shout", "users").unwrap_err();
        assert!(matches!(err, AppError::UnknownInflector(ref n) if n == "!shout"));
    }
}
