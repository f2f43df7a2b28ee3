//! English plural forms for type aliases
//!
//! Tenants address collections by plural path segments (`/users`), while
//! objects carry the singular canonical type (`user`).

/// Irregular (singular, plural) pairs checked before the suffix rules
const IRREGULAR: [(&str, &str); 8] = [
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("datum", "data"),
    ("index", "indices"),
    ("sysprop", "sysprops"),
];

/// Converts between singular and plural type names
pub struct Pluralizer;

impl Pluralizer {
    /// Plural form of a type name
    ///
    /// ```
    /// use tenantry::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("user"), "users");
    /// assert_eq!(Pluralizer::pluralize("address"), "addresses");
    /// assert_eq!(Pluralizer::pluralize("category"), "categories");
    /// assert_eq!(Pluralizer::pluralize("person"), "people");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return String::new();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == singular) {
            return plural.to_string();
        }

        let s = singular;
        if s.len() > 1 && s.ends_with('y') && !ends_with_vowel_y(s) {
            return format!("{}ies", &s[..s.len() - 1]);
        }
        if ["s", "sh", "ch", "x", "z"].iter().any(|suffix| s.ends_with(suffix)) {
            return format!("{}es", s);
        }
        if s.len() > 2 && s.ends_with("fe") {
            return format!("{}ves", &s[..s.len() - 2]);
        }
        if s.len() > 1 && s.ends_with('f') && !s.ends_with("ff") {
            return format!("{}ves", &s[..s.len() - 1]);
        }
        format!("{}s", s)
    }

    /// Singular form of a type name; words with no plural suffix pass through
    ///
    /// ```
    /// use tenantry::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::singularize("users"), "user");
    /// assert_eq!(Pluralizer::singularize("addresses"), "address");
    /// assert_eq!(Pluralizer::singularize("people"), "person");
    /// ```
    pub fn singularize(plural: &str) -> String {
        if plural.is_empty() {
            return String::new();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == plural) {
            return singular.to_string();
        }

        let s = plural;
        if s.len() > 3 && s.ends_with("ies") {
            return format!("{}y", &s[..s.len() - 3]);
        }
        if s.len() > 3
            && ["sses", "shes", "ches", "xes", "zes"]
                .iter()
                .any(|suffix| s.ends_with(suffix))
        {
            return s[..s.len() - 2].to_string();
        }
        if s.len() > 1 && s.ends_with('s') && !s.ends_with("ss") {
            return s[..s.len() - 1].to_string();
        }
        s.to_string()
    }
}

fn ends_with_vowel_y(s: &str) -> bool {
    ["ay", "ey", "iy", "oy", "uy"].iter().any(|v| s.ends_with(v))
}
