use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, subcategories: &[&str]) -> Self {
        Self {
            name: name.into(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// What the validator and editor need to know about categories.
pub trait CategoryLookup {
    fn contains_category(&self, key: &str) -> bool;

    /// `None` when the category itself is unknown.
    fn subcategories(&self, key: &str) -> Option<&[String]>;

    fn display_name(&self, key: &str) -> Option<&str>;
}

/// Category key → display name and allowed subcategory keys. Stored on disk
/// as a bare JSON object keyed by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRegistry(BTreeMap<String, Category>);

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRegistry {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn builtin() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            "cannabis".to_string(),
            Category::new("Cannabis", &["indica", "sativa", "hybrid", "ruderalis"]),
        );
        categories.insert(
            "vegetables".to_string(),
            Category::new("Vegetables", &["leafy_greens", "fruiting_plants", "herbs"]),
        );
        categories.insert(
            "flowers".to_string(),
            Category::new("Flowers", &["annuals", "perennials"]),
        );
        categories.insert(
            "specialty".to_string(),
            Category::new("Specialty", &["mushrooms", "microgreens"]),
        );
        Self(categories)
    }

    pub fn insert(&mut self, key: impl Into<String>, category: Category) {
        self.0.insert(key.into(), category);
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.0.iter().map(|(key, category)| (key.as_str(), category))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Registry name, or the key title-cased when the category is unknown.
    pub fn label_for(&self, key: &str) -> String {
        match self.display_name(key) {
            Some(name) => name.to_string(),
            None => title_case(key),
        }
    }
}

impl CategoryLookup for CategoryRegistry {
    fn contains_category(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    fn subcategories(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(|category| category.subcategories.as_slice())
    }

    fn display_name(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|category| category.name.as_str())
    }
}

fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
