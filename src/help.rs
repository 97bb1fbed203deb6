// ABOUTME: Documentation registry for primitives, backing the `help` builtin

use std::cell::RefCell;
use std::collections::HashMap;

/// Documentation for one primitive.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub name: String,
    pub signature: String,
    pub description: String,
    pub examples: Vec<String>,
    pub category: String,
}

/// Builds and registers a [`HelpEntry`] with less boilerplate.
#[macro_export]
macro_rules! help_entry {
    (
        $name:literal,
        $category:literal,
        $signature:literal,
        $description:literal,
        [$($example:literal),* $(,)?]
    ) => {
        $crate::help::register_help($crate::help::HelpEntry {
            name: $name.to_string(),
            category: $category.to_string(),
            signature: $signature.to_string(),
            description: $description.trim().to_string(),
            examples: vec![$($example.to_string()),*],
        });
    };
}

thread_local! {
    static REGISTRY: RefCell<HashMap<String, HelpEntry>> = RefCell::new(HashMap::new());
}

pub fn register_help(entry: HelpEntry) {
    REGISTRY.with(|registry| {
        registry.borrow_mut().insert(entry.name.clone(), entry);
    });
}

pub fn lookup(name: &str) -> Option<HelpEntry> {
    REGISTRY.with(|registry| registry.borrow().get(name).cloned())
}

/// Render one entry as plain text.
pub fn format_entry(entry: &HelpEntry) -> String {
    let mut out = format!(
        "{} - {}\n  {}\n",
        entry.signature, entry.category, entry.description
    );
    if !entry.examples.is_empty() {
        out.push_str("  examples:\n");
        for example in &entry.examples {
            out.push_str("    ");
            out.push_str(example);
            out.push('\n');
        }
    }
    out
}

/// Render the full index, grouped by category, names sorted within each.
pub fn format_index() -> String {
    REGISTRY.with(|registry| {
        let registry = registry.borrow();
        let mut by_category: HashMap<&str, Vec<&str>> = HashMap::new();
        for entry in registry.values() {
            by_category
                .entry(&entry.category)
                .or_default()
                .push(&entry.name);
        }
        let mut categories: Vec<_> = by_category.into_iter().collect();
        categories.sort_by_key(|(category, _)| *category);

        let mut out = String::new();
        for (category, mut names) in categories {
            names.sort();
            out.push_str(category);
            out.push_str(":  ");
            out.push_str(&names.join(" "));
            out.push('\n');
        }
        out.push_str("\nUse (help name) for details on one primitive.\n");
        out
    })
}
