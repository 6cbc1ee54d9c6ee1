//! Label sets: flat lists and two-level taxonomies.

use super::CategorizeError;
use serde::Deserialize;
use std::collections::HashSet;

/// A main label with its ordered subcategories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Main label.
    pub label: String,
    /// Subcategory labels; empty means no further refinement.
    pub subcategories: Vec<String>,
}

impl Category {
    /// Category with no subcategories.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            subcategories: Vec::new(),
        }
    }

    /// Category refined by `subcategories`.
    pub fn with_subcategories<I, S>(label: impl Into<String>, subcategories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            subcategories: subcategories.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered mapping from main labels to subcategory labels.
///
/// Main labels are unique, and so are the subcategories within one category. The same
/// subcategory name may appear under different main labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTree {
    categories: Vec<Category>,
    main_labels: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaxonomyEntry {
    Label(String),
    Category {
        label: String,
        #[serde(default, alias = "subcategories")]
        subtopics: Vec<String>,
    },
}

impl LabelTree {
    /// Build a tree, rejecting duplicate labels.
    pub fn new(categories: Vec<Category>) -> Result<Self, CategorizeError> {
        ensure_unique(categories.iter().map(|category| category.label.as_str()))?;
        for category in &categories {
            ensure_unique(category.subcategories.iter().map(String::as_str))?;
        }
        let main_labels = categories
            .iter()
            .map(|category| category.label.clone())
            .collect();
        Ok(Self {
            categories,
            main_labels,
        })
    }

    /// Build a one-level tree from plain labels.
    pub fn flat<I, S>(labels: I) -> Result<Self, CategorizeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(Category::leaf).collect())
    }

    /// Parse a JSON taxonomy.
    ///
    /// Accepts an array whose entries are either plain strings or
    /// `{"label": .., "subtopics": [..]}` objects (`subcategories` is accepted as well).
    pub fn from_json_str(input: &str) -> Result<Self, CategorizeError> {
        let entries: Vec<TaxonomyEntry> = serde_json::from_str(input)
            .map_err(|error| CategorizeError::InvalidTaxonomy(error.to_string()))?;
        let categories = entries
            .into_iter()
            .map(|entry| match entry {
                TaxonomyEntry::Label(label) => Category::leaf(label),
                TaxonomyEntry::Category { label, subtopics } => {
                    Category::with_subcategories(label, subtopics)
                }
            })
            .collect::<Vec<_>>();
        if let Some(blank) = categories.iter().find(|c| c.label.trim().is_empty()) {
            return Err(CategorizeError::InvalidTaxonomy(format!(
                "blank main label '{}'",
                blank.label
            )));
        }
        Self::new(categories)
    }

    /// Main labels in taxonomy order.
    pub fn main_labels(&self) -> &[String] {
        &self.main_labels
    }

    /// Categories in taxonomy order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Subcategories of `main_label`, or `None` when it is not a main label.
    pub fn subcategories(&self, main_label: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|category| category.label == main_label)
            .map(|category| category.subcategories.as_slice())
    }

    /// Whether the tree holds no labels.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Reject the first label that occurs twice.
pub(crate) fn ensure_unique<'a>(
    labels: impl IntoIterator<Item = &'a str>,
) -> Result<(), CategorizeError> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(CategorizeError::DuplicateLabel(label.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_taxonomy() {
        let tree = LabelTree::from_json_str(
            r#"[
                {"label": "Security", "subtopics": ["Cybersecurity", "Mobile Security"]},
                {"label": "Health"},
                "Finance"
            ]"#,
        )
        .expect("taxonomy");

        assert_eq!(tree.main_labels(), ["Security", "Health", "Finance"]);
        assert_eq!(
            tree.subcategories("Security"),
            Some(&["Cybersecurity".to_string(), "Mobile Security".to_string()][..])
        );
        assert_eq!(tree.subcategories("Health"), Some(&[][..]));
        assert_eq!(tree.subcategories("Sports"), None);
    }

    #[test]
    fn accepts_subcategories_alias() {
        let tree =
            LabelTree::from_json_str(r#"[{"label": "Science", "subcategories": ["Physics"]}]"#)
                .expect("taxonomy");
        assert_eq!(tree.categories()[0].subcategories, vec!["Physics"]);
    }

    #[test]
    fn rejects_duplicate_main_labels() {
        let error = LabelTree::flat(["Health", "Finance", "Health"]).expect_err("duplicate");
        assert!(matches!(error, CategorizeError::DuplicateLabel(label) if label == "Health"));
    }

    #[test]
    fn rejects_duplicate_subcategories_within_a_category() {
        let error = LabelTree::new(vec![Category::with_subcategories(
            "Security",
            ["Network", "Network"],
        )])
        .expect_err("duplicate");
        assert!(matches!(error, CategorizeError::DuplicateLabel(_)));
    }

    #[test]
    fn allows_shared_subcategory_names_across_categories() {
        let tree = LabelTree::new(vec![
            Category::with_subcategories("Security", ["General"]),
            Category::with_subcategories("Health", ["General"]),
        ]);
        assert!(tree.is_ok());
    }

    #[test]
    fn rejects_malformed_json() {
        let error = LabelTree::from_json_str(r#"{"Security": []}"#).expect_err("object");
        assert!(matches!(error, CategorizeError::InvalidTaxonomy(_)));
    }
}
