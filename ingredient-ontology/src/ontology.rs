//! Ontology entries and the surface-form routing index.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

/// Token groups a downstream scorer uses to confirm a candidate match.
pub type ConfirmTokens = Vec<Vec<String>>;

/// Provisional external-catalog match awaiting human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdcCandidate {
    pub description: String,
    pub category: Option<String>,
    pub match_score: f64,
}

/// One canonical ingredient.
///
/// Fields this crate does not manage (curated metadata such as
/// `equivalenceClass`) are kept in `extra` and written back untouched.
///
/// Optional fields are tri-state: `None` when the key is absent,
/// `Some(None)` for an explicit `null`. Both are written back as read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyEntry {
    pub slug: String,
    pub display_name: String,
    #[serde(default)]
    pub surface_forms: Vec<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub confirm_tokens: Option<Option<ConfirmTokens>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub recipe_count: Option<Option<u64>>,
    /// Confirmed external-catalog link, opaque to this crate.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub fdc: Option<Option<serde_json::Value>>,
    /// `None`: never checked. `Some(None)`: checked, nothing found.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub fdc_candidate: Option<Option<FdcCandidate>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl OntologyEntry {
    pub fn new(slug: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            display_name: display_name.into(),
            surface_forms: Vec::new(),
            confirm_tokens: None,
            recipe_count: None,
            fdc: None,
            fdc_candidate: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Case-insensitive surface-form membership.
    pub fn has_surface_form(&self, form: &str) -> bool {
        let lower = form.to_lowercase();
        self.surface_forms.iter().any(|f| f.to_lowercase() == lower)
    }

    /// Append a surface form unless it is already present (case-insensitively).
    /// Returns whether the form was added.
    pub fn add_surface_form(&mut self, form: &str) -> bool {
        if self.has_surface_form(form) {
            return false;
        }
        self.surface_forms.push(form.to_string());
        true
    }
}

/// Sort entries by slug, the on-disk order.
pub fn sort_by_slug(entries: &mut [OntologyEntry]) {
    entries.sort_by(|a, b| a.slug.cmp(&b.slug));
}

/// Aggregate counts over an ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologySummary {
    pub entries: usize,
    pub surface_forms: usize,
    pub with_confirm_tokens: usize,
    pub with_recipe_count: usize,
}

impl OntologySummary {
    pub fn of(entries: &[OntologyEntry]) -> Self {
        Self {
            entries: entries.len(),
            surface_forms: entries.iter().map(|e| e.surface_forms.len()).sum(),
            with_confirm_tokens: entries
                .iter()
                .filter(|e| matches!(e.confirm_tokens, Some(Some(_))))
                .count(),
            with_recipe_count: entries
                .iter()
                .filter(|e| e.recipe_count.flatten().is_some())
                .count(),
        }
    }
}

// =============================================================================
// Surface index
// =============================================================================

/// Routing index over an ontology: lowercase surface form -> slug, and
/// slug -> position in the entry list.
///
/// Owned by a single merge pass and updated as forms are added, so every
/// lookup sees the writes made earlier in the same pass.
#[derive(Debug, Default)]
pub struct SurfaceIndex {
    by_form: HashMap<String, String>,
    by_slug: HashMap<String, usize>,
}

impl SurfaceIndex {
    /// Build the index. When a form appears on several entries the later
    /// entry wins, matching a plain flatten of the list.
    pub fn build(entries: &[OntologyEntry]) -> Self {
        let mut index = Self::default();
        for (pos, entry) in entries.iter().enumerate() {
            index.by_slug.insert(entry.slug.clone(), pos);
            for form in &entry.surface_forms {
                index.by_form.insert(form.to_lowercase(), entry.slug.clone());
            }
        }
        index
    }

    /// Slug a surface form routes to.
    pub fn slug_for_form(&self, form: &str) -> Option<&str> {
        self.by_form.get(&form.to_lowercase()).map(String::as_str)
    }

    /// Position of an entry in the indexed list.
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.by_slug.get(slug).copied()
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// Route a form to a slug.
    pub fn register(&mut self, form: &str, slug: &str) {
        self.by_form.insert(form.to_lowercase(), slug.to_string());
    }

    pub fn form_count(&self) -> usize {
        self.by_form.len()
    }
}

/// Lowercase set of every surface form in an ontology.
pub fn surface_form_set(entries: &[OntologyEntry]) -> HashSet<String> {
    entries
        .iter()
        .flat_map(|e| e.surface_forms.iter().map(|f| f.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(slug: &str, forms: &[&str]) -> OntologyEntry {
        let mut e = OntologyEntry::new(slug, slug);
        e.surface_forms = forms.iter().map(|f| f.to_string()).collect();
        e
    }

    #[test]
    fn test_add_surface_form_case_insensitive() {
        let mut e = entry("garlic", &["Garlic"]);
        assert!(!e.add_surface_form("garlic"));
        assert!(!e.add_surface_form("GARLIC"));
        assert!(e.add_surface_form("garlic cloves"));
        assert_eq!(e.surface_forms, vec!["Garlic", "garlic cloves"]);
    }

    #[test]
    fn test_deserialize_preserves_unknown_fields() {
        let value = json!({
            "slug": "ground-ginger",
            "displayName": "Ground Ginger",
            "surfaceForms": ["ground ginger"],
            "fdc": {"fdcId": 170926, "description": "Spices, ginger, ground"},
            "equivalenceClass": "ginger"
        });
        let e: OntologyEntry = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(e.extra["equivalenceClass"], "ginger");
        assert!(matches!(e.fdc, Some(Some(_))));
        assert_eq!(e.fdc_candidate, None);
        assert_eq!(serde_json::to_value(&e).unwrap(), value);
    }

    #[test]
    fn test_fdc_candidate_null_round_trips() {
        let value = json!({
            "slug": "ghee",
            "displayName": "Ghee",
            "surfaceForms": ["ghee"],
            "recipeCount": 120,
            "fdcCandidate": null
        });
        let e: OntologyEntry = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(e.fdc_candidate, Some(None));
        assert_eq!(serde_json::to_value(&e).unwrap(), value);
    }

    #[test]
    fn test_null_curated_fields_round_trip() {
        let value = json!({
            "slug": "water",
            "displayName": "Water",
            "surfaceForms": ["water"],
            "fdc": null,
            "confirmTokens": null,
            "recipeCount": null
        });
        let e: OntologyEntry = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(e.fdc, Some(None));
        assert_eq!(e.confirm_tokens, Some(None));
        assert_eq!(e.recipe_count, Some(None));
        assert!(e.extra.is_empty());
        assert_eq!(serde_json::to_value(&e).unwrap(), value);
    }

    #[test]
    fn test_fdc_candidate_object() {
        let value = json!({
            "slug": "ghee",
            "displayName": "Ghee",
            "fdcCandidate": {
                "description": "Butter oil, anhydrous",
                "category": "Dairy and Egg Products",
                "matchScore": 0.62
            }
        });
        let e: OntologyEntry = serde_json::from_value(value).unwrap();
        let candidate = e.fdc_candidate.flatten().unwrap();
        assert_eq!(candidate.description, "Butter oil, anhydrous");
        assert!((candidate.match_score - 0.62).abs() < f64::EPSILON);
    }

    #[test]
    fn test_surface_index_routes_and_updates() {
        let entries = vec![entry("garlic", &["Garlic", "garlic cloves"]), entry("salt", &[])];
        let mut index = SurfaceIndex::build(&entries);

        assert_eq!(index.slug_for_form("GARLIC"), Some("garlic"));
        assert_eq!(index.position("salt"), Some(1));
        assert!(index.slug_for_form("sea salt").is_none());

        index.register("Sea Salt", "salt");
        assert_eq!(index.slug_for_form("sea salt"), Some("salt"));
        assert_eq!(index.form_count(), 3);
    }

    #[test]
    fn test_summary() {
        let mut a = entry("a", &["a", "aa"]);
        a.recipe_count = Some(Some(3));
        let mut b = entry("b", &["b"]);
        b.confirm_tokens = Some(Some(vec![vec!["b".to_string()]]));
        let mut c = entry("c", &[]);
        c.confirm_tokens = Some(None);
        c.recipe_count = Some(None);
        let summary = OntologySummary::of(&[a, b, c]);

        assert_eq!(
            summary,
            OntologySummary {
                entries: 3,
                surface_forms: 3,
                with_confirm_tokens: 1,
                with_recipe_count: 1,
            }
        );
    }
}
