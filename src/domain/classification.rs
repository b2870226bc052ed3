// ============================================================
// Layer 3 - Classification Domain Types
// ============================================================
// ClassificationResult is what a single `predict` call returns.
// LabelMap is the fixed bijection between label names and the
// dense 0-based ids used as classification-head outputs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// A predicted label with its softmax probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Probability in [0, 1]
    pub score: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Ordered, immutable label set.
///
/// Ids follow the order the names were given in, so
/// `LabelMap::new(["facture", "autre"])` maps facture→0, autre→1.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl LabelMap {
    /// Build the mapping. Fails on an empty list or a repeated name.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = labels.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::InvalidConfig("label set must not be empty".into()));
        }

        let mut ids = HashMap::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            if ids.insert(name.clone(), id).is_some() {
                return Err(Error::InvalidConfig(format!("duplicate label '{name}'")));
            }
        }

        Ok(Self { names, ids })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn id(&self, label: &str) -> Result<usize> {
        self.ids
            .get(label)
            .copied()
            .ok_or_else(|| Error::LabelLookup(label.to_string()))
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Map a whole label column to ids, failing on the first unknown label.
    pub fn ids_for<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.id(l.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_constructor_order() {
        let map = LabelMap::new(["facture", "bulletin", "identite"]).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.id("facture").unwrap(), 0);
        assert_eq!(map.id("identite").unwrap(), 2);
        assert_eq!(map.name(1), Some("bulletin"));
        assert_eq!(map.name(3), None);
    }

    #[test]
    fn test_unknown_label_is_a_lookup_error() {
        let map = LabelMap::new(["facture", "autre"]).unwrap();
        assert!(matches!(map.id("courrier"), Err(Error::LabelLookup(l)) if l == "courrier"));
        assert!(map.ids_for(&["autre", "courrier"]).is_err());
        assert_eq!(map.ids_for(&["autre", "facture"]).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            LabelMap::new(Vec::<String>::new()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            LabelMap::new(["a", "b", "a"]),
            Err(Error::InvalidConfig(_))
        ));
    }
}
