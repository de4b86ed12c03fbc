use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Label vocabulary of the randomization prioritization activity
pub const DEFAULT_EXPECTED_LABELS: [&str; 5] = [
    "Housing location randomization",
    "Treatment administration order",
    "Behavioral testing order",
    "Euthanasia/tissue collection order",
    "Sample processing randomization",
];

/// Ordered set of labels an activity expects users to place.
///
/// Order is significant: it fixes the `node-<k>` ids and the tiebreak
/// of the aggregated ranking. Duplicates are dropped, keeping the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelSet {
    /// Build a label set from any sequence of labels
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self {
            labels: Vec::new(),
            index: HashMap::new(),
        };
        for label in labels {
            let label = label.into();
            if !set.index.contains_key(&label) {
                set.index.insert(label.clone(), set.labels.len());
                set.labels.push(label);
            }
        }
        set
    }

    /// Zero-based position of a label, if it is expected
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Whether the label is part of the vocabulary
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Labels in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no labels are expected
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXPECTED_LABELS)
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.labels.serialize(serializer)
    }
}
