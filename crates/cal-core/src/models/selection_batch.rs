use serde::{Deserialize, Serialize};

use super::SampleIndex;

/// Unlabeled samples chosen in one round, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionBatch {
    indices: Vec<SampleIndex>,
}

impl SelectionBatch {
    pub fn new(indices: Vec<SampleIndex>) -> Self {
        Self { indices }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[SampleIndex] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SampleIndex> + '_ {
        self.indices.iter().copied()
    }
}

impl From<Vec<SampleIndex>> for SelectionBatch {
    fn from(indices: Vec<SampleIndex>) -> Self {
        Self::new(indices)
    }
}

impl IntoIterator for SelectionBatch {
    type Item = SampleIndex;
    type IntoIter = std::vec::IntoIter<SampleIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.into_iter()
    }
}
