//! Seeded split of the dataset into labeled, unlabeled and validation sets.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;

use cal_core::constants::PARTITION_STREAM;
use cal_core::errors::{ConfigError, InvariantViolation};
use cal_core::models::{RunRecord, SampleIndex, SelectionBatch};
use cal_core::rng::seeded_stream;
use cal_core::config::check_split_ratios;
use cal_core::ExperimentConfig;

/// Disjoint labeled (L), unlabeled (U) and validation (V) sets whose union
/// is the whole dataset.
///
/// V is fixed at creation. The only mutation is [`move_to_labeled`], which
/// moves a batch from U to L as a whole or not at all.
///
/// [`move_to_labeled`]: DatasetPartition::move_to_labeled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPartition {
    labeled: BTreeSet<SampleIndex>,
    unlabeled: BTreeSet<SampleIndex>,
    validation: BTreeSet<SampleIndex>,
}

impl DatasetPartition {
    /// Shuffle `all_indices` with the seed's partition stream, take the first
    /// `round(val_ratio * n)` as V, the next `round(init_lbl_ratio * n)` as L
    /// and the rest as U.
    ///
    /// The split depends on the set of indices, not on their input order.
    pub fn initialize(
        all_indices: &[SampleIndex],
        init_lbl_ratio: f64,
        val_ratio: f64,
        seed: u64,
        updates_required: usize,
    ) -> Result<Self, ConfigError> {
        check_split_ratios(init_lbl_ratio, val_ratio)?;

        let mut shuffled = all_indices.to_vec();
        shuffled.sort_unstable();
        if let Some(pair) = shuffled.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateIndex { index: pair[0] });
        }

        let n = shuffled.len();
        let n_val = ((val_ratio * n as f64).round() as usize).min(n);
        let n_lbl = ((init_lbl_ratio * n as f64).round() as usize).min(n - n_val);
        if n - n_val - n_lbl == 0 && updates_required > 0 {
            return Err(ConfigError::EmptyUnlabeled {
                total: n,
                updates: updates_required,
            });
        }

        shuffled.shuffle(&mut seeded_stream(seed, PARTITION_STREAM));
        let validation = shuffled[..n_val].iter().copied().collect();
        let labeled = shuffled[n_val..n_val + n_lbl].iter().copied().collect();
        let unlabeled = shuffled[n_val + n_lbl..].iter().copied().collect();

        tracing::debug!(
            seed,
            labeled = n_lbl,
            validation = n_val,
            unlabeled = n - n_val - n_lbl,
            "partition initialized"
        );

        Ok(Self {
            labeled,
            unlabeled,
            validation,
        })
    }

    /// [`initialize`](Self::initialize) with the ratios and round count of
    /// an experiment config.
    pub fn from_config(
        config: &ExperimentConfig,
        all_indices: &[SampleIndex],
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::initialize(
            all_indices,
            config.dataset.init_lbl_ratio,
            config.dataset.val_ratio,
            seed,
            config.updates_required(),
        )
    }

    /// Move a batch from U to L.
    ///
    /// The whole batch is checked first; on error the partition is unchanged.
    pub fn move_to_labeled(&mut self, batch: &SelectionBatch) -> Result<(), InvariantViolation> {
        let mut seen = BTreeSet::new();
        for index in batch.iter() {
            if self.labeled.contains(&index) {
                return Err(InvariantViolation::AlreadyLabeled { index });
            }
            if !self.unlabeled.contains(&index) {
                return Err(InvariantViolation::NotUnlabeled { index });
            }
            if !seen.insert(index) {
                return Err(InvariantViolation::DuplicateInBatch { index });
            }
        }
        for index in batch.iter() {
            self.unlabeled.remove(&index);
            self.labeled.insert(index);
        }
        Ok(())
    }

    pub fn size_labeled(&self) -> usize {
        self.labeled.len()
    }

    pub fn size_unlabeled(&self) -> usize {
        self.unlabeled.len()
    }

    pub fn size_validation(&self) -> usize {
        self.validation.len()
    }

    /// `|L| + |U| + |V|`.
    pub fn size(&self) -> usize {
        self.labeled.len() + self.unlabeled.len() + self.validation.len()
    }

    /// Labeled indices, ascending.
    pub fn labeled(&self) -> Vec<SampleIndex> {
        self.labeled.iter().copied().collect()
    }

    /// Unlabeled indices, ascending.
    pub fn unlabeled(&self) -> Vec<SampleIndex> {
        self.unlabeled.iter().copied().collect()
    }

    /// Validation indices, ascending.
    pub fn validation(&self) -> Vec<SampleIndex> {
        self.validation.iter().copied().collect()
    }

    pub fn is_labeled(&self, index: SampleIndex) -> bool {
        self.labeled.contains(&index)
    }

    pub fn is_unlabeled(&self, index: SampleIndex) -> bool {
        self.unlabeled.contains(&index)
    }

    /// Check that L, U and V are pairwise disjoint and cover `all` exactly.
    pub fn check_invariants(&self, all: &[SampleIndex]) -> Result<(), InvariantViolation> {
        let disjoint = |a: &BTreeSet<SampleIndex>, b: &BTreeSet<SampleIndex>, what: &str| {
            match a.intersection(b).next() {
                Some(index) => Err(InvariantViolation::Disjointness {
                    details: format!("sample {index} is in both {what}"),
                }),
                None => Ok(()),
            }
        };
        disjoint(&self.labeled, &self.unlabeled, "L and U")?;
        disjoint(&self.labeled, &self.validation, "L and V")?;
        disjoint(&self.unlabeled, &self.validation, "U and V")?;

        let all: BTreeSet<SampleIndex> = all.iter().copied().collect();
        let union: BTreeSet<SampleIndex> = self
            .labeled
            .iter()
            .chain(&self.unlabeled)
            .chain(&self.validation)
            .copied()
            .collect();
        if let Some(index) = all.difference(&union).next() {
            return Err(InvariantViolation::Disjointness {
                details: format!("sample {index} is in no set"),
            });
        }
        if let Some(index) = union.difference(&all).next() {
            return Err(InvariantViolation::Disjointness {
                details: format!("sample {index} is not in the dataset"),
            });
        }
        Ok(())
    }

    /// Re-apply the batches of committed records, in round order, to a
    /// freshly initialized partition.
    ///
    /// Rounds must run 0, 1, 2, ... without gaps, round 0 must carry no batch,
    /// and the set sizes after each step must match the record.
    pub fn replay(&mut self, history: &[RunRecord]) -> Result<(), InvariantViolation> {
        for (expected_round, record) in history.iter().enumerate() {
            if record.round != expected_round {
                return Err(InvariantViolation::HistoryMismatch {
                    details: format!("expected round {expected_round}, found {}", record.round),
                });
            }
            match (&record.acquired, record.round) {
                (Some(_), 0) => {
                    return Err(InvariantViolation::HistoryMismatch {
                        details: "round 0 carries an acquired batch".to_string(),
                    })
                }
                (Some(batch), _) => self.move_to_labeled(batch)?,
                (None, 0) => {}
                (None, round) => {
                    return Err(InvariantViolation::HistoryMismatch {
                        details: format!("round {round} has no acquired batch"),
                    })
                }
            }
            let sizes = (self.size_labeled(), self.size_unlabeled(), self.size_validation());
            if sizes != (record.labeled, record.unlabeled, record.validation) {
                return Err(InvariantViolation::HistoryMismatch {
                    details: format!(
                        "round {}: partition is (L={}, U={}, V={}), record says (L={}, U={}, V={})",
                        record.round,
                        sizes.0,
                        sizes.1,
                        sizes.2,
                        record.labeled,
                        record.unlabeled,
                        record.validation
                    ),
                });
            }
        }
        Ok(())
    }
}
