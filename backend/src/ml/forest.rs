use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Bagged ensemble of Gini-impurity decision trees with majority voting.
///
/// Each tree is trained on a bootstrap sample drawn with a per-tree seed
/// derived from the forest seed, so a fit over the same data always
/// produces the same forest and the same predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits `n_estimators` trees over encoded feature rows. Non-incremental:
    /// the full training set is consumed in one call.
    pub fn fit(
        rows: &[Vec<f32>],
        labels: &[usize],
        n_estimators: usize,
        seed: u64,
    ) -> Result<Self, ModelError> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let n_samples = rows.len();
        let mut trees = Vec::with_capacity(n_estimators);
        for i in 0..n_estimators {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let sample: Vec<usize> = (0..n_samples)
                .map(|_| rng.random_range(0..n_samples))
                .collect();
            trees.push(DecisionTree::fit(rows, labels, &sample));
        }
        Ok(Self { trees })
    }

    /// Majority vote across trees; ties resolve to the lowest class index.
    pub fn predict_one(&self, row: &[f32]) -> usize {
        let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict_one(row)).or_insert(0) += 1;
        }

        let mut best_class = 0;
        let mut best_votes = 0;
        for (class, count) in votes {
            if count > best_votes {
                best_votes = count;
                best_class = class;
            }
        }
        best_class
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    fn fit(rows: &[Vec<f32>], labels: &[usize], indices: &[usize]) -> Self {
        Self {
            root: build_node(rows, labels, indices),
        }
    }

    fn predict_one(&self, row: &[f32]) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn build_node(rows: &[Vec<f32>], labels: &[usize], indices: &[usize]) -> TreeNode {
    let subset: Vec<usize> = indices.iter().map(|&i| labels[i]).collect();
    if gini_impurity(&subset) == 0.0 {
        return TreeNode::Leaf {
            class: majority_class(&subset),
        };
    }

    let Some((feature, threshold)) = find_best_split(rows, labels, indices) else {
        return TreeNode::Leaf {
            class: majority_class(&subset),
        };
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] <= threshold);

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(rows, labels, &left)),
        right: Box::new(build_node(rows, labels, &right)),
    }
}

/// Exhaustive split search: every midpoint between consecutive distinct
/// values of every feature is a candidate; the lowest weighted Gini wins.
/// Returns None when no candidate separates the subset into two non-empty
/// halves, which is the leaf condition for identical rows with mixed labels.
fn find_best_split(
    rows: &[Vec<f32>],
    labels: &[usize],
    indices: &[usize],
) -> Option<(usize, f32)> {
    let n_features = rows[indices[0]].len();
    let mut best: Option<(usize, f32, f32)> = None;

    for feature in 0..n_features {
        let mut values: Vec<f32> = indices.iter().map(|&i| rows[i][feature]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let mut left = Vec::new();
            let mut right = Vec::new();
            for &i in indices {
                if rows[i][feature] <= threshold {
                    left.push(labels[i]);
                } else {
                    right.push(labels[i]);
                }
            }
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let score = gini_split(&left, &right);
            if best.is_none_or(|(_, _, s)| score < s) {
                best = Some((feature, threshold, score));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Gini = 1 - sum(p_i^2) over the class distribution.
fn gini_impurity(labels: &[usize]) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let n = labels.len() as f32;
    let mut gini = 1.0;
    for count in counts.values() {
        let p = *count as f32 / n;
        gini -= p * p;
    }
    gini
}

fn gini_split(left: &[usize], right: &[usize]) -> f32 {
    let n_left = left.len() as f32;
    let n_right = right.len() as f32;
    let n_total = n_left + n_right;
    (n_left / n_total) * gini_impurity(left) + (n_right / n_total) * gini_impurity(right)
}

fn majority_class(labels: &[usize]) -> usize {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut best_class = 0;
    let mut best_count = 0;
    for (class, count) in counts {
        if count > best_count {
            best_count = count;
            best_class = class;
        }
    }
    best_class
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f32>>, Vec<usize>) {
        // Three well-separated clusters in encoded-category space.
        let rows = vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![3.0, 3.0, 2.0],
            vec![3.0, 4.0, 2.0],
            vec![4.0, 3.0, 2.0],
            vec![7.0, 0.0, 5.0],
            vec![7.0, 1.0, 5.0],
            vec![8.0, 0.0, 5.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (rows, labels)
    }

    #[test]
    fn gini_of_pure_set_is_zero() {
        assert_eq!(gini_impurity(&[1, 1, 1]), 0.0);
        assert_eq!(gini_impurity(&[]), 0.0);
    }

    #[test]
    fn gini_of_even_binary_split_is_half() {
        let g = gini_impurity(&[0, 0, 1, 1]);
        assert!((g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn forest_learns_separable_clusters() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, 25, 7).unwrap();
        assert_eq!(forest.n_trees(), 25);
        for (row, &label) in rows.iter().zip(&labels) {
            assert_eq!(forest.predict_one(row), label);
        }
    }

    #[test]
    fn same_seed_gives_identical_predictions() {
        let (rows, labels) = separable();
        let a = RandomForest::fit(&rows, &labels, 15, 42).unwrap();
        let b = RandomForest::fit(&rows, &labels, 15, 42).unwrap();
        let probe = vec![2.0, 2.0, 1.0];
        assert_eq!(a.predict_one(&probe), b.predict_one(&probe));
    }

    #[test]
    fn fit_on_empty_data_is_an_error() {
        let err = RandomForest::fit(&[], &[], 10, 0).unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrainingSet));
    }

    #[test]
    fn identical_rows_with_mixed_labels_fall_back_to_majority() {
        let rows = vec![vec![1.0, 1.0, 1.0]; 6];
        let labels = vec![1, 1, 1, 1, 1, 0];
        let forest = RandomForest::fit(&rows, &labels, 25, 3).unwrap();
        assert_eq!(forest.predict_one(&[1.0, 1.0, 1.0]), 1);
    }
}
