//! Random forest classifier.
//!
//! Bagged CART trees with Gini impurity. Each tree is grown on a bootstrap
//! sample and considers a random subset of `floor(sqrt(n_features))` features
//! at every split, widening the search only when none of those features can
//! separate the node. Class probabilities are the mean of the per-tree leaf
//! distributions.
//!
//! Feature importance is the mean decrease in impurity: the weighted Gini
//! decrease of every split, normalized per tree, averaged across trees and
//! normalized again so it sums to 1.

use crate::config::TrainingConfig;
use crate::error::{Result, TrainingError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gini impurity of a class count vector.
pub fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// A single CART tree stored as a flat node arena, root first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Class distribution of the leaf `row` falls into.
    pub fn predict_proba_row(&self, row: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    id = if value <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    weighted_impurity: f64,
    left_impurity: f64,
    right_impurity: f64,
    n_left: usize,
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_classes: usize,
    n_features: usize,
    max_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    n_samples: f64,
    rng: StdRng,
    nodes: Vec<Node>,
    importance: Vec<f64>,
}

impl TreeBuilder<'_> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    fn leaf(&mut self, id: usize, counts: &[usize], n: usize) {
        let distribution = counts.iter().map(|&c| c as f64 / n as f64).collect();
        self.nodes[id] = Node::Leaf { distribution };
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let n = indices.len();
        let counts = self.class_counts(&indices);
        let impurity = gini(&counts, n);

        let stop = impurity <= 0.0
            || n < self.min_samples_split
            || self.max_depth.is_some_and(|max| depth >= max);
        if stop {
            self.leaf(id, &counts, n);
            return id;
        }

        let Some(split) = self.best_split(&indices, &counts) else {
            self.leaf(id, &counts, n);
            return id;
        };

        let n_right = n - split.n_left;
        self.importance[split.feature] += (n as f64 * impurity
            - split.n_left as f64 * split.left_impurity
            - n_right as f64 * split.right_impurity)
            / self.n_samples;

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][split.feature] <= split.threshold);

        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn best_split(&mut self, indices: &[usize], counts: &[usize]) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut self.rng);

        let n = indices.len();
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_counts = vec![0; self.n_classes];
            let mut right_counts = counts.to_vec();

            for pos in 0..n - 1 {
                let class = self.y[order[pos]];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let current = self.x[order[pos]][feature];
                let next = self.x[order[pos + 1]][feature];
                if current >= next {
                    continue;
                }

                let n_left = pos + 1;
                let left_impurity = gini(&left_counts, n_left);
                let right_impurity = gini(&right_counts, n - n_left);
                let weighted_impurity = (n_left as f64 * left_impurity
                    + (n - n_left) as f64 * right_impurity)
                    / n as f64;

                if best
                    .as_ref()
                    .is_none_or(|b| weighted_impurity < b.weighted_impurity)
                {
                    let mut threshold = current + (next - current) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        weighted_impurity,
                        left_impurity,
                        right_impurity,
                        n_left,
                    });
                }
            }
        }

        best
    }
}

/// An ensemble of CART trees voting by averaged class probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    n_classes: usize,
    n_features: usize,
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl RandomForestClassifier {
    /// Fit on row-major features `x` and class codes `y` in `0..n_classes`.
    ///
    /// Bootstrap samples and feature subsets are drawn from a generator
    /// seeded with `config.random_seed`, so fitting is deterministic.
    ///
    /// # Errors
    ///
    /// [`TrainingError::TrainingFailure`] for empty or inconsistent input.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        config: &TrainingConfig,
    ) -> Result<Self> {
        let n = x.len();
        if n == 0 || n != y.len() {
            return Err(TrainingError::TrainingFailure(format!(
                "random forest needs matching non-empty inputs, got {} rows and {} labels",
                n,
                y.len()
            )));
        }
        if n_classes == 0 || y.iter().any(|&c| c >= n_classes) {
            return Err(TrainingError::TrainingFailure(
                "class codes out of range".to_string(),
            ));
        }
        let n_features = x[0].len();
        if x.iter().any(|row| row.len() != n_features) {
            return Err(TrainingError::TrainingFailure(
                "feature rows have different lengths".to_string(),
            ));
        }

        let max_features = ((n_features as f64).sqrt().floor() as usize).max(1);
        let mut seeder = StdRng::seed_from_u64(config.random_seed);
        let mut trees = Vec::with_capacity(config.n_estimators);
        let mut importances = vec![0.0; n_features];

        for _ in 0..config.n_estimators {
            let mut rng = StdRng::seed_from_u64(seeder.r#gen::<u64>());
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut builder = TreeBuilder {
                x,
                y,
                n_classes,
                n_features,
                max_features,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                n_samples: n as f64,
                rng,
                nodes: Vec::new(),
                importance: vec![0.0; n_features],
            };
            builder.build(sample, 0);

            let total: f64 = builder.importance.iter().sum();
            if total > 0.0 {
                for (acc, value) in importances.iter_mut().zip(&builder.importance) {
                    *acc += value / total;
                }
            }
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        debug!(
            "Grew {} trees over {} features ({} per split)",
            trees.len(),
            n_features,
            max_features
        );

        Ok(Self {
            n_classes,
            n_features,
            trees,
            importances,
        })
    }

    /// Mean class distribution across trees.
    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba_row(row)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    /// Most probable class code; ties go to the lowest code.
    pub fn predict_row(&self, row: &[f64]) -> usize {
        argmax(&self.predict_proba_row(row))
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Normalized mean decrease in impurity per feature.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feature 0 decides the class; feature 1 is noise.
    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let noise = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0, 8.0];
        let x: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, noise[i]]).collect();
        let y = (0..12).map(|i| usize::from(i >= 6)).collect();
        (x, y)
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig::builder().n_estimators(25).build().unwrap()
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert_eq!(gini(&[2, 2], 4), 0.5);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_fits_separable_data() {
        // every threshold lands in the gap between 5 and 100
        let x: Vec<Vec<f64>> = (0..6)
            .chain(100..106)
            .map(|v| vec![v as f64])
            .collect();
        let y: Vec<usize> = (0..12).map(|i| usize::from(i >= 6)).collect();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();

        assert_eq!(forest.predict(&x), y);
        assert_eq!(forest.predict_row(&[-3.0]), 0);
        assert_eq!(forest.predict_row(&[250.0]), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = separable();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        let proba = forest.predict_proba_row(&[5.5, 2.0]);
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_importances_normalized_and_informative_feature_wins() {
        let (x, y) = separable();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        let importances = forest.importances();

        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let a = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        let b = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_max_depth_limits_trees() {
        let (x, y) = separable();
        let config = TrainingConfig::builder()
            .n_estimators(10)
            .max_depth(1)
            .build()
            .unwrap();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &config).unwrap();
        assert!(forest.trees().iter().all(|t| t.depth() <= 1));
    }

    #[test]
    fn test_single_class_has_no_splits() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let forest = RandomForestClassifier::fit(&x, &[0, 0, 0], 1, &small_config()).unwrap();

        assert!(forest.trees().iter().all(|t| t.node_count() == 1));
        assert_eq!(forest.importances(), &[0.0]);
        assert_eq!(forest.predict_row(&[10.0]), 0);
    }

    #[test]
    fn test_rejects_out_of_range_labels() {
        let x = vec![vec![1.0], vec![2.0]];
        assert!(RandomForestClassifier::fit(&x, &[0, 2], 2, &small_config()).is_err());
    }

    #[test]
    fn test_argmax_prefers_first() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.3, 0.5]), 2);
    }
}
