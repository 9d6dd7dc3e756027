//! Non-parametric classification by similarity to prototypes.

use burn::prelude::*;

use ccbr_core::{SimilarityMetric, COSINE_EPS};

use super::prototype::Prototypes;
use crate::error::Result;

/// Scores query features against prototypes with a fixed metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrototypeClassifier {
    metric: SimilarityMetric,
}

impl PrototypeClassifier {
    /// Create a classifier from a metric name (`cosine` or `euclidean`).
    ///
    /// Unknown names fail here, before any tensor is touched.
    pub fn new(method: &str, scaler: f32) -> Result<Self> {
        Ok(Self::from_metric(SimilarityMetric::from_name(method, scaler)?))
    }

    /// Create a classifier from an already parsed metric.
    pub fn from_metric(metric: SimilarityMetric) -> Self {
        Self { metric }
    }

    /// The metric in use.
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Similarity of every query point to one prototype.
    ///
    /// Input: query `[n_queries, feat_dim, n_points]`, prototype `[feat_dim]`
    /// Output: `[n_queries, n_points]`
    pub fn score<B: Backend>(&self, query: Tensor<B, 3>, prototype: Tensor<B, 1>) -> Tensor<B, 2> {
        let [n_queries, feat_dim, n_points] = query.dims();
        let prototype: Tensor<B, 3> = prototype.reshape([1, feat_dim, 1]);

        let score = match self.metric {
            SimilarityMetric::Cosine { scale } => {
                let dot = (query.clone() * prototype.clone()).sum_dim(1);
                let query_norm = (query.clone() * query).sum_dim(1).sqrt().clamp_min(COSINE_EPS);
                let proto_norm = (prototype.clone() * prototype)
                    .sum_dim(1)
                    .sqrt()
                    .clamp_min(COSINE_EPS);
                (dot / (query_norm * proto_norm)).mul_scalar(scale)
            }
            SimilarityMetric::Euclidean => {
                let diff = query - prototype;
                (diff.clone() * diff).sum_dim(1).neg()
            }
        };

        score.reshape([n_queries, n_points])
    }

    /// Score map of every query point against every prototype.
    ///
    /// Output: `[n_queries, n_way + 1, n_points]`, class 0 background
    pub fn score_map<B: Backend>(&self, query: Tensor<B, 3>, prototypes: &Prototypes<B>) -> Tensor<B, 3> {
        let scores: Vec<Tensor<B, 2>> = prototypes
            .to_vec()
            .into_iter()
            .map(|prototype| self.score(query.clone(), prototype))
            .collect();

        Tensor::stack(scores, 1)
    }

    /// Arg-max label of every query point.
    ///
    /// Input: score map `[n_queries, classes, n_points]`
    /// Output: `[n_queries, n_points]`
    pub fn classify<B: Backend>(scores: Tensor<B, 3>) -> Tensor<B, 2, Int> {
        let [n_queries, _, n_points] = scores.dims();
        scores.argmax(1).reshape([n_queries, n_points])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn query(values: Vec<f32>, shape: [usize; 3]) -> Tensor<TestBackend, 3> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    fn proto(values: Vec<f32>) -> Tensor<TestBackend, 1> {
        let n = values.len();
        Tensor::from_data(TensorData::new(values, [n]), &Default::default())
    }

    #[test]
    fn test_cosine_aligned_equals_scale() {
        let classifier = PrototypeClassifier::new("cosine", 20.0).unwrap();
        // 1 query, 2 channels, 2 points: (2, 0) and (0, 3)
        let q = query(vec![2.0, 0.0, 0.0, 3.0], [1, 2, 2]);

        let scores: Vec<f32> = classifier
            .score(q, proto(vec![1.0, 0.0]))
            .to_data()
            .to_vec()
            .unwrap();

        assert!((scores[0] - 20.0).abs() < 1e-4);
        assert!(scores[1].abs() < 1e-4);
    }

    #[test]
    fn test_cosine_zero_vector_is_finite() {
        let classifier = PrototypeClassifier::new("cosine", 20.0).unwrap();
        let q = query(vec![0.0, 0.0], [1, 2, 1]);

        let scores: Vec<f32> = classifier
            .score(q, proto(vec![0.0, 0.0]))
            .to_data()
            .to_vec()
            .unwrap();
        assert!(scores[0].is_finite());
    }

    #[test]
    fn test_euclidean_is_negative_squared_distance() {
        let classifier = PrototypeClassifier::new("euclidean", 20.0).unwrap();
        let q = query(vec![1.0, 4.0, 2.0, 6.0], [1, 2, 2]);

        let scores: Vec<f32> = classifier
            .score(q, proto(vec![1.0, 2.0]))
            .to_data()
            .to_vec()
            .unwrap();

        // point 0 = (1, 2): distance 0; point 1 = (4, 6): 9 + 16
        assert_eq!(scores, vec![0.0, -25.0]);
    }

    #[test]
    fn test_unknown_method() {
        let err = PrototypeClassifier::new("manhattan", 1.0).unwrap_err();
        assert!(err.to_string().contains("manhattan"));
    }

    #[test]
    fn test_score_map_and_classify() {
        let device = Default::default();
        let classifier = PrototypeClassifier::from_metric(SimilarityMetric::Euclidean);
        let prototypes = Prototypes::<TestBackend> {
            background: Tensor::from_data(TensorData::new(vec![0.0f32], [1]), &device),
            foreground: Tensor::from_data(TensorData::new(vec![5.0f32, 10.0], [2, 1]), &device),
        };
        let q = query(vec![0.1, 4.0, 11.0], [1, 1, 3]);

        let scores = classifier.score_map(q, &prototypes);
        assert_eq!(scores.dims(), [1, 3, 3]);

        let labels: Vec<i64> = PrototypeClassifier::classify(scores)
            .to_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }
}
