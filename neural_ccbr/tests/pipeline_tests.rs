//! Integration tests for the prototype pipeline.

use burn::backend::NdArray;
use burn::prelude::*;

use ccbr_core::{CcbrCoreError, EpisodeShape, GroupingScheme};
use neural_ccbr::{
    config::{BiasCorrectionConfig, ProtoNetConfig},
    eval::{evaluate, MetricsTracker},
    proto::{cross_entropy_loss, foreground_background, PrototypeClassifier, Prototypes},
    Episode, NeuralCcbrError, ProtoNet,
};

type TestBackend = NdArray;

/// 2-way 1-shot, 3 channels, 4 points; way 0 is constant 1.0, way 1 constant 2.0.
fn constant_support() -> Tensor<TestBackend, 4> {
    let mut values = vec![1.0f32; 12];
    values.extend(vec![2.0f32; 12]);
    Tensor::from_data(TensorData::new(values, [2, 1, 3, 4]), &Default::default())
}

fn values<const D: usize>(tensor: Tensor<TestBackend, D>) -> Vec<f32> {
    tensor.to_data().to_vec().unwrap()
}

#[test]
fn test_constant_support_prototypes() {
    let device = Default::default();
    let mask = Tensor::<TestBackend, 3>::ones([2, 1, 4], &device);

    let (fg, bg) = foreground_background(constant_support(), mask).unwrap();
    let protos = Prototypes::aggregate(fg, bg).unwrap();

    assert_eq!(protos.len(), 3);
    let background = values(protos.get(0).unwrap());
    let way0 = values(protos.get(1).unwrap());
    let way1 = values(protos.get(2).unwrap());

    assert!(background.iter().all(|v| v.abs() < 1e-6));
    assert!(way0.iter().all(|v| (v - 1.0).abs() < 1e-4));
    assert!(way1.iter().all(|v| (v - 2.0).abs() < 1e-4));
}

#[test]
fn test_score_map_shapes() {
    let device = Default::default();
    for (n_way, k_shot, n_queries, n_points) in [(1, 1, 1, 4), (2, 1, 2, 8), (3, 5, 15, 6)] {
        let feat_dim = 5;
        let fg = Tensor::<TestBackend, 3>::ones([n_way, k_shot, feat_dim], &device);
        let bg = Tensor::<TestBackend, 3>::zeros([n_way, k_shot, feat_dim], &device);
        let protos = Prototypes::aggregate(fg, bg).unwrap();

        let query = Tensor::<TestBackend, 3>::ones([n_queries, feat_dim, n_points], &device);
        for method in ["cosine", "euclidean"] {
            let classifier = PrototypeClassifier::new(method, 20.0).unwrap();
            let scores = classifier.score_map(query.clone(), &protos);
            let shape = EpisodeShape::new(n_way, k_shot, n_queries, n_points, feat_dim);
            assert_eq!(scores.dims(), shape.score_shape());
        }
    }
}

#[test]
fn test_unsupported_method_names_value() {
    let err = PrototypeClassifier::new("chebyshev", 20.0).unwrap_err();
    assert!(matches!(
        err,
        NeuralCcbrError::Core(CcbrCoreError::UnsupportedSimilarity { ref method }) if method == "chebyshev"
    ));
    assert_eq!(err.to_string(), "unsupported similarity method: chebyshev");
}

#[test]
fn test_loss_prefers_correct_prototype() {
    let device = Default::default();
    let fg = Tensor::<TestBackend, 3>::from_data(
        TensorData::new(vec![1.0f32, 0.0, 0.0, 1.0], [2, 1, 2]),
        &device,
    );
    let bg = Tensor::<TestBackend, 3>::zeros([2, 1, 2], &device);
    let protos = Prototypes::aggregate(fg, bg).unwrap();

    // One query point sitting on way 1's prototype.
    let query = Tensor::<TestBackend, 3>::from_data(
        TensorData::new(vec![0.0f32, 1.0], [1, 2, 1]),
        &device,
    );
    let classifier = PrototypeClassifier::new("euclidean", 20.0).unwrap();
    let scores = classifier.score_map(query, &protos);

    let right = Tensor::<TestBackend, 2, Int>::from_data(TensorData::new(vec![2i64], [1, 1]), &device);
    let wrong = Tensor::<TestBackend, 2, Int>::from_data(TensorData::new(vec![1i64], [1, 1]), &device);

    let right_loss: f32 = cross_entropy_loss(scores.clone(), right).unwrap().into_scalar();
    let wrong_loss: f32 = cross_entropy_loss(scores.clone(), wrong).unwrap().into_scalar();
    assert!(right_loss < wrong_loss);

    let labels: Vec<i64> = PrototypeClassifier::classify(scores)
        .to_data()
        .convert::<i64>()
        .to_vec()
        .unwrap();
    assert_eq!(labels, vec![2]);
}

#[test]
fn test_bias_correction_n3k5_grouping() {
    let device = Default::default();
    let bias = BiasCorrectionConfig::new(192).init::<TestBackend>(&device);
    let support = Tensor::<TestBackend, 4>::random([3, 5, 192, 8], burn::tensor::Distribution::Default, &device);
    let query = Tensor::<TestBackend, 3>::random([15, 192, 8], burn::tensor::Distribution::Default, &device);

    let grouping = GroupingScheme::for_queries(3, 15, 5).unwrap();
    let corrected = bias.forward(support, query.clone(), &grouping).unwrap();
    assert_eq!(corrected.dims(), [3, 5, 192, 8]);

    // 15 queries cannot be read as single-query groups for 3 ways.
    assert!(GroupingScheme::for_queries(3, 15, 1).is_err());
}

#[test]
fn test_evaluate_episode() {
    let device = Default::default();
    let config = ProtoNetConfig::new(2, 2)
        .with_pc_in_dim(3)
        .with_pc_npts(6)
        .with_edgeconv_widths(vec![vec![8], vec![8]])
        .with_dgcnn_mlp_widths(vec![16])
        .with_dgcnn_k(3)
        .with_base_widths(vec![8])
        .with_output_dim(8);
    let model = ProtoNet::<TestBackend>::new(&config, &device).unwrap();

    let shape = config.episode_shape(config.n_queries());
    let n_support: usize = shape.support_shape().iter().product();
    let n_query: usize = shape.query_shape().iter().product();
    let episode = Episode::<TestBackend>::from_raw(
        shape,
        (0..n_support).map(|i| (i as f32 * 0.13).sin()).collect(),
        (0..24).map(|i| ((i / 3) % 2) as f32).collect(),
        (0..n_query).map(|i| (i as f32 * 0.29).cos()).collect(),
        (0..12).map(|i| (i % 3) as i64).collect(),
        &device,
    )
    .unwrap();

    let metrics = evaluate(&model, &episode).unwrap();
    assert!(metrics.loss.is_finite());
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!((0.0..=1.0).contains(&metrics.mean_iou));

    let mut tracker = MetricsTracker::new(10, shape.num_classes());
    tracker.evaluate(&model, &episode).unwrap();
    tracker.evaluate(&model, &episode).unwrap();
    assert_eq!(tracker.episodes(), 2);
    assert_eq!(tracker.total_confusion().total(), 24);
}
