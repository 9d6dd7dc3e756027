//! Prototype network with cross-set bias correction.

use burn::module::{Ignored, Module};
use burn::prelude::*;

use ccbr_core::GroupingScheme;

use crate::config::ProtoNetConfig;
use crate::episode::Episode;
use crate::error::{NeuralCcbrError, Result};
use crate::nn::{Dgcnn, FeatureEncoder, FeatureFusion};
use crate::proto::{
    cross_entropy_loss, foreground_background, CrossSetBiasCorrection, PrototypeClassifier,
    Prototypes,
};

/// Output of one episode forward pass.
#[derive(Debug, Clone)]
pub struct ProtoNetOutput<B: Backend> {
    /// Score map `[n_queries, n_way + 1, n_points]`, used as logits.
    pub logits: Tensor<B, 3>,
    /// Mean cross-entropy against the query labels.
    pub loss: Tensor<B, 1>,
}

impl<B: Backend> ProtoNetOutput<B> {
    /// Get the loss as a scalar value.
    pub fn loss_value(&self) -> f32 {
        self.loss
            .clone()
            .to_data()
            .to_vec::<f32>()
            .ok()
            .and_then(|v| v.first().copied())
            .unwrap_or(f32::NAN)
    }

    /// Arg-max label map `[n_queries, n_points]`.
    pub fn predictions(&self) -> Tensor<B, 2, Int> {
        PrototypeClassifier::classify(self.logits.clone())
    }
}

/// Few-shot point-cloud segmentation network.
///
/// encoder → fusion → bias correction → masked pooling → prototypes →
/// similarity scores → cross-entropy.
#[derive(Module, Debug)]
pub struct ProtoNet<B: Backend> {
    encoder: Dgcnn<B>,
    fusion: FeatureFusion<B>,
    bias_correction: CrossSetBiasCorrection<B>,
    classifier: Ignored<PrototypeClassifier>,
    #[module(skip)]
    n_way: usize,
    #[module(skip)]
    k_shot: usize,
    #[module(skip)]
    query_group_size: usize,
}

impl<B: Backend> ProtoNet<B> {
    /// Build the network, validating the configuration first.
    pub fn new(config: &ProtoNetConfig, device: &B::Device) -> Result<Self> {
        config
            .validate()
            .map_err(|message| NeuralCcbrError::InvalidConfig { message })?;
        let classifier = PrototypeClassifier::from_metric(config.metric()?);

        log::debug!(
            "building ProtoNet: {}-way {}-shot, feat_dim={}, metric={}",
            config.n_way,
            config.k_shot,
            config.feat_dim(),
            classifier.metric()
        );

        Ok(Self {
            encoder: Dgcnn::new(&config.dgcnn(), device),
            fusion: config.fusion().init(device),
            bias_correction: config.bias_correction().init(device),
            classifier: Ignored(classifier),
            n_way: config.n_way,
            k_shot: config.k_shot,
            query_group_size: config.query_group_size,
        })
    }

    /// Per-point features of a batch of clouds.
    ///
    /// Input: `[batch, in_channels, n_points]`
    /// Output: `[batch, feat_dim, n_points]`
    pub fn features(&self, points: Tensor<B, 3>) -> Tensor<B, 3> {
        let (low, high) = self.encoder.encode(points);
        self.fusion.fuse(low, high)
    }

    /// Run one episode end to end.
    pub fn forward(&self, episode: &Episode<B>) -> Result<ProtoNetOutput<B>> {
        self.check_episode(episode)?;
        let shape = episode.shape();

        let support_feat = self.features(episode.support_batch());
        let feat_dim = support_feat.dims()[1];
        let support_feat =
            support_feat.reshape([shape.n_way, shape.k_shot, feat_dim, shape.n_points]);
        let query_feat = self.features(episode.query.clone());

        self.forward_features(
            support_feat,
            episode.support_mask.clone(),
            query_feat,
            episode.query_labels.clone(),
        )
    }

    /// Run the prototype pipeline on precomputed features.
    ///
    /// Input: support features `[n_way, k_shot, feat_dim, n_points]`, support
    /// foreground mask `[n_way, k_shot, n_points]`, query features
    /// `[n_queries, feat_dim, n_points]`, query labels `[n_queries, n_points]`
    pub fn forward_features(
        &self,
        support_feat: Tensor<B, 4>,
        support_mask: Tensor<B, 3>,
        query_feat: Tensor<B, 3>,
        query_labels: Tensor<B, 2, Int>,
    ) -> Result<ProtoNetOutput<B>> {
        let logits = self.score_features(support_feat, support_mask, query_feat)?;
        let loss = cross_entropy_loss(logits.clone(), query_labels)?;

        Ok(ProtoNetOutput { logits, loss })
    }

    /// Score map for precomputed features, without a loss.
    pub fn score_features(
        &self,
        support_feat: Tensor<B, 4>,
        support_mask: Tensor<B, 3>,
        query_feat: Tensor<B, 3>,
    ) -> Result<Tensor<B, 3>> {
        let n_queries = query_feat.dims()[0];
        let grouping = GroupingScheme::for_queries(self.n_way, n_queries, self.query_group_size)?;

        let corrected = self
            .bias_correction
            .forward(support_feat, query_feat.clone(), &grouping)?;
        let (fg, bg) = foreground_background(corrected, support_mask)?;
        let prototypes = Prototypes::aggregate(fg, bg)?;

        Ok(self.classifier.score_map(query_feat, &prototypes))
    }

    /// Predicted label map `[n_queries, n_points]` for an episode.
    pub fn predict(&self, episode: &Episode<B>) -> Result<Tensor<B, 2, Int>> {
        self.check_episode(episode)?;
        let shape = episode.shape();

        let support_feat = self.features(episode.support_batch());
        let feat_dim = support_feat.dims()[1];
        let support_feat =
            support_feat.reshape([shape.n_way, shape.k_shot, feat_dim, shape.n_points]);
        let query_feat = self.features(episode.query.clone());

        let scores =
            self.score_features(support_feat, episode.support_mask.clone(), query_feat)?;
        Ok(PrototypeClassifier::classify(scores))
    }

    /// The similarity classifier in use.
    pub fn classifier(&self) -> &PrototypeClassifier {
        &self.classifier.0
    }

    fn check_episode(&self, episode: &Episode<B>) -> Result<()> {
        let shape = episode.shape();
        if shape.n_way != self.n_way || shape.k_shot != self.k_shot {
            return Err(NeuralCcbrError::shape(
                "episode [n_way, k_shot]",
                &[self.n_way, self.k_shot],
                &[shape.n_way, shape.k_shot],
            ));
        }
        Ok(())
    }
}
