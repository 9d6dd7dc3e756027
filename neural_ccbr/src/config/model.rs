//! Model-level configuration.

use burn::config::Config;

use ccbr_core::{EpisodeShape, SimilarityMetric};

use super::{BiasCorrectionConfig, DgcnnConfig, FeatureFusionConfig};

/// Configuration for the prototype network.
///
/// Field names follow the command-line options of the training scripts.
#[derive(Config, Debug)]
pub struct ProtoNetConfig {
    /// Number of foreground classes per episode.
    pub n_way: usize,

    /// Support examples per class.
    pub k_shot: usize,

    /// Input channels per point.
    #[config(default = 9)]
    pub pc_in_dim: usize,

    /// Points per cloud.
    #[config(default = 2048)]
    pub pc_npts: usize,

    /// Self-attention (true) or linear projection (false) for the high-level branch.
    #[config(default = true)]
    pub use_attention: bool,

    /// EdgeConv block widths.
    #[config(default = "vec![vec![64, 64], vec![64, 64], vec![64, 64]]")]
    pub edgeconv_widths: Vec<Vec<usize>>,

    /// Encoder MLP widths.
    #[config(default = "vec![512, 256]")]
    pub dgcnn_mlp_widths: Vec<usize>,

    /// Neighbours in the EdgeConv graph.
    #[config(default = 20)]
    pub dgcnn_k: usize,

    /// Projector layer widths.
    #[config(default = "vec![128, 64]")]
    pub base_widths: Vec<usize>,

    /// Output width of the attention / linear branch.
    #[config(default = 64)]
    pub output_dim: usize,

    /// Similarity metric name: `cosine` or `euclidean`.
    #[config(default = "String::from(\"euclidean\")")]
    pub method: String,

    /// Multiplier for cosine similarity.
    #[config(default = 20.0)]
    pub scaler: f32,

    /// Queries averaged into each query group during bias correction.
    #[config(default = 1)]
    pub query_group_size: usize,

    /// Channel max-pooling kernel of the bias-correction attention.
    #[config(default = 4)]
    pub bias_pool_kernel: usize,

    /// Channel max-pooling stride of the bias-correction attention.
    #[config(default = 2)]
    pub bias_pool_stride: usize,

    /// Dropout on self-attention weights.
    #[config(default = 0.1)]
    pub attention_dropout: f64,
}

impl ProtoNetConfig {
    /// Encoder configuration.
    pub fn dgcnn(&self) -> DgcnnConfig {
        DgcnnConfig::new(self.pc_in_dim)
            .with_edgeconv_widths(self.edgeconv_widths.clone())
            .with_mlp_widths(self.dgcnn_mlp_widths.clone())
            .with_k(self.dgcnn_k)
    }

    /// Feature fusion configuration.
    pub fn fusion(&self) -> FeatureFusionConfig {
        let dgcnn = self.dgcnn();
        FeatureFusionConfig::new(dgcnn.low_level_dim(), dgcnn.high_level_dim())
            .with_use_attention(self.use_attention)
            .with_output_dim(self.output_dim)
            .with_base_widths(self.base_widths.clone())
            .with_attention_dropout(self.attention_dropout)
    }

    /// Bias correction configuration.
    pub fn bias_correction(&self) -> BiasCorrectionConfig {
        BiasCorrectionConfig::new(self.feat_dim())
            .with_pool_kernel(self.bias_pool_kernel)
            .with_pool_stride(self.bias_pool_stride)
    }

    /// Width of the fused per-point features.
    pub fn feat_dim(&self) -> usize {
        self.fusion().feat_dim()
    }

    /// Resolve the configured similarity metric.
    pub fn metric(&self) -> ccbr_core::Result<SimilarityMetric> {
        SimilarityMetric::from_name(&self.method, self.scaler)
    }

    /// Episode dimensions for a query batch of `n_queries` clouds.
    pub fn episode_shape(&self, n_queries: usize) -> EpisodeShape {
        EpisodeShape::new(self.n_way, self.k_shot, n_queries, self.pc_npts, self.pc_in_dim)
    }

    /// Number of queries an episode must carry.
    pub fn n_queries(&self) -> usize {
        self.n_way * self.query_group_size
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_way == 0 || self.k_shot == 0 {
            return Err("n_way and k_shot must be positive".to_string());
        }
        if self.pc_npts == 0 {
            return Err("pc_npts must be positive".to_string());
        }
        if self.query_group_size == 0 {
            return Err("query_group_size must be positive".to_string());
        }
        if self.base_widths.is_empty() {
            return Err("base_widths must not be empty".to_string());
        }
        if self.output_dim == 0 {
            return Err("output_dim must be positive".to_string());
        }
        self.dgcnn().validate()?;
        self.bias_correction().validate()?;
        self.metric().map_err(|e| e.to_string())?;
        Ok(())
    }
}
