//! Neural network configuration types.

use burn::config::Config;

/// Configuration for the EdgeConv (DGCNN-style) point encoder.
#[derive(Config, Debug)]
pub struct DgcnnConfig {
    /// Input channels per point.
    pub in_channels: usize,

    /// Layer widths of each EdgeConv block.
    #[config(default = "vec![vec![64, 64], vec![64, 64], vec![64, 64]]")]
    pub edgeconv_widths: Vec<Vec<usize>>,

    /// Widths of the point-wise MLP applied to the concatenated EdgeConv outputs.
    #[config(default = "vec![512, 256]")]
    pub mlp_widths: Vec<usize>,

    /// Number of nearest neighbours in the feature-space graph.
    #[config(default = 20)]
    pub k: usize,

    /// Negative slope of the leaky ReLU activations.
    #[config(default = 0.2)]
    pub negative_slope: f64,
}

impl DgcnnConfig {
    /// Width of the low-level map (output of the first EdgeConv block).
    pub fn low_level_dim(&self) -> usize {
        self.edgeconv_widths
            .first()
            .and_then(|w| w.last())
            .copied()
            .unwrap_or(0)
    }

    /// Width of the high-level map (output of the MLP).
    pub fn high_level_dim(&self) -> usize {
        self.mlp_widths.last().copied().unwrap_or(0)
    }

    /// Width of the concatenated EdgeConv outputs fed to the MLP.
    pub fn edgeconv_output_dim(&self) -> usize {
        self.edgeconv_widths
            .iter()
            .filter_map(|w| w.last())
            .sum()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.in_channels == 0 {
            return Err("in_channels must be positive".to_string());
        }
        if self.edgeconv_widths.is_empty() || self.edgeconv_widths.iter().any(|w| w.is_empty()) {
            return Err("edgeconv_widths must contain non-empty blocks".to_string());
        }
        if self.mlp_widths.is_empty() {
            return Err("mlp_widths must not be empty".to_string());
        }
        if self.k == 0 {
            return Err("k must be positive".to_string());
        }
        Ok(())
    }
}

/// Configuration for point-wise self-attention.
#[derive(Config, Debug)]
pub struct SelfAttentionConfig {
    /// Input channels.
    pub in_channels: usize,

    /// Output channels of the query/key/value projections.
    pub out_channels: usize,

    /// Dropout applied to the attention weights.
    #[config(default = 0.1)]
    pub dropout: f64,
}

/// Configuration for the per-point projector refining high-level features.
#[derive(Config, Debug)]
pub struct BaseLearnerConfig {
    /// Input channels.
    pub in_channels: usize,

    /// Output width of each layer; the last entry is the output width.
    #[config(default = "vec![128, 64]")]
    pub widths: Vec<usize>,
}

/// Configuration for fusing encoder outputs into one per-point feature map.
#[derive(Config, Debug)]
pub struct FeatureFusionConfig {
    /// Width of the encoder's low-level map.
    pub low_level_dim: usize,

    /// Width of the encoder's high-level map.
    pub high_level_dim: usize,

    /// Use self-attention (true) or a linear projection (false) for the
    /// high-level branch.
    #[config(default = true)]
    pub use_attention: bool,

    /// Output width of the attention / linear branch.
    #[config(default = 64)]
    pub output_dim: usize,

    /// Layer widths of the projector branch.
    #[config(default = "vec![128, 64]")]
    pub base_widths: Vec<usize>,

    /// Dropout on attention weights.
    #[config(default = 0.1)]
    pub attention_dropout: f64,
}

impl FeatureFusionConfig {
    /// Width of the fused feature map.
    pub fn feat_dim(&self) -> usize {
        self.low_level_dim + self.output_dim + self.base_widths.last().copied().unwrap_or(0)
    }
}

/// Configuration for cross-set bias correction.
#[derive(Config, Debug)]
pub struct BiasCorrectionConfig {
    /// Width of the features being corrected.
    pub feat_dim: usize,

    /// Max-pooling kernel over the channel axis.
    #[config(default = 4)]
    pub pool_kernel: usize,

    /// Max-pooling stride over the channel axis.
    #[config(default = 2)]
    pub pool_stride: usize,
}

impl BiasCorrectionConfig {
    /// Channel count after max-pooling.
    ///
    /// 95 for the default 192-wide features.
    pub fn pooled_dim(&self) -> usize {
        (self.feat_dim - self.pool_kernel) / self.pool_stride + 1
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_kernel == 0 || self.pool_stride == 0 {
            return Err("pool_kernel and pool_stride must be positive".to_string());
        }
        if self.feat_dim < self.pool_kernel {
            return Err(format!(
                "feature width {} is smaller than the pooling kernel {}",
                self.feat_dim, self.pool_kernel
            ));
        }
        Ok(())
    }
}
