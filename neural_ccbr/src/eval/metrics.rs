//! Episode evaluation and running metrics.

use std::collections::VecDeque;

use burn::prelude::*;

use ccbr_core::ConfusionMatrix;

use crate::episode::Episode;
use crate::error::{NeuralCcbrError, Result};
use crate::model::{ProtoNet, ProtoNetOutput};

/// Metrics of a single episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeMetrics {
    /// Cross-entropy loss.
    pub loss: f32,
    /// Point accuracy over all queries.
    pub accuracy: f32,
    /// Mean IoU over the classes present.
    pub mean_iou: f32,
}

impl EpisodeMetrics {
    /// Derive metrics from a loss and a filled confusion matrix.
    pub fn from_confusion(loss: f32, confusion: &ConfusionMatrix) -> Self {
        Self {
            loss,
            accuracy: confusion.accuracy(),
            mean_iou: confusion.mean_iou(),
        }
    }

    /// Log metrics at info level.
    pub fn log(&self, prefix: &str) {
        log::info!(
            "{} loss={:.6} acc={:.4} miou={:.4}",
            prefix,
            self.loss,
            self.accuracy,
            self.mean_iou,
        );
    }
}

/// Confusion matrix of a forward pass against the episode labels.
pub fn confusion<B: Backend>(
    output: &ProtoNetOutput<B>,
    episode: &Episode<B>,
) -> Result<ConfusionMatrix> {
    let predictions = int_values(output.predictions())?;
    let truth = int_values(episode.query_labels.clone())?;

    let mut matrix = ConfusionMatrix::new(episode.shape().num_classes());
    matrix.update(&predictions, &truth)?;
    Ok(matrix)
}

/// Run an episode and measure loss, accuracy and mean IoU.
pub fn evaluate<B: Backend>(model: &ProtoNet<B>, episode: &Episode<B>) -> Result<EpisodeMetrics> {
    let output = model.forward(episode)?;
    let matrix = confusion(&output, episode)?;
    Ok(EpisodeMetrics::from_confusion(output.loss_value(), &matrix))
}

fn int_values<B: Backend>(tensor: Tensor<B, 2, Int>) -> Result<Vec<i64>> {
    tensor
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| NeuralCcbrError::InvalidData(format!("{:?}", e)))
}

/// Running average of episode metrics over a fixed window.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    window_size: usize,
    recent: VecDeque<EpisodeMetrics>,
    total: ConfusionMatrix,
    episodes: usize,
}

impl MetricsTracker {
    /// Create a tracker for `num_classes` classes (including background).
    pub fn new(window_size: usize, num_classes: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            recent: VecDeque::with_capacity(window_size.max(1)),
            total: ConfusionMatrix::new(num_classes),
            episodes: 0,
        }
    }

    /// Record one episode.
    pub fn add(&mut self, metrics: EpisodeMetrics, confusion: &ConfusionMatrix) -> Result<()> {
        self.total.merge(confusion)?;
        if self.recent.len() >= self.window_size {
            self.recent.pop_front();
        }
        self.recent.push_back(metrics);
        self.episodes += 1;
        Ok(())
    }

    /// Evaluate an episode and record it.
    pub fn evaluate<B: Backend>(
        &mut self,
        model: &ProtoNet<B>,
        episode: &Episode<B>,
    ) -> Result<EpisodeMetrics> {
        let output = model.forward(episode)?;
        let matrix = confusion(&output, episode)?;
        let metrics = EpisodeMetrics::from_confusion(output.loss_value(), &matrix);
        self.add(metrics.clone(), &matrix)?;
        Ok(metrics)
    }

    /// Average metrics over the window.
    pub fn average_metrics(&self) -> EpisodeMetrics {
        if self.recent.is_empty() {
            return EpisodeMetrics::default();
        }
        let n = self.recent.len() as f32;
        let sum = self.recent.iter().fold(EpisodeMetrics::default(), |acc, m| EpisodeMetrics {
            loss: acc.loss + m.loss,
            accuracy: acc.accuracy + m.accuracy,
            mean_iou: acc.mean_iou + m.mean_iou,
        });
        EpisodeMetrics {
            loss: sum.loss / n,
            accuracy: sum.accuracy / n,
            mean_iou: sum.mean_iou / n,
        }
    }

    /// Confusion matrix accumulated over every recorded episode.
    pub fn total_confusion(&self) -> &ConfusionMatrix {
        &self.total
    }

    /// Mean IoU over every recorded episode.
    pub fn overall_mean_iou(&self) -> f32 {
        self.total.mean_iou()
    }

    /// Number of recorded episodes.
    pub fn episodes(&self) -> usize {
        self.episodes
    }
}
