//! Synthetic episode forward pass
//!
//! Builds a prototype network, feeds it random episodes and reports loss,
//! accuracy, mean IoU and timing.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release --bin episode_forward -- [n_way] [k_shot] [n_points] [episodes] [cosine|euclidean]
//! ```

use std::env;
use std::process;

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::Distribution;
use instant::Instant;

use neural_ccbr::prelude::*;

type DemoBackend = NdArray;

fn arg_or<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    args.get(index)
        .and_then(|a| a.parse().ok())
        .unwrap_or(default)
}

fn random_episode(
    config: &ProtoNetConfig,
    device: &<DemoBackend as Backend>::Device,
) -> neural_ccbr::Result<Episode<DemoBackend>> {
    let shape = config.episode_shape(config.n_queries());
    let support_mask = Tensor::<DemoBackend, 3>::random(
        shape.support_mask_shape(),
        Distribution::Default,
        device,
    )
    .greater_elem(0.7)
    .float();
    let query_labels = Tensor::<DemoBackend, 2, Int>::random(
        shape.query_label_shape(),
        Distribution::Uniform(0.0, shape.num_classes() as f64),
        device,
    );

    Episode::new(
        shape,
        Tensor::random(shape.support_shape(), Distribution::Default, device),
        support_mask,
        Tensor::random(shape.query_shape(), Distribution::Default, device),
        query_labels,
    )
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let n_way = arg_or(&args, 1, 2usize);
    let k_shot = arg_or(&args, 2, 1usize);
    let n_points = arg_or(&args, 3, 512usize);
    let episodes = arg_or(&args, 4, 5usize);
    let method = args.get(5).cloned().unwrap_or_else(|| "euclidean".to_string());

    let config = ProtoNetConfig::new(n_way, k_shot)
        .with_pc_npts(n_points)
        .with_method(method);

    let device = Default::default();
    let start = Instant::now();
    let model = match ProtoNet::<DemoBackend>::new(&config, &device) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    println!(
        "{}-way {}-shot, {} points, feat_dim={}, metric={} (built in {:.2}s)",
        n_way,
        k_shot,
        n_points,
        config.feat_dim(),
        model.classifier().metric(),
        start.elapsed().as_secs_f64()
    );

    let mut tracker = MetricsTracker::new(episodes.max(1), n_way + 1);
    let start = Instant::now();
    for i in 0..episodes {
        let result = random_episode(&config, &device)
            .and_then(|episode| tracker.evaluate(&model, &episode));
        match result {
            Ok(metrics) => metrics.log(&format!("episode {}", i)),
            Err(e) => {
                eprintln!("Episode {} failed: {}", i, e);
                process::exit(1);
            }
        }
    }
    let elapsed = start.elapsed();

    let avg = tracker.average_metrics();
    println!(
        "{} episodes in {:.2}s ({:.1} ms/episode)",
        tracker.episodes(),
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() * 1000.0 / episodes.max(1) as f64
    );
    println!(
        "mean loss={:.4} acc={:.4} miou={:.4} overall miou={:.4}",
        avg.loss,
        avg.accuracy,
        avg.mean_iou,
        tracker.overall_mean_iou()
    );
}
