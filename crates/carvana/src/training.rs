//! U-Net training loop.
//!
//! Each epoch runs a fixed number of optimizer steps on randomly sampled
//! training batches, then scores the same number of validation batches as
//! there are full batches in the validation split. The weights are saved
//! whenever the mean validation Dice beats every earlier epoch.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use carvana_data::{split_train_validation, MaskNaming, MinibatchSampler, SegmentationDataset};
use carvana_metric::{EpochMetrics, MetricsAggregator};
use carvana_model::{BceLossConfig, UNet, UNetConfig};
use rand::{rngs::StdRng, SeedableRng};

use crate::config::TrainingConfig;

/// Metrics of one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    pub train: EpochMetrics,
    pub valid: EpochMetrics,
    /// Whether this epoch's weights were written to the checkpoint.
    pub improved: bool,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs: Vec<EpochReport>,
    pub best_valid_dice: f64,
    /// The checkpoint file, absent when no epoch produced a finite validation Dice.
    pub checkpoint: Option<PathBuf>,
}

/// Train a U-Net on the configured small dataset.
pub fn run_training<B: AutodiffBackend>(
    config: &TrainingConfig,
    naming: &MaskNaming,
    device: &B::Device,
) -> Result<TrainingSummary> {
    if config.batch_size == 0 {
        bail!("Batch size must be positive");
    }

    let dataset = SegmentationDataset::new(&config.data.images, &config.data.masks, naming)
        .context("Failed to collect training pairs")?;

    let mut split_rng = StdRng::seed_from_u64(config.seed);
    let (train_pairs, valid_pairs) =
        split_train_validation(dataset.into_pairs(), config.train_fraction, &mut split_rng)?;

    let steps_per_epoch = train_pairs.len() / config.batch_size;
    let valid_steps = valid_pairs.len() / config.batch_size;
    if steps_per_epoch == 0 || valid_steps == 0 {
        bail!(
            "Batch size {} leaves no full batch: {} training and {} validation pairs",
            config.batch_size,
            train_pairs.len(),
            valid_pairs.len()
        );
    }

    tracing::info!(
        train = train_pairs.len(),
        valid = valid_pairs.len(),
        steps_per_epoch,
        valid_steps,
        batch_size = config.batch_size,
        "Prepared training split"
    );

    let mut train_sampler = MinibatchSampler::new(
        SegmentationDataset::from_pairs(train_pairs),
        config.batch_size,
        StdRng::seed_from_u64(config.seed.wrapping_add(1)),
    )?;
    let mut valid_sampler = MinibatchSampler::new(
        SegmentationDataset::from_pairs(valid_pairs),
        config.batch_size,
        StdRng::seed_from_u64(config.seed.wrapping_add(2)),
    )?;

    B::seed(config.seed);
    let mut model: UNet<B> = UNetConfig::new().init(device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = BceLossConfig::new().init();
    let valid_loss_fn = BceLossConfig::new().init();

    let mut epochs = Vec::with_capacity(config.num_epochs);
    let mut best_valid_dice = f64::NEG_INFINITY;
    let mut checkpoint = None;

    for epoch in 1..=config.num_epochs {
        let mut train_metrics = MetricsAggregator::<B::InnerBackend>::new(config.smooth);
        for batch in train_sampler.by_ref().take(steps_per_epoch) {
            let batch = batch
                .with_context(|| format!("Failed to sample training batch in epoch {epoch}"))?
                .into_batch::<B>(device);

            let step = model.forward_segmentation(batch, &loss_fn);
            let loss_value = step.loss.clone().into_scalar().elem::<f64>();
            train_metrics.update(loss_value, step.output.inner(), step.targets.inner());

            let grads = GradientsParams::from_grads(step.loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }

        let model_valid = model.valid();
        let mut valid_metrics = MetricsAggregator::<B::InnerBackend>::new(config.smooth);
        for batch in valid_sampler.by_ref().take(valid_steps) {
            let batch = batch
                .with_context(|| format!("Failed to sample validation batch in epoch {epoch}"))?
                .into_batch::<B::InnerBackend>(device);

            let step = model_valid.forward_segmentation(batch, &valid_loss_fn);
            let loss_value = step.loss.into_scalar().elem::<f64>();
            valid_metrics.update(loss_value, step.output, step.targets);
        }

        let (Some(train), Some(valid)) = (train_metrics.averages(), valid_metrics.averages())
        else {
            bail!("Epoch {epoch} ran no batches");
        };

        let improved = valid.dice > best_valid_dice;
        if improved {
            best_valid_dice = valid.dice;
            let file = model_valid
                .save_checkpoint(&config.checkpoint)
                .context("Failed to save checkpoint")?;
            checkpoint = Some(file);
        }

        tracing::info!(
            epoch,
            train_loss = train.loss,
            train_dice = train.dice,
            valid_loss = valid.loss,
            valid_dice = valid.dice,
            improved,
            "Epoch finished"
        );
        epochs.push(EpochReport {
            epoch,
            train,
            valid,
            improved,
        });
    }

    Ok(TrainingSummary {
        epochs,
        best_valid_dice,
        checkpoint,
    })
}
