// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Mini-batch training using Burn's DataLoader and an optimizer
// picked by name.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//     for the per-epoch validation pass
//   - Training stops after `epochs` epochs, or earlier once the
//     validation loss has not improved for `patience` epochs

use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{
        AdaGradConfig, AdamConfig, AdamWConfig, GradientsParams, Optimizer, RmsPropConfig,
        SgdConfig,
    },
    prelude::*,
    tensor::ElementConversion,
};

use crate::data::{batcher::TabularBatcher, dataset::{TabularDataset, TabularSample}, splitter::SPLIT_SEED};
use crate::domain::{hyperparameters::OptimizerKind, task::TaskType};
use crate::error::PipelineError;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{evaluator::evaluate, model::DenseNetwork};

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend  = NdArray;
pub type TrainDevice  = NdArrayDevice;

/// Epochs without validation-loss improvement before stopping.
pub const EARLY_STOPPING_PATIENCE: usize = 3;

#[derive(Debug, Clone)]
pub struct FitOptions {
    pub task:       TaskType,
    pub optimizer:  OptimizerKind,
    pub epochs:     usize,
    pub batch_size: usize,
    pub patience:   usize,
}

pub struct FitOutcome {
    pub model:         DenseNetwork<TrainBackend>,
    pub history:       Vec<EpochMetrics>,
    pub stopped_early: bool,
}

// ─── Early Stopping ───────────────────────────────────────────────────────────
/// Tracks the best validation loss seen so far.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best:     Option<f64>,
    wait:     usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: None, wait: 0 }
    }

    /// Record one epoch's metrics; true means stop now.
    pub fn should_stop(&mut self, metrics: &EpochMetrics) -> bool {
        match self.best {
            Some(best) if !metrics.is_improvement(best) => {
                self.wait += 1;
                self.wait >= self.patience
            }
            _ => {
                self.best = Some(metrics.val_loss);
                self.wait = 0;
                false
            }
        }
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }
}

/// Train `model` on `train`, validating on `validation` after
/// every epoch.
pub fn fit(
    model:      DenseNetwork<TrainBackend>,
    train:      Vec<TabularSample>,
    validation: &[TabularSample],
    options:    &FitOptions,
    device:     &TrainDevice,
    logger:     Option<&MetricsLogger>,
) -> Result<FitOutcome, PipelineError> {
    tracing::info!(
        "Training with {} (epochs={}, batch_size={})",
        options.optimizer, options.epochs, options.batch_size
    );
    match options.optimizer {
        OptimizerKind::Adam => train_loop(
            model, AdamConfig::new().with_epsilon(1e-7).init(), train, validation, options, device, logger,
        ),
        OptimizerKind::AdamW => train_loop(
            model, AdamWConfig::new().init(), train, validation, options, device, logger,
        ),
        OptimizerKind::Sgd => train_loop(
            model, SgdConfig::new().init(), train, validation, options, device, logger,
        ),
        OptimizerKind::RmsProp => train_loop(
            model, RmsPropConfig::new().init(), train, validation, options, device, logger,
        ),
        OptimizerKind::AdaGrad => train_loop(
            model, AdaGradConfig::new().init(), train, validation, options, device, logger,
        ),
    }
}

fn train_loop<O>(
    mut model:  DenseNetwork<TrainBackend>,
    mut optim:  O,
    train:      Vec<TabularSample>,
    validation: &[TabularSample],
    options:    &FitOptions,
    device:     &TrainDevice,
    logger:     Option<&MetricsLogger>,
) -> Result<FitOutcome, PipelineError>
where
    O: Optimizer<DenseNetwork<TrainBackend>, TrainBackend>,
{
    let lr = options.optimizer.default_learning_rate();

    let train_loader = DataLoaderBuilder::new(TabularBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(options.batch_size)
        .shuffle(SPLIT_SEED)
        .num_workers(1)
        .build(TabularDataset::new(train));

    let mut stopper       = EarlyStopping::new(options.patience);
    let mut history       = Vec::with_capacity(options.epochs);
    let mut stopped_early = false;

    for epoch in 1..=options.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.features, batch.targets, options.task);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);
        }
        let train_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let report  = evaluate(&model.valid(), validation, options.task, device);
        let metrics = EpochMetrics::new(epoch, train_loss, report.loss, report.accuracy);

        match report.accuracy {
            Some(acc) => tracing::info!(
                "Epoch {:>3}/{} | loss={:.4} | val_loss={:.4} | val_accuracy={:.1}%",
                epoch, options.epochs, train_loss, report.loss, acc * 100.0
            ),
            None => tracing::info!(
                "Epoch {:>3}/{} | loss={:.4} | val_loss={:.4}",
                epoch, options.epochs, train_loss, report.loss
            ),
        }

        if let Some(logger) = logger {
            logger.log(&metrics)?;
        }
        let stop = stopper.should_stop(&metrics);
        history.push(metrics);

        if stop {
            tracing::info!(
                "Early stopping at epoch {}: val_loss has not improved on {:.4} for {} epochs",
                epoch,
                stopper.best().unwrap_or(f64::NAN),
                options.patience
            );
            stopped_early = true;
            break;
        }
    }

    Ok(FitOutcome { model, history, stopped_early })
}
