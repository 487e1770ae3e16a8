// ============================================================
// Layer 5 - Evaluator
// ============================================================
// Scores a model on held-out samples in one forward pass:
//   regression      → MSE loss
//   classification  → cross-entropy loss + accuracy
//
// Runs on the inner (non-autodiff) backend; nothing is updated.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::ElementConversion,
};
use serde::Serialize;

use crate::data::{batcher::TabularBatcher, dataset::TabularSample};
use crate::domain::task::TaskType;
use crate::ml::model::{task_loss, DenseNetwork};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub loss:     f64,
    /// Fraction of correct class predictions; classification only.
    pub accuracy: Option<f64>,
}

pub fn evaluate<B: Backend>(
    model:   &DenseNetwork<B>,
    samples: &[TabularSample],
    task:    TaskType,
    device:  &B::Device,
) -> EvaluationReport {
    if samples.is_empty() {
        return EvaluationReport {
            loss:     f64::NAN,
            accuracy: (task == TaskType::Classification).then_some(0.0),
        };
    }

    let batch  = TabularBatcher::<B>::new(device.clone()).batch(samples.to_vec());
    let output = model.forward(batch.features);
    let loss: f64 = task_loss(output.clone(), batch.targets.clone(), task)
        .into_scalar()
        .elem::<f64>();

    let accuracy = match task {
        TaskType::Regression => None,
        TaskType::Classification => {
            // argmax(1) is [batch, 1]; flatten to [batch] before comparing
            let predicted = output.argmax(1).flatten::<1>(0, 1);
            let correct: i64 = predicted
                .equal(batch.targets.int())
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            Some(correct as f64 / samples.len() as f64)
        }
    };

    EvaluationReport { loss, accuracy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::DenseNetworkConfig;
    use burn::backend::NdArray;

    fn sample(x: f32, y: f32) -> TabularSample {
        TabularSample { features: vec![x, -x], target: y }
    }

    #[test]
    fn test_regression_report_has_no_accuracy() {
        let model: DenseNetwork<NdArray> =
            DenseNetworkConfig::new(2, vec![4], 1).init(&Default::default());
        let report = evaluate(&model, &[sample(1.0, 2.0), sample(0.5, 1.0)], TaskType::Regression, &Default::default());
        assert!(report.loss.is_finite());
        assert!(report.accuracy.is_none());
    }

    #[test]
    fn test_classification_accuracy_in_range() {
        let model: DenseNetwork<NdArray> =
            DenseNetworkConfig::new(2, vec![4], 3).init(&Default::default());
        let samples = [sample(1.0, 0.0), sample(2.0, 1.0), sample(3.0, 2.0)];
        let report = evaluate(&model, &samples, TaskType::Classification, &Default::default());
        let acc = report.accuracy.unwrap();
        assert!((0.0..=1.0).contains(&acc));
        assert!(report.loss > 0.0);
    }

    #[test]
    fn test_empty_holdout_is_nan() {
        let model: DenseNetwork<NdArray> =
            DenseNetworkConfig::new(2, vec![4], 1).init(&Default::default());
        let report = evaluate(&model, &[], TaskType::Regression, &Default::default());
        assert!(report.loss.is_nan());
    }
}
