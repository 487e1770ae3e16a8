use burn::{
    nn::{
        loss::{CrossEntropyLossConfig, MseLoss, Reduction},
        Linear, LinearConfig, Relu,
    },
    prelude::*,
};
use serde_json::json;

use crate::domain::{
    architecture::{Architecture, DEFAULT_HIDDEN_LAYERS},
    task::TaskType,
};
use crate::error::PipelineError;

// Config derive supplies Clone, serde and the `new`/`with_*` builders.
#[derive(Config, Debug)]
pub struct DenseNetworkConfig {
    pub input_width:   usize,
    pub hidden_layers: Vec<usize>,
    pub output_width:  usize,
}

impl DenseNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DenseNetwork<B> {
        let mut hidden = Vec::with_capacity(self.hidden_layers.len());
        let mut width = self.input_width;
        for &units in &self.hidden_layers {
            hidden.push(LinearConfig::new(width, units).init(device));
            width = units;
        }
        let output = LinearConfig::new(width, self.output_width).init(device);
        DenseNetwork { hidden, output, activation: Relu::new() }
    }
}

/// input → [Linear → ReLU]* → Linear
///
/// The output layer is linear. For classification it produces
/// logits: the loss applies log-softmax itself, and
/// `probabilities` applies softmax for reporting.
#[derive(Module, Debug)]
pub struct DenseNetwork<B: Backend> {
    pub hidden:     Vec<Linear<B>>,
    pub output:     Linear<B>,
    pub activation: Relu,
}

impl<B: Backend> DenseNetwork<B> {
    /// features: [batch, input_width] → [batch, output_width]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = features;
        for layer in &self.hidden {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }

    pub fn probabilities(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(features), 1)
    }

    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 1>,
        task:     TaskType,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let output = self.forward(features);
        let loss = task_loss(output.clone(), targets, task);
        (loss, output)
    }
}

/// MSE for regression, sparse categorical cross-entropy for
/// classification (targets hold class indices).
pub fn task_loss<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1>, task: TaskType) -> Tensor<B, 1> {
    match task {
        TaskType::Regression => {
            let [n] = targets.dims();
            MseLoss::new().forward(output, targets.reshape([n, 1]), Reduction::Mean)
        }
        TaskType::Classification => CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output, targets.int()),
    }
}

/// Pick the network for an architecture selector and task.
///
/// Regression gets one output unit; classification one unit per
/// class.
pub fn network_config(
    architecture: Architecture,
    input_width:  usize,
    task:         TaskType,
    class_count:  usize,
) -> Result<DenseNetworkConfig, PipelineError> {
    match architecture {
        Architecture::Dense => {
            let output_width = match task {
                TaskType::Regression     => 1,
                TaskType::Classification => class_count,
            };
            if input_width == 0 || output_width == 0 {
                return Err(PipelineError::InsufficientData(format!(
                    "cannot build a network with {input_width} inputs and {output_width} outputs"
                )));
            }
            Ok(DenseNetworkConfig::new(input_width, DEFAULT_HIDDEN_LAYERS.to_vec(), output_width))
        }
    }
}

/// JSON summary of the built network, used when the caller did
/// not supply an architecture descriptor of their own.
pub fn describe(config: &DenseNetworkConfig, task: TaskType) -> serde_json::Value {
    let output_activation = match task {
        TaskType::Regression     => "linear",
        TaskType::Classification => "softmax",
    };
    json!({
        "type":         Architecture::Dense.name(),
        "inputWidth":   config.input_width,
        "hiddenLayers": config.hidden_layers,
        "activation":   "relu",
        "output": {
            "units":      config.output_width,
            "activation": output_activation,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn test_regression_has_single_output() {
        let cfg = network_config(Architecture::Dense, 5, TaskType::Regression, 0).unwrap();
        assert_eq!(cfg.hidden_layers, vec![64, 32]);
        assert_eq!(cfg.output_width, 1);

        let model: DenseNetwork<B> = cfg.init(&Default::default());
        let out = model.forward(Tensor::zeros([3, 5], &Default::default()));
        assert_eq!(out.dims(), [3, 1]);
    }

    #[test]
    fn test_classification_has_one_output_per_class() {
        let cfg = network_config(Architecture::Dense, 4, TaskType::Classification, 3).unwrap();
        let model: DenseNetwork<B> = cfg.init(&Default::default());
        let probs = model.probabilities(Tensor::ones([2, 4], &Default::default()));
        assert_eq!(probs.dims(), [2, 3]);

        let row_sum: f32 = probs.sum_dim(1).slice([0..1, 0..1]).into_scalar();
        assert!((row_sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_features_is_rejected() {
        let err = network_config(Architecture::Dense, 0, TaskType::Regression, 0).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn test_losses_are_scalar() {
        let device = Default::default();
        let output = Tensor::<B, 2>::from_floats([[1.0, 0.0], [0.0, 1.0]], &device);
        let targets = Tensor::<B, 1>::from_floats([0.0, 1.0], &device);
        let ce = task_loss(output, targets, TaskType::Classification);
        assert_eq!(ce.dims(), [1]);

        let pred = Tensor::<B, 2>::from_floats([[1.0], [3.0]], &device);
        let y = Tensor::<B, 1>::from_floats([1.0, 1.0], &device);
        let mse: f32 = task_loss(pred, y, TaskType::Regression).into_scalar();
        assert!((mse - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_describe_reports_head() {
        let cfg = network_config(Architecture::Dense, 4, TaskType::Classification, 3).unwrap();
        let d = describe(&cfg, TaskType::Classification);
        assert_eq!(d["type"], "dense");
        assert_eq!(d["output"]["units"], 3);
        assert_eq!(d["output"]["activation"], "softmax");
    }
}
