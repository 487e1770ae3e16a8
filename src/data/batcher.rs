// ============================================================
// Layer 4 - Tabular Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<TabularSample>
// into tensors.
//
//   Input:  N samples, each with F features
//   Output: features [N, F], targets [N]
//
// Features are flattened row by row and reshaped:
//   [r1_f1, r1_f2, ..., r1_fF, r2_f1, ..., rN_fF] -> [N, F]
//
// Targets stay float. The classification loss converts them to
// class indices; the regression loss reshapes them to [N, 1].

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TabularSample;

#[derive(Debug, Clone)]
pub struct TabularBatch<B: Backend> {
    /// shape: [batch_size, feature_count]
    pub features: Tensor<B, 2>,

    /// shape: [batch_size]
    pub targets: Tensor<B, 1>,
}

/// Holds the target device so tensors land on the right backend.
#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TabularSample, TabularBatch<B>> for TabularBatcher<B> {
    fn batch(&self, items: Vec<TabularSample>) -> TabularBatch<B> {
        let batch_size = items.len();
        let width      = items.first().map(|s| s.features.len()).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();
        let targets: Vec<f32> = items.iter().map(|s| s.target).collect();

        let features = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, width]);
        let targets = Tensor::<B, 1>::from_floats(targets.as_slice(), &self.device);

        TabularBatch { features, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = TabularBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            TabularSample { features: vec![1.0, 2.0, 3.0], target: 0.0 },
            TabularSample { features: vec![4.0, 5.0, 6.0], target: 1.0 },
        ]);
        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let row: Vec<f32> = batch.features.slice([1..2, 0..3]).into_data().to_vec().unwrap();
        assert_eq!(row, vec![4.0, 5.0, 6.0]);
    }
}
