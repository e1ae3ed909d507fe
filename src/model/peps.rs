use burn::{
    module::{Module, Param},
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d,
    },
    tensor::{activation::relu, backend::Backend, Distribution, Tensor},
};

use crate::model::{
    chain::{contract_chain, identity_matrix},
    ImageClassifier,
};

/// Configuration for the grid-style classifier.
#[derive(Debug, Clone)]
pub struct PepsLayerConfig {
    pub bond_dim: usize,
    pub labels: usize,
    /// Rank cap for the contracted row environments
    pub max_singular_values: usize,
    pub truncate_svd: bool,
    pub stem_channels: usize,
    pub site_features: usize,
}

impl PepsLayerConfig {
    pub fn new(
        bond_dim: usize,
        labels: usize,
        max_singular_values: usize,
        truncate_svd: bool,
    ) -> Self {
        Self {
            bond_dim,
            labels,
            max_singular_values,
            truncate_svd,
            stem_channels: 8,
            site_features: 16,
        }
    }

    /// Rank carried from each contracted row into the column chain.
    fn environment_rank(&self) -> usize {
        let full = self.bond_dim * self.bond_dim;
        if self.truncate_svd {
            full.min(self.max_singular_values)
        } else {
            full
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> PepsLayer<B> {
        // Two pooled stem stages: 28 -> 14 -> 7
        let grid = 7;
        let d = self.bond_dim;
        let env = self.environment_rank();

        PepsLayer {
            stem_a: Conv2dConfig::new([1, self.stem_channels], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            stem_b: Conv2dConfig::new([self.stem_channels, self.site_features], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            row_sites: Param::from_tensor(Tensor::random(
                [grid * grid, self.site_features, d * d],
                Distribution::Normal(0.0, 0.1),
                device,
            )),
            column_sites: Param::from_tensor(Tensor::random(
                [grid, d * d, env * env],
                Distribution::Normal(0.0, 0.1),
                device,
            )),
            boundary: Param::from_tensor(Tensor::random(
                [env],
                Distribution::Normal(0.0, 1.0),
                device,
            )),
            label: Param::from_tensor(Tensor::random(
                [env, self.labels],
                Distribution::Normal(0.0, 0.5),
                device,
            )),
            grid,
            bond_dim: d,
            environment_rank: env,
        }
    }
}

/// Grid-style classifier: a small convolutional stem feeds a 7x7 grid of
/// sites, which is contracted row by row and then down the column of row
/// environments.
///
/// When truncation is enabled, the rank of the row environments is capped at
/// `max_singular_values` before the column contraction.
#[derive(Module, Debug)]
pub struct PepsLayer<B: Backend> {
    stem_a: Conv2d<B>,
    stem_b: Conv2d<B>,
    pool: MaxPool2d,
    /// `[grid*grid, features, bond*bond]`
    row_sites: Param<Tensor<B, 3>>,
    /// `[grid, bond*bond, env*env]`
    column_sites: Param<Tensor<B, 3>>,
    /// `[env]`
    boundary: Param<Tensor<B, 1>>,
    /// `[env, labels]`
    label: Param<Tensor<B, 2>>,
    grid: usize,
    bond_dim: usize,
    environment_rank: usize,
}

impl<B: Backend> ImageClassifier<B> for PepsLayer<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, _, _, _] = images.dims();
        let d = self.bond_dim;
        let env = self.environment_rank;
        let grid = self.grid;
        let device = images.device();

        // Stem: [batch, 1, 28, 28] -> [batch, features, 7, 7]
        let x = self.pool.forward(relu(self.stem_a.forward(images)));
        let x = self.pool.forward(relu(self.stem_b.forward(x)));

        // Feature vector per grid site: [batch, grid*grid, features]
        let [_, features, _, _] = x.dims();
        let sites = x.reshape([batch, features, grid * grid]).swap_dims(1, 2);

        // Site matrices: identity plus the feature-weighted map.
        let weighted = (sites.reshape([batch, grid * grid, features, 1])
            * self.row_sites.val().reshape([1, grid * grid, features, d * d]))
        .sum_dim(2)
        .reshape([batch, grid * grid, d, d]);
        let site_matrices = identity_matrix::<B>(d, &device).unsqueeze::<4>() + weighted;

        // Each row chain contracts to one environment vector of rank d*d.
        let rows = contract_chain(site_matrices.reshape([batch * grid, grid, d, d]))
            .reshape([batch, grid, d * d]);

        // Column chain over the rank-capped row environments.
        let column = (rows.reshape([batch, grid, d * d, 1])
            * self.column_sites.val().reshape([1, grid, d * d, env * env]))
        .sum_dim(2)
        .reshape([batch, grid, env, env]);
        let column_matrices = identity_matrix::<B>(env, &device).unsqueeze::<4>() + column;
        let contracted = contract_chain(column_matrices); // [batch, env, env]

        let opened = self
            .boundary
            .val()
            .reshape([1, 1, env])
            .expand([batch, 1, env])
            .matmul(contracted);
        opened.reshape([batch, env]).matmul(self.label.val())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn forward_produces_per_class_scores() {
        let device = NdArrayDevice::Cpu;
        let model = PepsLayerConfig::new(2, 10, 32, true).init::<TestBackend>(&device);
        let images = Tensor::random([2, 1, 28, 28], Distribution::Uniform(0.0, 1.0), &device);

        let scores = model.forward(images);

        assert_eq!(scores.dims(), [2, 10]);
    }

    #[test]
    fn truncation_caps_environment_rank() {
        let capped = PepsLayerConfig::new(6, 10, 32, true);
        assert_eq!(capped.environment_rank(), 32);

        let uncapped = PepsLayerConfig::new(6, 10, 32, false);
        assert_eq!(uncapped.environment_rank(), 36);
    }
}
