use burn::{
    module::{Module, Param},
    tensor::{backend::Backend, Distribution, Tensor},
};

use crate::data::encoding::encode_pixels;
use crate::model::{
    chain::{contract_chain, near_identity_sites},
    ImageClassifier,
};

/// Configuration for the matrix-product-state classifier.
#[derive(Debug, Clone)]
pub struct MpsLayerConfig {
    pub rank: usize,
    pub phys_dim: usize,
    pub bond_dim: usize,
    pub labels: usize,
}

impl MpsLayerConfig {
    pub fn new(rank: usize, phys_dim: usize, bond_dim: usize, labels: usize) -> Self {
        Self {
            rank,
            phys_dim,
            bond_dim,
            labels,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> MpsLayer<B> {
        MpsLayer {
            chain: MpsChain::init(self.rank, self.phys_dim, self.bond_dim, self.labels, device),
        }
    }
}

/// One tensor-train string: site tensors plus boundary and label legs.
///
/// Also the building block of the string-bond-state variant.
#[derive(Module, Debug)]
pub struct MpsChain<B: Backend> {
    /// `[sites, phys, bond, bond]`
    sites: Param<Tensor<B, 4>>,
    /// `[bond]`
    boundary: Param<Tensor<B, 1>>,
    /// `[bond, labels]`
    label: Param<Tensor<B, 2>>,
    bond_dim: usize,
}

impl<B: Backend> MpsChain<B> {
    pub(crate) fn init(
        sites: usize,
        phys: usize,
        bond: usize,
        labels: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            sites: Param::from_tensor(near_identity_sites(sites, phys, bond, device)),
            boundary: Param::from_tensor(Tensor::random(
                [bond],
                Distribution::Normal(0.0, 1.0),
                device,
            )),
            label: Param::from_tensor(Tensor::random(
                [bond, labels],
                Distribution::Normal(0.0, 0.5),
                device,
            )),
            bond_dim: bond,
        }
    }

    /// Contracts an encoded batch `[batch, sites, phys]` down to class scores
    /// `[batch, labels]`.
    pub(crate) fn forward(&self, encoded: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, sites, phys] = encoded.dims();
        let d = self.bond_dim;

        // One bond x bond matrix per site: contract the physical leg.
        let weights = self.sites.val().reshape([1, sites, phys, d * d]);
        let site_matrices = (encoded.reshape([batch, sites, phys, 1]) * weights)
            .sum_dim(2)
            .reshape([batch, sites, d, d]);

        let contracted = contract_chain(site_matrices); // [batch, d, d]

        // Boundary and label legs close the two open bond indices.
        let opened = self
            .boundary
            .val()
            .reshape([1, 1, d])
            .expand([batch, 1, d])
            .matmul(contracted);
        opened.reshape([batch, d]).matmul(self.label.val())
    }
}

/// Matrix-product-state classifier over the flattened pixel chain.
#[derive(Module, Debug)]
pub struct MpsLayer<B: Backend> {
    chain: MpsChain<B>,
}

impl<B: Backend> ImageClassifier<B> for MpsLayer<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, channels, height, width] = images.dims();
        let flat = images.reshape([batch, channels * height * width]);
        self.chain.forward(encode_pixels(flat))
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
        let model = MpsLayerConfig::new(16, 2, 2, 10).init::<TestBackend>(&device);
        let images = Tensor::random([3, 1, 4, 4], Distribution::Uniform(0.0, 1.0), &device);

        let scores = model.forward(images);

        assert_eq!(scores.dims(), [3, 10]);
    }

    #[test]
    fn forward_is_deterministic() {
        let device = NdArrayDevice::Cpu;
        let model = MpsLayerConfig::new(16, 2, 2, 4).init::<TestBackend>(&device);
        let images = Tensor::random([2, 1, 4, 4], Distribution::Uniform(0.0, 1.0), &device);

        let first: Vec<f32> = model
            .forward(images.clone())
            .into_data()
            .to_vec()
            .unwrap();
        let second: Vec<f32> = model.forward(images).into_data().to_vec().unwrap();

        assert_eq!(first, second);
    }
}
