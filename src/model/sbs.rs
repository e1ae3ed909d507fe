use burn::{
    module::Module,
    tensor::{backend::Backend, Tensor},
};

use crate::data::encoding::encode_pixels;
use crate::model::{mps::MpsChain, ImageClassifier};

/// Configuration for the string-bond-state classifier.
#[derive(Debug, Clone)]
pub struct Sbs1dLayerConfig {
    pub rank: usize,
    pub phys_dim: usize,
    pub bond_dim: usize,
    pub string_cnt: usize,
    pub labels: usize,
}

impl Sbs1dLayerConfig {
    pub fn new(
        rank: usize,
        phys_dim: usize,
        bond_dim: usize,
        string_cnt: usize,
        labels: usize,
    ) -> Self {
        Self {
            rank,
            phys_dim,
            bond_dim,
            string_cnt,
            labels,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Sbs1dLayer<B> {
        let strings = (0..self.string_cnt)
            .map(|_| MpsChain::init(self.rank, self.phys_dim, self.bond_dim, self.labels, device))
            .collect();
        Sbs1dLayer {
            strings,
            labels: self.labels,
        }
    }
}

/// String-bond-state classifier: several independent tensor-train strings
/// over the same pixel chain, class scores summed across strings.
///
/// Odd-numbered strings read the chain in reverse, so the ensemble is not
/// biased toward a single traversal direction.
#[derive(Module, Debug)]
pub struct Sbs1dLayer<B: Backend> {
    strings: Vec<MpsChain<B>>,
    labels: usize,
}

impl<B: Backend> ImageClassifier<B> for Sbs1dLayer<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, channels, height, width] = images.dims();
        let flat = images.reshape([batch, channels * height * width]);
        let encoded = encode_pixels(flat);

        let mut scores = Tensor::zeros([batch, self.labels], &encoded.device());
        for (index, string) in self.strings.iter().enumerate() {
            let view = if index % 2 == 1 {
                encoded.clone().flip([1])
            } else {
                encoded.clone()
            };
            scores = scores + string.forward(view);
        }
        scores
    }
}
