pub mod chain;
pub mod mps;
pub mod peps;
pub mod sbs;

use burn::tensor::{backend::Backend, Tensor};

pub use mps::{MpsLayer, MpsLayerConfig};
pub use peps::{PepsLayer, PepsLayerConfig};
pub use sbs::{Sbs1dLayer, Sbs1dLayerConfig};

/// Anything that maps an image batch to per-class scores.
///
/// `[batch, 1, height, width]` -> `[batch, labels]`. Input encoding is the
/// implementor's concern: sequence-style layers expand each pixel into the
/// two-channel `[1-x, x]` pair, the grid-style layer consumes the image
/// as-is.
pub trait ImageClassifier<B: Backend> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}
