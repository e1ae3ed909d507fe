use burn::tensor::{backend::Backend, Tensor};

/// Width of the per-pixel encoding: each intensity becomes an off/on pair.
pub const PIXEL_CHANNELS: usize = 2;

/// Expands each pixel intensity `x` into the two-channel vector `[1 - x, x]`.
///
/// Sequence-style models contract one physical leg per pixel, so a flattened
/// batch `[batch, features]` becomes `[batch, features, 2]` with channel 0
/// holding `1 - x` and channel 1 holding `x`.
pub fn encode_pixels<B: Backend>(features: Tensor<B, 2>) -> Tensor<B, 3> {
    let on = features.clone();
    let off = features.ones_like() - features;
    Tensor::stack(vec![off, on], 2)
}
