pub mod batcher;
pub mod dataset;
pub mod encoding;

pub use batcher::{ImageBatch, ImageBatcher};
pub use dataset::{evaluation_set, training_set};
pub use encoding::{encode_pixels, PIXEL_CHANNELS};
