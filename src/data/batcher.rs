use burn::{
    data::{dataloader::batcher::Batcher, dataset::vision::MnistItem},
    tensor::{backend::Backend, Int, Tensor},
};

const IMAGE_SIDE: usize = 28;

/// One batch of labeled images ready for a model.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// `[batch, 1, 28, 28]`, pixel values scaled to `[0, 1]`
    pub images: Tensor<B, 4>,
    /// `[batch]`
    pub targets: Tensor<B, 1, Int>,
}

/// Collates raw dataset items into [`ImageBatch`]es.
#[derive(Debug, Clone, Default)]
pub struct ImageBatcher;

impl<B: Backend> Batcher<B, MnistItem, ImageBatch<B>> for ImageBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> ImageBatch<B> {
        let count = items.len();

        let mut pixels = Vec::with_capacity(count * IMAGE_SIDE * IMAGE_SIDE);
        let mut targets = Vec::with_capacity(count);
        for item in &items {
            for row in item.image.iter() {
                for &pixel in row.iter() {
                    // Raw intensities are 0..255
                    pixels.push(pixel / 255.0);
                }
            }
            targets.push(item.label as i64);
        }

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), device).reshape([
            count,
            1,
            IMAGE_SIDE,
            IMAGE_SIDE,
        ]);
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), device);

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn batch_shapes_and_scaling() {
        let device = NdArrayDevice::Cpu;
        let items = vec![
            MnistItem {
                image: [[0.0; 28]; 28],
                label: 3,
            },
            MnistItem {
                image: [[255.0; 28]; 28],
                label: 7,
            },
        ];

        let batch: ImageBatch<TestBackend> = ImageBatcher.batch(items, &device);

        assert_eq!(batch.images.dims(), [2, 1, 28, 28]);
        let pixels: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert!(pixels[..28 * 28].iter().all(|&p| p == 0.0));
        assert!(pixels[28 * 28..].iter().all(|&p| p == 1.0));

        let targets: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(targets, vec![3, 7]);
    }
}
