use std::sync::Arc;

use burn::{
    data::dataloader::DataLoader,
    tensor::{backend::Backend, ElementConversion, Int, Tensor},
};

use crate::data::batcher::ImageBatch;
use crate::model::ImageClassifier;
use crate::training::metrics::{AccuracyAccumulator, MetricSeries};

/// Counts argmax hits for one batch of class scores: (correct, total).
pub fn correct_predictions<B: Backend>(
    scores: Tensor<B, 2>,
    targets: Tensor<B, 1, Int>,
) -> (usize, usize) {
    let [batch, _] = scores.dims();
    let predicted = scores.argmax(1).reshape([batch]);
    let correct: i64 = predicted.equal(targets).int().sum().into_scalar().elem();
    (correct as usize, batch)
}

/// Measures classification accuracy over the fixed evaluation loader and
/// appends it to the accuracy series at the current global step.
///
/// The caller hands in the inference-mode copy of the model (`model.valid()`),
/// so parameters cannot change and no gradient state accumulates; the copy is
/// dropped when this returns, on every exit path. The loader is unshuffled,
/// so two calls on an unmodified model return the same fraction.
pub fn evaluate<B, M>(
    model: &M,
    loader: &Arc<dyn DataLoader<B, ImageBatch<B>>>,
    step: u64,
    accuracy: &mut MetricSeries,
) -> f64
where
    B: Backend,
    M: ImageClassifier<B>,
{
    println!("Evaluating...");
    let mut counts = AccuracyAccumulator::default();

    for batch in loader.iter() {
        let scores = model.forward(batch.images);
        let (correct, total) = correct_predictions(scores, batch.targets);
        counts.update(correct, total);
    }

    println!(
        "Acc: {}/{}   {}",
        counts.correct(),
        counts.total(),
        counts.accuracy()
    );
    accuracy.push(step, counts.accuracy());
    counts.accuracy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn argmax_matches_reference_counts() {
        let device = NdArrayDevice::Cpu;
        let scores =
            Tensor::<TestBackend, 2>::from_floats([[0.1, 0.9], [0.8, 0.2]], &device);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([1, 0], &device);

        let (correct, total) = correct_predictions(scores, targets);

        assert_eq!((correct, total), (2, 2));
    }

    #[test]
    fn misses_are_not_counted() {
        let device = NdArrayDevice::Cpu;
        let scores = Tensor::<TestBackend, 2>::from_floats(
            [[0.9, 0.1], [0.8, 0.2], [0.3, 0.7]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([1, 0, 1], &device);

        let (correct, total) = correct_predictions(scores, targets);

        assert_eq!((correct, total), (2, 3));
    }
}
