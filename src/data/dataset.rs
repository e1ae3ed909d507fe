use burn::data::dataset::{
    transform::PartialDataset,
    vision::{MnistDataset, MnistItem},
    Dataset,
};
use tracing::info;

/// Full MNIST training split, fetched and cached locally by burn on first use.
pub fn training_set() -> MnistDataset {
    let dataset = MnistDataset::train();
    info!("training set ready: {} images", dataset.len());
    dataset
}

/// Fixed-order evaluation subset: the first `limit` items of the test split.
///
/// Never overlaps the training split, and its order never changes, so repeated
/// evaluations of the same model are comparable.
pub fn evaluation_set(limit: usize) -> PartialDataset<MnistDataset, MnistItem> {
    let test = MnistDataset::test();
    let limit = limit.min(test.len());
    info!("evaluation subset ready: {limit} images");
    PartialDataset::new(test, 0, limit)
}
