use std::sync::Arc;

use anyhow::Result;
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::{vision::MnistItem, Dataset},
    },
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::data::batcher::{ImageBatch, ImageBatcher};
use crate::model::ImageClassifier;
use crate::training::{
    checkpoint::save_checkpoint,
    config::HyperParams,
    evaluator::evaluate,
    metrics::{MetricSeries, MetricsLogger},
};

/// Loss and accuracy history of one finished run.
#[derive(Debug, Default)]
pub struct RunMetrics {
    pub loss: MetricSeries,
    pub accuracy: MetricSeries,
}

/// Runs the full training schedule and returns the trained model together
/// with the recorded metric history.
///
/// One optimization step per batch; the global step counter spans all epochs
/// and keys both metric series. Every `eval_every`-th step *within* an epoch
/// (so step 0 of every epoch included) the model is evaluated on the held-out
/// set and both series are flushed to their log files.
pub fn train<B, M>(
    mut model: M,
    cfg: &HyperParams,
    device: &B::Device,
    train_data: impl Dataset<MnistItem> + 'static,
    eval_data: impl Dataset<MnistItem> + 'static,
) -> Result<(M, RunMetrics)>
where
    B: AutodiffBackend,
    M: ImageClassifier<B> + AutodiffModule<B>,
    M::InnerModule: ImageClassifier<B::InnerBackend>,
{
    let mut optimizer = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay)
        .init();
    let loss_fn = CrossEntropyLossConfig::new().init(device);
    let logger = MetricsLogger::new(&cfg.log_dir, &cfg.log_stem());
    let mut history = RunMetrics::default();

    let train_loader: Arc<dyn DataLoader<B, ImageBatch<B>>> =
        DataLoaderBuilder::new(ImageBatcher)
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .build(train_data);
    let eval_loader: Arc<dyn DataLoader<B::InnerBackend, ImageBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(ImageBatcher)
            .batch_size(cfg.batch_size)
            .build(eval_data);

    let mut total_step: u64 = 0;
    for epoch in 0..cfg.epochs {
        println!("Epoch {epoch}");

        for (step, batch) in train_loader.iter().enumerate() {
            let scores = model.forward(batch.images);
            let loss = loss_fn.forward(scores, batch.targets);
            let loss_value = f64::from(loss.clone().into_scalar().elem::<f32>());

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(cfg.learning_rate, model, grads);

            println!("Epoch: {epoch} Step:{step} Loss:{loss_value}");
            history.loss.push(total_step, loss_value);

            if step % cfg.eval_every == 0 {
                evaluate(
                    &model.valid(),
                    &eval_loader,
                    total_step,
                    &mut history.accuracy,
                );
                logger.flush(&history.loss, &history.accuracy)?;
            }

            total_step += 1;
        }

        if let Err(err) = save_checkpoint(&model, epoch, &cfg.checkpoint_dir) {
            tracing::warn!("checkpoint for epoch {epoch} not saved: {err:#}");
        }
    }

    // Final flush so the logs carry the complete run.
    logger.flush(&history.loss, &history.accuracy)?;

    Ok((model, history))
}
