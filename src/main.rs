mod data;
mod model;
mod training;

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use burn::tensor::backend::Backend;

use crate::model::{ImageClassifier, MpsLayerConfig, PepsLayerConfig, Sbs1dLayerConfig};
use crate::training::{train, DevicePlacement, HyperParams, ModelVariant};

type TrainBackend = Autodiff<NdArray<f32>>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tn_mnist=info".parse()?),
        )
        .init();

    let cfg = HyperParams::new(ModelVariant::Peps);
    cfg.validate()?;

    let device = match cfg.device {
        DevicePlacement::Cpu => NdArrayDevice::Cpu,
    };
    TrainBackend::seed(cfg.seed);

    println!("Building Model...");
    match cfg.model {
        ModelVariant::Mps => {
            let model = MpsLayerConfig::new(cfg.rank, cfg.phys_dim, cfg.bond_dim, cfg.labels)
                .init::<TrainBackend>(&device);
            run(model, &cfg, &device)
        }
        ModelVariant::Sbs1d => {
            let model = Sbs1dLayerConfig::new(
                cfg.rank,
                cfg.phys_dim,
                cfg.bond_dim,
                cfg.string_cnt,
                cfg.labels,
            )
            .init::<TrainBackend>(&device);
            run(model, &cfg, &device)
        }
        ModelVariant::Peps => {
            let model = PepsLayerConfig::new(
                cfg.bond_dim,
                cfg.labels,
                cfg.max_singular_values,
                cfg.truncate_svd,
            )
            .init::<TrainBackend>(&device);
            run(model, &cfg, &device)
        }
    }
}

fn run<M>(model: M, cfg: &HyperParams, device: &NdArrayDevice) -> Result<()>
where
    M: ImageClassifier<TrainBackend> + burn::module::AutodiffModule<TrainBackend>,
    M::InnerModule: ImageClassifier<NdArray<f32>>,
{
    println!("Start training...");
    let (_model, history) = train(
        model,
        cfg,
        device,
        data::training_set(),
        data::evaluation_set(cfg.eval_limit),
    )?;

    println!(
        "Done: {} loss points and {} accuracy points recorded",
        history.loss.len(),
        history.accuracy.len()
    );
    Ok(())
}
