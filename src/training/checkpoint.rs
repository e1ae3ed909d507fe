use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use burn::{
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};

pub fn save_checkpoint<B: Backend, M: Module<B>>(
    model: &M,
    epoch: usize,
    checkpoint_dir: &str,
) -> Result<()> {
    fs::create_dir_all(checkpoint_dir)
        .with_context(|| format!("cannot create checkpoint directory {checkpoint_dir}"))?;
    let path = format!("{checkpoint_dir}/epoch_{epoch:03}");
    CompactRecorder::new()
        .record(model.clone().into_record(), Path::new(&path).into())
        .map_err(|e| anyhow!("cannot write checkpoint {path}: {e:?}"))?;
    tracing::debug!("checkpoint saved: {path}");
    Ok(())
}
