use anyhow::{bail, Result};

use crate::data::encoding::PIXEL_CHANNELS;

/// Which tensor-network topology the classifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Matrix-product state over the flattened pixel chain
    Mps,
    /// String-bond state: several strings over the same chain
    Sbs1d,
    /// Grid-style layer with a convolutional stem
    Peps,
}

impl ModelVariant {
    /// Short name used in the log file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mps => "mps",
            Self::Sbs1d => "sbs1d",
            Self::Peps => "peps",
        }
    }
}

/// Where tensors live for the run. CPU only in this configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePlacement {
    Cpu,
}

/// All options for one training run.
///
/// Built once in `main` and read-only afterwards; there is no CLI or
/// environment parsing.
#[derive(Debug, Clone)]
pub struct HyperParams {
    /// Input feature count (28 * 28 pixels)
    pub rank: usize,
    /// Per-site encoding width
    pub phys_dim: usize,
    /// Bond dimension of the tensor network
    pub bond_dim: usize,
    /// Number of strings in the SBS variant
    pub string_cnt: usize,
    /// Class count
    pub labels: usize,
    pub device: DevicePlacement,
    pub batch_size: usize,
    pub model: ModelVariant,
    /// Rank cap for the grid model's contracted environments
    pub max_singular_values: usize,
    pub truncate_svd: bool,
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f32,
    /// Evaluate every this many steps within an epoch
    pub eval_every: usize,
    /// Size of the fixed evaluation subset
    pub eval_limit: usize,
    pub seed: u64,
    pub log_dir: String,
    pub checkpoint_dir: String,
}

impl HyperParams {
    pub fn new(model: ModelVariant) -> Self {
        Self {
            rank: 28 * 28,
            phys_dim: PIXEL_CHANNELS,
            bond_dim: 2,
            string_cnt: 2,
            labels: 10,
            device: DevicePlacement::Cpu,
            batch_size: 4,
            model,
            max_singular_values: 32,
            truncate_svd: true,
            epochs: 10,
            learning_rate: 5e-3,
            weight_decay: 1e-3,
            eval_every: 50,
            eval_limit: 500,
            seed: 1111,
            log_dir: "logs".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
        }
    }

    /// Rejects configurations no model can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.labels == 0 {
            bail!("labels must be at least 1");
        }
        if self.bond_dim == 0 {
            bail!("bond_dim must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.eval_every == 0 {
            bail!("eval_every must be at least 1");
        }
        if self.model == ModelVariant::Sbs1d && self.string_cnt == 0 {
            bail!("string_cnt must be at least 1 for the sbs1d variant");
        }
        if self.model != ModelVariant::Peps && self.phys_dim != PIXEL_CHANNELS {
            bail!(
                "phys_dim {} does not match the {}-channel pixel encoding",
                self.phys_dim,
                PIXEL_CHANNELS
            );
        }
        Ok(())
    }

    /// File stem shared by the loss and accuracy logs, e.g. `peps_bond_2_phys_2`.
    pub fn log_stem(&self) -> String {
        format!(
            "{}_bond_{}_phys_{}",
            self.model.as_str(),
            self.bond_dim,
            self.phys_dim
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_config_is_valid() {
        assert!(HyperParams::new(ModelVariant::Peps).validate().is_ok());
        assert!(HyperParams::new(ModelVariant::Mps).validate().is_ok());
        assert!(HyperParams::new(ModelVariant::Sbs1d).validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut cfg = HyperParams::new(ModelVariant::Mps);
        cfg.batch_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn encoding_width_mismatch_is_rejected_for_sequence_variants() {
        let mut cfg = HyperParams::new(ModelVariant::Mps);
        cfg.phys_dim = 10;
        assert!(cfg.validate().is_err());

        // The grid variant never touches the pixel encoding.
        let mut cfg = HyperParams::new(ModelVariant::Peps);
        cfg.phys_dim = 10;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn log_stem_names_variant_and_dimensions() {
        let cfg = HyperParams::new(ModelVariant::Peps);
        assert_eq!(cfg.log_stem(), "peps_bond_2_phys_2");
    }
}
