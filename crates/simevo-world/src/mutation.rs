//! Heritable trait mutation applied at birth.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simevo_core::{MutationConfig, Traits};

pub struct Mutator {
    config: MutationConfig,
}

impl Mutator {
    pub fn new(config: MutationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// Copy `parent` with an independent bounded perturbation of every trait
    pub fn mutate(&self, parent: &Traits, rng: &mut ChaCha8Rng) -> Traits {
        let config = &self.config;

        let sensing_radius = perturb_int(parent.sensing_radius, config.radius_step, rng)
            .clamp(config.min_sensing_radius, config.max_sensing_radius);

        let reproduction_threshold =
            perturb_int(parent.reproduction_threshold, config.threshold_step, rng).clamp(
                config.min_reproduction_threshold,
                config.max_reproduction_threshold,
            );

        let wander = if config.wander_step > 0.0 {
            parent.wander + rng.gen_range(-config.wander_step..=config.wander_step)
        } else {
            parent.wander
        };

        Traits {
            sensing_radius,
            reproduction_threshold,
            wander: wander.clamp(0.0, 1.0),
        }
    }
}

fn perturb_int(value: i32, step: i32, rng: &mut ChaCha8Rng) -> i32 {
    if step <= 0 {
        return value;
    }
    value.saturating_add(rng.gen_range(-step..=step))
}
