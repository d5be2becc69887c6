use crate::config::ClusteringConfig;
use crate::error::ClusteringError;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Row indices to cluster, ascending. Random sampling keeps each row independently with the
/// configured probability and takes precedence over a leading-rows subsample. `config`
/// should already be effective.
pub(crate) fn sample_rows(
    n_rows: usize,
    config: &ClusteringConfig,
    min_cluster_size: usize,
) -> Result<Vec<usize>, ClusteringError> {
    let sample: Vec<usize> = if let Some(pct) = config.random_sample_pct {
        let mut rng = match config.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pct = pct.clamp(0.0, 1.0);
        (0..n_rows).filter(|_| rng.gen_bool(pct)).collect()
    } else if let Some(n) = config.subsample_n {
        if n > n_rows {
            warn!("Subsample of {n} rows exceeds the {n_rows} available, clustering all rows");
        }
        (0..n.min(n_rows)).collect()
    } else {
        (0..n_rows).collect()
    };

    if sample.len() < min_cluster_size {
        return Err(ClusteringError::SampleTooSmall {
            sample: sample.len(),
            min_cluster_size,
        });
    }
    Ok(sample)
}
