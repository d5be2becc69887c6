use crate::core_distances::NnAlgorithm;
use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Defaults for parameters
const VERBOSE_DEFAULT: bool = false;
const VORONOI_DEFAULT: bool = false;
const OUTLIER_DETECTION_DEFAULT: bool = false;
const NEAREST_NEIGHBOR_DEFAULT: bool = false;
const OUTLIER_CLUSTERING_DEFAULT: bool = false;
const NN_ALGORITHM_DEFAULT: NnAlgorithm = NnAlgorithm::Auto;

// Used in place of an out of range random sampling fraction
const RANDOM_SAMPLE_PCT_FALLBACK: f64 = 1.0;

/// Options for a clustering run. All post-processing is off by default.
///
/// Some options imply others: outlier clustering needs outlier detection, and sampling needs
/// Voronoi back-fill so that unsampled rows still end up in a cluster.
/// [`ClusteringConfig::effective`] applies these implications, and a run always uses the
/// effective configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusteringConfig {
    /// Log progress at info level
    pub verbose: bool,
    /// Attach every point left unclustered to its nearest cluster
    pub voronoi: bool,
    /// Record unclustered points as outliers of their nearest cluster
    pub outlier_detection: bool,
    /// Measure distances to clusters by their nearest member rather than their centroid
    pub nearest_neighbor: bool,
    /// Promote the outliers of a cluster to a cluster of their own when numerous enough
    pub outlier_clustering: bool,
    /// Cluster only the first `n` rows
    pub subsample_n: Option<usize>,
    /// Cluster a random fraction of the rows. Takes precedence over `subsample_n`.
    pub random_sample_pct: Option<f64>,
    /// Seed for random sampling, for reproducible runs
    pub sample_seed: Option<u64>,
    pub nn_algorithm: NnAlgorithm,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            verbose: VERBOSE_DEFAULT,
            voronoi: VORONOI_DEFAULT,
            outlier_detection: OUTLIER_DETECTION_DEFAULT,
            nearest_neighbor: NEAREST_NEIGHBOR_DEFAULT,
            outlier_clustering: OUTLIER_CLUSTERING_DEFAULT,
            subsample_n: None,
            random_sample_pct: None,
            sample_seed: None,
            nn_algorithm: NN_ALGORITHM_DEFAULT,
        }
    }
}

impl ClusteringConfig {
    /// Enters the builder pattern, allowing options to be set using various setter methods.
    ///
    /// # Returns
    /// * the configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            config: ClusteringConfig::default(),
        }
    }

    /// Whether only part of the data is clustered.
    pub fn is_sampled(&self) -> bool {
        self.subsample_n.is_some() || self.random_sample_pct.is_some()
    }

    /// The configuration with option implications applied and an out of range random
    /// sampling fraction replaced by 1.
    pub fn effective(&self) -> ClusteringConfig {
        let mut config = self.clone();
        if let Some(pct) = config.random_sample_pct {
            if !(0.0..=1.0).contains(&pct) {
                warn!(
                    "Random sampling fraction {pct} is outside [0, 1], using {}",
                    RANDOM_SAMPLE_PCT_FALLBACK
                );
                config.random_sample_pct = Some(RANDOM_SAMPLE_PCT_FALLBACK);
            }
        }
        if config.outlier_clustering {
            config.outlier_detection = true;
        }
        if config.is_sampled() {
            config.voronoi = true;
        }
        config
    }
}

/// Builder object to set clustering options.
pub struct ConfigBuilder {
    config: ClusteringConfig,
}

impl ConfigBuilder {
    /// Sets whether progress is logged at info level. Defaults to false.
    pub fn verbose(mut self, verbose: bool) -> ConfigBuilder {
        self.config.verbose = verbose;
        self
    }

    /// Sets whether points left out of every cluster are attached to their nearest cluster.
    /// Defaults to false.
    pub fn voronoi(mut self, voronoi: bool) -> ConfigBuilder {
        self.config.voronoi = voronoi;
        self
    }

    /// Sets whether points left out of every cluster are recorded as outliers of their
    /// nearest cluster, with a normalised distance. Defaults to false.
    pub fn outlier_detection(mut self, outlier_detection: bool) -> ConfigBuilder {
        self.config.outlier_detection = outlier_detection;
        self
    }

    /// Sets whether the distance to a cluster is measured to its nearest member instead of
    /// its centroid, for both outlier detection and Voronoi back-fill. Defaults to false.
    pub fn nearest_neighbor(mut self, nearest_neighbor: bool) -> ConfigBuilder {
        self.config.nearest_neighbor = nearest_neighbor;
        self
    }

    /// Sets whether a cluster's outliers form a new cluster when there are at least minimum
    /// cluster size of them. Enables outlier detection. Defaults to false.
    pub fn outlier_clustering(mut self, outlier_clustering: bool) -> ConfigBuilder {
        self.config.outlier_clustering = outlier_clustering;
        self
    }

    /// Clusters only the first `n` rows. Enables Voronoi back-fill.
    ///
    /// # Parameters
    /// * n - the number of leading rows to cluster
    pub fn subsample(mut self, n: usize) -> ConfigBuilder {
        self.config.subsample_n = Some(n);
        self
    }

    /// Clusters a random fraction of the rows, each row kept with probability `pct`.
    /// Takes precedence over `subsample`. Enables Voronoi back-fill.
    ///
    /// # Parameters
    /// * pct - the fraction in `[0, 1]`, anything else is treated as 1
    pub fn random_sampling(mut self, pct: f64) -> ConfigBuilder {
        self.config.random_sample_pct = Some(pct);
        self
    }

    /// Seeds random sampling so that runs are reproducible.
    pub fn sample_seed(mut self, seed: u64) -> ConfigBuilder {
        self.config.sample_seed = Some(seed);
        self
    }

    /// Sets the nearest neighbour algorithm used for core distances. Defaults to Auto.
    pub fn nn_algorithm(mut self, nn_algorithm: NnAlgorithm) -> ConfigBuilder {
        self.config.nn_algorithm = nn_algorithm;
        self
    }

    /// Finishes the builder, returning the effective configuration.
    pub fn build(self) -> ClusteringConfig {
        self.config.effective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let config = ClusteringConfig::builder().build();
        assert_eq!(ClusteringConfig::default(), config);
        assert!(!config.voronoi && !config.outlier_detection && !config.is_sampled());
    }

    #[test]
    fn nearest_neighbor_implies_nothing() {
        let config = ClusteringConfig::builder().nearest_neighbor(true).build();
        assert!(config.nearest_neighbor);
        assert!(!config.outlier_detection && !config.voronoi);
    }

    #[test]
    fn outlier_clustering_implies_outlier_detection() {
        let config = ClusteringConfig {
            outlier_clustering: true,
            ..Default::default()
        };
        assert!(!config.outlier_detection);
        assert!(config.effective().outlier_detection);
    }

    #[test]
    fn sampling_implies_voronoi() {
        assert!(ClusteringConfig::builder().subsample(10).build().voronoi);
        assert!(ClusteringConfig::builder().random_sampling(0.5).build().voronoi);
    }

    #[test]
    fn out_of_range_sampling_fraction_is_replaced() {
        let config = ClusteringConfig::builder().random_sampling(1.5).build();
        assert_eq!(Some(1.0), config.random_sample_pct);
        let config = ClusteringConfig::builder().random_sampling(f64::NAN).build();
        assert_eq!(Some(1.0), config.random_sample_pct);
        let config = ClusteringConfig::builder().random_sampling(0.25).build();
        assert_eq!(Some(0.25), config.random_sample_pct);
    }
}
