use num_traits::Float;

/// Possible distance metrics that can be used when calculating the distances between data
/// points. The clustering assumes a metric-like distance: symmetric, non-negative and zero
/// between identical points.
#[derive(Copy, Clone, Debug)]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
    /// The angle, in radians, between two vectors. Insensitive to vector length, which suits
    /// direction-like data such as surface normals.
    Angular,
    /// Any caller supplied distance function.
    Custom(fn(&[f64], &[f64]) -> f64),
}

impl DistanceMetric {
    pub(crate) fn calc_dist(&self, a: &[f64], b: &[f64]) -> f64 {
        match *self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Manhattan => manhattan_distance(a, b),
            Self::Angular => angular_distance(a, b),
            Self::Custom(dist_func) => dist_func(a, b),
        }
    }

    /// Whether a k-d tree can prune by bounding box under this metric. Only true for metrics
    /// that grow monotonically with every coordinate difference.
    pub(crate) fn supports_kd_tree(&self) -> bool {
        matches!(self, Self::Euclidean | Self::Manhattan)
    }
}

pub fn euclidean_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ((*x) - (*y)) * ((*x) - (*y)))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt()
}

pub fn manhattan_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ((*x) - (*y)).abs())
        .fold(T::zero(), std::ops::Add::add)
}

/// Angle between two vectors, computed as `atan2(|a x b|, a . b)` which stays accurate for
/// nearly parallel vectors. A zero length vector has an angle of zero to everything.
pub fn angular_distance<T: Float>(a: &[T], b: &[T]) -> T {
    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (T::zero(), T::zero(), T::zero()),
        |(dot, norm_a, norm_b), (&x, &y)| (dot + x * y, norm_a + x * x, norm_b + y * y),
    );
    // Lagrange's identity gives |a x b|^2 in any dimension
    let cross = (norm_a * norm_b - dot * dot).max(T::zero()).sqrt();
    cross.atan2(dot)
}
