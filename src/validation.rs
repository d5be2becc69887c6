use crate::error::ClusteringError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataValidator<'a> {
    data: &'a [Vec<f64>],
    min_cluster_size: usize,
}

impl<'a> DataValidator<'a> {
    pub(crate) fn new(data: &'a [Vec<f64>], min_cluster_size: usize) -> Self {
        Self {
            data,
            min_cluster_size,
        }
    }

    pub(crate) fn validate_input_data(&self) -> Result<(), ClusteringError> {
        if self.min_cluster_size < 1 {
            return Err(ClusteringError::MinClusterSizeTooSmall);
        }
        if self.data.len() < self.min_cluster_size {
            return Err(ClusteringError::DataTooShort {
                len: self.data.len(),
                min_cluster_size: self.min_cluster_size,
            });
        }
        let dims_0th = self.data[0].len();
        for (n, datapoint) in self.data.iter().enumerate() {
            let dims_nth = datapoint.len();
            if dims_nth != dims_0th {
                return Err(ClusteringError::WrongDimension(format!(
                    "0th data point has {dims_0th} dimensions, but {n}th has {dims_nth}"
                )));
            }
            if datapoint.iter().any(|element| !element.is_finite()) {
                return Err(ClusteringError::NonFiniteCoordinate(format!(
                    "{n}th vector contains non-finite element(s)"
                )));
            }
        }
        Ok(())
    }
}
