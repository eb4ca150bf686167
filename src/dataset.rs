//! Dataset handling: immutable train/test splits over ndarray storage.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// An immutable train/test split.
///
/// Shapes are validated at construction and fixed for the lifetime of
/// one organize run: X arrays are (samples, features), y arrays (samples,).
#[derive(Clone, Debug)]
pub struct Dataset {
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
}

impl Dataset {
    /// Create a dataset from pre-split arrays
    pub fn new(
        x_train: Array2<f64>,
        y_train: Array1<f64>,
        x_test: Array2<f64>,
        y_test: Array1<f64>,
    ) -> Result<Self, DatasetError> {
        if x_train.nrows() == 0 || x_test.nrows() == 0 {
            return Err(DatasetError::Shape("empty train or test split".to_string()));
        }
        if x_train.ncols() == 0 {
            return Err(DatasetError::Shape("zero features".to_string()));
        }
        if x_train.ncols() != x_test.ncols() {
            return Err(DatasetError::Shape(format!(
                "train has {} features but test has {}",
                x_train.ncols(),
                x_test.ncols()
            )));
        }
        if x_train.nrows() != y_train.len() || x_test.nrows() != y_test.len() {
            return Err(DatasetError::Shape(
                "X and y sample counts do not match".to_string(),
            ));
        }
        Ok(Self {
            x_train,
            y_train,
            x_test,
            y_test,
        })
    }

    /// Load a dataset from a CSV file.
    ///
    /// The last column is the target; all other columns are features.
    /// Rows are shuffled with the given seed, then split so that
    /// `test_fraction` of samples form the test set.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        test_fraction: f64,
        seed: u64,
    ) -> Result<Self, DatasetError> {
        if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
            return Err(DatasetError::Shape(
                "test_fraction must be in (0, 1)".to_string(),
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Result<Vec<f64>, _> =
                record.iter().map(|field| field.trim().parse::<f64>()).collect();
            let row = row.map_err(|e| DatasetError::Parse(e.to_string()))?;
            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Err(DatasetError::Shape(
                        "ragged CSV: rows have differing column counts".to_string(),
                    ));
                }
            }
            rows.push(row);
        }

        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        if columns < 2 {
            return Err(DatasetError::Shape(
                "CSV needs at least one feature column and one target column".to_string(),
            ));
        }
        if rows.len() < 2 {
            return Err(DatasetError::Shape(
                "CSV needs at least two data rows to split into train and test".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let test_len = ((rows.len() as f64) * test_fraction).round() as usize;
        let test_len = test_len.clamp(1, rows.len() - 1);
        let train_len = rows.len() - test_len;
        let features = columns - 1;

        let build = |chunk: &[Vec<f64>]| {
            let mut x = Array2::zeros((chunk.len(), features));
            let mut y = Array1::zeros(chunk.len());
            for (i, row) in chunk.iter().enumerate() {
                for (j, &v) in row[..features].iter().enumerate() {
                    x[[i, j]] = v;
                }
                y[i] = row[features];
            }
            (x, y)
        };

        let (x_train, y_train) = build(&rows[..train_len]);
        let (x_test, y_test) = build(&rows[train_len..]);

        Self::new(x_train, y_train, x_test, y_test)
    }

    /// Number of input features
    #[inline]
    pub fn features(&self) -> usize {
        self.x_train.ncols()
    }

    /// Number of training samples
    #[inline]
    pub fn train_len(&self) -> usize {
        self.x_train.nrows()
    }

    /// Number of test samples
    #[inline]
    pub fn test_len(&self) -> usize {
        self.x_test.nrows()
    }

    #[inline]
    pub fn x_train(&self) -> &Array2<f64> {
        &self.x_train
    }

    #[inline]
    pub fn y_train(&self) -> &Array1<f64> {
        &self.y_train
    }

    #[inline]
    pub fn x_test(&self) -> &Array2<f64> {
        &self.x_test
    }

    #[inline]
    pub fn y_test(&self) -> &Array1<f64> {
        &self.y_test
    }

    /// Per-feature mean over training samples
    pub fn feature_means(&self) -> Array1<f64> {
        self.x_train
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.features()))
    }
}

/// Errors arising while constructing a dataset
#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Csv(csv::Error),
    Parse(String),
    Shape(String),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "IO error: {}", e),
            DatasetError::Csv(e) => write!(f, "CSV error: {}", e),
            DatasetError::Parse(e) => write!(f, "parse error: {}", e),
            DatasetError::Shape(e) => write!(f, "shape error: {}", e),
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> Self {
        DatasetError::Io(e)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        DatasetError::Csv(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    fn tiny_dataset() -> Dataset {
        let x_train = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let y_train = array![0.0, 1.0, 1.0];
        let x_test = array![[0.2, 0.8], [0.9, 0.1]];
        let y_test = array![0.0, 1.0];
        Dataset::new(x_train, y_train, x_test, y_test).unwrap()
    }

    #[test]
    fn test_valid_construction() {
        let data = tiny_dataset();
        assert_eq!(data.features(), 2);
        assert_eq!(data.train_len(), 3);
        assert_eq!(data.test_len(), 2);
    }

    #[test]
    fn test_mismatched_features_rejected() {
        let x_train = array![[0.0, 1.0]];
        let y_train = array![0.0];
        let x_test = array![[0.2, 0.8, 0.3]];
        let y_test = array![0.0];
        assert!(Dataset::new(x_train, y_train, x_test, y_test).is_err());
    }

    #[test]
    fn test_mismatched_targets_rejected() {
        let x_train = array![[0.0, 1.0], [1.0, 0.0]];
        let y_train = array![0.0];
        let x_test = array![[0.2, 0.8]];
        let y_test = array![0.0];
        assert!(Dataset::new(x_train, y_train, x_test, y_test).is_err());
    }

    #[test]
    fn test_feature_means() {
        let data = tiny_dataset();
        let means = data.feature_means();
        assert!((means[0] - 0.5).abs() < 1e-12);
        assert!((means[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_csv_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "f0,f1,target").unwrap();
        for i in 0..20 {
            let v = i as f64 / 20.0;
            writeln!(file, "{},{},{}", v, 1.0 - v, if v > 0.5 { 1 } else { 0 }).unwrap();
        }

        let data = Dataset::from_csv(&path, 0.25, 42).unwrap();
        assert_eq!(data.features(), 2);
        assert_eq!(data.train_len() + data.test_len(), 20);
        assert_eq!(data.test_len(), 5);
    }

    #[test]
    fn test_csv_with_single_row_rejected() {
        // one data row cannot be split into train and test
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "f0,target").unwrap();
        writeln!(file, "0.5,1").unwrap();

        let result = Dataset::from_csv(&path, 0.25, 42);
        assert!(matches!(result, Err(DatasetError::Shape(_))));
    }

    #[test]
    fn test_csv_seed_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "f0,target").unwrap();
        for i in 0..10 {
            writeln!(file, "{},{}", i, i % 2).unwrap();
        }

        let a = Dataset::from_csv(&path, 0.3, 7).unwrap();
        let b = Dataset::from_csv(&path, 0.3, 7).unwrap();
        assert_eq!(a.x_train(), b.x_train());
        assert_eq!(a.y_test(), b.y_test());
    }
}
