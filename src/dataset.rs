//! Static UPS runtime data.
//!
//! Each kVA rating maps to a set of load points (watts) and one runtime curve per
//! battery configuration (minutes at each load).  The table is immutable and built
//! once on first access.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::DatasetError;
use crate::model::Rgb;

/// Line colours used by the chart renderer.
pub mod palette {
    use crate::model::Rgb;

    pub const BLUE: Rgb = Rgb::new(54, 162, 235);
    pub const PURPLE: Rgb = Rgb::new(153, 102, 255);
    pub const GREEN: Rgb = Rgb::new(75, 192, 192);
    pub const RED: Rgb = Rgb::new(255, 99, 132);
    pub const ORANGE: Rgb = Rgb::new(255, 159, 64);
    pub const YELLOW: Rgb = Rgb::new(255, 205, 86);
    pub const TEAL: Rgb = Rgb::new(0, 128, 128);
    pub const PINK: Rgb = Rgb::new(255, 105, 180);

    /// The palette in assignment order.
    pub const ALL: [Rgb; 8] = [BLUE, PURPLE, GREEN, RED, ORANGE, YELLOW, TEAL, PINK];
}

/// The UPS power class a dataset belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KvaRating {
    One,
    Two,
    Three,
    Six,
    Ten,
}

impl KvaRating {
    /// Every rating in selection order.
    pub const ALL: [KvaRating; 5] = [
        KvaRating::One,
        KvaRating::Two,
        KvaRating::Three,
        KvaRating::Six,
        KvaRating::Ten,
    ];

    /// The configuration key, e.g. `"2"` for 2 kVA.
    pub fn key(self) -> &'static str {
        match self {
            KvaRating::One => "1",
            KvaRating::Two => "2",
            KvaRating::Three => "3",
            KvaRating::Six => "6",
            KvaRating::Ten => "10",
        }
    }

    /// Base UPS model for the rating.
    pub fn model_name(self) -> &'static str {
        match self {
            KvaRating::One => "MP RT 1k S",
            KvaRating::Two => "MP RT 2k S",
            KvaRating::Three => "MP RT 3k S",
            KvaRating::Six => "MP RT Pro 6K",
            KvaRating::Ten => "MP RT Pro 10K",
        }
    }

    /// Label shown in selection lists, e.g. `"2 kVA - MP RT 2k S"`.
    pub fn display_label(self) -> String {
        format!("{} kVA - {}", self.key(), self.model_name())
    }
}

impl fmt::Display for KvaRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for KvaRating {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let key = trimmed
            .strip_suffix("kVA")
            .or_else(|| trimmed.strip_suffix("kva"))
            .unwrap_or(trimmed)
            .trim();
        KvaRating::ALL
            .into_iter()
            .find(|rating| rating.key() == key)
            .ok_or_else(|| DatasetError::UnknownRating(s.to_owned()))
    }
}

/// A named runtime curve: minutes of runtime at each load point.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeSeries {
    name: String,
    values: Vec<f64>,
    color: Rgb,
}

impl RuntimeSeries {
    pub fn new(name: impl Into<String>, values: impl Into<Vec<f64>>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
            color,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

/// Load points and runtime curves for one kVA rating.
///
/// Invariants, checked by [`RuntimeDataset::new`]: at least one load point, load
/// points finite and strictly increasing, at least one series, every series as
/// long as the load points, and every runtime finite and non-negative.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeDataset {
    rating: KvaRating,
    load_points: Vec<f64>,
    series: Vec<RuntimeSeries>,
}

impl RuntimeDataset {
    /// Builds a dataset after validating its invariants.
    pub fn new(
        rating: KvaRating,
        load_points: impl Into<Vec<f64>>,
        series: impl Into<Vec<RuntimeSeries>>,
    ) -> Result<Self, DatasetError> {
        let dataset = Self {
            rating,
            load_points: load_points.into(),
            series: series.into(),
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn rating(&self) -> KvaRating {
        self.rating
    }

    pub fn load_points(&self) -> &[f64] {
        &self.load_points
    }

    pub fn series(&self) -> &[RuntimeSeries] {
        &self.series
    }

    pub fn load_count(&self) -> usize {
        self.load_points.len()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Longest runtime across all series, `0.0` when every value is zero.
    pub fn max_runtime(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|series| series.values.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Checks the dataset invariants.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.load_points.is_empty() {
            return Err(DatasetError::NoLoadPoints);
        }
        if self.series.is_empty() {
            return Err(DatasetError::NoSeries);
        }

        for (index, &value) in self.load_points.iter().enumerate() {
            if !value.is_finite() {
                return Err(DatasetError::NonFiniteLoad { index, value });
            }
            if index > 0 {
                let previous = self.load_points[index - 1];
                if value <= previous {
                    return Err(DatasetError::LoadNotIncreasing {
                        index,
                        previous,
                        value,
                    });
                }
            }
        }

        for series in &self.series {
            if series.values.len() != self.load_points.len() {
                return Err(DatasetError::LengthMismatch {
                    series: series.name.clone(),
                    expected: self.load_points.len(),
                    actual: series.values.len(),
                });
            }
            if let Some((index, &value)) = series
                .values
                .iter()
                .enumerate()
                .find(|(_, value)| !value.is_finite() || **value < 0.0)
            {
                return Err(DatasetError::InvalidRuntime {
                    series: series.name.clone(),
                    index,
                    value,
                });
            }
        }

        Ok(())
    }

    /// Fails when the dataset does not belong to `rating`.
    pub fn ensure_rating(&self, rating: KvaRating) -> Result<(), DatasetError> {
        if self.rating == rating {
            Ok(())
        } else {
            Err(DatasetError::RatingMismatch {
                requested: rating,
                dataset: self.rating,
            })
        }
    }
}

/// The immutable lookup table of every rating.
#[derive(Debug)]
pub struct RuntimeTable {
    datasets: Vec<RuntimeDataset>,
}

impl RuntimeTable {
    /// Dataset for `rating`.
    pub fn get(&self, rating: KvaRating) -> &RuntimeDataset {
        // `builtin_datasets` holds one entry per rating, in `KvaRating::ALL` order.
        let index = KvaRating::ALL
            .iter()
            .position(|candidate| *candidate == rating)
            .unwrap_or_default();
        &self.datasets[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeDataset> {
        self.datasets.iter()
    }
}

/// Returns the process-wide runtime table.
pub fn runtime_table() -> &'static RuntimeTable {
    static TABLE: OnceLock<RuntimeTable> = OnceLock::new();
    TABLE.get_or_init(|| RuntimeTable {
        datasets: builtin_datasets(),
    })
}

fn dataset(rating: KvaRating, load_points: &[f64], series: &[(&str, &[f64], Rgb)]) -> RuntimeDataset {
    RuntimeDataset {
        rating,
        load_points: load_points.to_vec(),
        series: series
            .iter()
            .map(|(name, values, color)| RuntimeSeries::new(*name, *values, *color))
            .collect(),
    }
}

fn builtin_datasets() -> Vec<RuntimeDataset> {
    use palette::*;

    vec![
        dataset(
            KvaRating::One,
            &[150.0, 300.0, 450.0, 600.0, 800.0, 900.0],
            &[
                (
                    "MP RT 1k S (Internal batteries only)",
                    &[60.0, 30.0, 15.0, 12.0, 7.0, 5.0],
                    BLUE,
                ),
                (
                    "MP RT 1k S + 1 EBP (BR04024C)",
                    &[150.0, 90.0, 60.0, 45.0, 35.0, 25.0],
                    PURPLE,
                ),
                (
                    "MP RT 1k S + 2 EBP (BR04024C)",
                    &[250.0, 163.0, 100.0, 75.0, 60.0, 45.0],
                    GREEN,
                ),
            ],
        ),
        dataset(
            KvaRating::Two,
            &[200.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0],
            &[
                (
                    "MP RT 2k S (Internal batteries only)",
                    &[60.0, 30.0, 17.0, 12.0, 8.0, 6.0, 5.0, 4.0, 2.14],
                    RED,
                ),
                (
                    "MP RT 2k S + 1 EBP (BR08048C)",
                    &[200.0, 120.0, 80.0, 45.0, 40.0, 30.0, 25.0, 20.0, 18.0],
                    ORANGE,
                ),
                (
                    "MP RT 2k S + 2 EBP (BR08048C)",
                    &[300.0, 200.0, 140.0, 90.0, 80.0, 60.0, 45.0, 40.0, 30.0],
                    GREEN,
                ),
                (
                    "MP RT 2k S + 3 EBP (BR08048C)",
                    &[500.0, 300.0, 200.0, 140.0, 100.0, 90.0, 80.0, 60.0, 50.0],
                    PURPLE,
                ),
            ],
        ),
        dataset(
            KvaRating::Three,
            &[300.0, 600.0, 900.0, 1200.0, 1500.0, 1800.0, 2100.0, 2400.0, 2700.0],
            &[
                (
                    "MP RT 3k S (Internal batteries only)",
                    &[60.0, 30.0, 17.0, 12.0, 8.0, 6.0, 5.0, 4.0, 2.14],
                    BLUE,
                ),
                (
                    "MP RT 3k S + 1 EBP (BR12072C)",
                    &[240.0, 120.0, 80.0, 45.0, 40.0, 30.0, 25.0, 20.0, 18.0],
                    PURPLE,
                ),
                (
                    "MP RT 3k S + 2 EBP (BR12072C)",
                    &[300.0, 200.0, 140.0, 90.0, 80.0, 60.0, 45.0, 40.0, 30.0],
                    GREEN,
                ),
                (
                    "MP RT 3k S + 3 EBP (BR12072C)",
                    &[500.0, 300.0, 200.0, 140.0, 120.0, 90.0, 80.0, 60.0, 50.0],
                    ORANGE,
                ),
            ],
        ),
        dataset(
            KvaRating::Six,
            &[900.0, 1800.0, 2700.0, 3600.0, 4500.0, 5400.0],
            &[
                (
                    "MP RT Pro 6K + 1 EBP (MP BR20240)",
                    &[80.0, 37.0, 23.0, 16.0, 13.0, 10.0],
                    BLUE,
                ),
                (
                    "MP RT Pro 6K + 2 EBP (MP BR20240)",
                    &[163.0, 80.0, 50.0, 35.0, 28.0, 23.0],
                    PURPLE,
                ),
                (
                    "MP RT Pro 6K + 3 EBP (MP BR20240)",
                    &[245.0, 122.0, 80.0, 55.0, 45.0, 35.0],
                    GREEN,
                ),
                (
                    "MP RT Pro 6K + 4 EBP (MP BR20240)",
                    &[328.0, 163.0, 109.0, 80.0, 60.0, 50.0],
                    ORANGE,
                ),
                (
                    "MP RT Pro 6K + 5 EBP (MP BR20240)",
                    &[410.0, 204.0, 136.0, 102.0, 80.0, 68.0],
                    RED,
                ),
            ],
        ),
        dataset(
            KvaRating::Ten,
            &[1500.0, 3000.0, 4500.0, 6000.0, 7500.0, 9000.0],
            &[
                (
                    "MP RT Pro 10K + 1 EBP (MP BR20240)",
                    &[45.0, 21.0, 13.0, 9.0, 7.0, 5.0],
                    BLUE,
                ),
                (
                    "MP RT Pro 10K + 2 EBP (MP BR20240)",
                    &[98.0, 45.0, 28.0, 21.0, 15.0, 13.0],
                    PURPLE,
                ),
                (
                    "MP RT Pro 10K + 3 EBP (MP BR20240)",
                    &[148.0, 68.0, 45.0, 31.0, 25.0, 21.0],
                    GREEN,
                ),
                (
                    "MP RT Pro 10K + 4 EBP (MP BR20240)",
                    &[197.0, 98.0, 60.0, 45.0, 33.0, 28.0],
                    ORANGE,
                ),
                (
                    "MP RT Pro 10K + 5 EBP (MP BR20240)",
                    &[247.0, 123.0, 80.0, 56.0, 45.0, 37.0],
                    RED,
                ),
                (
                    "MP RT Pro 10K + 6 EBP (MP BR20240)",
                    &[296.0, 148.0, 98.0, 74.0, 54.0, 45.0],
                    YELLOW,
                ),
                (
                    "MP RT Pro 10K + 7 EBP (MP BR20240)",
                    &[345.0, 172.0, 115.0, 86.0, 69.0, 53.0],
                    TEAL,
                ),
                (
                    "MP RT Pro 10K + 8 EBP (MP BR20240)",
                    &[395.0, 197.0, 131.0, 98.0, 79.0, 65.0],
                    PINK,
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_satisfies_invariants() {
        for rating in KvaRating::ALL {
            let dataset = runtime_table().get(rating);
            assert_eq!(dataset.rating(), rating);
            dataset.validate().expect("builtin dataset is valid");
            for series in dataset.series() {
                assert_eq!(series.values().len(), dataset.load_points().len());
            }
        }
        assert_eq!(runtime_table().iter().count(), KvaRating::ALL.len());
    }

    #[test]
    fn ratings_parse_from_keys() {
        assert_eq!("2".parse::<KvaRating>(), Ok(KvaRating::Two));
        assert_eq!("10kVA".parse::<KvaRating>(), Ok(KvaRating::Ten));
        assert_eq!(" 6 ".parse::<KvaRating>(), Ok(KvaRating::Six));
        assert_eq!(
            "4".parse::<KvaRating>(),
            Err(DatasetError::UnknownRating("4".to_owned()))
        );
        assert_eq!(KvaRating::Three.display_label(), "3 kVA - MP RT 3k S");
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = RuntimeDataset::new(
            KvaRating::One,
            vec![100.0, 200.0],
            vec![RuntimeSeries::new("short", vec![10.0], palette::BLUE)],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn rejects_non_increasing_loads() {
        let err = RuntimeDataset::new(
            KvaRating::One,
            vec![100.0, 100.0],
            vec![RuntimeSeries::new("flat", vec![10.0, 5.0], palette::BLUE)],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::LoadNotIncreasing { index: 1, .. }));
    }

    #[test]
    fn rejects_negative_runtime() {
        let err = RuntimeDataset::new(
            KvaRating::One,
            vec![100.0],
            vec![RuntimeSeries::new("neg", vec![-1.0], palette::BLUE)],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRuntime { index: 0, .. }));
    }

    #[test]
    fn rejects_empty_datasets() {
        assert_eq!(
            RuntimeDataset::new(KvaRating::One, Vec::new(), Vec::new()).unwrap_err(),
            DatasetError::NoLoadPoints
        );
        assert_eq!(
            RuntimeDataset::new(KvaRating::One, vec![1.0], Vec::new()).unwrap_err(),
            DatasetError::NoSeries
        );
    }

    #[test]
    fn rating_mismatch_is_reported() {
        let dataset = runtime_table().get(KvaRating::Two);
        assert!(dataset.ensure_rating(KvaRating::Two).is_ok());
        assert!(matches!(
            dataset.ensure_rating(KvaRating::Six),
            Err(DatasetError::RatingMismatch { .. })
        ));
    }

    #[test]
    fn max_runtime_spans_all_series() {
        assert_eq!(runtime_table().get(KvaRating::Ten).max_runtime(), 395.0);
    }
}
