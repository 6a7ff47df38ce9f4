//! Break-based classification of indicator values into labelled, colored buckets.

use anyhow::{bail, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::WdimapError;
use crate::palette::Palette;

/// Manually chosen break values, one label per interval and a palette to color the intervals.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Classification {
    pub breaks: Vec<f64>,
    pub labels: Vec<String>,
    pub palette: Palette,
}

impl Classification {
    /// Validate the breaks and labels and build a `Classifier` from them.
    pub fn classifier(&self) -> Result<Classifier> {
        Classifier::new(&self.breaks, &self.labels, self.palette)
    }
}

/// A validated classification.
///
/// Bucket `i` covers `(breaks[i], breaks[i + 1]]`, except that the first and last buckets are
/// unbounded: every value below the lowest break falls in the first bucket and every value above
/// the highest in the last. Every non-NaN value therefore lands in exactly one bucket.
#[derive(Debug, Clone)]
pub struct Classifier {
    breaks: Vec<f64>,
    labels: Vec<String>,
    colors: Vec<RGBColor>,
}

impl Classifier {
    pub fn new(breaks: &[f64], labels: &[String], palette: Palette) -> Result<Self> {
        if breaks.len() < 2 {
            bail!(WdimapError::InvalidBreaks(format!(
                "at least two breaks are needed, found {}",
                breaks.len()
            )));
        }
        if breaks.iter().any(|b| b.is_nan()) {
            bail!(WdimapError::InvalidBreaks("breaks contain NaN".into()));
        }
        if let Some((a, b)) = breaks
            .iter()
            .zip(breaks.iter().skip(1))
            .find(|(a, b)| a >= b)
        {
            bail!(WdimapError::InvalidBreaks(format!(
                "breaks must increase strictly, found {a} before {b}"
            )));
        }
        if labels.len() != breaks.len() - 1 {
            bail!(WdimapError::LabelCountMismatch {
                expected: breaks.len() - 1,
                found: labels.len(),
            });
        }
        Ok(Self {
            breaks: breaks.to_vec(),
            labels: labels.to_vec(),
            colors: palette.colors(labels.len()),
        })
    }

    pub fn n_buckets(&self) -> usize {
        self.labels.len()
    }

    /// Index of the bucket containing `value`, `None` for NaN.
    pub fn classify(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let interior = &self.breaks[1..self.breaks.len() - 1];
        Some(interior.iter().filter(|&&edge| value > edge).count())
    }

    pub fn label(&self, bucket: usize) -> &str {
        &self.labels[bucket]
    }

    pub fn color(&self, bucket: usize) -> RGBColor {
        self.colors[bucket]
    }

    /// Labels paired with their colors, in bucket order
    pub fn legend(&self) -> impl Iterator<Item = (&str, RGBColor)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.colors.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn three_buckets() -> Classifier {
        Classifier::new(
            &[f64::NEG_INFINITY, 1000.0, 2000.0, f64::INFINITY],
            &labels(&["Under 1000", "1000 to 2000", "Over 2000"]),
            Palette::YlOrRd,
        )
        .unwrap()
    }

    #[test]
    fn value_in_middle_bucket() {
        let classifier = three_buckets();
        let bucket = classifier.classify(1500.0).unwrap();
        assert_eq!(classifier.label(bucket), "1000 to 2000");
    }

    #[test]
    fn large_value_in_unbounded_top_bucket() {
        let classifier = three_buckets();
        assert_eq!(classifier.classify(999_999.0), Some(2));
        assert_eq!(classifier.classify(f64::INFINITY), Some(2));
    }

    #[test]
    fn intervals_are_closed_on_the_right() {
        let classifier = three_buckets();
        assert_eq!(classifier.classify(1000.0), Some(0));
        assert_eq!(classifier.classify(1000.000_1), Some(1));
        assert_eq!(classifier.classify(2000.0), Some(1));
    }

    #[test]
    fn tails_are_unbounded_even_with_finite_outer_breaks() {
        let classifier = Classifier::new(
            &[0.0, 10.0, 20.0],
            &labels(&["low", "high"]),
            Palette::Blues,
        )
        .unwrap();
        assert_eq!(classifier.classify(-50.0), Some(0));
        assert_eq!(classifier.classify(f64::NEG_INFINITY), Some(0));
        assert_eq!(classifier.classify(1e12), Some(1));
    }

    #[test]
    fn classification_is_total_and_exclusive() {
        let classifier = three_buckets();
        let values = [
            f64::NEG_INFINITY,
            -1e300,
            -1.0,
            0.0,
            999.9,
            1000.0,
            1500.0,
            2000.0,
            2000.1,
            1e300,
            f64::INFINITY,
        ];
        for value in values {
            let bucket = classifier.classify(value);
            assert!(
                bucket.is_some_and(|b| b < classifier.n_buckets()),
                "{value} should land in exactly one bucket"
            );
        }
        assert_eq!(classifier.classify(f64::NAN), None);
    }

    #[test]
    fn non_increasing_breaks_should_fail() {
        let result = Classifier::new(
            &[0.0, 2000.0, 1000.0],
            &labels(&["a", "b"]),
            Palette::Blues,
        );
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WdimapError>(),
            Some(WdimapError::InvalidBreaks(_))
        ));

        let duplicated = Classifier::new(&[0.0, 1.0, 1.0], &labels(&["a", "b"]), Palette::Blues);
        assert!(duplicated.is_err(), "equal breaks are not strictly increasing");
    }

    #[test]
    fn label_count_mismatch_should_fail() {
        let result = Classifier::new(
            &[f64::NEG_INFINITY, 1000.0, 2000.0, f64::INFINITY],
            &labels(&["a", "b"]),
            Palette::Blues,
        );
        assert!(matches!(
            result.unwrap_err().downcast_ref::<WdimapError>(),
            Some(WdimapError::LabelCountMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn too_few_breaks_or_nan_should_fail() {
        assert!(Classifier::new(&[1.0], &[], Palette::Blues).is_err());
        assert!(Classifier::new(&[0.0, f64::NAN], &labels(&["a"]), Palette::Blues).is_err());
    }

    #[test]
    fn legend_pairs_labels_with_colors() {
        let classifier = three_buckets();
        let legend: Vec<_> = classifier.legend().collect();
        assert_eq!(legend.len(), 3);
        assert_eq!(legend[1].0, "1000 to 2000");
        assert_eq!(legend[1].1, classifier.color(1));
    }
}
