use std::cmp::Ordering;

use serde::Serialize;

/// A labelled value in a metric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

/// A named, ordered series of labelled values, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn from_pairs<L, I>(name: impl Into<String>, pairs: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, f64)>,
    {
        Self::new(
            name,
            pairs
                .into_iter()
                .map(|(label, value)| Point {
                    label: label.into(),
                    value,
                })
                .collect(),
        )
    }

    pub fn from_counts<I>(name: impl Into<String>, counts: I) -> Self
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        Self::from_pairs(
            name,
            counts
                .into_iter()
                .map(|(label, count)| (label, count as f64)),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value)
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Keeps the first `n` points; `0` keeps everything.
    pub fn head(mut self, n: usize) -> Self {
        if n > 0 {
            self.points.truncate(n);
        }
        self
    }

    /// Orders points by value descending, breaking ties by label.
    pub fn sorted_descending(mut self) -> Self {
        self.points.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        self
    }

    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}
