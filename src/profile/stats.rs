//! Descriptive statistics over plain slices.

use std::collections::HashMap;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Zero below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let Some(m) = mean(values) else {
        return 0.0;
    };
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Pick up to `n` values at evenly spaced percentiles of `sorted` (nearest rank).
///
/// `sorted` must be ascending. Repeated picks collapse, so fewer than `n`
/// values come back when the column has few distinct values.
pub fn percentile_samples(sorted: &[f64], n: usize) -> Vec<f64> {
    if sorted.is_empty() || n == 0 {
        return Vec::new();
    }
    // More picks than values cannot add anything new.
    let n = n.min(sorted.len());
    let last = sorted.len() - 1;
    let mut out: Vec<f64> = Vec::with_capacity(n);
    for i in 0..n {
        let p = if n == 1 { 0.5 } else { i as f64 / (n - 1) as f64 };
        let idx = (p * last as f64).round() as usize;
        let value = sorted[idx.min(last)];
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Count occurrences of each key, ordered by count descending then first appearance.
pub fn frequency_counts<'a, I>(keys: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
    for (position, key) in keys.into_iter().enumerate() {
        counts.entry(key).or_insert((0, position)).0 += 1;
    }
    let mut ordered: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(key, (count, first))| (key, count, first))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ordered
        .into_iter()
        .map(|(key, count, _)| (key.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        // Sample std of this classic set is sqrt(32 / 7).
        assert!((sample_std(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[3.0]), 0.0);
    }

    #[test]
    fn percentiles_cover_range() {
        let sorted: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        assert_eq!(percentile_samples(&sorted, 5), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(percentile_samples(&sorted, 1), vec![50.0]);
        assert!(percentile_samples(&sorted, 0).is_empty());
    }

    #[test]
    fn oversized_sample_count_is_bounded_by_data() {
        assert_eq!(percentile_samples(&[1.0, 2.0, 3.0], usize::MAX), vec![1.0, 2.0, 3.0]);
        assert_eq!(percentile_samples(&[4.0], 1_000_000_000), vec![4.0]);
    }

    #[test]
    fn percentiles_collapse_duplicates() {
        let sorted = [1.0, 1.0, 1.0, 2.0];
        assert_eq!(percentile_samples(&sorted, 3), vec![1.0, 2.0]);
    }

    #[test]
    fn frequency_ties_keep_first_seen_order() {
        let counts = frequency_counts(["b", "a", "a", "c", "b", "d"]);
        assert_eq!(
            counts,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }
}
