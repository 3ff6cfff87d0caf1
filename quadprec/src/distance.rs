//! Distance functions between two values.
//!
//! A distance is expected to be non-negative and symmetric; the framework
//! relies on it for pass/fail decisions but does not enforce either
//! property.

use std::sync::Arc;

/// A shareable distance function between two values of type `T`.
pub type DistanceFn<T> = Arc<dyn Fn(&T, &T) -> f64 + Send + Sync>;

/// Absolute distance between two real values, `|b - a|`.
pub fn abs_distance(a: &f64, b: &f64) -> f64 {
    (b - a).abs()
}

/// The default distance for real values.
pub fn abs() -> DistanceFn<f64> {
    Arc::new(abs_distance)
}

/// Hamming distance between two strings, counted over characters.
///
/// Characters past the end of the shorter string count as mismatches.
#[allow(clippy::ptr_arg)]
pub fn hamming_distance(a: &String, b: &String) -> f64 {
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    let mut distance = 0usize;

    loop {
        match (a_chars.next(), b_chars.next()) {
            (None, None) => break,
            (Some(x), Some(y)) if x == y => {}
            _ => distance += 1,
        }
    }

    distance as f64
}

/// Hamming distance as a [`DistanceFn`].
pub fn hamming() -> DistanceFn<String> {
    Arc::new(hamming_distance)
}

/// Euclidean distance between two real vectors of the same length.
///
/// Vectors of different length are infinitely far apart.
#[allow(clippy::ptr_arg)]
pub fn euclidean_distance(a: &Vec<f64>, b: &Vec<f64>) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Euclidean distance as a [`DistanceFn`].
pub fn euclidean() -> DistanceFn<Vec<f64>> {
    Arc::new(euclidean_distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_distance_is_symmetric() {
        assert_eq!(abs_distance(&1.5, &-0.5), 2.0);
        assert_eq!(abs_distance(&-0.5, &1.5), 2.0);
        assert_eq!(abs_distance(&3.0, &3.0), 0.0);
    }

    #[test]
    fn hamming_counts_mismatches_and_length_difference() {
        let d = hamming();
        assert_eq!(d(&"karolin".to_string(), &"kathrin".to_string()), 3.0);
        assert_eq!(d(&"abc".to_string(), &"abcde".to_string()), 2.0);
        assert_eq!(d(&String::new(), &String::new()), 0.0);
    }

    #[test]
    fn euclidean_distance_of_vectors() {
        assert_eq!(euclidean_distance(&vec![0.0, 0.0], &vec![3.0, 4.0]), 5.0);
        assert!(euclidean_distance(&vec![0.0], &vec![1.0, 2.0]).is_infinite());
    }
}
