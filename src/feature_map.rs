//! Explicit feature map of the gap-weighted subsequence kernel
//!
//! φ_u(s) = Σ λ^span over every occurrence of subsequence u in s, where span
//! is the distance from the first to the last matched position plus one.
//! Without a span limit, `φ(s) · φ(t)` summed over lengths equals the
//! kernel computed by dynamic programming. The enumeration is exponential in
//! the sequence length and is meant for short sequences, inspection and
//! cross-checking.

use crate::data::Symbol;
use std::collections::HashMap;

/// Sparse map from subsequence to its weight in one sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    features: HashMap<Vec<Symbol>, f64>,
}

impl FeatureMap {
    /// Enumerate subsequences of length `min_kn..=max_kn`
    ///
    /// `max_span` drops occurrences spanning more positions; with a limit the
    /// map no longer reproduces the kernel exactly.
    pub fn from_symbols(
        symbols: &[Symbol],
        min_kn: usize,
        max_kn: usize,
        lambda: f64,
        max_span: Option<usize>,
    ) -> Self {
        let mut map = Self::default();
        let mut path = Vec::with_capacity(max_kn);
        for start in 0..symbols.len() {
            path.push(symbols[start]);
            map.extend(symbols, start, start, &mut path, min_kn, max_kn, lambda, max_span);
            path.pop();
        }
        map
    }

    /// Feature map of a byte string
    pub fn from_bytes(text: &str, min_kn: usize, max_kn: usize, lambda: f64) -> Self {
        let symbols: Vec<Symbol> = text.bytes().map(Symbol::from).collect();
        Self::from_symbols(&symbols, min_kn, max_kn, lambda, None)
    }

    #[allow(clippy::too_many_arguments)]
    fn extend(
        &mut self,
        symbols: &[Symbol],
        start: usize,
        last: usize,
        path: &mut Vec<Symbol>,
        min_kn: usize,
        max_kn: usize,
        lambda: f64,
        max_span: Option<usize>,
    ) {
        if path.len() >= min_kn {
            let span = last - start + 1;
            *self.features.entry(path.clone()).or_insert(0.0) += lambda.powi(span as i32);
        }
        if path.len() == max_kn {
            return;
        }
        let end = match max_span {
            Some(limit) => symbols.len().min(start + limit),
            None => symbols.len(),
        };
        for next in last + 1..end {
            path.push(symbols[next]);
            self.extend(symbols, start, next, path, min_kn, max_kn, lambda, max_span);
            path.pop();
        }
    }

    /// Weight of `subsequence`, zero if absent
    pub fn get(&self, subsequence: &[Symbol]) -> f64 {
        self.features.get(subsequence).copied().unwrap_or(0.0)
    }

    /// Number of distinct subsequences
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<Symbol>, &f64)> {
        self.features.iter()
    }

    /// Inner product with another map
    pub fn dot(&self, other: &FeatureMap) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .features
            .iter()
            .map(|(u, w)| w * large.get(u))
            .sum()
    }

    pub fn norm_squared(&self) -> f64 {
        self.features.values().map(|w| w * w).sum()
    }
}
