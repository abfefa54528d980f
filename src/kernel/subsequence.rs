//! Gap-weighted subsequence kernel for a single subsequence length
//!
//! K_k(s, t) sums, over every length-k subsequence common to s and t, the
//! weight λ^(span in s + span in t) of each pair of occurrences
//! (Lodhi et al., "Text Classification using String Kernels", JMLR 2002).
//!
//! The computation uses the auxiliary kernels K'_l over prefixes:
//!
//! ```text
//! K'_0(s, t)      = 1
//! K'_l(s, t)      = 0                                   if min(|s|, |t|) < l
//! K''_l(sx, tu)   = λ K''_l(sx, t) + [x = u] λ² K'_{l-1}(s, t)
//! K'_l(sx, t)     = λ K'_l(s, t) + K''_l(sx, t)
//! K_k(s, t)       = Σ_{a, b : s_a = t_b} λ² K'_{k-1}(s[..a], t[..b])
//! ```
//!
//! Each level costs O(|s|·|t|) and only two levels are alive at once.

use crate::core::{KernelError, KernelFloat, KernelMatrix, Result};
use crate::data::{Dataset, Symbol};
use crate::kernel::MatchMode;
use log::debug;
use rayon::prelude::*;
use std::sync::Arc;

/// Scratch tables for the dynamic program, reused across pairs
#[derive(Debug, Default)]
pub struct DpWorkspace<T> {
    prev: Vec<T>,
    curr: Vec<T>,
}

impl<T: KernelFloat> DpWorkspace<T> {
    pub fn new() -> Self {
        Self {
            prev: Vec::new(),
            curr: Vec::new(),
        }
    }

    /// Size both tables to `len` and set K'_0 = 1
    fn reset(&mut self, len: usize) {
        self.prev.clear();
        self.prev.resize(len, T::one());
        self.curr.clear();
        self.curr.resize(len, T::zero());
    }
}

/// Sum of K_k(s, t) for every k in `min_k..=max_k`, in one pass
///
/// The table for level l is built from level l-1, so all lengths up to
/// `max_k` come out of the same recursion.
pub fn gap_weighted_kernel<T: KernelFloat>(
    s: &[Symbol],
    t: &[Symbol],
    min_k: usize,
    max_k: usize,
    lambda: T,
    matching: &MatchMode,
    workspace: &mut DpWorkspace<T>,
) -> T {
    debug_assert!(min_k >= 1 && min_k <= max_k);
    let (n, m) = (s.len(), t.len());
    let mut total = T::zero();
    if n == 0 || m == 0 {
        return total;
    }

    let width = m + 1;
    let lambda_sq = lambda * lambda;
    workspace.reset((n + 1) * width);

    for l in 1..=max_k {
        // No common subsequence of length l or longer
        if n < l || m < l {
            break;
        }
        // prev holds K'_{l-1}
        if l >= min_k {
            total += level_sum(&workspace.prev, s, t, l, width, lambda_sq, matching);
        }
        if l == max_k {
            break;
        }

        let DpWorkspace { prev, curr } = workspace;
        curr.fill(T::zero());
        for a in l..n {
            let x = s[a - 1];
            let mut kpp = T::zero();
            for b in l..m {
                kpp = lambda * kpp;
                if x == t[b - 1] {
                    kpp += lambda_sq * prev[(a - 1) * width + b - 1];
                }
                curr[a * width + b] = lambda * curr[(a - 1) * width + b] + kpp;
            }
        }
        std::mem::swap(prev, curr);
    }

    total
}

/// K_l from the K'_{l-1} table
fn level_sum<T: KernelFloat>(
    table: &[T],
    s: &[Symbol],
    t: &[Symbol],
    l: usize,
    width: usize,
    lambda_sq: T,
    matching: &MatchMode,
) -> T {
    let mut sum = T::zero();
    match matching {
        MatchMode::Hard => {
            for a in l - 1..s.len() {
                for b in l - 1..t.len() {
                    if s[a] == t[b] {
                        sum += lambda_sq * table[a * width + b];
                    }
                }
            }
        }
        MatchMode::Soft(matrix) => {
            for a in l - 1..s.len() {
                for b in l - 1..t.len() {
                    let w = matrix.weight(s[a], t[b]);
                    if w != 0.0 {
                        sum += lambda_sq * T::from_f64(w) * table[a * width + b];
                    }
                }
            }
        }
    }
    sum
}

/// K_k(s, t) for one length
pub fn subsequence_kernel<T: KernelFloat>(
    s: &[Symbol],
    t: &[Symbol],
    k: usize,
    lambda: T,
    matching: &MatchMode,
    workspace: &mut DpWorkspace<T>,
) -> T {
    gap_weighted_kernel(s, t, k, k, lambda, matching, workspace)
}

pub(crate) fn check_lambda(lambda: f64) -> Result<()> {
    if !lambda.is_finite() || lambda <= 0.0 || lambda > 1.0 {
        return Err(KernelError::InvalidParameter(format!(
            "lambda must be in (0, 1], got {lambda}"
        )));
    }
    Ok(())
}

/// Kernel matrix over a dataset for one subsequence length
///
/// The engine shares its dataset through an `Arc` and owns the resulting
/// matrix and norms until it is dropped or recomputed.
#[derive(Debug)]
pub struct StringKernel<T: KernelFloat> {
    k: usize,
    lambda: f64,
    matching: MatchMode,
    normalize: bool,
    data: Option<Arc<Dataset>>,
    kernel: Option<KernelMatrix<T>>,
    norms: Option<Vec<T>>,
}

impl<T: KernelFloat> StringKernel<T> {
    /// Engine for subsequences of length `k` with decay `lambda`
    pub fn new(k: usize, lambda: f64, matching: MatchMode) -> Result<Self> {
        if k == 0 {
            return Err(KernelError::InvalidParameter(
                "subsequence length must be at least 1".to_string(),
            ));
        }
        check_lambda(lambda)?;
        Ok(Self {
            k,
            lambda,
            matching,
            normalize: false,
            data: None,
            kernel: None,
            norms: None,
        })
    }

    /// Cosine-normalize this engine's own matrix after computing it
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Bind to an encoded dataset, discarding earlier results
    ///
    /// A substitution matrix must cover the dataset's whole alphabet.
    pub fn set_data(&mut self, data: Arc<Dataset>) -> Result<()> {
        self.matching.validate(data.symbol_size())?;
        self.data = Some(data);
        self.kernel = None;
        self.norms = None;
        Ok(())
    }

    /// Compute the full kernel matrix
    ///
    /// Only pairs with i <= j are evaluated; the lower triangle is mirrored.
    pub fn compute_kernel(&mut self) -> Result<()> {
        let data = self.data.as_ref().ok_or(KernelError::DataNotSet)?;
        self.kernel = None;
        self.norms = None;

        let n = data.len();
        debug!("Computing k={} kernel over {} sequences", self.k, n);
        let mut kernel = KernelMatrix::square(n)?;

        let k = self.k;
        let lambda = T::from_f64(self.lambda);
        let matching = &self.matching;
        if n > 0 {
            // Each worker fills the upper part of its own rows in place
            kernel
                .as_mut_slice()
                .par_chunks_mut(n)
                .enumerate()
                .for_each_init(DpWorkspace::new, |workspace, (i, row)| {
                    let s = data.get(i).symbols();
                    for (j, cell) in row.iter_mut().enumerate().skip(i) {
                        *cell =
                            subsequence_kernel(s, data.get(j).symbols(), k, lambda, matching, workspace);
                    }
                });
            kernel.mirror_upper();
        }

        if self.normalize {
            let norms = kernel.diagonal();
            kernel.normalize_symmetric(&norms)?;
            self.norms = Some(norms);
        }
        self.kernel = Some(kernel);
        Ok(())
    }

    /// Extract every sequence's self-kernel K_k(s_i, s_i)
    pub fn compute_norms(&mut self) -> Result<()> {
        let kernel = self.kernel.as_ref().ok_or(KernelError::NotComputed)?;
        if self.norms.is_none() {
            self.norms = Some(kernel.diagonal());
        }
        Ok(())
    }

    /// Self-kernels, available after [`compute_norms`](Self::compute_norms)
    pub fn norms(&self) -> Option<&[T]> {
        self.norms.as_deref()
    }

    /// The computed matrix
    pub fn values(&self) -> Result<&KernelMatrix<T>> {
        self.kernel.as_ref().ok_or(KernelError::NotComputed)
    }

    /// Kernel value of two arbitrary symbol sequences under this engine's parameters
    pub fn pair(&self, s: &[Symbol], t: &[Symbol]) -> T {
        let mut workspace = DpWorkspace::new();
        subsequence_kernel(s, t, self.k, T::from_f64(self.lambda), &self.matching, &mut workspace)
    }

    /// Subsequence length
    pub fn length(&self) -> usize {
        self.k
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.data.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::SubstitutionMatrix;
    use approx::assert_relative_eq;

    fn kernel_of(s: &str, t: &str, k: usize, lambda: f64) -> f64 {
        let mut workspace = DpWorkspace::new();
        let s: Vec<Symbol> = s.bytes().map(Symbol::from).collect();
        let t: Vec<Symbol> = t.bytes().map(Symbol::from).collect();
        subsequence_kernel(&s, &t, k, lambda, &MatchMode::Hard, &mut workspace)
    }

    fn engine(strings: &[&str], k: usize, lambda: f64) -> StringKernel<f64> {
        let mut dataset = Dataset::new(100, 255);
        dataset.load_strings(strings).unwrap();
        let mut engine = StringKernel::new(k, lambda, MatchMode::Hard).unwrap();
        engine.set_data(Arc::new(dataset)).unwrap();
        engine
    }

    #[test]
    fn test_single_symbol_matches() {
        // Shared symbols c and a, each occurrence pair weighted λ^(1+1)
        assert_relative_eq!(kernel_of("cat", "car", 1, 0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(kernel_of("abc", "abc", 1, 0.5), 0.75, epsilon = 1e-12);
        assert_eq!(kernel_of("abc", "xyz", 1, 0.5), 0.0);
    }

    #[test]
    fn test_two_symbol_closed_form() {
        let l: f64 = 0.5;
        // Only "ca" is common, contiguous in both
        assert_relative_eq!(kernel_of("cat", "car", 2, l), l.powi(4), epsilon = 1e-12);
        // "ca", "at" contiguous and "ct" spanning three in both
        assert_relative_eq!(
            kernel_of("cat", "cat", 2, l),
            2.0 * l.powi(4) + l.powi(6),
            epsilon = 1e-12
        );
        // Lodhi et al.: K_2(car, cat) = λ⁴ and K_2(cat, cat) = 2λ⁴ + λ⁶
        assert_relative_eq!(kernel_of("car", "cat", 2, l), l.powi(4), epsilon = 1e-12);
    }

    #[test]
    fn test_gap_weighting() {
        let l: f64 = 0.3;
        // "ab" in "ab" (span 2) and in "axb" (span 3)
        assert_relative_eq!(kernel_of("ab", "axb", 2, l), l.powi(5), epsilon = 1e-12);
        // Three occurrences of "aa" in "aaa": spans 2, 2, 3
        let phi = 2.0 * l.powi(2) + l.powi(3);
        assert_relative_eq!(kernel_of("aaa", "aaa", 2, l), phi * phi, epsilon = 1e-12);
        // One occurrence of "aaa"
        assert_relative_eq!(kernel_of("aaa", "aaa", 3, l), l.powi(6), epsilon = 1e-12);
    }

    #[test]
    fn test_shorter_than_k_is_zero() {
        assert_eq!(kernel_of("ab", "abc", 3, 0.5), 0.0);
        assert_eq!(kernel_of("", "", 1, 0.5), 0.0);
    }

    #[test]
    fn test_multi_length_pass_equals_sum() {
        let s: Vec<Symbol> = "gattaca".bytes().map(Symbol::from).collect();
        let t: Vec<Symbol> = "attack".bytes().map(Symbol::from).collect();
        let mut workspace = DpWorkspace::new();
        let summed: f64 = (2..=4)
            .map(|k| subsequence_kernel(&s, &t, k, 0.7, &MatchMode::Hard, &mut workspace))
            .sum();
        let one_pass = gap_weighted_kernel(&s, &t, 2, 4, 0.7, &MatchMode::Hard, &mut workspace);
        assert_relative_eq!(summed, one_pass, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_substitution_equals_hard() {
        let s: Vec<Symbol> = vec![0, 1, 2, 1];
        let t: Vec<Symbol> = vec![1, 2, 0, 1];
        let soft = MatchMode::soft(SubstitutionMatrix::identity(3));
        let mut workspace = DpWorkspace::new();
        for k in 1..=3 {
            let hard = subsequence_kernel(&s, &t, k, 0.5, &MatchMode::Hard, &mut workspace);
            let via_matrix = subsequence_kernel(&s, &t, k, 0.5f64, &soft, &mut workspace);
            assert_relative_eq!(hard, via_matrix, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_soft_matching_scores_similar_symbols() {
        let matrix = SubstitutionMatrix::from_fn(2, |a, b| if a == b { 1.0 } else { 0.5 }).unwrap();
        let soft = MatchMode::soft(matrix);
        let mut workspace = DpWorkspace::new();
        let value = subsequence_kernel(&[0], &[1], 1, 0.5f64, &soft, &mut workspace);
        assert_relative_eq!(value, 0.5 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_engine_matrix() {
        let mut engine = engine(&["cat", "car", "cat"], 2, 0.5);
        engine.compute_kernel().unwrap();
        let kernel = engine.values().unwrap();

        assert_eq!(kernel.rows(), 3);
        assert!(kernel.is_symmetric(0.0));
        assert_relative_eq!(kernel.get(0, 1), 0.0625, epsilon = 1e-12);
        assert_eq!(kernel.get(0, 2), kernel.get(0, 0));
        let diagonal = kernel.diagonal();
        assert!(engine.norms().is_none());

        engine.compute_norms().unwrap();
        assert_eq!(engine.norms().unwrap(), diagonal.as_slice());
    }

    #[test]
    fn test_engine_requires_data() {
        let mut engine = StringKernel::<f64>::new(2, 0.5, MatchMode::Hard).unwrap();
        assert!(matches!(engine.compute_kernel(), Err(KernelError::DataNotSet)));
        assert!(matches!(engine.compute_norms(), Err(KernelError::NotComputed)));
        assert!(matches!(engine.values(), Err(KernelError::NotComputed)));
    }

    #[test]
    fn test_engine_invalid_parameters() {
        assert!(StringKernel::<f32>::new(0, 0.5, MatchMode::Hard).is_err());
        assert!(StringKernel::<f32>::new(1, 0.0, MatchMode::Hard).is_err());
        assert!(StringKernel::<f32>::new(1, 1.01, MatchMode::Hard).is_err());
    }

    #[test]
    fn test_engine_self_normalization() {
        let mut engine = engine(&["cat", "car", "dog"], 1, 0.5).with_normalize(true);
        engine.compute_kernel().unwrap();
        let kernel = engine.values().unwrap();
        for i in 0..3 {
            assert_eq!(kernel.get(i, i), 1.0);
        }
        // 2 shared symbols out of 3 in each
        assert_relative_eq!(kernel.get(0, 1), 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(kernel.get(0, 2), 0.0);
        assert_relative_eq!(engine.norms().unwrap()[0], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_recompute_is_identical() {
        let mut engine = engine(&["gattaca", "tacata", "acgt"], 3, 0.8);
        engine.compute_kernel().unwrap();
        let first = engine.values().unwrap().clone();
        engine.compute_kernel().unwrap();
        assert_eq!(&first, engine.values().unwrap());
    }

    #[test]
    fn test_substitution_matrix_must_cover_alphabet() {
        let mut dataset = Dataset::new(10, 255);
        dataset.load_strings(&["ab", "ba"]).unwrap();
        let soft = MatchMode::soft(SubstitutionMatrix::identity(4));
        let mut engine = StringKernel::<f64>::new(1, 0.5, soft).unwrap();

        let result = engine.set_data(Arc::new(dataset));
        assert!(matches!(
            result,
            Err(KernelError::DimensionMismatch {
                expected: 255,
                actual: 4
            })
        ));
        assert!(engine.dataset().is_none());
        assert!(matches!(engine.compute_kernel(), Err(KernelError::DataNotSet)));
    }

    #[test]
    fn test_soft_engine_on_matching_alphabet() {
        let mut dataset = Dataset::new(10, 4);
        dataset.load_tokens(&[vec![0, 1], vec![1, 0], vec![3]]).unwrap();
        let soft = MatchMode::soft(SubstitutionMatrix::identity(4));
        let mut engine = StringKernel::<f64>::new(1, 0.5, soft).unwrap();
        engine.set_data(Arc::new(dataset)).unwrap();
        engine.compute_kernel().unwrap();

        let kernel = engine.values().unwrap();
        assert_relative_eq!(kernel.get(0, 1), 0.5, epsilon = 1e-12);
        assert_eq!(kernel.get(0, 2), 0.0);
        assert!(kernel.is_symmetric(0.0));
    }

    #[test]
    fn test_pair_matches_matrix() {
        let mut engine = engine(&["banana", "ananas"], 2, 0.6);
        engine.compute_kernel().unwrap();
        let data = Arc::clone(engine.dataset().unwrap());
        let direct = engine.pair(data.get(0).symbols(), data.get(1).symbols());
        assert_eq!(direct, engine.values().unwrap().get(0, 1));
    }
}
