//! Display rounding and the -log10(p) grid.

use std::cmp::Ordering;

/// Round `x` to `digits` significant digits, breaking exact ties away
/// from zero.
///
/// Formatting in scientific notation rounds on the exact binary value,
/// so this works across the full range of p-values, subnormals included.
///
/// ```
/// use manhattan_bins::rounding::round_sig;
///
/// assert_eq!(round_sig(0.00123, 2), 0.0012);
/// assert_eq!(round_sig(1.59e-10, 2), 1.6e-10);
/// assert_eq!(round_sig(0.125, 2), 0.13);
/// assert_eq!(round_sig(0.0, 3), 0.0);
/// ```
pub fn round_sig(x: f64, digits: usize) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let precision = digits.max(1) - 1;
    let mut magnitude = x.abs();
    // `{:e}` breaks ties to even; one ulp past an exact tie rounds it up instead.
    if is_exact_tie(magnitude, precision) {
        magnitude = f64::from_bits(magnitude.to_bits() + 1);
    }
    let rounded: f64 = format!("{:.*e}", precision, magnitude)
        .parse()
        .unwrap_or(magnitude);
    rounded.copysign(x)
}

/// Enough digits to print any finite `f64` exactly.
const EXACT_DIGITS: usize = 800;

/// True if `magnitude` lies exactly halfway between two values with
/// `precision + 1` significant digits.
fn is_exact_tie(magnitude: f64, precision: usize) -> bool {
    let exact = format!("{:.*e}", EXACT_DIGITS, magnitude);
    let mantissa = exact.split('e').next().unwrap_or("");
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    match digits.get(precision + 1..) {
        Some([b'5', rest @ ..]) => rest.iter().all(|&d| d == b'0'),
        _ => false,
    }
}

/// Round `x` to `digits` decimal places.
#[inline]
pub fn round_decimals(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

/// Exact floor division of two floats.
///
/// Goes through `%` (exact) rather than `floor(x / y)`, which can round a
/// quotient just below an integer up onto it.
#[inline]
pub fn floor_div(x: f64, y: f64) -> f64 {
    let rem = x % y;
    let mut div = (x - rem) / y;
    if rem != 0.0 && (y < 0.0) != (rem < 0.0) {
        div -= 1.0;
    }
    div.round()
}

/// Snap -log10(`pval`) down onto a grid of step `bin_size`, then round to
/// `digits` decimals to strip floating-point noise.
///
/// A p-value of exactly 1 maps to `0.0`, never `-0.0`.
#[inline]
pub fn rounded_neglog10(pval: f64, bin_size: f64, digits: i32) -> f64 {
    let neglog10 = -pval.log10();
    let snapped = floor_div(neglog10, bin_size) * bin_size;
    round_decimals(snapped, digits) + 0.0
}

/// An `f64` with a total order, for heaps and ordered sets.
#[derive(Debug, Clone, Copy)]
pub struct OrderedF64(pub f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
