//! Flat positions on one or two tenor axes.

/// Returns the row-major position of `(primary, secondary)` on the axis grid.
///
/// The grid is scanned primary-outer, secondary-inner and the first exact
/// match on both labels wins, so duplicated axis entries resolve to their
/// first occurrence. `None` means the pair is not on the grid.
///
/// # Examples
///
/// ```rust
/// use simm_vega::factors::find_factor_idx;
///
/// let maturities = ["1Y", "5Y"];
/// let residual = ["1Y", "2Y", "10Y"];
///
/// assert_eq!(find_factor_idx("5Y", "2Y", &maturities, &residual), Some(4));
/// assert_eq!(find_factor_idx("3Y", "2Y", &maturities, &residual), None);
/// ```
pub fn find_factor_idx<P, S>(
    primary: &str,
    secondary: &str,
    primary_axis: &[P],
    secondary_axis: &[S],
) -> Option<usize>
where
    P: AsRef<str>,
    S: AsRef<str>,
{
    let i = find_factor_idx_1d(primary, primary_axis)?;
    let j = find_factor_idx_1d(secondary, secondary_axis)?;
    Some(i * secondary_axis.len() + j)
}

/// Returns the position of the first entry of `axis` equal to `label`.
#[inline]
pub fn find_factor_idx_1d<A: AsRef<str>>(label: &str, axis: &[A]) -> Option<usize> {
    axis.iter().position(|entry| entry.as_ref() == label)
}
