/// Force on a particle of mass `m_p` at `(px, py)` from a mass `m_q` at `(qx, qy)`.
///
/// Generalised inverse-square law, `g * m_p * m_q * r / |r|^3` with `r` pointing from the
/// query towards the source, so masses of equal sign attract. `min_separation` floors `|r|`.
/// Coincident positions have no direction and contribute nothing.
///
/// # Examples
///
/// ```
/// use rs_barnes_hut::utils::inverse_square_force;
///
/// let (fx, fy) = inverse_square_force(0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0);
/// assert_eq!((fx, fy), (1.0, 0.0));
/// ```
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn inverse_square_force(
    px: f64,
    py: f64,
    m_p: f64,
    qx: f64,
    qy: f64,
    m_q: f64,
    g: f64,
    min_separation: f64,
) -> (f64, f64) {
    let dx = qx - px;
    let dy = qy - py;
    let d2 = dx * dx + dy * dy;
    if d2 == 0.0 {
        log::trace!("skipping coincident pair at ({}, {})", px, py);
        return (0.0, 0.0);
    }
    let d = d2.sqrt().max(min_separation);
    let d3 = d * d * d;
    let gm = g * m_p * m_q;
    (dx * gm / d3, dy * gm / d3)
}

/// Root mean square of the element-wise differences between two equally long slices.
///
/// Returns 0 for empty input.
pub fn rms_difference(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum / n as f64).sqrt()
}
