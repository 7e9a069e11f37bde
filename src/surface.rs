//! Intensity and next-event density evaluated over grids, for inspecting a
//! generated sequence

use ndarray::Array2;

use crate::core::error::{Result, StppError};
use crate::core::types::{Event, Location};
use crate::intensity::Intensity;
use crate::region::Interval;

/// λ at time `t` on an `ngrid × ngrid` lattice over `space`, indexed `[ix, iy]`.
///
/// `sequence` must be ascending in time; only events strictly before `t`
/// act as history.
pub fn lambda_surface<I: Intensity>(
    lam: &I,
    sequence: &[Event],
    t: f64,
    space: [Interval; 2],
    ngrid: usize,
) -> Result<Array2<f64>> {
    check_grid(ngrid)?;
    let (his_t, his_s) = history_before(sequence, t);
    evaluate_grid(lam, t, &his_t, &his_s, space, ngrid)
}

/// Conditional density `f(t, s) = λ(t, s) · exp(-∫λ)` of the next event on
/// an `ngrid × ngrid` lattice over `space`, indexed `[ix, iy]`.
///
/// The compensator integral runs over `[last, t] × space`, where `last` is
/// the latest event before `t` (or 0 with no history). It is a Riemann sum
/// over the `ngrid - 1` grid times after `last` and all `ngrid²` grid
/// locations, each weighted by `(t - last) · |space| / (ngrid - 1)³`.
pub fn density_surface<I: Intensity>(
    lam: &I,
    sequence: &[Event],
    t: f64,
    space: [Interval; 2],
    ngrid: usize,
) -> Result<Array2<f64>> {
    check_grid(ngrid)?;
    let (his_t, his_s) = history_before(sequence, t);
    let lambda = evaluate_grid(lam, t, &his_t, &his_s, space, ngrid)?;

    let last = his_t.last().copied().unwrap_or(0.0);
    let [sx, sy] = space;
    let unit_vol = (t - last) * sx.width() * sy.width() / ((ngrid - 1) as f64).powi(3);

    let mut total = 0.0;
    for &u in (Interval { min: last.min(t), max: t }).linspace(ngrid).iter().skip(1) {
        total += evaluate_grid(lam, u, &his_t, &his_s, space, ngrid)?.sum();
    }
    let integral = total * unit_vol;
    Ok(lambda * (-integral).exp())
}

/// Spatially averaged λ at `ngrid` evenly spaced times over `time`
pub fn average_lambda<I: Intensity>(
    lam: &I,
    sequence: &[Event],
    time: Interval,
    space: [Interval; 2],
    ngrid: usize,
) -> Result<Vec<(f64, f64)>> {
    check_grid(ngrid)?;
    time.linspace(ngrid)
        .into_iter()
        .map(|t| {
            let surface = lambda_surface(lam, sequence, t, space, ngrid)?;
            Ok((t, surface.sum() / surface.len() as f64))
        })
        .collect()
}

/// Events strictly before `t`, split into parallel time and location arrays
fn history_before(sequence: &[Event], t: f64) -> (Vec<f64>, Vec<Location>) {
    let cut = sequence.partition_point(|e| e.t < t);
    let his_t = sequence[..cut].iter().map(|e| e.t).collect();
    let his_s = sequence[..cut].iter().map(|e| e.s).collect();
    (his_t, his_s)
}

fn evaluate_grid<I: Intensity>(
    lam: &I,
    t: f64,
    his_t: &[f64],
    his_s: &[Location],
    space: [Interval; 2],
    ngrid: usize,
) -> Result<Array2<f64>> {
    let [sx, sy] = space;
    let xs = sx.linspace(ngrid);
    let ys = sy.linspace(ngrid);

    let mut surface = Array2::zeros((ngrid, ngrid));
    for (ix, &x) in xs.iter().enumerate() {
        for (iy, &y) in ys.iter().enumerate() {
            surface[[ix, iy]] = lam.value(t, his_t, Location::new(x, y), his_s)?;
        }
    }
    Ok(surface)
}

fn check_grid(ngrid: usize) -> Result<()> {
    if ngrid < 2 {
        return Err(StppError::InvalidConfig(format!(
            "grid needs at least 2 points per axis, got {}",
            ngrid
        )));
    }
    Ok(())
}
