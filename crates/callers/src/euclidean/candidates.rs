use mfcall_core::Point;
use ndarray::Array1;
use rand::Rng;

const LINE_POINTS: usize = 100;
const SQUARE_PER_DIM: usize = 25;
const CUBE_PER_DIM: usize = 10;
const CUBE_RANDOM: usize = 1000;
const HIGH_DIM_RANDOM: usize = 4000;

/// Generates candidate fidelities in the unit hypercube `[0, 1]^dim`.
///
/// | dim | candidates |
/// |-----|------------|
/// | 1   | 100 evenly spaced points including both ends |
/// | 2   | 25 x 25 cell-centred grid |
/// | 3   | 10 x 10 x 10 cell-centred grid, then 1000 uniform draws |
/// | 4+  | 4000 uniform draws |
///
/// Grid points are in row-major order, with the first coordinate varying
/// slowest.
pub(super) fn unit_cube_candidates<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Vec<Point> {
    match dim {
        1 => evenly_spaced(LINE_POINTS),
        2 => centred_grid(2, SQUARE_PER_DIM),
        3 => {
            let mut candidates = centred_grid(3, CUBE_PER_DIM);
            candidates.extend(uniform(3, CUBE_RANDOM, rng));
            candidates
        }
        _ => uniform(dim, HIGH_DIM_RANDOM, rng),
    }
}

#[allow(clippy::cast_precision_loss)]
fn evenly_spaced(n: usize) -> Vec<Point> {
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| Array1::from_elem(1, i as f64 / last))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn centred_grid(dim: usize, per_dim: usize) -> Vec<Point> {
    let total: usize = std::iter::repeat_n(per_dim, dim).product();
    let width = per_dim as f64;

    (0..total)
        .map(|flat| {
            let mut point = Array1::zeros(dim);
            let mut rest = flat;
            for axis in (0..dim).rev() {
                point[axis] = ((rest % per_dim) as f64 + 0.5) / width;
                rest /= per_dim;
            }
            point
        })
        .collect()
}

fn uniform<R: Rng + ?Sized>(dim: usize, n: usize, rng: &mut R) -> Vec<Point> {
    (0..n)
        .map(|_| (0..dim).map(|_| rng.gen_range(0.0..1.0)).collect())
        .collect()
}
