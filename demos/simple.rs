use leapfrog_wave::{sample, solve, Dimension, Policy, WaveParams};
use ndarray::Array2;

fn main() -> leapfrog_wave::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let params = WaveParams::new(1., 0.0625, 0.125)
        .with_dimension(Dimension::Two)
        .with_horizon(2.);
    let nx = params.nx();

    // point source in the middle of the domain for the first few steps
    let mut q = Array2::zeros((params.grid_size(), params.nt()));
    let center = nx / 2 + nx * (nx / 2);
    for k in 1..5 {
        q[(center, k)] = 1.;
    }

    let u = solve(q.view(), &params)?;

    let xin: Vec<f64> = (0..nx).map(|i| -params.half_length + i as f64 * params.dx).collect();
    let receivers = sample(&xin, &[-0.5, 0., 0.5], Some(&[0.3, 0.3, 0.3][..]), Policy::Strict)?;
    let traces = receivers.dot_dense(u.view());

    println!("{}", traces);
    Ok(())
}
