criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        sampling_two_clusters,
        applying_lse_kernel_materialized,
        applying_lse_kernel_batched,
        solving_sinkhorn_lse,
        solving_sinkhorn_kernel,
        stepping_meta_initializer,
}

use warmkhorn::MetaBackend;
use warmkhorn::meta::MetaMlpConfig;
use warmkhorn::transport::Axis;
use warmkhorn::transport::LinearProblem;
use warmkhorn::transport::Sinkhorn;
use warmkhorn::transport::SinkhornConfig;

fn problem(batch_size: Option<usize>) -> LinearProblem {
    warmkhorn::transport::two_clusters(0, 64, 60, 2, 1., batch_size).expect("valid problem")
}

fn sampling_two_clusters(c: &mut criterion::Criterion) {
    c.bench_function("sample a 64 x 60 two-cluster problem", |b| {
        b.iter(|| problem(None))
    });
}

fn applying_lse_kernel_materialized(c: &mut criterion::Criterion) {
    let problem = problem(None);
    let f = vec![0.; 64];
    let g = vec![0.; 60];
    c.bench_function("apply LSE kernel to a materialized geometry", |b| {
        b.iter(|| problem.geometry().apply_lse_kernel(&f, &g, 1., Axis::X))
    });
}

fn applying_lse_kernel_batched(c: &mut criterion::Criterion) {
    let problem = problem(Some(3));
    let f = vec![0.; 64];
    let g = vec![0.; 60];
    c.bench_function("apply LSE kernel to a batched geometry", |b| {
        b.iter(|| problem.geometry().apply_lse_kernel(&f, &g, 1., Axis::X))
    });
}

fn solving_sinkhorn_lse(c: &mut criterion::Criterion) {
    let problem = problem(None);
    let solver = Sinkhorn::default();
    c.bench_function("solve Sinkhorn in the log domain", |b| {
        b.iter(|| solver.solve(&problem))
    });
}

fn solving_sinkhorn_kernel(c: &mut criterion::Criterion) {
    let problem = problem(None);
    let solver = Sinkhorn::new(SinkhornConfig::default().with_lse_mode(false));
    c.bench_function("solve Sinkhorn in the kernel domain", |b| {
        b.iter(|| solver.solve(&problem))
    });
}

fn stepping_meta_initializer(c: &mut criterion::Criterion) {
    let problem = problem(None);
    let device = Default::default();
    let config = MetaMlpConfig::new(64).with_num_hidden_units(128);
    let mut meta = Some(warmkhorn::meta::adam::<MetaBackend>(
        problem.geometry(),
        &config,
        &device,
    ));
    c.bench_function("take one meta initializer gradient step", |b| {
        b.iter(|| {
            if let Some(current) = meta.take() {
                let (loss, _, next) = current.step(problem.a(), problem.b());
                meta = Some(next);
                loss
            } else {
                f32::NAN
            }
        })
    });
}
