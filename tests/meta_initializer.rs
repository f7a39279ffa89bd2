use warmkhorn::Scenario;
use warmkhorn::transport::Initializer;

#[test]
fn meta_initializer_beats_cold_start_in_log_domain() {
    let comparison = Scenario::default().with_lse_mode(true).run().unwrap();
    assert!(comparison.baseline.converged);
    assert!(comparison.meta.converged);
    assert!(comparison.baseline.n_iters <= 3000);
    assert!(comparison.baseline.n_iters > comparison.meta.n_iters);
    assert_eq!(comparison.losses.len(), 50);
    assert!(comparison.losses.iter().all(|l| l.is_finite()));
}

#[test]
fn meta_initializer_no_worse_in_kernel_domain() {
    let comparison = Scenario::default().with_lse_mode(false).run().unwrap();
    assert!(comparison.baseline.n_iters <= 3000);
    assert!(comparison.meta.n_iters <= 3000);
    assert!(comparison.baseline.n_iters >= comparison.meta.n_iters);
}

#[test]
fn meta_initializer_saves_kernel_iterations_when_well_conditioned() {
    let scenario = Scenario {
        epsilon: 1.,
        ..Scenario::default()
    };
    let comparison = scenario.with_lse_mode(false).run().unwrap();
    assert!(comparison.baseline.converged);
    assert!(comparison.meta.converged);
    assert!(comparison.meta.n_iters < comparison.baseline.n_iters);
}

#[test]
fn untrained_initializer_is_a_valid_warm_start() {
    let scenario = Scenario {
        hidden_units: 64,
        hidden_layers: 2,
        ..Scenario::default()
    };
    let problem = scenario.problem().unwrap();
    let device = Default::default();
    let meta = warmkhorn::meta::adam::<warmkhorn::MetaBackend>(
        problem.geometry(),
        &scenario.network(),
        &device,
    );
    let f = meta.init_dual_a(&problem, true);
    assert_eq!(f.len(), scenario.n);
    assert!(f.iter().all(|x| x.is_finite()));
    let output = scenario.solver().with_initializer(&meta).solve(&problem);
    assert!(!output.diverged);
    assert_eq!(output.n_iters % 10, 0);
}

#[test]
fn comparison_serializes() {
    let scenario = Scenario {
        n: 6,
        m: 5,
        epsilon: 0.5,
        batch_size: None,
        steps: 3,
        hidden_units: 16,
        hidden_layers: 1,
        ..Scenario::default()
    };
    let comparison = scenario.run().unwrap();
    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["scenario"]["n"], 6);
    assert_eq!(json["losses"].as_array().map(Vec::len), Some(3));
    assert!(comparison.to_string().contains("iterations saved"));
}

#[test]
fn invalid_scenario_is_an_error() {
    let scenario = Scenario {
        dim: 0,
        ..Scenario::default()
    };
    assert!(scenario.run().is_err());
}
