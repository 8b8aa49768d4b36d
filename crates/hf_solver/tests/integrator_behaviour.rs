// crates/hf_solver/tests/integrator_behaviour.rs

//! 单进程积分器行为测试

mod common;

use glam::DVec2;
use hf_comm::SerialComm;
use hf_config::SolverConfig;
use hf_foundation::HfError;
use hf_mesh::{BoundaryTags, RectMeshGenerator};
use hf_solver::policy::{ConstantTimeStep, UniformState};
use hf_solver::{
    Integrator, IntegratorState, MemorySnapshots, PolicySet, ProgressReporter, TerminationStatus,
};

use common::{advection, diffusion, Diffusion, Extrapolate, SharedBuffer};

#[test]
fn test_closed_mesh_conserves() {
    let mesh = RectMeshGenerator::new(6, 5, 1.0, 1.0).build().unwrap();
    let config = SolverConfig::builder().first_order().build().unwrap();
    let mut integ = Integrator::new(&mesh, &config, diffusion(1e-3), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());

    let qt = integ.time_derivative().unwrap().to_vec();
    let total: f64 = mesh.owned_cells().map(|c| qt[c] * mesh.cell_area[c]).sum();
    assert!(total.abs() < 1e-12);
    // 阶跃处确实有非零导数
    assert!(qt.iter().any(|v| v.abs() > 1e-3));
    // ghost 单元不接收贡献
    assert!(qt[mesh.n_real_cells..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_mass_conserved_over_run() {
    let mesh = RectMeshGenerator::new(8, 4, 1.0, 1.0).build().unwrap();
    let config = SolverConfig::builder()
        .first_order()
        .max_steps(20)
        .tolerance(0.0)
        .build()
        .unwrap();
    let mut integ = Integrator::new(&mesh, &config, diffusion(1e-3), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());

    let mass = |q: &[f64]| -> f64 { mesh.owned_cells().map(|c| q[c] * mesh.cell_area[c]).sum() };
    let before = mass(integ.q());
    let out = integ.run().unwrap();
    assert_eq!(out.status, TerminationStatus::MaxStepReached);
    assert!((mass(integ.q()) - before).abs() < 1e-12);
}

#[test]
fn test_single_stage_is_forward_euler() {
    let mesh = RectMeshGenerator::new(5, 4, 1.0, 1.0).build().unwrap();
    let dt = 2e-3;
    let config = SolverConfig::builder()
        .stage_coefficients([1.0])
        .max_steps(1)
        .build()
        .unwrap();

    let mut probe = Integrator::new(&mesh, &config, advection(dt), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());
    let q0 = probe.q().to_vec();
    let qt0 = probe.time_derivative().unwrap().to_vec();

    let mut integ = Integrator::new(&mesh, &config, advection(dt), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());
    integ.iterate().unwrap();

    for c in mesh.owned_cells() {
        let expected = q0[c] + dt * qt0[c];
        assert!((integ.q()[c] - expected).abs() < 1e-14, "cell {c}");
    }
    assert_eq!(integ.step(), 1);
    assert!((integ.time() - dt).abs() < 1e-18);
}

#[test]
fn test_limiters_stay_bounded() {
    let mesh = RectMeshGenerator::new(10, 3, 1.0, 0.3).build().unwrap();
    let config = SolverConfig::builder().limiter_k(1e-3).build().unwrap();
    let policies = PolicySet::builder(1)
        .flux(Diffusion { kappa: 0.1 })
        .boundary("wall", Extrapolate)
        .time_step(ConstantTimeStep::new(1e-3))
        .initial(hf_solver::policy::CellwiseInitial::new("step", common::step))
        .build()
        .unwrap();
    let mut integ = Integrator::new(&mesh, &config, policies, SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());
    integ.time_derivative().unwrap();

    let lim = &integ.fields().limiters;
    assert!(lim.iter().all(|&l| (0.0..=1.0).contains(&l)));
    // 间断两侧被限制
    assert!(mesh.owned_cells().any(|c| lim[c] < 1.0));
    // 远离间断的常值区域不受限制
    let far = mesh
        .owned_cells()
        .filter(|&c| mesh.cell_center[c].x < 0.2)
        .collect::<Vec<_>>();
    assert!(!far.is_empty());
    assert!(far.iter().all(|&c| lim[c] == 1.0));
}

#[test]
fn test_nan_state_is_divergence() {
    let mesh = RectMeshGenerator::new(3, 3, 1.0, 1.0).build().unwrap();
    let config = SolverConfig::default();
    let policies = PolicySet::builder(1)
        .flux(common::UpwindAdvection { velocity: DVec2::X })
        .boundary("wall", Extrapolate)
        .time_step(ConstantTimeStep::new(1e-3))
        .initial(UniformState::new([f64::NAN]))
        .build()
        .unwrap();
    let mut integ = Integrator::new(&mesh, &config, policies, SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());

    let err = integ.run().unwrap_err();
    assert!(matches!(err, HfError::NumericalDivergence { step: 0, .. }));
}

#[test]
fn test_missing_boundary_tag_rejected() {
    let mesh = RectMeshGenerator::new(3, 2, 1.0, 1.0)
        .with_tags(BoundaryTags {
            left: "inlet".into(),
            ..BoundaryTags::default()
        })
        .build()
        .unwrap();
    let config = SolverConfig::default();

    let err = Integrator::new(&mesh, &config, advection(1e-3), SerialComm::new()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_partition_with_peers_rejected_in_serial() {
    let parts = RectMeshGenerator::new(4, 2, 1.0, 1.0).partition_columns(2).unwrap();
    let config = SolverConfig::default();
    let err = Integrator::new(&parts[0], &config, advection(1e-3), SerialComm::new()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_progress_lines() {
    let mesh = RectMeshGenerator::new(4, 4, 1.0, 1.0).build().unwrap();
    let config = SolverConfig::builder()
        .max_steps(7)
        .print_interval(3)
        .tolerance(0.0)
        .build()
        .unwrap();
    let buf = SharedBuffer::default();
    let mut integ = Integrator::new(&mesh, &config, advection(1e-3), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::to_writer(buf.clone()));
    integ.run().unwrap();

    let text = buf.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Step, Time, R(phi)");
    // 第 3 步与第 6 步
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("3, "));
    assert!(lines[2].starts_with("6, "));
}

#[test]
fn test_residual_ratio_decays_to_convergence() {
    // 扩散趋于均匀，残差比单调下降
    let mesh = RectMeshGenerator::new(4, 1, 1.0, 0.25).build().unwrap();
    let config = SolverConfig::builder()
        .first_order()
        .max_steps(20_000)
        .tolerance(1e-6)
        .build()
        .unwrap();
    let mut integ = Integrator::new(&mesh, &config, diffusion(0.02), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());

    let out = integ.run().unwrap();
    assert_eq!(out.status, TerminationStatus::Converged);
    assert!(out.residuals[0] < 1e-6);
    assert!(integ.residual_baseline().unwrap()[0] > 0.0);
    assert_eq!(integ.state(), IntegratorState::Converged);
}

#[test]
fn test_snapshots_by_step() {
    let mesh = RectMeshGenerator::new(3, 2, 1.0, 1.0).build().unwrap();
    let config = SolverConfig::builder()
        .max_steps(6)
        .tolerance(0.0)
        .snapshot_every_steps(2)
        .build()
        .unwrap();
    let mut integ = Integrator::new(&mesh, &config, advection(1e-3), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());

    let mut sink = MemorySnapshots::default();
    integ.run_with_snapshots(&mut sink).unwrap();

    let steps: Vec<usize> = sink.frames.iter().map(|f| f.0).collect();
    assert_eq!(steps, vec![0, 2, 4, 6]);
    assert!(sink.frames.iter().all(|f| f.2.len() == mesh.n_real_cells));
    assert_eq!(sink.frames.last().unwrap().2, integ.q()[..mesh.n_real_cells].to_vec());
}
