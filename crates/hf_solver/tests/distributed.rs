// crates/hf_solver/tests/distributed.rs

//! 多 rank（进程内线程后端）与单进程结果一致性

mod common;

use glam::DVec2;
use hf_comm::{run_local, Communicator, SerialComm};
use hf_config::SolverConfig;
use hf_foundation::{HfError, HfResult};
use hf_mesh::{MeshPartition, RectMeshGenerator};
use hf_solver::policy::{CellwiseInitial, PolicySet, TimeStepPolicy};
use hf_solver::{GhostExchange, Integrator, ProgressReporter, RunOutcome};

use common::{Extrapolate, UpwindAdvection};

/// 随 x 增大的局部时间步，全局最小值位于最左列
#[derive(Debug)]
struct CenterDt;

impl TimeStepPolicy for CenterDt {
    fn compute_dt(&self, _q: &[f64], mesh: &MeshPartition, vars: usize, dt: &mut [f64]) {
        for (c, cell) in dt.chunks_exact_mut(vars).enumerate() {
            cell.fill(1e-3 * (1.0 + mesh.cell_center[c].x.abs()));
        }
    }

    fn name(&self) -> &'static str {
        "center"
    }
}

fn policies() -> PolicySet {
    PolicySet::builder(1)
        .variable_names(["phi"])
        .flux(UpwindAdvection {
            velocity: DVec2::new(1.0, -0.4),
        })
        .boundary("wall", Extrapolate)
        .time_step(CenterDt)
        .initial(CellwiseInitial::new("bump", common::bump))
        .build()
        .unwrap()
}

fn config() -> SolverConfig {
    SolverConfig::builder()
        .max_steps(12)
        .print_interval(4)
        .build()
        .unwrap()
}

/// 按全局编号收集拥有单元的状态
fn owned_by_global(mesh: &MeshPartition, q: &[f64]) -> Vec<(usize, f64)> {
    mesh.owned_cells()
        .filter_map(|c| mesh.cell_global_id[c].map(|g| (g, q[c])))
        .collect()
}

#[test]
fn test_halo_round_trip() {
    let parts = RectMeshGenerator::new(6, 3, 1.0, 1.0).partition_columns(2).unwrap();

    let results = run_local(2, |comm| -> HfResult<bool> {
        let mesh = &parts[comm.rank()];
        let vars = 2;
        let mut field = vec![-1.0; vars * mesh.n_cells];
        for c in mesh.owned_cells() {
            let g = mesh.cell_global_id[c].unwrap_or(usize::MAX) as f64;
            field[vars * c] = g;
            field[vars * c + 1] = -g;
        }

        let mut exchange = GhostExchange::new(mesh, vars);
        exchange.check_peers(&comm)?;
        exchange.exchange(&comm, &mut field)?;

        let halos_match = (0..mesh.n_real_cells)
            .filter(|&c| mesh.cell_is_ghost[c])
            .all(|c| {
                let g = mesh.cell_global_id[c].unwrap_or(usize::MAX) as f64;
                field[vars * c] == g && field[vars * c + 1] == -g
            });
        Ok(halos_match)
    })
    .unwrap();

    for (rank, r) in results.into_iter().enumerate() {
        assert!(r.unwrap(), "rank {rank} halo mismatch");
    }
}

#[test]
fn test_two_ranks_match_serial() {
    let generator = RectMeshGenerator::new(8, 5, 1.0, 1.0);
    let config = config();

    let serial_mesh = generator.build().unwrap();
    let mut serial = Integrator::new(&serial_mesh, &config, policies(), SerialComm::new())
        .unwrap()
        .with_reporter(ProgressReporter::silent());
    let serial_out = serial.run().unwrap();
    let serial_q = owned_by_global(&serial_mesh, serial.q());

    let parts = generator.partition_columns(2).unwrap();
    let results = run_local(2, |comm| -> HfResult<(RunOutcome, Vec<(usize, f64)>)> {
        let mesh = &parts[comm.rank()];
        let mut integ = Integrator::new(mesh, &config, policies(), comm)?
            .with_reporter(ProgressReporter::silent());
        let out = integ.run()?;
        Ok((out, owned_by_global(mesh, integ.q())))
    })
    .unwrap();

    let mut combined = Vec::new();
    for r in results {
        let (out, q) = r.unwrap();
        assert_eq!(out.status, serial_out.status);
        assert_eq!(out.steps, serial_out.steps);
        // 全局时间步经星形归约后各 rank 一致
        assert!((out.time - serial_out.time).abs() < 1e-15);
        for (a, b) in out.residuals.iter().zip(&serial_out.residuals) {
            assert!((a - b).abs() < 1e-10 * b.abs().max(1.0));
        }
        combined.extend(q);
    }

    combined.sort_by_key(|&(g, _)| g);
    let mut serial_sorted = serial_q;
    serial_sorted.sort_by_key(|&(g, _)| g);
    assert_eq!(combined.len(), serial_sorted.len());
    for ((ga, a), (gb, b)) in combined.iter().zip(&serial_sorted) {
        assert_eq!(ga, gb);
        assert!((a - b).abs() < 1e-12, "cell {ga}: {a} vs {b}");
    }
}

#[test]
fn test_three_ranks_conserve_like_serial() {
    let generator = RectMeshGenerator::new(9, 4, 1.0, 1.0);
    let config = SolverConfig::builder()
        .first_order()
        .max_steps(5)
        .tolerance(0.0)
        .build()
        .unwrap();
    let parts = generator.partition_columns(3).unwrap();

    let diffusion = common::diffusion(1e-3);
    let masses = run_local(3, |comm| -> HfResult<(f64, f64)> {
        let mesh = &parts[comm.rank()];
        let mut integ = Integrator::new(mesh, &config, diffusion.clone(), comm)?
            .with_reporter(ProgressReporter::silent());
        let mass = |q: &[f64]| -> f64 { mesh.owned_cells().map(|c| q[c] * mesh.cell_area[c]).sum() };
        let before = mass(integ.q());
        integ.run()?;
        Ok((before, mass(integ.q())))
    })
    .unwrap();

    let (before, after) = masses
        .into_iter()
        .map(Result::unwrap)
        .fold((0.0, 0.0), |acc, (b, a)| (acc.0 + b, acc.1 + a));
    assert!((before - after).abs() < 1e-12);
}

/// 中间一列条带的时间步为 NaN
#[derive(Debug)]
struct BrokenMiddle;

impl TimeStepPolicy for BrokenMiddle {
    fn compute_dt(&self, _q: &[f64], mesh: &MeshPartition, vars: usize, dt: &mut [f64]) {
        for (c, cell) in dt.chunks_exact_mut(vars).enumerate() {
            let x = mesh.cell_center[c].x;
            cell.fill(if x > 2.0 && x < 4.0 { f64::NAN } else { 1e-3 });
        }
    }

    fn name(&self) -> &'static str {
        "broken_middle"
    }
}

#[test]
fn test_local_dt_divergence_reported_by_every_rank() {
    let parts = RectMeshGenerator::new(6, 2, 6.0, 2.0).partition_columns(3).unwrap();
    let config = SolverConfig::builder()
        .global_dt(false)
        .max_steps(5)
        .build()
        .unwrap();
    let policies = PolicySet::builder(1)
        .flux(UpwindAdvection { velocity: DVec2::X })
        .boundary("wall", Extrapolate)
        .time_step(BrokenMiddle)
        .initial(CellwiseInitial::new("bump", common::bump))
        .build()
        .unwrap();

    let results = run_local(3, |comm| -> HfResult<RunOutcome> {
        let mesh = &parts[comm.rank()];
        let mut integ = Integrator::new(mesh, &config, policies.clone(), comm)?
            .with_reporter(ProgressReporter::silent());
        integ.run()
    })
    .unwrap();

    for (rank, r) in results.into_iter().enumerate() {
        let err = r.unwrap_err();
        assert!(
            matches!(err, HfError::NumericalDivergence { step: 0, .. }),
            "rank {rank}: {err}"
        );
    }
}
