//! Criterion benchmarks for the formulate-solve pipelines.
//!
//! Each benchmark includes model construction, so the numbers reflect
//! what a single run of the matching binary pays.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_formulate::cp::{BacktrackingSolver, SolverConfig};
use u_formulate::lp::MicrolpSolver;
use u_formulate::problems::box_volume::{self, BoxConfig};
use u_formulate::problems::suko::{self, SukoPuzzle};
use u_formulate::problems::sudoku::{self, SudokuGrid};
use u_formulate::problems::textbook;

fn bench_box_volume(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_volume");
    group.sample_size(10);

    for s in [1.0, 10.0, 100.0] {
        let config = BoxConfig::default().with_surface_area(s);
        group.bench_with_input(BenchmarkId::from_parameter(s), &config, |b, config| {
            b.iter(|| box_volume::solve(black_box(config)));
        });
    }

    group.finish();
}

fn bench_lp_battery(c: &mut Criterion) {
    let solver = MicrolpSolver::new();
    c.bench_function("lp_battery", |b| {
        b.iter(|| textbook::solve_all(black_box(&solver)));
    });
}

fn bench_sudoku(c: &mut Criterion) {
    let mut group = c.benchmark_group("sudoku");
    group.sample_size(10);

    let puzzle = SudokuGrid::very_difficult();
    let solver = BacktrackingSolver::new();
    for seed in [None, Some(1), Some(2)] {
        let mut config = SolverConfig::default();
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }
        let id = seed.map_or_else(|| "ascending".to_string(), |s| format!("seed{s}"));
        group.bench_with_input(BenchmarkId::from_parameter(id), &config, |b, config| {
            b.iter(|| sudoku::solve(black_box(&puzzle), &solver, config));
        });
    }

    group.finish();
}

fn bench_suko(c: &mut Criterion) {
    let mut group = c.benchmark_group("suko");
    let solver = BacktrackingSolver::new();
    let config = SolverConfig::default();

    for puzzle in SukoPuzzle::reference_set() {
        group.bench_with_input(
            BenchmarkId::from_parameter(puzzle.number),
            &puzzle,
            |b, puzzle| {
                b.iter(|| suko::solve(black_box(puzzle), &solver, &config));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_box_volume,
    bench_lp_battery,
    bench_sudoku,
    bench_suko
);
criterion_main!(benches);
