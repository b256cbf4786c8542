// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! End-to-end checks of the branch-and-bound search against exhaustive enumeration.

use cia_bnb::{
    bnb::BnbSolver, frontier::strategy::FrontierStrategy, monitor::no_op::NoOperationMonitor,
    result::SolverStatus,
};
use cia_model::{
    index::ControlIndex,
    norm::CiaNorm,
    objective,
    problem::{Problem, ProblemBuilder},
    trajectory::BinaryTrajectory,
    validation,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

const STRATEGIES: [FrontierStrategy; 5] = [
    FrontierStrategy::DepthFirst,
    FrontierStrategy::BestFirst,
    FrontierStrategy::DynamicBacktracking { beta: 0.1 },
    FrontierStrategy::DynamicBacktracking { beta: 0.5 },
    FrontierStrategy::DynamicBacktracking { beta: 1.0 },
];

const NORMS: [CiaNorm; 3] = [CiaNorm::MaxNorm, CiaNorm::ColumnSumNorm, CiaNorm::RowSumNorm];

fn ci(i: usize) -> ControlIndex {
    ControlIndex::new(i)
}

/// Returns the optimal objective over all feasible trajectories, if any.
fn brute_force(problem: &Problem<f64>) -> Option<(f64, BinaryTrajectory)> {
    let n_c = problem.num_controls();
    let n_t = problem.num_intervals();
    let total = n_c.pow(n_t as u32);
    let mut best: Option<(f64, BinaryTrajectory)> = None;

    for code in 0..total {
        let mut rest = code;
        let mut active = Vec::with_capacity(n_t);
        for _ in 0..n_t {
            active.push(ci(rest % n_c));
            rest /= n_c;
        }
        let trajectory = BinaryTrajectory::new(n_c, active).unwrap();
        if validation::validate(problem, &trajectory).is_err() {
            continue;
        }
        let eta = objective::evaluate(problem, &trajectory);
        if best.as_ref().is_none_or(|(b, _)| eta < *b) {
            best = Some((eta, trajectory));
        }
    }
    best
}

fn random_problem(seed: u64, norm: CiaNorm) -> Problem<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_c = rng.random_range(2..=3);
    let n_t = rng.random_range(2..=7);

    let mut time_points = vec![0.0];
    for _ in 0..n_t {
        let dt = [0.5, 1.0, 1.5][rng.random_range(0..3)];
        let last = *time_points.last().unwrap();
        time_points.push(last + dt);
    }

    let mut relaxed = vec![vec![0.0; n_t]; n_c];
    for j in 0..n_t {
        let weights: Vec<f64> = (0..n_c).map(|_| rng.random::<f64>() + 0.01).collect();
        let sum: f64 = weights.iter().sum();
        for i in 0..n_c {
            relaxed[i][j] = weights[i] / sum;
        }
    }

    let mut builder = ProblemBuilder::new(time_points, relaxed);
    builder.set_norm(norm);
    builder.set_max_switches((0..n_c).map(|_| rng.random_range(1..=4)).collect());
    if rng.random_bool(0.5) {
        builder.set_min_up_times((0..n_c).map(|_| [0.0, 1.0, 2.0][rng.random_range(0..3)]).collect());
    }
    if rng.random_bool(0.5) {
        builder.set_min_down_times((0..n_c).map(|_| [0.0, 1.0][rng.random_range(0..2)]).collect());
    }
    if rng.random_bool(0.3) {
        builder.set_max_up_times(vec![3.0; n_c]);
    }
    if rng.random_bool(0.3) {
        builder.set_total_max_up_times(vec![4.5; n_c]);
    }
    if rng.random_bool(0.3) {
        builder.set_valid_controls(
            (0..n_c)
                .map(|_| (0..n_t).map(|_| rng.random_bool(0.85)).collect())
                .collect(),
        );
    }
    if rng.random_bool(0.3) {
        builder.set_adjacencies(
            (0..n_c)
                .map(|i| (0..n_c).map(|k| i == k || rng.random_bool(0.7)).collect())
                .collect(),
        );
    }
    if rng.random_bool(0.5) {
        builder.set_pre_state(Some(ci(rng.random_range(0..n_c))));
    }
    builder.build().unwrap()
}

fn assert_matches_brute_force(problem: &Problem<f64>, context: &str) {
    let oracle = brute_force(problem);
    let mut solver = BnbSolver::new();

    for strategy in STRATEGIES {
        let outcome = solver
            .solve(problem, strategy, NoOperationMonitor::new())
            .unwrap();
        match &oracle {
            Some((eta, _)) => {
                assert_eq!(
                    outcome.status(),
                    SolverStatus::Optimal,
                    "{} with {}",
                    context,
                    strategy
                );
                let objective = outcome.objective().unwrap();
                assert!(
                    (objective - eta).abs() <= 1e-9,
                    "{} with {}: got {}, expected {}",
                    context,
                    strategy,
                    objective,
                    eta
                );
                let trajectory = outcome.trajectory().unwrap();
                assert!(validation::validate(problem, trajectory).is_ok());
                assert!((objective::evaluate(problem, trajectory) - objective).abs() <= 1e-9);
            }
            None => {
                assert_eq!(
                    outcome.status(),
                    SolverStatus::Infeasible,
                    "{} with {}",
                    context,
                    strategy
                );
                assert!(outcome.trajectory().is_none());
            }
        }
    }
}

#[test]
fn test_random_instances_match_brute_force() {
    for seed in 0..40 {
        for norm in NORMS {
            let problem = random_problem(seed, norm);
            assert_matches_brute_force(&problem, &format!("seed {} / {}", seed, norm));
        }
    }
}

#[test]
fn test_off_state_scenario() {
    let mut builder = ProblemBuilder::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![vec![0.1, 0.6, 0.6, 0.9], vec![0.9, 0.4, 0.4, 0.1]],
    );
    builder.set_max_switches(vec![2, 2]);
    let problem = builder.build().unwrap();

    let (eta, _) = brute_force(&problem).unwrap();
    assert!((eta - 0.7).abs() < 1e-12);

    for strategy in STRATEGIES {
        let outcome = BnbSolver::new()
            .solve(&problem, strategy, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(outcome.status(), SolverStatus::Optimal);
        assert_eq!(outcome.objective(), Some(eta), "{}", strategy);

        let b_bin = outcome.b_bin().unwrap();
        assert_eq!(b_bin[0], vec![0, 0, 1, 1], "{}", strategy);
        assert_eq!(b_bin[1], vec![1, 1, 0, 0], "{}", strategy);
    }
}

#[test]
fn test_search_is_deterministic() {
    let problem = random_problem(7, CiaNorm::RowSumNorm);
    for strategy in STRATEGIES {
        let first = BnbSolver::new()
            .solve(&problem, strategy, NoOperationMonitor::new())
            .unwrap();
        let second = BnbSolver::new()
            .solve(&problem, strategy, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(first.status(), second.status());
        assert_eq!(first.trajectory(), second.trajectory());
        assert_eq!(first.statistics().iterations, second.statistics().iterations);
        assert_eq!(
            first.statistics().nodes_created,
            second.statistics().nodes_created
        );
    }
}

#[test]
fn test_pruning_does_not_change_the_optimum() {
    for seed in 100..110 {
        let problem = random_problem(seed, CiaNorm::MaxNorm);
        let pruned = BnbSolver::new()
            .solve(&problem, FrontierStrategy::BestFirst, NoOperationMonitor::new())
            .unwrap();
        let exhaustive = BnbSolver::new()
            .with_bound_pruning(false)
            .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(pruned.status(), exhaustive.status(), "seed {}", seed);
        assert_eq!(pruned.objective(), exhaustive.objective(), "seed {}", seed);
        assert!(pruned.statistics().nodes_created <= exhaustive.statistics().nodes_created);
    }
}

#[test]
fn test_invalid_everywhere_is_infeasible() {
    let mut builder = ProblemBuilder::new(
        vec![0.0, 1.0, 2.0],
        vec![vec![0.5, 0.5], vec![0.5, 0.5]],
    );
    builder.set_valid_controls(vec![vec![true, false], vec![true, false]]);
    let problem = builder.build().unwrap();

    for strategy in STRATEGIES {
        let outcome = BnbSolver::new()
            .solve(&problem, strategy, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(outcome.status(), SolverStatus::Infeasible);
        assert!(outcome.objective().is_none());
    }
}

#[test]
fn test_single_interval() {
    let problem = ProblemBuilder::new(vec![0.0, 2.0], vec![vec![0.75], vec![0.25]])
        .build()
        .unwrap();
    let outcome = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::Optimal);
    assert_eq!(outcome.b_bin().unwrap(), vec![vec![1], vec![0]]);
    assert_eq!(outcome.objective(), Some(0.5));
}
