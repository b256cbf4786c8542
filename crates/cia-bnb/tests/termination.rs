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

//! Budget, interrupt and warm-start behaviour of the search.

use cia_bnb::{
    bnb::BnbSolver,
    frontier::strategy::FrontierStrategy,
    monitor::{
        composite::CompositeTreeSearchMonitor, interrupt::InterruptMonitor,
        iteration_limit::IterationLimitMonitor, log::LogTreeSearchMonitor,
        no_op::NoOperationMonitor, time_limit::TimeLimitMonitor,
        tree_search_monitor::{SearchCommand, TreeSearchMonitor},
        vbc::VbcTraceMonitor,
    },
    result::SolverStatus,
    stats::BnbSolverStatistics,
};
use cia_model::{
    index::ControlIndex,
    objective,
    problem::{Problem, ProblemBuilder},
    trajectory::BinaryTrajectory,
    validation,
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

fn ci(i: usize) -> ControlIndex {
    ControlIndex::new(i)
}

/// Eight intervals, three controls with fractional relaxed values.
fn problem() -> Problem<f64> {
    let time_points = (0..=8).map(f64::from).collect();
    let relaxed = vec![
        vec![0.25, 0.5, 0.75, 0.25, 0.5, 0.0, 0.25, 0.5],
        vec![0.5, 0.25, 0.25, 0.5, 0.25, 0.5, 0.5, 0.25],
        vec![0.25, 0.25, 0.0, 0.25, 0.25, 0.5, 0.25, 0.25],
    ];
    let mut builder = ProblemBuilder::new(time_points, relaxed);
    builder.set_max_switches(vec![4, 4, 4]);
    builder.build().unwrap()
}

/// Raises `flag` whenever the search accepts a new incumbent.
struct CancelOnSolution<'a> {
    flag: &'a AtomicBool,
}

impl TreeSearchMonitor<f64> for CancelOnSolution<'_> {
    fn name(&self) -> &str {
        "CancelOnSolution"
    }

    fn on_enter_search(
        &mut self,
        _problem: &Problem<f64>,
        _statistics: &BnbSolverStatistics<f64>,
    ) {
    }

    fn on_exit_search(&mut self, _status: SolverStatus, _statistics: &BnbSolverStatistics<f64>) {}

    fn on_solution_found(
        &mut self,
        _trajectory: &BinaryTrajectory,
        _objective: f64,
        _statistics: &BnbSolverStatistics<f64>,
    ) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Consults a time limit only once `flag` is raised.
struct ExpireWhenRaised<'a> {
    flag: &'a AtomicBool,
    inner: TimeLimitMonitor,
}

impl TreeSearchMonitor<f64> for ExpireWhenRaised<'_> {
    fn name(&self) -> &str {
        "ExpireWhenRaised"
    }

    fn on_enter_search(&mut self, problem: &Problem<f64>, statistics: &BnbSolverStatistics<f64>) {
        self.inner.on_enter_search(problem, statistics);
    }

    fn on_exit_search(&mut self, status: SolverStatus, statistics: &BnbSolverStatistics<f64>) {
        self.inner.on_exit_search(status, statistics);
    }

    fn search_command(&mut self, statistics: &BnbSolverStatistics<f64>) -> SearchCommand {
        if self.flag.load(Ordering::Relaxed) {
            self.inner.search_command(statistics)
        } else {
            SearchCommand::Continue
        }
    }

    fn on_solution_found(
        &mut self,
        _trajectory: &BinaryTrajectory,
        _objective: f64,
        _statistics: &BnbSolverStatistics<f64>,
    ) {
    }
}

/// Twelve unit intervals, two controls and three switches each.
fn long_problem() -> Problem<f64> {
    let time_points = (0..=12).map(f64::from).collect();
    let first = vec![0.9, 0.2, 0.7, 0.1, 0.6, 0.8, 0.3, 0.4, 0.9, 0.1, 0.5, 0.7];
    let second = first.iter().map(|v| 1.0 - v).collect();
    let mut builder = ProblemBuilder::new(time_points, vec![first, second]);
    builder.set_max_switches(vec![3, 3]);
    builder.build().unwrap()
}

#[test]
fn test_iteration_limit() {
    let problem = problem();
    let outcome = BnbSolver::new()
        .solve(
            &problem,
            FrontierStrategy::BestFirst,
            IterationLimitMonitor::new(1),
        )
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::IterationLimitExceeded);
    assert_eq!(outcome.statistics().iterations, 1);
    assert!(outcome.trajectory().is_none());
    assert!(outcome.statistics().open_nodes > 0);
}

#[test]
fn test_iteration_limit_keeps_incumbent() {
    let problem = problem();
    // Depth-first reaches a leaf after one pop per interval.
    let outcome = BnbSolver::new()
        .solve(
            &problem,
            FrontierStrategy::DepthFirst,
            IterationLimitMonitor::new(8),
        )
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::IterationLimitExceeded);
    let trajectory = outcome.trajectory().unwrap();
    assert!(validation::validate(&problem, trajectory).is_ok());
    assert_eq!(
        outcome.objective(),
        Some(objective::evaluate(&problem, trajectory))
    );
}

#[test]
fn test_zero_time_limit_stops_before_first_pop() {
    let problem = problem();
    let outcome = BnbSolver::new()
        .solve(
            &problem,
            FrontierStrategy::DepthFirst,
            TimeLimitMonitor::new(Duration::ZERO),
        )
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::TimeLimitExceeded);
    assert_eq!(outcome.statistics().iterations, 0);
}

#[test]
fn test_raised_interrupt_flag() {
    let problem = problem();
    let flag = AtomicBool::new(true);
    let outcome = BnbSolver::new()
        .solve(
            &problem,
            FrontierStrategy::DepthFirst,
            InterruptMonitor::new(&flag),
        )
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::UserInterrupt);
    assert!(outcome.trajectory().is_none());
}

#[test]
fn test_interrupt_during_search_keeps_first_incumbent() {
    let problem = long_problem();
    let full = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
        .unwrap();
    assert_eq!(full.status(), SolverStatus::Optimal);

    let flag = AtomicBool::new(false);
    let mut monitor = CompositeTreeSearchMonitor::new();
    monitor.add_monitor(CancelOnSolution { flag: &flag });
    monitor.add_monitor(InterruptMonitor::new(&flag));
    let outcome = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, &mut monitor)
        .unwrap();

    assert_eq!(outcome.status(), SolverStatus::UserInterrupt);
    assert!(outcome.statistics().solutions_found >= 1);
    assert!(outcome.statistics().open_nodes > 0);
    let trajectory = outcome.trajectory().unwrap();
    assert!(validation::validate(&problem, trajectory).is_ok());
    let objective = outcome.objective().unwrap();
    assert!(objective.is_finite());
    assert_eq!(objective, objective::evaluate(&problem, trajectory));
    assert!(objective >= full.objective().unwrap());
}

#[test]
fn test_interrupt_after_improving_on_warm_start() {
    let problem = problem();
    let warm = BinaryTrajectory::new(3, vec![ci(1); 8]).unwrap();
    let warm_objective = objective::evaluate(&problem, &warm);

    let flag = AtomicBool::new(false);
    let mut monitor = CompositeTreeSearchMonitor::new();
    monitor.add_monitor(CancelOnSolution { flag: &flag });
    monitor.add_monitor(InterruptMonitor::new(&flag));
    let outcome = BnbSolver::new()
        .solve_with_warm_start(
            &problem,
            FrontierStrategy::DepthFirst,
            Some(&warm),
            &mut monitor,
        )
        .unwrap();

    assert_eq!(outcome.status(), SolverStatus::UserInterrupt);
    assert!(outcome.statistics().solutions_found >= 1);
    let trajectory = outcome.trajectory().unwrap();
    assert!(validation::validate(&problem, trajectory).is_ok());
    let objective = outcome.objective().unwrap();
    assert_eq!(objective, objective::evaluate(&problem, trajectory));
    assert!(objective < warm_objective);
    assert_eq!(outcome.statistics().incumbent_objective, Some(objective));
}

#[test]
fn test_time_limit_keeps_warm_start_incumbent() {
    let problem = problem();
    let warm = BinaryTrajectory::new(3, vec![ci(1); 8]).unwrap();

    let outcome = BnbSolver::new()
        .solve_with_warm_start(
            &problem,
            FrontierStrategy::DepthFirst,
            Some(&warm),
            TimeLimitMonitor::new(Duration::ZERO),
        )
        .unwrap();

    assert_eq!(outcome.status(), SolverStatus::TimeLimitExceeded);
    let trajectory = outcome.trajectory().unwrap();
    assert_eq!(trajectory, &warm);
    assert!(validation::validate(&problem, trajectory).is_ok());
    let objective = outcome.objective().unwrap();
    assert!(objective.is_finite());
    assert_eq!(objective, objective::evaluate(&problem, trajectory));
    assert_eq!(outcome.statistics().incumbent_objective, Some(objective));
}

#[test]
fn test_time_limit_after_first_incumbent() {
    let problem = long_problem();
    let warm = BinaryTrajectory::new(2, vec![ci(0); 12]).unwrap();
    assert!(validation::validate(&problem, &warm).is_ok());

    let flag = AtomicBool::new(false);
    let mut monitor = CompositeTreeSearchMonitor::new();
    monitor.add_monitor(CancelOnSolution { flag: &flag });
    monitor.add_monitor(ExpireWhenRaised {
        flag: &flag,
        inner: TimeLimitMonitor::with_clock_check_mask(Duration::ZERO, 0),
    });
    let outcome = BnbSolver::new()
        .solve_with_warm_start(
            &problem,
            FrontierStrategy::DepthFirst,
            Some(&warm),
            &mut monitor,
        )
        .unwrap();

    assert_eq!(outcome.status(), SolverStatus::TimeLimitExceeded);
    assert!(outcome.statistics().solutions_found >= 1);
    let trajectory = outcome.trajectory().unwrap();
    assert_ne!(trajectory, &warm);
    assert!(validation::validate(&problem, trajectory).is_ok());
    let objective = outcome.objective().unwrap();
    assert_eq!(objective, objective::evaluate(&problem, trajectory));
    assert!(objective < objective::evaluate(&problem, &warm));
}

#[test]
fn test_composite_with_generous_limits_solves_to_optimality() {
    let problem = problem();
    let flag = AtomicBool::new(false);
    let mut monitor = CompositeTreeSearchMonitor::new();
    monitor.add_monitor(IterationLimitMonitor::new(5_000_000));
    monitor.add_monitor(TimeLimitMonitor::new(Duration::from_secs(300)));
    monitor.add_monitor(InterruptMonitor::new(&flag));
    monitor.add_monitor(LogTreeSearchMonitor::new(2, 10));

    let reference = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
        .unwrap();
    let outcome = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, &mut monitor)
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::Optimal);
    assert_eq!(outcome.trajectory(), reference.trajectory());
}

#[test]
fn test_warm_start_reduces_work() {
    let problem = problem();
    let cold = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
        .unwrap();
    let optimum = cold.trajectory().unwrap().clone();

    let warm = BnbSolver::new()
        .solve_with_warm_start(
            &problem,
            FrontierStrategy::DepthFirst,
            Some(&optimum),
            NoOperationMonitor::new(),
        )
        .unwrap();
    assert_eq!(warm.status(), SolverStatus::Optimal);
    assert_eq!(warm.objective(), cold.objective());
    assert_eq!(warm.trajectory(), Some(&optimum));
    assert_eq!(warm.statistics().solutions_found, 0);
    assert!(warm.statistics().nodes_created <= cold.statistics().nodes_created);
}

#[test]
fn test_warm_start_survives_budget_stop() {
    let problem = problem();
    let warm = BinaryTrajectory::new(3, vec![ci(1); 8]).unwrap();
    assert!(validation::validate(&problem, &warm).is_ok());

    let outcome = BnbSolver::new()
        .solve_with_warm_start(
            &problem,
            FrontierStrategy::BestFirst,
            Some(&warm),
            IterationLimitMonitor::new(1),
        )
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::IterationLimitExceeded);
    assert_eq!(outcome.trajectory(), Some(&warm));
}

#[test]
fn test_vbc_trace_of_a_full_search() {
    let problem = ProblemBuilder::new(
        vec![0.0, 1.0, 2.0],
        vec![vec![0.75, 0.25], vec![0.25, 0.75]],
    )
    .build()
    .unwrap();

    let mut trace = VbcTraceMonitor::new(Vec::new(), false);
    let outcome = BnbSolver::new()
        .solve(&problem, FrontierStrategy::DepthFirst, &mut trace)
        .unwrap();
    assert_eq!(outcome.status(), SolverStatus::Optimal);

    let bytes = trace.into_inner().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("#TYPE: COMPLETE TREE"));
    assert!(text.lines().any(|line| line.starts_with("n ")));
    assert!(text.lines().any(|line| line.ends_with(" 9")));
}
