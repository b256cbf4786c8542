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

//! Branch-and-bound search for combinatorial integral approximation.
//!
//! `BnbSolver` explores the tree of prefix assignments interval by interval.
//! A node at depth `k` has fixed the active control of the intervals
//! `[0, k)`; expanding it tries every control for interval `k` in index
//! order. Candidates rejected by the `ConstraintChecker` are dropped, the
//! others become children whose bound is computed incrementally by the
//! `BoundEvaluator` of the problem's norm. A child is pruned as soon as its
//! bound (or the lookahead bound of its frozen controls) reaches the
//! incumbent; a leaf with a strictly smaller objective becomes the new
//! incumbent. The exploration order is delegated to a `Frontier`.
//!
//! The solver keeps its path arena and scratch buffers between runs, so
//! repeated solves on problems of similar size do not reallocate. All
//! per-run state lives in a search session that is created by `solve` and
//! consumed when the search ends.
//!
//! Budgets and cancellation are enforced by monitors: the session polls
//! `TreeSearchMonitor::search_command` once per iteration, before the next
//! node is popped, and returns the incumbent with the corresponding status
//! when asked to terminate.

use crate::{
    checker::ConstraintChecker,
    error::{BnbError, BnbResult},
    eval::{
        column_sum::ColumnSumEvaluator, evaluator::BoundEvaluator, max_norm::MaxNormEvaluator,
        row_sum::RowSumEvaluator,
    },
    extract::extract_trajectory,
    frontier::{Frontier, strategy::FrontierStrategy},
    incumbent::Incumbent,
    monitor::tree_search_monitor::{NodeFate, SearchCommand, TreeSearchMonitor},
    node::SearchNode,
    path::PathArena,
    result::{BnbSolverOutcome, StopReason},
    stats::BnbSolverStatistics,
};
use cia_model::{
    index::ControlIndex,
    norm::CiaNorm,
    num::{SolverFloat, approx_eq, constant},
    objective,
    problem::Problem,
    trajectory::BinaryTrajectory,
    validation,
};
use log::warn;
use std::time::Instant;

/// Relative tolerance between the incremental objective of a leaf and its
/// direct recomputation.
pub const LEAF_CONSISTENCY_TOLERANCE: f64 = 1e-9;

/// A branch-and-bound solver for the binary approximation problem.
///
/// This is the execution engine only: the exploration order comes from a
/// `FrontierStrategy`, bounds from the evaluator matching the problem's
/// norm, and budgets from the `TreeSearchMonitor` passed to `solve`.
#[derive(Debug, Clone)]
pub struct BnbSolver<T> {
    arena: PathArena,
    children: Vec<SearchNode<T>>,
    scratch: Vec<ControlIndex>,
    bound_pruning: bool,
}

impl<T> Default for BnbSolver<T>
where
    T: SolverFloat,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbSolver<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            arena: PathArena::new(),
            children: Vec::new(),
            scratch: Vec::new(),
            bound_pruning: true,
        }
    }

    /// Creates a solver with buffers sized for the given problem dimensions.
    #[inline]
    pub fn preallocated(num_controls: usize, num_intervals: usize) -> Self {
        Self {
            arena: PathArena::preallocated(num_controls.saturating_mul(num_intervals)),
            children: Vec::with_capacity(num_controls),
            scratch: Vec::with_capacity(num_intervals),
            bound_pruning: true,
        }
    }

    /// Enables or disables pruning by bound and lookahead.
    ///
    /// Without pruning the search enumerates every feasible trajectory. The
    /// result is the same; this exists to cross-check the bounds.
    #[inline]
    pub fn with_bound_pruning(mut self, enabled: bool) -> Self {
        self.bound_pruning = enabled;
        self
    }

    #[inline]
    pub fn bound_pruning(&self) -> bool {
        self.bound_pruning
    }

    /// Returns the heap memory held by the reusable buffers in bytes.
    pub fn allocated_memory_bytes(&self) -> usize {
        self.arena.allocated_memory_bytes()
            + self.children.capacity() * std::mem::size_of::<SearchNode<T>>()
            + self.scratch.capacity() * std::mem::size_of::<ControlIndex>()
    }

    /// Solves `problem` without a warm start.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::Configuration` for an invalid strategy and
    /// `BnbError::Internal` if an engine invariant is violated.
    #[inline]
    pub fn solve<S>(
        &mut self,
        problem: &Problem<T>,
        strategy: FrontierStrategy,
        monitor: S,
    ) -> BnbResult<BnbSolverOutcome<T>>
    where
        S: TreeSearchMonitor<T>,
    {
        self.solve_with_warm_start(problem, strategy, None, monitor)
    }

    /// Solves `problem`, seeding the incumbent with `warm_start` if it is feasible.
    ///
    /// A warm start only tightens pruning; an infeasible one is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::Configuration` for an invalid strategy or a warm
    /// start of the wrong shape, and `BnbError::Internal` if an engine
    /// invariant is violated.
    pub fn solve_with_warm_start<S>(
        &mut self,
        problem: &Problem<T>,
        strategy: FrontierStrategy,
        warm_start: Option<&BinaryTrajectory>,
        mut monitor: S,
    ) -> BnbResult<BnbSolverOutcome<T>>
    where
        S: TreeSearchMonitor<T>,
    {
        strategy.validate()?;
        let incumbent = match warm_start {
            Some(trajectory) => Self::warm_start_incumbent(problem, trajectory)?,
            None => None,
        };

        let mut frontier = strategy.create::<T>();
        let result = match problem.norm() {
            CiaNorm::MaxNorm => self.run(
                problem,
                &MaxNormEvaluator::new(),
                frontier.as_mut(),
                &mut monitor,
                incumbent,
            ),
            CiaNorm::ColumnSumNorm => self.run(
                problem,
                &ColumnSumEvaluator::new(),
                frontier.as_mut(),
                &mut monitor,
                incumbent,
            ),
            CiaNorm::RowSumNorm => self.run(
                problem,
                &RowSumEvaluator::new(),
                frontier.as_mut(),
                &mut monitor,
                incumbent,
            ),
        };
        self.reset();
        result
    }

    fn warm_start_incumbent(
        problem: &Problem<T>,
        trajectory: &BinaryTrajectory,
    ) -> BnbResult<Option<Incumbent<T>>> {
        validation::check_dimensions(problem, trajectory)?;
        match validation::validate(problem, trajectory) {
            Ok(()) => {
                let objective = objective::evaluate(problem, trajectory);
                Ok(Some(Incumbent::new(objective, trajectory.clone())))
            }
            Err(violation) => {
                warn!("Ignoring infeasible warm start: {}", violation);
                Ok(None)
            }
        }
    }

    fn run<E, S>(
        &mut self,
        problem: &Problem<T>,
        evaluator: &E,
        frontier: &mut dyn Frontier<T>,
        monitor: &mut S,
        incumbent: Option<Incumbent<T>>,
    ) -> BnbResult<BnbSolverOutcome<T>>
    where
        E: BoundEvaluator<T>,
        S: TreeSearchMonitor<T>,
    {
        let session = BnbSearchSession::new(self, problem, evaluator, frontier, monitor, incumbent);
        session.run()
    }

    /// Clears the per-run state but keeps the allocations.
    #[inline]
    fn reset(&mut self) {
        self.arena.clear();
        self.children.clear();
        self.scratch.clear();
    }
}

enum Termination {
    Exhausted,
    Stopped(StopReason),
}

/// The state of a single search run.
struct BnbSearchSession<'a, T, E, S>
where
    T: SolverFloat,
{
    solver: &'a mut BnbSolver<T>,
    problem: &'a Problem<T>,
    checker: ConstraintChecker<'a, T>,
    evaluator: &'a E,
    frontier: &'a mut dyn Frontier<T>,
    monitor: &'a mut S,
    incumbent: Option<Incumbent<T>>,
    best_objective: T,
    next_id: u64,
    stats: BnbSolverStatistics<T>,
    start_time: Instant,
}

impl<'a, T, E, S> BnbSearchSession<'a, T, E, S>
where
    T: SolverFloat,
    E: BoundEvaluator<T>,
    S: TreeSearchMonitor<T>,
{
    fn new(
        solver: &'a mut BnbSolver<T>,
        problem: &'a Problem<T>,
        evaluator: &'a E,
        frontier: &'a mut dyn Frontier<T>,
        monitor: &'a mut S,
        incumbent: Option<Incumbent<T>>,
    ) -> Self {
        solver.reset();
        frontier.clear();

        let best_objective = match &incumbent {
            Some(incumbent) => {
                frontier.on_incumbent_updated(incumbent.objective());
                incumbent.objective()
            }
            None => T::infinity(),
        };

        let mut stats = BnbSolverStatistics::default();
        if let Some(incumbent) = &incumbent {
            stats.set_incumbent_objective(incumbent.objective());
        }

        Self {
            solver,
            problem,
            checker: ConstraintChecker::new(problem),
            evaluator,
            frontier,
            monitor,
            incumbent,
            best_objective,
            next_id: 0,
            stats,
            start_time: Instant::now(),
        }
    }

    fn run(mut self) -> BnbResult<BnbSolverOutcome<T>> {
        self.monitor.on_enter_search(self.problem, &self.stats);
        self.initialize();

        let termination = loop {
            self.monitor.on_step(&self.stats);

            if self.frontier.is_empty() {
                break Termination::Exhausted;
            }
            if let SearchCommand::Terminate(reason) = self.monitor.search_command(&self.stats) {
                break Termination::Stopped(reason);
            }

            let Some(node) = self.frontier.pop() else {
                break Termination::Exhausted;
            };
            self.stats.on_iteration();
            self.process(node)?;
        };

        self.stats.set_open_nodes(self.frontier.len());
        self.stats.set_deferred_nodes(self.frontier.deferred_count());
        self.stats.set_total_time(self.start_time.elapsed());
        Ok(self.finalize(termination))
    }

    fn finalize(self, termination: Termination) -> BnbSolverOutcome<T> {
        let outcome = match (termination, self.incumbent) {
            (Termination::Exhausted, Some(incumbent)) => {
                BnbSolverOutcome::optimal(incumbent, self.stats)
            }
            (Termination::Exhausted, None) => BnbSolverOutcome::infeasible(self.stats),
            (Termination::Stopped(reason), incumbent) => {
                BnbSolverOutcome::aborted(incumbent, reason, self.stats)
            }
        };
        self.monitor
            .on_exit_search(outcome.status(), outcome.statistics());
        outcome
    }

    /// Creates the root node and hands it to the frontier.
    fn initialize(&mut self) {
        let root = SearchNode::root(self.problem, self.allocate_id());
        self.stats.on_node_created(0);
        self.monitor.on_node_created(&root, &self.stats);
        self.solver.children.push(root);
        self.frontier.push_children(&mut self.solver.children);
        self.stats.on_frontier_size(self.frontier.len());
    }

    #[inline]
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    fn prunes(&self, bound: T) -> bool {
        self.solver.bound_pruning && bound >= self.best_objective
    }

    #[inline]
    fn close(&mut self, node: SearchNode<T>, fate: NodeFate) {
        self.monitor.on_node_closed(&node, fate, &self.stats);
        if let Some(path) = node.path() {
            self.solver.arena.release(path);
        }
    }

    /// Expands `node` into its feasible children.
    fn process(&mut self, node: SearchNode<T>) -> BnbResult<()> {
        self.monitor.on_node_selected(&node, &self.stats);

        // The incumbent may have improved since the node was pushed.
        if self.prunes(node.bound()) {
            self.stats.on_pruning_bound();
            self.close(node, NodeFate::Fathomed);
            return Ok(());
        }

        let mut feasible = 0usize;
        let mut best_child_bound = T::infinity();

        for control in self.problem.controls() {
            if let Err(kind) = self.checker.check(&node, control) {
                self.stats.on_infeasible_candidate();
                self.monitor
                    .on_candidate_rejected(&node, control, kind, &self.stats);
                continue;
            }
            feasible += 1;

            let path = self.solver.arena.push(node.path(), control)?;
            let id = self.allocate_id();
            let child = node.extend(self.problem, self.evaluator, control, id, path);
            debug_assert!(
                child.bound() >= node.bound(),
                "bound decreased from {} to {} when extending {}",
                node.bound(),
                child.bound(),
                node
            );

            self.stats.on_node_created(child.depth());
            self.monitor.on_node_created(&child, &self.stats);
            best_child_bound = best_child_bound.min(child.bound());

            if self.prunes(child.bound()) {
                self.stats.on_pruning_bound();
                self.close(child, NodeFate::Fathomed);
                continue;
            }
            if child.is_leaf(self.problem) {
                self.accept_leaf(child)?;
                continue;
            }
            if self.solver.bound_pruning
                && self.prunes(self.evaluator.lookahead(self.problem, &child))
            {
                self.stats.on_pruning_lookahead();
                self.close(child, NodeFate::Fathomed);
                continue;
            }
            self.solver.children.push(child);
        }

        if node.depth() == 0 && feasible > 0 {
            self.stats.set_root_bound(best_child_bound);
        }

        let fate = if feasible == 0 {
            NodeFate::Infeasible
        } else {
            NodeFate::Branched
        };
        self.close(node, fate);

        self.frontier.push_children(&mut self.solver.children);
        self.stats.on_frontier_size(self.frontier.len());
        Ok(())
    }

    /// Installs `leaf` as the incumbent if it strictly improves on it.
    fn accept_leaf(&mut self, leaf: SearchNode<T>) -> BnbResult<()> {
        let objective = leaf.bound();
        if objective >= self.best_objective {
            self.close(leaf, NodeFate::Fathomed);
            return Ok(());
        }

        let trajectory = extract_trajectory(
            &self.solver.arena,
            leaf.path(),
            self.problem.num_controls(),
            self.problem.num_intervals(),
            &mut self.solver.scratch,
        )?;

        let recomputed = objective::evaluate(self.problem, &trajectory);
        if !approx_eq(
            recomputed,
            objective,
            constant(LEAF_CONSISTENCY_TOLERANCE),
        ) {
            return Err(BnbError::Internal(format!(
                "incremental objective {} of leaf {} disagrees with recomputed objective {}",
                objective,
                leaf.id(),
                recomputed
            )));
        }
        debug_assert!(
            validation::validate(self.problem, &trajectory).is_ok(),
            "accepted leaf {} violates a constraint",
            leaf.id()
        );

        self.best_objective = objective;
        self.frontier.on_incumbent_updated(objective);
        self.stats.on_solution_found(objective);
        self.monitor
            .on_solution_found(&trajectory, objective, &self.stats);
        self.incumbent = Some(Incumbent::new(objective, trajectory));
        self.close(leaf, NodeFate::Solution);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{monitor::no_op::NoOperationMonitor, result::SolverStatus};
    use cia_model::problem::ProblemBuilder;

    fn ci(i: usize) -> ControlIndex {
        ControlIndex::new(i)
    }

    fn alternating_problem() -> Problem<f64> {
        ProblemBuilder::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![vec![0.5; 4], vec![0.5; 4]],
        )
        .build()
        .unwrap()
    }

    #[test]
    fn test_solves_small_instance_to_optimality() {
        let problem = alternating_problem();
        let mut solver = BnbSolver::new();
        let outcome = solver
            .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
            .unwrap();

        assert_eq!(outcome.status(), SolverStatus::Optimal);
        assert_eq!(outcome.objective(), Some(0.5));
        let trajectory = outcome.trajectory().unwrap();
        assert!(validation::validate(&problem, trajectory).is_ok());
        assert_eq!(objective::evaluate(&problem, trajectory), 0.5);
        assert!(outcome.statistics().iterations > 0);
        assert!(outcome.statistics().solutions_found >= 1);
    }

    #[test]
    fn test_all_strategies_agree() {
        let problem = alternating_problem();
        let mut solver = BnbSolver::preallocated(2, 4);
        for strategy in [
            FrontierStrategy::DepthFirst,
            FrontierStrategy::BestFirst,
            FrontierStrategy::DynamicBacktracking { beta: 0.5 },
            FrontierStrategy::DynamicBacktracking { beta: 1.0 },
        ] {
            let outcome = solver
                .solve(&problem, strategy, NoOperationMonitor::new())
                .unwrap();
            assert_eq!(outcome.status(), SolverStatus::Optimal, "{}", strategy);
            assert_eq!(outcome.objective(), Some(0.5), "{}", strategy);
        }
    }

    #[test]
    fn test_infeasible_instance() {
        let mut builder = ProblemBuilder::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![vec![0.5; 3], vec![0.5; 3]],
        );
        builder
            .set_valid_controls(vec![vec![true, false, true], vec![true, false, true]]);
        let problem = builder.build().unwrap();

        let outcome = BnbSolver::new()
            .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(outcome.status(), SolverStatus::Infeasible);
        assert!(outcome.trajectory().is_none());
        assert!(outcome.statistics().infeasible_candidates > 0);
    }

    #[test]
    fn test_warm_start_seeds_incumbent() {
        let problem = alternating_problem();
        let warm = BinaryTrajectory::new(2, vec![ci(0), ci(1), ci(0), ci(1)]).unwrap();

        let outcome = BnbSolver::new()
            .solve_with_warm_start(
                &problem,
                FrontierStrategy::DepthFirst,
                Some(&warm),
                NoOperationMonitor::new(),
            )
            .unwrap();
        // The warm start is already optimal; ties never replace it.
        assert_eq!(outcome.status(), SolverStatus::Optimal);
        assert_eq!(outcome.trajectory(), Some(&warm));
        assert_eq!(outcome.statistics().solutions_found, 0);
    }

    #[test]
    fn test_warm_start_shape_mismatch_is_configuration_error() {
        let problem = alternating_problem();
        let warm = BinaryTrajectory::new(2, vec![ci(0), ci(1)]).unwrap();
        let err = BnbSolver::new()
            .solve_with_warm_start(
                &problem,
                FrontierStrategy::DepthFirst,
                Some(&warm),
                NoOperationMonitor::new(),
            )
            .unwrap_err();
        assert!(matches!(err, BnbError::Configuration(_)));
    }

    #[test]
    fn test_infeasible_warm_start_is_ignored() {
        let mut builder = ProblemBuilder::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![vec![0.5; 4], vec![0.5; 4]],
        );
        builder.set_max_switches(vec![1, 1]);
        let problem = builder.build().unwrap();
        let warm = BinaryTrajectory::new(2, vec![ci(0), ci(1), ci(0), ci(1)]).unwrap();

        let outcome = BnbSolver::new()
            .solve_with_warm_start(
                &problem,
                FrontierStrategy::BestFirst,
                Some(&warm),
                NoOperationMonitor::new(),
            )
            .unwrap();
        assert_eq!(outcome.status(), SolverStatus::Optimal);
        assert_ne!(outcome.trajectory(), Some(&warm));
        assert!(validation::validate(&problem, outcome.trajectory().unwrap()).is_ok());
    }

    #[test]
    fn test_invalid_beta_is_rejected() {
        let problem = alternating_problem();
        let err = BnbSolver::new()
            .solve(
                &problem,
                FrontierStrategy::DynamicBacktracking { beta: 0.0 },
                NoOperationMonitor::new(),
            )
            .unwrap_err();
        assert!(matches!(err, BnbError::Configuration(_)));
    }

    #[test]
    fn test_solver_is_reusable() {
        let problem = alternating_problem();
        let mut solver = BnbSolver::new();
        let first = solver
            .solve(&problem, FrontierStrategy::BestFirst, NoOperationMonitor::new())
            .unwrap();
        let second = solver
            .solve(&problem, FrontierStrategy::BestFirst, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(first.trajectory(), second.trajectory());
        assert_eq!(first.statistics().iterations, second.statistics().iterations);
        assert!(solver.allocated_memory_bytes() > 0);
    }

    #[test]
    fn test_without_pruning_finds_same_optimum() {
        let problem = alternating_problem();
        let pruned = BnbSolver::new()
            .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
            .unwrap();
        let mut exhaustive = BnbSolver::new().with_bound_pruning(false);
        assert!(!exhaustive.bound_pruning());
        let full = exhaustive
            .solve(&problem, FrontierStrategy::DepthFirst, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(pruned.objective(), full.objective());
        assert_eq!(full.statistics().prunings(), 0);
        assert!(full.statistics().iterations >= pruned.statistics().iterations);
    }
}
