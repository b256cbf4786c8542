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

//! Search nodes.
//!
//! A node stands for the prefix assignment of the intervals `[0, depth)`. It
//! carries the sufficient statistics to continue the search without
//! rescanning that prefix: accumulated deviations, per-row absolute sums,
//! switch counts, idle time since the last deactivation, cumulative up time,
//! and the state of the current run. The prefix itself lives in the
//! [`PathArena`](crate::path::PathArena); the node only holds a handle.
//!
//! Nodes are plain values. The frontier owns them; once popped and expanded
//! they are dropped and their path handle is released.

use crate::{eval::evaluator::BoundEvaluator, path::PathHandle};
use cia_model::{
    index::{ControlIndex, IntervalIndex},
    num::SolverFloat,
    objective::deviation_step,
    problem::Problem,
};
use smallvec::{SmallVec, smallvec};

/// Number of controls stored inline before the per-control vectors spill to the heap.
pub const INLINE_CONTROLS: usize = 4;

type PerControl<V> = SmallVec<V, INLINE_CONTROLS>;

/// A node of the branch-and-bound tree.
#[derive(Clone, Debug)]
pub struct SearchNode<T> {
    id: u64,
    parent_id: Option<u64>,
    depth: usize,
    bound: T,
    path: Option<PathHandle>,
    last_active: Option<ControlIndex>,
    run_duration: T,
    run_exempt: bool,
    deviations: PerControl<T>,
    row_sums: PerControl<T>,
    switches: PerControl<u32>,
    idle: PerControl<Option<T>>,
    up_time: PerControl<T>,
}

impl<T> SearchNode<T>
where
    T: SolverFloat,
{
    /// Creates the root node: empty prefix, zero accumulators, and the
    /// pre-horizon state as the last active control.
    pub fn root(problem: &Problem<T>, id: u64) -> Self {
        let num_controls = problem.num_controls();
        let pre_state = problem.pre_state();
        Self {
            id,
            parent_id: None,
            depth: 0,
            bound: T::zero(),
            path: None,
            last_active: pre_state,
            run_duration: T::zero(),
            run_exempt: pre_state.is_some(),
            deviations: smallvec![T::zero(); num_controls],
            row_sums: smallvec![T::zero(); num_controls],
            switches: smallvec![0u32; num_controls],
            idle: smallvec![None; num_controls],
            up_time: smallvec![T::zero(); num_controls],
        }
    }

    /// Creates the child that activates `control` in the next interval.
    ///
    /// Feasibility is not checked here; the constraint checker must have
    /// accepted `control` for this node.
    pub fn extend<E>(
        &self,
        problem: &Problem<T>,
        evaluator: &E,
        control: ControlIndex,
        id: u64,
        path: PathHandle,
    ) -> Self
    where
        E: BoundEvaluator<T> + ?Sized,
    {
        debug_assert!(
            self.depth < problem.num_intervals(),
            "called `SearchNode::extend` on a leaf at depth {}",
            self.depth
        );

        let interval = IntervalIndex::new(self.depth);
        let duration = problem.interval_duration(interval);
        let c = control.get();

        let mut child = Self {
            id,
            parent_id: Some(self.id),
            depth: self.depth + 1,
            bound: self.bound,
            path: Some(path),
            last_active: Some(control),
            run_duration: self.run_duration,
            run_exempt: self.run_exempt,
            deviations: self.deviations.clone(),
            row_sums: self.row_sums.clone(),
            switches: self.switches.clone(),
            idle: self.idle.clone(),
            up_time: self.up_time.clone(),
        };

        match self.last_active {
            Some(last) if last == control => {
                child.run_duration = self.run_duration + duration;
            }
            Some(last) => {
                child.switches[last.get()] = child.switches[last.get()].saturating_add(1);
                child.switches[c] = child.switches[c].saturating_add(1);
                child.idle[last.get()] = Some(T::zero());
                child.run_duration = duration;
                child.run_exempt = false;
            }
            None => {
                child.run_duration = duration;
                child.run_exempt = false;
            }
        }

        child.idle[c] = None;
        for (i, idle) in child.idle.iter_mut().enumerate() {
            if i != c
                && let Some(t) = idle
            {
                *t = *t + duration;
            }
        }
        child.up_time[c] = child.up_time[c] + duration;

        for (i, deviation) in child.deviations.iter_mut().enumerate() {
            let relaxed = problem.relaxed_value(ControlIndex::new(i), interval);
            *deviation = deviation_step(*deviation, duration, relaxed, i == c);
        }

        child.bound = evaluator.bound(self.bound, &child.deviations, &mut child.row_sums);
        child
    }

    /// Returns the sequence number assigned at creation.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn parent_id(&self) -> Option<u64> {
        self.parent_id
    }

    /// Returns the number of assigned intervals; also the next interval to decide.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_leaf(&self, problem: &Problem<T>) -> bool {
        self.depth == problem.num_intervals()
    }

    /// Returns the lower bound on the objective of any completion.
    #[inline]
    pub fn bound(&self) -> T {
        self.bound
    }

    #[inline]
    pub fn path(&self) -> Option<PathHandle> {
        self.path
    }

    /// Returns the control active in the last assigned interval, or the
    /// pre-horizon state at the root.
    #[inline]
    pub fn last_active(&self) -> Option<ControlIndex> {
        self.last_active
    }

    /// Returns the duration of the current run of `last_active`.
    #[inline]
    pub fn run_duration(&self) -> T {
        self.run_duration
    }

    /// Returns `true` if the current run continues the pre-horizon state.
    #[inline]
    pub fn run_exempt(&self) -> bool {
        self.run_exempt
    }

    #[inline]
    pub fn deviations(&self) -> &[T] {
        &self.deviations
    }

    #[inline]
    pub fn deviation(&self, control: ControlIndex) -> T {
        self.deviations[control.get()]
    }

    /// Returns the running sums `Σ_j |acc[i][j]|` (maintained by the row-sum evaluator).
    #[inline]
    pub fn row_sums(&self) -> &[T] {
        &self.row_sums
    }

    #[inline]
    pub fn switches(&self, control: ControlIndex) -> u32 {
        self.switches[control.get()]
    }

    /// Returns the largest switch count over all controls.
    #[inline]
    pub fn max_switch_count(&self) -> u32 {
        self.switches.iter().copied().max().unwrap_or(0)
    }

    /// Returns the time since `control` was last deactivated, `None` if it
    /// is active or has never been active.
    #[inline]
    pub fn idle_time(&self, control: ControlIndex) -> Option<T> {
        self.idle[control.get()]
    }

    #[inline]
    pub fn up_time(&self, control: ControlIndex) -> T {
        self.up_time[control.get()]
    }

    /// Returns `true` if `control` has used up its switch budget and can no
    /// longer change state.
    #[inline]
    pub fn is_frozen(&self, problem: &Problem<T>, control: ControlIndex) -> bool {
        self.last_active.is_some() && self.switches[control.get()] >= problem.max_switches(control)
    }
}

impl<T> std::fmt::Display for SearchNode<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.last_active {
            Some(c) => write!(
                f,
                "SearchNode(id: {}, depth: {}, bound: {}, active: {})",
                self.id, self.depth, self.bound, c
            ),
            None => write!(
                f,
                "SearchNode(id: {}, depth: {}, bound: {}, active: none)",
                self.id, self.depth, self.bound
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval::max_norm::MaxNormEvaluator, path::PathArena};
    use cia_model::problem::ProblemBuilder;

    fn ci(i: usize) -> ControlIndex {
        ControlIndex::new(i)
    }

    fn problem(pre_state: Option<ControlIndex>) -> Problem<f64> {
        let mut builder = ProblemBuilder::new(
            vec![0.0, 1.0, 3.0, 4.0],
            vec![vec![0.25, 0.5, 1.0], vec![0.75, 0.5, 0.0]],
        );
        builder.set_pre_state(pre_state);
        builder.build().unwrap()
    }

    fn walk(problem: &Problem<f64>, controls: &[usize]) -> SearchNode<f64> {
        let mut arena = PathArena::new();
        let evaluator = MaxNormEvaluator::new();
        let mut node = SearchNode::root(problem, 0);
        for (k, &c) in controls.iter().enumerate() {
            let path = arena.push(node.path(), ci(c)).unwrap();
            node = node.extend(problem, &evaluator, ci(c), k as u64 + 1, path);
        }
        node
    }

    #[test]
    fn test_root_state() {
        let p = problem(Some(ci(1)));
        let root = SearchNode::root(&p, 0);
        assert_eq!(root.depth(), 0);
        assert_eq!(root.bound(), 0.0);
        assert_eq!(root.last_active(), Some(ci(1)));
        assert!(root.run_exempt());
        assert_eq!(root.path(), None);
        assert_eq!(root.parent_id(), None);
    }

    #[test]
    fn test_continuing_a_run() {
        let p = problem(None);
        let node = walk(&p, &[0, 0]);
        assert_eq!(node.depth(), 2);
        assert_eq!(node.run_duration(), 3.0);
        assert_eq!(node.up_time(ci(0)), 3.0);
        assert_eq!(node.switches(ci(0)), 0);
        assert_eq!(node.idle_time(ci(1)), None);
        assert_eq!(node.deviations(), &[-1.75, 1.75]);
        assert_eq!(node.bound(), 1.75);
        assert_eq!(node.parent_id(), Some(1));
    }

    #[test]
    fn test_switch_updates_both_controls() {
        let p = problem(None);
        let node = walk(&p, &[0, 1, 1]);
        assert_eq!(node.switches(ci(0)), 1);
        assert_eq!(node.switches(ci(1)), 1);
        assert_eq!(node.max_switch_count(), 1);
        assert_eq!(node.idle_time(ci(0)), Some(3.0));
        assert_eq!(node.run_duration(), 3.0);
        assert!(!node.run_exempt());
        assert!(node.is_leaf(&p));
    }

    #[test]
    fn test_pre_state_boundary_counts_as_switch() {
        let p = problem(Some(ci(1)));
        let node = walk(&p, &[0]);
        assert_eq!(node.switches(ci(0)), 1);
        assert_eq!(node.switches(ci(1)), 1);
        assert_eq!(node.idle_time(ci(1)), Some(1.0));

        let node = walk(&p, &[1]);
        assert_eq!(node.switches(ci(1)), 0);
        assert!(node.run_exempt());
        assert_eq!(node.run_duration(), 1.0);
    }

    #[test]
    fn test_frozen_controls() {
        let mut builder = ProblemBuilder::new(
            vec![0.0, 1.0, 2.0],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        );
        builder.set_max_switches(vec![0, 1]);
        let p = builder.build().unwrap();
        let root = SearchNode::root(&p, 0);
        assert!(!root.is_frozen(&p, ci(0)));

        let node = walk(&p, &[1]);
        assert!(node.is_frozen(&p, ci(0)));
        assert!(!node.is_frozen(&p, ci(1)));
    }
}
