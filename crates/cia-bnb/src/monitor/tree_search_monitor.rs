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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait for observing and controlling the
//! search. Callbacks follow the life of every node, and a monitor can stop
//! the search through `search_command`, which the engine polls once per
//! iteration before popping the next node.
//!
//! Lifecycle
//! - enter → (command → step → selected → {rejected | created → closed}*)* → exit
//! - every node that is created is eventually closed, unless the search
//!   stops while it is still open.

use crate::{
    node::SearchNode,
    result::{SolverStatus, StopReason},
    stats::BnbSolverStatistics,
};
use cia_model::{
    index::ControlIndex, num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory,
    validation::ConstraintKind,
};

/// The instruction a monitor gives the search.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(StopReason),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// How a node left the search.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NodeFate {
    /// The node was expanded and at least one child was feasible.
    Branched,
    /// The node's bound reached the incumbent.
    Fathomed,
    /// No control was feasible for the next interval.
    Infeasible,
    /// The node is a leaf that became the incumbent.
    Solution,
}

impl std::fmt::Display for NodeFate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeFate::Branched => write!(f, "Branched"),
            NodeFate::Fathomed => write!(f, "Fathomed"),
            NodeFate::Infeasible => write!(f, "Infeasible"),
            NodeFate::Solution => write!(f, "Solution"),
        }
    }
}

/// Trait for monitoring and controlling the search process of the solver.
pub trait TreeSearchMonitor<T>
where
    T: SolverFloat,
{
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called when the search starts.
    fn on_enter_search(&mut self, problem: &Problem<T>, statistics: &BnbSolverStatistics<T>);

    /// Called when the search ends.
    fn on_exit_search(&mut self, status: SolverStatus, statistics: &BnbSolverStatistics<T>);

    /// Called once per iteration to determine the next action of the search.
    fn search_command(&mut self, _statistics: &BnbSolverStatistics<T>) -> SearchCommand {
        SearchCommand::Continue
    }

    /// Called at the top of every iteration.
    fn on_step(&mut self, _statistics: &BnbSolverStatistics<T>) {}

    /// Called when a node enters the tree.
    fn on_node_created(&mut self, _node: &SearchNode<T>, _statistics: &BnbSolverStatistics<T>) {}

    /// Called when a node is popped from the frontier.
    fn on_node_selected(&mut self, _node: &SearchNode<T>, _statistics: &BnbSolverStatistics<T>) {}

    /// Called when a node leaves the tree.
    fn on_node_closed(
        &mut self,
        _node: &SearchNode<T>,
        _fate: NodeFate,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }

    /// Called when the constraint checker rejects `control` below `node`.
    fn on_candidate_rejected(
        &mut self,
        _node: &SearchNode<T>,
        _control: ControlIndex,
        _kind: ConstraintKind,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }

    /// Called when a new incumbent is accepted.
    fn on_solution_found(
        &mut self,
        trajectory: &BinaryTrajectory,
        objective: T,
        statistics: &BnbSolverStatistics<T>,
    );
}

impl<T, M> TreeSearchMonitor<T> for &mut M
where
    T: SolverFloat,
    M: TreeSearchMonitor<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_enter_search(&mut self, problem: &Problem<T>, statistics: &BnbSolverStatistics<T>) {
        (**self).on_enter_search(problem, statistics);
    }

    fn on_exit_search(&mut self, status: SolverStatus, statistics: &BnbSolverStatistics<T>) {
        (**self).on_exit_search(status, statistics);
    }

    fn search_command(&mut self, statistics: &BnbSolverStatistics<T>) -> SearchCommand {
        (**self).search_command(statistics)
    }

    fn on_step(&mut self, statistics: &BnbSolverStatistics<T>) {
        (**self).on_step(statistics);
    }

    fn on_node_created(&mut self, node: &SearchNode<T>, statistics: &BnbSolverStatistics<T>) {
        (**self).on_node_created(node, statistics);
    }

    fn on_node_selected(&mut self, node: &SearchNode<T>, statistics: &BnbSolverStatistics<T>) {
        (**self).on_node_selected(node, statistics);
    }

    fn on_node_closed(
        &mut self,
        node: &SearchNode<T>,
        fate: NodeFate,
        statistics: &BnbSolverStatistics<T>,
    ) {
        (**self).on_node_closed(node, fate, statistics);
    }

    fn on_candidate_rejected(
        &mut self,
        node: &SearchNode<T>,
        control: ControlIndex,
        kind: ConstraintKind,
        statistics: &BnbSolverStatistics<T>,
    ) {
        (**self).on_candidate_rejected(node, control, kind, statistics);
    }

    fn on_solution_found(
        &mut self,
        trajectory: &BinaryTrajectory,
        objective: T,
        statistics: &BnbSolverStatistics<T>,
    ) {
        (**self).on_solution_found(trajectory, objective, statistics);
    }
}

impl<T> std::fmt::Debug for dyn TreeSearchMonitor<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<T> std::fmt::Display for dyn TreeSearchMonitor<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}
