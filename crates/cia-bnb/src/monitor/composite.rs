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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards
//! every event to its children, so budgets, logging and tracing can be
//! combined without coupling them to the engine.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.
//! - Other callbacks always fan out to all children.

use crate::{
    monitor::tree_search_monitor::{NodeFate, SearchCommand, TreeSearchMonitor},
    node::SearchNode,
    result::SolverStatus,
    stats::BnbSolverStatistics,
};
use cia_model::{
    index::ControlIndex, num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory,
    validation::ConstraintKind,
};

/// Fans every search event out to an ordered list of child monitors.
pub struct CompositeTreeSearchMonitor<'a, T>
where
    T: SolverFloat,
{
    children: Vec<Box<dyn TreeSearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeTreeSearchMonitor<'a, T>
where
    T: SolverFloat,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeTreeSearchMonitor<'a, T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            children: Vec::with_capacity(capacity),
        }
    }

    /// Appends a monitor; it is consulted after all previously added ones.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T> + 'a,
    {
        self.children.push(Box::new(monitor));
    }

    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<T> + 'a>) {
        self.children.push(monitor);
    }

    /// Returns the names of the child monitors in dispatch order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.iter().map(|child| child.name())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    fn broadcast<F>(&mut self, mut event: F)
    where
        F: FnMut(&mut (dyn TreeSearchMonitor<T> + 'a)),
    {
        for child in self.children.iter_mut() {
            event(child.as_mut());
        }
    }
}

impl<'a, T> FromIterator<Box<dyn TreeSearchMonitor<T> + 'a>> for CompositeTreeSearchMonitor<'a, T>
where
    T: SolverFloat,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TreeSearchMonitor<T> + 'a>>,
    {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> std::fmt::Debug for CompositeTreeSearchMonitor<'a, T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<'a, T> TreeSearchMonitor<T> for CompositeTreeSearchMonitor<'a, T>
where
    T: SolverFloat,
{
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, problem: &Problem<T>, statistics: &BnbSolverStatistics<T>) {
        self.broadcast(|m| m.on_enter_search(problem, statistics));
    }

    fn on_exit_search(&mut self, status: SolverStatus, statistics: &BnbSolverStatistics<T>) {
        self.broadcast(|m| m.on_exit_search(status, statistics));
    }

    fn search_command(&mut self, statistics: &BnbSolverStatistics<T>) -> SearchCommand {
        self.children
            .iter_mut()
            .map(|child| child.search_command(statistics))
            .find(|command| *command != SearchCommand::Continue)
            .unwrap_or(SearchCommand::Continue)
    }

    fn on_step(&mut self, statistics: &BnbSolverStatistics<T>) {
        self.broadcast(|m| m.on_step(statistics));
    }

    fn on_node_created(&mut self, node: &SearchNode<T>, statistics: &BnbSolverStatistics<T>) {
        self.broadcast(|m| m.on_node_created(node, statistics));
    }

    fn on_node_selected(&mut self, node: &SearchNode<T>, statistics: &BnbSolverStatistics<T>) {
        self.broadcast(|m| m.on_node_selected(node, statistics));
    }

    fn on_node_closed(
        &mut self,
        node: &SearchNode<T>,
        fate: NodeFate,
        statistics: &BnbSolverStatistics<T>,
    ) {
        self.broadcast(|m| m.on_node_closed(node, fate, statistics));
    }

    fn on_candidate_rejected(
        &mut self,
        node: &SearchNode<T>,
        control: ControlIndex,
        kind: ConstraintKind,
        statistics: &BnbSolverStatistics<T>,
    ) {
        self.broadcast(|m| m.on_candidate_rejected(node, control, kind, statistics));
    }

    fn on_solution_found(
        &mut self,
        trajectory: &BinaryTrajectory,
        objective: T,
        statistics: &BnbSolverStatistics<T>,
    ) {
        self.broadcast(|m| m.on_solution_found(trajectory, objective, statistics));
    }
}
