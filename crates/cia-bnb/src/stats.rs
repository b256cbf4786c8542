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

use cia_model::num::SolverFloat;
use std::time::Duration;

/// Statistics collected during a branch-and-bound search.
#[derive(Debug, Clone, PartialEq)]
pub struct BnbSolverStatistics<T> {
    /// Nodes popped from the frontier.
    pub iterations: u64,
    /// Nodes created by extending a feasible candidate.
    pub nodes_created: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Candidates rejected by the constraint checker.
    pub infeasible_candidates: u64,
    /// Nodes discarded because their bound reached the incumbent.
    pub prunings_bound: u64,
    /// Nodes discarded by the lookahead bound of frozen controls.
    pub prunings_lookahead: u64,
    /// Improving leaves accepted as incumbent.
    pub solutions_found: u64,
    /// Nodes the frontier took out of depth-first order.
    pub deferred_nodes: u64,
    /// Open nodes in the frontier; after the search, the ones left behind.
    pub open_nodes: u64,
    /// Largest number of open nodes at any time.
    pub frontier_peak: u64,
    /// Bound of the best node after the root's expansion.
    pub root_bound: T,
    /// Objective of the incumbent, including a warm start.
    pub incumbent_objective: Option<T>,
    /// Wall-clock time spent in the search.
    pub time_total: Duration,
}

impl<T> Default for BnbSolverStatistics<T>
where
    T: SolverFloat,
{
    fn default() -> Self {
        Self {
            iterations: 0,
            nodes_created: 0,
            max_depth: 0,
            infeasible_candidates: 0,
            prunings_bound: 0,
            prunings_lookahead: 0,
            solutions_found: 0,
            deferred_nodes: 0,
            open_nodes: 0,
            frontier_peak: 0,
            root_bound: T::zero(),
            incumbent_objective: None,
            time_total: Duration::ZERO,
        }
    }
}

impl<T> BnbSolverStatistics<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn on_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add(1);
    }

    #[inline]
    pub fn on_node_created(&mut self, depth: usize) {
        self.nodes_created = self.nodes_created.saturating_add(1);
        self.max_depth = self.max_depth.max(depth as u64);
    }

    #[inline]
    pub fn on_infeasible_candidate(&mut self) {
        self.infeasible_candidates = self.infeasible_candidates.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_lookahead(&mut self) {
        self.prunings_lookahead = self.prunings_lookahead.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self, objective: T) {
        self.solutions_found = self.solutions_found.saturating_add(1);
        self.incumbent_objective = Some(objective);
    }

    #[inline]
    pub fn set_incumbent_objective(&mut self, objective: T) {
        self.incumbent_objective = Some(objective);
    }

    #[inline]
    pub fn on_frontier_size(&mut self, open: usize) {
        self.open_nodes = open as u64;
        self.frontier_peak = self.frontier_peak.max(self.open_nodes);
    }

    #[inline]
    pub fn set_open_nodes(&mut self, open: usize) {
        self.open_nodes = open as u64;
    }

    #[inline]
    pub fn set_deferred_nodes(&mut self, deferred: u64) {
        self.deferred_nodes = deferred;
    }

    #[inline]
    pub fn set_root_bound(&mut self, bound: T) {
        self.root_bound = bound;
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Returns the total number of pruned nodes.
    #[inline]
    pub fn prunings(&self) -> u64 {
        self.prunings_bound.saturating_add(self.prunings_lookahead)
    }
}

impl<T> std::fmt::Display for BnbSolverStatistics<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CIA-BnB Solver Statistics:")?;
        writeln!(f, "  Iterations:            {}", self.iterations)?;
        writeln!(f, "  Nodes created:         {}", self.nodes_created)?;
        writeln!(f, "  Max depth reached:     {}", self.max_depth)?;
        writeln!(f, "  Infeasible candidates: {}", self.infeasible_candidates)?;
        writeln!(f, "  Prunings (bound):      {}", self.prunings_bound)?;
        writeln!(f, "  Prunings (lookahead):  {}", self.prunings_lookahead)?;
        writeln!(f, "  Solutions found:       {}", self.solutions_found)?;
        writeln!(f, "  Deferred nodes:        {}", self.deferred_nodes)?;
        writeln!(f, "  Open nodes:            {}", self.open_nodes)?;
        writeln!(f, "  Frontier peak:         {}", self.frontier_peak)?;
        writeln!(f, "  Root bound:            {}", self.root_bound)?;
        match &self.incumbent_objective {
            Some(objective) => writeln!(f, "  Incumbent objective:   {}", objective)?,
            None => writeln!(f, "  Incumbent objective:   none")?,
        }
        writeln!(f, "  Total time:            {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = BnbSolverStatistics::<f64>::default();
        stats.on_iteration();
        stats.on_node_created(3);
        stats.on_node_created(1);
        stats.on_pruning_bound();
        stats.on_pruning_lookahead();
        stats.on_frontier_size(7);
        stats.on_frontier_size(2);
        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.nodes_created, 2);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.prunings(), 2);
        assert_eq!(stats.frontier_peak, 7);
        assert_eq!(stats.open_nodes, 2);
    }

    #[test]
    fn test_solutions_track_incumbent_objective() {
        let mut stats = BnbSolverStatistics::<f64>::default();
        assert_eq!(stats.incumbent_objective, None);
        stats.set_incumbent_objective(3.0);
        assert_eq!(stats.solutions_found, 0);
        stats.on_solution_found(1.5);
        assert_eq!(stats.solutions_found, 1);
        assert_eq!(stats.incumbent_objective, Some(1.5));
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = BnbSolverStatistics::<f64> {
            iterations: u64::MAX,
            ..Default::default()
        };
        stats.on_iteration();
        assert_eq!(stats.iterations, u64::MAX);
    }

    #[test]
    fn test_display_lists_counters() {
        let stats = BnbSolverStatistics::<f64>::default();
        let text = stats.to_string();
        assert!(text.starts_with("CIA-BnB Solver Statistics:"));
        assert!(text.contains("Prunings (lookahead):  0"));
    }
}
