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

use crate::frontier::{
    Frontier, bfs::BestFirstFrontier, dbt::DynamicBacktrackingFrontier, dfs::DepthFirstFrontier,
};
use cia_model::{error::ConfigurationError, num::SolverFloat};

/// Default aggressiveness of dynamic backtracking.
pub const DEFAULT_DBT_BETA: f64 = 0.5;

/// The exploration order of the search.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum FrontierStrategy {
    /// Depth-first with greedy child ordering (`dfs`).
    #[default]
    DepthFirst,
    /// Best-bound-first (`bfs`).
    BestFirst,
    /// Depth-first with deferral of unpromising children (`dbt`).
    DynamicBacktracking { beta: f64 },
}

impl FrontierStrategy {
    /// Returns the short name used in configuration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FrontierStrategy::DepthFirst => "dfs",
            FrontierStrategy::BestFirst => "bfs",
            FrontierStrategy::DynamicBacktracking { .. } => "dbt",
        }
    }

    /// Returns dynamic backtracking with the given `beta`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` unless `0 < beta <= 1`.
    pub fn dynamic_backtracking(beta: f64) -> Result<Self, ConfigurationError> {
        validate_beta(beta)?;
        Ok(FrontierStrategy::DynamicBacktracking { beta })
    }

    /// Checks the parameters of the strategy.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if `beta` lies outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            FrontierStrategy::DynamicBacktracking { beta } => validate_beta(beta),
            _ => Ok(()),
        }
    }

    /// Creates an empty frontier for this strategy.
    pub fn create<T>(&self) -> Box<dyn Frontier<T>>
    where
        T: SolverFloat,
    {
        match *self {
            FrontierStrategy::DepthFirst => Box::new(DepthFirstFrontier::new()),
            FrontierStrategy::BestFirst => Box::new(BestFirstFrontier::new()),
            FrontierStrategy::DynamicBacktracking { beta } => {
                Box::new(DynamicBacktrackingFrontier::new(beta))
            }
        }
    }
}

fn validate_beta(beta: f64) -> Result<(), ConfigurationError> {
    if beta > 0.0 && beta <= 1.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidOption {
            name: "dbt_beta".to_string(),
            reason: format!("must lie in (0, 1], got {}", beta),
        })
    }
}

impl std::fmt::Display for FrontierStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontierStrategy::DynamicBacktracking { beta } => write!(f, "dbt(beta = {})", beta),
            other => f.write_str(other.as_str()),
        }
    }
}

impl std::str::FromStr for FrontierStrategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dfs" => Ok(FrontierStrategy::DepthFirst),
            "bfs" => Ok(FrontierStrategy::BestFirst),
            "dbt" => Ok(FrontierStrategy::DynamicBacktracking {
                beta: DEFAULT_DBT_BETA,
            }),
            "btd" => Err(ConfigurationError::UnsupportedStrategy(s.trim().to_string())),
            other => Err(ConfigurationError::UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategies() {
        assert_eq!("dfs".parse::<FrontierStrategy>(), Ok(FrontierStrategy::DepthFirst));
        assert_eq!(" bfs ".parse::<FrontierStrategy>(), Ok(FrontierStrategy::BestFirst));
        assert_eq!(
            "dbt".parse::<FrontierStrategy>(),
            Ok(FrontierStrategy::DynamicBacktracking { beta: 0.5 })
        );
        assert_eq!(
            "btd".parse::<FrontierStrategy>(),
            Err(ConfigurationError::UnsupportedStrategy("btd".into()))
        );
        assert_eq!(
            "dijkstra".parse::<FrontierStrategy>(),
            Err(ConfigurationError::UnknownStrategy("dijkstra".into()))
        );
    }

    #[test]
    fn test_beta_range() {
        assert!(FrontierStrategy::dynamic_backtracking(1.0).is_ok());
        assert!(FrontierStrategy::dynamic_backtracking(1e-6).is_ok());
        assert!(FrontierStrategy::dynamic_backtracking(0.0).is_err());
        assert!(FrontierStrategy::dynamic_backtracking(1.5).is_err());
        assert!(FrontierStrategy::dynamic_backtracking(f64::NAN).is_err());
        assert!(
            FrontierStrategy::DynamicBacktracking { beta: -1.0 }
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_create_names() {
        assert_eq!(FrontierStrategy::default().create::<f64>().name(), "DepthFirstFrontier");
        assert_eq!(FrontierStrategy::BestFirst.create::<f64>().name(), "BestFirstFrontier");
        assert_eq!(
            FrontierStrategy::DynamicBacktracking { beta: 0.5 }
                .create::<f64>()
                .name(),
            "DynamicBacktrackingFrontier"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FrontierStrategy::DepthFirst.to_string(), "dfs");
        assert_eq!(
            FrontierStrategy::DynamicBacktracking { beta: 0.25 }.to_string(),
            "dbt(beta = 0.25)"
        );
    }
}
