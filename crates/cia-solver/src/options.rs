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

//! # Solver Options
//!
//! The configuration surface of the branch-and-bound solver. `BnbOptions`
//! holds typed values with the documented defaults; builder-style `with_*`
//! setters cover programmatic use and `set_option` accepts string keys and
//! values for configuration read from files or command lines.
//!
//! | Key              | Type     | Default     |
//! | :--------------- | :------- | :---------- |
//! | `strategy`       | string   | `dfs`       |
//! | `dbt_beta`       | float    | `0.5`       |
//! | `max_iter`       | integer  | `5000000`   |
//! | `max_cpu_time`   | seconds  | `300`       |
//! | `use_warm_start` | bool     | `false`     |
//! | `trace_path`     | path     | none        |
//! | `trace_dilation` | float    | `1.0`       |
//! | `trace_timing`   | bool     | `true`      |
//! | `verbosity`      | integer  | `0`         |
//! | `log_interval`   | integer  | `1000000`   |
//!
//! Tracing and verbosity never influence the search result.

use cia_bnb::{
    frontier::strategy::{DEFAULT_DBT_BETA, FrontierStrategy},
    monitor::log::DEFAULT_LOG_INTERVAL,
};
use cia_model::error::ConfigurationError;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_MAX_ITERATIONS: u64 = 5_000_000;
pub const DEFAULT_MAX_CPU_TIME: Duration = Duration::from_secs(300);
pub const DEFAULT_TRACE_DILATION: f64 = 1.0;

/// Options of the branch-and-bound solver.
#[derive(Clone, Debug, PartialEq)]
pub struct BnbOptions {
    strategy: FrontierStrategy,
    dbt_beta: f64,
    max_iterations: u64,
    max_cpu_time: Duration,
    use_warm_start: bool,
    trace_path: Option<PathBuf>,
    trace_dilation: f64,
    trace_timing: bool,
    verbosity: u8,
    log_interval: u64,
}

impl Default for BnbOptions {
    fn default() -> Self {
        Self {
            strategy: FrontierStrategy::DepthFirst,
            dbt_beta: DEFAULT_DBT_BETA,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_cpu_time: DEFAULT_MAX_CPU_TIME,
            use_warm_start: false,
            trace_path: None,
            trace_dilation: DEFAULT_TRACE_DILATION,
            trace_timing: true,
            verbosity: 0,
            log_interval: DEFAULT_LOG_INTERVAL,
        }
    }
}

impl BnbOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search strategy. The beta of a `DynamicBacktracking`
    /// strategy replaces `dbt_beta`.
    #[inline]
    pub fn with_strategy(mut self, strategy: FrontierStrategy) -> Self {
        if let FrontierStrategy::DynamicBacktracking { beta } = strategy {
            self.dbt_beta = beta;
        }
        self.strategy = strategy;
        self
    }

    #[inline]
    pub fn with_dbt_beta(mut self, beta: f64) -> Self {
        self.dbt_beta = beta;
        self
    }

    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[inline]
    pub fn with_max_cpu_time(mut self, max_cpu_time: Duration) -> Self {
        self.max_cpu_time = max_cpu_time;
        self
    }

    #[inline]
    pub fn with_warm_start(mut self, enabled: bool) -> Self {
        self.use_warm_start = enabled;
        self
    }

    #[inline]
    pub fn with_trace_path<P>(mut self, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.trace_path = Some(path.into());
        self
    }

    #[inline]
    pub fn with_trace_dilation(mut self, dilation: f64) -> Self {
        self.trace_dilation = dilation;
        self
    }

    #[inline]
    pub fn with_trace_timing(mut self, timing: bool) -> Self {
        self.trace_timing = timing;
        self
    }

    #[inline]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[inline]
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    /// Returns the strategy with `dbt_beta` applied.
    #[inline]
    pub fn strategy(&self) -> FrontierStrategy {
        match self.strategy {
            FrontierStrategy::DynamicBacktracking { .. } => FrontierStrategy::DynamicBacktracking {
                beta: self.dbt_beta,
            },
            other => other,
        }
    }

    #[inline]
    pub fn dbt_beta(&self) -> f64 {
        self.dbt_beta
    }

    #[inline]
    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    #[inline]
    pub fn max_cpu_time(&self) -> Duration {
        self.max_cpu_time
    }

    #[inline]
    pub fn use_warm_start(&self) -> bool {
        self.use_warm_start
    }

    #[inline]
    pub fn trace_path(&self) -> Option<&PathBuf> {
        self.trace_path.as_ref()
    }

    #[inline]
    pub fn trace_dilation(&self) -> f64 {
        self.trace_dilation
    }

    #[inline]
    pub fn trace_timing(&self) -> bool {
        self.trace_timing
    }

    #[inline]
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    #[inline]
    pub fn log_interval(&self) -> u64 {
        self.log_interval
    }

    /// Checks the option values for consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidOption` for a beta outside
    /// `(0, 1]`, a non-positive or non-finite trace dilation, or a zero log
    /// interval.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.dbt_beta > 0.0 && self.dbt_beta <= 1.0) {
            return Err(invalid(
                "dbt_beta",
                format!("must lie in (0, 1], got {}", self.dbt_beta),
            ));
        }
        if !(self.trace_dilation.is_finite() && self.trace_dilation > 0.0) {
            return Err(invalid(
                "trace_dilation",
                format!("must be finite and positive, got {}", self.trace_dilation),
            ));
        }
        if self.log_interval == 0 {
            return Err(invalid("log_interval", "must be positive".to_string()));
        }
        Ok(())
    }

    /// Sets an option from its string key and value.
    ///
    /// An empty `trace_path` disables tracing. Booleans accept
    /// `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownOption` for an unknown key,
    /// `UnknownStrategy`/`UnsupportedStrategy` for a bad strategy name and
    /// `InvalidOption` for a value that does not parse or is out of range.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigurationError> {
        let value = value.trim();
        match name.trim() {
            "strategy" => {
                let strategy: FrontierStrategy = value.parse()?;
                self.strategy = strategy;
            }
            "dbt_beta" => {
                let beta = parse_float(name, value)?;
                FrontierStrategy::dynamic_backtracking(beta)?;
                self.dbt_beta = beta;
            }
            "max_iter" => self.max_iterations = parse_integer(name, value)?,
            "max_cpu_time" => {
                let seconds = parse_float(name, value)?;
                self.max_cpu_time = Duration::try_from_secs_f64(seconds).map_err(|_| {
                    invalid(
                        "max_cpu_time",
                        format!("must be finite and non-negative, got {}", value),
                    )
                })?;
            }
            "use_warm_start" => self.use_warm_start = parse_bool(name, value)?,
            "trace_path" => {
                self.trace_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "trace_dilation" => {
                let dilation = parse_float(name, value)?;
                if !(dilation.is_finite() && dilation > 0.0) {
                    return Err(invalid(
                        "trace_dilation",
                        format!("must be finite and positive, got {}", value),
                    ));
                }
                self.trace_dilation = dilation;
            }
            "trace_timing" => self.trace_timing = parse_bool(name, value)?,
            "verbosity" => self.verbosity = parse_integer(name, value)?,
            "log_interval" => {
                let interval: u64 = parse_integer(name, value)?;
                if interval == 0 {
                    return Err(invalid("log_interval", "must be positive".to_string()));
                }
                self.log_interval = interval;
            }
            other => return Err(ConfigurationError::UnknownOption(other.to_string())),
        }
        Ok(())
    }
}

impl std::fmt::Display for BnbOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CIA-BnB Options:")?;
        writeln!(f, "   Strategy:        {}", self.strategy())?;
        writeln!(f, "   Max iterations:  {}", self.max_iterations)?;
        writeln!(f, "   Max CPU time:    {:.3} s", self.max_cpu_time.as_secs_f64())?;
        writeln!(f, "   Warm start:      {}", self.use_warm_start)?;
        match &self.trace_path {
            Some(path) => writeln!(
                f,
                "   Trace:           {} (dilation {}, timing {})",
                path.display(),
                self.trace_dilation,
                self.trace_timing
            )?,
            None => writeln!(f, "   Trace:           none")?,
        }
        write!(f, "   Verbosity:       {}", self.verbosity)
    }
}

#[inline]
fn invalid(name: &str, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidOption {
        name: name.to_string(),
        reason,
    }
}

fn parse_float(name: &str, value: &str) -> Result<f64, ConfigurationError> {
    value
        .parse::<f64>()
        .map_err(|e| invalid(name, format!("`{}` is not a number: {}", value, e)))
}

fn parse_integer<I>(name: &str, value: &str) -> Result<I, ConfigurationError>
where
    I: std::str::FromStr,
    I::Err: std::fmt::Display,
{
    value
        .parse::<I>()
        .map_err(|e| invalid(name, format!("`{}` is not a valid integer: {}", value, e)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigurationError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(name, format!("`{}` is not a boolean", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BnbOptions::default();
        assert_eq!(options.strategy(), FrontierStrategy::DepthFirst);
        assert_eq!(options.dbt_beta(), 0.5);
        assert_eq!(options.max_iterations(), 5_000_000);
        assert_eq!(options.max_cpu_time(), Duration::from_secs(300));
        assert!(!options.use_warm_start());
        assert!(options.trace_path().is_none());
        assert_eq!(options.trace_dilation(), 1.0);
        assert!(options.trace_timing());
        assert_eq!(options.verbosity(), 0);
        assert_eq!(options.log_interval(), 1_000_000);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_dbt_beta_applies_to_strategy() {
        let mut options = BnbOptions::new();
        options.set_option("strategy", "dbt").unwrap();
        options.set_option("dbt_beta", "0.25").unwrap();
        assert_eq!(
            options.strategy(),
            FrontierStrategy::DynamicBacktracking { beta: 0.25 }
        );

        let options = BnbOptions::new().with_strategy(FrontierStrategy::DynamicBacktracking { beta: 0.75 });
        assert_eq!(options.dbt_beta(), 0.75);
    }

    #[test]
    fn test_set_option_parses_values() {
        let mut options = BnbOptions::new();
        options.set_option("max_iter", "1000").unwrap();
        options.set_option("max_cpu_time", "2.5").unwrap();
        options.set_option("use_warm_start", "yes").unwrap();
        options.set_option("trace_path", "/tmp/tree.vbc").unwrap();
        options.set_option("trace_dilation", "10").unwrap();
        options.set_option("trace_timing", "off").unwrap();
        options.set_option("verbosity", "2").unwrap();
        options.set_option("log_interval", "50").unwrap();

        assert_eq!(options.max_iterations(), 1000);
        assert_eq!(options.max_cpu_time(), Duration::from_millis(2500));
        assert!(options.use_warm_start());
        assert_eq!(options.trace_path(), Some(&PathBuf::from("/tmp/tree.vbc")));
        assert_eq!(options.trace_dilation(), 10.0);
        assert!(!options.trace_timing());
        assert_eq!(options.verbosity(), 2);
        assert_eq!(options.log_interval(), 50);

        options.set_option("trace_path", "").unwrap();
        assert!(options.trace_path().is_none());
    }

    #[test]
    fn test_set_option_rejects_bad_input() {
        let mut options = BnbOptions::new();
        assert_eq!(
            options.set_option("strategy", "btd"),
            Err(ConfigurationError::UnsupportedStrategy("btd".to_string()))
        );
        assert!(matches!(
            options.set_option("strategy", "astar"),
            Err(ConfigurationError::UnknownStrategy(_))
        ));
        assert!(matches!(
            options.set_option("dbt_beta", "0"),
            Err(ConfigurationError::InvalidOption { .. })
        ));
        assert!(matches!(
            options.set_option("dbt_beta", "1.5"),
            Err(ConfigurationError::InvalidOption { .. })
        ));
        assert!(matches!(
            options.set_option("max_cpu_time", "-1"),
            Err(ConfigurationError::InvalidOption { .. })
        ));
        assert!(matches!(
            options.set_option("max_iter", "many"),
            Err(ConfigurationError::InvalidOption { .. })
        ));
        assert!(matches!(
            options.set_option("use_warm_start", "maybe"),
            Err(ConfigurationError::InvalidOption { .. })
        ));
        assert!(matches!(
            options.set_option("trace_dilation", "0"),
            Err(ConfigurationError::InvalidOption { .. })
        ));
        assert_eq!(
            options.set_option("n_threads", "4"),
            Err(ConfigurationError::UnknownOption("n_threads".to_string()))
        );
        // Rejected values leave the options untouched.
        assert_eq!(options, BnbOptions::default());
    }

    #[test]
    fn test_validate_rejects_builder_values() {
        assert!(BnbOptions::new().with_dbt_beta(0.0).validate().is_err());
        assert!(BnbOptions::new().with_trace_dilation(-1.0).validate().is_err());
        assert!(BnbOptions::new().with_log_interval(0).validate().is_err());
        assert!(BnbOptions::new().with_dbt_beta(1.0).validate().is_ok());
    }

    #[test]
    fn test_display() {
        let text = BnbOptions::default().to_string();
        assert!(text.starts_with("CIA-BnB Options:"));
        assert!(text.contains("dfs"));
    }
}
