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

//! VBC tree trace.
//!
//! Writes the search tree in the VBC format understood by the VBC tool and
//! similar viewers. Every node of the search is numbered `id + 2`; node `1`
//! is a virtual root that parents the real root so the file has a single
//! tree.
//!
//! Two flavours exist:
//! - *timed*: every event carries a `HH:MM:SS.ss` timestamp (optionally
//!   dilated), nodes are recoloured as their state changes, and new
//!   incumbents update the upper bound;
//! - *untimed*: nodes and edges are listed, and only terminal states are
//!   written as categories. Nodes still open when the search ends are
//!   categorised as active.
//!
//! Tracing never influences the search. The first I/O error is logged with
//! `log::warn!` and disables the trace.
//!
//! Trace files whose path ends in `.gz` are gzip-compressed with `flate2`;
//! every other path, `.bz2` included, is written as plain text.

use crate::{
    monitor::tree_search_monitor::{NodeFate, TreeSearchMonitor},
    node::SearchNode,
    result::SolverStatus,
    stats::BnbSolverStatistics,
};
use cia_model::{num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory};
use flate2::{Compression, write::GzEncoder};
use log::warn;
use rustc_hash::FxHashSet;
use std::{
    ffi::OsStr,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    time::Instant,
};

/// VBC colour codes for the node states.
mod color {
    pub const ACTIVE: u32 = 4;
    pub const SELECTED: u32 = 8;
    pub const FATHOMED: u32 = 6;
    pub const INFEASIBLE: u32 = 13;
    pub const SOLVED: u32 = 9;
    pub const INTEGER: u32 = 2;
}

const VIRTUAL_ROOT: u64 = 1;

#[inline]
fn vbc_number(id: u64) -> u64 {
    id.saturating_add(2)
}

fn fate_color(fate: NodeFate) -> u32 {
    match fate {
        NodeFate::Branched => color::SOLVED,
        NodeFate::Fathomed => color::FATHOMED,
        NodeFate::Infeasible => color::INFEASIBLE,
        NodeFate::Solution => color::INTEGER,
    }
}

fn fate_message(fate: NodeFate) -> &'static str {
    match fate {
        NodeFate::Branched => "branching performed",
        NodeFate::Fathomed => "fathomed by upper bound",
        NodeFate::Infeasible => "no feasible children",
        NodeFate::Solution => "solution found",
    }
}

/// Formats seconds as `HH:MM:SS.ss`.
fn clock_string(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).trunc();
    let minutes = ((seconds % 3600.0) / 60.0).trunc();
    let rest = seconds % 60.0;
    format!("{:02}:{:02}:{:05.2}", hours as u64, minutes as u64, rest)
}

pub struct VbcTraceMonitor<W>
where
    W: Write,
{
    writer: Option<W>,
    timing: bool,
    dilation: f64,
    start_time: Instant,
    uncategorized: FxHashSet<u64>,
}

/// The file sink of a trace, compressed according to the file extension.
pub enum TraceWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl TraceWriter {
    /// Creates the file at `path`, gzip-compressed if the extension is `gz`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub fn create<P>(path: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        match path.extension().and_then(OsStr::to_str) {
            Some("gz") => Ok(Self::Gzip(GzEncoder::new(file, Compression::default()))),
            Some("bz2") => {
                warn!(
                    "bzip2 traces are not supported, writing {} as plain text",
                    path.display()
                );
                Ok(Self::Plain(file))
            }
            _ => Ok(Self::Plain(file)),
        }
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Gzip(_))
    }

    /// Writes the gzip trailer, if any, and flushes the file.
    ///
    /// Dropping the writer does the same but swallows errors.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut file) => file.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl std::fmt::Debug for TraceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => write!(f, "TraceWriter::Plain"),
            Self::Gzip(_) => write!(f, "TraceWriter::Gzip"),
        }
    }
}

impl Write for TraceWriter {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

impl VbcTraceMonitor<TraceWriter> {
    /// Creates a trace writing to the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub fn create<P>(path: P, timing: bool) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self::new(TraceWriter::create(path)?, timing))
    }
}

impl<W> VbcTraceMonitor<W>
where
    W: Write,
{
    pub fn new(writer: W, timing: bool) -> Self {
        Self {
            writer: Some(writer),
            timing,
            dilation: 1.0,
            start_time: Instant::now(),
            uncategorized: FxHashSet::default(),
        }
    }

    /// Multiplies all timestamps by `dilation`.
    pub fn with_dilation(mut self, dilation: f64) -> Self {
        self.dilation = dilation;
        self
    }

    #[inline]
    pub fn is_timed(&self) -> bool {
        self.timing
    }

    /// Returns `false` once an I/O error disabled the trace.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Returns the writer, or `None` if the trace was disabled by an error.
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }

    fn clock(&self) -> String {
        clock_string(self.start_time.elapsed().as_secs_f64() * self.dilation)
    }

    /// Runs `f` on the writer and disables the trace on failure.
    fn emit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(err) = f(writer) {
            warn!("VBC trace disabled after write error: {}", err);
            self.writer = None;
        }
    }

    fn write_header(&mut self) {
        let timing = self.timing;
        self.emit(|w| {
            writeln!(w, "#TYPE: COMPLETE TREE")?;
            writeln!(w, "#TIME: {}", if timing { "SET" } else { "NOT" })?;
            writeln!(w, "#BOUNDS: {}", if timing { "SET" } else { "NONE" })?;
            writeln!(w, "#INFORMATION: STANDARD")?;
            writeln!(w, "#NODE_NUMBER: NONE")?;
            if timing {
                writeln!(w, "00:00:00.00 N 0 {} {}", VIRTUAL_ROOT, color::SOLVED)?;
                writeln!(w, "00:00:00.00 I {} \\ivirtual root node", VIRTUAL_ROOT)
            } else {
                writeln!(w, "n {} \\ivirtual root node", VIRTUAL_ROOT)
            }
        });
    }

    fn write_state(&mut self, number: u64, color: u32, message: Option<&str>, upper: Option<String>) {
        if self.timing {
            let clock = self.clock();
            self.emit(|w| {
                writeln!(w, "{} P {} {}", clock, number, color)?;
                if let Some(message) = message {
                    writeln!(w, "{} A {} \\n{}", clock, number, message)?;
                }
                if let Some(upper) = upper {
                    writeln!(w, "{} U {}", clock, upper)?;
                }
                Ok(())
            });
        } else if message.is_some() {
            self.uncategorized.remove(&number);
            self.emit(|w| writeln!(w, "c {} {}", number, color));
        }
    }
}

impl<W> std::fmt::Debug for VbcTraceMonitor<W>
where
    W: Write,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VbcTraceMonitor")
            .field("timing", &self.timing)
            .field("dilation", &self.dilation)
            .field("active", &self.writer.is_some())
            .finish()
    }
}

impl<T, W> TreeSearchMonitor<T> for VbcTraceMonitor<W>
where
    T: SolverFloat,
    W: Write,
{
    fn name(&self) -> &str {
        "VbcTraceMonitor"
    }

    fn on_enter_search(&mut self, _problem: &Problem<T>, _statistics: &BnbSolverStatistics<T>) {
        self.start_time = Instant::now();
        self.uncategorized.clear();
        self.write_header();
    }

    fn on_exit_search(&mut self, _status: SolverStatus, _statistics: &BnbSolverStatistics<T>) {
        if !self.timing && !self.uncategorized.is_empty() {
            let mut open: Vec<u64> = self.uncategorized.drain().collect();
            open.sort_unstable();
            self.emit(|w| {
                for number in open {
                    writeln!(w, "c {} {}", number, color::ACTIVE)?;
                }
                Ok(())
            });
        }
        self.uncategorized.clear();
        self.emit(|w| w.flush());
    }

    fn on_node_created(&mut self, node: &SearchNode<T>, _statistics: &BnbSolverStatistics<T>) {
        let number = vbc_number(node.id());
        let parent = node.parent_id().map_or(VIRTUAL_ROOT, vbc_number);
        let active = node
            .last_active()
            .map_or_else(|| "none".to_string(), |c| c.get().to_string());
        let info = format!(
            "\\inode {}\\nlower bound: {}\\idepth: {}\\nactive control: {}",
            node.id(),
            node.bound(),
            node.depth(),
            active
        );

        if self.timing {
            let clock = self.clock();
            self.emit(|w| {
                writeln!(w, "{} N {} {} {}", clock, parent, number, color::ACTIVE)?;
                writeln!(w, "{} I {} {}", clock, number, info)
            });
        } else {
            self.uncategorized.insert(number);
            self.emit(|w| {
                writeln!(w, "n {} {}", number, info)?;
                writeln!(w, "e {} {}", parent, number)
            });
        }
    }

    fn on_node_selected(&mut self, node: &SearchNode<T>, _statistics: &BnbSolverStatistics<T>) {
        self.write_state(vbc_number(node.id()), color::SELECTED, None, None);
    }

    fn on_node_closed(
        &mut self,
        node: &SearchNode<T>,
        fate: NodeFate,
        _statistics: &BnbSolverStatistics<T>,
    ) {
        let upper = (fate == NodeFate::Solution).then(|| node.bound().to_string());
        self.write_state(
            vbc_number(node.id()),
            fate_color(fate),
            Some(fate_message(fate)),
            upper,
        );
    }

    fn on_solution_found(
        &mut self,
        _trajectory: &BinaryTrajectory,
        _objective: T,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }
}
