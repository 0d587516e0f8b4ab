//! User-facing output.
//!
//! Everything the tool prints for the user (matches, progress, verification
//! results) goes through a [`ReportSink`], so it can be redirected to a
//! terminal, a file or a test buffer. Diagnostics go through `tracing`
//! instead.

use std::io::{self, Write};
use std::time::Duration;

use console::style;

use crate::verify::Mismatch;
use crate::worker::VanityResult;

/// A destination for report text.
pub trait ReportSink {
    /// Writes plain text.
    fn normal(&mut self, text: &str);

    /// Writes text that should stand out from its surroundings.
    fn highlighted(&mut self, text: &str);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn normal(&mut self, text: &str) {
        (**self).normal(text)
    }

    fn highlighted(&mut self, text: &str) {
        (**self).highlighted(text)
    }
}

/// Writes to stdout, highlighting in bright green when the terminal
/// supports colors.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn write(text: impl std::fmt::Display) {
        let mut out = io::stdout().lock();
        // Nothing useful to do if stdout is gone.
        let _ = write!(out, "{}", text);
        let _ = out.flush();
    }
}

impl ReportSink for ConsoleSink {
    fn normal(&mut self, text: &str) {
        Self::write(text);
    }

    fn highlighted(&mut self, text: &str) {
        Self::write(style(text).green().bright().bold());
    }
}

/// A piece of captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Normal(String),
    Highlighted(String),
}

/// Captures output in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    segments: Vec<Segment>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns all captured text, highlighted or not.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Normal(s) | Segment::Highlighted(s) => s.as_str(),
            })
            .collect()
    }

    /// Returns only the highlighted pieces.
    pub fn highlighted(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Highlighted(s) => Some(s.as_str()),
                Segment::Normal(_) => None,
            })
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn normal(&mut self, text: &str) {
        self.segments.push(Segment::Normal(text.to_owned()));
    }

    fn highlighted(&mut self, text: &str) {
        self.segments.push(Segment::Highlighted(text.to_owned()));
    }
}

/// Formats reports onto a sink.
///
/// Progress lines are redrawn in place with `\r`; the reporter remembers
/// whether one is showing so the next full line starts on a fresh row.
pub struct Reporter<S> {
    sink: S,
    status_line: bool,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            status_line: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Ends a progress line left open by [`Reporter::progress`] or
    /// [`Reporter::verify_progress`].
    pub fn end_status_line(&mut self) {
        if self.status_line {
            self.sink.normal("\n");
            self.status_line = false;
        }
    }

    /// Writes a full line of plain text.
    pub fn line(&mut self, text: &str) {
        self.end_status_line();
        self.sink.normal(text);
        self.sink.normal("\n");
    }

    /// Redraws the search throughput line.
    pub fn progress(&mut self, tried: u64, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { tried as f64 / secs } else { 0.0 };
        self.sink
            .normal(&format!("\r{:>10} keys {:>10.2} keys per sec", tried, rate));
        self.status_line = true;
    }

    /// Prints a match.
    ///
    /// The private key is printed byte-reversed, which is the form NEM
    /// wallets import. The matched part of the address is highlighted.
    pub fn found(&mut self, result: &VanityResult) {
        self.end_status_line();

        let address = result.address.as_str();
        let start = result.position;
        let end = start + result.needle_len;

        self.sink
            .normal(&format!("priv: {}\n", result.private_key.to_reversed_hex()));
        self.sink.normal(&format!("pub : {}\n", result.public_key));
        self.sink.normal("addr: ");
        self.sink.normal(&address[..start]);
        self.sink.highlighted(&address[start..end]);
        self.sink.normal(&address[end..]);
        self.sink.normal("\n");
    }

    /// Redraws the test-file progress line.
    pub fn verify_progress(&mut self, verified: usize) {
        self.sink.normal(&format!("\r{:>10} tested keys", verified));
        self.status_line = true;
    }

    /// Prints the test-file success summary.
    pub fn verified(&mut self, verified: usize) {
        self.end_status_line();
        self.sink
            .normal(&format!("{:>10} TEST keys and addresses: OK!\n", verified));
    }

    /// Prints expected and actual values of a failed record side by side.
    pub fn mismatch(&mut self, mismatch: &Mismatch) {
        self.end_status_line();
        self.sink.highlighted("ERROR");
        self.sink.normal("\n");
        self.sink
            .normal(&format!("input private key: {}\n", mismatch.input_private_key));
        self.sink.normal(&format!(
            "expected public key: {}\n  actual public key: {}\n",
            mismatch.expected_public_key, mismatch.actual_public_key
        ));
        self.sink.normal(&format!(
            "expected address: {}\n  actual address: {}\n",
            mismatch.expected_address, mismatch.actual_address
        ));
    }
}
