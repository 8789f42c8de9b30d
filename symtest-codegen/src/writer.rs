//! Indentation-aware text emission
//!
//! Nesting depth is explicit state: callers push a level when entering a
//! block and pop it when leaving. Leading whitespace is derived from that
//! depth only, never from the text already written.

use std::fmt;

use symtest_core::errors::{SynthesisError, SynthesisResult};

/// Default indentation unit
pub const INDENT_UNIT: &str = "    ";

/// Line-oriented source builder with an explicit nesting depth
#[derive(Debug, Clone)]
pub struct IndentWriter {
    buffer: String,
    depth: usize,
    unit: String,
    /// Indentation strings by depth, grown on demand
    indents: Vec<String>,
    /// Set when a pushed value's `Display` impl failed
    failed: bool,
}

impl IndentWriter {
    pub fn new() -> Self {
        Self::with_unit(INDENT_UNIT)
    }

    /// Use a different indentation unit, e.g. a tab
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
            unit: unit.into(),
            indents: vec![String::new()],
            failed: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a nested block
    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    /// Leave a nested block
    pub fn dedent(&mut self) -> SynthesisResult<&mut Self> {
        if self.depth == 0 {
            return Err(SynthesisError::contract("unbalanced dedent in code generation"));
        }
        self.depth -= 1;
        Ok(self)
    }

    fn grow_indents(&mut self) {
        while self.indents.len() <= self.depth {
            let next = format!("{}{}", self.indents[self.indents.len() - 1], self.unit);
            self.indents.push(next);
        }
    }

    /// Write the leading whitespace for a new line at the current depth
    pub fn start_line(&mut self) -> &mut Self {
        self.grow_indents();
        self.buffer.push_str(&self.indents[self.depth]);
        self
    }

    /// Append text to the current line.
    ///
    /// A failing `Display` impl is reported by [`finish`](Self::finish).
    pub fn push(&mut self, text: impl fmt::Display) -> &mut Self {
        use fmt::Write;
        if write!(self.buffer, "{}", text).is_err() {
            self.failed = true;
        }
        self
    }

    /// Terminate the current line
    pub fn end_line(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// A complete line at the current depth
    pub fn line(&mut self, text: impl fmt::Display) -> &mut Self {
        self.start_line().push(text).end_line()
    }

    /// An empty line, without trailing whitespace
    pub fn blank(&mut self) -> &mut Self {
        self.end_line()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Take the text written so far; the depth must be back at zero
    pub fn finish(self) -> SynthesisResult<String> {
        if self.failed {
            return Err(SynthesisError::Fmt(fmt::Error));
        }
        if self.depth != 0 {
            return Err(SynthesisError::contract(format!(
                "code generation finished at nesting depth {}",
                self.depth
            )));
        }
        Ok(self.buffer)
    }
}

impl Default for IndentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for IndentWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}
