//! Colored terminal output for packaging runs
//!
//! Progress goes to stdout, errors to stderr. In JSON mode only the final
//! JSON document is written to stdout so it can be piped.

use serde::Serialize;
use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    json: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.json)
    }
}

impl OutputManager {
    /// Create a new output manager. `json` silences human-readable progress.
    pub fn new(json: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            json,
        }
    }

    fn emit(&self, marker: &str, color: Color, message: &str) {
        if self.json {
            return;
        }
        let mut buffer = self.bufwtr.buffer();
        write_marked(&mut buffer, marker, color, message);
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.emit("ℹ", Color::Cyan, message);
    }

    /// Print a step in progress
    pub fn progress(&self, message: &str) {
        self.emit("⋯", Color::Magenta, message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit("✓", Color::Green, message);
    }

    /// Print an error message (always shown, even in JSON mode)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        write_marked(&mut buffer, "✗", Color::Red, message);
        if bufwtr.print(&buffer).is_err() {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        if self.json {
            return;
        }
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "    {}", message);
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print `value` as pretty JSON when in JSON mode; no-op otherwise.
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }

    /// Check if JSON mode is enabled
    pub fn is_json(&self) -> bool {
        self.json
    }
}

fn write_marked(buffer: &mut Buffer, marker: &str, color: Color, message: &str) {
    let _ = buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(buffer, "{}", marker);
    let _ = buffer.reset();
    let _ = writeln!(buffer, " {}", message);
}
