//! Per-line text and pixel-height access over the source buffer

use ropey::Rope;
use serde::{Deserialize, Serialize};

/// Snapshot of a single source line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub text: String,
    pub height: f64,
    /// 1-based line number
    pub index: u32,
}

/// Read access to per-line text and rendered heights.
///
/// Lines are 1-based. `height_through(n)` is the total rendered height of
/// lines 1..=n, so `height_through(0)` is 0 and `height_through(line_count())`
/// is the full buffer height. The editor widget owns the real data; this
/// trait is the snapshot the sync computations read.
pub trait LineMetrics {
    /// Number of lines in the buffer
    fn line_count(&self) -> u32;

    /// Snapshot of one line, or None when out of range
    fn line(&self, line: u32) -> Option<LineRecord>;

    /// Total rendered height of lines 1..=line
    fn height_through(&self, line: u32) -> f64;

    /// Top edge of a line (total height of the lines above it)
    fn height_before(&self, line: u32) -> f64 {
        self.height_through(line.saturating_sub(1))
    }

    /// Rendered height of a single line, 0 when out of range
    fn line_height(&self, line: u32) -> f64 {
        self.line(line).map(|record| record.height).unwrap_or(0.0)
    }

    /// First line whose bottom edge lies below `offset`.
    ///
    /// An offset exactly on a line's bottom edge belongs to the next line.
    /// Offsets past the total height return the last line.
    fn line_at_height(&self, offset: f64) -> u32 {
        let count = self.line_count();
        let mut bottom = 0.0;
        for line in 1..=count {
            bottom += self.line_height(line);
            if bottom > offset {
                return line;
            }
        }
        count
    }
}

/// Rope-backed [`LineMetrics`] implementation with renderer-supplied heights.
///
/// The rope follows the editor convention that a trailing newline opens one
/// more (empty) line, so heights always parallel the visual line count.
#[derive(Debug, Clone)]
pub struct MeasuredBuffer {
    rope: Rope,
    heights: Vec<f64>,
}

impl MeasuredBuffer {
    /// Create a buffer where every line starts at `default_height`
    pub fn from_text(text: &str, default_height: f64) -> Self {
        let rope = Rope::from_str(text);
        let heights = vec![default_height; rope.len_lines()];
        Self { rope, heights }
    }

    /// Replace one line's rendered height (1-based; out of range is ignored)
    pub fn set_line_height(&mut self, line: u32, height: f64) {
        if line >= 1 && (line as usize) <= self.heights.len() {
            self.heights[line as usize - 1] = height;
        }
    }
}

impl LineMetrics for MeasuredBuffer {
    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }

    fn line(&self, line: u32) -> Option<LineRecord> {
        if line == 0 {
            return None;
        }
        let idx = line as usize - 1;
        let slice = self.rope.get_line(idx)?;
        let mut text: String = slice.chunks().collect();

        // Records carry visual text only, without the line break
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }

        let height = self.heights.get(idx).copied()?;
        Some(LineRecord {
            text,
            height,
            index: line,
        })
    }

    fn height_through(&self, line: u32) -> f64 {
        let end = (line as usize).min(self.heights.len());
        self.heights[..end].iter().sum()
    }

    fn line_height(&self, line: u32) -> f64 {
        if line == 0 {
            return 0.0;
        }
        self.heights.get(line as usize - 1).copied().unwrap_or(0.0)
    }
}
