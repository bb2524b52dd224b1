//! Pattern scanning over a region's bytes
//!
//! The scanner streams a region through a fixed-size window and reports
//! every offset where a literal byte pattern occurs. Matches are yielded
//! lazily as they are found, not collected up front.

use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult};
use crate::memory::MemorySource;
use tracing::trace;

/// Default scan window, one page
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

/// Tuning knobs for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Bytes read per window
    pub window_size: usize,
    /// Carry the trailing `pattern.len() - 1` bytes of each window into
    /// the next one, so occurrences straddling a window boundary are
    /// found.
    ///
    /// Off by default: the historical behavior of this tool checks each
    /// window independently, and a pattern spanning two windows is simply
    /// not detected. Turn this on when completeness matters more than
    /// matching that documented limitation.
    pub carry_over: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            window_size: DEFAULT_WINDOW_SIZE,
            carry_over: false,
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanOptions {
    fn from(cfg: &crate::config::ScannerConfig) -> Self {
        ScanOptions {
            window_size: cfg.window_size,
            carry_over: cfg.carry_over,
        }
    }
}

/// Parses a textual hex pattern such as `"54 41 52 47 45 54"` into bytes.
///
/// Whitespace between bytes is optional. Fails with `InvalidPattern` on
/// empty input, odd digit counts or non-hex characters.
pub fn parse_hex_pattern(pattern: &str) -> MemoryResult<Vec<u8>> {
    let compact: String = pattern.split_whitespace().collect();
    if compact.is_empty() {
        return Err(MemoryError::InvalidPattern("empty pattern".to_string()));
    }

    hex::decode(&compact).map_err(|e| MemoryError::InvalidPattern(format!("{}: {}", pattern, e)))
}

/// Scans regions of a memory source for literal byte patterns.
///
/// Region selection is the caller's job; the scanner does not filter by
/// permission. Scanning a non-readable region just produces zero-byte
/// reads and an empty result, not an error.
pub struct PatternScanner<'a, S: MemorySource> {
    source: &'a S,
    options: ScanOptions,
}

impl<'a, S: MemorySource> PatternScanner<'a, S> {
    /// Scanner with default options
    pub fn new(source: &'a S) -> Self {
        PatternScanner {
            source,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(source: &'a S, options: ScanOptions) -> Self {
        PatternScanner { source, options }
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    /// Lazily yields the absolute address of every occurrence of
    /// `pattern` inside `region`.
    ///
    /// The scan stops when a window read returns 0 bytes (end of the
    /// readable range) or the offset reaches the region's size. A short
    /// but non-zero read advances by the transferred count and continues.
    /// An empty pattern yields no matches.
    pub fn scan(&self, region: &MemoryRegion, pattern: &[u8]) -> Matches<'a, S> {
        Matches {
            source: self.source,
            region_start: region.start(),
            region_size: region.size(),
            pattern: pattern.to_vec(),
            window: Vec::new(),
            window_base: 0,
            cursor: 0,
            offset: 0,
            options: self.options,
            done: pattern.is_empty(),
        }
    }
}

/// Lazy iterator over pattern match addresses. See [`PatternScanner::scan`].
pub struct Matches<'a, S: MemorySource> {
    source: &'a S,
    region_start: Address,
    region_size: usize,
    pattern: Vec<u8>,
    /// Current window contents, including any carried tail
    window: Vec<u8>,
    /// Region offset of `window[0]`
    window_base: usize,
    /// Next candidate index within the window
    cursor: usize,
    /// Region offset of the next read
    offset: usize,
    options: ScanOptions,
    done: bool,
}

impl<'a, S: MemorySource> Matches<'a, S> {
    /// Pulls the next window from the source. Returns false when the scan
    /// is over.
    fn refill(&mut self) -> bool {
        if self.offset >= self.region_size {
            return false;
        }

        let want = self.options.window_size.min(self.region_size - self.offset);
        let mut buf = vec![0u8; want];
        let n = self
            .source
            .read_at(self.region_start.add(self.offset), &mut buf);
        if n == 0 {
            return false;
        }
        trace!(offset = self.offset, bytes = n, "scan window refill");

        let keep = if self.options.carry_over {
            // Positions needing bytes from the next window are exactly the
            // last pattern.len() - 1 of the old one; none of them were
            // checked yet, so rescanning from 0 cannot duplicate a match.
            self.pattern.len().saturating_sub(1).min(self.window.len())
        } else {
            0
        };

        let mut next = Vec::with_capacity(keep + n);
        next.extend_from_slice(&self.window[self.window.len() - keep..]);
        next.extend_from_slice(&buf[..n]);

        self.window_base = self.offset - keep;
        self.window = next;
        self.cursor = 0;
        self.offset += n;
        true
    }
}

impl<'a, S: MemorySource> Iterator for Matches<'a, S> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        if self.done {
            return None;
        }

        let plen = self.pattern.len();
        loop {
            while self.cursor + plen <= self.window.len() {
                let i = self.cursor;
                self.cursor += 1;
                if self.window[i..i + plen] == self.pattern[..] {
                    return Some(self.region_start.add(self.window_base + i));
                }
            }

            if !self.refill() {
                self.done = true;
                return None;
            }
        }
    }
}
