//! Line-oriented ROM dump conversion.

use std::io::{BufRead, Write};
use std::num::NonZeroUsize;

use super::{Codec, MemmixError, Word};

/// First byte of an address marker line
pub const HEADER_MARKER: u8 = b'@';

/// Output line width in characters
pub const LINE_WIDTH: usize = 16;

/// Running character count for re-wrapping output into fixed-width lines
///
/// Output lines are independent of input words: an 18-digit word is split
/// wherever the count crosses a multiple of the width. The count survives
/// across words and is left alone by header lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrap {
    width: NonZeroUsize,
    column: usize,
}

const DEFAULT_WIDTH: NonZeroUsize = match NonZeroUsize::new(LINE_WIDTH) {
    Some(width) => width,
    None => panic!("LINE_WIDTH must be non-zero"),
};

impl Default for Rewrap {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl Rewrap {
    pub const fn new(width: NonZeroUsize) -> Self {
        Self { width, column: 0 }
    }

    /// Characters written on the current output line
    pub fn column(&self) -> usize {
        self.column
    }

    /// Write `text`, inserting a newline each time the line fills up
    ///
    /// Returns the number of bytes written, newlines included.
    pub fn write<W: Write>(&mut self, out: &mut W, text: &[u8]) -> std::io::Result<usize> {
        let width = self.width.get();
        let mut written = 0;
        let mut rest = text;

        while !rest.is_empty() {
            let take = (width - self.column).min(rest.len());
            out.write_all(&rest[..take])?;
            self.column += take;
            written += take;
            rest = &rest[take..];

            if self.column == width {
                out.write_all(b"\n")?;
                self.column = 0;
                written += 1;
            }
        }

        Ok(written)
    }
}

/// Counters for one conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Header lines copied through
    pub headers: usize,
    /// Data words converted
    pub words: usize,
    /// Hex characters emitted, not counting inserted newlines
    pub chars: usize,
}

fn parse_line(line: &[u8]) -> Result<Word, MemmixError> {
    let text = std::str::from_utf8(line.trim_ascii()).map_err(|_| MemmixError::NotUtf8)?;
    text.parse()
}

/// Convert a ROM dump from `input` into FPGA init format on `output`
///
/// Header lines are copied byte for byte. Every data line is reversed by
/// `codec` and written only after it succeeds, so the first bad line stops
/// the output right there. Errors carry the 1-based line number.
pub fn convert<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    codec: &Codec,
) -> Result<StreamStats, MemmixError> {
    let mut rewrap = Rewrap::default();
    let mut stats = StreamStats::default();
    let mut line = Vec::new();
    let mut number = 0;

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        number += 1;

        if line.first() == Some(&HEADER_MARKER) {
            output.write_all(&line)?;
            stats.headers += 1;
            continue;
        }

        let word = parse_line(&line)
            .and_then(|word| codec.reverse(word))
            .map_err(|error| MemmixError::Line {
                line: number,
                error: Box::new(error),
            })?;

        let text = word.to_string();
        rewrap.write(&mut output, text.as_bytes())?;
        stats.words += 1;
        stats.chars += text.len();
    }

    output.flush()?;
    tracing::debug!(
        "memmix: {} words, {} headers, {} chars",
        stats.words,
        stats.headers,
        stats.chars
    );
    Ok(stats)
}
