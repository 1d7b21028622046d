//! Sample sources feeding the filter

use crate::error::{Error, Result};
use std::io::BufRead;

/// A generic source of raw sensor samples
pub trait SampleSource {
    /// Get the source name
    fn name(&self) -> &str;

    /// Read the next sample, `None` once the source is exhausted
    fn next_sample(&mut self) -> Result<Option<Vec<f64>>>;
}

/// Reads one sample per text line
///
/// Values are separated by whitespace and/or commas. Blank lines and lines
/// starting with `#` are skipped.
pub struct LineSampleSource<R> {
    name: String,
    reader: R,
    line: String,
    line_no: usize,
}

impl<R: BufRead> LineSampleSource<R> {
    /// Wrap `reader`; `name` appears in log and error messages
    pub fn new(name: &str, reader: R) -> Self {
        LineSampleSource {
            name: name.to_string(),
            reader,
            line: String::new(),
            line_no: 0,
        }
    }
}

/// Parse a single line of numbers
pub fn parse_sample(line: &str) -> Result<Vec<f64>> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .map(|field| {
            let value = field
                .parse::<f64>()
                .map_err(|e| Error::Parse(format!("'{}': {}", field, e)))?;
            if !value.is_finite() {
                return Err(Error::Parse(format!("'{}': not a finite number", field)));
            }
            Ok(value)
        })
        .collect()
}

impl<R: BufRead> SampleSource for LineSampleSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_sample(&mut self) -> Result<Option<Vec<f64>>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return parse_sample(trimmed)
                .map(Some)
                .map_err(|e| Error::Parse(format!("{} line {}: {}", self.name, self.line_no, e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_lines_and_skips_comments() {
        let input = "# x y z\n1 2 3\n\n4.5,5,  6\n";
        let mut source = LineSampleSource::new("stdin", Cursor::new(input));
        assert_eq!(source.name(), "stdin");
        assert_eq!(source.next_sample().unwrap(), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(source.next_sample().unwrap(), Some(vec![4.5, 5.0, 6.0]));
        assert_eq!(source.next_sample().unwrap(), None);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        for line in ["1 nan 3", "inf 0", "1,-inf", "NaN"] {
            assert!(matches!(parse_sample(line), Err(Error::Parse(_))), "{}", line);
        }
        assert_eq!(parse_sample("1e3 -2").unwrap(), vec![1000.0, -2.0]);
    }

    #[test]
    fn test_reports_bad_line() {
        let mut source = LineSampleSource::new("file", Cursor::new("1 2\n1 x\n"));
        assert!(source.next_sample().is_ok());
        let err = source.next_sample().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
