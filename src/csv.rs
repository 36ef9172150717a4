//! Utilities for working with CSV files.

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use rustc_hash::FxHashMap;
use thiserror::Error;

pub struct CsvWriter<W: Write> {
    writer: BufWriter<W>,
}
impl CsvWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record.into_iter() {
            if first {
                first = false;
            } else {
                self.writer.write_all(b",")?;
            }
            let str: &str = datum.as_ref();
            if str.contains(',') || str.contains('"') {
                write!(self.writer, "\"{}\"", str.replace('"', "\"\""))?;
            } else {
                self.writer.write_all(str.as_bytes())?;
            }
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> Result<W, io::Error> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}

pub struct CsvReader<R: BufRead> {
    lines: Lines<R>,
}
impl CsvReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Reads the next non-blank record.
    pub fn read(&mut self) -> Option<Result<Vec<String>, io::Error>> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(Ok(split(&line))),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

/// Splits a line on commas, honouring double-quoted fields.
fn split(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = vec![];
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[derive(Debug, Error, PartialEq)]
#[error("missing column {0}")]
pub struct MissingColumn(pub String);

/// Maps column names of a header record to their positions.
#[derive(Debug)]
pub struct Header {
    columns: FxHashMap<String, usize>,
}
impl Header {
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    pub fn require(&self, column: &str) -> Result<usize, MissingColumn> {
        self.index_of(column)
            .ok_or_else(|| MissingColumn(column.into()))
    }
}

impl From<Vec<String>> for Header {
    fn from(record: Vec<String>) -> Self {
        let columns = record
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_lowercase(), index))
            .collect();
        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_records() {
        let data = "date,visitor,home\n\n2025-10-07,\"Chicago Blackhawks\",Florida Panthers\r\n";
        let records: Vec<_> = CsvReader::new(Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            vec![
                vec!["date", "visitor", "home"],
                vec!["2025-10-07", "Chicago Blackhawks", "Florida Panthers"]
            ],
            records
        );
    }

    #[test]
    fn split_quoted() {
        assert_eq!(vec!["a,b", "c\"d", ""], split("\"a,b\",\"c\"\"d\","));
    }

    #[test]
    fn header_lookup() {
        let header = Header::from(vec!["Team".to_string(), " TOI ".to_string()]);
        assert_eq!(Some(0), header.index_of("team"));
        assert_eq!(Ok(1), header.require("toi"));
        assert_eq!(Err(MissingColumn("xgf".into())), header.require("xgf"));
    }

    #[test]
    fn write_records() {
        let mut writer = CsvWriter::new(vec![]);
        writer.append(["Team", "Playoff %"]).unwrap();
        writer.append(["St. Louis Blues, MO", "51.2"]).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(
            "Team,Playoff %\n\"St. Louis Blues, MO\",51.2\n",
            String::from_utf8(bytes).unwrap()
        );
    }
}
