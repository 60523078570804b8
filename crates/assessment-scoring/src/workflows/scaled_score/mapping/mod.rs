mod parser;

pub use parser::parse_mapping;

use super::domain::MappingEntry;
use std::io::Read;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug)]
pub enum MappingImportError {
    Io(std::io::Error),
}

impl std::fmt::Display for MappingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingImportError::Io(err) => write!(f, "failed to read mapping file: {}", err),
        }
    }
}

impl std::error::Error for MappingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MappingImportError::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for MappingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Adapters that turn mapping uploads into decoded text before handing off to the parser.
pub struct MappingImporter;

impl MappingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MappingEntry>, MappingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Vec<MappingEntry>, MappingImportError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(parse_mapping(&text))
    }

    pub async fn from_async_reader<R>(mut reader: R) -> Result<Vec<MappingEntry>, MappingImportError>
    where
        R: AsyncRead + Unpin,
    {
        let mut text = String::new();
        reader.read_to_string(&mut text).await?;
        Ok(parse_mapping(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(score: f64, value: f64) -> MappingEntry {
        MappingEntry { score, value }
    }

    #[test]
    fn drops_header_and_malformed_rows() {
        let parsed = parse_mapping("header\n10,500\nabc,def\n20,510\n");
        assert_eq!(parsed, vec![entry(10.0, 500.0), entry(20.0, 510.0)]);
    }

    #[test]
    fn header_is_dropped_even_when_numeric() {
        let parsed = parse_mapping("1,2\n3,4\n");
        assert_eq!(parsed, vec![entry(3.0, 4.0)]);
    }

    #[test]
    fn empty_and_header_only_inputs_yield_nothing() {
        assert!(parse_mapping("").is_empty());
        assert!(parse_mapping("score,value").is_empty());
        assert!(parse_mapping("score,value\n\n   \n").is_empty());
    }

    #[test]
    fn blank_first_line_still_counts_as_header() {
        let parsed = parse_mapping("\n10,500\n");
        assert_eq!(parsed, vec![entry(10.0, 500.0)]);
    }

    #[test]
    fn rows_need_exactly_two_fields() {
        let parsed = parse_mapping("score,value\n1,2,3\n4\n5,6\n7,\n");
        assert_eq!(parsed, vec![entry(5.0, 6.0)]);
    }

    #[test]
    fn surrounding_whitespace_and_crlf_are_tolerated() {
        let parsed = parse_mapping("score,value\r\n  1 , 20.5  \r\n2,21\r\n");
        assert_eq!(parsed, vec![entry(1.0, 20.5), entry(2.0, 21.0)]);
    }

    #[test]
    fn parse_number_rejects_non_finite_values() {
        assert_eq!(parser::parse_number_for_tests(" 12 "), Some(12.0));
        assert_eq!(parser::parse_number_for_tests("-3.5"), Some(-3.5));
        assert!(parser::parse_number_for_tests("NaN").is_none());
        assert!(parser::parse_number_for_tests("inf").is_none());
        assert!(parser::parse_number_for_tests("").is_none());
    }

    #[test]
    fn parsing_is_restartable() {
        let text = "score,value\n0,1\n1,3\n";
        assert_eq!(parse_mapping(text), parse_mapping(text));
    }

    #[test]
    fn from_reader_parses_text() {
        let parsed = MappingImporter::from_reader(Cursor::new("raw,scaled\n0,1\n1,2\n"))
            .expect("reader parses");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn from_reader_rejects_invalid_utf8() {
        let error = MappingImporter::from_reader(Cursor::new(vec![0xff, 0xfe, 0x00]))
            .expect_err("invalid utf-8");
        match error {
            MappingImportError::Io(err) => assert_eq!(err.kind(), std::io::ErrorKind::InvalidData),
        }
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = MappingImporter::from_path("./does-not-exist.csv").expect_err("io error");
        assert!(matches!(error, MappingImportError::Io(_)));
    }

    #[tokio::test]
    async fn from_async_reader_parses_text() {
        let parsed = MappingImporter::from_async_reader("raw,scaled\n0,1\n".as_bytes())
            .await
            .expect("async reader parses");
        assert_eq!(parsed, vec![entry(0.0, 1.0)]);
    }
}
