//! Delimited text I/O for [`Frame`]s.
//!
//! The first line is a header. A column is numeric when every non-empty
//! cell parses as a float; empty cells in numeric columns become `NaN`.
//! Fields containing the delimiter, a quote or a newline are written
//! double-quoted, with embedded quotes doubled, and read back the same way.

use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::error::DataError;
use crate::frame::{Column, Frame};

/// Read a delimited file into a frame.
///
/// # Errors
///
/// Returns [`DataError::Io`] if the file cannot be read, or any error
/// from [`parse_delimited`].
pub fn read_delimited(path: &Path, delimiter: char) -> Result<Frame, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = parse_delimited(&text, delimiter)?;
    debug!(
        path = %path.display(),
        rows = frame.n_rows(),
        columns = frame.n_columns(),
        "delimited file read"
    );
    Ok(frame)
}

/// Parse delimited text into a frame.
///
/// # Errors
///
/// Returns [`DataError::Empty`] if there is no header, or
/// [`DataError::Parse`] if a record has the wrong number of fields or an
/// unterminated quote.
pub fn parse_delimited(text: &str, delimiter: char) -> Result<Frame, DataError> {
    let mut records = split_records(text, delimiter)?.into_iter();

    let header = records.next().ok_or(DataError::Empty)?.fields;
    let width = header.len();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); width];
    for record in records {
        if record.fields.len() != width {
            return Err(DataError::Parse {
                line: record.line,
                message: format!("expected {width} fields, found {}", record.fields.len()),
            });
        }
        for (column, field) in cells.iter_mut().zip(record.fields) {
            column.push(field);
        }
    }

    let mut frame = Frame::new();
    for (name, values) in header.iter().zip(cells) {
        frame.push_column(name.trim(), infer_column(values))?;
    }
    Ok(frame)
}

/// Write a frame as delimited text.
///
/// # Errors
///
/// Returns [`DataError::Io`] if the file cannot be written.
pub fn write_delimited(frame: &Frame, path: &Path, delimiter: char) -> Result<(), DataError> {
    std::fs::write(path, to_delimited_string(frame, delimiter)).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = frame.n_rows(), "delimited file written");
    Ok(())
}

/// Render a frame as delimited text, header first.
pub fn to_delimited_string(frame: &Frame, delimiter: char) -> String {
    let mut out = String::new();
    let header: Vec<String> = frame
        .column_names()
        .iter()
        .map(|n| quote(n, delimiter))
        .collect();
    out.push_str(&header.join(&delimiter.to_string()));
    out.push('\n');

    let columns: Vec<&Column> = frame.iter().map(|(_, c)| c).collect();
    for row in 0..frame.n_rows() {
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                out.push(delimiter);
            }
            match column {
                Column::Numeric(v) => {
                    if let Some(x) = v.get(row).filter(|x| !x.is_nan()) {
                        let _ = write!(out, "{x}");
                    }
                }
                Column::Text(v) => {
                    if let Some(s) = v.get(row) {
                        out.push_str(&quote(s, delimiter));
                    }
                }
            }
        }
        out.push('\n');
    }
    out
}

fn infer_column(values: Vec<String>) -> Column {
    let numeric = values
        .iter()
        .all(|v| v.trim().is_empty() || v.trim().parse::<f64>().is_ok());
    if numeric {
        Column::Numeric(
            values
                .iter()
                .map(|v| v.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        Column::Text(values)
    }
}

fn quote(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// One record and the line it starts on.
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Split text into records. A quoted field may span line breaks; blank
/// lines outside quotes are skipped.
fn split_records(text: &str, delimiter: char) -> Result<Vec<Record>, DataError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1_usize;
    let mut start = line;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line = line.saturating_add(1);
                }
                field.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
            quoted = true;
        } else if c == delimiter {
            fields.push(core::mem::take(&mut field));
        } else if c == '\n' {
            fields.push(core::mem::take(&mut field));
            push_record(&mut records, start, core::mem::take(&mut fields), quoted);
            quoted = false;
            line = line.saturating_add(1);
            start = line;
        } else if c != '\r' {
            field.push(c);
        }
    }

    if in_quotes {
        return Err(DataError::Parse {
            line: start,
            message: String::from("unterminated quoted field"),
        });
    }
    fields.push(field);
    push_record(&mut records, start, fields, quoted);
    Ok(records)
}

fn push_record(records: &mut Vec<Record>, line: usize, fields: Vec<String>, quoted: bool) {
    let blank = !quoted && fields.len() == 1 && fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(Record { line, fields });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_columns_are_inferred() {
        let frame = parse_delimited("afruid,ADurbfrac,iso\n1,0.5,KEN\n2,,GHA\n", ',').unwrap();
        assert_eq!(frame.numeric("afruid").unwrap(), &[1.0, 2.0]);
        let urb = frame.numeric("ADurbfrac").unwrap();
        assert_eq!(urb[0], 0.5);
        assert!(urb[1].is_nan());
        assert!(frame.numeric("iso").is_err());
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let frame = parse_delimited("name;v\n\"a;b\";1\n\"say \"\"hi\"\"\";2\n", ';').unwrap();
        let names = frame.column("name").unwrap().as_text().unwrap();
        assert_eq!(names, &["a;b", "say \"hi\""]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = parse_delimited("a,b\n1,2\n3\n", ',');
        assert!(matches!(result, Err(DataError::Parse { line: 3, .. })));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(parse_delimited("\n  \n", ','), Err(DataError::Empty)));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        assert!(matches!(
            parse_delimited("a\n\"open\n", ','),
            Err(DataError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn file_roundtrip_preserves_values() {
        let frame = Frame::new()
            .with_column("Y", Column::Numeric(vec![1.25, -0.5, f64::NAN]))
            .unwrap()
            .with_column("label", Column::Text(vec!["a".into(), "b,c".into(), "d".into()]))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.csv");
        write_delimited(&frame, &path, ',').unwrap();
        let back = read_delimited(&path, ',').unwrap();
        let y = back.numeric("Y").unwrap();
        assert_eq!(&y[..2], &[1.25, -0.5]);
        assert!(y[2].is_nan());
        assert_eq!(back.column("label").unwrap().as_text().unwrap()[1], "b,c");
    }

    #[test]
    fn quoted_newlines_survive_a_roundtrip() {
        let frame = Frame::new()
            .with_column("label", Column::Text(vec!["line1\nline2".into(), "x".into()]))
            .unwrap()
            .with_column("v", Column::Numeric(vec![1.0, 2.0]))
            .unwrap();
        let text = to_delimited_string(&frame, ',');
        let back = parse_delimited(&text, ',').unwrap();
        assert_eq!(back.n_rows(), 2);
        assert_eq!(back.text("label").unwrap(), &["line1\nline2", "x"]);
        assert_eq!(back.numeric("v").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn line_numbers_count_lines_inside_quotes() {
        let result = parse_delimited("a,b\n\"multi\nline\",1\n2\n", ',');
        assert!(matches!(result, Err(DataError::Parse { line: 4, .. })));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_delimited(Path::new("/nonexistent/panel.csv"), ',').unwrap_err();
        assert!(err.to_string().contains("panel.csv"));
    }
}
