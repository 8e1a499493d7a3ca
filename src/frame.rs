//! In-memory string tables loaded from CSV, TSV, or Parquet inputs.

use std::{collections::HashMap, fs::File, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate};
use encoding_rs::Encoding;
use log::info;
use parquet::{
    file::reader::{FileReader, SerializedFileReader},
    record::Field,
};

use crate::{
    io_utils::{self, InputFormat},
    schema,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A rectangular table of cell text, one `Vec<String>` per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Returns a copy whose headers follow the first-letter-capitalized convention.
    pub fn with_normalized_headers(&self) -> Frame {
        Frame {
            headers: schema::normalize_headers(&self.headers),
            rows: self.rows.clone(),
        }
    }
}

pub fn load(path: &Path, delimiter: Option<u8>, encoding: &'static Encoding) -> Result<Frame> {
    let frame = match io_utils::resolve_input_format(path, delimiter) {
        InputFormat::Parquet => load_parquet(path)?,
        InputFormat::Delimited(delimiter) => load_csv(path, delimiter, encoding)?,
    };
    info!(
        "Loaded {} row(s) across {} column(s) from {:?}",
        frame.len(),
        frame.headers.len(),
        path
    );
    Ok(frame)
}

pub fn load_csv(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Frame> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {:?}", row_idx + 2, path))?;
        rows.push(io_utils::decode_record(&record, encoding)?);
    }
    Ok(Frame::new(headers, rows))
}

pub fn load_parquet(path: &Path) -> Result<Frame> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("Reading parquet metadata from {path:?}"))?;
    let headers = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect::<Vec<_>>();
    let positions = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), idx))
        .collect::<HashMap<_, _>>();

    let mut rows = Vec::new();
    let iter = reader
        .get_row_iter(None)
        .with_context(|| format!("Iterating parquet rows in {path:?}"))?;
    for (row_idx, row) in iter.enumerate() {
        let row = row.with_context(|| format!("Reading parquet row {row_idx} in {path:?}"))?;
        let mut cells = vec![String::new(); headers.len()];
        for (name, field) in row.get_column_iter() {
            if let Some(&idx) = positions.get(name) {
                cells[idx] = field_text(field);
            }
        }
        rows.push(cells);
    }
    Ok(Frame::new(headers, rows))
}

fn field_text(field: &Field) -> String {
    match field {
        Field::Null => String::new(),
        Field::Str(value) => value.clone(),
        Field::Bool(value) => value.to_string(),
        Field::Byte(value) => value.to_string(),
        Field::Short(value) => value.to_string(),
        Field::Int(value) => value.to_string(),
        Field::Long(value) => value.to_string(),
        Field::UByte(value) => value.to_string(),
        Field::UShort(value) => value.to_string(),
        Field::UInt(value) => value.to_string(),
        Field::ULong(value) => value.to_string(),
        Field::Float(value) => value.to_string(),
        Field::Double(value) => value.to_string(),
        Field::Date(days) => u64::try_from(*days)
            .ok()
            .and_then(|days| NaiveDate::default().checked_add_days(Days::new(days)))
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Field::TimestampMillis(millis) => DateTime::from_timestamp_millis(*millis)
            .map(|ts| ts.naive_utc().format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        Field::TimestampMicros(micros) => DateTime::from_timestamp_micros(*micros)
            .map(|ts| ts.naive_utc().format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn load_csv_reads_headers_and_rows() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("orders.csv");
        let mut file = File::create(&path).expect("create csv");
        writeln!(file, "order_id,origin_country").unwrap();
        writeln!(file, "1,SE").unwrap();
        writeln!(file, "2,").unwrap();
        drop(file);

        let frame = load(&path, None, UTF_8).expect("load csv");
        assert_eq!(frame.headers, vec!["order_id", "origin_country"]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.cell(0, 1), "SE");
        assert_eq!(frame.cell(1, 1), "");
        assert_eq!(frame.cell(9, 9), "");
    }

    #[test]
    fn load_csv_honours_custom_delimiter() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("errands.txt");
        std::fs::write(&path, "order_number;errand_type\n1z;refund\n").expect("write");
        let frame = load(&path, Some(b';'), UTF_8).expect("load");
        assert_eq!(frame.headers, vec!["order_number", "errand_type"]);
        assert_eq!(frame.rows, vec![vec!["1z".to_string(), "refund".to_string()]]);
    }

    #[test]
    fn normalized_headers_leave_original_frame_untouched() {
        let frame = Frame::new(
            vec!["order_id".into(), "brand".into()],
            vec![vec!["1".into(), "Brand A".into()]],
        );
        let normalized = frame.with_normalized_headers();
        assert_eq!(normalized.headers, vec!["Order_id", "Brand"]);
        assert_eq!(frame.headers, vec!["order_id", "brand"]);
        assert_eq!(normalized.rows, frame.rows);
    }

    fn write_orders_parquet(path: &Path, rows: &[(i64, &str)]) {
        use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
        use parquet::file::properties::WriterProperties;
        use parquet::file::writer::SerializedFileWriter;
        use parquet::schema::parser::parse_message_type;
        use std::sync::Arc;

        let schema = Arc::new(
            parse_message_type(
                "message orders {
                    REQUIRED INT64 order_id;
                    REQUIRED BINARY partner (UTF8);
                }",
            )
            .unwrap(),
        );
        let props = Arc::new(WriterProperties::builder().build());
        let file = File::create(path).unwrap();
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        if let Some(mut col_writer) = row_group.next_column().unwrap() {
            let values = rows.iter().map(|(id, _)| *id).collect::<Vec<_>>();
            col_writer
                .typed::<Int64Type>()
                .write_batch(&values, None, None)
                .unwrap();
            col_writer.close().unwrap();
        }
        if let Some(mut col_writer) = row_group.next_column().unwrap() {
            let values = rows
                .iter()
                .map(|(_, partner)| ByteArray::from(*partner))
                .collect::<Vec<_>>();
            col_writer
                .typed::<ByteArrayType>()
                .write_batch(&values, None, None)
                .unwrap();
            col_writer.close().unwrap();
        }
        row_group.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn load_parquet_renders_cells_as_text() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("orders.parquet");
        write_orders_parquet(&path, &[(10, "Partner CO"), (36, "Partner X")]);

        let frame = load(&path, None, UTF_8).expect("load parquet");
        assert_eq!(frame.headers, vec!["order_id", "partner"]);
        assert_eq!(
            frame.rows,
            vec![
                vec!["10".to_string(), "Partner CO".to_string()],
                vec!["36".to_string(), "Partner X".to_string()],
            ]
        );
    }

    #[test]
    fn field_text_renders_parquet_values() {
        assert_eq!(field_text(&Field::Null), "");
        assert_eq!(field_text(&Field::Str("SE".into())), "SE");
        assert_eq!(field_text(&Field::Long(123456)), "123456");
        assert_eq!(field_text(&Field::Bool(true)), "true");
        assert_eq!(field_text(&Field::Date(19_000)), "2022-01-08");
        assert_eq!(
            field_text(&Field::TimestampMillis(1_700_000_000_000)),
            "2023-11-14 22:13:20"
        );
    }
}
