//! Source table loader with encoding and delimiter auto-detection.
//!
//! Reads the supply-chain CSV into a [`Dataset`], keeping row order. A missing
//! file is reported as [`SourceError::NotFound`], distinct from content that
//! fails to parse.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::error::{SourceError, SourceResult};
use crate::models::{columns, Dataset, Record};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records, in source order
    pub records: Dataset,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
///
/// Bytes that are invalid for the encoding fail with
/// [`SourceError::Encoding`]; nothing is replaced silently.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => decode_utf8(bytes),
        label => {
            let Some(codec) = encoding_rs::Encoding::for_label(label.as_bytes()) else {
                // Unknown label: accept only clean UTF-8
                return decode_utf8(bytes);
            };
            let (text, _, had_errors) = codec.decode(bytes);
            if had_errors {
                return Err(SourceError::Encoding(format!(
                    "invalid byte sequence for {}",
                    codec.name()
                )));
            }
            Ok(text.to_string())
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> SourceResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        SourceError::Encoding(format!(
            "invalid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Load the dataset at `path`.
///
/// Returns [`SourceError::NotFound`] when the file is absent, so callers can
/// tell "no data supplied" apart from "data is broken".
pub fn load_dataset<P: AsRef<Path>>(path: P) -> SourceResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SourceError::Io(e),
    })?;

    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> SourceResult<ParseResult> {
    let (headers, records) = read_table(content.as_bytes(), delimiter)?;
    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse CSV from a reader into records.
pub fn parse_csv<R: Read>(reader: R, delimiter: char) -> SourceResult<Dataset> {
    read_table(reader, delimiter).map(|(_, records)| records)
}

/// Position of every required column in the header row.
struct ColumnIndex {
    sku: usize,
    product_type: usize,
    revenue: usize,
    units_sold: usize,
    price: usize,
    defect_rate: usize,
    stock_level: usize,
    shipping_carrier: usize,
    transportation_mode: usize,
    shipping_cost: usize,
    location: usize,
    extra: Vec<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> SourceResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SourceError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !columns::REQUIRED.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            sku: find(columns::SKU)?,
            product_type: find(columns::PRODUCT_TYPE)?,
            revenue: find(columns::REVENUE)?,
            units_sold: find(columns::UNITS_SOLD)?,
            price: find(columns::PRICE)?,
            defect_rate: find(columns::DEFECT_RATE)?,
            stock_level: find(columns::STOCK_LEVEL)?,
            shipping_carrier: find(columns::SHIPPING_CARRIER)?,
            transportation_mode: find(columns::TRANSPORTATION_MODE)?,
            shipping_cost: find(columns::SHIPPING_COST)?,
            location: find(columns::LOCATION)?,
            extra,
        })
    }
}

/// One data row being converted, with enough context for error messages.
struct Row<'a> {
    line: usize,
    cells: &'a csv::StringRecord,
    headers: &'a [String],
}

impl Row<'_> {
    fn text(&self, idx: usize) -> String {
        self.cells.get(idx).unwrap_or("").to_string()
    }

    fn invalid(&self, idx: usize, message: &str) -> SourceError {
        SourceError::InvalidValue {
            line: self.line,
            column: self.headers[idx].clone(),
            value: self.text(idx),
            message: message.to_string(),
        }
    }

    fn real(&self, idx: usize) -> SourceResult<f64> {
        match self.cells.get(idx).unwrap_or("").parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.invalid(idx, "expected a finite number")),
        }
    }

    fn count(&self, idx: usize) -> SourceResult<u64> {
        self.cells
            .get(idx)
            .unwrap_or("")
            .parse::<u64>()
            .map_err(|_| self.invalid(idx, "expected a non-negative integer"))
    }
}

fn read_table<R: Read>(reader: R, delimiter: char) -> SourceResult<(Vec<String>, Dataset)> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| SourceError::Encoding(format!("delimiter '{}' is not ASCII", delimiter)))?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| csv_error(1, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::Empty);
    }

    let index = ColumnIndex::from_headers(&headers)?;
    let column_order: Arc<[String]> = headers.clone().into();
    let mut records = Vec::new();

    for (row_idx, result) in csv_reader.records().enumerate() {
        let fallback_line = row_idx + 2; // +1 for 0-index, +1 for header
        let cells = result.map_err(|e| csv_error(fallback_line, e))?;

        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        let line = cells
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);
        let row = Row {
            line,
            cells: &cells,
            headers: &headers,
        };

        records.push(Record {
            sku: row.text(index.sku),
            product_type: row.text(index.product_type),
            location: row.text(index.location),
            shipping_carrier: row.text(index.shipping_carrier),
            transportation_mode: row.text(index.transportation_mode),
            revenue: row.real(index.revenue)?,
            units_sold: row.count(index.units_sold)?,
            price: row.real(index.price)?,
            defect_rate: row.real(index.defect_rate)?,
            stock_level: row.count(index.stock_level)?,
            shipping_cost: row.real(index.shipping_cost)?,
            extra: index
                .extra
                .iter()
                .map(|&i| (headers[i].clone(), row.text(i)))
                .collect(),
            column_order: Some(Arc::clone(&column_order)),
        });
    }

    Ok((headers, records))
}

fn csv_error(fallback_line: usize, err: csv::Error) -> SourceError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback_line);
    match err.into_kind() {
        csv::ErrorKind::Io(io) => SourceError::Io(io),
        kind => SourceError::Csv {
            line,
            message: format!("{:?}", kind),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Product type,SKU,Price,Availability,Number of products sold,Revenue generated,Stock levels,Shipping carriers,Shipping costs,Location,Defect rates,Transportation modes";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_simple_csv() {
        let csv = csv_with(&[
            "haircare,SKU0,69.8,55,802,8661.99,58,Carrier B,2.95,Mumbai,0.22,Road",
            "skincare,SKU1,14.84,95,736,7460.90,53,Carrier A,9.71,Mumbai,4.85,Road",
        ]);
        let rows = parse_csv(csv.as_bytes(), ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "SKU0");
        assert_eq!(rows[0].product_type, "haircare");
        assert_eq!(rows[0].units_sold, 802);
        assert_eq!(rows[0].stock_level, 58);
        assert!((rows[0].revenue - 8661.99).abs() < 1e-9);
        assert_eq!(rows[1].shipping_carrier, "Carrier A");
        assert_eq!(rows[1].transportation_mode, "Road");
    }

    #[test]
    fn test_extra_columns_kept_in_order() {
        let csv = csv_with(&["haircare,SKU0,69.8,55,802,8661.99,58,Carrier B,2.95,Mumbai,0.22,Road"]);
        let rows = parse_csv(csv.as_bytes(), ',').unwrap();

        assert_eq!(rows[0].extra, vec![("Availability".to_string(), "55".to_string())]);
    }

    #[test]
    fn test_records_share_header_order() {
        let csv = csv_with(&[
            "haircare,SKU0,69.8,55,802,8661.99,58,Carrier B,2.95,Mumbai,0.22,Road",
            "skincare,SKU1,14.84,95,736,7460.90,53,Carrier A,9.71,Mumbai,4.85,Road",
        ]);
        let result = parse_string_with_metadata(&csv, ',', "utf-8".to_string()).unwrap();

        let order = result.records[0].column_order.as_ref().unwrap();
        assert_eq!(&order[..], result.headers.as_slice());
        assert!(Arc::ptr_eq(order, result.records[1].column_order.as_ref().unwrap()));

        let json = serde_json::to_string(&result.records[0]).unwrap();
        assert!(json.starts_with(r#"{"Product type":"haircare","SKU":"SKU0","Price":69.8,"Availability":55,"#));
    }

    #[test]
    fn test_quoted_values() {
        let csv = csv_with(&[r#""hair, care",SKU0,1,2,3,4,5,"Carrier B",6,Mumbai,0.1,Road"#]);
        let rows = parse_csv(csv.as_bytes(), ',').unwrap();

        assert_eq!(rows[0].product_type, "hair, care");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = csv_with(&[
            "haircare,SKU0,1,2,3,4,5,Carrier B,6,Mumbai,0.1,Road",
            "",
            "haircare,SKU1,1,2,3,4,5,Carrier B,6,Mumbai,0.1,Road",
        ]);
        let rows = parse_csv(csv.as_bytes(), ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].sku, "SKU1");
    }

    #[test]
    fn test_missing_column() {
        let csv = "SKU,Price\nSKU0,1.0";
        let err = parse_csv(csv.as_bytes(), ',').unwrap_err();

        match err {
            SourceError::MissingColumn { column } => assert_eq!(column, "Product type"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_cell_reports_line_and_column() {
        let csv = csv_with(&[
            "haircare,SKU0,1,2,3,4,5,Carrier B,6,Mumbai,0.1,Road",
            "haircare,SKU1,abc,2,3,4,5,Carrier B,6,Mumbai,0.1,Road",
        ]);
        let err = parse_csv(csv.as_bytes(), ',').unwrap_err();

        match err {
            SourceError::InvalidValue { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Price");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_units_rejected() {
        let csv = csv_with(&["haircare,SKU0,1,2,-3,4,5,Carrier B,6,Mumbai,0.1,Road"]);
        let err = parse_csv(csv.as_bytes(), ',').unwrap_err();

        assert!(err.to_string().contains("Number of products sold"));
    }

    #[test]
    fn test_blank_numeric_cell_rejected() {
        let csv = csv_with(&["haircare,SKU0,1,2,3,,5,Carrier B,6,Mumbai,0.1,Road"]);
        let err = parse_csv(csv.as_bytes(), ',').unwrap_err();

        assert!(matches!(err, SourceError::InvalidValue { ref column, .. } if column == "Revenue generated"));
    }

    #[test]
    fn test_headers_only_is_empty_dataset() {
        let rows = parse_csv(HEADER.as_bytes(), ',').unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_csv_error() {
        let err = parse_csv("".as_bytes(), ',').unwrap_err();
        assert!(matches!(err, SourceError::Empty));
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_format_delimiter() {
        assert_eq!(format_delimiter(','), ",");
        assert_eq!(format_delimiter('\t'), "\\t");
    }

    #[test]
    fn test_auto_parse_semicolon() {
        let csv = csv_with(&["haircare,SKU0,1,2,3,4,5,Carrier B,6,Mumbai,0.1,Road"]).replace(',', ";");
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.headers.len(), 12);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_invalid_utf8_is_an_encoding_error() {
        let bytes: &[u8] = &[b'a', b',', 0xFF, 0xFE, b'b'];
        let err = decode_content(bytes, "utf-8").unwrap_err();

        assert!(matches!(err, SourceError::Encoding(_)));
        assert!(err.to_string().contains("byte 2"));
    }

    #[test]
    fn test_unknown_label_requires_clean_utf8() {
        assert_eq!(decode_content(b"a,b", "x-no-such-charset").unwrap(), "a,b");
        assert!(matches!(
            decode_content(&[0xC3, 0x28], "x-no-such-charset"),
            Err(SourceError::Encoding(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(dir.path().join("absent.csv")).unwrap_err();

        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let csv = csv_with(&[
            "haircare,SKU0,1,2,3,4,5,Carrier B,6,Mumbai,0.1,Road",
            "skincare,SKU1,1,2,9,4,5,Carrier A,6,Delhi,0.1,Air",
        ]);
        file.write_all(csv.as_bytes()).unwrap();

        let first = load_dataset(file.path()).unwrap();
        let second = load_dataset(file.path()).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.records[1].location, "Delhi");
    }
}
