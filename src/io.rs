//! CSV input.
//!
//! A data file holds one date column and one value column. Columns are
//! picked by header name or zero-based index; by default the first column
//! holds dates and the second the values.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Column selection and dialect for [`read_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Header name or index of the date column.
    pub date_column: String,
    /// Header name or index of the value column.
    pub value_column: String,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            date_column: "0".to_string(),
            value_column: "1".to_string(),
            delimiter: b',',
        }
    }
}

impl CsvOptions {
    pub fn with_columns(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
            ..Self::default()
        }
    }
}

/// Load a series from a CSV file.
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<TimeSeries> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ForecastError::DataLoad(format!("cannot open {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "reading CSV");
    read_csv_from_reader(BufReader::new(file), options)
}

/// Load a series from any CSV source.
///
/// Blank or non-numeric values become NaN so that gaps survive until the
/// missing-value policy is applied. Rows are sorted by date; a repeated date
/// is an error.
///
/// # Example
/// ```
/// use smoothcast::io::{read_csv_from_reader, CsvOptions};
///
/// let data = "date,co2\n1958-03-29,316.1\n1958-04-05,317.3\n1958-04-12,\n";
/// let ts = read_csv_from_reader(data.as_bytes(), &CsvOptions::default()).unwrap();
///
/// assert_eq!(ts.len(), 3);
/// assert!(ts.values()[2].is_nan());
/// ```
pub fn read_csv_from_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<TimeSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let date_idx = resolve_column(&headers, &options.date_column)?;
    let value_idx = resolve_column(&headers, &options.value_column)?;

    let mut rows: Vec<(DateTime<Utc>, f64)> = Vec::new();
    let mut unparsable = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or("");
        let timestamp = parse_timestamp(raw_date).ok_or_else(|| {
            ForecastError::DataLoad(format!(
                "row {}: cannot parse date '{raw_date}'",
                line + 1
            ))
        })?;

        let value = match record.get(value_idx).map(str::parse::<f64>) {
            Some(Ok(v)) => v,
            _ => {
                unparsable += 1;
                f64::NAN
            }
        };
        rows.push((timestamp, value));
    }

    if rows.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    rows.sort_by_key(|(t, _)| *t);
    if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(ForecastError::DataLoad(format!(
            "duplicate date {}",
            pair[0].0.format("%Y-%m-%d %H:%M:%S")
        )));
    }

    if unparsable > 0 {
        tracing::warn!(count = unparsable, "non-numeric values read as missing");
    }
    tracing::info!(rows = rows.len(), "loaded series");

    let (timestamps, values) = rows.into_iter().unzip();
    TimeSeries::new(timestamps, values)
}

fn resolve_column(headers: &csv::StringRecord, column: &str) -> Result<usize> {
    let index = match column.parse::<usize>() {
        Ok(idx) => idx,
        Err(_) => headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ForecastError::DataLoad(format!("column '{column}' not found")))?,
    };

    if index >= headers.len() {
        return Err(ForecastError::DataLoad(format!(
            "column index {index} out of range for {} columns",
            headers.len()
        )));
    }
    Ok(index)
}

/// Accepts `%Y-%m-%d`, `%Y-%m-%d %H:%M:%S` and RFC 3339.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_named_columns_and_sorts() {
        let data = "\
station,value,date
mlo,317.5,1958-05-01
mlo,315.7,1958-03-01
mlo,317.4,1958-04-01
";
        let options = CsvOptions::with_columns("date", "value");
        let ts = read_csv_from_reader(data.as_bytes(), &options).unwrap();

        assert_eq!(ts.values(), &[315.7, 317.4, 317.5]);
        assert_eq!(ts.timestamps()[0].month(), 3);
    }

    #[test]
    fn accepts_all_date_formats() {
        assert_eq!(
            parse_timestamp("1997-12-01"),
            Some(Utc.with_ymd_and_hms(1997, 12, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("1997-12-01 06:30:00"),
            Some(Utc.with_ymd_and_hms(1997, 12, 1, 6, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("1997-12-01T02:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(1997, 12, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("12/01/1997"), None);
    }

    #[test]
    fn bad_values_become_missing() {
        let data = "date,co2\n2000-01-01,369.2\n2000-02-01,n/a\n2000-03-01,\n";
        let ts = read_csv_from_reader(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(ts.missing_count(), 2);
    }

    #[test]
    fn bad_dates_and_duplicates_fail() {
        let bad_date = "date,co2\nyesterday,1.0\n";
        assert!(matches!(
            read_csv_from_reader(bad_date.as_bytes(), &CsvOptions::default()),
            Err(ForecastError::DataLoad(_))
        ));

        let duplicate = "date,co2\n2000-01-01,1.0\n2000-01-01,2.0\n";
        assert!(matches!(
            read_csv_from_reader(duplicate.as_bytes(), &CsvOptions::default()),
            Err(ForecastError::DataLoad(_))
        ));
    }

    #[test]
    fn missing_column_fails() {
        let data = "date,co2\n2000-01-01,1.0\n";
        let options = CsvOptions::with_columns("date", "ppm");
        assert!(matches!(
            read_csv_from_reader(data.as_bytes(), &options),
            Err(ForecastError::DataLoad(_))
        ));

        let options = CsvOptions::with_columns("0", "5");
        assert!(read_csv_from_reader(data.as_bytes(), &options).is_err());
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(
            read_csv_from_reader("date,co2\n".as_bytes(), &CsvOptions::default()),
            Err(ForecastError::EmptyData)
        ));
    }

    #[test]
    fn reads_semicolon_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "date;co2\n2001-01-01;370.1\n2001-02-01;371.0\n").unwrap();

        let options = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        let ts = read_csv(file.path(), &options).unwrap();
        assert_eq!(ts.len(), 2);
        assert_eq!(ts.values()[1], 371.0);
    }
}
