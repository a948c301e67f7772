use csv::{ReaderBuilder, Writer};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::core::column::Column;
use crate::core::error::{Error, Result};
use crate::DataFrame;

/// Read a DataFrame from a CSV file
///
/// A column whose non-empty values all parse as numbers becomes a `Float64`
/// column (empty cells are missing values); any other column is read as
/// strings.
pub fn read_csv<P: AsRef<Path>>(path: P, has_header: bool) -> Result<DataFrame> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;

    // Set up the CSV reader
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(Error::Csv)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    // Get the header row
    let headers: Vec<String> = if has_header {
        rdr.headers()
            .map_err(Error::Csv)?
            .iter()
            .map(|h| h.to_string())
            .collect()
    } else {
        match rows.first() {
            // If there is no header, use "column_0", "column_1", etc.
            Some(first) => (0..first.len()).map(|i| format!("column_{}", i)).collect(),
            None => return Ok(DataFrame::new()),
        }
    };

    let mut df = DataFrame::new();
    for (i, header) in headers.into_iter().enumerate() {
        // If a row is shorter, the missing cells are empty
        let raw: Vec<&str> = rows
            .iter()
            .map(|row| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        df.add_column(header, infer_column(&raw))?;
    }

    Ok(df)
}

fn infer_column(raw: &[&str]) -> Column {
    let parsed: Option<Vec<f64>> = raw
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();

    match parsed {
        Some(values) if raw.iter().any(|cell| !cell.is_empty()) => Column::Float64(values),
        _ => Column::String(raw.iter().map(|cell| cell.to_string()).collect()),
    }
}

/// Write a DataFrame to a CSV file
pub fn write_csv<P: AsRef<Path>>(df: &DataFrame, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    let mut wtr = Writer::from_writer(file);

    // Write the header row
    let names = df.column_names();
    wtr.write_record(&names).map_err(Error::Csv)?;

    let columns = names
        .iter()
        .map(|name| df.column(name))
        .collect::<Result<Vec<_>>>()?;

    for row in 0..df.row_count() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| match column {
                Column::Float64(values) if values[row].is_nan() => String::new(),
                Column::Float64(values) => values[row].to_string(),
                Column::String(values) => values[row].clone(),
            })
            .collect();
        wtr.write_record(&record).map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

/// Path of an exported table: `.csv` is appended when `filename` has no
/// extension
pub fn export_path<P: AsRef<Path>>(filename: P) -> PathBuf {
    let path = filename.as_ref();
    if path.extension().is_none() {
        let mut name = path.as_os_str().to_owned();
        name.push(".csv");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    }
}

/// Write serializable records (one per row) to a CSV file
///
/// The header comes from the field names of the record type. Returns the
/// path actually written.
pub fn write_records<T, P>(records: &[T], filename: P) -> Result<PathBuf>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = export_path(filename);
    let mut wtr = Writer::from_path(&path).map_err(Error::Csv)?;
    for record in records {
        wtr.serialize(record).map_err(Error::Csv)?;
    }
    wtr.flush().map_err(Error::Io)?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_csv_infers_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "Pain,Color\n4.5,LB\n,DB\n3.25,LBr\n").unwrap();

        let df = read_csv(&path, true).unwrap();
        assert_eq!(df.column_names(), vec!["Pain", "Color"]);
        assert!(df.is_numeric_column("Pain"));
        assert!(!df.is_numeric_column("Color"));

        let pain = df.get_column_numeric_values("Pain").unwrap();
        assert_eq!(pain[0], 4.5);
        assert!(pain[1].is_nan());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut df = DataFrame::new();
        df.add_float_column("x", vec![1.0, f64::NAN]).unwrap();
        df.add_string_column("g", vec!["a", "b"]).unwrap();
        write_csv(&df, &path).unwrap();

        let back = read_csv(&path, true).unwrap();
        assert_eq!(back.row_count(), 2);
        assert!(back.get_column_numeric_values("x").unwrap()[1].is_nan());
        assert_eq!(back.get_column_string_values("g").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_export_path() {
        assert_eq!(export_path("table"), PathBuf::from("table.csv"));
        assert_eq!(export_path("table.txt"), PathBuf::from("table.txt"));
    }

    #[test]
    fn test_write_records() {
        #[derive(Serialize)]
        struct Row {
            #[serde(rename = "p-unc")]
            p_unc: f64,
            reject: Option<bool>,
        }

        let dir = tempdir().unwrap();
        let rows = vec![
            Row { p_unc: 0.5, reject: Some(false) },
            Row { p_unc: 0.01, reject: None },
        ];
        let path = write_records(&rows, dir.path().join("rows")).unwrap();
        assert!(path.ends_with("rows.csv"));

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("p-unc,reject\n"));
        assert!(contents.contains("0.01,\n"));
    }
}
