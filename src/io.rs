use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{BoxError, CleanError, Result};
use crate::models::{CleanedRecord, RawRecord, CLEANED_COLUMNS, KEPT_COLUMNS};

/// Read the raw export and project it onto [`KEPT_COLUMNS`].
///
/// Rows shorter than the header are padded with missing values. Rows longer
/// than the header are a parse error.
pub fn load_raw(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => CleanError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CleanError::Read {
            path: path.to_path_buf(),
            source: err,
        },
    })?;

    let parse_error = |source: BoxError| CleanError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| parse_error(err.into()))?
        .clone();
    if headers.is_empty() {
        return Err(parse_error("no columns to parse from file".into()));
    }
    check_schema(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let mut row = result.map_err(|err| parse_error(err.into()))?;
        if row.len() > headers.len() {
            let line = row.position().map(|pos| pos.line()).unwrap_or_default();
            return Err(parse_error(
                format!(
                    "line {}: expected {} fields, saw {}",
                    line,
                    headers.len(),
                    row.len()
                )
                .into(),
            ));
        }
        while row.len() < headers.len() {
            row.push_field("");
        }
        let record: RawRecord = row
            .deserialize(Some(&headers))
            .map_err(|err| parse_error(err.into()))?;
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "loaded raw export");
    Ok(records)
}

/// Every kept column must appear in the header. All absent names are reported
/// together, in kept-column order.
pub fn check_schema(headers: &StringRecord) -> Result<()> {
    let missing: Vec<String> = KEPT_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CleanError::Schema { missing })
    }
}

/// Write the cleaned rows with a header, creating parent directories first.
///
/// Rows go to a temporary file beside the destination which is renamed into
/// place once complete, so a failed write never leaves a truncated file.
pub fn write_cleaned(path: &Path, records: &[CleanedRecord]) -> Result<()> {
    let write_error = |source: BoxError| CleanError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| write_error(err.into()))?;

    let staging = NamedTempFile::new_in(parent).map_err(|err| write_error(err.into()))?;
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(staging.as_file());
        writer
            .write_record(CLEANED_COLUMNS)
            .map_err(|err| write_error(err.into()))?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|err| write_error(err.into()))?;
        }
        writer.flush().map_err(|err| write_error(err.into()))?;
    }

    let permissions = match fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(_) => default_permissions(&staging)?,
    };
    fs::set_permissions(staging.path(), permissions).map_err(|err| write_error(err.into()))?;

    staging
        .persist(path)
        .map_err(|err| write_error(err.error.into()))?;

    debug!(path = %path.display(), rows = records.len(), "wrote cleaned dataset");
    Ok(())
}

/// Mode for a freshly created output file. The staging file is private, the
/// cleaned dataset is not.
#[cfg(unix)]
fn default_permissions(_staging: &NamedTempFile) -> Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(staging: &NamedTempFile) -> Result<fs::Permissions> {
    staging
        .as_file()
        .metadata()
        .map(|meta| meta.permissions())
        .map_err(|err| CleanError::Write {
            path: staging.path().to_path_buf(),
            source: err.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "Num_Acc,date,an,lat,long,age,grav,sexe,atm,lum,dep,hrmn,trajet";

    fn write_raw(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("raw.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = load_raw(&path).unwrap_err();
        assert!(matches!(err, CleanError::NotFound { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn loads_kept_columns_and_ignores_extra_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            &format!("{HEADER}\n1,2021-05-01,2021,48.85,2.35,34,3,1,1,1,75,14:30,5\n"),
        );

        let records = load_raw(&path).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.num_acc.as_deref(), Some("1"));
        assert_eq!(record.lat.as_deref(), Some("48.85"));
        assert_eq!(record.dep.as_deref(), Some("75"));
        assert_eq!(record.hrmn.as_deref(), Some("14:30"));
    }

    #[test]
    fn empty_fields_and_short_rows_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            &format!("{HEADER}\n2,,2021,48.85,2.35,,3,1,1,1,75,14:30,5\n3,2021-05-01,2021,48.85\n"),
        );

        let records = load_raw(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, None);
        assert_eq!(records[0].age, None);
        assert_eq!(records[1].lat.as_deref(), Some("48.85"));
        assert_eq!(records[1].long, None);
        assert_eq!(records[1].hrmn, None);
    }

    #[test]
    fn overlong_row_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            &format!("{HEADER}\n1,2021-05-01,2021,48.85,2.35,34,3,1,1,1,75,14:30,5,extra\n"),
        );

        let err = load_raw(&path).unwrap_err();
        assert!(matches!(err, CleanError::Parse { .. }));
        assert!(err.to_string().contains("expected 13 fields"));
    }

    #[test]
    fn empty_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(dir.path(), "");
        let err = load_raw(&path).unwrap_err();
        assert!(matches!(err, CleanError::Parse { .. }));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let mut bytes = format!("{HEADER}\n1,2021-05-01,2021,48.85,2.35,34,3,1,1,1,").into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",14:30,5\n");
        fs::write(&path, bytes).unwrap();

        let err = load_raw(&path).unwrap_err();
        assert!(matches!(err, CleanError::Parse { .. }));
    }

    #[test]
    fn schema_error_lists_every_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(dir.path(), "Num_Acc,date,lat,long,age,grav,sexe,atm,lum\n");

        match load_raw(&path).unwrap_err() {
            CleanError::Schema { missing } => {
                assert_eq!(missing, vec!["dep".to_string(), "hrmn".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn writes_header_and_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("cleaned").join("out.csv");
        let records = vec![CleanedRecord {
            num_acc: Some("1".to_string()),
            date: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            lat: 48.85,
            long: 2.0,
            age: 34,
            grav: Some("3".to_string()),
            sexe: Some("1".to_string()),
            atm: None,
            lum: Some("1".to_string()),
            dep: Some("75".to_string()),
            hour: 14,
        }];

        write_cleaned(&path, &records).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Num_Acc,date,lat,long,age,grav,sexe,atm,lum,dep,hour\n\
             1,2021-05-01,48.85,2.0,34,3,1,,1,75,14\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn new_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_cleaned(&path, &[]).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_existing_output_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();

        write_cleaned(&path, &[]).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o664);
        assert!(fs::read_to_string(&path).unwrap().starts_with("Num_Acc,"));
    }

    #[cfg(unix)]
    #[test]
    fn unopenable_input_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("raw.csv");

        let err = load_raw(&path).unwrap_err();
        assert!(matches!(err, CleanError::Read { .. }), "got {err:?}");
        assert!(err.to_string().contains("raw.csv"));
    }

    #[test]
    fn empty_result_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_cleaned(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Num_Acc,date,lat,long,age,grav,sexe,atm,lum,dep,hour\n"
        );
    }
}
