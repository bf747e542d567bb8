//! core/markers.rs
//! Read an audio-editor marker export (tab-delimited) into `Marker`s.
//!
//! - The header row is found by fuzzy column names ("name" / "start")
//! - Rows after the header are data
//! - Blank names are skipped, a bad start time fails the whole file
//! - Each marker remembers its data-row position, skipped rows included

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use super::error::{Error, Result};
use super::timecode::parse_time;
use super::types::Marker;

/// Read markers from a marker file on disk.
pub fn read_markers(path: &Path) -> Result<Vec<Marker>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::Fields)
        .from_path(path)
        .map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect(),
        );
    }

    let markers = markers_from_rows(&rows)?;
    info!(path = %path.display(), count = markers.len(), "markers loaded");
    Ok(markers)
}

/// Turn an already-split table into markers.
pub fn markers_from_rows(rows: &[Vec<String>]) -> Result<Vec<Marker>> {
    if rows.len() <= 1 {
        return Ok(Vec::new());
    }

    let header = find_header(rows).ok_or_else(|| {
        Error::Format("CSV format error: 'Name' and 'Start' columns not found".to_string())
    })?;
    debug!(
        row = header.row,
        name_col = header.name,
        start_col = header.start,
        "marker header located"
    );

    let min_len = header.name.max(header.start) + 1;
    let mut markers = Vec::new();

    for (position, row) in rows[header.row + 1..].iter().enumerate() {
        if row.len() < min_len {
            continue;
        }

        let name = row[header.name].trim();
        if name.is_empty() {
            continue;
        }

        let start_text = row[header.start].trim();
        let start = parse_time(start_text).map_err(|e| {
            Error::Format(format!(
                "Failed to parse start time '{start_text}' in row [{}]: {e}",
                row.join("\t")
            ))
        })?;

        markers.push(Marker::new(position, name, start));
    }

    Ok(markers)
}

struct Header {
    row: usize,
    name: usize,
    start: usize,
}

/// Column indices carry over between rows; the first row at which both are
/// known is the header. Within a row the last matching cell wins, and a cell
/// that mentions both words counts as the name column.
fn find_header(rows: &[Vec<String>]) -> Option<Header> {
    let mut name = None;
    let mut start = None;

    for (i, row) in rows.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            let cell = cell.trim().to_lowercase();
            if cell.contains("name") {
                name = Some(j);
            } else if cell.contains("start") {
                start = Some(j);
            }
        }

        if let (Some(name), Some(start)) = (name, start) {
            return Some(Header { row: i, name, start });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn reads_audition_style_rows() {
        let rows = table(&[
            &["Name", "Start Time", "Duration"],
            &["Intro", "0:00.000", "1:00.000"],
            &["", "1:00.000", "0:10.000"],
            &["Topic", "1:30.500", "0:10.000"],
        ]);

        let markers = markers_from_rows(&rows).unwrap();
        assert_eq!(
            markers,
            vec![
                Marker::new(0, "Intro", Duration::ZERO),
                Marker::new(2, "Topic", Duration::from_millis(90_500)),
            ]
        );
    }

    #[test]
    fn bad_start_time_aborts_everything() {
        let rows = table(&[
            &["Name", "Start"],
            &["Intro", "0:00.000"],
            &["Broken", "soon"],
        ]);

        let err = markers_from_rows(&rows).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("Broken\tsoon"));
    }

    #[test]
    fn header_may_be_preceded_by_junk_and_columns_reordered() {
        let rows = table(&[
            &["exported by some tool"],
            &["Start", "Marker Name"],
            &["12.25", "Outro"],
        ]);

        let markers = markers_from_rows(&rows).unwrap();
        assert_eq!(markers, vec![Marker::new(0, "Outro", Duration::from_millis(12_250))]);
    }

    #[test]
    fn short_rows_are_skipped() {
        let rows = table(&[
            &["Name", "Start"],
            &["lonely"],
            &["Kept", "3"],
        ]);

        let markers = markers_from_rows(&rows).unwrap();
        assert_eq!(markers, vec![Marker::new(1, "Kept", Duration::from_secs(3))]);
    }

    #[test]
    fn trivial_table_is_empty_but_headerless_content_is_an_error() {
        assert!(markers_from_rows(&[]).unwrap().is_empty());
        assert!(markers_from_rows(&table(&[&["Name", "Start"]])).unwrap().is_empty());

        let err = markers_from_rows(&table(&[&["a", "b"], &["c", "d"]])).unwrap_err();
        assert!(err.to_string().contains("columns not found"));
    }

    #[test]
    fn last_matching_cell_wins() {
        let rows = table(&[
            &["Name", "Start", "Display Name"],
            &["ignored", "1", "Shown"],
        ]);

        let markers = markers_from_rows(&rows).unwrap();
        assert_eq!(markers[0].name, "Shown");
    }

    #[test]
    fn reads_tab_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.csv");
        std::fs::write(
            &path,
            "Name\tStart\tDuration\tTime Format\tType\tDescription\n\
             Opening\t0:00.000\t0:00.000\tdecimal\tCue\t\n\
             Part one\t  1:05.250\t0:00.000\tdecimal\tCue\t\n",
        )
        .unwrap();

        let markers = read_markers(&path).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].name, "Opening");
        assert_eq!(markers[1].start, Duration::from_millis(65_250));
    }
}
