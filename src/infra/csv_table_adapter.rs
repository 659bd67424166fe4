use std::path::PathBuf;
use tracing::{debug, info};

use crate::app::ports::{CleanOutputPort, ProviderSourcePort, PublishedTables};
use crate::config::ColumnMap;
use crate::error::{CleanerError, Result};
use crate::infra::file_commit::FileSet;
use crate::types::{is_absent, Field, ProviderRecord, ProviderTable};

/// Reads the provider table from a delimited file with a header row
pub struct CsvProviderSource {
    path: PathBuf,
    columns: ColumnMap,
    delimiter: u8,
    required: Vec<Field>,
}

impl CsvProviderSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMap, delimiter: u8, required: &[Field]) -> Self {
        Self {
            path: path.into(),
            columns,
            delimiter,
            required: required.to_vec(),
        }
    }

    pub fn read_table(&self) -> Result<ProviderTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let missing = self.columns.missing(&headers, &self.required);
        if !missing.is_empty() {
            return Err(CleanerError::SchemaMismatch {
                path: self.path.display().to_string(),
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }

        let layout: Vec<Option<Field>> = headers.iter().map(|h| self.columns.field_for(h)).collect();
        debug!(
            known = layout.iter().filter(|f| f.is_some()).count(),
            passthrough = layout.iter().filter(|f| f.is_none()).count(),
            "Resolved input columns"
        );

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = ProviderRecord::default();
            for (index, header) in headers.iter().enumerate() {
                let value = row.get(index).unwrap_or("");
                match layout[index] {
                    Some(field) => record.set(field, value),
                    None => {
                        record.passthrough.insert(header.clone(), value.to_string());
                    }
                }
            }
            records.push(record);
        }

        info!(path = %self.path.display(), records = records.len(), "Read provider table");
        Ok(ProviderTable::new(headers, records))
    }
}

#[async_trait::async_trait]
impl ProviderSourcePort for CsvProviderSource {
    async fn load(&self) -> anyhow::Result<ProviderTable> {
        Ok(self.read_table()?)
    }
}

/// Renders a provider table, keeping the input's header order and pass-through columns.
///
/// Missing cells (`nan` and whitespace-only included) are written as empty.
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    columns: ColumnMap,
    delimiter: u8,
}

impl CsvTableWriter {
    pub fn new(columns: ColumnMap, delimiter: u8) -> Self {
        Self { columns, delimiter }
    }

    pub fn render(&self, table: &ProviderTable) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record(&table.headers)?;
        let layout: Vec<Option<Field>> = table.headers.iter().map(|h| self.columns.field_for(h)).collect();
        for record in &table.records {
            let row: Vec<String> = table
                .headers
                .iter()
                .zip(&layout)
                .map(|(header, field)| {
                    let value = match field {
                        Some(field) => record.get(*field).into_owned(),
                        None => record.passthrough.get(header).cloned().unwrap_or_default(),
                    };
                    if is_absent(&value) {
                        String::new()
                    } else {
                        value
                    }
                })
                .collect();
            writer.write_record(&row)?;
        }

        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| CleanerError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
    }
}

/// The canonical and flagged tables of a cleaning run, committed as one file set
pub struct CsvCleanOutput {
    canonical_path: PathBuf,
    flagged_path: PathBuf,
    writer: CsvTableWriter,
}

impl CsvCleanOutput {
    pub fn new(
        canonical_path: impl Into<PathBuf>,
        flagged_path: impl Into<PathBuf>,
        columns: ColumnMap,
        delimiter: u8,
    ) -> Self {
        Self {
            canonical_path: canonical_path.into(),
            flagged_path: flagged_path.into(),
            writer: CsvTableWriter::new(columns, delimiter),
        }
    }
}

#[async_trait::async_trait]
impl CleanOutputPort for CsvCleanOutput {
    async fn publish(
        &self,
        canonical: &ProviderTable,
        flagged: Option<&ProviderTable>,
    ) -> anyhow::Result<PublishedTables> {
        // Render everything before any file is touched
        let mut files = FileSet::new();
        files.write(&self.canonical_path, self.writer.render(canonical)?);
        match flagged {
            Some(table) => files.write(&self.flagged_path, self.writer.render(table)?),
            None => files.remove(&self.flagged_path),
        }

        let committed = files.commit()?;
        let stale_flagged_removed = !committed.removed.is_empty();
        let mut written = committed.written.into_iter();
        let canonical_file = written
            .next()
            .ok_or_else(|| anyhow::anyhow!("canonical table missing from committed files"))?;
        let flagged_file = written.next();

        info!(path = %canonical_file.path.display(), rows = canonical.len(), "Wrote provider table");
        if let Some(file) = &flagged_file {
            info!(path = %file.path.display(), rows = flagged.map_or(0, ProviderTable::len), "Wrote flagged table");
        }

        Ok(PublishedTables {
            canonical: canonical_file,
            flagged: flagged_file,
            stale_flagged_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::file_commit::sha256_hex;
    use crate::types::Flag;
    use std::fs;
    use std::path::Path;

    const HEADER: &str = "name,phone,email,city,state,languages,bio,certifications,emergencyAvailable,weekendAvailable,regions serviced,testimonials,insuranceAmount,website";

    fn write_input(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("input.csv");
        fs::write(&path, format!("{}\n{}", HEADER, body)).unwrap();
        path
    }

    fn output(dir: &Path) -> CsvCleanOutput {
        CsvCleanOutput::new(
            dir.join("out").join("cleaned.csv"),
            dir.join("out").join("flagged.csv"),
            ColumnMap::default(),
            b',',
        )
    }

    #[test]
    fn test_read_maps_fields_and_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "Acme Labs,555-0100,a@b.com,Austin,TX,,,,yes,,,,,https://acme.test\n",
        );

        let source = CsvProviderSource::new(&path, ColumnMap::default(), b',', &Field::CLEANING);
        let table = source.read_table().unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.headers.len(), 14);
        let record = &table.records[0];
        assert_eq!(record.name, "Acme Labs");
        assert_eq!(record.emergency_available, Flag::Yes);
        assert_eq!(record.weekend_available, Flag::Unset);
        assert_eq!(record.passthrough.get("website").map(String::as_str), Some("https://acme.test"));
    }

    #[test]
    fn test_missing_required_column_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, "name,city,state\nAcme,Austin,TX\n").unwrap();

        let source = CsvProviderSource::new(&path, ColumnMap::default(), b',', &Field::CLEANING);
        match source.read_table() {
            Err(CleanerError::SchemaMismatch { missing, .. }) => {
                assert!(missing.contains(&"phone".to_string()));
                assert!(missing.contains(&"regions serviced".to_string()));
                assert!(!missing.contains(&"name".to_string()));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, "name,phone,city,state\nAcme,555\n").unwrap();

        let source = CsvProviderSource::new(&path, ColumnMap::default(), b',', &[Field::Name]);
        let table = source.read_table().unwrap();
        assert_eq!(table.records[0].city, "");
    }

    #[test]
    fn test_render_preserves_header_order_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "\"Smith, Jones & Co\",555-0100,,Austin,TX,English,\"Line one.\nLine two.\",ASCP Certified,No,Yes,\"Austin, TX area\",,,https://sj.test\n",
        );
        let table = CsvProviderSource::new(&input, ColumnMap::default(), b',', &Field::CLEANING)
            .read_table()
            .unwrap();

        let rendered = CsvTableWriter::new(ColumnMap::default(), b',').render(&table).unwrap();
        let output = dir.path().join("cleaned.csv");
        fs::write(&output, &rendered).unwrap();

        let reread = CsvProviderSource::new(&output, ColumnMap::default(), b',', &Field::CLEANING)
            .read_table()
            .unwrap();
        assert_eq!(reread, table);
        assert!(String::from_utf8(rendered).unwrap().starts_with(HEADER));
    }

    #[test]
    fn test_render_writes_nan_cells_as_empty() {
        let mut record = ProviderRecord {
            name: "Acme Labs".to_string(),
            bio: "nan".to_string(),
            testimonials: "NaN".to_string(),
            ..Default::default()
        };
        record.passthrough.insert("website".to_string(), "nan".to_string());
        let table = ProviderTable::new(
            vec!["name".to_string(), "bio".to_string(), "testimonials".to_string(), "website".to_string()],
            vec![record],
        );

        let rendered = CsvTableWriter::new(ColumnMap::default(), b',').render(&table).unwrap();
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "name,bio,testimonials,website\nAcme Labs,,,\n"
        );
    }

    #[tokio::test]
    async fn test_publish_writes_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let table = ProviderTable::new(
            vec!["name".to_string()],
            vec![ProviderRecord {
                name: "Acme Labs".to_string(),
                ..Default::default()
            }],
        );

        let published = output(dir.path()).publish(&table, Some(&table)).await.unwrap();

        let canonical = fs::read(dir.path().join("out").join("cleaned.csv")).unwrap();
        assert_eq!(published.canonical.sha256, sha256_hex(&canonical));
        assert!(published.flagged.is_some());
        assert!(!published.stale_flagged_removed);
    }

    #[tokio::test]
    async fn test_publish_without_flagged_removes_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("out").join("flagged.csv");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "name\n").unwrap();

        let table = ProviderTable::new(vec!["name".to_string()], Vec::new());
        let published = output(dir.path()).publish(&table, None).await.unwrap();

        assert!(published.flagged.is_none());
        assert!(published.stale_flagged_removed);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_failed_flagged_write_keeps_previous_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let canonical_path = dir.path().join("cleaned.csv");
        fs::write(&canonical_path, "previous run\n").unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let output = CsvCleanOutput::new(&canonical_path, blocker.join("flagged.csv"), ColumnMap::default(), b',');
        let table = ProviderTable::new(vec!["name".to_string()], vec![ProviderRecord::default()]);

        assert!(output.publish(&table, Some(&table)).await.is_err());
        assert_eq!(fs::read_to_string(&canonical_path).unwrap(), "previous run\n");
    }
}
