use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Writes serializable rows to a CSV file, one header row from the field names.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes rows whose columns are only known at runtime.
pub fn write_records(path: &Path, headers: &[String], records: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    writer.write_record(headers)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    info!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Row {
        month: u32,
        value: f64,
    }

    #[test]
    fn test_write_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("rows.csv");
        write_rows(&path, &[Row { month: 1, value: 10.5 }, Row { month: 2, value: 11.0 }])?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "month,value\n1,10.5\n2,11.0\n");
        Ok(())
    }

    #[test]
    fn test_write_records() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("records.csv");
        write_records(
            &path,
            &["month".to_string(), "CDI".to_string()],
            &[vec!["1".to_string(), "1007.97".to_string()]],
        )?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "month,CDI\n1,1007.97\n");
        Ok(())
    }
}
