use anyhow::{Context, Result};
use flocking_common::Snapshot;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk encoding for recorded snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Bincode,
    MessagePack,
}

impl SnapshotFormat {
    /// Maps the config's format name; unknown names fall back to JSON.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.unwrap_or("json") {
            "json" => SnapshotFormat::Json,
            "bincode" => SnapshotFormat::Bincode,
            "messagepack" | "msgpack" => SnapshotFormat::MessagePack,
            other => {
                warn!("Unknown output format: {}. Using JSON instead.", other);
                SnapshotFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bin",
            SnapshotFormat::MessagePack => "msgpack",
        }
    }
}

/// Writes all snapshots to `<base>_snapshots.<ext>` and returns the path written.
pub fn save_snapshots(
    base_filename: &str,
    format: SnapshotFormat,
    snapshots: &[Snapshot],
) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}_snapshots.{}", base_filename, format.extension()));
    let file = File::create(&path)
        .with_context(|| format!("Error creating snapshot file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        SnapshotFormat::Json => serde_json::to_writer(&mut writer, snapshots)
            .context("Error serializing snapshots to JSON")?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut writer, snapshots)
            .context("Error serializing snapshots to bincode")?,
        SnapshotFormat::MessagePack => rmp_serde::encode::write(&mut writer, snapshots)
            .context("Error serializing snapshots to MessagePack")?,
    }
    writer.flush()?;

    info!("{} snapshots saved to {} ({:?} format)", snapshots.len(), path.display(), format);
    Ok(path)
}

/// Writes final (x, y) positions as CSV.
pub fn save_positions(path: &Path, positions: &[(f32, f32)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(["x", "y"])?;
    for (x, y) in positions {
        writer.write_record(&[format!("{:.4}", x), format!("{:.4}", y)])?;
    }
    writer.flush()?;
    info!("Final positions saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Snapshot> {
        vec![Snapshot {
            tick: 10,
            prey_count: 3,
            predator_count: 1,
            obstacle_count: 0,
            eaten_since_last: 1,
            total_eaten: 1,
            mean_prey_speed: 3.0,
            polarization: 0.5,
            view: None,
        }]
    }

    fn temp_base(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("flocking_engine_{}_{}", name, std::process::id()))
            .display()
            .to_string()
    }

    #[test]
    fn unknown_format_falls_back_to_json() {
        assert_eq!(SnapshotFormat::from_name(None), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_name(Some("yaml")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_name(Some("bincode")), SnapshotFormat::Bincode);
    }

    #[test]
    fn json_snapshots_read_back() {
        let path =
            save_snapshots(&temp_base("json"), SnapshotFormat::Json, &sample()).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        let loaded: Vec<Snapshot> = serde_json::from_str(&text).expect("parse");
        assert_eq!(loaded, sample());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn binary_formats_are_written() {
        for format in [SnapshotFormat::Bincode, SnapshotFormat::MessagePack] {
            let path = save_snapshots(&temp_base("bin"), format, &sample()).expect("write");
            assert!(std::fs::metadata(&path).expect("exists").len() > 0);
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn positions_csv_has_header_and_rows() {
        let path = PathBuf::from(format!("{}_positions.csv", temp_base("csv")));
        save_positions(&path, &[(1.0, 2.0), (3.5, 4.25)]).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["x,y", "1.0000,2.0000", "3.5000,4.2500"]);
        std::fs::remove_file(path).ok();
    }
}
