use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Extract a zipped dataset bundle into a directory.
#[derive(Debug, Parser)]
#[command(name = "extract_datasets", version)]
struct Args {
    /// Zip archive to extract.
    archive: PathBuf,
    /// Destination directory (created if missing).
    destination: PathBuf,
}

/// Extract every entry of `archive` under `destination`. Entries whose
/// paths would escape the destination are rejected.
fn extract_datasets(archive: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive).with_context(|| format!("opening {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("reading zip archive {}", archive.display()))?;

    fs::create_dir_all(destination)
        .with_context(|| format!("creating {}", destination.display()))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).with_context(|| format!("reading entry {i}"))?;
        let relative = entry
            .enclosed_name()
            .with_context(|| format!("unsafe path in archive: {}", entry.name()))?;
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("creating {}", out_path.display()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut out = File::create(&out_path)
            .with_context(|| format!("creating {}", out_path.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("writing {}", out_path.display()))?;
        log::debug!("Extracted {}", out_path.display());
    }

    Ok(zip.len())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let count = extract_datasets(&args.archive, &args.destination)?;
    log::info!("Extracted {count} entries");
    println!(
        "Extracted {} to {}",
        args.archive.display(),
        args.destination.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn build_archive(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.zip");
        build_archive(
            &archive,
            &[
                ("benin-malanville.csv", "GHI\n1\n"),
                ("nested/togo-dapaong_qc.csv", "GHI\n2\n"),
            ],
        );

        let dest = dir.path().join("out");
        assert_eq!(extract_datasets(&archive, &dest).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(dest.join("benin-malanville.csv")).unwrap(),
            "GHI\n1\n"
        );
        assert!(dest.join("nested/togo-dapaong_qc.csv").exists());
    }

    #[test]
    fn missing_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_datasets(&dir.path().join("none.zip"), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("none.zip"));
    }

    #[test]
    fn traversal_entries_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        build_archive(&archive, &[("../escape.csv", "x")]);

        assert!(extract_datasets(&archive, &dir.path().join("out")).is_err());
        assert!(!dir.path().join("escape.csv").exists());
    }
}
