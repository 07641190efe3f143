use crate::config::Config;
use crate::ngs::VariantTable;
use anyhow::Result;
use chrono::Local;
use log::info;
use std::path::{Path, PathBuf};

/// Column name for a merged-reads file: the part of its name before `both_reads`.
pub fn column_for(merged: &Path, date: Option<&str>) -> String {
    let name = merged
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = match name.find("both_reads") {
        Some(idx) => name[..idx].to_string(),
        None => format!(
            "{}_",
            merged
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        ),
    };
    match date {
        Some(date) => format!("{}{}_count", prefix, date),
        None => format!("{}count", prefix),
    }
}

/// Default date label, today's date as `YYYYMMDD`.
pub fn today_label() -> String {
    Local::now().format("%Y%m%d").to_string()
}

pub fn run(
    config: &Config,
    reference_csv: PathBuf,
    output_csv: PathBuf,
    merged: Vec<PathBuf>,
    date: Option<String>,
) -> Result<()> {
    let mut table = VariantTable::from_path(&reference_csv)?;
    info!(
        "Loaded {} variants with {} columns from {}",
        table.len(),
        table.headers().len(),
        reference_csv.display()
    );
    let date = date.unwrap_or_else(today_label);

    for path in &merged {
        let column = column_for(path, Some(date.as_str()));
        let counts = table.count_file(path, &config.count)?;
        info!(
            "Determined counts for {} reads from {} ({} matched)",
            counts.reads_scanned,
            path.display(),
            counts.reads_matched
        );
        table.add_count_column(&column, &counts)?;
    }

    table.write_csv(&output_csv)?;
    println!(
        "Wrote {} count columns for {} variants to {}",
        merged.len(),
        table.len(),
        output_csv.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_from_merged_name() {
        let p = Path::new("merged/libA_S1_both_reads_001.fastq");
        assert_eq!(column_for(p, None), "libA_S1_count");
        assert_eq!(column_for(p, Some("0312")), "libA_S1_0312_count");
        assert_eq!(column_for(Path::new("reads.txt"), None), "reads_count");
    }

    #[test]
    fn default_label_is_a_compact_date() {
        let label = today_label();
        assert_eq!(label.len(), 8);
        assert!(label.bytes().all(|b| b.is_ascii_digit()));
        assert!(label.starts_with("20"));
    }
}
