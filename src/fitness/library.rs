use crate::fitness::encoding::OneHotEncoder;
use crate::fitness::ensemble::{per_sequence, ModelEnsemble};
use crate::fitness::model::{ModelBackend, ModelSession};
use crate::fitness::variants::{enrichment, CombinatorialLibrary};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

pub const VARIANT_COLUMN: &str = "Variants";
pub const INPUT_COUNT_COLUMN: &str = "Count input";
pub const SELECTED_COUNT_COLUMN: &str = "Count selected";

pub struct LibraryPrediction<'a> {
    pub library: CombinatorialLibrary,
    pub wild_type: String,
    pub encoder: OneHotEncoder,
    /// Architectures to score with, e.g. `lr`, `cnn`.
    pub kinds: Vec<String>,
    /// Directory holding the single reference model `gb1_<kind>.<ext>` per kind.
    pub single_model_dir: PathBuf,
    /// Root of `<kind>s/model_<i>/` ensembles.
    pub ensemble_root: PathBuf,
    pub ensemble_size: usize,
    pub backend: &'a dyn ModelBackend,
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("Library table has no '{}' column", name))
}

fn parse_count(value: &str, row: usize, column: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Row {}: '{}' in column '{}' is not a count", row + 1, value, column))
}

impl LibraryPrediction<'_> {
    /// Scores every library member and writes the annotated table. Returns the number of variants.
    pub fn run(&self, input: &Path, output: &Path) -> Result<usize> {
        let mut reader = csv::Reader::from_path(input)
            .with_context(|| format!("Failed to open library table {}", input.display()))?;
        let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        let var_col = column_index(&headers, VARIANT_COLUMN)?;
        let unsel_col = column_index(&headers, INPUT_COUNT_COLUMN)?;
        let sel_col = column_index(&headers, SELECTED_COUNT_COLUMN)?;

        let sequences = rows
            .iter()
            .map(|row| self.library.sequence_for(&self.wild_type, &row[var_col]))
            .collect::<Result<Vec<_>, _>>()?;

        let wt_row = rows
            .iter()
            .position(|row| row[var_col] == self.library.wt_residues)
            .with_context(|| format!("No wild-type ({}) row in library", self.library.wt_residues))?;
        let wt_unsel = parse_count(&rows[wt_row][unsel_col], wt_row, INPUT_COUNT_COLUMN)?;
        let wt_sel = parse_count(&rows[wt_row][sel_col], wt_row, SELECTED_COUNT_COLUMN)?;

        let mut fitness = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let unsel = parse_count(&row[unsel_col], i, INPUT_COUNT_COLUMN)?;
            let sel = parse_count(&row[sel_col], i, SELECTED_COUNT_COLUMN)?;
            fitness.push(enrichment(wt_unsel, wt_sel, unsel, sel)?);
        }

        let batch = self.encoder.encode(&sequences)?;
        let mut new_columns: Vec<(String, Vec<String>)> = vec![
            ("sequence".to_string(), sequences.clone()),
            (
                "enrich2_fit".to_string(),
                fitness.iter().map(|f| f.to_string()).collect(),
            ),
        ];

        for kind in &self.kinds {
            let single_path = self
                .single_model_dir
                .join(format!("gb1_{}.{}", kind, self.backend.extension()));
            let single = {
                let session = ModelSession::open(self.backend, &single_path)?;
                session.predict(&batch)?
            };
            new_columns.push((
                format!("{}_pred", kind),
                single.iter().map(|p| p.to_string()).collect(),
            ));

            let ensemble = ModelEnsemble::discover(&self.ensemble_root, kind, self.ensemble_size, self.backend)?;
            let per_model = ensemble.predict_all(&batch)?;
            let cells = if per_model.is_empty() {
                vec!["[]".to_string(); rows.len()]
            } else {
                per_sequence(&per_model)
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<Vec<_>, _>>()?
            };
            new_columns.push((format!("{}_pred_all", kind), cells));
            info!("Scored {} variants with {} ({} replicates)", rows.len(), kind, ensemble.len());
        }

        for (name, values) in new_columns {
            headers.push(name);
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        let mut writer = csv::Writer::from_path(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        writer.write_record(&headers)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::alphabet::{AMINO_ACIDS, GB1_WILD_TYPE};
    use crate::fitness::model::{LinearBackend, LinearModel};
    use std::fs;

    fn write_linear(path: &Path, bias: f64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let model = LinearModel {
            bias,
            weights: vec![0.0; GB1_WILD_TYPE.len() * AMINO_ACIDS.len()],
        };
        fs::write(path, serde_json::to_string(&model).unwrap()).unwrap();
    }

    #[test]
    fn annotates_library_table() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("library.csv");
        fs::write(
            &input,
            "Variants,HD,Count input,Count selected\nVDGV,0,100,50\nAAAA,4,10,20\n",
        )
        .unwrap();
        write_linear(&dir.path().join("other_models").join("gb1_lr.json"), 2.0);
        write_linear(&dir.path().join("lrs").join("model_0").join("m.json"), 1.0);
        write_linear(&dir.path().join("lrs").join("model_1").join("m.json"), 3.0);

        let prediction = LibraryPrediction {
            library: CombinatorialLibrary::gb1_four_site(),
            wild_type: GB1_WILD_TYPE.to_string(),
            encoder: OneHotEncoder::new(AMINO_ACIDS),
            kinds: vec!["lr".to_string()],
            single_model_dir: dir.path().join("other_models"),
            ensemble_root: dir.path().to_path_buf(),
            ensemble_size: 2,
            backend: &LinearBackend,
        };
        let output = dir.path().join("pred.csv");
        assert_eq!(prediction.run(&input, &output).unwrap(), 2);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(
            headers,
            vec!["Variants", "HD", "Count input", "Count selected", "sequence", "enrich2_fit", "lr_pred", "lr_pred_all"]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][4], GB1_WILD_TYPE);
        assert_eq!(&rows[0][5], "0");
        assert_eq!(&rows[1][6], "2");
        assert_eq!(&rows[1][7], "[1.0,3.0]");
    }
}
