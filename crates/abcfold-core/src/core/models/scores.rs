use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two parallel axes that must agree in length do not.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Shape mismatch in {context}: expected {expected}, found {found}")]
pub struct ShapeError {
    pub context: &'static str,
    pub expected: usize,
    pub found: usize,
}

impl ShapeError {
    pub fn check(context: &'static str, expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self {
                context,
                expected,
                found,
            })
        }
    }
}

/// Confidence scores of one prediction in the canonical score-file schema.
///
/// The token axis is shared by `pae`, the rows of `contact_probs`,
/// `token_chain_ids` and `token_res_ids`; the atom axis by `atom_chain_ids`
/// and `atom_plddts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFile {
    pub atom_chain_ids: Vec<String>,
    pub atom_plddts: Vec<f64>,
    #[serde(with = "matrix_rows")]
    pub contact_probs: DMatrix<f64>,
    #[serde(with = "matrix_rows")]
    pub pae: DMatrix<f64>,
    pub token_chain_ids: Vec<String>,
    pub token_res_ids: Vec<i64>,
}

impl ScoreFile {
    pub fn token_count(&self) -> usize {
        self.token_chain_ids.len()
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        let tokens = self.token_count();
        ShapeError::check("pae rows", tokens, self.pae.nrows())?;
        ShapeError::check("pae columns", tokens, self.pae.ncols())?;
        ShapeError::check("contact_probs rows", tokens, self.contact_probs.nrows())?;
        ShapeError::check("token_res_ids", tokens, self.token_res_ids.len())?;
        ShapeError::check(
            "atom_plddts",
            self.atom_chain_ids.len(),
            self.atom_plddts.len(),
        )?;
        Ok(())
    }
}

/// Serializes a dense matrix as a list of rows, the layout every tool uses.
pub mod matrix_rows {
    use nalgebra::DMatrix;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(matrix: &DMatrix<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<f64>> = matrix
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        rows.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DMatrix<f64>, D::Error> {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        from_rows(&rows).map_err(D::Error::custom)
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, String> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(format!(
                "ragged matrix: row {} has {} columns, expected {}",
                i,
                row.len(),
                ncols
            ));
        }
        Ok(DMatrix::from_row_iterator(
            nrows,
            ncols,
            rows.iter().flat_map(|r| r.iter().copied()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScoreFile {
        ScoreFile {
            atom_chain_ids: vec!["A".into(), "A".into(), "B".into()],
            atom_plddts: vec![90.0, 85.5, 70.0],
            contact_probs: DMatrix::from_element(2, 2, 0.5),
            pae: DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 0.0]),
            token_chain_ids: vec!["A".into(), "B".into()],
            token_res_ids: vec![1, 1],
        }
    }

    #[test]
    fn valid_scores_pass_validation() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validation_reports_disagreeing_axis() {
        let mut scores = sample();
        scores.token_res_ids.push(2);
        let err = scores.validate().unwrap_err();
        assert_eq!(err.context, "token_res_ids");
        assert_eq!(err.expected, 2);
        assert_eq!(err.found, 3);
    }

    #[test]
    fn matrices_serialize_as_row_lists() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["pae"], serde_json::json!([[0.0, 1.0], [2.0, 0.0]]));
        let back: ScoreFile = serde_json::from_value(json).unwrap();
        assert_eq!(back.pae[(1, 0)], 2.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let json = serde_json::json!({
            "atom_chain_ids": [], "atom_plddts": [],
            "contact_probs": [[0.0, 1.0], [0.0]], "pae": [],
            "token_chain_ids": [], "token_res_ids": []
        });
        assert!(serde_json::from_value::<ScoreFile>(json).is_err());
    }

    #[test]
    fn empty_matrix_round_trips_as_empty_list() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let m = matrix_rows::from_rows(&rows).unwrap();
        assert_eq!(m.shape(), (0, 0));
    }
}
