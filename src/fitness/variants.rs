use crate::error::ToolError;
use std::fmt;
use std::str::FromStr;

/// A point substitution written `<wt><pos><aa>`, with a 0-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mutation {
    pub wt: char,
    pub pos: usize,
    pub aa: char,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.wt, self.pos, self.aa)
    }
}

impl FromStr for Mutation {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolError::InvalidMutation(s.to_string());
        let mut chars = s.chars();
        let wt = chars.next().ok_or_else(invalid)?;
        let aa = chars.next_back().ok_or_else(invalid)?;
        let pos = chars.as_str().parse::<usize>().map_err(|_| invalid())?;
        if !wt.is_ascii_alphabetic() || !aa.is_ascii_alphabetic() {
            return Err(invalid());
        }
        Ok(Mutation { wt, pos, aa })
    }
}

/// Applies `mutations` to `wild_type`, checking each wild-type residue.
pub fn apply_mutations(wild_type: &str, mutations: &[Mutation]) -> Result<String, ToolError> {
    let mut residues: Vec<char> = wild_type.chars().collect();
    for m in mutations {
        let found = *residues
            .get(m.pos)
            .ok_or_else(|| ToolError::InvalidMutation(m.to_string()))?;
        if found != m.wt {
            return Err(ToolError::WildTypeMismatch {
                pos: m.pos,
                expected: m.wt,
                found,
            });
        }
        residues[m.pos] = m.aa;
    }
    Ok(residues.into_iter().collect())
}

/// Site-saturation library over a fixed set of positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinatorialLibrary {
    pub positions: Vec<usize>,
    pub wt_residues: String,
}

impl CombinatorialLibrary {
    /// The four-site GB1 library (V39, D40, G41, V54 in 1-based numbering).
    pub fn gb1_four_site() -> Self {
        Self {
            positions: vec![38, 39, 40, 53],
            wt_residues: "VDGV".to_string(),
        }
    }

    /// Full sequence for a variant given as one residue per library position.
    pub fn sequence_for(&self, wild_type: &str, variant: &str) -> Result<String, ToolError> {
        if variant.chars().count() != self.positions.len() {
            return Err(ToolError::InvalidMutation(variant.to_string()));
        }
        let mutations: Vec<Mutation> = self
            .positions
            .iter()
            .zip(self.wt_residues.chars())
            .zip(variant.chars())
            .map(|((&pos, wt), aa)| Mutation { wt, pos, aa })
            .collect();
        apply_mutations(wild_type, &mutations)
    }
}

/// Log enrichment of a variant relative to wild type, with a 0.5 pseudocount.
pub fn enrichment(wt_unsel: f64, wt_sel: f64, var_unsel: f64, var_sel: f64) -> Result<f64, ToolError> {
    if wt_unsel <= 0.0 || wt_sel <= 0.0 {
        return Err(ToolError::NonPositiveWildType {
            unsel: wt_unsel,
            sel: wt_sel,
        });
    }
    Ok(((var_sel + 0.5) / (wt_sel + 0.5)).ln() - ((var_unsel + 0.5) / (wt_unsel + 0.5)).ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::alphabet::GB1_WILD_TYPE;

    #[test]
    fn mutation_notation() {
        let m: Mutation = "V38A".parse().unwrap();
        assert_eq!(m, Mutation { wt: 'V', pos: 38, aa: 'A' });
        assert_eq!(m.to_string(), "V38A");
        assert!("V3".parse::<Mutation>().is_err());
        assert!("38A".parse::<Mutation>().is_err());
    }

    #[test]
    fn apply_checks_wild_type() {
        let seq = apply_mutations("MQYK", &["Q1A".parse().unwrap()]).unwrap();
        assert_eq!(seq, "MAYK");
        let err = apply_mutations("MQYK", &["Y1A".parse().unwrap()]).unwrap_err();
        assert!(matches!(err, ToolError::WildTypeMismatch { pos: 1, .. }));
    }

    #[test]
    fn library_wild_type_round_trips() {
        let lib = CombinatorialLibrary::gb1_four_site();
        assert_eq!(lib.sequence_for(GB1_WILD_TYPE, "VDGV").unwrap(), GB1_WILD_TYPE);

        let seq = lib.sequence_for(GB1_WILD_TYPE, "AAAA").unwrap();
        assert_eq!(&seq[38..41], "AAA");
        assert_eq!(&seq[53..54], "A");
        assert_eq!(&seq[41..53], &GB1_WILD_TYPE[41..53]);
    }

    #[test]
    fn enrichment_of_wild_type_is_zero() {
        assert_eq!(enrichment(100.0, 50.0, 100.0, 50.0).unwrap(), 0.0);
        assert!(enrichment(10.0, 0.0, 1.0, 1.0).is_err());
        let e = enrichment(10.0, 10.0, 0.0, 20.0).unwrap();
        assert!((e - ((20.5f64 / 10.5).ln() - (0.5f64 / 10.5).ln())).abs() < 1e-12);
    }
}
