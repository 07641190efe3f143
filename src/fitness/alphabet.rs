/// The twenty canonical amino acids, in encoder column order.
pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Protein G B1 domain, the landscape these tools were built around.
pub const GB1_WILD_TYPE: &str = "MQYKLILNGKTLKGETTTEAVDAATAEKVFKQYANDNGVDGEWTYDDATKTFTVTE";
