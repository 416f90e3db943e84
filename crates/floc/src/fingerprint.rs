//! Sim-hash and cohort identifiers produced by the FLoC layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a [`SimHash`] is rendered as text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimHashFormat {
    /// Base-10 integer, e.g. `"1029483"`.
    #[default]
    Decimal,
    /// Base-2 string zero-padded to the hash width.
    Binary,
}

/// A sim hash together with the width it was computed at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SimHash {
    /// Hash value; only the low `bits` bits can be set.
    pub value: u64,
    /// Width in bits.
    pub bits: u8,
}

impl SimHash {
    pub fn new(value: u64, bits: u8) -> Self {
        Self { value, bits }
    }

    /// Render with the requested format.
    pub fn render(&self, format: SimHashFormat) -> String {
        match format {
            SimHashFormat::Decimal => self.value.to_string(),
            SimHashFormat::Binary => {
                format!("{:0width$b}", self.value, width = usize::from(self.bits))
            }
        }
    }
}

impl fmt::Display for SimHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Index of a sorting-LSH cluster, i.e. the FLoC cohort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CohortId(pub u64);

impl fmt::Display for CohortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
