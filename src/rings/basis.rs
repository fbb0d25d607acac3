use std::sync::Arc;

use crate::math::CrtComposer;

use super::{
    errors::{RingError, RingResult},
    ntt::NttTable,
    traits::RingArithmetic,
};

/// RNS basis: the active prefix of a modulus chain with its NTT tables and
/// CRT data.
///
/// Invariant: `tables[i].modulus() == moduli[i]` for all `i`. Tables are
/// shared between the bases of different levels.
#[derive(Debug, Clone)]
pub struct RnsBasis {
    degree: usize,
    moduli: Vec<u64>,
    tables: Vec<Arc<NttTable>>,
    crt: CrtComposer,
}

impl RnsBasis {
    pub fn new(degree: usize, moduli: &[u64]) -> RingResult<Self> {
        let tables = moduli
            .iter()
            .map(|&q| NttTable::new(degree, q).map(Arc::new))
            .collect::<RingResult<Vec<_>>>()?;
        Self::from_tables(tables)
    }

    pub fn from_tables(tables: Vec<Arc<NttTable>>) -> RingResult<Self> {
        let first = tables.first().ok_or(RingError::EmptyBasis)?;
        let degree = first.degree();
        if let Some(table) = tables.iter().find(|t| t.degree() != degree) {
            return Err(RingError::LengthMismatch {
                expected: degree,
                actual: table.degree(),
            });
        }
        let moduli: Vec<u64> = tables.iter().map(|t| t.modulus()).collect();
        let crt = CrtComposer::new(&moduli).ok_or(RingError::InvalidBasis)?;
        Ok(Self {
            degree,
            moduli,
            tables,
            crt,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn channel_count(&self) -> usize {
        self.moduli.len()
    }

    pub fn ntt_table(&self, channel: usize) -> &NttTable {
        &self.tables[channel]
    }

    pub fn crt(&self) -> &CrtComposer {
        &self.crt
    }

    /// Bit length of the basis product `Q`.
    pub fn modulus_bits(&self) -> u32 {
        self.crt.modulus_bits()
    }

    /// Returns a new basis with the last `drop_count` channels removed.
    pub fn drop_last(&self, drop_count: usize) -> RingResult<Self> {
        let channel_count = self.channel_count();
        if drop_count >= channel_count {
            return Err(RingError::InvalidModDrop {
                drop_count,
                channel_count,
            });
        }
        Self::from_tables(self.tables[..channel_count - drop_count].to_vec())
    }
}
