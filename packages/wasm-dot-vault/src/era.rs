//! Transaction era (validity window) encoding

use crate::error::VaultError;
use serde::{Deserialize, Serialize};

/// Default mortality window used for every transaction the vault builds
pub const DEFAULT_ERA_PERIOD: u64 = 64;

/// Transaction era (mortal or immortal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Era {
    /// Immortal transaction (never expires)
    Immortal,
    /// Mortal transaction with period and phase
    Mortal { period: u64, phase: u64 },
}

impl Era {
    /// Mortal era starting at `current` block, valid for roughly `period` blocks
    ///
    /// Period is rounded to a power of two in 4..=65536 and the phase is
    /// quantized the same way the runtime does.
    pub fn mortal(period: u64, current: u64) -> Self {
        let period = period.checked_next_power_of_two().unwrap_or(1 << 16).clamp(4, 1 << 16);
        let phase = current % period;
        let quantize_factor = (period >> 12).max(1);
        let quantized_phase = phase / quantize_factor * quantize_factor;
        Era::Mortal {
            period,
            phase: quantized_phase,
        }
    }

    /// Check if this is an immortal era
    pub fn is_immortal(&self) -> bool {
        matches!(self, Era::Immortal)
    }

    /// First block at which a mortal era is valid, relative to `current`
    pub fn birth(&self, current: u64) -> u64 {
        match self {
            Era::Immortal => 0,
            Era::Mortal { period, phase } => {
                (current.max(*phase) - phase) / period * period + phase
            }
        }
    }

    /// SCALE encoding (1 byte immortal, 2 bytes mortal)
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Era::Immortal => vec![0x00],
            Era::Mortal { period, phase } => {
                let quantize_factor = (*period >> 12).max(1);
                let low = (period.trailing_zeros().saturating_sub(1)).clamp(1, 15) as u16;
                let high = ((*phase / quantize_factor) << 4) as u16;
                (low | high).to_le_bytes().to_vec()
            }
        }
    }

    /// `0x` prefixed hex of [`Era::encode`]
    pub fn to_hex(&self) -> String {
        crate::codec::to_hex(&self.encode())
    }

    /// Decode an era, returning it with the number of bytes consumed
    pub fn decode(bytes: &[u8]) -> Result<(Era, usize), VaultError> {
        let first = *bytes
            .first()
            .ok_or_else(|| VaultError::ScaleDecode("Empty era encoding".to_string()))?;
        if first == 0x00 {
            return Ok((Era::Immortal, 1));
        }
        if bytes.len() < 2 {
            return Err(VaultError::ScaleDecode("Truncated mortal era".to_string()));
        }
        let encoded = u16::from_le_bytes([bytes[0], bytes[1]]) as u64;
        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period < 4 || phase >= period {
            return Err(VaultError::ScaleDecode("Invalid mortal era".to_string()));
        }
        Ok((Era::Mortal { period, phase }, 2))
    }

    /// Decode from `0x` prefixed hex
    pub fn from_hex(value: &str) -> Result<Era, VaultError> {
        let bytes = crate::codec::from_hex(value)?;
        Ok(Era::decode(&bytes)?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mortal_64_at_block_1000() {
        let era = Era::mortal(DEFAULT_ERA_PERIOD, 1000);
        assert_eq!(era, Era::Mortal { period: 64, phase: 40 });
        assert_eq!(era.to_hex(), "0x8502");
        assert_eq!(era.birth(1000), 1000);
    }

    #[test]
    fn test_period_rounding() {
        assert_eq!(Era::mortal(50, 10), Era::Mortal { period: 64, phase: 10 });
        assert_eq!(Era::mortal(1, 10), Era::Mortal { period: 4, phase: 2 });
    }

    #[test]
    fn test_era_decoding() {
        assert!(Era::from_hex("0x00").unwrap().is_immortal());
        assert_eq!(
            Era::from_hex("0x8502").unwrap(),
            Era::Mortal { period: 64, phase: 40 }
        );
        assert!(Era::decode(&[0x85]).is_err());
    }
}
