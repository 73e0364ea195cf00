//! Decimal shifting between display amounts and raw chain units
//!
//! Balances on Substrate chains are `u128`, so every conversion stays in
//! integer space. Display strings follow plain decimal notation with no
//! trailing zeros ("1.5", "0.0000000001", "0").

use crate::error::VaultError;

/// Parse a decimal display amount into raw units: floor(amount × 10^decimals)
pub fn parse_units(amount: &str, decimals: u32) -> Result<u128, VaultError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(VaultError::InvalidTransferValue("empty amount".to_string()));
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid(amount));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(amount));
    }

    let scale = pow10(decimals).ok_or_else(|| invalid(amount))?;
    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid(amount))?
    };

    // Digits beyond `decimals` are truncated (floor)
    let kept: String = frac_part.chars().take(decimals as usize).collect();
    let frac_value: u128 = if kept.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", kept, width = decimals as usize);
        padded.parse().map_err(|_| invalid(amount))?
    };

    int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| VaultError::InvalidTransferValue(format!("amount overflows: {}", amount)))
}

/// Format raw units as a display amount: value × 10^-decimals
pub fn format_units(value: u128, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let digits = value.to_string();
    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Parse an integer string in raw units ("123", "0x7b")
pub fn parse_raw(value: &str) -> Result<u128, VaultError> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix("0x") {
        return u128::from_str_radix(hex, 16)
            .map_err(|_| VaultError::InvalidInput(format!("Invalid hex number: {}", value)));
    }
    // Integer part only; raw values never carry fractions but some APIs emit "123.0"
    let int_part = value.split('.').next().unwrap_or_default();
    int_part
        .parse()
        .map_err(|_| VaultError::InvalidInput(format!("Invalid number: {}", value)))
}

fn pow10(decimals: u32) -> Option<u128> {
    10u128.checked_pow(decimals)
}

fn invalid(amount: &str) -> VaultError {
    VaultError::InvalidTransferValue(format!("invalid amount: {}", amount))
}
