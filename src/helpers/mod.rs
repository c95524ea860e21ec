pub mod datetime;
pub mod depositdata;

use alloy::primitives::utils::{ParseUnits, format_units};

/// Formats `amount` with `decimals` dropping trailing fractional zeros
pub fn format_unit<T>(amount: &T, decimals: u8) -> String
where
    T: Into<ParseUnits> + Copy,
{
    let Ok(formatted) = format_units(*amount, decimals) else {
        return "NaN".to_string();
    };
    match formatted.split_once('.') {
        Some((whole, fractional)) => {
            let fractional = fractional.trim_end_matches('0');
            match fractional.is_empty() {
                true => format!("{whole}.0"),
                false => format!("{whole}.{fractional}"),
            }
        }
        None => formatted,
    }
}

pub fn format_eth<T>(amount: &T) -> String
where
    T: Into<ParseUnits> + Copy,
{
    format_unit(amount, 18)
}

pub fn format_gwei<T>(amount: &T) -> String
where
    T: Into<ParseUnits> + Copy,
{
    format_unit(amount, 9)
}
