use alloy::primitives::{
    utils::{format_ether, format_units},
    I256, U256,
};

/// Renders a wei amount in ether with the currency symbol, e.g. `1.5 MON`
pub fn display_amount(amount: U256, currency: &str) -> String {
    format!("{} {currency}", format_ether(amount))
}

/// Same as [`display_amount`] for amounts that may be negative
pub fn display_signed_amount(amount: I256, currency: &str) -> String {
    format!("{} {currency}", format_ether(amount))
}

/// Renders a gas price in gwei, e.g. `20.0 Gwei`
pub fn display_gwei(gas_price: u128) -> String {
    match format_units(gas_price, "gwei") {
        Ok(gwei) => format!("{gwei} Gwei"),
        Err(_) => format!("{gas_price} wei"),
    }
}
