//! Currency formatting.

/// Text shown in place of an amount when the summary has nothing to total.
pub const PLACEHOLDER: &str = "-";

/// Formats amounts as a currency symbol followed by exactly two decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    symbol: String,
}

impl Currency {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn format(&self, amount: f64) -> String {
        // `-0.00` would otherwise show up for tiny negative rounding noise.
        let amount = if amount.abs() < 0.005 { 0.0 } else { amount };
        format!("{}{:.2}", self.symbol, amount)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("$")
    }
}
