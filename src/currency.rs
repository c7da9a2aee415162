pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

pub const CURRENCIES: [Currency; 5] = [
    Currency {
        code: "EUR",
        symbol: "€",
        name: "Euro",
    },
    Currency {
        code: "MAD",
        symbol: "DH",
        name: "Moroccan Dirham",
    },
    Currency {
        code: "USD",
        symbol: "$",
        name: "US Dollar",
    },
    Currency {
        code: "GBP",
        symbol: "£",
        name: "British Pound",
    },
    Currency {
        code: "JPY",
        symbol: "¥",
        name: "Japanese Yen",
    },
];

pub fn find_currency(code: &str) -> Option<&'static Currency> {
    CURRENCIES
        .iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code.trim()))
}

/// Symbol used when rendering amounts. Missing or unknown codes render as euros.
pub fn symbol_for(code: Option<&str>) -> &'static str {
    code.and_then(find_currency)
        .or_else(|| find_currency(DEFAULT_CURRENCY))
        .map_or("€", |currency| currency.symbol)
}
