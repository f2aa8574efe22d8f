/// Qualifies a raw universe symbol for the data provider, e.g. `RELIANCE` -> `RELIANCE.NS`.
pub fn normalize_symbol(raw: &str, suffix: &str) -> Option<String> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return None;
    }
    if suffix.is_empty() || symbol.ends_with(suffix) {
        return Some(symbol.to_string());
    }
    Some(format!("{}{}", symbol, suffix))
}

/// Strips the exchange qualifier again for reports and progress output.
pub fn display_name<'a>(symbol: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return symbol;
    }
    symbol.strip_suffix(suffix).unwrap_or(symbol)
}
