// InfluxQL statements issued by the tool, with identifier and literal quoting.

/// Double-quoted identifier (database, measurement, tag key).
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Single-quoted string literal (tag value in a WHERE clause).
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

pub fn show_databases() -> String {
    "SHOW DATABASES".to_string()
}

pub fn show_retention_policies(database: &str) -> String {
    format!("SHOW RETENTION POLICIES ON {}", quote_ident(database))
}

pub fn show_measurements() -> String {
    "SHOW MEASUREMENTS".to_string()
}

/// Tag values for `tag`, within one measurement or across the whole container.
pub fn show_tag_values(container: &str, measurement: Option<&str>, tag: &str) -> String {
    match measurement {
        Some(m) => format!(
            "SHOW TAG VALUES ON {} FROM {} WITH KEY = {}",
            quote_ident(container),
            quote_ident(m),
            quote_ident(tag)
        ),
        None => format!(
            "SHOW TAG VALUES ON {} WITH KEY = {}",
            quote_ident(container),
            quote_ident(tag)
        ),
    }
}

/// Most recent point of one tag value in a measurement.
pub fn select_latest(measurement: &str, tag: &str, value: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = {} ORDER BY time DESC LIMIT 1",
        quote_ident(measurement),
        quote_ident(tag),
        quote_literal(value)
    )
}
