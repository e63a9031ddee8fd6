/// Rewrites a table name into a legal SQL identifier.
///
/// Anything other than ASCII letters, digits, and `_` becomes `_`; a name
/// starting with a digit (or an empty name) gets a `table_` prefix.
pub fn sanitize_table_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.chars().next() {
        Some(first) if !first.is_ascii_digit() => cleaned,
        _ => format!("table_{cleaned}"),
    }
}
