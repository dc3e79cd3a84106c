/// Rewrites positional `?` placeholders into PostgreSQL ordinals (`$1`, `$2`, ...).
///
/// Question marks inside single-quoted string literals and double-quoted identifiers
/// are left alone.
pub fn to_ordinal(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut next = 1usize;
    let mut quote: Option<char> = None;

    for ch in sql.chars() {
        match (quote, ch) {
            (None, '?') => {
                out.push('$');
                out.push_str(&next.to_string());
                next += 1;
                continue;
            }
            (None, '\'' | '"') => quote = Some(ch),
            // A doubled quote closes and immediately reopens, which nets out
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
        out.push(ch);
    }
    out
}

/// Inserts rewritten to report the generated key (`... RETURNING id`); `None` for
/// every other statement.
pub fn with_returning_id(sql: &str) -> Option<String> {
    super::is_insert(sql).then(|| format!("{} RETURNING id", sql.trim_end().trim_end_matches(';').trim_end()))
}
