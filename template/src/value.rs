/// Formats one `key=value` token for `ENV` and `LABEL`.
///
/// Quotes, backslashes and newlines in the value are escaped with a
/// backslash. Any of those, or a space, wraps the value in double
/// quotes. An empty value is written as `""`. The key is written as is.
#[must_use]
pub fn key_value(key: &str, value: &str) -> String {
    if value.is_empty() {
        return format!("{key}=\"\"");
    }

    let mut escaped = String::with_capacity(value.len());
    let mut quote = false;

    for c in value.chars() {
        match c {
            '"' | '\\' | '\n' => {
                escaped.push('\\');
                quote = true;
            }
            ' ' => quote = true,
            _ => {}
        }
        escaped.push(c);
    }

    if quote {
        format!("{key}=\"{escaped}\"")
    } else {
        format!("{key}={value}")
    }
}

/// Formats every entry of a map, keeping its order.
#[must_use]
pub fn key_values<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    entries
        .into_iter()
        .map(|(key, value)| key_value(key, value))
        .collect()
}
