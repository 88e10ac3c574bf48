use std::borrow::Cow;

use kiln_recipe::Argument;

/// Renders a list of tokens as `["a","b"]`.
///
/// Tokens are written as given, without escaping.
#[must_use]
pub fn json_array<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    format!(
        "[\"{}\"]",
        tokens.into_iter().collect::<Vec<_>>().join("\",\"")
    )
}

/// Encodes an argument for `CMD`, `ENTRYPOINT` and the health check probe.
///
/// The shell form is written verbatim, the exec form as a JSON array.
#[must_use]
pub fn encode(argument: &Argument) -> Cow<'_, str> {
    match argument {
        Argument::Shell(command) => Cow::Borrowed(command),
        Argument::Exec(tokens) => Cow::Owned(json_array(tokens.iter().map(String::as_str))),
    }
}

/// Encodes an argument for `SHELL`, which only takes the JSON array form.
///
/// A shell form argument is split on whitespace first.
#[must_use]
pub fn encode_json_tokens(argument: &Argument) -> String {
    json_array(argument.as_strings())
}
