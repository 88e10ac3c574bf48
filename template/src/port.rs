use kiln_recipe::RecipeError;
use log::trace;

/// Validates an `EXPOSE` entry of the form `<port>`, `<port>/tcp` or `<port>/udp`.
///
/// The protocol suffix is case-insensitive. Returns the entry lower-cased.
///
/// # Errors
/// Will error if the port is not a number.
pub fn validate_port(port: &str) -> Result<String, RecipeError> {
    trace!("validate_port({port})");

    let lower = port.to_lowercase();
    let number = lower
        .strip_suffix("/tcp")
        .or_else(|| lower.strip_suffix("/udp"))
        .unwrap_or(&lower);

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecipeError::InvalidPort(port.to_string()));
    }

    Ok(lower)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("8080", "8080")]
    #[case("8080/tcp", "8080/tcp")]
    #[case("53/UDP", "53/udp")]
    #[case("443/Tcp", "443/tcp")]
    #[case("0", "0")]
    fn valid_port(#[case] port: &str, #[case] expected: &str) {
        assert_eq!(Ok(expected.to_string()), validate_port(port));
    }

    #[rstest]
    #[case("")]
    #[case("http")]
    #[case("/tcp")]
    #[case("80/sctp")]
    #[case("80/tcp/udp")]
    #[case("-80")]
    #[case("8080-8090")]
    #[case(" 80")]
    fn invalid_port(#[case] port: &str) {
        assert_eq!(
            Err(RecipeError::InvalidPort(port.to_string())),
            validate_port(port)
        );
    }

    #[test]
    fn error_names_format() {
        let err = validate_port("abc").unwrap_err();
        assert!(err.to_string().contains("<port>(/tcp|udp)"));
    }
}
