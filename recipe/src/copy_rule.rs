use bon::bon;

/// A single `COPY` of build context content into the image.
///
/// The destination is always relative to the target directory;
/// leading slashes are removed when the rule is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRule {
    source: String,
    destination: String,
    target: Option<String>,
    user: Option<String>,
    export: Option<bool>,
}

#[bon]
impl CopyRule {
    #[builder]
    pub fn new(
        #[builder(into)] source: String,
        #[builder(into)] destination: String,

        // overrides the spec-wide base directory
        #[builder(into)]
        target: Option<String>,
        // overrides the assembly user
        #[builder(into)]
        user: Option<String>,
        // unset defers to the spec-wide export default
        export: Option<bool>,
    ) -> Self {
        let destination = destination.trim_start_matches('/').to_string();
        Self {
            source,
            destination,
            target,
            user,
            export,
        }
    }
}

impl CopyRule {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub const fn export(&self) -> Option<bool> {
        self.export
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("maven", "maven")]
    #[case("/maven", "maven")]
    #[case("///opt/app/", "opt/app/")]
    #[case("", "")]
    fn strips_leading_slashes(#[case] destination: &str, #[case] expected: &str) {
        let rule = CopyRule::builder()
            .source("src")
            .destination(destination)
            .build();
        assert_eq!(expected, rule.destination());
        assert!(!rule.destination().starts_with('/'));
    }

    #[test]
    fn optional_overrides() {
        let rule = CopyRule::builder()
            .source("maven")
            .destination("")
            .target("/opt")
            .user("jboss:jboss")
            .export(false)
            .build();

        assert_eq!(Some("/opt"), rule.target());
        assert_eq!(Some("jboss:jboss"), rule.user());
        assert_eq!(Some(false), rule.export());
    }
}
