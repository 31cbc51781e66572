/// Name comparison policy injected once at registry construction.
///
/// Every name lookup in the subsystem (schema path segments, table names,
/// column names, registered types) goes through the same matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameMatcher {
    case_sensitive: bool,
}

impl NameMatcher {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    /// Index of the first name in `names` matching `target`.
    pub fn index_of<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
        target: &str,
    ) -> Option<usize> {
        names
            .into_iter()
            .position(|name| self.matches(name, target))
    }
}
