/// One name or an ordered list of names passed to role and permission checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameQuery {
    /// Single name.
    Single(String),
    /// Ordered list of names combined with OR or AND.
    Many(Vec<String>),
}

impl NameQuery {
    /// Returns the names as a list, splitting a single entry on commas.
    ///
    /// Blank entries are dropped.
    #[must_use]
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Single(name) => name
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::Many(names) => names,
        }
    }
}

impl From<&str> for NameQuery {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for NameQuery {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&String> for NameQuery {
    fn from(value: &String) -> Self {
        Self::Single(value.clone())
    }
}

impl From<Vec<String>> for NameQuery {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<Vec<&str>> for NameQuery {
    fn from(value: Vec<&str>) -> Self {
        Self::Many(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for NameQuery {
    fn from(value: &[&str]) -> Self {
        Self::Many(value.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl From<&[String]> for NameQuery {
    fn from(value: &[String]) -> Self {
        Self::Many(value.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for NameQuery {
    fn from(value: [&str; N]) -> Self {
        Self::Many(value.into_iter().map(str::to_owned).collect())
    }
}
