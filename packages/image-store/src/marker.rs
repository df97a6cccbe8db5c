/// Literal filename prefix that designates the default image in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(String);

impl Marker {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_marked(&self, name: &str) -> bool {
        name.starts_with(self.0.as_str())
    }

    /// Prepend the marker unless `name` already carries it.
    pub fn add(&self, name: &str) -> String {
        if self.is_marked(name) {
            name.to_string()
        } else {
            format!("{}{name}", self.0)
        }
    }

    /// Remove a single leading marker; later occurrences are left alone.
    pub fn strip<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.0.as_str()).unwrap_or(name)
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new("^")
    }
}
