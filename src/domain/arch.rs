/// Returns the default list of architecture suffixes.
pub fn default_arch_suffixes() -> Vec<String> {
    vec!["amd64".to_string(), "arm64".to_string()]
}

/// Strips architecture suffixes (`-amd64`, `-arm64`, ...) from tag names
/// so that per-arch images of one build share a canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchNormalizer {
    suffixes: Vec<String>,
}

impl ArchNormalizer {
    /// Create a normalizer for the given suffixes (without the leading dash)
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArchNormalizer {
            suffixes: suffixes
                .into_iter()
                .map(Into::<String>::into)
                .filter(|s| !s.is_empty())
                .map(|s| format!("-{}", s))
                .collect(),
        }
    }

    /// Canonical name of a tag: the first matching arch suffix is removed
    pub fn normalize<'a>(&self, tag: &'a str) -> &'a str {
        self.suffixes
            .iter()
            .find_map(|suffix| tag.strip_suffix(suffix.as_str()))
            .unwrap_or(tag)
    }
}

impl Default for ArchNormalizer {
    fn default() -> Self {
        ArchNormalizer::new(default_arch_suffixes())
    }
}
