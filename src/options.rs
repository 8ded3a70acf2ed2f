/// Default bound on value nesting (maps, sequences and tagged objects).
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs for a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Name shown in diagnostics.
    pub source_name: String,
    /// Deepest allowed nesting of container values. The root value is at depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_name: "input.knot".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_builders() {
        let options = ParseOptions::new();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(options.source_name, "input.knot");

        let options = options.with_source_name("cfg.knot").with_max_depth(8);
        assert_eq!(options.source_name, "cfg.knot");
        assert_eq!(options.max_depth, 8);
    }
}
