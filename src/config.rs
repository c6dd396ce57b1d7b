use crate::util::same_members;

/// Base name used when no config file name is given.
pub const DEFAULT_FILE_BASE_NAME: &str = "cfglog";

/// Describes where to find the logger config file and whether a new logger
/// must be built regardless of the cached one.
#[derive(Debug, Clone)]
pub struct ConfigOption {
    /// Always rebuild, even when the option equals the cached one.
    pub force_new: bool,
    /// Config file name without extension.
    pub file_base_name: String,
    /// Config file extension. Empty searches every supported extension.
    pub file_extension: String,
    /// Directories searched in order.
    pub search_paths: Vec<String>,
}

impl ConfigOption {
    /// Create a new ConfigOption with defaults
    pub fn new() -> Self {
        Self {
            force_new: false,
            file_base_name: DEFAULT_FILE_BASE_NAME.to_string(),
            file_extension: String::new(),
            search_paths: vec![".".to_string()],
        }
    }

    /// Force a rebuild on the next request
    pub fn with_force_new(mut self, force_new: bool) -> Self {
        self.force_new = force_new;
        self
    }

    /// Set the config file name (without extension)
    pub fn with_file_base_name(mut self, name: impl Into<String>) -> Self {
        self.file_base_name = name.into();
        self
    }

    /// Set the config file extension
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Replace the search paths
    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Compare against a possibly missing option. A missing option never matches.
    pub fn matches(&self, other: Option<&ConfigOption>) -> bool {
        other.is_some_and(|other| self == other)
    }
}

impl Default for ConfigOption {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ConfigOption {
    fn eq(&self, other: &Self) -> bool {
        self.force_new == other.force_new
            && self.file_base_name == other.file_base_name
            && self.file_extension == other.file_extension
            && same_members(&self.search_paths, &other.search_paths)
    }
}

impl Eq for ConfigOption {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_option_new() {
        let option = ConfigOption::new();
        assert!(!option.force_new);
        assert_eq!(option.file_base_name, DEFAULT_FILE_BASE_NAME);
        assert_eq!(option.file_extension, "");
        assert_eq!(option.search_paths, vec!["."]);
    }

    #[test]
    fn test_config_option_default() {
        assert_eq!(ConfigOption::default(), ConfigOption::new());
    }

    #[test]
    fn test_config_option_setters() {
        let option = ConfigOption::new()
            .with_force_new(true)
            .with_file_base_name("abcde")
            .with_file_extension("json")
            .with_search_paths(["path1", "path2"]);

        assert!(option.force_new);
        assert_eq!(option.file_base_name, "abcde");
        assert_eq!(option.file_extension, "json");
        assert_eq!(option.search_paths, vec!["path1", "path2"]);
    }

    #[test]
    fn test_later_setter_wins() {
        let option = ConfigOption::new()
            .with_file_base_name("first")
            .with_file_base_name("second");
        assert_eq!(option.file_base_name, "second");
    }

    #[test]
    fn test_equality_is_reflexive() {
        let option = ConfigOption::new().with_search_paths(["a", "b"]);
        assert_eq!(option, option);
        assert!(option.matches(Some(&option)));
    }

    #[test]
    fn test_equality_ignores_path_order() {
        let a = ConfigOption::new().with_search_paths(["conf", "/etc/app", "."]);
        let b = ConfigOption::new().with_search_paths([".", "conf", "/etc/app"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_checks_every_field() {
        let base = ConfigOption::new();
        assert_ne!(base, base.clone().with_file_base_name("other"));
        assert_ne!(base, base.clone().with_file_extension("yaml"));
        assert_ne!(base, base.clone().with_force_new(true));
        assert_ne!(base, base.clone().with_search_paths(["conf"]));
        assert_ne!(base, base.clone().with_search_paths([".", "conf"]));

        let twice = ConfigOption::new().with_search_paths(["a", "a"]);
        let both = ConfigOption::new().with_search_paths(["a", "b"]);
        assert_ne!(twice, both);
        assert_ne!(both, twice);
        assert!(!both.matches(Some(&twice)));
    }

    #[test]
    fn test_matches_missing_option() {
        assert!(!ConfigOption::new().matches(None));
    }
}
