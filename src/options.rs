//! Logger-wide behaviour from the optional `options` section.

use crate::document::Document;

/// Top level key of the options section.
pub const OPTIONS_SECTION: &str = "options";

/// One behaviour applied to every appender of a logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggerOption {
    /// Record the source file and line of each event.
    AddCaller,
    /// Attach a backtrace to warn and error records.
    Development,
    /// Append these key/value pairs to every record.
    Fields(Vec<(String, String)>),
}

/// Read the `options` section. A missing section yields no options.
pub fn load_options(doc: &Document) -> Vec<LoggerOption> {
    let mut options = Vec::new();

    let Some(section) = doc.subsection(OPTIONS_SECTION) else {
        return options;
    };

    if section.get_bool("caller") {
        options.push(LoggerOption::AddCaller);
    }

    if section.get_bool("development") {
        options.push(LoggerOption::Development);
    }

    if let Some(fields) = section.subsection("fields") {
        let pairs: Vec<(String, String)> = fields
            .all_keys()
            .into_iter()
            .map(|key| {
                let value = fields.get_string(&key);
                (key, value)
            })
            .collect();
        if !pairs.is_empty() {
            options.push(LoggerOption::Fields(pairs));
        }
    }

    options
}

/// Options folded into the settings shared by a logger's appenders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSettings {
    pub caller: bool,
    pub development: bool,
    pub fields: Vec<(String, String)>,
}

impl RecordSettings {
    pub fn from_options(options: &[LoggerOption]) -> Self {
        let mut settings = Self::default();
        for option in options {
            match option {
                LoggerOption::AddCaller => settings.caller = true,
                LoggerOption::Development => settings.development = true,
                LoggerOption::Fields(fields) => settings.fields.extend(fields.iter().cloned()),
            }
        }
        settings
    }
}
