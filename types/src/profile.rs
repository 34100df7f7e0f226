//! Linter variants.
//!
//! Both variants run the same session logic; they differ only in the names
//! they present to the user and the configuration section they read.

/// Language ids handled by every variant.
pub const SUPPORTED_LANGUAGES: &[&str] = &["javascript", "javascriptreact"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinterProfile {
    /// Configuration section and command prefix (e.g. "standard").
    pub scope: &'static str,
    /// Human-readable name shown in the status item and messages.
    pub display_name: &'static str,
    /// npm package the server loads.
    pub package: &'static str,
    /// Persisted-state key for the missing-library notice.
    pub dismissal_key: &'static str,
}

pub const STANDARD: LinterProfile = LinterProfile {
    scope: "standard",
    display_name: "JavaScript Standard Style",
    package: "standard",
    dismissal_key: "noStandardMessageShown",
};

pub const SEMISTANDARD: LinterProfile = LinterProfile {
    scope: "semistandard",
    display_name: "JavaScript Semistandard Style",
    package: "semistandard",
    dismissal_key: "noSemistandardMessageShown",
};

impl LinterProfile {
    /// Look up a built-in profile by its scope name.
    #[must_use]
    pub fn by_scope(scope: &str) -> Option<Self> {
        [STANDARD, SEMISTANDARD]
            .into_iter()
            .find(|profile| profile.scope == scope)
    }

    #[must_use]
    pub fn handles_language(&self, language_id: &str) -> bool {
        SUPPORTED_LANGUAGES.contains(&language_id)
    }

    /// Fully-qualified command id, e.g. `standard.executeAutofix`.
    #[must_use]
    pub fn command_id(&self, name: &str) -> String {
        format!("{}.{name}", self.scope)
    }

    /// Setting key inside this profile's section, e.g. `standard.enable`.
    #[must_use]
    pub fn setting_key(&self, name: &str) -> String {
        format!("{}.{name}", self.scope)
    }
}
