//! Per-variant settings section.

use std::path::PathBuf;

use serde::Deserialize;

use jsstyle_lsp::ServerOptions;

// Default value function for serde (bool::default() is false, so only true needs a fn)
pub(crate) const fn default_true() -> bool {
    true
}

/// One `[standard]` / `[semistandard]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinterSettings {
    /// Run the server for this variant. Default: true.
    #[serde(default = "default_true")]
    pub enable: bool,
    /// Apply all fixes as part of explicit saves. Default: false.
    #[serde(default)]
    pub auto_fix_on_save: bool,
    /// Resolve the linter module the pre-workspace-folder way.
    #[serde(default)]
    pub legacy_module_resolve: bool,
    /// Extra module search path handed to the server.
    #[serde(default)]
    pub node_path: Option<String>,
    #[serde(default)]
    pub server: ServerSettings,
}

impl Default for LinterSettings {
    fn default() -> Self {
        Self {
            enable: true,
            auto_fix_on_save: false,
            legacy_module_resolve: false,
            node_path: None,
            server: ServerSettings::default(),
        }
    }
}

impl LinterSettings {
    /// `initializationOptions` for the handshake.
    #[must_use]
    pub fn initialization_options(&self) -> serde_json::Value {
        serde_json::json!({
            "legacyModuleResolve": self.legacy_module_resolve,
            "nodePath": self.node_path,
        })
    }

    /// The section as the server sees it in `didChangeConfiguration`.
    #[must_use]
    pub fn to_server_settings(&self) -> serde_json::Value {
        serde_json::json!({
            "enable": self.enable,
            "autoFixOnSave": self.auto_fix_on_save,
            "_legacyModuleResolve": self.legacy_module_resolve,
            "nodePath": self.node_path,
        })
    }
}

/// How to start the server.
///
/// With explicit `args` the command line is used verbatim. Otherwise the
/// server module is run under `command` with `--stdio`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Server entry point. Default: `~/.jsstyle/server/server.js`.
    #[serde(default)]
    pub module: Option<PathBuf>,
    /// Start node with the inspector enabled.
    #[serde(default)]
    pub debug: bool,
}

fn default_command() -> String {
    "node".to_string()
}

/// Inspector port used when `debug` is set.
const DEBUG_PORT: u16 = 6004;

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            module: None,
            debug: false,
        }
    }
}

impl ServerSettings {
    #[must_use]
    pub fn server_options(&self) -> ServerOptions {
        if !self.args.is_empty() {
            return ServerOptions {
                command: self.command.clone(),
                args: self.args.clone(),
            };
        }

        let mut args = Vec::new();
        if self.debug {
            args.push("--nolazy".to_string());
            args.push(format!("--inspect={DEBUG_PORT}"));
        }
        let module = self
            .module
            .clone()
            .or_else(|| crate::config_dir().map(|dir| dir.join("server").join("server.js")))
            .unwrap_or_else(|| PathBuf::from("server.js"));
        args.push(module.display().to_string());
        args.push("--stdio".to_string());

        ServerOptions {
            command: self.command.clone(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings: LinterSettings = toml::from_str("").unwrap();
        assert!(settings.enable);
        assert!(!settings.auto_fix_on_save);
        assert!(!settings.legacy_module_resolve);
        assert_eq!(settings.node_path, None);
        assert_eq!(settings.server.command, "node");
        assert_eq!(settings, LinterSettings::default());
    }

    #[test]
    fn initialization_options_shape() {
        let settings = LinterSettings {
            legacy_module_resolve: true,
            node_path: Some("/opt/lib/node_modules".to_string()),
            ..LinterSettings::default()
        };
        let options = settings.initialization_options();
        assert_eq!(options["legacyModuleResolve"], true);
        assert_eq!(options["nodePath"], "/opt/lib/node_modules");
    }

    #[test]
    fn server_settings_use_wire_names() {
        let settings = LinterSettings {
            auto_fix_on_save: true,
            ..LinterSettings::default()
        };
        let json = settings.to_server_settings();
        assert_eq!(json["autoFixOnSave"], true);
        assert_eq!(json["_legacyModuleResolve"], false);
        assert!(json["nodePath"].is_null());
    }

    #[test]
    fn explicit_args_are_verbatim() {
        let server = ServerSettings {
            command: "standard-language-server".to_string(),
            args: vec!["--stdio".to_string()],
            ..ServerSettings::default()
        };
        let options = server.server_options();
        assert_eq!(options.command, "standard-language-server");
        assert_eq!(options.args, vec!["--stdio"]);
    }

    #[test]
    fn module_runs_under_node_with_stdio() {
        let server = ServerSettings {
            module: Some(PathBuf::from("/srv/server.js")),
            debug: true,
            ..ServerSettings::default()
        };
        let options = server.server_options();
        assert_eq!(options.command, "node");
        assert_eq!(
            options.args,
            vec!["--nolazy", "--inspect=6004", "/srv/server.js", "--stdio"]
        );
    }
}
