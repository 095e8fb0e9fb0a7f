use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::CodegenError;

/// How output file names are derived from proto file names.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathsMode {
    /// Place output under the Go import path of the proto file.
    #[default]
    Import,
    /// Place output next to the proto file, relative to the include root.
    SourceRelative,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_api_import_path")]
    pub api_import_path: String,
    #[serde(default = "default_logger_import_path")]
    pub logger_import_path: String,
    /// Trailing component stripped from the API file prefix before `codegen/` is appended.
    #[serde(default = "default_api_file_suffix")]
    pub api_file_suffix: String,
    #[serde(default = "default_license_header")]
    pub license_header: String,
    #[serde(default)]
    pub paths: PathsMode,
    /// `M<file>=<import path>` overrides, only settable through the plugin parameter.
    #[serde(skip)]
    pub import_mappings: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_import_path() -> String {
    "github.com/isovalent/tetragon-oss/api/v1/fgs".to_string()
}

fn default_logger_import_path() -> String {
    "github.com/isovalent/tetragon-oss/pkg/logger".to_string()
}

fn default_api_file_suffix() -> String {
    "fgs".to_string()
}

fn default_license_header() -> String {
    "// SPDX-License-Identifier: Apache-2.0\n// Copyright Authors of Tetragon\n".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_import_path: default_api_import_path(),
            logger_import_path: default_logger_import_path(),
            api_file_suffix: default_api_file_suffix(),
            license_header: default_license_header(),
            paths: PathsMode::default(),
            import_mappings: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        envy::prefixed("PROTOC_GEN_TETRAGON_")
            .from_env()
            .context("Failed to load config from environment")
    }

    /// Applies the comma separated `key=value` parameter protoc passes to the plugin.
    ///
    /// Keys starting with `M` map a proto file to a Go import path, as with
    /// protoc-gen-go. Unknown keys are rejected.
    pub fn apply_parameter(&mut self, parameter: &str) -> crate::Result<()> {
        for param in parameter.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));

            if let Some(file) = key.strip_prefix('M') {
                self.import_mappings
                    .insert(file.to_string(), value.to_string());
                continue;
            }

            match key {
                "paths" => {
                    self.paths = match value {
                        "import" => PathsMode::Import,
                        "source_relative" => PathsMode::SourceRelative,
                        other => {
                            return Err(CodegenError::Config(format!(
                                "unknown path type {other:?}: want \"import\" or \"source_relative\""
                            )))
                        }
                    }
                }
                "api_import_path" => self.api_import_path = value.to_string(),
                "logger_import_path" => self.logger_import_path = value.to_string(),
                "api_file_suffix" => self.api_file_suffix = value.to_string(),
                "log_level" => self.log_level = value.to_string(),
                other => {
                    return Err(CodegenError::Config(format!(
                        "unknown parameter {other:?}"
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parameter_overrides_defaults() {
        let mut config = Config::default();
        config
            .apply_parameter("paths=source_relative,Mfgs/fgs.proto=example.com/api/fgs,log_level=debug")
            .unwrap();

        assert_eq!(config.paths, PathsMode::SourceRelative);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.import_mappings.get("fgs/fgs.proto").map(String::as_str),
            Some("example.com/api/fgs")
        );
        assert_eq!(config.api_import_path, default_api_import_path());
    }

    #[test]
    fn empty_parameter_is_a_no_op() {
        let mut config = Config::default();
        config.apply_parameter("").unwrap();
        assert_eq!(config.paths, PathsMode::Import);
        assert!(config.import_mappings.is_empty());
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut config = Config::default();
        assert_matches!(
            config.apply_parameter("plugins=grpc"),
            Err(CodegenError::Config(msg)) if msg.contains("plugins")
        );
        assert_matches!(
            config.apply_parameter("paths=absolute"),
            Err(CodegenError::Config(_))
        );
    }
}
