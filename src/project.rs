//! The Mix project manifest.
//!
//! Only two facts are read from `mix.exs`: the OTP application name
//! (`app: :my_app`), which prefixes every derived name, and the application
//! module (`defmodule MyApp.MixProject`), which the override files address.

use std::path::Path;

use regex::Regex;

use crate::error::WtenvError;

pub const MANIFEST_FILE: &str = "mix.exs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixProject {
    /// OTP application name, e.g. `my_app`.
    pub app: String,
    /// Application module, e.g. `MyApp`.
    pub module: String,
}

impl MixProject {
    /// Read `mix.exs` in `root`.
    pub fn load(root: &Path) -> Result<Self, WtenvError> {
        let manifest = root.join(MANIFEST_FILE);
        let contents =
            std::fs::read_to_string(&manifest).map_err(|_| WtenvError::ManifestNotFound {
                path: manifest.clone(),
            })?;
        Self::parse(&contents).ok_or(WtenvError::ProjectNameMissing {
            manifest: Some(manifest),
        })
    }

    /// Parse manifest text. Returns `None` without an `app:` entry.
    ///
    /// The module falls back to the camel-cased app name when the manifest
    /// has no `defmodule ... .MixProject` line.
    pub fn parse(contents: &str) -> Option<Self> {
        thread_local! {
            static APP: Regex = Regex::new(r"\bapp:\s*:([a-z][a-z0-9_]*)").unwrap();
            static MODULE: Regex =
                Regex::new(r"defmodule\s+([A-Z][A-Za-z0-9_.]*)\.MixProject\b").unwrap();
        }
        let app = APP.with(|re| re.captures(contents).map(|c| c[1].to_string()))?;
        let module = MODULE
            .with(|re| re.captures(contents).map(|c| c[1].to_string()))
            .unwrap_or_else(|| camelize(&app));
        Some(Self { app, module })
    }

    /// Web module, e.g. `MyAppWeb`.
    pub fn web_module(&self) -> String {
        format!("{}Web", self.module)
    }

    pub fn endpoint_module(&self) -> String {
        format!("{}.Endpoint", self.web_module())
    }

    pub fn repo_module(&self) -> String {
        format!("{}.Repo", self.module)
    }

    pub fn with_module(mut self, module: Option<&str>) -> Self {
        if let Some(module) = module {
            self.module = module.to_string();
        }
        self
    }
}

/// `my_app` → `MyApp`, the way Mix derives module names.
pub fn camelize(app: &str) -> String {
    app.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
