// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Figment reports deserialization failures with a key path and, for file
//! providers, the file they came from. This module turns them into miette
//! diagnostics that point at the offending line and suggest the closest
//! valid key (Jaro-Winkler similarity).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches typos like `naem` -> `name` and `defalt_author` -> `default_author`.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A TOML source kept around for span lookup: `(display name, contents)`.
pub type TomlSource = (String, String);

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no config struct declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(toolbridge::config::unknown_key),
        help("{}", did_you_mean(suggestion.as_deref(), "valid keys", valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(toolbridge::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `tools.serialize_calls`.
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(toolbridge::config::missing_key),
        help("add `{key} = <value>` to your toolbridge.toml")
    )]
    MissingKey { key: String },

    /// A well-typed value that fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(toolbridge::config::validation))]
    Validation { message: String },

    /// A value outside a closed set of choices.
    #[error("invalid value `{value}` for `{key}`")]
    #[diagnostic(
        code(toolbridge::config::invalid_value),
        help("{}", did_you_mean(suggestion.as_deref(), "allowed values", allowed))
    )]
    InvalidValue {
        key: String,
        value: String,
        suggestion: Option<String>,
        allowed: String,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(toolbridge::config::other))]
    Other(String),
}

fn did_you_mean(suggestion: Option<&str>, label: &str, choices: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {label}: {choices}"),
        None => format!("{label}: {choices}"),
    }
}

/// Converts every error carried by a `figment::Error` into a diagnostic.
///
/// `sources` are the TOML texts that went into the figment; unknown keys
/// found in one of them get a span pointing at the key.
pub fn figment_to_config_errors(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let dotted = error
                .path
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate_key(&error, field, sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.to_string(),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: dotted,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.clone(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Picks the source an error came from and finds the key inside it.
///
/// File-backed errors match by path. Otherwise a single supplied source is
/// assumed to be the origin.
fn locate_key(
    error: &figment::Error,
    field: &str,
    sources: &[TomlSource],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    let only = || if sources.len() == 1 { sources.first() } else { None };
    let source = match file {
        Some(path) => sources.iter().find(|(name, _)| *name == path).or_else(only),
        None => only(),
    };
    let Some((name, content)) = source else {
        return (None, None);
    };

    let section: Vec<String> = error.path.iter().cloned().collect();
    match find_key_offset(content, &section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Finds the byte offset of `field` as a key inside the table named by the
/// first element of `path` (or the document root when `path` is empty).
///
/// Only lines between the table header and the next header are searched.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let header = path.first().map(|section| format!("[{section}]"));
    let mut in_section = header.is_none();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            in_section = header
                .as_deref()
                .is_some_and(|h| trimmed.trim_end().starts_with(h));
        } else if in_section
            && let Some(rest) = trimmed.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Suggests the closest valid key above the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Renders diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
