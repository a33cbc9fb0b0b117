// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns Figment extraction failures into miette diagnostics.
//!
//! Unknown keys get a "did you mean?" hint based on Jaro-Winkler similarity
//! and, when the offending file can be read, a labelled source span.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a candidate needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, renderable as an Elm-style report.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no config section declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(haven::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted by the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(haven::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required key is absent.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(haven::config::missing_key),
        help("add `{key} = <value>` to your haven.toml")
    )]
    MissingKey { key: String },

    /// A semantic check in [`validate_config`](crate::validation::validate_config) failed.
    #[error("validation error: {message}")]
    #[diagnostic(code(haven::config::validation))]
    Validation { message: String },

    /// Anything Figment reports that has no dedicated variant.
    #[error("configuration error: {0}")]
    #[diagnostic(code(haven::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs a file path with its contents and is used to attach
/// source spans to unknown-key errors.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let dotted_path = error
                .path
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(".");

            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate_unknown_key(&error, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: if dotted_path.is_empty() {
                        field.to_string()
                    } else {
                        format!("{dotted_path}.{field}")
                    },
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: dotted_path,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn locate_unknown_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        _ => return (None, None),
    };
    let Some((path, content)) = toml_sources.iter().find(|(p, _)| *p == origin) else {
        return (None, None);
    };

    let section = error.path.first().map(String::as_str);
    match find_key_offset(content, section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` inside `[section]` (or the top level when `None`).
///
/// Tracks section headers line by line so a key with the same name in a
/// different section is never matched.
pub fn find_key_offset(content: &str, section: Option<&str>, field: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            current = Some(header.trim());
        } else if current == section {
            let indent = line.len() - line.trim_start().len();
            let rest = &line[indent..];
            if let Some(after) = rest.strip_prefix(field)
                && after.trim_start().starts_with('=')
            {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }

    None
}

/// The closest valid key to `unknown`, if any clears the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
