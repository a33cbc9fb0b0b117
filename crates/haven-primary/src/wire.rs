// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response bodies of the JSON function API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/query` and `POST /api/mutation`.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCall<'a> {
    pub path: &'a str,
    pub args: &'a Value,
    pub format: &'static str,
}

impl<'a> FunctionCall<'a> {
    pub fn new(path: &'a str, args: &'a Value) -> Self {
        Self {
            path,
            args,
            format: "json",
        }
    }
}

/// Result of a function call, tagged by `status`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FunctionResult {
    Success {
        #[serde(default)]
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
        #[serde(rename = "errorData", default)]
        error_data: Option<Value>,
    },
}
