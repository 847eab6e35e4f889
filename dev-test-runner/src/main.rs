//! Runs the JSON fixture cases through `json_gate` and diffs the results.
//!
//! usage: dev-test-runner [NAME_REGEX] [--cases PATH]
use std::process::ExitCode;

use colored::Colorize;
use json_gate::{SchemaNode, ValidationResult, Validator};
use regex::Regex;
use serde::Deserialize;

const DEFAULT_CASES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/cases.json");

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    schema: serde_json::Value,
    data: serde_json::Value,
    expected: ValidationResult,
}

fn load_cases(path: &str) -> Result<Vec<Case>, String> {
    let src = std::fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    json_gate::path_de::from_str_with_path(&src).map_err(|e| e.to_string())
}

fn run_case(validator: &Validator, case: &Case) -> Result<(), String> {
    let schema = SchemaNode::from_value(&case.schema).map_err(|e| e.to_string())?;
    let actual = validator.validate_value(&schema, &case.data);
    if actual == case.expected {
        Ok(())
    } else {
        Err(format!(
            "expected {}\n      actual   {}",
            serde_json::to_string(&case.expected).unwrap_or_default(),
            serde_json::to_string(&actual).unwrap_or_default(),
        ))
    }
}

fn main() -> ExitCode {
    let mut filter: Option<Regex> = None;
    let mut cases_path = DEFAULT_CASES.to_string();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--cases" {
            match args.next() {
                Some(path) => cases_path = path,
                None => {
                    eprintln!("--cases needs a path");
                    return ExitCode::from(2);
                }
            }
        } else {
            match Regex::new(&arg) {
                Ok(rx) => filter = Some(rx),
                Err(error) => {
                    eprintln!("bad filter {arg:?}: {error}");
                    return ExitCode::from(2);
                }
            }
        }
    }

    let cases = match load_cases(&cases_path) {
        Ok(cases) => cases,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    };

    let validator = Validator::standard();
    let (mut passed, mut failed) = (0usize, 0usize);
    for case in &cases {
        if filter.as_ref().is_some_and(|rx| !rx.is_match(&case.name)) {
            continue;
        }
        match run_case(&validator, case) {
            Ok(()) => {
                passed += 1;
                eprintln!("{} {}", "✅".green(), case.name);
            }
            Err(diff) => {
                failed += 1;
                eprintln!("{} {}\n      {diff}", "❌".red(), case.name);
            }
        }
    }

    eprintln!("—— {passed} passed, {failed} failed ——");
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fixtures_load() {
        let cases = load_cases(DEFAULT_CASES).unwrap();
        assert!(!cases.is_empty());
    }

    #[test]
    fn load_error_names_the_json_path() {
        let name = format!("json-gate-cases-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        let src = r#"[{"name":"a","schema":{},"data":{},"expected":{"status":"yes"}}]"#;
        std::fs::write(&path, src).unwrap();
        let err = load_cases(path.to_str().unwrap()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.starts_with("at JSON path [0].expected.status"), "{err}");
    }
}
