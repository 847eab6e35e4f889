//! Minimal CLI: schema + JSON/NDJSON documents → validation report
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::engine::{DEFAULT_MAX_DEPTH, Validator};
use crate::registry::FormatRegistry;
use crate::report::{Report, Violation};
use crate::schema::SchemaNode;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON/NDJSON documents against a declarative object schema
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate every input document and print a report
    Validate(ValidateOut),
    /// parse a schema file and report problems with it
    CheckSchema(CheckSchemaOut),
    /// list the registered format names
    Formats,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is validated.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// one PASS/FAIL line per document, errors indented below
    #[default]
    Text,
    /// JSON array of `{source, status, errors}`
    Json,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema .json file
    #[arg(long, short)]
    schema: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// include the structured violation tree in JSON output
    #[arg(long, default_value_t = false)]
    structured: bool,

    /// maximum object/array nesting before a subtree is rejected
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckSchemaOut {
    /// schema .json file
    #[arg(long, short)]
    schema: PathBuf,
}

/// One data document plus where it came from.
#[derive(Debug, Clone)]
struct Document {
    source: String,
    value: Value,
}

#[derive(Debug, Serialize)]
struct DocumentOutcome<'a> {
    source: &'a str,
    status: bool,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<&'a [Violation]>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let sources = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source in sources {
            let label = source.display_name();
            let text = source.read()?;
            info!(source = %label, bytes = text.len(), "loaded input");
            if self.ndjson {
                for (line_no, line) in text.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let value = serde_json::from_str::<Value>(line).with_context(|| {
                        format!("failed to parse NDJSON line {} of {label}", line_no + 1)
                    })?;
                    self.select(format!("{label}:{}", line_no + 1), value, &mut out)?;
                }
            } else {
                let value = serde_json::from_str::<Value>(&text)
                    .with_context(|| format!("failed to parse JSON source file ({label})"))?;
                self.select(label, value, &mut out)?;
            }
        }
        debug!(documents = out.len(), "inputs expanded");
        Ok(out)
    }

    /// Apply the pointer, then the jq filter.
    fn select(&self, source: String, value: Value, out: &mut Vec<Document>) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => match value.pointer(pointer) {
                Some(selected) => selected.clone(),
                None => bail!("JSON pointer {pointer} selects nothing in {source}"),
            },
        };
        match self.jq_expr.as_deref() {
            None => out.push(Document { source, value }),
            Some(jq_expr) => {
                let selected = crate::jq_exec::select_documents(jq_expr, &value).with_context(|| {
                    format!("failed to apply jq expression to source file ({source})")
                })?;
                for (i, value) in selected.into_iter().enumerate() {
                    out.push(Document { source: format!("{source}#{i}"), value });
                }
            }
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Validate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }
                target.run()
            }
            Command::CheckSchema(target) => target.run(),
            Command::Formats => {
                let registry = FormatRegistry::standard();
                let mut stdout = std::io::stdout().lock();
                for name in registry.names() {
                    writeln!(stdout, "{name}")?;
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

impl ValidateOut {
    fn run(&self) -> Result<ExitCode> {
        let schema = load_schema(&self.schema)?;
        let documents = self.input_settings.load_documents()?;
        let validator = Validator::standard().with_max_depth(self.max_depth);

        let reports: Vec<Report> = documents
            .par_iter()
            .map(|doc| validator.check_value(&schema, &doc.value))
            .collect();

        let failed = reports.iter().filter(|r| !r.is_valid()).count();
        info!(documents = documents.len(), failed, "validation finished");

        let rendered = match self.output {
            OutputFormat::Text => render_text(&documents, &reports),
            OutputFormat::Json => render_json(&documents, &reports, self.structured)?,
        };
        write_output(self.out.as_deref(), &rendered)?;

        Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

impl CheckSchemaOut {
    fn run(&self) -> Result<ExitCode> {
        let schema = match load_schema(&self.schema) {
            Ok(schema) => schema,
            Err(error) => {
                println!("{} {error:#}", "INVALID".red().bold());
                return Ok(ExitCode::FAILURE);
            }
        };
        let malformed = malformed_objects(&schema);
        for path in &malformed {
            println!("{} {path}: {}", "INVALID".red().bold(), Violation::SchemaMalformed);
        }
        if !malformed.is_empty() {
            return Ok(ExitCode::FAILURE);
        }
        let unknown = unknown_formats(&schema, &FormatRegistry::standard());
        for format in &unknown {
            println!("{} format '{format}' is not registered", "WARN".yellow().bold());
        }
        println!("{} {}", "OK".green().bold(), self.schema.display());
        Ok(ExitCode::SUCCESS)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    fn display_name(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.to_string_lossy().to_string(),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            InputSource::Stdin => {
                std::io::read_to_string(std::io::stdin()).context("failed to read stdin")
            }
            InputSource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read source file {}", path.display())),
        }
    }
}

fn load_schema(path: &Path) -> Result<SchemaNode> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    SchemaNode::from_json_str(&src)
        .with_context(|| format!("failed to load schema {}", path.display()))
}

/// Pointers to every node the engine would reject as a malformed object:
/// the root when it is not an object with properties, and any nested
/// object (property or array item) without properties.
fn malformed_objects(schema: &SchemaNode) -> Vec<String> {
    fn walk(node: &SchemaNode, path: String, out: &mut Vec<String>) {
        match node {
            SchemaNode::Object(r) => match &r.properties {
                None => out.push(if path.is_empty() { "/".to_string() } else { path }),
                Some(properties) => {
                    for (name, child) in properties {
                        walk(child, format!("{path}/properties/{name}"), out);
                    }
                }
            },
            SchemaNode::Array(r) => {
                if let Some(items) = r.items.as_deref() {
                    walk(items, format!("{path}/items"), out);
                }
            }
            SchemaNode::String(_) | SchemaNode::Number(_) | SchemaNode::Boolean(_) => {}
        }
    }
    let mut out = Vec::new();
    match schema {
        SchemaNode::Object(_) => walk(schema, String::new(), &mut out),
        _ => out.push("/".to_string()),
    }
    out
}

fn unknown_formats(schema: &SchemaNode, registry: &FormatRegistry) -> Vec<String> {
    fn walk(node: &SchemaNode, registry: &FormatRegistry, out: &mut Vec<String>) {
        let format = match node {
            SchemaNode::String(r) => r.format.as_ref(),
            SchemaNode::Number(r) => r.format.as_ref(),
            SchemaNode::Boolean(_) => None,
            SchemaNode::Object(r) => {
                for child in r.properties.iter().flat_map(|p| p.values()) {
                    walk(child, registry, out);
                }
                None
            }
            SchemaNode::Array(r) => {
                if let Some(items) = r.items.as_deref() {
                    walk(items, registry, out);
                }
                None
            }
        };
        if let Some(format) = format {
            if registry.lookup(format).is_none() && !out.contains(format) {
                out.push(format.clone());
            }
        }
    }
    let mut out = Vec::new();
    walk(schema, registry, &mut out);
    out
}

fn render_text(documents: &[Document], reports: &[Report]) -> String {
    let mut out = String::new();
    for (doc, report) in documents.iter().zip(reports) {
        if report.is_valid() {
            out.push_str(&format!("{} {}\n", "PASS".green().bold(), doc.source));
        } else {
            out.push_str(&format!("{} {}\n", "FAIL".red().bold(), doc.source));
            for message in report.messages() {
                out.push_str(&format!("    - {message}\n"));
            }
        }
    }
    out
}

fn render_json(documents: &[Document], reports: &[Report], structured: bool) -> Result<String> {
    let outcomes: Vec<DocumentOutcome<'_>> = documents
        .iter()
        .zip(reports)
        .map(|(doc, report)| DocumentOutcome {
            source: &doc.source,
            status: report.is_valid(),
            errors: report.messages(),
            violations: structured.then(|| report.violations()),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&outcomes)?)
}

fn write_output(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered)
                .with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<InputSource>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<InputSource>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            out.push(InputSource::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(InputSource::File(entry?));
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(InputSource::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}
