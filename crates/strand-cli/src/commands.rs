use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use strand_protocol::{ReadSession, SessionConfig, SessionResult};
use strand_refs::{
    InMemoryRegistry, ReferenceCollector, ReferenceRegistry, REF_PREFIX, REF_SEPARATOR,
};
use strand_wire::{JsonTokenReader, JsonTokenWriter, Token, WireResult};
use tracing::{debug, warn};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Check(args) => cmd_check(args, &config),
        Command::Fmt(args) => cmd_fmt(args, &config),
        Command::Refs(args) => cmd_refs(args, &config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    match path {
        Some(path) => {
            let config = SessionConfig::from_toml_file(path)?;
            debug!(path = %path.display(), "loaded session config");
            Ok(config)
        }
        None => Ok(SessionConfig::default()),
    }
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn cmd_check(args: CheckArgs, config: &SessionConfig) -> anyhow::Result<()> {
    let input = open_input(&args.file)?;
    check_document(input, config)
        .with_context(|| format!("{} is not a valid document", args.file.display()))?;
    println!(
        "{} {} is well-formed",
        "✓".green().bold(),
        args.file.display().to_string().bold()
    );
    Ok(())
}

fn cmd_fmt(args: FmtArgs, config: &SessionConfig) -> anyhow::Result<()> {
    let input = open_input(&args.file)?;
    let indent = args.pretty.then_some(args.indent);
    let mut out = format_document(input, io::stdout().lock(), config, indent)
        .with_context(|| format!("cannot format {}", args.file.display()))?;
    if indent.is_none() {
        writeln!(out)?;
    }
    Ok(())
}

fn cmd_refs(args: RefsArgs, config: &SessionConfig) -> anyhow::Result<()> {
    let registry = InMemoryRegistry::with_types(&args.types).context("invalid resource type")?;
    let input = open_input(&args.file)?;
    let scan = scan_references(input, &registry, config)
        .with_context(|| format!("cannot scan {}", args.file.display()))?;
    for reference in scan.found.iter() {
        println!("{}", registry.canonicalize(reference)?.cyan());
    }
    println!("{} distinct reference(s)", scan.found.len().to_string().bold());
    if scan.rejected > 0 {
        println!(
            "{} {} value(s) look like references but do not resolve",
            "!".yellow().bold(),
            scan.rejected
        );
    }
    Ok(())
}

/// Walk exactly one value and require that nothing follows it.
pub fn check_document<R: BufRead>(input: R, config: &SessionConfig) -> SessionResult<()> {
    let registry = InMemoryRegistry::new();
    let mut session = ReadSession::new(JsonTokenReader::new(input), &registry, config);
    session.swallow_value()?;
    session.finish()
}

/// Copy a document token by token, indented by `indent` spaces per level if
/// given.
pub fn format_document<R: BufRead, W: Write>(
    input: R,
    out: W,
    config: &SessionConfig,
    indent: Option<usize>,
) -> WireResult<W> {
    let mut reader = JsonTokenReader::new(input).with_max_depth(config.max_depth);
    let mut writer = match indent {
        Some(width) => JsonTokenWriter::pretty(out, width),
        None => JsonTokenWriter::new(out),
    };
    let mut tokens = 0usize;
    while let Some(token) = reader.next_token()? {
        writer.write_token(&token)?;
        tokens += 1;
    }
    debug!(tokens, "formatted document");
    writer.finish()
}

pub struct ReferenceScan {
    pub found: ReferenceCollector,
    /// Strings in reference syntax whose type is unknown or that are malformed.
    pub rejected: usize,
}

/// Collect every string value or member name in reference syntax that
/// resolves against `registry`.
pub fn scan_references<R: BufRead>(
    input: R,
    registry: &dyn ReferenceRegistry,
    config: &SessionConfig,
) -> WireResult<ReferenceScan> {
    let mut reader = JsonTokenReader::new(input).with_max_depth(config.max_depth);
    let mut scan = ReferenceScan {
        found: ReferenceCollector::new(),
        rejected: 0,
    };
    while let Some(token) = reader.next_token()? {
        let text = match &token {
            Token::String(s) | Token::Name(s) if looks_like_reference(s) => s,
            _ => continue,
        };
        match registry.resolve(text) {
            Ok(reference) => {
                scan.found.record(&reference);
            }
            Err(e) => {
                warn!(value = text.as_str(), error = %e, "skipping unresolvable reference");
                scan.rejected += 1;
            }
        }
    }
    Ok(scan)
}

fn looks_like_reference(text: &str) -> bool {
    text.strip_prefix(REF_PREFIX)
        .is_some_and(|rest| rest.starts_with(REF_SEPARATOR))
}
