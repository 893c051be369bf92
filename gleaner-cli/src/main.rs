//! Gleaner CLI
//!
//! Inspect how crawled markup is decoded, tokenized and repaired.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gleaner_common::warning::set_quiet;
use gleaner_dom::{Document, NodeId, NodeType, PathKey};
use gleaner_markup::{
    Encoding, ParseOptions, ParseOutcome, ParseStatus, Tokenizer, detect_encoding, parse_reader,
    render_tree,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Gleaner: lenient markup parser inspector
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the repaired tree of a page
    gleaner page.html

    # Parse inline markup
    gleaner --markup '<ul><li>one<li>two</ul>'

    # Show the token stream instead of the tree
    gleaner --tokens page.html

    # Path key of every node, for structure tools
    gleaner --paths page.html

    # Only report the detected encoding
    gleaner --detect feed.xml
"#)]
struct Cli {
    /// File to parse; `-` or nothing reads stdin
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this string instead of a file
    #[arg(long, value_name = "MARKUP", conflicts_with = "path")]
    markup: Option<String>,

    /// XML mode: case-sensitive names, no HTML recovery tables
    #[arg(long)]
    xml: bool,

    /// Print tokens instead of the tree
    #[arg(long, conflicts_with_all = ["json", "paths"])]
    tokens: bool,

    /// Print the tree as JSON
    #[arg(long)]
    json: bool,

    /// Print the path key of every node
    #[arg(long)]
    paths: bool,

    /// Print the detected encoding and exit
    #[arg(long)]
    detect: bool,

    /// List the supported encodings and exit
    #[arg(long)]
    list_encodings: bool,

    /// Fail on undecodable input instead of substituting '?'
    #[arg(long)]
    strict: bool,

    /// Keep <!...> declarations and <?...?> instructions as comments
    #[arg(long)]
    retain_comments: bool,

    /// Drop all comments
    #[arg(long)]
    ignore_comments: bool,

    /// Keep whitespace-only text as empty text nodes
    #[arg(long)]
    keep_empty: bool,

    /// Reject input with no tag in the first 32 KiB
    #[arg(long)]
    require_tag: bool,

    /// Decode with this charset label instead of detecting
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Give up after this many milliseconds and print the partial tree
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Do not print recovery warnings
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    set_quiet(cli.quiet);

    if cli.list_encodings {
        for encoding in Encoding::iter() {
            println!("{encoding}");
        }
        return Ok(());
    }

    let options = build_options(&cli)?;
    let input = open_input(&cli)?;

    if cli.detect {
        let mut source = gleaner_markup::ByteSource::new(input);
        let encoding = detect_encoding(&mut source, options.lookahead_window)?;
        println!("{encoding}");
        return Ok(());
    }

    if cli.tokens {
        return print_tokens(input, &options);
    }

    let outcome = parse_reader(input, &options).context("parse failed")?;
    if cli.json {
        let tree = JsonNode::build(&outcome.document, outcome.document.root());
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else if cli.paths {
        print_paths(&outcome.document);
    } else {
        print!("{}", render_tree(outcome.document.tree(), outcome.document.root()));
    }
    if !cli.quiet {
        report(&outcome);
    }
    Ok(())
}

fn build_options(cli: &Cli) -> Result<ParseOptions> {
    let mut options = if cli.xml {
        ParseOptions::xml()
    } else {
        ParseOptions::html()
    };
    options.strict_encoding = cli.strict;
    options.retain_comments = cli.retain_comments;
    options.ignore_comments = cli.ignore_comments;
    options.keep_empty_text = cli.keep_empty;
    options.require_leading_tag_within_window = cli.require_tag;
    if let Some(label) = &cli.encoding {
        let Some(encoding) = Encoding::from_label(label) else {
            bail!("unknown encoding label '{label}' (see --list-encodings)");
        };
        options = options.with_encoding(encoding);
    }
    if let Some(ms) = cli.timeout_ms {
        options = options.with_time_limit(Duration::from_millis(ms));
    }
    Ok(options)
}

fn open_input(cli: &Cli) -> Result<Box<dyn Read>> {
    if let Some(markup) = &cli.markup {
        return Ok(Box::new(io::Cursor::new(markup.clone().into_bytes())));
    }
    match &cli.path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("cannot open '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

fn print_tokens(input: Box<dyn Read>, options: &ParseOptions) -> Result<()> {
    let mut source = gleaner_markup::ByteSource::new(input);
    let encoding = match options.forced_encoding {
        Some(encoding) => encoding,
        None => detect_encoding(&mut source, options.lookahead_window)?,
    };
    let decoder = gleaner_markup::ByteDecoder::from_source(source, encoding)?
        .with_strict(options.strict_encoding);
    let mut tokenizer = Tokenizer::new(decoder, options);
    tokenizer.run()?;
    for token in tokenizer.into_tokens() {
        println!("{token}");
    }
    Ok(())
}

fn print_paths(document: &Document) {
    for (id, key) in document.path_keys() {
        let Some(node) = document.node(id) else {
            continue;
        };
        let label = node.name().unwrap_or_else(|| node.node_type().label());
        println!("{:>5}  {:<12} {}", id.0, label, key.cyan());
    }
}

fn report(outcome: &ParseOutcome) {
    eprintln!(
        "{} {} bytes as {}",
        "decoded".green().bold(),
        outcome.bytes_consumed,
        outcome.encoding
    );
    if outcome.status == ParseStatus::TimedOut {
        eprintln!("{}", "parse timed out; tree is partial".red().bold());
    }
    for issue in &outcome.issues {
        let tag = if issue.is_error {
            "error".red().to_string()
        } else {
            "repair".yellow().to_string()
        };
        eprintln!("  {tag} @{} [{}] {}", issue.position, issue.kind, issue.message);
    }
}

#[derive(Serialize)]
struct JsonNode {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<gleaner_dom::Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    path: PathKey,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode>,
}

impl JsonNode {
    fn build(document: &Document, id: NodeId) -> Self {
        let tree = document.tree();
        let node_type = tree.get(id).map_or(&NodeType::Document, |node| &node.node_type);
        let (name, attributes) = match node_type {
            NodeType::Element(data) => (Some(data.tag_name.clone()), Some(data.attrs.clone())),
            _ => (None, None),
        };
        Self {
            kind: node_type.label().trim_start_matches('#'),
            name,
            attributes,
            text: node_type.own_text().map(str::to_string),
            path: document.path_key(id).cloned().unwrap_or_else(PathKey::root),
            children: tree
                .children(id)
                .iter()
                .map(|&child| Self::build(document, child))
                .collect(),
        }
    }
}
