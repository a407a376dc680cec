// ABOUTME: CLI running drdplus-web content passes over a rulebook page.
// ABOUTME: Reads HTML from a file or stdin and prints the processed page or a table report.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use drdplus_web::{HtmlDocument, HtmlHelper, TestsConfiguration};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Process rendered DrD+ rulebook pages.
#[derive(Parser, Debug)]
#[command(name = "drdplus-pages")]
#[command(about = "Run drdplus-web content passes over an HTML page", long_about = None)]
struct Args {
    /// HTML file to process. Use "-" to read from stdin.
    input: String,

    /// Replace diacritics from element ids
    #[arg(long)]
    ids: bool,

    /// Wrap content of elements with ids into self-anchors
    #[arg(long)]
    anchors: bool,

    /// Mark links to other hosts with the external-url class
    #[arg(long)]
    mark_external: bool,

    /// Inject frames previewing linked remote tables (marks external links first)
    #[arg(long)]
    remote_tables: bool,

    /// Turn public drdplus.info links to local drdplus.loc ones
    #[arg(long)]
    localize: bool,

    /// Run every pass
    #[arg(long)]
    all: bool,

    /// Host of the processed site; overrides public_url of --config
    #[arg(long)]
    host: Option<String>,

    /// Tests configuration (YAML) of the processed site
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print tables with these ids as JSON instead of the page; use without value for all tables
    #[arg(long, num_args = 0..)]
    tables: Option<Vec<String>>,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TableReport {
    id: String,
    original_id: String,
    rows: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let helper = build_helper(&args)?;
    let html = load_html(&args.input)?;
    let document = HtmlDocument::parse(&html);

    let output = match &args.tables {
        Some(wanted) => table_report(&helper, &document, wanted)?,
        None => {
            run_passes(&args, &helper, &document)?;
            document.html()
        }
    };

    match &args.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{output}"),
    }

    Ok(())
}

fn build_helper(args: &Args) -> Result<HtmlHelper> {
    let config = match &args.config {
        Some(path) => Some(
            TestsConfiguration::from_yaml_file(path)
                .with_context(|| format!("invalid tests configuration {}", path.display()))?,
        ),
        None => None,
    };

    let helper = match (&args.host, &config) {
        (Some(host), _) => HtmlHelper::builder().current_host(host.as_str()).build(),
        (None, Some(config)) => HtmlHelper::from_configuration(config),
        (None, None) => HtmlHelper::default(),
    };
    Ok(helper)
}

fn run_passes(args: &Args, helper: &HtmlHelper, document: &HtmlDocument) -> Result<()> {
    if args.all || args.ids {
        let replaced = helper.replace_diacritics_from_ids(document);
        info!(replaced, "ids");
    }
    if args.all || args.anchors {
        let added = helper.add_anchors_to_ids(document);
        info!(added, "anchors");
    }
    if args.all || args.mark_external || args.remote_tables {
        let marked = helper.mark_external_links_by_class(document);
        info!(marked = marked.marked(), "external links");
        if args.all || args.remote_tables {
            let injected = helper.inject_iframes_with_remote_tables(document, &marked)?;
            info!(injected, "remote tables");
        }
    }
    if args.all || args.localize {
        let rewritten = helper.make_drdplus_links_local(document);
        info!(rewritten, "local links");
    }
    Ok(())
}

fn table_report(helper: &HtmlHelper, document: &HtmlDocument, wanted: &[String]) -> Result<String> {
    let tables = helper.find_tables_with_ids(document, wanted);
    let mut report: Vec<TableReport> = tables
        .iter()
        .map(|(id, table)| TableReport {
            id: id.clone(),
            original_id: table.attr("id").map(|id| id.to_string()).unwrap_or_default(),
            rows: table.select("tr").length(),
        })
        .collect();
    report.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(serde_json::to_string_pretty(&report)?)
}

fn load_html(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = Path::new(input);
    if !path.exists() {
        bail!("file not found: {}", input);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {input}"))
}
