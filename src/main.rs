mod client;
mod config;
mod controller;
mod document_model;
mod error;
mod protocol;
mod search;
mod view;

use clap::Parser;
use client::{SearchClient, SearchHistory, Target};
use config::{RcConfig, RcLoader};
use controller::ViewerController;
use document_model::{DocumentTree, markup};
use protocol::message::SearchRequest;
use protocol::{Request, Response};
use search::{PatternFlags, SearchEngine};
use std::io;
use view::TerminalLayout;

/// Find regular-expression matches in an HTML document and highlight them.
#[derive(Parser, Debug)]
#[command(name = "markfind", version, about)]
struct Args {
    /// Document to search: a path or a file:// location
    #[arg(required_unless_present = "sample_rc")]
    file: Option<String>,

    /// Search for this pattern on startup
    #[arg(short, long)]
    pattern: Option<String>,

    /// Flag letters for the pattern (g i m s u)
    #[arg(short, long)]
    flags: Option<String>,

    /// Upper bound on highlighted matches (1-10000)
    #[arg(long)]
    max_matches: Option<usize>,

    /// Remembered patterns (1-100)
    #[arg(long)]
    history_limit: Option<usize>,

    /// Answer JSON-lines requests on stdin instead of opening the viewer
    #[arg(long, conflicts_with_all = ["print", "json"])]
    serve: bool,

    /// Print the highlighted markup for --pattern and exit
    #[arg(long, requires = "pattern")]
    print: bool,

    /// Print the search response for --pattern as JSON and exit
    #[arg(long, requires = "pattern", conflicts_with = "print")]
    json: bool,

    /// Print a sample .markfindrc and exit
    #[arg(long)]
    sample_rc: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if args.sample_rc {
        print!("{}", RcLoader::generate_sample_rc());
        return Ok(());
    }

    // Load RC configuration, then let the command line override it
    let mut config = RcLoader::load_config();
    apply_overrides(&mut config, &args)?;

    let Some(location) = args.file.as_deref() else {
        return Err("no document given".into());
    };
    let target = Target::new(location);
    let tree = target.load()?;

    if args.serve {
        let mut engine = SearchEngine::new(tree, TerminalLayout::default());
        let handled = protocol::serve(&mut engine, io::stdin().lock(), io::stdout().lock())?;
        log::info!("served {handled} requests");
        return Ok(());
    }

    if let (true, Some(pattern)) = (args.print || args.json, args.pattern.as_deref()) {
        return print_once(tree, &config, pattern, args.json);
    }

    let history = match config.history_path() {
        Some(path) => SearchHistory::load(&path, config.history_limit),
        None => SearchHistory::new(config.history_limit),
    };
    let client = SearchClient::new(&config, history);
    let mut viewer = ViewerController::new(tree, target, client);
    if let Some(pattern) = args.pattern.as_deref() {
        viewer.initial_search(pattern);
    }

    viewer.run()
}

fn apply_overrides(config: &mut RcConfig, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(flags) = args.flags.as_deref() {
        config.flags = PatternFlags::parse(flags)?;
    }
    if let Some(max) = args.max_matches {
        config.set_max_matches(max);
    }
    if let Some(limit) = args.history_limit {
        config.set_history_limit(limit);
    }
    Ok(())
}

/// One search without the interactive viewer.
fn print_once(
    tree: DocumentTree,
    config: &RcConfig,
    pattern: &str,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = SearchEngine::new(tree, TerminalLayout::default());
    let response = protocol::route(
        &mut engine,
        Request::Search(SearchRequest {
            pattern: pattern.to_string(),
            flags: config.flags.to_string(),
            max_matches: config.max_matches,
        }),
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    if let Response::Failed { error, .. } = response {
        return Err(error.into());
    }
    println!("{}", markup::serialize(engine.tree()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_rc_values() {
        let args = Args::parse_from([
            "markfind",
            "page.html",
            "--flags",
            "gi",
            "--max-matches",
            "20000",
            "--history-limit",
            "7",
        ]);
        let mut config = RcConfig::default();
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.flags, PatternFlags::parse("gi").unwrap());
        assert_eq!(config.max_matches, 10_000);
        assert_eq!(config.history_limit, 7);
    }

    #[test]
    fn test_bad_flags_rejected() {
        let args = Args::parse_from(["markfind", "page.html", "--flags", "gx"]);
        assert!(apply_overrides(&mut RcConfig::default(), &args).is_err());
    }

    #[test]
    fn test_print_requires_pattern() {
        assert!(Args::try_parse_from(["markfind", "page.html", "--print"]).is_err());
        assert!(Args::try_parse_from(["markfind", "page.html", "--serve", "--json", "-p", "x"]).is_err());
        assert!(Args::try_parse_from(["markfind", "--sample-rc"]).is_ok());
    }
}
