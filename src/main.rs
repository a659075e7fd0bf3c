//! trawl - command line front end
//!
//! ```text
//! trawl describe <source> <xpath>
//! trawl pattern  <source> <root-xpath> <node-xpath>
//! trawl extract  <source> <selectors.json>
//! ```

use std::collections::BTreeMap;
use std::env;
use trawl::query::resolve_first;
use trawl::{
    Extractor, NAME, PageLoader, PathBuilder, Result, SelectorSpec, TrawlConfig, TrawlError,
    VERSION, find_matches, relative_path,
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["describe", source, xpath] => describe(source, xpath).await,
        ["pattern", source, root, node] => pattern(source, root, node).await,
        ["extract", source, selectors] => extract(source, selectors).await,
        ["--version"] | ["-V"] => {
            println!("{NAME} {VERSION}");
            Ok(())
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("{NAME}: {e}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("{NAME} {VERSION}");
    eprintln!();
    eprintln!("usage:");
    eprintln!("  {NAME} describe <source> <xpath>");
    eprintln!("  {NAME} pattern <source> <root-xpath> <node-xpath>");
    eprintln!("  {NAME} extract <source> <selectors.json>");
    eprintln!();
    eprintln!("<source> is an http(s) URL, a file:// URL or a path.");
    eprintln!("Set TRAWL_CONFIG to a JSON file to override defaults.");
}

async fn describe(source: &str, xpath: &str) -> Result<()> {
    let config = TrawlConfig::from_env()?;
    let page = PageLoader::new(&config)?.load(source).await?;
    let node = resolve_first(page.document(), xpath)?
        .ok_or_else(|| TrawlError::NodeNotFound(xpath.to_string()))?;
    let descriptor = PathBuilder::new(page.document(), &config)
        .describe(node)
        .ok_or_else(|| TrawlError::NodeNotFound(xpath.to_string()))?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

async fn pattern(source: &str, root_xpath: &str, node_xpath: &str) -> Result<()> {
    let config = TrawlConfig::from_env()?;
    let page = PageLoader::new(&config)?.load(source).await?;
    let document = page.document();
    let root = resolve_first(document, root_xpath)?
        .ok_or_else(|| TrawlError::NodeNotFound(root_xpath.to_string()))?;
    let node = resolve_first(document, node_xpath)?
        .ok_or_else(|| TrawlError::NodeNotFound(node_xpath.to_string()))?;

    let pattern = relative_path(document, node, root);
    let outcome = find_matches(document, &pattern, root, config.fallback_depth);
    println!("pattern: {pattern}");
    println!("phase:   {:?}", outcome.phase);
    println!("matches: {}", outcome.len());
    for node in &outcome.nodes {
        println!("  {}", document.text_content(*node).trim());
    }
    Ok(())
}

async fn extract(source: &str, selectors_path: &str) -> Result<()> {
    let config = TrawlConfig::from_env()?;
    let selectors: BTreeMap<String, SelectorSpec> =
        serde_json::from_str(&tokio::fs::read_to_string(selectors_path).await?)?;
    let mut page = PageLoader::new(&config)?.load(source).await?;
    let record = Extractor::new(&config).extract(&mut page, &selectors);
    page.revert_all_flashes();
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
