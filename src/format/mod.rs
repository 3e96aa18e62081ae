//! Line-oriented textual persistence of a network.
//!
//! A network file is a sequence of facts, one per line, in three ordered
//! sections:
//!
//! ```text
//! resource(G1,100).
//! resource(G2,50).
//! site(M1,NORMAL).
//! site(M2,HIGH).
//! connection(G1,M1).
//! connection(G2,M2).
//! ```
//!
//! Keywords are case-insensitive, the trailing dot is optional on input,
//! blank lines are skipped, and a `connection` accepts its two names in
//! either order. Resources must come before sites, and sites before
//! connections. This layer only builds or reads the in-memory [`Network`];
//! the optimization engine never sees the textual form.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::network::{ConfigurationError, ConnectionError, ConsumptionTier, Network};

/// A network file that could not be read or parsed.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A line that is not a well-formed fact.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A fact that is well-formed but violates a construction rule.
    #[error("line {line}: {source}")]
    Configuration {
        line: usize,
        source: ConfigurationError,
    },

    /// A connection fact naming unknown entities or re-attaching a site.
    #[error("line {line}: {source}")]
    Connection {
        line: usize,
        source: ConnectionError,
    },
}

/// Which section of the file we are in; facts must not go backwards.
#[derive(PartialEq, PartialOrd)]
enum Phase {
    Resources,
    Sites,
    Connections,
}

/// Parses a network from its textual form.
pub fn parse_network(input: &str) -> Result<Network, FormatError> {
    let mut net = Network::default();
    let mut phase = Phase::Resources;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let mut text = raw.trim();
        if text.is_empty() {
            continue;
        }
        text = text.strip_suffix('.').unwrap_or(text).trim_end();

        let (keyword, args) = split_fact(text)
            .ok_or_else(|| syntax(line, format!("unrecognized fact `{text}`")))?;

        match keyword.to_ascii_lowercase().as_str() {
            "resource" => {
                if phase > Phase::Resources {
                    return Err(syntax(line, "resources must come first".into()));
                }
                let (name, capacity) = two_args(line, args)?;
                if net.resource_id(name).is_some() {
                    return Err(syntax(line, format!("duplicate resource `{name}`")));
                }
                let capacity: u32 = capacity.trim().parse().map_err(|_| {
                    syntax(line, format!("invalid capacity `{capacity}`"))
                })?;
                net.add_resource(name, capacity)
                    .map_err(|source| FormatError::Configuration { line, source })?;
            }
            "site" => {
                if phase > Phase::Sites {
                    return Err(syntax(line, "sites must come before connections".into()));
                }
                phase = Phase::Sites;
                let (name, tier) = two_args(line, args)?;
                if net.site_id(name).is_some() {
                    return Err(syntax(line, format!("duplicate site `{name}`")));
                }
                let tier: ConsumptionTier = tier
                    .parse()
                    .map_err(|source| FormatError::Configuration { line, source })?;
                net.add_site(name, tier)
                    .map_err(|source| FormatError::Configuration { line, source })?;
            }
            "connection" => {
                phase = Phase::Connections;
                let (first, second) = two_args(line, args)?;
                net.connect(first, second)
                    .map_err(|source| FormatError::Connection { line, source })?;
            }
            other => {
                return Err(syntax(line, format!("unknown fact `{other}`")));
            }
        }
    }

    Ok(net)
}

/// Renders a network to its textual form.
pub fn render_network(net: &Network) -> String {
    let mut out = String::new();
    for (_, resource) in net.resources() {
        let _ = writeln!(out, "resource({},{}).", resource.name(), resource.capacity());
    }
    for (_, site) in net.sites() {
        let _ = writeln!(out, "site({},{}).", site.name(), site.tier().name());
    }
    for (resource_id, resource) in net.resources() {
        for site_id in net.members(resource_id) {
            let _ = writeln!(
                out,
                "connection({},{}).",
                resource.name(),
                net.site(site_id).name()
            );
        }
    }
    out
}

/// Loads a network from a file.
pub fn load_network<P: AsRef<Path>>(path: P) -> Result<Network, FormatError> {
    parse_network(&fs::read_to_string(path)?)
}

/// Saves a network to a file.
pub fn save_network<P: AsRef<Path>>(net: &Network, path: P) -> Result<(), FormatError> {
    fs::write(path, render_network(net))?;
    Ok(())
}

fn syntax(line: usize, message: String) -> FormatError {
    FormatError::Syntax { line, message }
}

/// Splits `keyword(a,b)` into the keyword and its argument list.
fn split_fact(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close != text.len() - 1 || open == 0 {
        return None;
    }
    Some((&text[..open], &text[open + 1..close]))
}

fn two_args(line: usize, args: &str) -> Result<(&str, &str), FormatError> {
    let mut parts = args.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Ok((a.trim(), b.trim())),
        _ => Err(syntax(line, format!("expected two arguments, got `{args}`"))),
    }
}
