//! Penman-notation reader: the `parse(text) -> Graph` collaborator.
//!
//! Supports the subset the engine consumes: `(var / concept :role target
//! ...)` with nested subgraphs, re-entrant bare variable references, quoted
//! and bare attribute constants, multiple graphs per file separated by blank
//! lines, and `#` comment lines.
//!
//! Parsing is two-phase: a `nom` pass builds a raw tree, then a resolution
//! pass turns bare tokens into either re-entrant edges (token matches a
//! declared variable) or fresh constant nodes, and materializes the arena
//! [`Graph`].

use std::collections::HashMap;
use std::path::PathBuf;

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::map,
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

use crate::error::{InputError, Result};

use super::model::{Edge, Graph, Node, NodeId};

#[derive(Debug)]
enum RawTarget {
    /// Nested `(var / concept ...)` subgraph.
    Nested(RawNode),
    /// Bare token: a re-entrant variable reference or an attribute constant.
    Bare(String),
    /// Quoted string: always an attribute constant.
    Quoted(String),
}

#[derive(Debug)]
struct RawNode {
    var: String,
    concept: String,
    relations: Vec<(String, RawTarget)>,
}

fn sp(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace())(input)
}

/// Variables, concepts, and bare constants share one token charset.
fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '\''))(input)
}

fn role(input: &str) -> IResult<&str, &str> {
    preceded(
        char(':'),
        take_while1(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_')),
    )(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)
}

fn target(input: &str) -> IResult<&str, RawTarget> {
    alt((
        map(raw_node, RawTarget::Nested),
        map(quoted, |s| RawTarget::Quoted(s.to_string())),
        map(token, |s| RawTarget::Bare(s.to_string())),
    ))(input)
}

fn relation(input: &str) -> IResult<&str, (String, RawTarget)> {
    let (input, _) = sp(input)?;
    let (input, r) = role(input)?;
    let (input, _) = sp(input)?;
    let (input, t) = target(input)?;
    Ok((input, (r.to_string(), t)))
}

fn raw_node(input: &str) -> IResult<&str, RawNode> {
    let (input, _) = char('(')(input)?;
    let (input, _) = sp(input)?;
    let (input, var) = token(input)?;
    let (input, _) = delimited(sp, char('/'), sp)(input)?;
    let (input, concept) = alt((quoted, token))(input)?;
    let (input, relations) = many0(relation)(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char(')')(input)?;
    Ok((
        input,
        RawNode {
            var: var.to_string(),
            concept: concept.to_string(),
            relations,
        },
    ))
}

fn collect_declarations(
    raw: &RawNode,
    vars: &mut HashMap<String, NodeId>,
    nodes: &mut Vec<Node>,
) -> std::result::Result<(), String> {
    if vars
        .insert(raw.var.clone(), NodeId(nodes.len() as u32))
        .is_some()
    {
        return Err(format!("variable `{}` declared twice", raw.var));
    }
    nodes.push(Node {
        var: raw.var.clone(),
        concept: raw.concept.clone(),
        synthetic: false,
    });
    for (_, t) in &raw.relations {
        if let RawTarget::Nested(child) = t {
            collect_declarations(child, vars, nodes)?;
        }
    }
    Ok(())
}

fn collect_edges(
    raw: &RawNode,
    vars: &HashMap<String, NodeId>,
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
    constants: &mut usize,
) {
    let source = vars[&raw.var];
    for (label, t) in &raw.relations {
        // `vars` is fully populated by collect_declarations, so a nested
        // child resolves before its subtree is visited. The parent's edge is
        // pushed first, keeping edges in textual order.
        let target = match t {
            RawTarget::Nested(child) => vars[&child.var],
            RawTarget::Bare(tok) if vars.contains_key(tok) => vars[tok],
            RawTarget::Bare(tok) | RawTarget::Quoted(tok) => {
                // Attribute constant: a fresh leaf node per occurrence, with
                // a generated variable that cannot shadow a declared one.
                let mut var = format!("attr-{}", *constants);
                while vars.contains_key(&var) {
                    *constants += 1;
                    var = format!("attr-{}", *constants);
                }
                *constants += 1;
                let id = NodeId(nodes.len() as u32);
                nodes.push(Node {
                    var,
                    concept: tok.clone(),
                    synthetic: false,
                });
                id
            }
        };
        edges.push(Edge {
            source,
            target,
            label: label.clone(),
        });
        if let RawTarget::Nested(child) = t {
            collect_edges(child, vars, nodes, edges, constants);
        }
    }
}

/// Parse a single penman graph.
pub fn parse_graph(text: &str) -> std::result::Result<Graph, InputError> {
    let fail = |reason: String| InputError::Parse {
        origin: "<string>".to_string(),
        index: 0,
        reason,
    };

    let trimmed = text.trim();
    let (rest, raw) = raw_node(trimmed)
        .map_err(|e| fail(format!("not a well-formed penman graph: {e}")))?;
    if !rest.trim().is_empty() {
        return Err(fail(format!("trailing input after graph: `{}`", rest.trim())));
    }

    let mut vars = HashMap::new();
    let mut nodes = Vec::new();
    collect_declarations(&raw, &mut vars, &mut nodes).map_err(fail)?;

    let mut edges = Vec::new();
    let mut constants = 0usize;
    collect_edges(&raw, &vars, &mut nodes, &mut edges, &mut constants);

    Ok(Graph::new(nodes, edges))
}

/// Parse a bank: one or more graphs separated by blank lines, `#` comment
/// lines ignored.
///
/// Returns one entry per graph block so that a malformed graph poisons only
/// the pair it belongs to, not the whole batch. An entirely empty file is a
/// bank-level error.
pub fn parse_bank(
    text: &str,
    origin: &str,
) -> Result<Vec<std::result::Result<Graph, InputError>>> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }

    if blocks.is_empty() {
        return Err(InputError::EmptyFile {
            path: PathBuf::from(origin),
        }
        .into());
    }

    Ok(blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            parse_graph(block).map_err(|e| match e {
                InputError::Parse { reason, .. } => InputError::Parse {
                    origin: origin.to_string(),
                    index,
                    reason,
                },
                other => other,
            })
        })
        .collect())
}
