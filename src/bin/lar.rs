use anyhow::Result;
use clap::{Parser, Subcommand};
use lariat::document::ProtoTag;
use lariat::storage;
use lariat::Node;
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(name = "lar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Show { file: String },
    Stats { file: String },
    Check { file: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { file } => {
            let doc = storage::load(&file)?;
            println!("Document with {} nodes:", doc.len());
            for (i, node) in doc.nodes.iter().enumerate() {
                println!("  #{} {}", i, describe(node));
            }
        }
        Commands::Stats { file } => {
            let doc = storage::load(&file)?;
            let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
            for node in &doc.nodes {
                *counts.entry(node.kind()).or_insert(0) += 1;
            }
            println!("{} nodes in {}", doc.len(), file);
            for (kind, n) in counts {
                println!("  {}: {}", kind, n);
            }
        }
        Commands::Check { file } => {
            let doc = storage::load(&file)?;
            println!("Document OK ({} nodes)", doc.len());
        }
    }

    Ok(())
}

fn describe(node: &Node) -> String {
    match node {
        Node::Undefined => "undefined".to_string(),
        Node::Null => "null".to_string(),
        Node::Bool { value } => format!("bool {}", value),
        Node::Number { value } => format!("number {}", value),
        Node::String { value } => format!("string {:?}", value),
        Node::Date { epoch_ms } => format!("date {}ms", epoch_ms),
        Node::BigNumber { digits } => format!("bignumber {}", digits),
        Node::Symbol { index } => format!("symbol @{}", index),
        Node::Function { index } => format!("function @{}", index),
        Node::Array { items } => format!("array ({} items)", items.len()),
        Node::Map { entries } => format!("map ({} entries)", entries.len()),
        Node::Set { items } => format!("set ({} items)", items.len()),
        Node::Error { message, .. } => format!("error {:?}", message),
        Node::Object { proto, props } => match proto {
            ProtoTag::Plain => format!("object plain ({} props)", props.len()),
            ProtoTag::Class { index } => format!("object class @{} ({} props)", index, props.len()),
        },
        Node::Ref { ordinal } => format!("ref -> #{}", ordinal),
    }
}
