use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rustwidgets_explorer::{ChildKind, ExplorerTree, NodeId, TreeDiff};
use rustwidgets_otp::{OtpEntry, DEFAULT_LENGTH};

#[derive(Parser)]
#[command(
    name = "rustwidgets-cli",
    about = "Utility commands for the RustWidgets widget models",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 以腳本化操作編輯檔案總管樹並列出結果。 / Apply scripted edits to an explorer tree and print the result.
    Explorer(ExplorerArgs),
    /// 一次性密碼輸入工具。 / One-time-password entry helpers.
    #[command(subcommand)]
    Otp(OtpCommand),
}

#[derive(Args)]
struct ExplorerArgs {
    /// 起始樹的 JSON 檔；省略時使用內建示範樹。 / JSON file holding the starting tree; the built-in sample is used when omitted.
    #[arg(long, value_name = "PATH")]
    tree: Option<PathBuf>,

    /// 依序套用的操作："toggle ID"、"add ID file|folder"、"begin ID"、"rename ID NAME"、"delete ID"。 / Operations applied in order: "toggle ID", "add ID file|folder", "begin ID", "rename ID NAME", "delete ID".
    #[arg(long = "op", value_name = "OP")]
    ops: Vec<String>,

    /// 輸出 JSON 模型而非縮排列表。 / Print the raw JSON model instead of the indented listing.
    #[arg(long)]
    json: bool,

    /// 在列表中顯示節點識別碼。 / Show node identifiers in the listing.
    #[arg(long)]
    ids: bool,
}

#[derive(Subcommand)]
enum OtpCommand {
    /// 驗證一組完整的驗證碼。 / Verify a complete code.
    Verify(OtpVerifyArgs),
}

#[derive(Args)]
struct OtpVerifyArgs {
    /// 要驗證的驗證碼。 / The code to verify.
    code: String,

    /// 驗證碼長度。 / Expected code length.
    #[arg(long, default_value_t = DEFAULT_LENGTH)]
    length: usize,
}

enum EditOp {
    Toggle(NodeId),
    Add(NodeId, ChildKind),
    Begin(NodeId),
    Rename(NodeId, String),
    Delete(NodeId),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Explorer(args) => run_explorer(args),
        Commands::Otp(command) => run_otp(command),
    }
}

fn run_explorer(args: ExplorerArgs) -> Result<()> {
    let mut tree = match &args.tree {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading tree file {}", path.display()))?;
            let tree: ExplorerTree = serde_json::from_str(&contents)
                .with_context(|| format!("parsing tree file {}", path.display()))?;
            tree.claim_ids();
            tree
        }
        None => ExplorerTree::sample(),
    };

    for raw in &args.ops {
        let op = parse_op(raw)?;
        let (next, diff) = apply_op(&tree, op);
        if diff.is_empty() {
            eprintln!("note: '{raw}' did not match any node");
        }
        tree = next;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_listing(&tree, args.ids);
    }
    Ok(())
}

fn apply_op(tree: &ExplorerTree, op: EditOp) -> (ExplorerTree, TreeDiff) {
    match op {
        EditOp::Toggle(id) => tree.toggle_open(id),
        EditOp::Add(id, kind) => tree.add_child(id, kind),
        EditOp::Begin(id) => tree.rename_begin(id),
        EditOp::Rename(id, name) => tree.rename_commit(id, &name),
        EditOp::Delete(id) => tree.delete(id),
    }
}

fn parse_op(raw: &str) -> Result<EditOp> {
    let trimmed = raw.trim();
    let (verb, rest) = trimmed
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("operation '{trimmed}' is missing a node id"))?;
    let rest = rest.trim();
    match verb {
        "toggle" => Ok(EditOp::Toggle(parse_id(rest)?)),
        "begin" => Ok(EditOp::Begin(parse_id(rest)?)),
        "delete" => Ok(EditOp::Delete(parse_id(rest)?)),
        "add" => {
            let (id, kind) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("add needs '<id> file|folder'"))?;
            let kind = match kind.trim() {
                "file" => ChildKind::File,
                "folder" => ChildKind::Folder,
                other => bail!("unknown child kind '{other}'"),
            };
            Ok(EditOp::Add(parse_id(id)?, kind))
        }
        "rename" => {
            let (id, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("rename needs '<id> <name>'"))?;
            Ok(EditOp::Rename(parse_id(id)?, name.to_string()))
        }
        other => bail!("unknown operation '{other}'"),
    }
}

fn parse_id(text: &str) -> Result<NodeId> {
    let value: u64 = text
        .trim()
        .parse()
        .with_context(|| format!("'{text}' is not a node id"))?;
    Ok(NodeId::from_raw(value))
}

fn print_listing(tree: &ExplorerTree, show_ids: bool) {
    for (node, depth) in tree.traverse() {
        let indent = "    ".repeat(depth);
        let marker = if node.is_folder() {
            if node.is_open() {
                "v "
            } else {
                "> "
            }
        } else {
            ""
        };
        let mut line = format!("{indent}{marker}{}", node.name);
        if node.editing {
            line.push_str(" (editing)");
        }
        if show_ids {
            line.push_str(&format!("  [#{}]", node.id));
        }
        println!("{line}");
    }
}

fn run_otp(command: OtpCommand) -> Result<()> {
    match command {
        OtpCommand::Verify(args) => {
            let mut entry = OtpEntry::with_length(args.length)
                .ok_or_else(|| anyhow!("--length must be at least 1"))?;
            let code = args.code.trim();
            if code.is_empty() {
                bail!("code is empty");
            }
            let supplied = code.chars().count();
            if supplied > args.length {
                bail!("code has {supplied} characters but only {} fit", args.length);
            }
            if !entry.paste(code) {
                bail!("code must contain digits only");
            }
            let accepted = entry.submit()?;
            println!("OTP accepted: {accepted}");
            Ok(())
        }
    }
}
