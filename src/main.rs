use anyhow::{bail, Context, Result};
use category_tree::{
    build_tree, compute_totals, filter_tree, DropPosition, FilterQuery, NodeKind, NodeRef,
    RecordId, SourceSnapshot, TreeConfig, TreeMutator, TreeNode, Warnings,
};
use serde::Serialize;
use std::env;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  category-tree tree <snapshot.json> [--search TERM] [--visible ID,ID,..]
  category-tree totals <snapshot.json>
  category-tree find <snapshot.json> <id> [category|vendor|transaction]
  category-tree validate-move <snapshot.json> <dragged-id> <target-id> <before|after|inside|root>";

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let config = TreeConfig::from_env()?;
    let snapshot = SourceSnapshot::from_file(&args[2])?;

    match args[1].as_str() {
        "tree" => run_tree(&snapshot, &config, &args[3..]),
        "totals" => print_json(&compute_totals(&snapshot)),
        "find" => run_find(&snapshot, &config, &args[3..]),
        "validate-move" => run_validate_move(&snapshot, &config, &args[3..]),
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    }
}

fn run_tree(snapshot: &SourceSnapshot, config: &TreeConfig, rest: &[String]) -> Result<()> {
    let mut query = FilterQuery::default();
    let mut flags = rest.iter();
    while let Some(flag) = flags.next() {
        let value = flags
            .next()
            .with_context(|| format!("{} needs a value", flag))?;
        match flag.as_str() {
            "--search" => query.search_term = Some(value.clone()),
            "--visible" => query.visible_ids = FilterQuery::visible_from_csv(value).visible_ids,
            other => bail!("unknown flag {:?}", other),
        }
    }

    let build = build_tree(snapshot, config);
    let roots = filter_tree(&build.roots, &query);

    #[derive(Serialize)]
    struct TreeOutput<'a> {
        roots: Vec<TreeNode>,
        warnings: &'a Warnings,
    }

    print_json(&TreeOutput {
        roots,
        warnings: &build.warnings,
    })
}

fn run_find(snapshot: &SourceSnapshot, config: &TreeConfig, rest: &[String]) -> Result<()> {
    let id = rest.first().context("find needs an id")?;
    let kind = match rest.get(1) {
        Some(kind) => Some(kind.parse::<NodeKind>().map_err(anyhow::Error::msg)?),
        None => None,
    };

    let build = build_tree(snapshot, config);
    let nav = build.navigator();
    let id = RecordId::from(id.as_str());

    let node = nav
        .find_node(&id, kind)
        .with_context(|| format!("no node with id {}", id))?;
    let path = nav.path_to(&node.id, node.kind()).unwrap_or_default();

    print_json(&serde_json::json!({ "node": node, "path": path }))
}

fn run_validate_move(snapshot: &SourceSnapshot, config: &TreeConfig, rest: &[String]) -> Result<()> {
    let [dragged, target, position] = rest else {
        bail!("validate-move needs <dragged-id> <target-id> <position>");
    };
    let position: DropPosition = position.parse().map_err(anyhow::Error::msg)?;

    let build = build_tree(snapshot, config);
    let verdict = TreeMutator::new(&build.roots).validate_move(
        &NodeRef::category(dragged.as_str()),
        &NodeRef::category(target.as_str()),
        position,
    );

    match verdict {
        Ok(verdict) => print_json(&serde_json::json!({ "ok": true, "verdict": verdict })),
        Err(e) => {
            let message = e.to_string();
            print_json(&serde_json::json!({ "ok": false, "error": e, "message": message }))?;
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
