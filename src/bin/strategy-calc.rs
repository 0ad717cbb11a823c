use std::fs;
use std::path::{Path, PathBuf};

use blackjack_analysis::{Analysis, CardDistribution, RemovalEffects};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "strategy-calc",
    about = "Compute exact blackjack basic strategy, EV and variance for a card distribution"
)]
struct Args {
    /// Remove one card of this rank (1-10) from the deck before analyzing
    #[arg(long)]
    remove: Option<u8>,

    /// Also compute per-rank effect-of-removal values and counting tags
    #[arg(long)]
    effects: bool,

    /// Directory to write the strategy tables and full results JSON into
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Pretty-print the exported JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let cards = match args.remove {
        Some(rank) => CardDistribution::single_deck_less_one(rank).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        }),
        None => CardDistribution::single_deck(),
    };

    eprintln!("Computing analysis...");
    let analysis = Analysis::compute(cards);

    println!("EV per unit bet:  {:+.6}", analysis.ev());
    println!("Variance:         {:.6}", analysis.variance());
    println!("Std deviation:    {:.6}", analysis.variance().sqrt());
    println!("House edge:       {:+.4}%", -analysis.ev() * 100.0);

    if let Some(dir) = &args.out_dir {
        export(&analysis, dir, args.pretty);
    }

    if args.effects {
        eprintln!("Computing effect of removals (10 more analyses)...");
        let removal = RemovalEffects::compute();
        let tags = removal.count_tags();
        println!();
        println!("rank  effect       tag");
        for (i, effect) in removal.effects.iter().enumerate() {
            println!("{:>4}  {:+.6}    {:+}", i + 1, effect, tags[i]);
        }
        if let Some(dir) = &args.out_dir {
            write_json(
                &dir.join("effect_of_removals.json"),
                &serde_json::json!({
                    "baseline_ev": removal.baseline_ev,
                    "effects": removal.effects,
                    "count_tags": tags,
                }),
                args.pretty,
            );
        }
    }
}

fn export(analysis: &Analysis, dir: &Path, pretty: bool) {
    fs::create_dir_all(dir).unwrap_or_else(|e| {
        eprintln!("Cannot create {}: {e}", dir.display());
        std::process::exit(1);
    });
    let strategy = analysis.strategy().keyed_json();
    write_json(&dir.join("hit_matrix.json"), &strategy["hit_matrix"], pretty);
    write_json(&dir.join("dd_matrix.json"), &strategy["dd_matrix"], pretty);
    write_json(
        &dir.join("split_matrix.json"),
        &strategy["split_matrix"],
        pretty,
    );
    write_json(
        &dir.join("ev.json"),
        &serde_json::json!({ "ev": analysis.ev() }),
        pretty,
    );
    write_json(&dir.join("results.json"), &analysis.results_json(), pretty);
    eprintln!("Wrote tables to {}", dir.display());
}

fn write_json(path: &Path, value: &serde_json::Value, pretty: bool) {
    let body = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_else(|e| {
        eprintln!("Serialization failed: {e}");
        std::process::exit(1);
    });
    fs::write(path, body).unwrap_or_else(|e| {
        eprintln!("Cannot write {}: {e}", path.display());
        std::process::exit(1);
    });
}
