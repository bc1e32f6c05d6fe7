//! DAE canonicalization CLI.

use daec::commands::{compare, simplify, summarize};
use daec::{CliError, CompareArgs, SimplifyArgs};

fn main() {
    daec::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "simplify" => run_simplify(&args[2..]),
        "compare" => run_compare(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(CliError::Usage(format!("unknown command `{other}`"))),
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        if matches!(error, CliError::Usage(_)) {
            eprintln!();
            print_usage();
        }
        std::process::exit(1);
    }
}

fn run_simplify(args: &[String]) -> Result<(), CliError> {
    let args = SimplifyArgs::parse(args)?;
    let (model, report) = simplify(&args)?;
    print!("{}", summarize(&model, &report));
    if let Some(output) = &args.output {
        println!("wrote {}", output.display());
    }
    Ok(())
}

fn run_compare(args: &[String]) -> Result<(), CliError> {
    let args = CompareArgs::parse(args)?;
    compare(&args)?;
    println!(
        "{} and {} are equivalent",
        args.left.display(),
        args.right.display()
    );
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: daec <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  simplify <model.json> [options]   Reduce a model and print a summary");
    eprintln!("  compare <a> <b> [options]         Check two models for numeric equivalence");
    eprintln!();
    eprintln!("Simplify options:");
    eprintln!("  --all                       Enable every pass");
    eprintln!("  --<option>, --no-<option>   Enable or disable one compiler option");
    eprintln!("                              (expand_vectors, detect_aliases,");
    eprintln!("                              reduce_affine_expression, replace_constant_values,");
    eprintln!("                              replace_constant_expressions,");
    eprintln!("                              replace_parameter_values,");
    eprintln!("                              replace_parameter_expressions)");
    eprintln!("  --max-iterations=<n>        Bound on alias/affine iterations");
    eprintln!("  -o <path>                   Write the cached model");
    eprintln!();
    eprintln!("Compare options:");
    eprintln!("  --seed=<n>                  Random input seed (default: 0)");
    eprintln!("  --tolerance=<x>             Comparison tolerance (default: 1e-9)");
    eprintln!();
    eprintln!("Models ending in .json are documents; anything else is a cache file.");
    eprintln!("Set RUST_LOG to enable logging, DAEC_LOG_TREE=1 for a span tree.");
}
