//! `daec` commands.
//!
//! Each command takes parsed arguments and returns its output or an error;
//! printing and exit codes belong to `main.rs`.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use dae_model::{
    CacheError, CachedModel, CompilerOptions, Equation, LowerError, Model, ModelFunctions,
    ModelView, OptionsError, Partition,
};
use dae_oracle::{OracleError, DEFAULT_SEED, DEFAULT_TOLERANCE};
use dae_simplify::{Report, SimplifyError};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::document::{LoadError, ModelDocument};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error(transparent)]
    Simplify(#[from] SimplifyError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Arguments of `daec simplify`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimplifyArgs {
    pub model: PathBuf,
    /// `--name` / `--no-name` flags in command-line order.
    pub flags: Vec<(String, bool)>,
    pub all: bool,
    pub max_iterations: Option<usize>,
    pub output: Option<PathBuf>,
}

impl SimplifyArgs {
    /// Parse the arguments following `simplify`.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut parsed = Self::default();
        let mut model = None;
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            if arg == "-o" {
                let Some(path) = args.get(i + 1) else {
                    return Err(CliError::Usage("-o needs a path".to_owned()));
                };
                parsed.output = Some(PathBuf::from(path));
                i += 2;
                continue;
            }
            if arg == "--all" {
                parsed.all = true;
            } else if let Some(n) = arg.strip_prefix("--max-iterations=") {
                let n = n
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid iteration bound `{n}`")))?;
                parsed.max_iterations = Some(n);
            } else if let Some(name) = arg.strip_prefix("--no-") {
                parsed.flags.push((name.replace('-', "_"), false));
            } else if let Some(name) = arg.strip_prefix("--") {
                parsed.flags.push((name.replace('-', "_"), true));
            } else if model.is_none() {
                model = Some(PathBuf::from(arg));
            } else {
                return Err(CliError::Usage(format!("unexpected argument `{arg}`")));
            }
            i += 1;
        }
        let Some(model) = model else {
            return Err(CliError::Usage("missing model path".to_owned()));
        };
        parsed.model = model;
        Ok(parsed)
    }

    /// Document options, overridden by the command line.
    fn options(&self, document: &ModelDocument) -> Result<CompilerOptions, CliError> {
        let mut options = if self.all {
            CompilerOptions::all()
        } else {
            document.compiler_options()?
        };
        for (name, enabled) in &self.flags {
            options.set(name, *enabled)?;
        }
        if self.max_iterations.is_some() {
            options.max_reduction_iterations = self.max_iterations;
        }
        Ok(options)
    }
}

/// Arguments of `daec compare`.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub seed: u64,
    pub tolerance: f64,
}

impl CompareArgs {
    /// Parse the arguments following `compare`.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut paths = Vec::new();
        let mut seed = DEFAULT_SEED;
        let mut tolerance = DEFAULT_TOLERANCE;
        for arg in args {
            if let Some(value) = arg.strip_prefix("--seed=") {
                seed = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid seed `{value}`")))?;
            } else if let Some(value) = arg.strip_prefix("--tolerance=") {
                tolerance = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid tolerance `{value}`")))?;
            } else if arg.starts_with('-') {
                return Err(CliError::Usage(format!("unknown option `{arg}`")));
            } else {
                paths.push(PathBuf::from(arg));
            }
        }
        let [left, right]: [PathBuf; 2] = paths
            .try_into()
            .map_err(|_| CliError::Usage("compare takes exactly two models".to_owned()))?;
        Ok(Self {
            left,
            right,
            seed,
            tolerance,
        })
    }
}

/// A model read from disk: a JSON document or a cache file.
#[derive(Debug)]
pub enum LoadedModel {
    Live(Model),
    Cached(CachedModel),
}

impl LoadedModel {
    /// `.json` files are documents; anything else is a cache file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if path.extension().is_some_and(|ext| ext == "json") {
            let document = ModelDocument::read(path)?;
            Ok(Self::Live(document.to_model()?))
        } else {
            Ok(Self::Cached(CachedModel::load(path)?))
        }
    }
}

impl ModelView for LoadedModel {
    fn cardinality(&self, partition: Partition) -> usize {
        match self {
            Self::Live(model) => model.cardinality(partition),
            Self::Cached(cached) => cached.cardinality(partition),
        }
    }

    fn residual_counts(&self) -> Option<(usize, usize)> {
        match self {
            Self::Live(model) => model.residual_counts(),
            Self::Cached(cached) => cached.residual_counts(),
        }
    }

    fn functions(&self) -> Result<Cow<'_, ModelFunctions>, LowerError> {
        match self {
            Self::Live(model) => ModelView::functions(model),
            Self::Cached(cached) => ModelView::functions(cached),
        }
    }
}

/// Run the pipeline over a document and optionally write the cached form.
///
/// Returns the reduced model with the run's report.
pub fn simplify(args: &SimplifyArgs) -> Result<(Model, Report), CliError> {
    let document = ModelDocument::read(&args.model)?;
    let options = args.options(&document)?;
    let mut model = document.to_model()?;
    let report = dae_simplify::simplify(&mut model, &options)?;

    if let Some(output) = &args.output {
        CachedModel::from_model(&model)?.save(output)?;
    }
    Ok((model, report))
}

/// Compare two models with the numeric oracle.
pub fn compare(args: &CompareArgs) -> Result<(), CliError> {
    let left = LoadedModel::load(&args.left)?;
    let right = LoadedModel::load(&args.right)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    dae_oracle::assert_model_equivalent_numeric(&left, &right, args.tolerance, &mut rng)?;
    Ok(())
}

/// Human-readable summary of a reduced model.
pub fn summarize(model: &Model, report: &Report) -> String {
    let mut out = String::new();
    for partition in Partition::ORDERED {
        let slots = model.slots(partition);
        if slots.is_empty() {
            continue;
        }
        let names: Vec<String> = slots.iter().map(|&s| model.slot_name(s)).collect();
        let _ = writeln!(out, "{partition}: {}", names.join(", "));
    }

    for (_, variable) in model.variables() {
        for alias in &variable.aliases {
            let _ = writeln!(out, "alias: {} = {}{}", alias.name, alias.sign, variable.name);
        }
    }

    let _ = writeln!(
        out,
        "equations: {} residual rows ({} affine), {} initial",
        model.residual_len(),
        report.affine_rows,
        model.initial_equations.len(),
    );
    for equation in &model.equations {
        match equation {
            Equation::Scalar(expr) => {
                let _ = writeln!(out, "  0 = {}", model.render(*expr));
            }
            Equation::Affine(system) => {
                let unknowns: Vec<String> =
                    system.unknowns.iter().map(|&s| model.slot_name(s)).collect();
                let _ = writeln!(out, "  A·x + b = 0, x = ({})", unknowns.join(", "));
                for r in 0..system.rows() {
                    let row: Vec<String> =
                        system.row(r).iter().map(|&c| model.render(c)).collect();
                    let _ = writeln!(
                        out,
                        "    [{}] b = {}",
                        row.join(", "),
                        model.render(system.constant(r)),
                    );
                }
            }
        }
    }
    let _ = writeln!(
        out,
        "passes: {} expanded, {} folded, {} eliminated in {} iterations",
        report.expanded, report.folded, report.eliminated, report.iterations,
    );
    out
}
