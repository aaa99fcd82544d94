use r3flow::{Scenario, ScenarioConfig, Flowline, Direction, TraceState, BatchSummary};
use r3flow::{bench_interpolation, bench_schemes};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario YAML; relative names are also looked up in `scenarios/`
    #[arg(short, long, default_value = "uniform.yaml")]
    file: PathBuf,

    /// Run the timing helpers instead of tracing
    #[arg(long)]
    bench: bool,
}

/// One traced line as written to stdout
#[derive(Serialize)]
struct FlowlineRecord {
    category: i32,
    direction: Direction,
    state: TraceState,
    length: f64,
    points: Vec<[f64; 3]>,
    speeds: Vec<f64>, // one per segment
}

impl From<Flowline> for FlowlineRecord {
    fn from(line: Flowline) -> Self {
        Self {
            category: line.category,
            direction: line.direction,
            state: line.state,
            length: line.length,
            points: line.points().iter().map(|p| [p.x, p.y, p.z]).collect(),
            speeds: line.speeds().to_vec(),
        }
    }
}

#[derive(Serialize)]
struct Output {
    summary: BatchSummary,
    flowlines: Vec<FlowlineRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accumulation: Option<Vec<u32>>,
}

// load here to keep main clean
fn load_scenario_from_yaml(file: &PathBuf) -> Result<ScenarioConfig> {
    let config_path = if file.exists() {
        file.clone()
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
    };

    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("reading scenario {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_yaml(&text)
        .with_context(|| format!("parsing scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    // logs go to stderr so stdout only carries results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.bench {
        bench_interpolation()?;
        bench_schemes()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file)?;
    let scenario = Scenario::build(scenario_cfg)?;

    let mut lines: Vec<Flowline> = Vec::new();
    let (summary, accumulation) = scenario.run(&mut lines)?;

    let output = Output {
        summary,
        flowlines: lines.into_iter().map(FlowlineRecord::from).collect(),
        accumulation: accumulation.map(|acc| acc.counts().to_vec()),
    };
    serde_yaml::to_writer(io::stdout().lock(), &output)?;

    Ok(())
}
