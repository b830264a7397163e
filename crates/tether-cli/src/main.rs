use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use tether::{
    Diagram, DragSet, EngineConfig, LayoutMode, Preset, StepInput, Vec2, compute_layout,
    initialize_physics_state, step_physics, sync_physics_targets,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Engine(tether::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Engine(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<tether::Error> for CliError {
    fn from(value: tether::Error) -> Self {
        Self::Engine(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Simulate,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    mode: Option<LayoutMode>,
    preset: Option<Preset>,
    ticks: usize,
    delta_ms: f64,
    pretty: bool,
    strict: bool,
}

#[derive(Serialize)]
struct SimulateOut {
    ticks: usize,
    settled: bool,
    positions: BTreeMap<String, Vec2>,
}

fn usage() -> &'static str {
    "tether-cli\n\
\n\
USAGE:\n\
  tether-cli [layout] [--mode <mode>] [--config <path>] [--strict] [--pretty] [<path>|-]\n\
  tether-cli simulate [--mode <mode>] [--config <path>] [--preset static|tactile|storm] [--ticks <n>] [--delta-ms <ms>] [--strict] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the diagram JSON is read from stdin.\n\
  - <mode> is one of flowGrid, byCausality, byTags, byTypes, byTime; anything else means flowGrid.\n\
  - simulate starts every node on its committed position and stops early once settled.\n\
  - --preset is the base for the config file's physics section; fields set there still apply.\n\
  - --strict rejects diagrams whose edges point at unknown nodes.\n\
  - Set RUST_LOG=tether=debug for engine diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        ticks: 120,
        delta_ms: 16.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "simulate" => args.command = Command::Simulate,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--mode" => {
                let Some(mode) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.mode = Some(match mode.parse::<LayoutMode>() {
                    Ok(mode) => mode,
                    Err(never) => match never {},
                });
            }
            "--preset" => {
                let Some(preset) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.preset = Some(preset.parse::<Preset>()?);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--ticks" => {
                let Some(ticks) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.ticks = ticks.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--delta-ms" => {
                let Some(ms) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.delta_ms = ms.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.delta_ms.is_finite() && args.delta_ms >= 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(args: &Args) -> Result<EngineConfig, CliError> {
    let text = match args.config.as_deref() {
        Some(path) => std::fs::read_to_string(path)?,
        None => "{}".to_string(),
    };
    let mut config = EngineConfig::from_json_with_preset(&text, args.preset)?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let diagram: Diagram = serde_json::from_str(&read_input(args.input.as_deref())?)?;

    if args.strict {
        diagram.validate()?;
    }
    for e in diagram.dangling_edges() {
        tracing::warn!(edge = %e.id, source = %e.source, target = %e.target, "edge endpoint not in diagram");
    }

    let layout = compute_layout(config.mode, &diagram.nodes, &diagram.edges, &config.layout);

    match args.command {
        Command::Layout => write_json(&layout, args.pretty),
        Command::Simulate => {
            let grid = config.physics.grid_snap;
            let mut state = initialize_physics_state(&diagram.nodes, grid);
            sync_physics_targets(&mut state, &layout.positions, grid);

            let dragging = DragSet::default();
            let mut ticks = 0usize;
            let mut moving = !diagram.nodes.is_empty();
            while moving && ticks < args.ticks {
                moving = step_physics(StepInput {
                    state: &mut state,
                    nodes: &diagram.nodes,
                    constraints: &config.physics,
                    delta_ms: args.delta_ms,
                    dragging_ids: &dragging,
                    frames: &diagram.frames,
                });
                ticks += 1;
            }
            tracing::info!(ticks, settled = !moving, nodes = state.len(), "simulation finished");

            let out = SimulateOut {
                ticks,
                settled: !moving,
                positions: state.positions(),
            };
            write_json(&out, args.pretty)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
