//! Process Overlay CLI
//!
//! Usage:
//!   process-overlay [OPTIONS] [SCENARIO]
//!
//! Options:
//!   -s, --stylesheet <FILE>  Stylesheet file for color palette (TOML format)
//!       --heatmap <MODE>     Heatmap layer: off, statistics, target-value
//!       --class-prefix <P>   CSS class prefix, empty for none (default: po-)
//!       --no-labels          Do not draw element names
//!   -m, --modifications      Print the pending modification plan as JSON
//!   -d, --debug              Dump attached overlays to stderr
//!   -h, --help               Print help

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use process_overlay::{
    modifications_json, render_scenario, replay, HeatmapMode, Scenario, SessionConfig, Stylesheet,
    SvgConfig,
};

#[derive(Parser)]
#[command(name = "process-overlay")]
#[command(about = "Overlay process instance state and planned modifications on a BPMN diagram")]
struct Cli {
    /// Scenario file (reads from stdin if not provided)
    scenario: Option<PathBuf>,

    /// Stylesheet file for color palette (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Heatmap layer, overriding the scenario's setting
    #[arg(long, value_enum)]
    heatmap: Option<HeatmapArg>,

    /// CSS class prefix; pass an empty string to disable prefixing
    #[arg(long, value_name = "PREFIX")]
    class_prefix: Option<String>,

    /// Do not draw element names inside their shapes
    #[arg(long)]
    no_labels: bool,

    /// Print the pending modification plan as JSON instead of SVG
    #[arg(short, long)]
    modifications: bool,

    /// Debug mode: dump attached overlays to stderr
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeatmapArg {
    Off,
    Statistics,
    TargetValue,
}

impl From<HeatmapArg> for HeatmapMode {
    fn from(arg: HeatmapArg) -> Self {
        match arg {
            HeatmapArg::Off => HeatmapMode::Off,
            HeatmapArg::Statistics => HeatmapMode::Statistics,
            HeatmapArg::TargetValue => HeatmapMode::TargetValue,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Load stylesheet
    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };

    // Load scenario
    let scenario = match &cli.scenario {
        Some(path) => match Scenario::from_file(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("Error loading scenario '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            match Scenario::from_str(&buffer) {
                Ok(scenario) => scenario,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut svg = SvgConfig::new().with_labels(!cli.no_labels);
    if let Some(prefix) = cli.class_prefix {
        svg = svg.with_class_prefix(prefix);
    }

    let mut config = SessionConfig::new()
        .with_svg(svg)
        .with_stylesheet(stylesheet)
        .with_debug(cli.debug);
    if let Some(mode) = cli.heatmap {
        config = config.with_heatmap(mode.into());
    }

    let output = if cli.modifications {
        replay(&scenario, &config).and_then(|replay| modifications_json(&replay))
    } else {
        render_scenario(&scenario, &config)
    };
    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
