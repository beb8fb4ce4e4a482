use VaporPlumb::Chemistry::catalog::ChemicalCatalog;
use VaporPlumb::Utils::load_from_file::LoadData;
use VaporPlumb::Utils::logging::{init_logging, level_from_name};
use VaporPlumb::error::PipelineError;
use VaporPlumb::pipeline::{print_summary, run, write_outputs};
use VaporPlumb::settings::{DEFAULT_CONFIG_FILE, Settings};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage: VaporPlumb <records.csv> [--inventory <inventory.csv>] [--config <config.json>] [--out <dir>]";

struct Args {
    records: PathBuf,
    inventory: Option<PathBuf>,
    config: PathBuf,
    out: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut records = None;
    let mut inventory = None;
    let mut config = PathBuf::from(DEFAULT_CONFIG_FILE);
    let mut out = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--inventory" => inventory = Some(PathBuf::from(args.next()?)),
            "--config" => config = PathBuf::from(args.next()?),
            "--out" => out = Some(PathBuf::from(args.next()?)),
            _ if records.is_none() && !arg.starts_with("--") => records = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some(Args {
        records: records?,
        inventory,
        config,
        out,
    })
}

fn execute(args: Args) -> Result<(), PipelineError> {
    let settings = Settings::with_config_file(&args.config)?;
    let config = settings.config();
    init_logging(
        level_from_name(&config.log_level),
        config.log_file.as_deref().map(Path::new),
    );

    let data = LoadData::new(args.records, args.inventory);
    let catalog = match data.load_inventory()? {
        Some(chemicals) => ChemicalCatalog::closed(chemicals)?,
        None => {
            info!("no chemical inventory given, chemicals are taken from the records");
            ChemicalCatalog::open()
        }
    };
    let records = data.load_records()?;

    let output = run(&records, &catalog, config)?;
    let out_dir = args.out.unwrap_or_else(|| config.output_path());
    let written = write_outputs(&output, config, &out_dir)?;
    info!("{} files written to '{}'", written.len(), out_dir.display());
    print_summary(&output);
    Ok(())
}

fn main() -> ExitCode {
    let Some(args) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };
    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
