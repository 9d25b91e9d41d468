use bubble_chart_rs::api::RefreshProfile;
use bubble_chart_rs::names::{BabyNamesProfile, DEFAULT_FALLBACK_YEAR, FsDataSource, NameList};
use bubble_chart_rs::render::SvgRenderer;
use bubble_chart_rs::telemetry;
use std::fs;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: render_year_chart --data-root <dir> [--year <yyyy>] --output <chart.svg> [--snapshot <chart.json>] [--list <names.txt>] [--max-ticks <n>]";
const DEFAULT_MAX_TICKS: usize = 1_000;

#[derive(Debug)]
struct CliArgs {
    data_root: PathBuf,
    year: u16,
    output: PathBuf,
    snapshot: Option<PathBuf>,
    list: Option<PathBuf>,
    max_ticks: usize,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let _ = telemetry::init_default_tracing();

    let source = FsDataSource::new(&args.data_root);
    let profile = BabyNamesProfile::default();
    let path = profile.path_for(args.year);
    let names = source
        .load_names(&path)
        .map_err(|err| format!("failed to load year {}: {err}", args.year))?;
    let dataset = names.to_dataset().map_err(|err| err.to_string())?;
    let popular = profile
        .prepare_dataset(dataset)
        .map_err(|err| err.to_string())?;

    let mut handle = profile
        .chart_for(args.year)
        .render(&popular, SvgRenderer::new("chart"))
        .map_err(|err| format!("failed to render year {}: {err}", args.year))?;
    let ticks = handle
        .settle(args.max_ticks)
        .map_err(|err| err.to_string())?;

    write_text(&args.output, handle.surface().document())?;
    if let Some(snapshot) = &args.snapshot {
        let json = handle.snapshot_json_pretty().map_err(|err| err.to_string())?;
        write_text(snapshot, &json)?;
    }
    if let Some(list_path) = &args.list {
        let list = NameList::build(&names, None);
        let text = list
            .items
            .iter()
            .map(|item| format!("{}\t{}", item.class.css_class(), item.text))
            .collect::<Vec<_>>()
            .join("\n");
        write_text(list_path, &text)?;
    }

    println!(
        "rendered {} bubbles for {} in {ticks} layout ticks -> {}",
        handle.node_count(),
        args.year,
        args.output.display()
    );
    Ok(())
}

fn write_text(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create `{}`: {err}", parent.display()))?;
    }
    fs::write(path, contents).map_err(|err| format!("failed to write `{}`: {err}", path.display()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut data_root = None::<PathBuf>;
    let mut year = DEFAULT_FALLBACK_YEAR;
    let mut output = None::<PathBuf>;
    let mut snapshot = None::<PathBuf>;
    let mut list = None::<PathBuf>;
    let mut max_ticks = DEFAULT_MAX_TICKS;

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for `{flag}`"))
        };
        match flag.as_str() {
            "--data-root" => data_root = Some(PathBuf::from(value()?)),
            "--year" => {
                let raw = value()?;
                year = raw
                    .parse()
                    .map_err(|err| format!("invalid --year `{raw}`: {err}"))?;
            }
            "--output" => output = Some(PathBuf::from(value()?)),
            "--snapshot" => snapshot = Some(PathBuf::from(value()?)),
            "--list" => list = Some(PathBuf::from(value()?)),
            "--max-ticks" => {
                let raw = value()?;
                max_ticks = raw
                    .parse()
                    .map_err(|err| format!("invalid --max-ticks `{raw}`: {err}"))?;
            }
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    Ok(CliArgs {
        data_root: data_root.ok_or_else(|| format!("missing --data-root\n{USAGE}"))?,
        year,
        output: output.ok_or_else(|| format!("missing --output\n{USAGE}"))?,
        snapshot,
        list,
        max_ticks,
    })
}
