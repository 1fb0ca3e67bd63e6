// ============================================================================
// GoldenFE CLI — headless rendering via command-line arguments
// ============================================================================
//
// Usage examples:
//   goldenfe --ratio 100
//   goldenfe --diagram spiral.png
//   goldenfe -i photo.jpg -o composed.png --offset-x -40
//   goldenfe -i "shots/*.jpg" --output-dir analysed/ --no-spiral
//   goldenfe -i photo.jpg --json
//
// No GUI is opened in CLI mode. Everything runs synchronously on the calling
// thread; only the rasterizer fans rows out over rayon.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgGroup, Parser};

use crate::config::RenderConfig;
use crate::io::{self, ExportKind};
use crate::ops::geometry::Point;
use crate::ops::placement::ImagePlacement;
use crate::ops::ratio;
use crate::session::{Session, UploadOutcome};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// GoldenFE headless renderer.
#[derive(Parser, Debug)]
#[command(
    name = "goldenfe",
    about = "Golden ratio calculator, spiral diagram and composition overlay",
    long_about = "Compute golden-ratio companions, render the golden spiral diagram, or\n\
                  compose golden-section grids and spirals over image files without\n\
                  opening the GUI.\n\n\
                  Example:\n  \
                  goldenfe --ratio 100\n  \
                  goldenfe -i *.jpg --output-dir analysed/ --no-spiral",
    group(ArgGroup::new("mode").required(true).multiple(true).args(["input", "ratio", "diagram"]))
)]
pub struct CliArgs {
    /// Input image(s) to overlay. Glob patterns accepted (e.g. "*.png").
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Print value/φ and value×φ for VALUE.
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub ratio: Option<String>,

    /// Render the golden spiral diagram to FILE (PNG).
    #[arg(long, value_name = "FILE")]
    pub diagram: Option<PathBuf>,

    /// Output file for a single input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch input; files are named `<stem>-golden-grid-analysis.png`.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Horizontal image offset in display pixels (may be negative).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_x: f64,

    /// Vertical image offset in display pixels (may be negative).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_y: f64,

    /// Leave out the golden-section grid.
    #[arg(long)]
    pub no_grid: bool,

    /// Leave out the spiral.
    #[arg(long)]
    pub no_spiral: bool,

    /// Print draw commands (or the ratio) as JSON instead of writing PNGs.
    #[arg(long)]
    pub json: bool,

    /// Render configuration file (key=value).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        Self::is_cli_invocation(std::env::args().skip(1))
    }

    pub fn is_cli_invocation<I, S>(args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter().any(|a| {
            let a = a.as_ref();
            a == "-i"
                || ["--input", "--ratio", "--diagram"]
                    .iter()
                    .any(|flag| a == *flag || a.starts_with(&format!("{flag}=")))
        })
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = everything succeeded, `1` = at least one step failed.
pub fn run(args: CliArgs) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if run_all(&args, &mut out) == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run every requested step, writing results to `out` and errors to stderr.
/// Returns the number of failed steps.
pub fn run_all(args: &CliArgs, out: &mut dyn Write) -> usize {
    let config = match &args.config {
        Some(path) => match RenderConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {}", e);
                return 1;
            }
        },
        None => RenderConfig::default(),
    };
    let mut session = Session::new(config);
    session.show_grid = !args.no_grid;
    session.show_spiral = !args.no_spiral;

    let mut failures = 0;

    if let Some(value) = &args.ratio
        && let Err(e) = print_ratio(value, args.json, out)
    {
        eprintln!("error: {}", e);
        failures += 1;
    }

    if let Some(path) = &args.diagram
        && let Err(e) = render_diagram(&session, path, args.json, out)
    {
        eprintln!("error: diagram: {}", e);
        failures += 1;
    }

    if !args.input.is_empty() {
        failures += run_inputs(args, &mut session, out);
    }

    failures
}

fn print_ratio(value: &str, json: bool, out: &mut dyn Write) -> Result<(), String> {
    let result = ratio::compute(value);
    let written = if json {
        let doc = serde_json::json!({ "input": value.trim(), "result": result });
        writeln!(out, "{}", doc)
    } else {
        writeln!(
            out,
            "{} / φ = {}\n{} × φ = {}",
            value.trim(),
            ratio::format_value(result.smaller),
            value.trim(),
            ratio::format_value(result.larger)
        )
    };
    written.map_err(|e| e.to_string())
}

fn render_diagram(session: &Session, path: &Path, json: bool, out: &mut dyn Write) -> Result<(), String> {
    if json {
        let doc = serde_json::to_string_pretty(&session.diagram_commands()).map_err(|e| e.to_string())?;
        return writeln!(out, "{}", doc).map_err(|e| e.to_string());
    }
    io::write_export(&session.render_diagram(), path).map_err(|e| e.to_string())?;
    writeln!(out, "→ {}", path.display()).map_err(|e| e.to_string())
}

fn run_inputs(args: &CliArgs, session: &mut Session, out: &mut dyn Write) -> usize {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return 1;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return 1;
    }

    if let Some(dir) = &args.output_dir
        && !args.json
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return 1;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut failures = 0;

    for (idx, input_path) in inputs.iter().enumerate() {
        if (multi || args.verbose) && !args.json {
            let _ = writeln!(out, "[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            multi,
        ) else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            failures += 1;
            continue;
        };

        match run_one(session, input_path, &output_path, args, out) {
            Ok(()) => {
                if (args.verbose || multi) && !args.json {
                    let _ = writeln!(
                        out,
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}: {}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    failures
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    session: &mut Session,
    input: &Path,
    output: &Path,
    args: &CliArgs,
    out: &mut dyn Write,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let token = session.begin_upload();
    let name = input.file_name().map(|s| s.to_string_lossy().to_string());
    let (max_w, max_h) = session.display_box();
    let loaded = io::load_path(input).map(|image| ImagePlacement::new(&image, max_w, max_h));
    match session.finish_upload(token, loaded, name) {
        UploadOutcome::Installed => {}
        UploadOutcome::Rejected(e) => return Err(format!("load failed: {}", e)),
        UploadOutcome::Stale => return Err("load superseded".to_string()),
    }
    if let Some(p) = session.placement.as_mut() {
        p.set_origin(Point::new(args.offset_x, args.offset_y));
    }

    // -- Step 2: Commands only -------------------------------------------
    if args.json {
        let doc = serde_json::json!({
            "input": input.display().to_string(),
            "commands": session.overlay_commands(),
        });
        let text = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
        return writeln!(out, "{}", text).map_err(|e| e.to_string());
    }

    // -- Step 3: Rasterize and save --------------------------------------
    let frame = session
        .render_overlay()
        .ok_or_else(|| "nothing to render".to_string())?;
    io::write_export(&frame, output).map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, single input only)
/// 2. `--output-dir` joined with the default name
/// 3. Batch without a directory: next to the input
/// 4. Single input: `golden-grid-analysis.png` in the working directory
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    batch: bool,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let default_name = ExportKind::Overlay.file_name();
    let name = if batch {
        let stem = input.file_stem()?.to_string_lossy().into_owned();
        format!("{}-{}", stem, default_name)
    } else {
        default_name.to_string()
    };

    match output_dir {
        Some(dir) => Some(dir.join(name)),
        None if batch => Some(input.parent().unwrap_or(Path::new(".")).join(name)),
        None => Some(PathBuf::from(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_mode_detection() {
        assert!(CliArgs::is_cli_invocation(["-i", "a.png"]));
        assert!(CliArgs::is_cli_invocation(["--ratio=3"]));
        assert!(CliArgs::is_cli_invocation(["--diagram", "x.png"]));
        assert!(!CliArgs::is_cli_invocation(["--verbose"]));
        assert!(!CliArgs::is_cli_invocation(Vec::<String>::new()));
    }

    #[test]
    fn some_mode_is_required() {
        assert!(CliArgs::try_parse_from(["goldenfe", "--json"]).is_err());
        assert!(CliArgs::try_parse_from(["goldenfe", "--ratio", "-5"]).is_ok());
    }

    #[test]
    fn negative_offsets_parse() {
        let args = CliArgs::try_parse_from([
            "goldenfe", "-i", "a.png", "--offset-x", "-40", "--offset-y", "-2.5",
        ])
        .unwrap();
        assert_eq!((args.offset_x, args.offset_y), (-40.0, -2.5));
    }

    #[test]
    fn output_names() {
        let input = Path::new("shots/beach.jpg");
        assert_eq!(
            build_output_path(input, None, None, false),
            Some(PathBuf::from("golden-grid-analysis.png"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("out")), true),
            Some(PathBuf::from("out/beach-golden-grid-analysis.png"))
        );
        assert_eq!(
            build_output_path(input, None, None, true),
            Some(PathBuf::from("shots/beach-golden-grid-analysis.png"))
        );
        assert_eq!(
            build_output_path(input, Some(Path::new("x.png")), None, false),
            Some(PathBuf::from("x.png"))
        );
    }

    #[test]
    fn ratio_output_is_three_decimals() {
        let mut buf = Vec::new();
        print_ratio(" 100 ", false, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("61.803"));
        assert!(text.contains("161.803"));
    }

    #[test]
    fn ratio_json_for_garbage_is_zero() {
        let mut buf = Vec::new();
        print_ratio("abc", true, &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["result"]["smaller"], 0.0);
        assert_eq!(v["result"]["larger"], 0.0);
    }
}
