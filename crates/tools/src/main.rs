use std::env;
use std::path::PathBuf;

use foundation::math::Viewport;
use tools::{EnrichOptions, corrections_summary, enrich_bundle};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "enrich" => cmd_enrich(args),
        "corrections" => cmd_corrections(args),
        _ => Err(usage()),
    }
}

fn cmd_enrich(args: Vec<String>) -> Result<(), String> {
    // mapquiz enrich <assets_dir> <output_dir> [--width N] [--height N] [--scale N] [--pretty] [--corrections FILE]
    if args.len() < 2 {
        return Err(usage());
    }

    let assets_dir = PathBuf::from(&args[0]);
    let output_dir = PathBuf::from(&args[1]);
    let mut options = EnrichOptions::default();
    let mut viewport = Viewport::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                viewport.width_px = parse_f64(&args, i, "--width")?;
            }
            "--height" => {
                i += 1;
                viewport.height_px = parse_f64(&args, i, "--height")?;
            }
            "--scale" => {
                i += 1;
                viewport.scale = parse_f64(&args, i, "--scale")?;
            }
            "--pretty" => options.pretty = true,
            "--corrections" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--corrections requires a path".to_string())?;
                options.corrections = Some(PathBuf::from(path));
            }
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }
    options.labels.viewport = viewport;

    let manifest = enrich_bundle(&assets_dir, &output_dir, &options)?;
    for output in &manifest.outputs {
        eprintln!(
            "wrote {} ({} bytes, blake3={})",
            output_dir.join(&output.path).display(),
            output.bytes,
            output.content_hash
        );
    }
    eprintln!(
        "entities={} input_hash={} corrections={}",
        manifest.entities, manifest.input_hash, manifest.corrections.fingerprint
    );
    Ok(())
}

fn cmd_corrections(args: Vec<String>) -> Result<(), String> {
    // mapquiz corrections [--corrections FILE] [--json]
    let mut path: Option<PathBuf> = None;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--corrections" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "--corrections requires a path".to_string())?;
                path = Some(PathBuf::from(value));
            }
            "--json" => as_json = true,
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let summary = corrections_summary(path.as_deref())?;
    if as_json {
        let payload = serde_json::to_string_pretty(&summary).map_err(|e| format!("json: {e}"))?;
        println!("{payload}");
        return Ok(());
    }
    println!("version: {}", summary.version);
    println!("fingerprint: {}", summary.fingerprint);
    println!("geometry patches: {}", summary.geometry_patches);
    println!("attribute patches: {}", summary.attribute_patches);
    println!("territory patches: {}", summary.territory_patches);
    println!("extra capitals: {}", summary.extra_capitals);
    println!("country labels: {}", summary.country_labels);
    println!("capital offsets: {}", summary.capital_offsets);
    Ok(())
}

fn parse_f64(args: &[String], i: usize, flag: &str) -> Result<f64, String> {
    let raw = args
        .get(i)
        .ok_or_else(|| format!("{flag} requires a value"))?;
    raw.parse()
        .map_err(|_| format!("{flag}: invalid number {raw:?}"))
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "mapquiz".to_string());
    format!(
        "Usage:\n  {exe} enrich <assets_dir> <output_dir> [--width N] [--height N] [--scale N] [--pretty] [--corrections FILE]\n  {exe} corrections [--corrections FILE] [--json]\n\nNotes:\n- <assets_dir> holds world-50m.json, countries.json, country_capitals.json and regions.json.\n- Without --corrections the built-in correction table is used.\n- Any integrity failure aborts before outputs are written.\n"
    )
}
