mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cli::{Cli, Command};
use contour::audio::extract::analyze_file;
use contour::catalog::{Catalog, TrackRecord};
use contour::config::{self, Config};
use contour::similarity::{find_similar_sections_with, NeverCancel, SearchParams};
use contour::timeline::{default_selection, format_timestamp, window_from_ms};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(config::find_config);
    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}, using defaults", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Index {
            inputs,
            output,
            append,
            points,
        } => run_index(&inputs, &output, append, points.unwrap_or(cfg.index.points)),
        Command::Search {
            catalog,
            reference,
            start_ms,
            end_ms,
            step,
            top,
            metric,
            json,
        } => {
            let params = SearchParams {
                step_size: step.unwrap_or(cfg.search.step_size),
                metric: metric.unwrap_or(cfg.search.metric),
            };
            run_search(
                &catalog,
                &reference,
                (start_ms, end_ms),
                &params,
                top.unwrap_or(cfg.search.top_n),
                json,
                &cfg,
            )
        }
        Command::Peaks {
            catalog,
            track,
            width,
            rows,
        } => run_peaks(&catalog, &track, width, rows, &cfg),
    }
}

fn run_index(inputs: &[PathBuf], output: &Path, append: bool, points: usize) -> Result<()> {
    if points == 0 {
        anyhow::bail!("Envelope points must be at least 1");
    }

    let mut catalog = if append && output.exists() {
        Catalog::load(output)?
    } else {
        Catalog::default()
    };

    log::info!("Indexing {} files at {} points", inputs.len(), points);

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tracks ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let analyses: Vec<_> = inputs
        .par_iter()
        .map(|path| {
            let result = analyze_file(path, points);
            pb.inc(1);
            (path, result)
        })
        .collect();
    pb.finish_and_clear();

    let mut batch: HashSet<String> = HashSet::new();

    for (path, result) in analyses {
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(err) => {
                log::warn!("Skipping {}: {:#}", path.display(), err);
                continue;
            }
        };

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("track");
        let record = TrackRecord::indexed(title, analysis.duration_ms, &analysis.envelope)?;
        // Re-indexing a file replaces its entry from an earlier run
        let id = catalog.add_indexed(record, append, &mut batch);

        log::info!(
            "{} -> '{}' ({})",
            path.display(),
            id,
            format_timestamp(analysis.duration_ms)
        );
    }

    catalog.save(output)?;
    log::info!(
        "Wrote {} ({} indexed, {} tracks total)",
        output.display(),
        batch.len(),
        catalog.tracks.len()
    );
    Ok(())
}

fn run_search(
    catalog_path: &Path,
    reference_id: &str,
    (start_ms, end_ms): (Option<f64>, Option<f64>),
    params: &SearchParams,
    top: usize,
    as_json: bool,
    cfg: &Config,
) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let fallback = cfg.catalog.fallback_duration_ms;

    let reference = catalog
        .track(reference_id, fallback)
        .context("Reference track is not searchable")?;
    // The reference never competes with itself
    let candidates = catalog.candidates_for(reference_id, fallback);

    let window_ms = cfg.search.window_ms;
    let (start_ms, end_ms) = match (start_ms, end_ms) {
        (None, None) => default_selection(reference.duration_ms, window_ms),
        (start, end) => {
            let start = start.unwrap_or(0.0);
            let end = end.unwrap_or(start + window_ms);
            (start, end.min(reference.duration_ms))
        }
    };
    let window = window_from_ms(start_ms, end_ms, reference.duration_ms, reference.envelope.len());
    log::info!(
        "Reference '{}': {}-{} (frames {}..{}), {} candidates, step {}",
        reference.name,
        format_timestamp(start_ms),
        format_timestamp(end_ms),
        window.start,
        window.end,
        candidates.len(),
        params.step_size
    );
    if window.is_empty() {
        log::warn!("Selection covers no envelope frames; nothing to compare");
    }

    let started = Instant::now();
    let mut matches =
        find_similar_sections_with(&reference.envelope, window, &candidates, params, &NeverCancel)?;
    log::info!("Search finished in {:.1?}", started.elapsed());
    matches.truncate(top);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    println!("{:>4}  {:>6}  {:<32}  {}", "#", "score", "track", "section");
    for (rank, m) in matches.iter().enumerate() {
        let name = candidates
            .iter()
            .find(|c| c.id == m.track_id)
            .map(|c| if c.name.is_empty() { c.id.as_str() } else { c.name.as_str() })
            .unwrap_or(m.track_id.as_str());
        println!(
            "{:>4}  {:>5.1}%  {:<32}  {}-{}",
            rank + 1,
            m.score * 100.0,
            name,
            format_timestamp(m.match_start_ms),
            format_timestamp(m.match_end_ms)
        );
    }
    Ok(())
}

fn run_peaks(catalog_path: &Path, track_id: &str, width: usize, rows: usize, cfg: &Config) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let track = catalog.track(track_id, cfg.catalog.fallback_duration_ms)?;
    let bars = match track.envelope.resample(width) {
        Some(env) => env.normalized_to_peak(),
        None => anyhow::bail!("Width must be at least 1"),
    };

    let rows = rows.max(1);
    for row in (1..=rows).rev() {
        let threshold = (row as f32 - 0.5) / rows as f32;
        let line: String = bars
            .frames()
            .iter()
            .map(|&v| if v >= threshold { '█' } else { ' ' })
            .collect();
        println!("{}", line.trim_end());
    }
    println!(
        "{} ({} frames, {:.0} ms per bar)",
        format_timestamp(track.duration_ms),
        track.envelope.len(),
        track.duration_ms / width as f64
    );
    Ok(())
}
