// ABRCC: Startup Delay and Video Quality of ABR Algorithms under Different Congestion Control
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
use std::{path::PathBuf, process};

use clap::Parser;

use abrcc::{cache::AggregateCache, pipeline, prelude::*, util};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Startup delay per session.
    #[arg(short, long, alias = "buffer-data-pickle")]
    buffer_data: PathBuf,
    /// SSIM per session and timestamp.
    #[arg(short, long, alias = "video-data-pickle")]
    video_data: PathBuf,
    /// Sessions come from emulation, their experiment id is `<abr>+<cc>`.
    #[arg(long)]
    emu: bool,
    /// Maps experiment ids to their configuration. Not used with `--emu`.
    #[arg(short, long, default_value = "expt_id_cache.json")]
    expt_id_cache: PathBuf,
    /// Prefix of the aggregate cache file (`<pre-dp>_<filt-mode>.json`).
    #[arg(long, default_value = "startup")]
    pre_dp: String,
    /// Which sessions to consider.
    #[arg(long, value_enum, default_value_t = FilterMode::NoFilt)]
    filt_mode: FilterMode,
    /// Output path for the summary and plots.
    #[arg(short, long, default_value = "./")]
    output_dir: PathBuf,
    /// Plot configuration (order, names and colors of the schemes) in JSON.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Also plot mean SSIM over mean delay.
    #[arg(long)]
    dots: bool,
    /// Recompute the aggregates even if the cache is up to date.
    #[arg(long)]
    no_cache: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();

    let inputs = Inputs {
        buffer_data: args.buffer_data,
        video_data: args.video_data,
        expt_id_cache: (!args.emu).then_some(args.expt_id_cache),
    };
    let required = [
        Some(&inputs.buffer_data),
        Some(&inputs.video_data),
        inputs.expt_id_cache.as_ref(),
    ];
    for path in required.into_iter().flatten() {
        if !path.exists() {
            log::error!("Could not read data in {path:?}!");
            process::exit(1)
        }
    }

    let config = match &args.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };

    let cache = AggregateCache::new(&args.pre_dp, args.filt_mode);
    let d = pipeline::load_or_compute(&inputs, args.filt_mode, &cache, !args.no_cache)?;

    let written = pipeline::report(&d, args.filt_mode, &config, &args.output_dir, args.dots)?;
    log::info!(
        "Wrote {} files for {} (abr, cc) pairs ({})",
        written.len(),
        d.len(),
        args.filt_mode
    );

    Ok(())
}
