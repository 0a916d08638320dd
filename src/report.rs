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
//! Text summary and plots of the combined aggregates.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use itertools::Itertools;
use plotly::{
    common::{Line, Marker, Mode, Title},
    layout::{Axis, Layout},
    Plot, Scatter,
};

use crate::{
    aggregate::{Aggregates, CombinedRecord},
    cdf::{Binning, DELAY_BINS, SSIM_BINS},
    config::PlotConfig,
    error::{Error, Result},
    experiment::AbrCc,
    filter::FilterMode,
    util::PathBufExt,
};

/// Names of the scalar fields written to the text summary, in the order of `scalar_fields`.
pub const SUMMARY_FIELDS: [&str; 4] = ["buffer_num", "startup_mean", "video_num", "ssim_mean"];

fn scalar_fields(r: &CombinedRecord) -> [String; 4] {
    [
        r.buffer.buffer_num.to_string(),
        format!("{:?}", r.buffer.startup_mean),
        r.video.video_num.to_string(),
        format!("{:?}", r.video.ssim_mean),
    ]
}

/// Write the summary of one congestion control scheme: its name, then one line per ABR algorithm.
pub fn write_cc_summary(
    d: &Aggregates,
    cc: &str,
    config: &PlotConfig,
    w: &mut impl Write,
) -> io::Result<()> {
    writeln!(w, "{}", config.pretty_name(cc))?;

    for abr in &config.abr_order {
        let Some(record) = d.get(&(abr.clone(), cc.to_string())) else {
            continue;
        };
        write!(w, "{abr}:")?;
        for value in scalar_fields(record) {
            write!(w, " {value},")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write the summary of all congestion control schemes.
pub fn write_summary(d: &Aggregates, config: &PlotConfig, w: &mut impl Write) -> io::Result<()> {
    writeln!(w, "[{}]", SUMMARY_FIELDS.iter().join(", "))?;
    for (i, cc) in config.cc_order.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write_cc_summary(d, cc, config, w)?;
    }
    Ok(())
}

/// Write the summary to `<output>.txt` in `dir`.
pub fn save_summary(
    d: &Aggregates,
    config: &PlotConfig,
    dir: &Path,
    mode: FilterMode,
) -> Result<PathBuf> {
    let path = dir.then(format!("{}.txt", mode.output()));
    let file = fs::File::create(&path).map_err(|e| Error::Io(path.clone(), e))?;
    let mut w = BufWriter::new(file);
    write_summary(d, config, &mut w)
        .and_then(|_| w.flush())
        .map_err(|e| Error::Io(path.clone(), e))?;
    log::info!("Print to {path:?}");
    Ok(path)
}

/// Metric shown in a CDF plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Ssim,
    Delay,
}

impl Metric {
    pub fn binning(&self) -> Binning {
        match self {
            Metric::Ssim => SSIM_BINS,
            Metric::Delay => DELAY_BINS,
        }
    }

    /// Tag used in the file name.
    pub fn tag(&self) -> &'static str {
        match self {
            Metric::Ssim => "ssim",
            Metric::Delay => "time",
        }
    }

    pub fn xlabel(&self, mode: FilterMode) -> &'static str {
        match self {
            Metric::Ssim => "SSIM (dB)",
            Metric::Delay => mode.xlabel(),
        }
    }
}

/// Build the CDF plot of `metric` for all ABR algorithms running with congestion control `cc`.
pub fn cdf_plot(
    d: &BTreeMap<AbrCc, Vec<f64>>,
    cc: &str,
    metric: Metric,
    mode: FilterMode,
    config: &PlotConfig,
) -> Plot {
    let bins = metric.binning();
    let mut plot = Plot::new();

    for abr in &config.abr_order {
        let Some(samples) = d.get(&(abr.clone(), cc.to_string())) else {
            continue;
        };
        if mode == FilterMode::FiltFake && config.skip_initial.contains(abr) {
            log::debug!("Not plotting {abr} for initial sessions");
            continue;
        }
        let Some((x, y)) = bins.cdf(samples) else {
            log::trace!("No {} samples for {abr} with {cc}", metric.tag());
            continue;
        };

        let mut line = Line::new();
        if let Some(color) = config.color(abr) {
            line = line.color(color.to_string());
        }
        let trace = Scatter::new(x, y)
            .mode(Mode::Lines)
            .name(config.pretty_name(abr))
            .line(line);
        plot.add_trace(trace);
    }

    plot.set_layout(
        Layout::new()
            .show_legend(true)
            .x_axis(
                Axis::new()
                    .title(Title::from(metric.xlabel(mode)))
                    .range(vec![bins.min, bins.max]),
            )
            .y_axis(Axis::new().title(Title::from("CDF")).range(vec![0.0, 1.0])),
    );

    plot
}

/// Render the CDF plot of `metric` for `cc` into `<output>_<metric>_<cc>_cdf.html` in `dir`.
pub fn plot_cdf(
    d: &BTreeMap<AbrCc, Vec<f64>>,
    cc: &str,
    metric: Metric,
    mode: FilterMode,
    config: &PlotConfig,
    dir: &Path,
) -> PathBuf {
    let figname = dir.then(format!("{}_{}_{cc}_cdf.html", mode.output(), metric.tag()));
    cdf_plot(d, cc, metric, mode, config).write_html(&figname);
    log::info!("Saved plot to {figname:?}");
    figname
}

/// Build the scatter plot of mean delay (x) and mean SSIM (y) for congestion control `cc`.
pub fn dots_plot(
    x_mean: &BTreeMap<AbrCc, f64>,
    y_mean: &BTreeMap<AbrCc, f64>,
    cc: &str,
    xlabel: &str,
    config: &PlotConfig,
) -> Plot {
    let mut plot = Plot::new();
    let mut xs = Vec::new();

    for ((abr, _), y) in y_mean.iter().filter(|((_, c), _)| c == cc) {
        let Some(x) = x_mean.get(&(abr.clone(), cc.to_string())) else {
            continue;
        };
        log::debug!("({abr}, {cc}): {x} s, {y} dB");
        xs.push(*x);

        let mut marker = Marker::new().size(10);
        if let Some(color) = config.color(abr) {
            marker = marker.color(color.to_string());
        }
        let trace = Scatter::new(vec![*x], vec![*y])
            .mode(Mode::MarkersText)
            .name(config.pretty_name(abr))
            .text(config.pretty_name(abr))
            .marker(marker);
        plot.add_trace(trace);
    }

    // shorter delays to the right
    let mut x_axis = Axis::new().title(Title::from(xlabel));
    if let (Some(min), Some(max)) = (
        xs.iter().copied().reduce(f64::min),
        xs.iter().copied().reduce(f64::max),
    ) {
        let pad = ((max - min) * 0.1).max(0.05);
        x_axis = x_axis.range(vec![max + pad, min - pad]);
    }
    plot.set_layout(
        Layout::new()
            .show_legend(false)
            .x_axis(x_axis)
            .y_axis(Axis::new().title(Title::from("Average SSIM (dB)"))),
    );

    plot
}

/// Render one scatter plot per congestion control scheme into `<output>_<cc>_dots.html` in `dir`.
pub fn plot_dots(
    d: &Aggregates,
    mode: FilterMode,
    config: &PlotConfig,
    dir: &Path,
) -> Vec<PathBuf> {
    let x_mean = crate::aggregate::pick_by_cc(d, |r| r.buffer.startup_mean);
    let y_mean = crate::aggregate::pick_by_cc(d, |r| r.video.ssim_mean);

    config
        .cc_order
        .iter()
        .map(|cc| {
            let figname = dir.then(format!("{}_{cc}_dots.html", mode.output()));
            dots_plot(&x_mean, &y_mean, cc, mode.xlabel(), config).write_html(&figname);
            log::info!("Saved plot to {figname:?}");
            figname
        })
        .collect()
}
