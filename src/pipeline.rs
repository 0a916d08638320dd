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
//! Load, filter, aggregate, combine and report.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    aggregate::{collect_buffer_data, collect_video_data, combine_by_cc, pick_by_cc, Aggregates},
    cache::{AggregateCache, CacheKey},
    config::PlotConfig,
    error::{Error, Result},
    experiment::{load_expt_id_cache, KeyDerivation},
    filter::FilterMode,
    report::{plot_cdf, plot_dots, save_summary, Metric},
    session::{load_buffer_data, load_video_data},
};

/// Input datasets of one evaluation.
#[derive(Clone, Debug)]
pub struct Inputs {
    pub buffer_data: PathBuf,
    pub video_data: PathBuf,
    /// Experiment id cache, `None` for emulation data.
    pub expt_id_cache: Option<PathBuf>,
}

impl Inputs {
    pub fn is_emulation(&self) -> bool {
        self.expt_id_cache.is_none()
    }

    fn paths(&self) -> Vec<&Path> {
        [Some(&self.buffer_data), Some(&self.video_data), self.expt_id_cache.as_ref()]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn cache_key(&self, mode: FilterMode) -> Result<CacheKey> {
        CacheKey::new(mode, self.is_emulation(), self.paths())
    }
}

/// Load both datasets and compute the combined aggregates of all sessions selected by `mode`.
pub fn compute_aggregates(inputs: &Inputs, mode: FilterMode) -> Result<Aggregates> {
    let expt_id_cache = inputs
        .expt_id_cache
        .as_ref()
        .map(load_expt_id_cache)
        .transpose()?;
    let derive = match &expt_id_cache {
        Some(cache) => KeyDerivation::Cache(cache),
        None => KeyDerivation::Emulation,
    };

    let video_data = load_video_data(&inputs.video_data)?;
    let buffer_data = load_buffer_data(&inputs.buffer_data)?;

    let (bd, _) = collect_buffer_data(&buffer_data, mode, derive)?;
    let (vd, _) = collect_video_data(&video_data, mode, derive)?;
    combine_by_cc(bd, vd)
}

/// Reuse the cached aggregates if they are still valid, and compute (and cache) them otherwise.
pub fn load_or_compute(
    inputs: &Inputs,
    mode: FilterMode,
    cache: &AggregateCache,
    use_cache: bool,
) -> Result<Aggregates> {
    let key = inputs.cache_key(mode)?;
    if use_cache {
        if let Some(d) = cache.load(&key) {
            return Ok(d);
        }
    }

    let d = compute_aggregates(inputs, mode)?;
    if let Err(e) = cache.store(&key, &d) {
        log::warn!("Cannot cache aggregates: {e}");
    }
    Ok(d)
}

/// Write the text summary and all plots into `dir`. Returns the written files.
pub fn report(
    d: &Aggregates,
    mode: FilterMode,
    config: &PlotConfig,
    dir: &Path,
    dots: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| Error::Io(dir.to_path_buf(), e))?;

    let mut written = vec![save_summary(d, config, dir, mode)?];

    let ssim_data = pick_by_cc(d, |r| r.video.ssim_data.clone());
    let startup_data = pick_by_cc(d, |r| r.buffer.startup_data.clone());
    for cc in &config.cc_order {
        written.push(plot_cdf(&ssim_data, cc, Metric::Ssim, mode, config, dir));
    }
    for cc in &config.cc_order {
        written.push(plot_cdf(&startup_data, cc, Metric::Delay, mode, config, dir));
    }

    if dots {
        written.extend(plot_dots(d, mode, config, dir));
    }

    Ok(written)
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("abrcc-pipeline-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_inputs(dir: &Path) -> Inputs {
        let buffer_data = dir.join("buffer_data.json");
        fs::write(
            &buffer_data,
            r#"[
                {"key": ["alice", 1, "pensieve+bbr"], "val": {"startup": 1.0}},
                {"key": ["bob", 4, "pensieve+bbr"], "val": {"startup": 3.0}},
                {"key": ["bob", 5, "mpc+cubic"], "val": {"startup": 0.5}}
            ]"#,
        )
        .unwrap();
        let video_data = dir.join("video_data.json");
        fs::write(
            &video_data,
            r#"[
                {"key": ["alice", 1, "pensieve+bbr"], "val": {"100": {"ssim_index": 0.9}}},
                {"key": ["bob", 4, "pensieve+bbr"], "val": {"100": {"ssim_index": 1.0}}},
                {"key": ["bob", 5, "mpc+cubic"], "val": {"7": {"ssim_index": 0.99}, "3": {"ssim_index": 0.9}}}
            ]"#,
        )
        .unwrap();
        Inputs {
            buffer_data,
            video_data,
            expt_id_cache: None,
        }
    }

    #[test]
    fn emulation_end_to_end() {
        let dir = test_dir("emu");
        let inputs = write_inputs(&dir);

        let d = compute_aggregates(&inputs, FilterMode::NoFilt).unwrap();
        let pensieve = &d[&("pensieve".to_string(), "bbr".to_string())];
        assert_eq!(pensieve.buffer.buffer_num, 2);
        assert!((pensieve.buffer.startup_mean - 2.0).abs() < 1e-12);
        assert_eq!(pensieve.video.video_num, 2);
        assert_eq!(pensieve.video.ssim_data.len(), 1);

        let mpc = &d[&("mpc".to_string(), "cubic".to_string())];
        assert!((mpc.video.ssim_mean - 10.0).abs() < 1e-9);

        let written = report(&d, FilterMode::NoFilt, &PlotConfig::default(), &dir, false).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "ssim_startup.txt",
                "ssim_startup_ssim_bbr_cdf.html",
                "ssim_startup_ssim_cubic_cdf.html",
                "ssim_startup_time_bbr_cdf.html",
                "ssim_startup_time_cubic_cdf.html",
            ]
        );
        assert!(written.iter().all(|p| p.exists()));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn continuation_sessions_end_to_end() {
        let dir = test_dir("real");
        let inputs = write_inputs(&dir);

        let d = compute_aggregates(&inputs, FilterMode::FiltReal).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(
            d[&("mpc".to_string(), "cubic".to_string())].buffer.startup_data,
            vec![0.5]
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn cached_aggregates_are_reused() {
        let dir = test_dir("cache");
        let inputs = write_inputs(&dir);
        let cache = AggregateCache::new(
            dir.join("startup").display().to_string(),
            FilterMode::FiltFake,
        );

        let d = load_or_compute(&inputs, FilterMode::FiltFake, &cache, true).unwrap();
        assert!(cache.path().exists());

        // unchanged inputs, so the second run is answered from the cache
        let key = inputs.cache_key(FilterMode::FiltFake).unwrap();
        assert_eq!(cache.load(&key), Some(d.clone()));
        assert_eq!(
            load_or_compute(&inputs, FilterMode::FiltFake, &cache, true).unwrap(),
            d
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn no_cache_recomputes_and_overwrites() {
        let dir = test_dir("nocache");
        let inputs = write_inputs(&dir);
        let cache = AggregateCache::new(
            dir.join("startup").display().to_string(),
            FilterMode::NoFilt,
        );

        // a valid entry for the current inputs, but with made-up aggregates
        let key = inputs.cache_key(FilterMode::NoFilt).unwrap();
        let mut seeded = compute_aggregates(&inputs, FilterMode::NoFilt).unwrap();
        seeded.retain(|(abr, _), _| abr == "mpc");
        cache.store(&key, &seeded).unwrap();
        assert_eq!(
            load_or_compute(&inputs, FilterMode::NoFilt, &cache, true).unwrap(),
            seeded
        );

        let d = load_or_compute(&inputs, FilterMode::NoFilt, &cache, false).unwrap();
        assert_eq!(d.len(), 2);
        assert_ne!(d, seeded);
        assert_eq!(cache.load(&key), Some(d));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn non_emulation_requires_numeric_experiment_ids() {
        let dir = test_dir("expt");
        let mut inputs = write_inputs(&dir);
        let expt_id_cache = dir.join("expt_id_cache.json");
        fs::write(&expt_id_cache, r#"{"1": {"abr": "mpc", "cc": "bbr"}}"#).unwrap();
        inputs.expt_id_cache = Some(expt_id_cache);

        let res = compute_aggregates(&inputs, FilterMode::NoFilt);
        assert!(matches!(res, Err(Error::InvalidExperimentId(_))));

        fs::remove_dir_all(dir).unwrap();
    }
}
