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
//! Grouping per-session measurements by the (ABR, CC) scheme of the session.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::{
    error::{Error, Result},
    experiment::{AbrCc, KeyDerivation},
    filter::{FilterMode, FilterStats, SessionFilter},
    session::{first_ssim_index, BufferData, SessionKey, VideoData},
};

/// Startup delay statistics of one (ABR, CC) scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferAggregate {
    pub buffer_num: usize,
    /// in seconds
    pub startup_mean: f64,
    pub startup_data: Vec<f64>,
}

/// SSIM statistics of one (ABR, CC) scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoAggregate {
    pub video_num: usize,
    /// SSIM of the mean SSIM index, in dB
    pub ssim_mean: f64,
    /// SSIM of every session in dB, without sessions that reported an index of exactly 1.
    pub ssim_data: Vec<f64>,
}

/// Both aggregates of one (ABR, CC) scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    #[serde(flatten)]
    pub buffer: BufferAggregate,
    #[serde(flatten)]
    pub video: VideoAggregate,
}

pub type Aggregates = BTreeMap<AbrCc, CombinedRecord>;

/// Convert an SSIM index in (0, 1) into decibels.
pub fn ssim_index_to_db(ssim_index: f64) -> f64 {
    -10.0 * (1.0 - ssim_index).log10()
}

/// Filter sessions and group the metric of the remaining ones by their (ABR, CC) pair.
fn group_sessions<R>(
    data: &BTreeMap<SessionKey, R>,
    mode: FilterMode,
    derive: KeyDerivation<'_>,
    metric: impl Fn(&SessionKey, &R) -> Result<f64>,
) -> Result<(BTreeMap<AbrCc, Vec<f64>>, FilterStats)> {
    let filter = SessionFilter::new(mode, data.keys());
    let mut groups: BTreeMap<AbrCc, Vec<f64>> = BTreeMap::new();
    let mut stats = FilterStats::default();

    for (session, record) in data {
        if !filter.keep(session) {
            stats.deleted += 1;
            continue;
        }
        stats.kept += 1;

        let abr_cc = derive.abr_cc(&session.2)?;
        groups.entry(abr_cc).or_default().push(metric(session, record)?);
    }

    log::info!(
        "Num of delete: {} (kept {} of {} sessions, {mode})",
        stats.deleted,
        stats.kept,
        stats.total()
    );

    Ok((groups, stats))
}

/// Group the startup delay of all sessions selected by `mode`.
pub fn collect_buffer_data(
    data: &BufferData,
    mode: FilterMode,
    derive: KeyDerivation<'_>,
) -> Result<(BTreeMap<AbrCc, BufferAggregate>, FilterStats)> {
    let (groups, stats) = group_sessions(data, mode, derive, |_, record| Ok(record.startup))?;

    let aggregates = groups
        .into_iter()
        .map(|(abr_cc, startup_data)| {
            let agg = BufferAggregate {
                buffer_num: startup_data.len(),
                startup_mean: startup_data.iter().mean(),
                startup_data,
            };
            (abr_cc, agg)
        })
        .collect();

    Ok((aggregates, stats))
}

/// Group the SSIM of the first chunk of all sessions selected by `mode`.
pub fn collect_video_data(
    data: &VideoData,
    mode: FilterMode,
    derive: KeyDerivation<'_>,
) -> Result<(BTreeMap<AbrCc, VideoAggregate>, FilterStats)> {
    let (groups, stats) = group_sessions(data, mode, derive, first_ssim_index)?;

    let aggregates = groups
        .into_iter()
        .map(|(abr_cc, ssim_indices)| {
            let agg = VideoAggregate {
                video_num: ssim_indices.len(),
                ssim_mean: ssim_index_to_db(ssim_indices.iter().mean()),
                ssim_data: ssim_indices
                    .iter()
                    .filter(|x| **x != 1.0)
                    .map(|x| ssim_index_to_db(*x))
                    .collect(),
            };
            (abr_cc, agg)
        })
        .collect();

    Ok((aggregates, stats))
}

/// Merge the buffer and video aggregates of each (ABR, CC) pair. Both must contain the same pairs.
pub fn combine_by_cc(
    mut buffer: BTreeMap<AbrCc, BufferAggregate>,
    mut video: BTreeMap<AbrCc, VideoAggregate>,
) -> Result<Aggregates> {
    let only_buffer = buffer
        .keys()
        .filter(|k| !video.contains_key(*k))
        .cloned()
        .collect_vec();
    let only_video = video
        .keys()
        .filter(|k| !buffer.contains_key(*k))
        .cloned()
        .collect_vec();
    if !only_buffer.is_empty() || !only_video.is_empty() {
        return Err(Error::MismatchedKeys {
            only_buffer,
            only_video,
        });
    }

    let keys = buffer.keys().cloned().collect_vec();
    Ok(keys
        .into_iter()
        .filter_map(|k| {
            let record = CombinedRecord {
                buffer: buffer.remove(&k)?,
                video: video.remove(&k)?,
            };
            Some((k, record))
        })
        .collect())
}

/// Select a single field of every record.
pub fn pick_by_cc<T>(d: &Aggregates, f: impl Fn(&CombinedRecord) -> T) -> BTreeMap<AbrCc, T> {
    d.iter().map(|(k, r)| (k.clone(), f(r))).collect()
}
