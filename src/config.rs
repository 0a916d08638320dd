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
//! Presentation settings: which schemes to show, in which order, under which name and color.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Result, session::read_json};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// ABR algorithms in the order in which they appear in reports and legends. ABR algorithms not
    /// listed here are not reported.
    pub abr_order: Vec<String>,
    /// Congestion control schemes, one report section and one plot each.
    pub cc_order: Vec<String>,
    /// Human-readable names of ABR algorithms and congestion control schemes.
    pub pretty_names: BTreeMap<String, String>,
    /// Line and marker color per ABR algorithm.
    pub colors: BTreeMap<String, String>,
    /// ABR algorithms not plotted when looking at initial sessions only.
    pub skip_initial: Vec<String>,
}

impl PlotConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(&path)?;
        log::info!("Loaded plot config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Pretty name of an ABR algorithm or congestion control scheme, defaulting to `name`.
    pub fn pretty_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.pretty_names.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn color(&self, abr: &str) -> Option<&str> {
        self.colors.get(abr).map(String::as_str)
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        let owned = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            abr_order: [
                "puffer_ttp_cl",
                "puffer_ttp_20190202",
                "puffer_ttp_mle",
                "puffer_ttp_no_tcp_info",
                "linear_bba",
                "mpc",
                "robust_mpc",
                "pensieve",
            ]
            .map(String::from)
            .to_vec(),
            cc_order: ["bbr", "cubic"].map(String::from).to_vec(),
            pretty_names: owned(&[
                ("bbr", "BBR"),
                ("cubic", "Cubic"),
                ("puffer_ttp_cl", "Fugu"),
                ("puffer_ttp_20190202", "Fugu-Feb"),
                ("puffer_ttp_mle", "Fugu-MLE"),
                ("puffer_ttp_no_tcp_info", "Fugu without TCP info"),
                ("linear_bba", "BBA"),
                ("mpc", "MPC-HM"),
                ("robust_mpc", "RobustMPC-HM"),
                ("pensieve", "Pensieve"),
            ]),
            colors: owned(&[
                ("puffer_ttp_cl", "#d62728"),
                ("puffer_ttp_20190202", "#8c564b"),
                ("puffer_ttp_mle", "#e377c2"),
                ("puffer_ttp_no_tcp_info", "#7f7f7f"),
                ("linear_bba", "#1f77b4"),
                ("mpc", "#ff7f0e"),
                ("robust_mpc", "#2ca02c"),
                ("pensieve", "#9467bd"),
            ]),
            skip_initial: vec!["pensieve".to_string()],
        }
    }
}
