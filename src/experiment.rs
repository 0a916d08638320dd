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
//! Mapping experiments to the (ABR, CC) scheme they ran.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    session::read_json,
};

/// `(abr, cc)` pair, e.g. `("mpc", "bbr")`.
pub type AbrCc = (String, String);

/// Configuration of a single experiment as stored by the data collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExptConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abr_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abr: Option<String>,
    pub cc: String,
    /// Everything else stored with the experiment (abr_config, ...).
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl ExptConfig {
    /// The `(abr, cc)` pair of this experiment. `abr_name` takes precedence over `abr`.
    pub fn abr_cc(&self) -> Option<AbrCc> {
        let abr = self.abr_name.as_ref().or(self.abr.as_ref())?;
        Some((abr.clone(), self.cc.clone()))
    }
}

/// Experiment id -> experiment configuration.
pub type ExptIdCache = BTreeMap<i64, ExptConfig>;

pub fn load_expt_id_cache(path: impl AsRef<Path>) -> Result<ExptIdCache> {
    let cache: ExptIdCache = read_json(&path)?;
    log::info!(
        "Loaded {} experiment configs from {:?}",
        cache.len(),
        path.as_ref()
    );
    Ok(cache)
}

/// How to derive the `(abr, cc)` pair from the experiment id of a session.
#[derive(Clone, Copy, Debug)]
pub enum KeyDerivation<'a> {
    /// Look the numeric experiment id up in the experiment id cache.
    Cache(&'a ExptIdCache),
    /// The experiment id itself is `<abr>+<cc>`.
    Emulation,
}

impl KeyDerivation<'_> {
    pub fn abr_cc(&self, expt_id: &str) -> Result<AbrCc> {
        match self {
            KeyDerivation::Cache(cache) => {
                let id: i64 = expt_id
                    .trim()
                    .parse()
                    .map_err(|_| Error::InvalidExperimentId(expt_id.to_string()))?;
                cache
                    .get(&id)
                    .ok_or(Error::UnknownExperiment(id))?
                    .abr_cc()
                    .ok_or(Error::MissingAbr(id))
            }
            KeyDerivation::Emulation => parse_emulation_id(expt_id),
        }
    }

    pub fn is_emulation(&self) -> bool {
        matches!(self, KeyDerivation::Emulation)
    }
}

/// Split an emulation experiment id `<abr>+<cc>` into its two components.
pub fn parse_emulation_id(expt_id: &str) -> Result<AbrCc> {
    match expt_id.split('+').collect::<Vec<_>>().as_slice() {
        [abr, cc] if !abr.is_empty() && !cc.is_empty() => Ok((abr.to_string(), cc.to_string())),
        _ => Err(Error::MalformedEmulationId(expt_id.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(abr: &str, cc: &str) -> AbrCc {
        (abr.to_string(), cc.to_string())
    }

    #[test]
    fn emulation_id() {
        assert_eq!(parse_emulation_id("pensieve+bbr").unwrap(), key("pensieve", "bbr"));
        assert_eq!(
            KeyDerivation::Emulation.abr_cc("linear_bba+cubic").unwrap(),
            key("linear_bba", "cubic")
        );
    }

    #[test]
    fn malformed_emulation_id() {
        for id in ["pensieve", "pensieve+bbr+x", "+bbr", "mpc+", ""] {
            assert!(
                matches!(parse_emulation_id(id), Err(Error::MalformedEmulationId(_))),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn cache_lookup() {
        let cache: ExptIdCache = serde_json::from_str(
            r#"{
                "17": {"abr_name": "puffer_ttp_cl", "abr": "puffer_ttp", "cc": "bbr", "abr_config": {}},
                "18": {"abr": "mpc", "cc": "cubic"},
                "19": {"cc": "cubic"}
            }"#,
        )
        .unwrap();
        let derive = KeyDerivation::Cache(&cache);

        assert_eq!(derive.abr_cc("17").unwrap(), key("puffer_ttp_cl", "bbr"));
        assert_eq!(derive.abr_cc("18").unwrap(), key("mpc", "cubic"));
        assert!(matches!(derive.abr_cc("19"), Err(Error::MissingAbr(19))));
        assert!(matches!(derive.abr_cc("20"), Err(Error::UnknownExperiment(20))));
        assert!(matches!(
            derive.abr_cc("mpc+bbr"),
            Err(Error::InvalidExperimentId(_))
        ));
        assert!(cache[&17].other.contains_key("abr_config"));
    }
}
