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
//! Error type shared by the whole crate.

use std::path::PathBuf;

use crate::experiment::AbrCc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error on {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Cannot parse {0:?}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
    #[error("Experiment id {0} is not in the experiment id cache")]
    UnknownExperiment(i64),
    #[error("Experiment id {0:?} is not an integer (use --emu for emulation data)")]
    InvalidExperimentId(String),
    #[error("Experiment id {0:?} does not have the form `<abr>+<cc>`")]
    MalformedEmulationId(String),
    #[error("Experiment config for {0} names no ABR algorithm")]
    MissingAbr(i64),
    #[error("Session {0:?} has no video records")]
    EmptyVideoRecord(String),
    #[error("Aggregates disagree on (abr, cc) keys: only buffer data for {only_buffer:?}, only video data for {only_video:?}")]
    MismatchedKeys {
        only_buffer: Vec<AbrCc>,
        only_video: Vec<AbrCc>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
