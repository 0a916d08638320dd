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
//! Library for evaluating the startup delay and video quality of streaming sessions, grouped by
//! the ABR algorithm and congestion control scheme they ran with.

pub mod aggregate;
pub mod cache;
pub mod cdf;
pub mod config;
pub mod error;
pub mod experiment;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod serde_map;
pub mod session;
pub mod util;

pub mod prelude {
    pub use super::{
        aggregate::{Aggregates, CombinedRecord},
        config::PlotConfig,
        experiment::{AbrCc, KeyDerivation},
        filter::FilterMode,
        pipeline::Inputs,
    };
}
