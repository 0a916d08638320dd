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
//! Selecting sessions based on whether they continue an earlier session of the same user.
//!
//! A user that switches channels (or reloads the player) starts a new session whose `init_id` is
//! one larger than the previous one. Sessions without such a predecessor are *initial* sessions,
//! the others are *continuation* sessions.

use std::{collections::HashSet, fmt};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::session::SessionKey;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Keep all sessions.
    #[default]
    #[value(name = "no_filt")]
    NoFilt,
    /// Keep only initial sessions, i.e., drop those continuing an earlier session.
    #[value(name = "filt_fake")]
    FiltFake,
    /// Keep only sessions that continue an earlier session of the same user.
    #[value(name = "filt_real")]
    FiltReal,
}

impl FilterMode {
    /// Stem of all output files produced in this mode.
    pub fn output(&self) -> &'static str {
        match self {
            FilterMode::NoFilt => "ssim_startup",
            FilterMode::FiltFake => "ssim_initial_delay",
            FilterMode::FiltReal => "ssim_switch_delay",
        }
    }

    /// Axis label of the delay measured in this mode.
    pub fn xlabel(&self) -> &'static str {
        match self {
            FilterMode::NoFilt => "Start-up Delay (s)",
            FilterMode::FiltFake => "Initial Video Delay (s)",
            FilterMode::FiltReal => "Video Switch Delay (s)",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FilterMode::NoFilt => write!(f, "no_filt"),
            FilterMode::FiltFake => write!(f, "filt_fake"),
            FilterMode::FiltReal => write!(f, "filt_real"),
        }
    }
}

/// Decides per session whether to keep it, given all sessions of a dataset.
#[derive(Clone, Debug)]
pub struct SessionFilter {
    mode: FilterMode,
    seen: HashSet<(String, i64)>,
}

impl SessionFilter {
    pub fn new<'a>(mode: FilterMode, sessions: impl IntoIterator<Item = &'a SessionKey>) -> Self {
        Self {
            mode,
            seen: sessions
                .into_iter()
                .map(|(user, init_id, _)| (user.clone(), *init_id))
                .collect(),
        }
    }

    /// Whether the same user has a session with the preceding `init_id`.
    pub fn is_continuation(&self, (user, init_id, _): &SessionKey) -> bool {
        init_id
            .checked_sub(1)
            .is_some_and(|prev| self.seen.contains(&(user.clone(), prev)))
    }

    pub fn keep(&self, session: &SessionKey) -> bool {
        match self.mode {
            FilterMode::NoFilt => true,
            FilterMode::FiltFake => !self.is_continuation(session),
            FilterMode::FiltReal => self.is_continuation(session),
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }
}

/// Number of sessions kept and dropped by a `SessionFilter`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub deleted: usize,
}

impl FilterStats {
    pub fn total(&self) -> usize {
        self.kept + self.deleted
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sessions() -> Vec<SessionKey> {
        [
            ("alice", 1, "1"),
            ("alice", 2, "1"),
            ("alice", 3, "2"),
            ("alice", 7, "2"),
            ("bob", 2, "1"),
            ("bob", 4, "1"),
            ("carol", 5, "2"),
            ("carol", 6, "1"),
        ]
        .into_iter()
        .map(|(u, i, e)| (u.to_string(), i, e.to_string()))
        .collect()
    }

    fn kept(mode: FilterMode, sessions: &[SessionKey]) -> Vec<SessionKey> {
        let filter = SessionFilter::new(mode, sessions);
        sessions.iter().filter(|s| filter.keep(s)).cloned().collect()
    }

    #[test]
    fn no_filt_keeps_everything() {
        let sessions = sessions();
        assert_eq!(kept(FilterMode::NoFilt, &sessions), sessions);
    }

    #[test]
    fn continuation_sessions() {
        let sessions = sessions();
        let real = kept(FilterMode::FiltReal, &sessions);
        let real: Vec<_> = real.iter().map(|(u, i, _)| (u.as_str(), *i)).collect();
        assert_eq!(real, vec![("alice", 2), ("alice", 3), ("carol", 6)]);
    }

    #[test]
    fn initial_and_continuation_partition_the_input() {
        let sessions = sessions();
        let fake = kept(FilterMode::FiltFake, &sessions);
        let real = kept(FilterMode::FiltReal, &sessions);

        assert_eq!(fake.len() + real.len(), sessions.len());
        assert!(fake.iter().all(|s| !real.contains(s)));
    }

    #[test]
    fn predecessor_with_other_experiment_counts() {
        // the experiment id is not part of the seen set
        let sessions = sessions();
        let filter = SessionFilter::new(FilterMode::FiltReal, &sessions);
        assert!(filter.keep(&("alice".to_string(), 3, "2".to_string())));
    }

    #[test]
    fn smallest_init_id_is_an_initial_session() {
        let session = ("u".to_string(), i64::MIN, "1".to_string());
        let sessions = vec![session.clone(), ("u".to_string(), i64::MAX, "1".to_string())];
        let filter = SessionFilter::new(FilterMode::FiltFake, &sessions);
        assert!(!filter.is_continuation(&session));
        assert!(filter.keep(&session));
    }

    #[test]
    fn output_names() {
        assert_eq!(FilterMode::NoFilt.output(), "ssim_startup");
        assert_eq!(FilterMode::FiltFake.output(), "ssim_initial_delay");
        assert_eq!(FilterMode::FiltReal.output(), "ssim_switch_delay");
        assert_eq!(FilterMode::FiltReal.xlabel(), "Video Switch Delay (s)");
    }

    #[test]
    fn mode_names_match_cli() {
        for mode in FilterMode::value_variants() {
            assert_eq!(FilterMode::from_str(&mode.to_string(), false).unwrap(), *mode);
        }
        assert!(FilterMode::from_str("filt_typo", false).is_err());
    }
}
