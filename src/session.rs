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
//! Recorded playback sessions and loading them from disk.

use std::{collections::BTreeMap, fs, io::BufReader, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    serde_map::SerializeTupleMap,
};

/// Identifies one recorded session: `(user, init_id, expt_id)`.
pub type SessionKey = (String, i64, String);

/// Per-session data collected by the buffer (startup) pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferRecord {
    /// Time from requesting playback until the first frame was shown, in seconds.
    pub startup: f64,
}

/// Quality of a single video chunk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoEvent {
    /// SSIM index in (0, 1]. A value of exactly 1 means no measurement.
    pub ssim_index: f64,
}

/// Per-session video events, keyed by timestamp.
pub type VideoRecord = BTreeMap<i64, VideoEvent>;

pub type BufferData = BTreeMap<SessionKey, BufferRecord>;
pub type VideoData = BTreeMap<SessionKey, VideoRecord>;

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::Json(path.to_path_buf(), e))
}

/// Load the buffer dataset, stored as a tuple-keyed entry list.
pub fn load_buffer_data(path: impl AsRef<Path>) -> Result<BufferData> {
    let data: SerializeTupleMap<SessionKey, BufferRecord> = read_json(&path)?;
    log::info!(
        "Finish loading buffer data! ({} sessions from {:?})",
        data.0.len(),
        path.as_ref()
    );
    Ok(data.into())
}

/// Load the video dataset, stored as a tuple-keyed entry list.
pub fn load_video_data(path: impl AsRef<Path>) -> Result<VideoData> {
    let data: SerializeTupleMap<SessionKey, VideoRecord> = read_json(&path)?;
    log::info!(
        "Finish loading video data! ({} sessions from {:?})",
        data.0.len(),
        path.as_ref()
    );
    Ok(data.into())
}

/// SSIM index of the earliest video event of a session.
pub fn first_ssim_index(session: &SessionKey, record: &VideoRecord) -> Result<f64> {
    record
        .first_key_value()
        .map(|(_, event)| event.ssim_index)
        .ok_or_else(|| Error::EmptyVideoRecord(format!("{session:?}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn video_record_uses_earliest_timestamp() {
        let json = r#"[{"key": ["alice", 2, "5"], "val": {
            "1546300900": {"ssim_index": 0.5},
            "1546300800": {"ssim_index": 0.9},
            "1546301000": {"ssim_index": 0.7}
        }}]"#;
        let data: VideoData = serde_json::from_str::<SerializeTupleMap<SessionKey, VideoRecord>>(json)
            .unwrap()
            .into();
        let (key, record) = data.iter().next().unwrap();

        assert_eq!(first_ssim_index(key, record).unwrap(), 0.9);
    }

    #[test]
    fn empty_video_record_is_an_error() {
        let key = ("alice".to_string(), 1, "5".to_string());
        assert!(matches!(
            first_ssim_index(&key, &VideoRecord::new()),
            Err(Error::EmptyVideoRecord(_))
        ));
    }

    #[test]
    fn buffer_record_ignores_additional_fields() {
        let json = r#"[{"key": ["bob", 7, "3"], "val": {"startup": 0.75, "cum_rebuf": 1.0}}]"#;
        let data: BufferData = serde_json::from_str::<SerializeTupleMap<SessionKey, BufferRecord>>(json)
            .unwrap()
            .into();

        assert_eq!(
            data[&("bob".to_string(), 7, "3".to_string())],
            BufferRecord { startup: 0.75 }
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let res = load_buffer_data("/nonexistent/buffer_data.json");
        assert!(matches!(res, Err(Error::Io(_, _))));
    }
}
