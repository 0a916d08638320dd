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
//! Module that allows to (de-)serialize a `BTreeMap` keyed by tuples with `serde`.
//!
//! JSON objects only allow string keys, so such maps are written as a list of entries:
//!
//! ```json
//! [{"key": ["alice", 3, "17"], "val": {"startup": 1.25}}]
//! ```

use std::collections::{btree_map, BTreeMap};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Helper struct that allows (de-)serialization of a tuple-keyed `BTreeMap` as this type.
///
/// Example:
/// ```ignore
/// let data: SerializeTupleMap<SessionKey, BufferRecord> = serde_json::from_reader(file)?;
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializeTupleMap<K, V>(
    #[serde(with = "crate::serde_map")]
    #[serde(bound(
        deserialize = "K: Ord + Deserialize<'de>, V: Deserialize<'de>",
        serialize = "K: Serialize, V: Serialize",
    ))]
    pub BTreeMap<K, V>,
);

impl<K, V> From<BTreeMap<K, V>> for SerializeTupleMap<K, V> {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self(map)
    }
}

impl<K, V> From<SerializeTupleMap<K, V>> for BTreeMap<K, V> {
    fn from(val: SerializeTupleMap<K, V>) -> Self {
        val.0
    }
}

/// A single key-value pair of the map.
#[derive(Deserialize, Serialize)]
struct Entry<K, V> {
    key: K,
    val: V,
}

/// Serialize a `BTreeMap` as a sequence of entries, in key order.
pub fn serialize<K: Serialize, V: Serialize, S: Serializer>(
    map: &BTreeMap<K, V>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.iter().map(|(key, val)| Entry { key, val }))
}

/// Deserialize a sequence of entries into a `BTreeMap`. Keys must be unique.
pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let entries = Vec::<Entry<K, V>>::deserialize(deserializer)?;
    let num_entries = entries.len();
    let mut map = BTreeMap::new();
    for (idx, Entry { key, val }) in entries.into_iter().enumerate() {
        match map.entry(key) {
            btree_map::Entry::Vacant(e) => {
                e.insert(val);
            }
            btree_map::Entry::Occupied(_) => {
                return Err(de::Error::custom(format!(
                    "duplicate key in entry {idx} of {num_entries}"
                )));
            }
        }
    }
    Ok(map)
}
