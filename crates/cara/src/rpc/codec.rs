// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec boundary: wire references and the extension translation table.
//!
//! The byte codec itself is external. What this crate owns is the shape
//! of values handed to it: structs as id-keyed maps, lists as tuples,
//! enums as ordinals, and interface values as tagged extension payloads
//! produced by the [`TranslationTable`].

use super::{ChannelRef, ObjectId, PeerId};
use crate::config::WIRE_REF_LEN;
use crate::value::{Key, Value};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Interface reference on the wire: object id and the peer that exposed it.
///
/// Layout (16 bytes): object id (u64 LE), owner peer id (u64 LE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireRef {
    pub object: ObjectId,
    pub owner: PeerId,
}

impl WireRef {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(WIRE_REF_LEN);
        buf.extend_from_slice(&self.object.to_le_bytes());
        buf.extend_from_slice(&self.owner.to_le_bytes());
        buf
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != WIRE_REF_LEN {
            return Err(Error::channel(format!(
                "interface reference must be {} bytes, got {}",
                WIRE_REF_LEN,
                data.len()
            )));
        }
        let mut object = [0u8; 8];
        let mut owner = [0u8; 8];
        object.copy_from_slice(&data[..8]);
        owner.copy_from_slice(&data[8..]);
        Ok(Self {
            object: u64::from_le_bytes(object),
            owner: u64::from_le_bytes(owner),
        })
    }
}

/// Encode hook: `Some(payload)` when the value belongs to this tag.
pub type Encoder = Arc<dyn Fn(&Value, PeerId) -> Result<Option<Vec<u8>>> + Send + Sync>;

/// Decode hook: rebuild a value from a payload received through `via`.
pub type Decoder = Arc<dyn Fn(&[u8], &ChannelRef) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
struct Translation {
    encode: Encoder,
    decode: Decoder,
}

/// Extension tags mapped to encode/decode hooks.
#[derive(Clone, Default)]
pub struct TranslationTable {
    entries: BTreeMap<u8, Translation>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<E, D>(&mut self, tag: u8, encode: E, decode: D)
    where
        E: Fn(&Value, PeerId) -> Result<Option<Vec<u8>>> + Send + Sync + 'static,
        D: Fn(&[u8], &ChannelRef) -> Result<Value> + Send + Sync + 'static,
    {
        self.entries.insert(
            tag,
            Translation {
                encode: Arc::new(encode),
                decode: Arc::new(decode),
            },
        );
    }

    pub fn tags(&self) -> Vec<u8> {
        self.entries.keys().copied().collect()
    }

    /// Extension payload for `value`, if some tag claims it.
    pub fn encode_ext(&self, value: &Value, recipient: PeerId) -> Result<Option<Value>> {
        for (tag, entry) in &self.entries {
            if let Some(data) = (entry.encode)(value, recipient)? {
                return Ok(Some(Value::Ext { tag: *tag, data }));
            }
        }
        Ok(None)
    }

    /// Value for an extension payload; unknown tags are left as they are.
    pub fn decode_ext(&self, tag: u8, data: Vec<u8>, via: &ChannelRef) -> Result<Value> {
        match self.entries.get(&tag) {
            Some(entry) => (entry.decode)(&data, via),
            None => Ok(Value::Ext { tag, data }),
        }
    }

    /// Marshal `value` into codec-ready shape for `recipient`.
    ///
    /// Pending values, bare functions and objects cannot cross; callers
    /// resolve or wrap them first.
    pub fn encode_value(&self, value: Value, recipient: PeerId) -> Result<Value> {
        Ok(match value {
            Value::Interface(_) => self
                .encode_ext(&value, recipient)?
                .ok_or_else(|| Error::channel(format!("no translation for {}", value)))?,
            Value::Struct(s) => {
                let mut out = BTreeMap::new();
                for (id, field) in s.slots() {
                    out.insert(Key::Id(*id), self.encode_value(field.clone(), recipient)?);
                }
                Value::Map(out)
            }
            Value::List(list) => Value::Tuple(self.encode_all(list.into_items(), recipient)?),
            Value::Tuple(items) => Value::Tuple(self.encode_all(items, recipient)?),
            Value::Map(entries) => {
                let mut out = BTreeMap::new();
                for (key, entry) in entries {
                    out.insert(key, self.encode_value(entry, recipient)?);
                }
                Value::Map(out)
            }
            Value::Enum(e) => Value::Uint16(e.ordinal()),
            Value::Pending(_) | Value::Function(_) | Value::Object(_) | Value::Descriptor(_) => {
                return Err(Error::channel(format!(
                    "cannot marshal {} value",
                    value.kind_name()
                )))
            }
            other => other,
        })
    }

    fn encode_all(&self, items: Vec<Value>, recipient: PeerId) -> Result<Vec<Value>> {
        items
            .into_iter()
            .map(|item| self.encode_value(item, recipient))
            .collect()
    }

    /// Unmarshal a codec value received through `via`.
    pub fn decode_value(&self, value: Value, via: &ChannelRef) -> Result<Value> {
        Ok(match value {
            Value::Ext { tag, data } => self.decode_ext(tag, data, via)?,
            Value::Tuple(items) => Value::Tuple(
                items
                    .into_iter()
                    .map(|item| self.decode_value(item, via))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(entries) => {
                let mut out = BTreeMap::new();
                for (key, entry) in entries {
                    out.insert(key, self.decode_value(entry, via)?);
                }
                Value::Map(out)
            }
            other => other,
        })
    }
}
