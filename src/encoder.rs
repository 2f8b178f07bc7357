// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::EncodeError;
use crate::representation::{size_update, ReprEncoder};
use crate::table::{DynamicTable, HeaderField};

/// Encoder implementation of [HPACK].
///
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// A `HpackEncoder` owns the encoding side of a compression context. Its
/// dynamic table mirrors the peer decoder's table: every representation the
/// encoder emits drives both tables through the same transitions, so the
/// contexts stay converged block after block.
///
/// # Examples
/// ```
/// use ylong_hpack::{HeaderField, HpackEncoder};
///
/// let mut encoder = HpackEncoder::with_max_size(4096);
/// let bytes = encoder
///     .encode(&[HeaderField::new(":method", "GET")])
///     .unwrap();
/// assert_eq!(bytes, [0x82]);
/// ```
pub struct HpackEncoder {
    pub(crate) table: DynamicTable,
    use_huffman: bool,
    pending_size_update: Option<PendingSizeUpdate>,
}

/// Table size changes that still have to be announced on the wire. When the
/// table is resized several times between two header blocks, RFC7541-4.2
/// only requires signalling the smallest intermediate size and the final
/// size, which is why a decoder accepts up to two updates in a row.
struct PendingSizeUpdate {
    smallest: usize,
    latest: usize,
}

impl HpackEncoder {
    /// Creates a `HpackEncoder` with the given max dynamic table size and
    /// Huffman usage.
    pub fn new(max_size: usize, use_huffman: bool) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_size),
            use_huffman,
            pending_size_update: None,
        }
    }

    /// Creates a `HpackEncoder` with the given max dynamic table size and
    /// the default string policy, which is to Huffman-encode every string
    /// literal.
    pub fn with_max_size(max_size: usize) -> Self {
        Self::new(max_size, true)
    }

    /// Encodes a header list into one header block fragment. Fields that
    /// miss the table are emitted with incremental indexing and inserted,
    /// so later occurrences compress to a single index.
    pub fn encode(&mut self, fields: &[HeaderField]) -> Result<Vec<u8>, EncodeError> {
        let mut dst = Vec::new();
        self.announce_size_update(&mut dst);
        ReprEncoder::new(&mut self.table).encode(fields, &mut dst, self.use_huffman);
        Ok(dst)
    }

    /// Encodes a header list of sensitive fields into one header block
    /// fragment, using the never-indexed literal form of
    /// `RFC7541 section-6.2.3`. The fields stay out of the dynamic table
    /// and intermediaries must keep them literal when re-encoding.
    pub fn encode_sensitive(&mut self, fields: &[HeaderField]) -> Result<Vec<u8>, EncodeError> {
        let mut dst = Vec::new();
        self.announce_size_update(&mut dst);
        ReprEncoder::new(&mut self.table).encode_never_indexed(fields, &mut dst, self.use_huffman);
        Ok(dst)
    }

    /// Updates the maximum size of the dynamic table, evicting entries as
    /// needed. The change is announced through size update instructions at
    /// the beginning of the next encoded block, as RFC7541-4.2 requires.
    pub fn update_table_size(&mut self, max_size: usize) {
        self.table.update_size(max_size);
        self.pending_size_update = Some(match self.pending_size_update.take() {
            Some(pending) => PendingSizeUpdate {
                smallest: pending.smallest.min(max_size),
                latest: max_size,
            },
            None => PendingSizeUpdate {
                smallest: max_size,
                latest: max_size,
            },
        });
    }

    /// Returns the total size of the dynamic table entries.
    pub fn table_size(&self) -> usize {
        self.table.curr_size()
    }

    fn announce_size_update(&mut self, dst: &mut Vec<u8>) {
        if let Some(pending) = self.pending_size_update.take() {
            size_update(pending.smallest, dst);
            if pending.latest != pending.smallest {
                size_update(pending.latest, dst);
            }
        }
    }
}
