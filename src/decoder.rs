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

use crate::error::DecodeError;
use crate::representation::{Name, ReprDecoder, Representation};
use crate::table::{DynamicTable, HeaderField, TableSearcher};

/// Decoder implementation of [HPACK].
///
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// A `HpackDecoder` owns the decoding side of a compression context: the
/// dynamic table and the limit the peer advertised through
/// `SETTINGS_HEADER_TABLE_SIZE`. One complete header block fragment is
/// decoded per call.
///
/// # Examples
/// ```
/// use ylong_hpack::HpackDecoder;
///
/// let mut decoder = HpackDecoder::with_max_size(4096);
/// let fields = decoder.decode(&[0x82]).unwrap();
/// assert_eq!(fields[0].name(), b":method");
/// assert_eq!(fields[0].value(), b"GET");
/// ```
pub struct HpackDecoder {
    pub(crate) table: DynamicTable,
    settings_limit: Option<usize>,
}

impl HpackDecoder {
    /// Creates a `HpackDecoder` whose dynamic table is bounded by the given
    /// max size.
    pub fn with_max_size(header_table_size: usize) -> Self {
        Self {
            table: DynamicTable::with_max_size(header_table_size),
            settings_limit: None,
        }
    }

    /// Updates the limit advertised to the peer through
    /// `SETTINGS_HEADER_TABLE_SIZE`. Subsequent dynamic table size updates
    /// above the limit are decoding errors; `None` removes the bound.
    pub fn update_settings_limit(&mut self, settings_limit: Option<usize>) {
        self.settings_limit = settings_limit;
    }

    /// Updates the maximum size of the dynamic table directly, evicting
    /// entries as needed. The stored settings limit still applies.
    pub fn update_table_size(&mut self, max_size: usize) -> Result<(), DecodeError> {
        self.table.resize(max_size, self.settings_limit)
    }

    /// Returns the total size of the dynamic table entries.
    pub fn table_size(&self) -> usize {
        self.table.curr_size()
    }

    /// Decodes one complete header block fragment and returns the header
    /// fields in the order their representations appear on the wire.
    ///
    /// Any error aborts the block: the fields decoded so far are discarded,
    /// while table mutations already applied are retained, since they match
    /// the encoder's view of the table.
    pub fn decode(&mut self, buf: &[u8]) -> Result<Vec<HeaderField>, DecodeError> {
        let settings_limit = self.settings_limit;
        let mut decoder = ReprDecoder::new(buf);
        let mut updater = Updater::new(&mut self.table, settings_limit);
        let mut stage = BlockStage::Start;

        loop {
            match decoder.decode()? {
                Some(repr) => {
                    stage = stage.next(&repr)?;
                    updater.update(repr)?;
                }
                None => return Ok(updater.finish()),
            }
        }
    }
}

/// Decoding position inside a header block. RFC7541-4.2: dynamic table size
/// updates must occur at the beginning of the block, before any field
/// representation, and at most two in a row are meaningful (the smallest
/// intermediate size and the final size).
enum BlockStage {
    Start,
    AfterSizeUpdate(u8),
    Fields,
}

impl BlockStage {
    fn next(self, repr: &Representation) -> Result<Self, DecodeError> {
        match (repr, self) {
            (Representation::SizeUpdate { .. }, BlockStage::Start) => {
                Ok(BlockStage::AfterSizeUpdate(1))
            }
            (Representation::SizeUpdate { .. }, BlockStage::AfterSizeUpdate(n)) if n < 2 => {
                Ok(BlockStage::AfterSizeUpdate(n + 1))
            }
            (Representation::SizeUpdate { .. }, _) => Err(DecodeError::InvalidSizeUpdate),
            _ => Ok(BlockStage::Fields),
        }
    }
}

/// `Updater` applies each decoded `Representation` to the dynamic table and
/// to the header list under construction.
struct Updater<'a> {
    table: &'a mut DynamicTable,
    settings_limit: Option<usize>,
    fields: Vec<HeaderField>,
}

impl<'a> Updater<'a> {
    fn new(table: &'a mut DynamicTable, settings_limit: Option<usize>) -> Self {
        Self {
            table,
            settings_limit,
            fields: Vec::new(),
        }
    }

    fn update(&mut self, repr: Representation) -> Result<(), DecodeError> {
        match repr {
            Representation::Indexed { index } => self.update_indexed(index),
            Representation::LiteralWithIndexing { name, value } => {
                self.update_literal_with_indexing(name, value)
            }
            Representation::LiteralWithoutIndexing { name, value } => {
                self.update_literal_without_indexing(name, value)
            }
            // The never-indexed form only differs for intermediaries that
            // re-encode the field; on decode it behaves like the
            // without-indexing form.
            Representation::LiteralNeverIndexed { name, value } => {
                self.update_literal_without_indexing(name, value)
            }
            Representation::SizeUpdate { max_size } => {
                self.table.resize(max_size, self.settings_limit)
            }
        }
    }

    fn finish(self) -> Vec<HeaderField> {
        self.fields
    }

    fn update_indexed(&mut self, index: usize) -> Result<(), DecodeError> {
        let searcher = TableSearcher::new(self.table);
        let field = searcher
            .search_field(index)
            .ok_or(DecodeError::InvalidIndex)?;
        self.fields.push(field);
        Ok(())
    }

    fn update_literal_with_indexing(
        &mut self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<(), DecodeError> {
        let field = self.field_by_name_and_value(name, value)?;
        self.table.update(field.clone());
        self.fields.push(field);
        Ok(())
    }

    fn update_literal_without_indexing(
        &mut self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<(), DecodeError> {
        let field = self.field_by_name_and_value(name, value)?;
        self.fields.push(field);
        Ok(())
    }

    fn field_by_name_and_value(
        &self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<HeaderField, DecodeError> {
        let name = match name {
            Name::Index(index) => {
                let searcher = TableSearcher::new(self.table);
                searcher
                    .search_field_name(index)
                    .ok_or(DecodeError::InvalidIndex)?
            }
            Name::Literal(octets) => octets,
        };
        Ok(HeaderField::new(name, value))
    }
}
