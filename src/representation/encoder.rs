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

use crate::huffman::huffman_encode;
use crate::integer;
use crate::representation::PrefixIndexMask;
use crate::table::{DynamicTable, HeaderField, TableIndex, TableSearcher};

/// Encoder implementation for representations. Representations are appended
/// to a caller-supplied `Vec<u8>` in the order of the input fields.
pub(crate) struct ReprEncoder<'a> {
    table: &'a mut DynamicTable,
}

impl<'a> ReprEncoder<'a> {
    /// Creates a new `ReprEncoder` over the given dynamic table.
    pub(crate) fn new(table: &'a mut DynamicTable) -> Self {
        Self { table }
    }

    /// Encodes each field with the representation the table search selects:
    /// a full match becomes an indexed representation, anything else a
    /// literal with incremental indexing, which is also inserted into the
    /// dynamic table so that the encoder-side table tracks the decoder's.
    pub(crate) fn encode(&mut self, fields: &[HeaderField], dst: &mut Vec<u8>, use_huffman: bool) {
        for field in fields {
            let searcher = TableSearcher::new(self.table);
            match searcher.index(field.name(), field.value()) {
                Some(TableIndex::Field(index)) => indexed(index, dst),
                Some(TableIndex::FieldName(index)) => {
                    // The index refers to the table as the decoder sees it,
                    // before the field is inserted.
                    indexing(index, field.value(), use_huffman, dst);
                    self.table.update(field.clone());
                }
                None => {
                    indexing_with_name(field.name(), field.value(), use_huffman, dst);
                    self.table.update(field.clone());
                }
            }
        }
    }

    /// Encodes each field as a literal that is never indexed
    /// (`RFC7541 section-6.2.3`). The dynamic table is left untouched and
    /// intermediaries are instructed to keep the fields literal, which is
    /// the representation of choice for sensitive values. Table references
    /// are still used for the name when available.
    pub(crate) fn encode_never_indexed(
        &mut self,
        fields: &[HeaderField],
        dst: &mut Vec<u8>,
        use_huffman: bool,
    ) {
        for field in fields {
            let searcher = TableSearcher::new(self.table);
            match searcher.index(field.name(), field.value()) {
                Some(TableIndex::Field(index)) | Some(TableIndex::FieldName(index)) => {
                    never_indexed(index, field.value(), use_huffman, dst)
                }
                None => never_indexed_with_name(field.name(), field.value(), use_huffman, dst),
            }
        }
    }
}

/// Emits an indexed header field.
fn indexed(index: usize, dst: &mut Vec<u8>) {
    integer::encode(index, PrefixIndexMask::INDEXED.0, 0x80, dst);
}

/// Emits a literal with incremental indexing whose name is a table
/// reference.
fn indexing(index: usize, value: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    integer::encode(index, PrefixIndexMask::LITERAL_WITH_INDEXING.0, 0x40, dst);
    string_literal(value, use_huffman, dst);
}

/// Emits a literal with incremental indexing whose name is itself a string
/// literal.
fn indexing_with_name(name: &[u8], value: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    dst.push(0x40);
    string_literal(name, use_huffman, dst);
    string_literal(value, use_huffman, dst);
}

/// Emits a never-indexed literal whose name is a table reference.
fn never_indexed(index: usize, value: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    integer::encode(index, PrefixIndexMask::LITERAL_NEVER_INDEXED.0, 0x10, dst);
    string_literal(value, use_huffman, dst);
}

/// Emits a never-indexed literal whose name is itself a string literal.
fn never_indexed_with_name(name: &[u8], value: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    dst.push(0x10);
    string_literal(name, use_huffman, dst);
    string_literal(value, use_huffman, dst);
}

/// Emits a dynamic table size update instruction.
pub(crate) fn size_update(max_size: usize, dst: &mut Vec<u8>) {
    integer::encode(max_size, PrefixIndexMask::SIZE_UPDATE.0, 0x20, dst);
}

/// Emits a string literal of `RFC7541 section-5.2`.
fn string_literal(octets: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    if use_huffman {
        let mut encoded = Vec::with_capacity(octets.len());
        huffman_encode(octets, &mut encoded);
        integer::encode(encoded.len(), 0x7f, 0x80, dst);
        dst.extend_from_slice(&encoded);
    } else {
        integer::encode(octets.len(), 0x7f, 0x00, dst);
        dst.extend_from_slice(octets);
    }
}
