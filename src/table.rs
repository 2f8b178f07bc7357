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

//! [Indexing table] implementation of [HPACK].
//!
//! [Indexing table]: https://httpwg.org/specs/rfc7541.html#indexing.tables
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! HPACK uses two tables for associating header fields to indexes. The
//! static table is predefined and contains common header fields. The dynamic
//! table is updated as a connection proceeds.
//!
//! The two tables share a single address space. Indexes between 1 and 61
//! refer to entries of the static table, indexes strictly greater than 61
//! refer to entries of the dynamic table, 62 being its newest entry.

use std::collections::VecDeque;

use crate::error::DecodeError;

/// A header field as carried by this codec: an ordered pair of octet
/// strings. The codec preserves the octets verbatim and never normalises
/// them; header semantics belong to the protocol layer above.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderField {
    name: Vec<u8>,
    value: Vec<u8>,
}

impl HeaderField {
    /// Creates a `HeaderField` from a name and a value.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the name octets.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Returns the value octets.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the size of the field as defined by `RFC7541 section-4.1`.
    ///
    /// The additional 32 octets account for an estimated overhead associated
    /// with a dynamic table entry; they are part of the wire contract.
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + 32
    }
}

/// Search result of a [`TableSearcher`] operation: the lowest index whose
/// entry matches both name and value, or failing that, the lowest index
/// whose entry matches the name only.
pub(crate) enum TableIndex {
    Field(usize),
    FieldName(usize),
}

/// `TableSearcher` is used to find specified content in the combined
/// address space of the static and dynamic tables.
pub(crate) struct TableSearcher<'a> {
    dynamic: &'a DynamicTable,
}

impl<'a> TableSearcher<'a> {
    pub(crate) fn new(dynamic: &'a DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Searches the field name at the given index. Index 0 is not part of
    /// the address space.
    pub(crate) fn search_field_name(&self, index: usize) -> Option<Vec<u8>> {
        match index {
            0 => None,
            _ if index <= StaticTable::SIZE => {
                StaticTable::field_name(index).map(<[u8]>::to_vec)
            }
            _ => self.dynamic.field_name(index - StaticTable::SIZE - 1),
        }
    }

    /// Searches the whole field at the given index. Index 0 is not part of
    /// the address space.
    pub(crate) fn search_field(&self, index: usize) -> Option<HeaderField> {
        match index {
            0 => None,
            _ if index <= StaticTable::SIZE => {
                StaticTable::field(index).map(|(n, v)| HeaderField::new(n, v))
            }
            _ => self.dynamic.field(index - StaticTable::SIZE - 1),
        }
    }

    /// Searches the lowest index matching the given name and value. A full
    /// match anywhere takes precedence over a name-only match anywhere; the
    /// static table occupies the low addresses and therefore wins ties.
    pub(crate) fn index(&self, name: &[u8], value: &[u8]) -> Option<TableIndex> {
        match (
            StaticTable::index(name, value),
            self.dynamic.index(name, value),
        ) {
            (x @ Some(TableIndex::Field(_)), _) => x,
            (_, Some(TableIndex::Field(i))) => Some(TableIndex::Field(i + StaticTable::SIZE + 1)),
            (x @ Some(TableIndex::FieldName(_)), _) => x,
            (_, Some(TableIndex::FieldName(i))) => {
                Some(TableIndex::FieldName(i + StaticTable::SIZE + 1))
            }
            _ => None,
        }
    }
}

/// The [`Dynamic Table`][dynamic_table] implementation of [HPACK].
///
/// [dynamic_table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The dynamic table consists of a list of header fields maintained in
/// first-in, first-out order. The first and newest entry of the dynamic
/// table is at the lowest index, and the oldest entry is at the highest
/// index. The table is initially empty, may contain duplicate entries, and
/// is bounded in size: inserting causes evictions from the oldest end until
/// the size invariant holds again.
pub(crate) struct DynamicTable {
    queue: VecDeque<HeaderField>,
    curr_size: usize,
    max_size: usize,
}

impl DynamicTable {
    /// Creates a `DynamicTable` based on the size limit.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            curr_size: 0,
            max_size,
        }
    }

    pub(crate) fn curr_size(&self) -> usize {
        self.curr_size
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    /// Gets the field name at the given front-relative position.
    pub(crate) fn field_name(&self, index: usize) -> Option<Vec<u8>> {
        self.queue.get(index).map(|f| f.name.clone())
    }

    /// Gets the whole field at the given front-relative position.
    pub(crate) fn field(&self, index: usize) -> Option<HeaderField> {
        self.queue.get(index).cloned()
    }

    /// Inserts a field at the front of the table, then evicts from the back
    /// until the size invariant holds.
    ///
    /// RFC7541-4.4: a field larger than the maximum size empties the table
    /// and is itself not inserted; this is not an error. Pushing first and
    /// evicting afterwards produces exactly that outcome.
    pub(crate) fn update(&mut self, field: HeaderField) {
        self.curr_size += field.size();
        self.queue.push_front(field);
        self.fit_size();
    }

    /// Updates the maximum size of the table, evicting entries as needed.
    pub(crate) fn update_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.fit_size();
    }

    /// Updates the maximum size of the table, first checking the new size
    /// against the limit advertised by the peer through
    /// `SETTINGS_HEADER_TABLE_SIZE`. `None` means no external bound.
    pub(crate) fn resize(
        &mut self,
        max_size: usize,
        settings_limit: Option<usize>,
    ) -> Result<(), DecodeError> {
        if let Some(limit) = settings_limit {
            if max_size > limit {
                return Err(DecodeError::SizeUpdateExceedsLimit);
            }
        }
        self.update_size(max_size);
        Ok(())
    }

    /// Adjusts dynamic table content to fit its size.
    fn fit_size(&mut self) {
        while self.curr_size > self.max_size && !self.queue.is_empty() {
            if let Some(evicted) = self.queue.pop_back() {
                self.curr_size -= evicted.size();
            }
        }
    }

    /// Tries to get the front-relative position of a field. An exact match
    /// is returned as soon as it is found; the most recent name-only match
    /// is kept as a fallback.
    fn index(&self, name: &[u8], value: &[u8]) -> Option<TableIndex> {
        let mut index = None;
        for (n, field) in self.queue.iter().enumerate() {
            match (field.name == name, field.value == value, &index) {
                (true, true, _) => return Some(TableIndex::Field(n)),
                (true, false, None) => index = Some(TableIndex::FieldName(n)),
                _ => {}
            }
        }
        index
    }
}

/// The [`Static Table`][static_table] implementation of [HPACK].
///
/// [static_table]: https://httpwg.org/specs/rfc7541.html#static.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The static table consists of a predefined, immutable list of 61 common
/// header fields, addressed 1 through 61. The entries must reproduce
/// `RFC7541 Appendix A` octet for octet.
pub(crate) struct StaticTable;

impl StaticTable {
    /// Number of entries in the static table.
    pub(crate) const SIZE: usize = 61;

    #[rustfmt::skip]
    const ENTRIES: [(&'static [u8], &'static [u8]); Self::SIZE] = [
        (b":authority", b""),
        (b":method", b"GET"),
        (b":method", b"POST"),
        (b":path", b"/"),
        (b":path", b"/index.html"),
        (b":scheme", b"http"),
        (b":scheme", b"https"),
        (b":status", b"200"),
        (b":status", b"204"),
        (b":status", b"206"),
        (b":status", b"304"),
        (b":status", b"400"),
        (b":status", b"404"),
        (b":status", b"500"),
        (b"accept-charset", b""),
        (b"accept-encoding", b"gzip, deflate"),
        (b"accept-language", b""),
        (b"accept-ranges", b""),
        (b"accept", b""),
        (b"access-control-allow-origin", b""),
        (b"age", b""),
        (b"allow", b""),
        (b"authorization", b""),
        (b"cache-control", b""),
        (b"content-disposition", b""),
        (b"content-encoding", b""),
        (b"content-language", b""),
        (b"content-length", b""),
        (b"content-location", b""),
        (b"content-range", b""),
        (b"content-type", b""),
        (b"cookie", b""),
        (b"date", b""),
        (b"etag", b""),
        (b"expect", b""),
        (b"expires", b""),
        (b"from", b""),
        (b"host", b""),
        (b"if-match", b""),
        (b"if-modified-since", b""),
        (b"if-none-match", b""),
        (b"if-range", b""),
        (b"if-unmodified-since", b""),
        (b"last-modified", b""),
        (b"link", b""),
        (b"location", b""),
        (b"max-forwards", b""),
        (b"proxy-authenticate", b""),
        (b"proxy-authorization", b""),
        (b"range", b""),
        (b"referer", b""),
        (b"refresh", b""),
        (b"retry-after", b""),
        (b"server", b""),
        (b"set-cookie", b""),
        (b"strict-transport-security", b""),
        (b"transfer-encoding", b""),
        (b"user-agent", b""),
        (b"vary", b""),
        (b"via", b""),
        (b"www-authenticate", b""),
    ];

    /// Gets a field name by the given index, 1-based.
    fn field_name(index: usize) -> Option<&'static [u8]> {
        Self::field(index).map(|(name, _)| name)
    }

    /// Gets a field name and value by the given index, 1-based.
    fn field(index: usize) -> Option<(&'static [u8], &'static [u8])> {
        match index.checked_sub(1) {
            Some(idx) if idx < Self::SIZE => Some(Self::ENTRIES[idx]),
            _ => None,
        }
    }

    /// Tries to get the lowest index matching the given name and value.
    /// Names that occupy several entries dispatch on the value and fall back
    /// to their lowest index. The static table is pure ASCII, so octets
    /// that are not valid UTF-8 cannot match and the search is done on
    /// `str`.
    fn index(name: &[u8], value: &[u8]) -> Option<TableIndex> {
        let name = core::str::from_utf8(name).ok()?;
        let value = core::str::from_utf8(value).ok();
        match name {
            ":authority" => Some(TableIndex::FieldName(1)),
            ":method" => match value {
                Some("GET") => Some(TableIndex::Field(2)),
                Some("POST") => Some(TableIndex::Field(3)),
                _ => Some(TableIndex::FieldName(2)),
            },
            ":path" => match value {
                Some("/") => Some(TableIndex::Field(4)),
                Some("/index.html") => Some(TableIndex::Field(5)),
                _ => Some(TableIndex::FieldName(4)),
            },
            ":scheme" => match value {
                Some("http") => Some(TableIndex::Field(6)),
                Some("https") => Some(TableIndex::Field(7)),
                _ => Some(TableIndex::FieldName(6)),
            },
            ":status" => match value {
                Some("200") => Some(TableIndex::Field(8)),
                Some("204") => Some(TableIndex::Field(9)),
                Some("206") => Some(TableIndex::Field(10)),
                Some("304") => Some(TableIndex::Field(11)),
                Some("400") => Some(TableIndex::Field(12)),
                Some("404") => Some(TableIndex::Field(13)),
                Some("500") => Some(TableIndex::Field(14)),
                _ => Some(TableIndex::FieldName(8)),
            },
            "accept-charset" => Some(TableIndex::FieldName(15)),
            "accept-encoding" => match value {
                Some("gzip, deflate") => Some(TableIndex::Field(16)),
                _ => Some(TableIndex::FieldName(16)),
            },
            "accept-language" => Some(TableIndex::FieldName(17)),
            "accept-ranges" => Some(TableIndex::FieldName(18)),
            "accept" => Some(TableIndex::FieldName(19)),
            "access-control-allow-origin" => Some(TableIndex::FieldName(20)),
            "age" => Some(TableIndex::FieldName(21)),
            "allow" => Some(TableIndex::FieldName(22)),
            "authorization" => Some(TableIndex::FieldName(23)),
            "cache-control" => Some(TableIndex::FieldName(24)),
            "content-disposition" => Some(TableIndex::FieldName(25)),
            "content-encoding" => Some(TableIndex::FieldName(26)),
            "content-language" => Some(TableIndex::FieldName(27)),
            "content-length" => Some(TableIndex::FieldName(28)),
            "content-location" => Some(TableIndex::FieldName(29)),
            "content-range" => Some(TableIndex::FieldName(30)),
            "content-type" => Some(TableIndex::FieldName(31)),
            "cookie" => Some(TableIndex::FieldName(32)),
            "date" => Some(TableIndex::FieldName(33)),
            "etag" => Some(TableIndex::FieldName(34)),
            "expect" => Some(TableIndex::FieldName(35)),
            "expires" => Some(TableIndex::FieldName(36)),
            "from" => Some(TableIndex::FieldName(37)),
            "host" => Some(TableIndex::FieldName(38)),
            "if-match" => Some(TableIndex::FieldName(39)),
            "if-modified-since" => Some(TableIndex::FieldName(40)),
            "if-none-match" => Some(TableIndex::FieldName(41)),
            "if-range" => Some(TableIndex::FieldName(42)),
            "if-unmodified-since" => Some(TableIndex::FieldName(43)),
            "last-modified" => Some(TableIndex::FieldName(44)),
            "link" => Some(TableIndex::FieldName(45)),
            "location" => Some(TableIndex::FieldName(46)),
            "max-forwards" => Some(TableIndex::FieldName(47)),
            "proxy-authenticate" => Some(TableIndex::FieldName(48)),
            "proxy-authorization" => Some(TableIndex::FieldName(49)),
            "range" => Some(TableIndex::FieldName(50)),
            "referer" => Some(TableIndex::FieldName(51)),
            "refresh" => Some(TableIndex::FieldName(52)),
            "retry-after" => Some(TableIndex::FieldName(53)),
            "server" => Some(TableIndex::FieldName(54)),
            "set-cookie" => Some(TableIndex::FieldName(55)),
            "strict-transport-security" => Some(TableIndex::FieldName(56)),
            "transfer-encoding" => Some(TableIndex::FieldName(57)),
            "user-agent" => Some(TableIndex::FieldName(58)),
            "vary" => Some(TableIndex::FieldName(59)),
            "via" => Some(TableIndex::FieldName(60)),
            "www-authenticate" => Some(TableIndex::FieldName(61)),
            _ => None,
        }
    }
}
