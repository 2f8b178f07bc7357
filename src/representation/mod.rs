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

//! [Header Field Representation] implementation of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! An encoded header field can be represented either as an index or as a
//! literal. A literal representation carries the value literally and the
//! name either literally or as a table reference, and differs in whether the
//! decoded field enters the dynamic table: incremental indexing inserts it,
//! the without-indexing and never-indexed forms do not. The never-indexed
//! form additionally instructs intermediaries to keep the field literal
//! when re-encoding.
//!
//! A header block may also start with dynamic table size update
//! instructions, which carry no header field.
//!
//! Each representation is discriminated by the high-order bits of its first
//! octet; the remaining low-order bits start the first integer.

mod decoder;
mod encoder;

pub(crate) use decoder::ReprDecoder;
pub(crate) use encoder::{size_update, ReprEncoder};

/// The header field representations and the dynamic table size update
/// instruction of `RFC7541 section-6`, after the index/new-name sub-forms
/// have been folded into [`Name`].
pub(crate) enum Representation {
    /// An indexed header field refers to an entry of the combined address
    /// space and carries no literal octets.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// A literal header field with incremental indexing appends the field
    /// to the decoded header list and inserts it into the dynamic table.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// ```
    /// An index of 0 in the first octet signals the new-name sub-form, in
    /// which a name string literal precedes the value string literal.
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// A literal header field without indexing appends the field to the
    /// decoded header list and leaves the dynamic table untouched.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 0 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// ```
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// A literal header field never indexed behaves like the
    /// without-indexing form on decode; the distinct tag instructs
    /// intermediaries that the field must stay literal on every hop.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 1 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// ```
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// A dynamic table size update signals a change of the maximum size of
    /// the dynamic table. It may only appear at the beginning of a header
    /// block.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 |   Max size (5+)   |
    /// +---+---+---+-------------------+
    /// ```
    SizeUpdate { max_size: usize },
}

/// The high-order discriminating bits of the first octet of a
/// representation.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Creates a `PrefixBit` from the first octet of a representation.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    /// Returns the mask selecting the integer prefix bits that go with the
    /// current prefix bit.
    pub(crate) fn prefix_index_mask(&self) -> PrefixIndexMask {
        match self.0 {
            0x80 => PrefixIndexMask::INDEXED,
            0x40 => PrefixIndexMask::LITERAL_WITH_INDEXING,
            0x20 => PrefixIndexMask::SIZE_UPDATE,
            0x10 => PrefixIndexMask::LITERAL_NEVER_INDEXED,
            _ => PrefixIndexMask::LITERAL_WITHOUT_INDEXING,
        }
    }
}

/// The low-order bits of the first octet of a representation, which hold
/// the prefix of its first integer.
pub(crate) struct PrefixIndexMask(pub(crate) u8);

impl PrefixIndexMask {
    pub(crate) const INDEXED: Self = Self(0x7f);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x3f);
    pub(crate) const SIZE_UPDATE: Self = Self(0x1f);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x0f);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x0f);
}

/// Name of a literal representation. It is either a reference into the
/// combined table address space or a string literal; a table reference of 0
/// on the wire means the literal sub-form.
pub(crate) enum Name {
    Index(usize),
    Literal(Vec<u8>),
}
