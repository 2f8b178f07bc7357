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

//! Errors that may occur in this crate.
//!
//! Both error kinds are terminal for the current header block: any error
//! aborts the operation immediately and the caller is expected to treat it
//! as a `COMPRESSION_ERROR` at the HTTP/2 layer.

use core::fmt::{Debug, Display, Formatter};
use std::error::Error;

/// Errors that may occur when using this crate.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum HpackError {
    /// Errors produced while decoding a header block fragment.
    Decode(DecodeError),

    /// Errors produced while encoding a header list.
    Encode(EncodeError),
}

impl From<DecodeError> for HpackError {
    fn from(err: DecodeError) -> Self {
        HpackError::Decode(err)
    }
}

impl From<EncodeError> for HpackError {
    fn from(err: EncodeError) -> Self {
        HpackError::Encode(err)
    }
}

impl Display for HpackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for HpackError {}

/// Errors that may occur when decoding a header block fragment.
///
/// Decompression is deterministic and nothing is recovered locally. Table
/// mutations applied before the error are retained because they mirror the
/// encoder's view of the dynamic table, which cannot be rewound.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum DecodeError {
    /// The input ended in the middle of an integer, a string literal or a
    /// representation.
    Truncated,

    /// An indexed representation referenced index 0 or an index beyond the
    /// end of the combined static and dynamic address space.
    InvalidIndex,

    /// A Huffman-encoded string literal contained an invalid code, decoded
    /// the `EOS` symbol, or ended with padding that is not a prefix of
    /// `EOS`.
    InvalidHuffmanCode,

    /// A variable-length integer did not fit the supported range.
    IntegerOverflow,

    /// A dynamic table size update appeared after the first field
    /// representation of the block, or more than two appeared in a row.
    InvalidSizeUpdate,

    /// A dynamic table size update exceeded the limit advertised through
    /// `SETTINGS_HEADER_TABLE_SIZE`.
    SizeUpdateExceedsLimit,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for DecodeError {}

/// Errors that may occur when encoding a header list.
///
/// Every header list currently encodes successfully, so this type has no
/// variants yet. It exists so that a future caller-imposed limit (for
/// example an output size cap) can fail without changing the signature of
/// [`HpackEncoder::encode`].
///
/// [`HpackEncoder::encode`]: crate::HpackEncoder::encode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum EncodeError {}

impl Display for EncodeError {
    fn fmt(&self, _f: &mut Formatter<'_>) -> core::fmt::Result {
        match *self {}
    }
}

impl Error for EncodeError {}
