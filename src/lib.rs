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

//! `ylong_hpack` implements [HPACK], the header compression format of the
//! [HTTP/2 protocol].
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [HTTP/2 protocol]: https://httpwg.org/specs/rfc9113.html
//!
//! # Introduction
//! HPACK compresses and decompresses ordered lists of header fields against
//! a shared compression context: a fixed static table of common header
//! fields, a per-peer dynamic table populated as blocks are processed, and
//! a static Huffman code for string literals. The format eliminates
//! redundant header fields, limits vulnerability to known security attacks,
//! and has a bounded memory requirement for use in constrained
//! environments.
//!
//! This crate provides the pure codec: [`HpackEncoder`] turns a header list
//! into a header block fragment, [`HpackDecoder`] turns a header block
//! fragment back into a header list, and each owns its side of the
//! compression context. Carrying the fragments between peers, serialising
//! access per connection and reacting to decode failures (a
//! `COMPRESSION_ERROR` at the HTTP/2 layer) are left to the caller.
//!
//! # Examples
//! ```
//! use ylong_hpack::{HeaderField, HpackDecoder, HpackEncoder};
//!
//! let mut encoder = HpackEncoder::with_max_size(4096);
//! let mut decoder = HpackDecoder::with_max_size(4096);
//!
//! let fields = vec![
//!     HeaderField::new(":method", "GET"),
//!     HeaderField::new(":path", "/"),
//! ];
//! let bytes = encoder.encode(&fields).unwrap();
//! assert_eq!(decoder.decode(&bytes).unwrap(), fields);
//! ```

mod decoder;
mod encoder;
mod error;
mod huffman;
mod integer;
mod representation;
mod table;

pub(crate) mod util;

pub use decoder::HpackDecoder;
pub use encoder::HpackEncoder;
pub use error::{DecodeError, EncodeError, HpackError};
pub use table::HeaderField;
