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
use crate::huffman::huffman_decode;
use crate::integer::IntegerDecoder;
use crate::representation::{Name, PrefixBit, Representation};

/// Decoder implementation for representations. Each call to `decode` parses
/// one `Representation` from the front of the buffer, or returns `None`
/// once the buffer is exhausted.
///
/// A header block fragment is decoded as a unit, so a buffer that ends in
/// the middle of a representation is malformed and reported as
/// [`DecodeError::Truncated`].
pub(crate) struct ReprDecoder<'a> {
    buf: &'a [u8],
}

impl<'a> ReprDecoder<'a> {
    /// Creates a new `ReprDecoder` over the given byte stream.
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Decodes the next `Representation` of the byte stream.
    pub(crate) fn decode(&mut self) -> Result<Option<Representation>, DecodeError> {
        let byte = match self.next_byte() {
            Some(byte) => byte,
            None => return Ok(None),
        };

        let repr = PrefixBit::from_u8(byte);
        let mask = repr.prefix_index_mask();
        let index = self.decode_integer(byte, mask.0)?;

        match repr {
            PrefixBit::INDEXED => {
                // RFC7541-6.1: the index value of 0 is not used. It MUST be
                // treated as a decoding error if found in an indexed header
                // field representation.
                if index == 0 {
                    return Err(DecodeError::InvalidIndex);
                }
                Ok(Some(Representation::Indexed { index }))
            }
            PrefixBit::SIZE_UPDATE => Ok(Some(Representation::SizeUpdate { max_size: index })),
            _ => {
                // An index of 0 selects the new-name sub-form: the name is a
                // string literal instead of a table reference.
                let name = match index {
                    0 => Name::Literal(self.decode_string()?),
                    _ => Name::Index(index),
                };
                let value = self.decode_string()?;
                Ok(Some(match repr {
                    PrefixBit::LITERAL_WITH_INDEXING => {
                        Representation::LiteralWithIndexing { name, value }
                    }
                    PrefixBit::LITERAL_NEVER_INDEXED => {
                        Representation::LiteralNeverIndexed { name, value }
                    }
                    _ => Representation::LiteralWithoutIndexing { name, value },
                }))
            }
        }
    }

    /// Consumes the next byte of the byte stream.
    fn next_byte(&mut self) -> Option<u8> {
        let (byte, rest) = self.buf.split_first()?;
        self.buf = rest;
        Some(*byte)
    }

    /// Decodes an integer whose prefix occupies the given first byte under
    /// the given mask, consuming continuation bytes as needed.
    fn decode_integer(&mut self, first: u8, mask: u8) -> Result<usize, DecodeError> {
        let mut int = match IntegerDecoder::first_byte(first, mask) {
            Ok(index) => return Ok(index),
            Err(int) => int,
        };
        loop {
            let byte = self.next_byte().ok_or(DecodeError::Truncated)?;
            if let Some(index) = int.next_byte(byte)? {
                return Ok(index);
            }
        }
    }

    /// Decodes a string literal of `RFC7541 section-5.2`: a length-prefixed
    /// octet sequence whose high flag bit selects Huffman coding.
    fn decode_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        let first = self.next_byte().ok_or(DecodeError::Truncated)?;
        let huffman = (first & 0x80) == 0x80;
        let length = self.decode_integer(first, 0x7f)?;

        if self.buf.len() < length {
            return Err(DecodeError::Truncated);
        }
        let (payload, rest) = self.buf.split_at(length);
        self.buf = rest;

        if huffman {
            let mut octets = Vec::with_capacity(length);
            huffman_decode(payload, &mut octets)
                .map_err(|_| DecodeError::InvalidHuffmanCode)?;
            Ok(octets)
        } else {
            Ok(payload.to_vec())
        }
    }
}

#[cfg(test)]
mod ut_repr_decoder {
    use super::*;
    use crate::util::test_util::decode;

    /// UT test cases for `ReprDecoder`.
    ///
    /// # Brief
    /// 1. Creates a `ReprDecoder`.
    /// 2. Calls `ReprDecoder::decode()` function, passing in the specified
    ///    parameters.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_repr_decoder() {
        rfc7541_test_cases();

        macro_rules! inner_test_case {
            ($decoder: expr, SizeUpdate => $max: expr) => {
                match $decoder.decode() {
                    Ok(Some(Representation::SizeUpdate { max_size })) => {
                        assert_eq!($max, max_size)
                    }
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
            ($decoder: expr, $pat: ident => $name: expr) => {
                match $decoder.decode() {
                    Ok(Some(Representation::$pat { index })) => assert_eq!($name, index),
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
            ($decoder: expr, $pat: ident, $kind: ident => $name: expr, $value: expr) => {
                match $decoder.decode() {
                    Ok(Some(Representation::$pat {
                        name: Name::$kind(n),
                        value: v,
                    })) => {
                        assert_eq!($name, n);
                        assert_eq!($value, v);
                    }
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
        }

        macro_rules! repr_test_case {
            ($octets: literal, $({ $pat: ident $(, $kind: ident)? => $first: expr $(, $second: expr)?} $(,)?)*) => {
                let slice = decode($octets).unwrap();
                let mut decoder = ReprDecoder::new(&slice);
                $(
                    inner_test_case!(decoder, $pat $(, $kind)? => $first $(, $second)?);
                )*
                match decoder.decode() {
                    Ok(None) => {}
                    _ => panic!("ReprDecoder::decode() should have exhausted the buffer!"),
                }
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.2.1. Literal Header Field with Indexing
            repr_test_case!(
                "400a637573746f6d2d6b65790d637573746f6d2d686561646572",
                { LiteralWithIndexing, Literal => b"custom-key".to_vec(), b"custom-header".to_vec() }
            );

            // C.2.2. Literal Header Field without Indexing
            repr_test_case!(
                "040c2f73616d706c652f70617468",
                { LiteralWithoutIndexing, Index => 4, b"/sample/path".to_vec() }
            );

            // C.2.3. Literal Header Field Never Indexed
            repr_test_case!(
                "100870617373776f726406736563726574",
                { LiteralNeverIndexed, Literal => b"password".to_vec(), b"secret".to_vec() }
            );

            // C.2.4. Indexed Header Field
            repr_test_case!(
                "82",
                { Indexed => 2 }
            );

            // C.3.1. First Request
            repr_test_case!(
                "828684410f7777772e6578616d706c652e636f6d",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { LiteralWithIndexing, Index => 1, b"www.example.com".to_vec() }
            );

            // C.3.2. Second Request
            repr_test_case!(
                "828684be58086e6f2d6361636865",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { Indexed => 62 },
                { LiteralWithIndexing, Index => 24, b"no-cache".to_vec() }
            );

            // C.4.1. First Request
            repr_test_case!(
                "828684418cf1e3c2e5f23a6ba0ab90f4ff",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { LiteralWithIndexing, Index => 1, b"www.example.com".to_vec() }
            );

            // C.4.3. Third Request
            repr_test_case!(
                "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf",
                { Indexed => 2 },
                { Indexed => 7 },
                { Indexed => 5 },
                { Indexed => 63 },
                { LiteralWithIndexing, Literal => b"custom-key".to_vec(), b"custom-value".to_vec() }
            );

            // C.5.1. First Response
            repr_test_case!(
                "4803333032580770726976617465611d\
                4d6f6e2c203231204f63742032303133\
                2032303a31333a323120474d546e1768\
                747470733a2f2f7777772e6578616d70\
                6c652e636f6d",
                { LiteralWithIndexing, Index => 8, b"302".to_vec() },
                { LiteralWithIndexing, Index => 24, b"private".to_vec() },
                { LiteralWithIndexing, Index => 33, b"Mon, 21 Oct 2013 20:13:21 GMT".to_vec() },
                { LiteralWithIndexing, Index => 46, b"https://www.example.com".to_vec() }
            );

            // C.6.2. Second Response
            repr_test_case!(
                "4883640effc1c0bf",
                { LiteralWithIndexing, Index => 8, b"307".to_vec() },
                { Indexed => 65 },
                { Indexed => 64 },
                { Indexed => 63 }
            );

            // A dynamic table size update of 1337 followed by an indexed
            // field.
            repr_test_case!(
                "3f9a0a82",
                { SizeUpdate => 1337 },
                { Indexed => 2 }
            );
        }
    }

    /// UT test cases for `ReprDecoder` error handling.
    ///
    /// # Brief
    /// 1. Calls `ReprDecoder::decode()` on inputs that are cut short in each
    ///    structural position, reference index 0, or carry a bad Huffman
    ///    string.
    /// 2. Checks that each input is rejected with the right error.
    #[test]
    fn ut_repr_decoder_invalid() {
        macro_rules! invalid_test_case {
            ($octets: literal, $err: ident) => {
                let slice = decode($octets).unwrap();
                let mut decoder = ReprDecoder::new(&slice);
                let result;
                loop {
                    match decoder.decode() {
                        Ok(Some(_)) => continue,
                        other => {
                            result = other;
                            break;
                        }
                    }
                }
                match result {
                    Err(DecodeError::$err) => {}
                    _ => panic!("ReprDecoder::decode() should have failed!"),
                }
            };
        }

        // An indexed representation referencing index 0.
        invalid_test_case!("80", InvalidIndex);
        // An integer cut off in the middle of its continuation bytes.
        invalid_test_case!("1f", Truncated);
        // A value string shorter than its length prefix claims.
        invalid_test_case!("010203", Truncated);
        // A name string cut off after the length prefix.
        invalid_test_case!("400a6375", Truncated);
        // A Huffman value whose padding bits are not all ones.
        invalid_test_case!("018100", InvalidHuffmanCode);
        // An integer whose continuation bytes overflow the supported range.
        invalid_test_case!("7fffffffffffffffffffff7f", IntegerOverflow);
    }
}
