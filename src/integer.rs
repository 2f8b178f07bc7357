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

//! [Integer Representation] implementation of [HPACK].
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! Integers are used to represent name indexes, header field indexes, or
//! string lengths. An integer representation can start anywhere within an
//! octet. To allow for optimized processing, an integer representation always
//! finishes at the end of an octet.

use core::cmp::Ordering;

use crate::error::DecodeError;

/// `IntegerDecoder` implementation according to `Pseudocode to decode an
/// integer I` in `RFC7541 section-5.1`.
///
/// # Pseudocode
/// ```text
/// decode I from the next N bits
/// if I < 2^N - 1, return I
/// else
///     M = 0
///     repeat
///         B = next octet
///         I = I + (B & 127) * 2^M
///         M = M + 7
///     while B & 128 == 128
///     return I
/// ```
pub(crate) struct IntegerDecoder {
    index: usize,
    shift: u32,
}

impl IntegerDecoder {
    /// Calculates an integer based on the incoming first byte and mask.
    /// If no subsequent bytes exist, return the result directly, otherwise
    /// return the decoder itself.
    pub(crate) fn first_byte(byte: u8, mask: u8) -> Result<usize, Self> {
        let index = byte & mask;
        match index.cmp(&mask) {
            Ordering::Less => Ok(index as usize),
            _ => Err(Self {
                index: index as usize,
                shift: 0,
            }),
        }
    }

    /// Continues computing the integer based on the next byte of the input.
    /// Returns `Ok(Some(index))` if the result is obtained, otherwise returns
    /// `Ok(None)`, and returns `Err` in case of overflow.
    pub(crate) fn next_byte(&mut self, byte: u8) -> Result<Option<usize>, DecodeError> {
        self.index = 1usize
            .checked_shl(self.shift)
            .and_then(|pow| pow.checked_mul((byte & 0x7f) as usize))
            .and_then(|add| add.checked_add(self.index))
            .ok_or(DecodeError::IntegerOverflow)?;
        self.shift += 7;
        match (byte & 0x80) == 0x00 {
            true => Ok(Some(self.index)),
            false => Ok(None),
        }
    }
}

/// Integer encoding according to `Pseudocode to represent an integer I` in
/// `RFC7541 section-5.1`. The result is always the minimum-length byte
/// string for the given prefix.
///
/// # Pseudocode
/// ```text
/// if I < 2^N - 1, encode I on N bits
/// else
///     encode (2^N - 1) on N bits
///     I = I - (2^N - 1)
///     while I >= 128
///          encode (I % 128 + 128) on 8 bits
///          I = I / 128
///     encode I on 8 bits
/// ```
pub(crate) fn encode(mut i: usize, mask: u8, pre: u8, dst: &mut Vec<u8>) {
    if i < mask as usize {
        dst.push(pre | (i as u8));
        return;
    }
    dst.push(pre | mask);
    i -= mask as usize;
    while i >= 128 {
        dst.push((i & 0x7f) as u8 | 0x80);
        i >>= 7;
    }
    dst.push(i as u8);
}

#[cfg(test)]
mod ut_integer {
    use crate::integer::{encode, IntegerDecoder};

    /// UT test cases for `IntegerDecoder`.
    ///
    /// # Brief
    /// 1. Calls `IntegerDecoder::first_byte()` and
    ///    `IntegerDecoder::next_byte()`, passing in the specified parameters.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_integer_decode() {
        rfc7541_test_cases();

        macro_rules! integer_test_case {
            ($fb: literal, $mask: literal => $fb_res: expr) => {
                match IntegerDecoder::first_byte($fb, $mask) {
                    Ok(idx) => assert_eq!(idx, $fb_res),
                    _ => panic!("IntegerDecoder::first_byte() failed!"),
                }
            };
            ($fb: literal, $mask: literal $(, $nb: literal => $nb_res: expr)* $(,)?) => {
                match IntegerDecoder::first_byte($fb, $mask) {
                    Err(mut int) => {
                        $(match int.next_byte($nb) {
                            Ok(v) => assert_eq!(v, $nb_res),
                            _ => panic!("IntegerDecoder::next_byte() failed!"),
                        })*
                    }
                    _ => panic!("IntegerDecoder::first_byte() failed!"),
                }
            };
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.1.1. Example 1: Encoding 10 Using a 5-Bit Prefix
            integer_test_case!(0x0a, 0x1f => 10);

            // C.1.2. Example 2: Encoding 1337 Using a 5-Bit Prefix
            integer_test_case!(
                0x1f, 0x1f,
                0x9a => None,
                0x0a => Some(1337),
            );

            // C.1.3. Example 3: Encoding 42 Starting at an Octet Boundary
            integer_test_case!(0x2a, 0xff => 42);
        }
    }

    /// UT test cases for `IntegerDecoder` overflow handling.
    ///
    /// # Brief
    /// 1. Feeds a continuation sequence whose value exceeds the `usize`
    ///    range into an `IntegerDecoder`.
    /// 2. Checks that the decoder reports an overflow instead of wrapping.
    #[test]
    fn ut_integer_decode_overflow() {
        let mut int = match IntegerDecoder::first_byte(0x7f, 0x7f) {
            Err(int) => int,
            _ => panic!("IntegerDecoder::first_byte() failed!"),
        };
        let mut result = Ok(None);
        for _ in 0..10 {
            result = int.next_byte(0xff);
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
    }

    /// UT test cases for `integer::encode`.
    ///
    /// # Brief
    /// 1. Calls `encode`, passing in the specified parameters.
    /// 2. Checks if the output bytes are correct.
    #[test]
    fn ut_integer_encode() {
        rfc7541_test_cases();

        macro_rules! integer_test_case {
            ($int: expr, $mask: expr, $pre: expr => $($byte: expr),* $(,)?) => {
                let mut dst = Vec::new();
                encode($int, $mask, $pre, &mut dst);
                assert_eq!(dst.as_slice(), &[$($byte),*]);
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.1.1. Example 1: Encoding 10 Using a 5-Bit Prefix
            integer_test_case!(10, 0x1f, 0x00 => 0x0a);

            // C.1.2. Example 2: Encoding 1337 Using a 5-Bit Prefix
            integer_test_case!(1337, 0x1f, 0x00 => 0x1f, 0x9a, 0x0a);

            // C.1.3. Example 3: Encoding 42 Starting at an Octet Boundary
            integer_test_case!(42, 0xff, 0x00 => 0x2a);
        }
    }

    /// UT test cases for the integer codec round trip.
    ///
    /// # Brief
    /// 1. Encodes a range of integers under every literal prefix width.
    /// 2. Decodes the output and checks that the original value returns.
    #[test]
    fn ut_integer_roundtrip() {
        for mask in [0x0f_u8, 0x1f, 0x3f, 0x7f] {
            for int in [0usize, 1, 14, 15, 16, 30, 31, 32, 126, 127, 128, 1337, 65535, 1 << 30] {
                let mut dst = Vec::new();
                encode(int, mask, 0x00, &mut dst);
                let decoded = match IntegerDecoder::first_byte(dst[0], mask) {
                    Ok(idx) => idx,
                    Err(mut dec) => {
                        let mut rest = dst[1..].iter();
                        loop {
                            let byte = rest.next().expect("truncated continuation");
                            if let Ok(Some(idx)) = dec.next_byte(*byte) {
                                break idx;
                            }
                        }
                    }
                };
                assert_eq!(decoded, int);
            }
        }
    }
}
