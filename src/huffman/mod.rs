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

//! [Huffman coding] implementation of [HPACK].
//!
//! [Huffman coding]: https://en.wikipedia.org/wiki/Huffman_coding
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! The code is the canonical 256-symbol prefix code plus a 30-bit `EOS`
//! symbol defined in `RFC7541 Appendix B`. The encoder packs the per-symbol
//! code words most-significant-bit first and pads the final octet with the
//! leading bits of `EOS`, which are all `0b1`. The `EOS` symbol itself is
//! never emitted.
//!
//! Decoding runs a state machine that consumes the input 4 bits at a time,
//! in the manner popularized by crate [h2]. The transition table is derived
//! once, at first use, from the code table in [`consts`]: the states are the
//! interior nodes of the code tree, and each transition records the decoded
//! octet (if a code word completed inside the nibble) together with flag
//! bits that classify the destination state.
//!
//! [h2]: https://crates.io/crates/h2

mod consts;

use core::cmp::Ordering;

use consts::{HUFFMAN_ENCODE, HUFFMAN_EOS, HUFFMAN_SYMBOLS};
use once_cell::sync::Lazy;

/// The remaining bits form a prefix of the `EOS` code no longer than 7 bits,
/// so the input may legally end in this state.
const MAYBE_EOS: u8 = 0x1;

/// A code word completed inside the nibble; the transition carries the
/// decoded octet.
const DECODED: u8 = 0x2;

/// The nibble decoded the `EOS` symbol or left the code tree; the input is
/// not a valid Huffman string.
const ERROR: u8 = 0x4;

/// One transition of the decode state machine: `(next state, decoded octet,
/// flags)`. The octet is only meaningful when `DECODED` is set.
type Transition = (u8, u8, u8);

static HUFFMAN_DECODE: Lazy<Vec<[Transition; 16]>> = Lazy::new(build_decode_table);

/// Converts a string to a Huffman code, and then puts it into the specified
/// `Vec<u8>`.
pub(crate) fn huffman_encode(src: &[u8], dst: &mut Vec<u8>) {
    // `state` collects result bits from the most significant end. `unfilled`
    // is the number of free bits remaining at the least significant end.
    // Whenever all 64 bits are filled, `state` is flushed to `dst` whole.
    let mut state = 0u64;
    let mut unfilled = 64u32;

    for byte in src.iter() {
        let (nbits, code) = HUFFMAN_ENCODE[*byte as usize];
        match unfilled.cmp(&nbits) {
            Ordering::Greater => {
                state |= code << (unfilled - nbits);
                unfilled -= nbits;
            }
            Ordering::Equal => {
                state |= code;
                dst.extend_from_slice(&state.to_be_bytes());
                state = 0;
                unfilled = 64;
            }
            // The code word does not fit. Rotating it right by the number of
            // overflowing bits splits it in two: the low `unfilled` bits of
            // `rotate` complete the current `state`, the high bits seed the
            // next one.
            Ordering::Less => {
                let rotate = code.rotate_right(nbits - unfilled);
                let mask = u64::MAX >> (64 - unfilled);
                state |= rotate & mask;
                dst.extend_from_slice(&state.to_be_bytes());
                state = rotate & !mask;
                unfilled = 64 - (nbits - unfilled);
            }
        }
    }

    // RFC7541-5.2: a partial final octet is filled with the
    // most-significant bits of `EOS`, which are all `0b1`.
    if unfilled != 64 {
        state |= u64::MAX >> (64 - unfilled);
        let len = (8 - (unfilled >> 3)) as usize;
        dst.extend_from_slice(&state.to_be_bytes()[..len]);
    }
}

/// Converts a Huffman code into a literal string, and then puts it into the
/// specified `Vec<u8>`. The input must be a whole string literal: trailing
/// bits that are not a prefix of `EOS`, more than 7 trailing bits, or a
/// decoded `EOS` symbol are errors.
pub(crate) fn huffman_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), HuffmanDecodeError> {
    let mut state = 0u8;
    let mut flags = 0u8;

    for byte in src.iter() {
        (state, flags) = decode_nibble(dst, state, byte >> 4)?;
        (state, flags) = decode_nibble(dst, state, byte & 0xf)?;
    }

    // The operation succeeds if every bit was consumed by a code word
    // (`state` is the tree root) or the remaining bits form legal `EOS`
    // padding.
    if state != 0 && (flags & MAYBE_EOS) == 0 {
        return Err(HuffmanDecodeError::InvalidHuffmanCode);
    }
    Ok(())
}

fn decode_nibble(
    dst: &mut Vec<u8>,
    state: u8,
    nibble: u8,
) -> Result<(u8, u8), HuffmanDecodeError> {
    let (next, octet, flags) = HUFFMAN_DECODE[state as usize][nibble as usize];
    if (flags & ERROR) == ERROR {
        return Err(HuffmanDecodeError::InvalidHuffmanCode);
    }
    if (flags & DECODED) == DECODED {
        dst.push(octet);
    }
    Ok((next, flags))
}

/// Possible errors in Huffman decoding operations.
#[derive(Debug)]
pub(crate) enum HuffmanDecodeError {
    InvalidHuffmanCode,
}

const NO_NODE: u16 = u16::MAX;
const NO_SYMBOL: u16 = u16::MAX;

/// A node of the code tree the transition table is derived from. `depth`
/// and `all_ones` describe the bit path from the root, which is exactly the
/// sequence of bits consumed since the last completed code word.
struct CodeNode {
    next: [u16; 2],
    symbol: u16,
    depth: u8,
    all_ones: bool,
}

fn build_decode_table() -> Vec<[Transition; 16]> {
    // Builds the code tree. Node 0 is the root.
    let mut nodes = vec![CodeNode {
        next: [NO_NODE; 2],
        symbol: NO_SYMBOL,
        depth: 0,
        all_ones: true,
    }];
    for sym in 0..HUFFMAN_SYMBOLS {
        let (nbits, code) = HUFFMAN_ENCODE[sym];
        let mut curr = 0usize;
        for n in (0..nbits).rev() {
            let bit = ((code >> n) & 1) as usize;
            let next = nodes[curr].next[bit];
            curr = if next == NO_NODE {
                nodes.push(CodeNode {
                    next: [NO_NODE; 2],
                    symbol: NO_SYMBOL,
                    depth: nodes[curr].depth + 1,
                    all_ones: nodes[curr].all_ones && bit == 1,
                });
                let idx = (nodes.len() - 1) as u16;
                nodes[curr].next[bit] = idx;
                idx as usize
            } else {
                next as usize
            };
        }
        nodes[curr].symbol = sym as u16;
    }

    // Numbers the interior nodes. The code is complete, so a tree with 257
    // leaves has exactly 256 interior nodes and every state fits in a `u8`.
    let mut states = vec![NO_NODE; nodes.len()];
    let mut count = 0u16;
    for (idx, node) in nodes.iter().enumerate() {
        if node.symbol == NO_SYMBOL {
            states[idx] = count;
            count += 1;
        }
    }
    debug_assert_eq!(count, 256);

    let mut table = vec![[(0u8, 0u8, ERROR); 16]; count as usize];
    for (idx, node) in nodes.iter().enumerate() {
        if node.symbol != NO_SYMBOL {
            continue;
        }
        let state = states[idx] as usize;
        for input in 0..16u8 {
            table[state][input as usize] = transition(&nodes, &states, idx, input);
        }
    }
    table
}

/// Walks 4 bits of input from an interior node. At most one code word can
/// complete inside a nibble because the shortest code is 5 bits long.
fn transition(nodes: &[CodeNode], states: &[u16], start: usize, input: u8) -> Transition {
    let mut curr = start;
    let mut octet = 0u8;
    let mut flags = 0u8;
    for n in (0..4).rev() {
        let bit = ((input >> n) & 1) as usize;
        let next = nodes[curr].next[bit];
        if next == NO_NODE {
            return (0, 0, ERROR);
        }
        curr = next as usize;
        let symbol = nodes[curr].symbol;
        if symbol != NO_SYMBOL {
            // RFC7541-5.2: a decoded EOS is a decoding error.
            if symbol == HUFFMAN_EOS {
                return (0, 0, ERROR);
            }
            octet = symbol as u8;
            flags |= DECODED;
            curr = 0;
        }
    }
    if nodes[curr].all_ones && nodes[curr].depth <= 7 {
        flags |= MAYBE_EOS;
    }
    (states[curr] as u8, octet, flags)
}

#[cfg(test)]
mod ut_huffman {
    use super::{huffman_decode, huffman_encode};
    use crate::util::test_util::decode;

    /// UT test cases for `huffman_encode`.
    ///
    /// # Brief
    /// 1. Calls `huffman_encode` function, passing in the specified parameters.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_huffman_encode() {
        rfc7541_test_cases();

        macro_rules! huffman_test_case {
            ($ctn: expr, $res: expr $(,)?) => {
                let mut vec = Vec::new();
                huffman_encode($ctn.as_bytes(), &mut vec);
                assert_eq!(vec, decode($res).unwrap())
            };
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.4.1 First Request
            huffman_test_case!("www.example.com", "f1e3c2e5f23a6ba0ab90f4ff");

            // C.4.2 Second Request
            huffman_test_case!("no-cache", "a8eb10649cbf");

            // C.4.3 Third Request
            huffman_test_case!("custom-value", "25a849e95bb8e8b4bf");

            // C.6.1 First Response
            huffman_test_case!("302", "6402");
            huffman_test_case!("private", "aec3771a4b");
            huffman_test_case!(
                "Mon, 21 Oct 2013 20:13:21 GMT",
                "d07abe941054d444a8200595040b8166e082a62d1bff"
            );
            huffman_test_case!(
                "https://www.example.com",
                "9d29ad171863c78f0b97c8e9ae82ae43d3"
            );

            // C.6.2 Second Response
            huffman_test_case!("307", "640eff");

            // C.6.3 Third Response
            huffman_test_case!("gzip", "9bd9ab");
            huffman_test_case!(
                "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1",
                "94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f9587316065c003ed4ee5b1063d5007",
            );
        }
    }

    /// UT test cases for `huffman_decode`.
    ///
    /// # Brief
    /// 1. Calls `huffman_decode` function, passing in the specified parameters.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_huffman_decode() {
        rfc7541_test_cases();

        macro_rules! huffman_test_case {
            ($ctn: expr, $res: expr $(,)?) => {
                let mut vec = Vec::new();
                huffman_decode(decode($ctn).unwrap().as_slice(), &mut vec).unwrap();
                assert_eq!(vec.as_slice(), $res.as_bytes())
            };
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.4.1 First Request
            huffman_test_case!("f1e3c2e5f23a6ba0ab90f4ff", "www.example.com");

            // C.4.2 Second Request
            huffman_test_case!("a8eb10649cbf", "no-cache");

            // C.4.3 Third Request
            huffman_test_case!("25a849e95bb8e8b4bf", "custom-value");

            // C.6.1 First Response
            huffman_test_case!("6402", "302");
            huffman_test_case!("aec3771a4b", "private");
            huffman_test_case!(
                "d07abe941054d444a8200595040b8166e082a62d1bff",
                "Mon, 21 Oct 2013 20:13:21 GMT"
            );
            huffman_test_case!(
                "9d29ad171863c78f0b97c8e9ae82ae43d3",
                "https://www.example.com",
            );

            // C.6.2 Second Response
            huffman_test_case!("640eff", "307");

            // C.6.3 Third Response
            huffman_test_case!("9bd9ab", "gzip");
            huffman_test_case!(
                "94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f9587316065c003ed4ee5b1063d5007",
                "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1"
            );
        }
    }

    /// UT test cases for the Huffman codec round trip.
    ///
    /// # Brief
    /// 1. Encodes every single-octet string and a set of mixed strings,
    ///    including non-ASCII octets.
    /// 2. Decodes the results and checks that the original octets return.
    #[test]
    fn ut_huffman_roundtrip() {
        macro_rules! roundtrip_test_case {
            ($src: expr) => {
                let mut encoded = Vec::new();
                huffman_encode($src, &mut encoded);
                let mut decoded = Vec::new();
                assert!(huffman_decode(encoded.as_slice(), &mut decoded).is_ok());
                assert_eq!(decoded.as_slice(), $src);
            };
        }

        for byte in 0..=255u8 {
            roundtrip_test_case!([byte].as_slice());
        }

        roundtrip_test_case!(b"".as_slice());
        roundtrip_test_case!(b"custom-key".as_slice());
        roundtrip_test_case!("\u{4f60}\u{597d}".as_bytes());
        roundtrip_test_case!([0x00, 0xff, 0x7f, 0x80, 0x0a].as_slice());
        let long = vec![0xe8u8; 4096];
        roundtrip_test_case!(long.as_slice());
    }

    /// UT test cases for `huffman_decode` error handling.
    ///
    /// # Brief
    /// 1. Calls `huffman_decode` with inputs whose trailing bits are not a
    ///    prefix of `EOS`, are longer than 7 bits, or decode `EOS` itself.
    /// 2. Checks that each input is rejected.
    #[test]
    fn ut_huffman_decode_invalid() {
        macro_rules! invalid_test_case {
            ($src: expr) => {
                let mut vec = Vec::new();
                assert!(huffman_decode($src.as_slice(), &mut vec).is_err());
            };
        }

        // Symbol `0` followed by 3 zero bits of padding.
        invalid_test_case!([0x00u8]);
        // 8 bits of padding, one more than EOS padding allows.
        invalid_test_case!([0xffu8]);
        // Symbol `a` followed by 11 bits of padding.
        invalid_test_case!([0x1fu8, 0xff]);
        // The 30-bit EOS symbol itself.
        invalid_test_case!([0xffu8, 0xff, 0xff, 0xfc]);
        // A 7-bit partial code word whose bits are not all ones.
        invalid_test_case!([0xfeu8]);

        // Symbol `a` followed by 3 one bits is legal padding.
        let mut vec = Vec::new();
        assert!(huffman_decode([0x1fu8].as_slice(), &mut vec).is_ok());
        assert_eq!(vec.as_slice(), b"a");
    }
}
