//! Bitsliced round components.
//!
//! Each S-box is a Boolean network over the four block words: bit `j` of
//! `x[0..4]` forms one 4-bit input nibble (word 0 holds the low bit), so one
//! call substitutes all 32 nibbles of the block at once.

use crate::tables;

pub(crate) type Words = [u32; 4];
pub(crate) type SboxFn = fn(&mut Words);

pub(crate) const SBOXES: [SboxFn; 8] = [s0, s1, s2, s3, s4, s5, s6, s7];
pub(crate) const SBOXES_INV: [SboxFn; 8] = [si0, si1, si2, si3, si4, si5, si6, si7];

/// Table lookup of a single nibble, as used by the key schedule.
pub(crate) fn apply_s(s_idx: usize, nibble: u8) -> u8 {
    tables::SBOX[s_idx % 8][nibble as usize]
}

pub(crate) fn xor_subkey(x: &mut Words, subkey: &Words) {
    for (word, key) in x.iter_mut().zip(subkey.iter()) {
        *word ^= key;
    }
}

pub(crate) fn linear_transform(x: &mut Words) {
    let [mut x0, mut x1, mut x2, mut x3] = *x;
    x0 = x0.rotate_left(13);
    x2 = x2.rotate_left(3);
    x1 ^= x0 ^ x2;
    x3 ^= x2 ^ (x0 << 3);
    x1 = x1.rotate_left(1);
    x3 = x3.rotate_left(7);
    x0 ^= x1 ^ x3;
    x2 ^= x3 ^ (x1 << 7);
    x0 = x0.rotate_left(5);
    x2 = x2.rotate_left(22);
    *x = [x0, x1, x2, x3];
}

pub(crate) fn linear_transform_inv(x: &mut Words) {
    let [mut x0, mut x1, mut x2, mut x3] = *x;
    x2 = x2.rotate_right(22);
    x0 = x0.rotate_right(5);
    x2 ^= x3 ^ (x1 << 7);
    x0 ^= x1 ^ x3;
    x3 = x3.rotate_right(7);
    x1 = x1.rotate_right(1);
    x3 ^= x2 ^ (x0 << 3);
    x1 ^= x0 ^ x2;
    x2 = x2.rotate_right(3);
    x0 = x0.rotate_right(13);
    *x = [x0, x1, x2, x3];
}

fn s0(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = b ^ c;
    let t02 = a | d;
    let t03 = a ^ b;
    let y3 = t02 ^ t01;
    let t05 = c | y3;
    let t06 = a ^ d;
    let t07 = b | c;
    let t08 = d & t05;
    let t09 = t03 & t07;
    let y2 = t09 ^ t08;
    let t11 = t09 & y2;
    let t12 = c ^ d;
    let t13 = t07 ^ t11;
    let t14 = b & t06;
    let t15 = t06 ^ t13;
    let y0 = !t15;
    let t17 = y0 ^ t14;
    let y1 = t12 ^ t17;
    *x = [y0, y1, y2, y3];
}

fn s1(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a | d;
    let t02 = c ^ d;
    let t03 = !b;
    let t04 = a ^ c;
    let t05 = a | t03;
    let t06 = d & t04;
    let t07 = t01 & t02;
    let t08 = b | t06;
    let y2 = t02 ^ t05;
    let t10 = t07 ^ t08;
    let t11 = t01 ^ t10;
    let t12 = y2 ^ t11;
    let t13 = b & d;
    let y3 = !t10;
    let y1 = t13 ^ t12;
    let t16 = t10 | y1;
    let t17 = t05 & t16;
    let y0 = c ^ t17;
    *x = [y0, y1, y2, y3];
}

fn s2(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a | c;
    let t02 = a ^ b;
    let t03 = d ^ t01;
    let y0 = t02 ^ t03;
    let t05 = c ^ y0;
    let t06 = b ^ t05;
    let t07 = b | t05;
    let t08 = t01 & t06;
    let t09 = t03 ^ t07;
    let t10 = t02 | t09;
    let y1 = t10 ^ t08;
    let t12 = a | d;
    let t13 = t09 ^ y1;
    let t14 = b ^ t13;
    let y3 = !t09;
    let y2 = t12 ^ t14;
    *x = [y0, y1, y2, y3];
}

fn s3(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a ^ c;
    let t02 = a | d;
    let t03 = a & d;
    let t04 = t01 & t02;
    let t05 = b | t03;
    let t06 = a & b;
    let t07 = d ^ t04;
    let t08 = c | t06;
    let t09 = b ^ t07;
    let t10 = d & t05;
    let t11 = t02 ^ t10;
    let y3 = t08 ^ t09;
    let t13 = d | y3;
    let t14 = a | t07;
    let t15 = b & t13;
    let y2 = t08 ^ t11;
    let y0 = t14 ^ t15;
    let y1 = t05 ^ t04;
    *x = [y0, y1, y2, y3];
}

fn s4(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a | b;
    let t02 = b | c;
    let t03 = a ^ t02;
    let t04 = b ^ d;
    let t05 = d | t03;
    let t06 = d & t01;
    let y3 = t03 ^ t06;
    let t08 = y3 & t04;
    let t09 = t04 & t05;
    let t10 = c ^ t06;
    let t11 = b & c;
    let t12 = t04 ^ t08;
    let t13 = t11 | t03;
    let t14 = t10 ^ t09;
    let t15 = a & t05;
    let t16 = t11 | t12;
    let y2 = t13 ^ t08;
    let y1 = t15 ^ t16;
    let y0 = !t14;
    *x = [y0, y1, y2, y3];
}

fn s5(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = b ^ d;
    let t02 = b | d;
    let t03 = a & t01;
    let t04 = c ^ t02;
    let t05 = t03 ^ t04;
    let y0 = !t05;
    let t07 = a ^ t01;
    let t08 = d | y0;
    let t09 = b | t05;
    let t10 = d ^ t08;
    let t11 = b | t07;
    let t12 = t03 | y0;
    let t13 = t07 | t10;
    let t14 = t01 ^ t11;
    let y2 = t09 ^ t13;
    let y1 = t07 ^ t08;
    let y3 = t12 ^ t14;
    *x = [y0, y1, y2, y3];
}

fn s6(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a & d;
    let t02 = b ^ c;
    let t03 = a ^ d;
    let t04 = t01 ^ t02;
    let t05 = b | c;
    let y1 = !t04;
    let t07 = t03 & t05;
    let t08 = b & y1;
    let t09 = a | c;
    let t10 = t07 ^ t08;
    let t11 = b | d;
    let t12 = c ^ t11;
    let t13 = t09 ^ t10;
    let y2 = !t13;
    let t15 = y1 & t03;
    let y3 = t12 ^ t07;
    let t17 = a ^ b;
    let t18 = y2 ^ t15;
    let y0 = t17 ^ t18;
    *x = [y0, y1, y2, y3];
}

fn s7(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a & c;
    let t02 = !d;
    let t03 = a & t02;
    let t04 = b | t01;
    let t05 = a & b;
    let t06 = c ^ t04;
    let y3 = t03 ^ t06;
    let t08 = c | y3;
    let t09 = d | t05;
    let t10 = a ^ t08;
    let t11 = t04 & y3;
    let y1 = t09 ^ t10;
    let t13 = b ^ y1;
    let t14 = t01 ^ y1;
    let t15 = c ^ t05;
    let t16 = t11 | t13;
    let t17 = t02 | t14;
    let y0 = t15 ^ t17;
    let y2 = a ^ t16;
    *x = [y0, y1, y2, y3];
}

fn si0(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = c ^ d;
    let t02 = a | b;
    let t03 = b | c;
    let t04 = c & t01;
    let t05 = t02 ^ t01;
    let t06 = a | t04;
    let y2 = !t05;
    let t08 = b ^ d;
    let t09 = t03 & t08;
    let t10 = d | y2;
    let y1 = t09 ^ t06;
    let t12 = a | t05;
    let t13 = y1 ^ t12;
    let t14 = t03 ^ t10;
    let t15 = a ^ c;
    let y3 = t14 ^ t13;
    let t17 = t05 & t13;
    let t18 = t14 | t17;
    let y0 = t15 ^ t18;
    *x = [y0, y1, y2, y3];
}

fn si1(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a ^ b;
    let t02 = b | d;
    let t03 = a & c;
    let t04 = c ^ t02;
    let t05 = a | t04;
    let t06 = t01 & t05;
    let t07 = d | t03;
    let t08 = b ^ t06;
    let t09 = t07 ^ t06;
    let t10 = t04 | t03;
    let t11 = d & t08;
    let y2 = !t09;
    let y1 = t10 ^ t11;
    let t14 = a | y2;
    let t15 = t06 ^ y1;
    let y3 = t01 ^ t04;
    let t17 = c ^ t15;
    let y0 = t14 ^ t17;
    *x = [y0, y1, y2, y3];
}

fn si2(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a ^ d;
    let t02 = c ^ d;
    let t03 = a & c;
    let t04 = b | t02;
    let y0 = t01 ^ t04;
    let t06 = a | c;
    let t07 = d | y0;
    let t08 = !d;
    let t09 = b & t06;
    let t10 = t08 | t03;
    let t11 = b & t07;
    let t12 = t06 & t02;
    let y3 = t09 ^ t10;
    let y1 = t12 ^ t11;
    let t15 = c & y3;
    let t16 = y0 ^ y1;
    let t17 = t10 ^ t15;
    let y2 = t16 ^ t17;
    *x = [y0, y1, y2, y3];
}

fn si3(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = c | d;
    let t02 = a | d;
    let t03 = c ^ t02;
    let t04 = b ^ t02;
    let t05 = a ^ d;
    let t06 = t04 & t03;
    let t07 = b & t01;
    let y2 = t05 ^ t06;
    let t09 = a ^ t03;
    let y0 = t07 ^ t03;
    let t11 = y0 | t05;
    let t12 = t09 & t11;
    let t13 = a & y2;
    let t14 = t01 ^ t05;
    let y1 = b ^ t12;
    let t16 = b | t13;
    let y3 = t14 ^ t16;
    *x = [y0, y1, y2, y3];
}

fn si4(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = b | d;
    let t02 = c | d;
    let t03 = a & t01;
    let t04 = b ^ t02;
    let t05 = c ^ d;
    let t06 = !t03;
    let t07 = a & t04;
    let y1 = t05 ^ t07;
    let t09 = y1 | t06;
    let t10 = a ^ t07;
    let t11 = t01 ^ t09;
    let t12 = d ^ t04;
    let t13 = c | t10;
    let y3 = t03 ^ t12;
    let t15 = a ^ t04;
    let y2 = t11 ^ t13;
    let y0 = t15 ^ t09;
    *x = [y0, y1, y2, y3];
}

fn si5(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a & d;
    let t02 = c ^ t01;
    let t03 = a ^ d;
    let t04 = b & t02;
    let t05 = a & c;
    let y0 = t03 ^ t04;
    let t07 = a & y0;
    let t08 = t01 ^ y0;
    let t09 = b | t05;
    let t10 = !b;
    let y1 = t08 ^ t09;
    let t12 = t10 | t07;
    let t13 = y0 | y1;
    let y3 = t02 ^ t12;
    let t15 = t02 ^ t13;
    let t16 = b ^ d;
    let y2 = t16 ^ t15;
    *x = [y0, y1, y2, y3];
}

fn si6(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a ^ c;
    let t02 = !c;
    let t03 = b & t01;
    let t04 = b | t02;
    let t05 = d | t03;
    let t06 = b ^ d;
    let t07 = a & t04;
    let t08 = a | t02;
    let t09 = t07 ^ t05;
    let y1 = t06 ^ t08;
    let y0 = !t09;
    let t12 = b & y0;
    let t13 = t01 & t05;
    let t14 = t01 ^ t12;
    let t15 = t07 ^ t13;
    let t16 = d | t02;
    let t17 = a ^ y1;
    let y3 = t17 ^ t15;
    let y2 = t16 ^ t14;
    *x = [y0, y1, y2, y3];
}

fn si7(x: &mut Words) {
    let [a, b, c, d] = *x;
    let t01 = a & b;
    let t02 = a | b;
    let t03 = c | t01;
    let t04 = d & t02;
    let y3 = t03 ^ t04;
    let t06 = b ^ t04;
    let t07 = d ^ y3;
    let t08 = !t07;
    let t09 = t06 | t08;
    let t10 = b ^ d;
    let t11 = a | d;
    let y1 = a ^ t09;
    let t13 = c ^ t06;
    let t14 = c & t11;
    let t15 = d | y1;
    let t16 = t01 | t10;
    let y0 = t13 ^ t15;
    let y2 = t14 ^ t16;
    *x = [y0, y1, y2, y3];
}

#[cfg(test)]
mod tests {
    use super::*;

    // Spreads nibble `n` over bit 0 of each word.
    fn slice(n: u8) -> Words {
        [
            u32::from(n & 1),
            u32::from(n >> 1 & 1),
            u32::from(n >> 2 & 1),
            u32::from(n >> 3 & 1),
        ]
    }

    fn unslice(x: &Words) -> u8 {
        x.iter()
            .enumerate()
            .fold(0u8, |acc, (i, w)| acc | ((w & 1) as u8) << i)
    }

    #[test]
    fn networks_match_tables() {
        for s_idx in 0..8 {
            for n in 0..16u8 {
                let mut x = slice(n);
                SBOXES[s_idx](&mut x);
                assert_eq!(unslice(&x), tables::SBOX[s_idx][n as usize], "S{} {}", s_idx, n);

                let mut x = slice(n);
                SBOXES_INV[s_idx](&mut x);
                assert_eq!(
                    unslice(&x),
                    tables::SBOX_INV[s_idx][n as usize],
                    "S{}^-1 {}",
                    s_idx,
                    n
                );
            }
        }
    }

    #[test]
    fn networks_work_on_every_bit_lane() {
        let input = [0x0123_4567, 0x89ab_cdef, 0xdead_beef, 0x0f1e_2d3c];
        for s_idx in 0..8 {
            let mut x = input;
            SBOXES[s_idx](&mut x);
            for lane in 0..32 {
                let nibble = (0..4).fold(0u8, |acc, i| acc | ((input[i] >> lane & 1) as u8) << i);
                let out = (0..4).fold(0u8, |acc, i| acc | ((x[i] >> lane & 1) as u8) << i);
                assert_eq!(out, apply_s(s_idx, nibble));
            }
            SBOXES_INV[s_idx](&mut x);
            assert_eq!(x, input);
        }
    }

    #[test]
    fn linear_transform_inverts() {
        let mut x = [0x0000_0001, 0x8000_0000, 0x1234_5678, 0xffff_0000];
        let before = x;
        linear_transform(&mut x);
        assert_ne!(x, before);
        linear_transform_inv(&mut x);
        assert_eq!(x, before);
    }
}
