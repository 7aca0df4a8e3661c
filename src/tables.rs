pub(crate) type Sbox = [u8; 16];

/// The eight Serpent S-boxes, `S0` through `S7`.
pub(crate) const SBOX: [Sbox; 8] = [
    [3, 8, 15, 1, 10, 6, 5, 11, 14, 13, 4, 2, 7, 0, 9, 12],
    [15, 12, 2, 7, 9, 0, 5, 10, 1, 11, 14, 8, 6, 13, 3, 4],
    [8, 6, 7, 9, 3, 12, 10, 15, 13, 1, 14, 4, 0, 11, 5, 2],
    [0, 15, 11, 8, 12, 9, 6, 3, 13, 1, 2, 4, 10, 7, 5, 14],
    [1, 15, 8, 3, 12, 0, 11, 6, 2, 5, 4, 10, 9, 14, 7, 13],
    [15, 5, 2, 11, 4, 10, 9, 12, 0, 3, 14, 8, 13, 6, 7, 1],
    [7, 2, 12, 5, 8, 4, 6, 11, 14, 9, 1, 15, 13, 3, 10, 0],
    [1, 13, 15, 0, 14, 8, 2, 11, 7, 4, 12, 10, 9, 3, 5, 6],
];

#[cfg(test)]
const fn invert(sbox: &Sbox) -> Sbox {
    let mut inv = [0u8; 16];
    let mut i = 0;
    while i < 16 {
        inv[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

#[cfg(test)]
pub(crate) const SBOX_INV: [Sbox; 8] = [
    invert(&SBOX[0]),
    invert(&SBOX[1]),
    invert(&SBOX[2]),
    invert(&SBOX[3]),
    invert(&SBOX[4]),
    invert(&SBOX[5]),
    invert(&SBOX[6]),
    invert(&SBOX[7]),
];
