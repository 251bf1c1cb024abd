//! Line packing
//!
//! A line is one column of pixels, bottom LED first. On the wire each group of
//! eight pixels becomes one byte with the lowest pixel index in bit 7.

/// Bytes needed to carry a line of `height` pixels
pub fn payload_len(height: usize) -> usize {
    height.div_ceil(8)
}

/// Pack pixels MSB-first; a trailing partial group is padded with zeros
pub fn pack_line(pixels: &[bool]) -> Vec<u8> {
    pixels
        .chunks(8)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .filter(|&(_, &lit)| lit)
                .fold(0u8, |byte, (bit, _)| byte | (0x80 >> bit))
        })
        .collect()
}

/// Unpack the first `height` pixels of a packed line.
///
/// Missing bytes read as unlit pixels.
pub fn unpack_line(bytes: &[u8], height: usize) -> Vec<bool> {
    (0..height)
        .map(|index| {
            bytes
                .get(index / 8)
                .is_some_and(|byte| byte & (0x80 >> (index % 8)) != 0)
        })
        .collect()
}
