//! Output formatting for register reads

/// `0x<reg>: 0x<value:02x>`
pub fn byte_line(register: u8, value: u8) -> String {
    format!("0x{register:x}: 0x{value:02x}")
}

/// `0x<reg>: 0x<value:04x>`
pub fn word_line(register: u8, value: u16) -> String {
    format!("0x{register:x}: 0x{value:04x}")
}

/// Dump block data 16 bytes per row, each row prefixed with its offset
///
/// Printable ASCII is shown as ` c `, everything else as two hex digits
/// followed by a space. Empty data produces no rows.
pub fn block_dump(data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let mut line = format!("0x{:02x}: ", row * 16);
            for &b in chunk {
                if b == b' ' || b.is_ascii_graphic() {
                    line.push(' ');
                    line.push(b as char);
                    line.push(' ');
                } else {
                    line.push_str(&format!("{b:02x} "));
                }
            }
            line
        })
        .collect()
}
