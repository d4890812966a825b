//! Framing helpers shared by every scale protocol.

use log::debug;

/// Leading bytes of every timer-scale command frame.
pub const COMMAND_HEADER: [u8; 2] = [0x03, 0x0A];
pub const COMMAND_FRAME_LEN: usize = 6;

pub fn calculate_xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// Compares the XOR of everything but the last byte against the last byte.
pub fn verify_checksum(data: &[u8]) -> bool {
    if data.len() < 2 {
        return false;
    }

    let payload = &data[..data.len() - 1];
    let expected_checksum = data[data.len() - 1];
    let calculated_checksum = calculate_xor_checksum(payload);

    calculated_checksum == expected_checksum
}

/// Builds `[0x03, 0x0A, command, data1, data2, xor]`.
pub fn create_command(command_type: u8, data1: u8, data2: u8) -> [u8; COMMAND_FRAME_LEN] {
    let mut frame = [
        COMMAND_HEADER[0],
        COMMAND_HEADER[1],
        command_type,
        data1,
        data2,
        0x00,
    ];
    frame[COMMAND_FRAME_LEN - 1] = calculate_xor_checksum(&frame[..COMMAND_FRAME_LEN - 1]);
    frame
}

/// Strips whitespace, an optional `0x` prefix and lowercases the payload.
///
/// Returns `None` for odd-length or non-hex input.
pub fn normalize_hex(payload: &str) -> Option<String> {
    let trimmed = payload.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let clean: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if clean.len() % 2 != 0 || !clean.chars().all(|c| c.is_ascii_hexdigit()) {
        debug!("Rejecting malformed hex payload: {:?}", payload);
        return None;
    }
    Some(clean)
}

pub fn hex_to_bytes(payload: &str) -> Option<Vec<u8>> {
    let clean = normalize_hex(payload)?;
    hex::decode(clean).ok()
}

pub fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10f32.powi(decimals as i32);
    (value * factor).round() / factor
}
