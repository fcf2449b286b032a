//! CRC-16/CCITT-FALSE checksum used to seal KHQR payloads.
//!
//! Parameters: polynomial `0x1021`, initial value `0xFFFF`, no input or output
//! reflection, no final XOR. The checksum is computed over the payload text
//! followed by the `6304` placeholder and rendered as four uppercase hex digits.

/// Generator polynomial.
pub const CRC16_POLYNOMIAL: u16 = 0x1021;
/// Initial accumulator value.
pub const CRC16_INIT: u16 = 0xFFFF;

/// Computes the CRC-16/CCITT-FALSE of `data`.
///
/// ```
/// use khqr_types::checksum::checksum16;
///
/// assert_eq!(checksum16(b"123456789"), 0x29B1);
/// ```
pub fn checksum16(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC16_POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Renders the checksum of `data` as four uppercase, zero-padded hex digits.
pub fn checksum_hex(data: &[u8]) -> String {
    format!("{:04X}", checksum16(data))
}
