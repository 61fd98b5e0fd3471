//! XOR email obfuscation as embedded in `data-cfemail` attributes
//!
//! The encoded form is a hex string: the first byte is the key, every
//! following byte is one character XORed with that key. Characters are
//! single-byte Latin-1.

/// Decodes a hex-encoded obfuscated email
///
/// # Returns
///
/// * `Some(String)` - The decoded address
/// * `None` - The input is not an even-length hex string with at least one character
///
/// # Example
///
/// ```
/// use listing_harvester::extract::decode_obfuscated;
///
/// assert_eq!(decode_obfuscated("422b2c242d022b2c242d6c2627").as_deref(), Some("info@info.de"));
/// ```
pub fn decode_obfuscated(encoded: &str) -> Option<String> {
    let encoded = encoded.trim();
    if encoded.len() < 4 || encoded.len() % 2 != 0 || !encoded.is_ascii() {
        return None;
    }

    let key = u8::from_str_radix(&encoded[..2], 16).ok()?;
    (2..encoded.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&encoded[i..i + 2], 16)
                .ok()
                .map(|b| char::from(b ^ key))
        })
        .collect()
}

/// Encodes an email with the given key
///
/// Returns `None` if the address contains characters outside Latin-1.
pub fn encode_obfuscated(email: &str, key: u8) -> Option<String> {
    let mut out = format!("{:02x}", key);
    for c in email.chars() {
        let byte = u8::try_from(u32::from(c)).ok()?;
        out.push_str(&format!("{:02x}", byte ^ key));
    }
    Some(out)
}
