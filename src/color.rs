//! Deterministic fallback colors for unmapped category values

/// Derive a stable `#rrggbb` color from an arbitrary string value.
///
/// The same input always produces the same color, so category layers keep a
/// consistent palette across re-renders and sessions without storing any
/// mapping. Distinct values may collide; that is acceptable for fallback
/// coloring.
pub fn color_for(value: &str) -> String {
    // Polynomial hash (base 31) over UTF-16 code units with wrapping 32-bit
    // signed arithmetic. Values outside the BMP hash as surrogate pairs.
    let mut hash: i32 = 0;
    for unit in value.encode_utf16() {
        hash = (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }

    // The low three bytes become the channels, least significant first.
    let mut color = String::with_capacity(7);
    color.push('#');
    for i in 0..3 {
        let byte = (hash >> (8 * i)) & 0xff;
        color.push_str(&format!("{:02x}", byte));
    }
    color
}
