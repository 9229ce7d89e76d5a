//! Decodes HTML named and numeric character references.
//!
//! Unlike a browser-grade decoder, failure to resolve a reference is never
//! papered over with a replacement character: the original bytes are passed
//! through verbatim. This keeps `decode` total and keeps its output a strict
//! function of its input with no silent data loss.

/// Decodes every character reference in `input`, passing through anything
/// that isn't a valid reference unchanged.
pub fn decode(input: &[u8]) -> Box<[u8]> {
    let mut decoded: Vec<u8> = Vec::new();
    let end = input.len();
    let mut at = 0;
    let mut was_at = 0;

    while at < end {
        let next_amp = match memchr::memchr(b'&', &input[at..]) {
            Some(pos) => at + pos,
            None => break,
        };

        if let Some((character_reference, token_len)) = decode_html_ref(input, next_amp) {
            decoded.extend_from_slice(&input[was_at..next_amp]);
            decoded.extend_from_slice(&character_reference);
            at = next_amp + token_len;
            was_at = at;
            continue;
        }

        at = next_amp + 1;
    }

    if was_at < end {
        decoded.extend_from_slice(&input[was_at..]);
    }

    decoded.into_boxed_slice()
}

/// Attempts to decode a single reference starting at `offset`. Returns the
/// decoded bytes and the number of input bytes the reference occupied
/// (including the leading `&` and trailing `;`), or `None` if no valid
/// reference starts there.
pub fn decode_html_ref(input: &[u8], offset: usize) -> Option<(Box<[u8]>, usize)> {
    if input.len() < offset + 3 {
        return None;
    }

    if input[offset] != b'&' {
        return None;
    }

    if input[offset + 1] == b'#' {
        return decode_numeric_character_reference(input, offset);
    }

    let prefix = [input[offset + 1], input[offset + 2]];
    gen_entities::entities_lookup!("data/entities.json");

    let candidates = ENTITIES.get(&prefix)?;
    candidates
        .iter()
        .find_map(|(suffix, decoded_bytes)| -> Option<(Box<[u8]>, usize)> {
            let len = suffix.len();
            if offset + 3 + len > input.len() {
                None
            } else {
                let candidate = &input[offset + 3..offset + 3 + len];
                if candidate == *suffix {
                    Some(((*decoded_bytes).into(), 3 + len))
                } else {
                    None
                }
            }
        })
}

/// Decodes `&#DDDD;` and `&#xHHHH;`. A trailing `;` is mandatory: without it
/// the whole sequence is not a reference and is left for the caller to treat
/// as plain text.
fn decode_numeric_character_reference(input: &[u8], offset: usize) -> Option<(Box<[u8]>, usize)> {
    let end = input.len();
    if end < offset + 4 {
        return None;
    }
    if input[offset] != b'&' || input[offset + 1] != b'#' {
        return None;
    }

    let mut at = offset + 2;
    let is_hex = at < end && (input[at] | 0x20) == b'x';
    if is_hex {
        at += 1;
    }

    let digits_at = at;
    while at < end
        && if is_hex {
            input[at].is_ascii_hexdigit()
        } else {
            input[at].is_ascii_digit()
        }
    {
        at += 1;
    }
    let digit_count = at - digits_at;
    if digit_count == 0 {
        return None;
    }

    if at >= end || input[at] != b';' {
        return None;
    }
    let matched_byte_length = at + 1 - offset;

    let digits = &input[digits_at..at];
    let significant = digits
        .iter()
        .position(|&b| b != b'0')
        .map_or(0, |i| digit_count - i);
    let radix_limit = if is_hex { 6 } else { 7 };
    if significant > radix_limit {
        return None;
    }

    let radix: u32 = if is_hex { 16 } else { 10 };
    let mut code_point: u32 = 0;
    for &b in digits {
        let digit = (b as char).to_digit(radix)?;
        code_point = code_point.checked_mul(radix)?.checked_add(digit)?;
    }

    if (0xD800..=0xDFFF).contains(&code_point) {
        return None;
    }

    char::from_u32(code_point).map(|c| {
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        (Box::from(s.as_bytes()), matched_byte_length)
    })
}
