/// Decode a named or numeric entity body (the text between `&` and `;`).
pub(super) fn decode_html_entity(entity: &str) -> Option<char> {
    const NAMED: [(&str, char); 22] = [
        ("amp", '&'),
        ("lt", '<'),
        ("gt", '>'),
        ("quot", '"'),
        ("apos", '\''),
        ("nbsp", ' '),
        ("lsquo", '\u{2018}'),
        ("rsquo", '\u{2019}'),
        ("ldquo", '\u{201C}'),
        ("rdquo", '\u{201D}'),
        ("laquo", '\u{AB}'),
        ("raquo", '\u{BB}'),
        ("ndash", '\u{2013}'),
        ("mdash", '\u{2014}'),
        ("hellip", '\u{2026}'),
        ("aacute", 'á'),
        ("eacute", 'é'),
        ("iacute", 'í'),
        ("oacute", 'ó'),
        ("uacute", 'ú'),
        ("ntilde", 'ñ'),
        ("ccedil", 'ç'),
    ];

    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    NAMED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(entity))
        .map(|(_, ch)| *ch)
}

fn decode_numeric_entity(digits: &str) -> Option<char> {
    let (digits, radix) = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    if digits.is_empty() {
        return None;
    }

    let value = u32::from_str_radix(digits, radix).ok()?;
    match value {
        0xA0 => Some(' '),
        _ => core::char::from_u32(value),
    }
}
