//! Small text utilities shared by every stage.

/// Splits on `sep` while keeping separators inside `<...>` intact.
///
/// Always yields at least one (possibly empty) element, so joining the
/// result with `sep` reproduces the input.
pub fn split_protected(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    for ch in input.chars() {
        match ch {
            '<' => in_brackets = true,
            '>' => in_brackets = false,
            _ => {}
        }
        if ch == sep && !in_brackets {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);
    parts
}

/// `snake_case` to `PascalCase`, upper-casing the first character of each part.
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Spreadsheet column letters for a 1-based column number (`1` -> `A`).
pub fn column_letters(column: usize) -> String {
    let mut remaining = column;
    let mut letters = Vec::new();
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}
