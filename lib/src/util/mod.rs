/// Reduces `string` to a lowercase ASCII token safe for URLs and file names.
///
/// Characters are transliterated to ASCII first. Whitespace and `-` act as
/// separators and collapse into a single `-`; every other character that
/// isn't an ASCII alphanumeric is dropped. The result never starts or ends
/// with `-` and may be empty.
///
/// ```
/// use wayfinder::util::slugify;
///
/// assert_eq!(slugify("Album X"), "album-x");
/// assert_eq!(slugify("Don't Look Back"), "dont-look-back");
/// ```
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        if ch.is_whitespace() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in deunicode::deunicode_char(ch).unwrap_or("").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                b'-' | b' ' => need_dash = !output.is_empty(),
                _ => { }
            }
        }
    }

    output
}

/// The lookup key for a category name or alias: lowercase, `_` and `-` read
/// as spaces, whitespace collapsed.
pub fn category_key(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the first line of `text` that isn't blank once spaces, tabs, and
/// double quotes are trimmed from both ends.
pub fn first_nonblank_line(text: &str) -> Option<&str> {
    text.lines()
        .map(|line| line.trim_matches(|c| matches!(c, ' ' | '\t' | '"')))
        .find(|line| !line.is_empty())
}

/// Normalizes body text: CRLF and CR become LF, leading and trailing newlines
/// are removed, and three or more consecutive newlines become two.
pub fn normalize_body(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut output = String::with_capacity(text.len());

    let mut newlines = 0;
    for ch in text.trim_matches('\n').chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }

        output.push(ch);
    }

    output
}
