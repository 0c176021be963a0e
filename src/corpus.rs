//! Corpus preparation before counting.

/// Splits `data` into lines on `\r\n`, `\n` or a lone `\r`, and ends every
/// line, including an unterminated last one, with a single `\r`.
///
/// This is how the legacy driver read its corpus, so output built from the
/// result matches that tool's code tables. A trailing terminator does not
/// start an extra empty line.
pub fn cr_terminated_lines(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 1);
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'\r' => {
                out.push(b'\r');
                if data.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.push(b'\r'),
            byte => out.push(byte),
        }
        i += 1;
    }
    if matches!(data.last(), Some(&last) if last != b'\n' && last != b'\r') {
        out.push(b'\r');
    }
    out
}
