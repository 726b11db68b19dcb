/// Derives a short code for a command from the first letter of each word.
///
/// Leading non-alphabetic characters of a word are skipped (`--force` gives
/// `f`); a word that is a placeholder (`{remote=origin}`) contributes nothing.
/// While the code is taken, `f` is appended.
pub fn derive_code<S: AsRef<str>>(cmd: &str, taken: &[S]) -> String {
    let mut code: String = cmd.split(' ').filter_map(first_letter).collect();
    if code.is_empty() {
        return code;
    }
    while taken.iter().any(|t| t.as_ref() == code) {
        code.push('f');
    }
    code
}

fn first_letter(word: &str) -> Option<char> {
    for c in word.chars() {
        if c.is_alphabetic() {
            return Some(c);
        }
        if c == '{' {
            return None;
        }
    }
    None
}
