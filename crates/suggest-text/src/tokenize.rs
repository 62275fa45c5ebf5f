//! Query/candidate text normalization and tokenization.

/// Lowercase, trim and strip stray punctuation, keeping word characters,
/// digits, hyphens, apostrophes and single spaces.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '\'' {
            out.extend(ch.to_lowercase());
            last_space = false;
        } else if ch.is_whitespace() || ch.is_ascii_punctuation() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Split into lowercase word tokens: runs starting with a letter and
/// continuing with letters, hyphens or apostrophes, at least two
/// characters long.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        let extend = if current.is_empty() {
            ch.is_alphabetic()
        } else {
            ch.is_alphabetic() || ch == '-' || ch == '\''
        };
        if extend {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            push_token(&mut tokens, &mut current);
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, &mut current);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    if current.chars().count() >= 2 {
        tokens.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  Find a Doctor, NOW!!  "), "find a doctor now");
        assert_eq!(normalize("well-known  o'brien"), "well-known o'brien");
    }

    #[test]
    fn tokenize_keeps_word_like_runs() {
        assert_eq!(
            tokenize("Dr. John Smith, family-doctor"),
            vec!["dr", "john", "smith", "family-doctor"]
        );
        assert!(tokenize("a 1 2").is_empty(), "single letters and digits dropped");
    }
}
