use crate::config::Config;
use unicode_normalization::UnicodeNormalization;

/// Cleans one page of extracted text before it is written to the text file.
pub fn normalize_page(cfg: &Config, page: &str) -> String {
    let mut out = page.to_string();

    if cfg.postprocess.normalize_newlines {
        out = out.replace("\r\n", "\n").replace('\r', "\n");
    }

    out = sanitize_control_chars(&out, &cfg.postprocess.control_chars_to_sanitize);

    if cfg.postprocess.trim_trailing_whitespace {
        out = out
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
    }

    out
}

fn sanitize_control_chars(s: &str, codes: &[u8]) -> String {
    if codes.is_empty() {
        return s.to_string();
    }

    let mut mask = [false; 128];
    for &code in codes {
        if (code as usize) < mask.len() {
            mask[code as usize] = true;
        }
    }

    s.chars()
        .filter(|&ch| {
            // Line structure is what the parser anchors on.
            if ch == '\n' || ch == '\r' || ch == '\t' {
                return true;
            }
            let cp = ch as u32;
            if cp < 128 { !mask[cp as usize] } else { true }
        })
        .collect()
}

/// Compatibility-folded lowercase form used for stoplist comparison, so a
/// ligature such as `ﬀ` compares equal to `ff`.
pub fn fold(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_expands_ligatures() {
        assert_eq!(fold("cause-and-eﬀect,"), "cause-and-effect,");
        assert_eq!(fold("Harmony"), "harmony");
    }
}
