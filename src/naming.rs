use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Leading topic number (`6_`, `-1_`, `12 `) in collaborator labels. Terms that
/// merely start with digits (`5ghz`, `2fa`) are not a prefix.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d+(?:[\s_]+|$)").expect("NUMERIC_PREFIX: invalid pattern")
});

/// Function words dropped from display titles only.
const DISPLAY_STOPWORDS: &[&str] = &[
    "de", "het", "een", "voor", "van", "met", "op", "in", "bij", "te", "om", "door", "the", "a",
    "an", "of", "for", "to", "with", "on", "at", "by",
];

/// Turn a raw label like `"6_printer_printen_papercut_printer"` into a title
/// like `"Printer printen papercut"`.
pub fn clean_topic_name(raw: &str) -> String {
    let without_prefix = NUMERIC_PREFIX.replace(raw, "");
    let spaced = without_prefix.replace('_', " ");

    let mut seen: HashSet<String> = HashSet::new();
    let words: Vec<&str> = spaced
        .split_whitespace()
        .filter(|w| seen.insert(fold_case(w)))
        .filter(|w| !DISPLAY_STOPWORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    capitalize_first(&words.join(" "))
}

/// Case-insensitive key: `ß`, `SS` and `ss` compare equal.
fn fold_case(word: &str) -> String {
    word.to_uppercase().to_lowercase()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_label() {
        assert_eq!(
            clean_topic_name("6_printer_printen_papercut_printer"),
            "Printer printen papercut"
        );
    }

    #[test]
    fn strips_outlier_and_spaced_prefixes() {
        assert_eq!(clean_topic_name("-1_wifi_down"), "Wifi down");
        assert_eq!(clean_topic_name("12 vpn_token"), "Vpn token");
    }

    #[test]
    fn drops_display_stopwords() {
        assert_eq!(
            clean_topic_name("3_aanvraag_voor_de_laptop"),
            "Aanvraag laptop"
        );
        assert_eq!(clean_topic_name("4_the_reset_of_password"), "Reset password");
    }

    #[test]
    fn dedup_is_case_insensitive() {
        assert_eq!(clean_topic_name("2_VPN_vpn_Token_token"), "VPN Token");
    }

    #[test]
    fn keeps_rest_of_casing() {
        assert_eq!(clean_topic_name("1_sAP_Login"), "SAP Login");
    }

    #[test]
    fn empty_and_prefix_only() {
        assert_eq!(clean_topic_name(""), "");
        assert_eq!(clean_topic_name("7_"), "");
        assert_eq!(clean_topic_name("5_de_het"), "");
    }

    #[test]
    fn idempotent_on_clean_labels() {
        for label in [
            "printer_printen_papercut",
            "Wifi down",
            "outlook agenda sync",
            "de_5ghz_wifi",
            "2fa_reset",
        ] {
            let once = clean_topic_name(label);
            assert_eq!(clean_topic_name(&once), once);
        }
    }

    #[test]
    fn digit_led_terms_are_not_prefixes() {
        assert_eq!(clean_topic_name("de_5ghz_wifi"), "5ghz wifi");
        assert_eq!(clean_topic_name("3_2fa_reset"), "2fa reset");
        assert_eq!(clean_topic_name("42"), "");
    }

    #[test]
    fn dedup_uses_full_case_folding() {
        let cleaned = clean_topic_name("ß_ss_wifi");
        assert_eq!(cleaned, "SS wifi");
        assert_eq!(clean_topic_name(&cleaned), cleaned);
    }

    #[test]
    fn never_repeats_words() {
        let cleaned = clean_topic_name("9_Mail_mail_MAIL_outlook_Outlook_mail");
        let lowered: Vec<String> = cleaned.split(' ').map(str::to_lowercase).collect();
        let unique: HashSet<&String> = lowered.iter().collect();
        assert_eq!(unique.len(), lowered.len());
        assert_eq!(cleaned, "Mail outlook");
    }
}
