//! Screenshot filename sanitization
//!
//! Both the capture side (the E2E harness) and the lookup side (the report
//! generator) must derive identical filenames from a scenario/step triple,
//! so the rule lives in exactly one place.

/// Characters that are unsafe in filenames across platforms
const FORBIDDEN: &[char] = &['"', ':', '<', '>', '|', '*', '?', '\r', '\n'];

/// Replace forbidden characters and spaces with underscores, collapsing
/// runs of underscores to one. Idempotent.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for ch in name.chars() {
        let mapped = if ch == ' ' || FORBIDDEN.contains(&ch) {
            '_'
        } else {
            ch
        };
        if mapped == '_' {
            if !last_was_underscore {
                out.push('_');
            }
            last_was_underscore = true;
        } else {
            out.push(mapped);
            last_was_underscore = false;
        }
    }
    out
}

/// File stem for a step screenshot: the scenario/keyword/step triple joined
/// with underscores, sanitized. Extension is chosen by the caller.
pub fn screenshot_stem(scenario: &str, keyword: &str, step: &str) -> String {
    sanitize_filename(&format!("{}_{}_{}", scenario, keyword, step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_forbidden_characters() {
        assert_eq!(sanitize_filename(r#"a"b:c<d>e|f*g?h"#), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_filename("line\r\nbreak"), "line_break");
    }

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(sanitize_filename("Default greeting"), "Default_greeting");
    }

    #[test]
    fn test_collapses_runs_of_underscores() {
        assert_eq!(sanitize_filename("a  b"), "a_b");
        assert_eq!(sanitize_filename("a__b"), "a_b");
        assert_eq!(sanitize_filename("a _ b"), "a_b");
    }

    #[test]
    fn test_idempotent() {
        let once = sanitize_filename(r#"Scenario: does "weird" things?"#);
        assert_eq!(sanitize_filename(&once), once);
    }

    #[test]
    fn test_screenshot_stem() {
        assert_eq!(
            screenshot_stem("Default greeting", "Then", r#"I should see "Hello World""#),
            "Default_greeting_Then_I_should_see_Hello_World_"
        );
    }
}
