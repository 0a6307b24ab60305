//! Single-pass placeholder substitution for locator templates

/// Placeholder carrying the device codename
pub const DEVICE: &str = "device";
/// Placeholder carrying a version string
pub const VERSION: &str = "version";

/// Render `template`, replacing each `{name}` whose name appears in `vars`.
///
/// The template is scanned once from left to right and substituted values
/// are never scanned again, so a value that itself contains `{device}` is
/// copied verbatim. Placeholders not listed in `vars` are kept as written
/// and logged; rendering never fails.
pub(crate) fn render(template_name: &str, template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let placeholder = &after[..close];
        if let Some((_, value)) = vars.iter().find(|(name, _)| *name == placeholder) {
            out.push_str(value);
            rest = &after[close + 1..];
            continue;
        }

        if !placeholder.contains('{') {
            tracing::warn!(
                template = template_name,
                placeholder,
                "placeholder not declared for this template, left as is"
            );
        }
        // Only the brace is literal; a placeholder may still open inside the span
        out.push('{');
        rest = after;
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_occurrence() {
        let rendered = render(
            "url_base_json",
            "https://dl/{device}/{device}.json",
            &[(DEVICE, "guacamole")],
        );
        assert_eq!(rendered, "https://dl/guacamole/guacamole.json");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let rendered = render("filename_base", "omni-{version}", &[(VERSION, "{version}")]);
        assert_eq!(rendered, "omni-{version}");
    }

    #[test]
    fn undeclared_placeholders_stay_verbatim() {
        let rendered = render("url_base_delta", "https://d/{device}/{version}/", &[(DEVICE, "x")]);
        assert_eq!(rendered, "https://d/x/{version}/");
    }

    #[test]
    fn stray_brace_does_not_hide_placeholder() {
        let rendered = render(
            "url_base_json",
            "https://x/?q={a{device}",
            &[(DEVICE, "guac")],
        );
        assert_eq!(rendered, "https://x/?q={aguac");
        assert_eq!(render("t", "{{device}}", &[(DEVICE, "x")]), "{x}");
    }

    #[test]
    fn unbalanced_braces_are_copied() {
        assert_eq!(render("t", "a{b", &[]), "a{b");
        assert_eq!(render("t", "a}b{", &[]), "a}b{");
        assert_eq!(render("t", "", &[(DEVICE, "x")]), "");
    }
}
