//! Placeholder substitution
//!
//! Purely textual: `{name}` is replaced when `name` is in the arguments and
//! left as written otherwise. Substituted text is never rescanned.

use std::collections::BTreeMap;

/// Placeholder name to replacement text
pub type TemplateArgs = BTreeMap<String, String>;

/// Replace every `{key}` present in `args`
pub fn substitute(template: &str, args: &TemplateArgs) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let key = &after[..close];
                match args.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                // Unbalanced brace: keep it literally
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Build arguments from pairs
pub fn args<K, V, I>(pairs: I) -> TemplateArgs
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
