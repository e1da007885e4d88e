//! C and C++ standard version resolution.
//!
//! Modules may request a language standard (`c_std`, `cpp_std`) and toggle
//! GNU extensions (`gnu_extensions`, on by default). The destination
//! toolchain expresses the same choice with a single attribute value per
//! language, with `None` standing for the toolchain default.

const GNU_TO_C: &[(&str, &str)] = &[
    ("gnu89", "c89"),
    ("gnu90", "c90"),
    ("gnu99", "c99"),
    ("gnu11", "c11"),
    ("gnu17", "c17"),
    ("gnu++98", "c++98"),
    ("gnu++11", "c++11"),
    ("gnu++14", "c++14"),
    ("gnu++17", "c++17"),
    ("gnu++20", "c++20"),
    ("gnu++2a", "c++2a"),
];

fn replace_gnu_with_c(std: &str) -> String {
    for (gnu, c) in GNU_TO_C {
        if std == *gnu {
            return (*c).to_string();
        }
    }
    std.to_string()
}

/// Resolves one language's standard value.
///
/// `prefix` is `"c"` or `"cpp"`. An unset or `"(default)"` standard maps to
/// the toolchain default, `"experimental"` to the experimental default; both
/// gain a `_no_gnu` suffix when GNU extensions are disabled. Any other value
/// passes through, with `gnuXX` rewritten to `cXX` when GNU extensions are
/// disabled. Returns `None` when the result is the plain default, so the
/// attribute can stay unset.
fn std_val(std: Option<&str>, prefix: &str, use_gnu: bool) -> Option<String> {
    let default = format!("{prefix}_std_default");
    let mut value = match std {
        None | Some("") | Some("(default)") => default.clone(),
        Some("experimental") => format!("{prefix}_std_experimental"),
        Some(other) => other.to_string(),
    };
    if value.ends_with("_std_default") || value.ends_with("_std_experimental") {
        if !use_gnu {
            value.push_str("_no_gnu");
        }
    } else if !use_gnu {
        value = replace_gnu_with_c(&value);
    }
    if value == default { None } else { Some(value) }
}

/// Resolves both standard attributes for a module's unconditional slot.
pub fn resolve_cpp_std_value(
    c_std: Option<&str>,
    cpp_std: Option<&str>,
    gnu_extensions: Option<bool>,
) -> (Option<String>, Option<String>) {
    let use_gnu = gnu_extensions.unwrap_or(true);
    (std_val(c_std, "c", use_gnu), std_val(cpp_std, "cpp", use_gnu))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_stay_unset() {
        assert_eq!(resolve_cpp_std_value(None, None, None), (None, None));
        assert_eq!(
            resolve_cpp_std_value(Some(""), Some("(default)"), Some(true)),
            (None, None)
        );
    }

    #[test]
    fn disabling_gnu_extensions_marks_defaults() {
        let (c, cpp) = resolve_cpp_std_value(None, None, Some(false));
        assert_eq!(c.as_deref(), Some("c_std_default_no_gnu"));
        assert_eq!(cpp.as_deref(), Some("cpp_std_default_no_gnu"));
    }

    #[test]
    fn experimental_gets_its_own_value() {
        let (c, cpp) = resolve_cpp_std_value(Some("experimental"), Some("experimental"), None);
        assert_eq!(c.as_deref(), Some("c_std_experimental"));
        assert_eq!(cpp.as_deref(), Some("cpp_std_experimental"));
    }

    #[test]
    fn gnu_variants_are_rewritten_without_extensions() {
        let (c, cpp) =
            resolve_cpp_std_value(Some("gnu99"), Some("gnu++17"), Some(false));
        assert_eq!(c.as_deref(), Some("c99"));
        assert_eq!(cpp.as_deref(), Some("c++17"));
    }

    #[test]
    fn gnu_variants_pass_through_with_extensions() {
        let (c, cpp) = resolve_cpp_std_value(Some("gnu11"), Some("gnu++20"), Some(true));
        assert_eq!(c.as_deref(), Some("gnu11"));
        assert_eq!(cpp.as_deref(), Some("gnu++20"));
    }
}
