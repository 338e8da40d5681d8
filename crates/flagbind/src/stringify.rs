//! Human-readable rendering of flag values for messages and help text.

/// Text form of a value as it appears in help output and error messages.
///
/// - unset (`None`) renders as `N/A`
/// - sequences render their elements joined with `", "`
/// - strings containing whitespace are double-quoted
/// - other scalars use their `Display` form
pub trait Stringify {
    fn stringify(&self) -> String;
}

/// Free-function form of [`Stringify::stringify`].
pub fn stringify<T: Stringify + ?Sized>(value: &T) -> String {
    value.stringify()
}

impl Stringify for str {
    fn stringify(&self) -> String {
        if self.chars().any(char::is_whitespace) {
            format!("\"{self}\"")
        } else {
            self.to_string()
        }
    }
}

impl Stringify for String {
    fn stringify(&self) -> String {
        self.as_str().stringify()
    }
}

impl Stringify for f64 {
    fn stringify(&self) -> String {
        self.to_string()
    }
}

impl Stringify for bool {
    fn stringify(&self) -> String {
        self.to_string()
    }
}

impl<T: Stringify> Stringify for Option<T> {
    fn stringify(&self) -> String {
        match self {
            Some(value) => value.stringify(),
            None => "N/A".to_string(),
        }
    }
}

impl<T: Stringify> Stringify for [T] {
    fn stringify(&self) -> String {
        self.iter()
            .map(Stringify::stringify)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<T: Stringify> Stringify for Vec<T> {
    fn stringify(&self) -> String {
        self.as_slice().stringify()
    }
}

impl<T: Stringify + ?Sized> Stringify for &T {
    fn stringify(&self) -> String {
        (**self).stringify()
    }
}

#[cfg(test)]
mod tests {
    use super::stringify;

    #[test]
    fn unset_is_not_available() {
        assert_eq!(stringify(&None::<String>), "N/A");
        assert_eq!(stringify(&None::<f64>), "N/A");
    }

    #[test]
    fn whitespace_strings_are_quoted() {
        assert_eq!(stringify("plain"), "plain");
        assert_eq!(stringify("two words"), "\"two words\"");
        assert_eq!(stringify("tab\there"), "\"tab\there\"");
        assert_eq!(stringify(""), "");
    }

    #[test]
    fn numbers_use_display_form() {
        assert_eq!(stringify(&3.0), "3");
        assert_eq!(stringify(&-0.5), "-0.5");
        assert_eq!(stringify(&true), "true");
    }

    #[test]
    fn sequences_join_recursively() {
        let modes = vec!["fast".to_string(), "very slow".to_string()];
        assert_eq!(stringify(&modes), "fast, \"very slow\"");

        let nested = vec![vec![1.0, 2.0], vec![3.5]];
        assert_eq!(stringify(&nested), "1, 2, 3.5");

        let sparse = [Some("a"), None];
        assert_eq!(stringify(&sparse[..]), "a, N/A");
    }
}
