// src/macros.rs

/// `String` shorthand: `s!()` is empty, `s!(x)` is `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate string slices into a fresh `String`, e.g. file names from a
/// stem and an extension.
#[macro_export]
macro_rules! join {
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn string_shorthands() {
        assert_eq!(s!(), "");
        assert_eq!(s!("Gucci"), "Gucci");
        assert_eq!(join!("us_discount_policy", ".", "tsv"), "us_discount_policy.tsv");
    }
}
