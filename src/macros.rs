/// Builds a [`Record`](crate::Record).
///
/// ```rust
/// use keyval::{record, Record};
///
/// assert_eq!(record!(["a", "b"] => "v"), Record::new(["a", "b"], "v"));
/// assert_eq!(
///     record!(["a"] => "v", comment: "note"),
///     Record::new(["a"], "v").with_comment("note")
/// );
/// assert_eq!(record!([] => "v"), Record::value_only("v"));
/// assert_eq!(record!(comment: "note"), Record::comment_only("note"));
/// ```
#[macro_export]
macro_rules! record {
    (comment: $comment:expr $(,)?) => {
        $crate::Record::comment_only($comment)
    };

    ([ $($segment:expr),* $(,)? ] => $value:expr $(, comment: $comment:expr)?) => {{
        #[allow(unused_mut)]
        let mut record = $crate::Record {
            key: vec![$(::std::string::String::from($segment)),*],
            value: ::std::string::String::from($value),
            comment: ::std::string::String::new(),
        };
        $(
            record.comment = ::std::string::String::from($comment);
        )?
        record
    }};
}
