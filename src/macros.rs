/// Builds a [`Var`](crate::Var) from a JSON-like literal.
///
/// Nested arrays and objects are written inline; anything else goes through
/// `Var::from`. Negative numbers need parentheses inside arrays and objects.
///
/// ```rust
/// use serde_xdl::{encode_xdl, xdl};
///
/// let v = xdl!({ "name": "probe", "ranges": [1, 2.5, (-3)], "on": true });
/// assert_eq!(encode_xdl(&v).unwrap(), "{name=\"probe\",ranges=[1,2.5,-3],on=Y}");
/// ```
#[macro_export]
macro_rules! xdl {
    (null) => {
        $crate::Var::Nul
    };

    (true) => {
        $crate::Var::Bool(true)
    };

    (false) => {
        $crate::Var::Bool(false)
    };

    ([]) => {
        $crate::Var::array()
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Var::from(vec![$($crate::xdl!($elem)),*])
    };

    ({}) => {
        $crate::Var::object()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Dict::new();
        $(
            object.insert($key.to_string(), $crate::xdl!($value));
        )*
        $crate::Var::from(object)
    }};

    ($other:expr) => {
        $crate::Var::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Kind, Var};

    #[test]
    fn test_xdl_macro_primitives() {
        assert!(xdl!(null).is(Kind::Nul));
        assert_eq!(xdl!(true), true);
        assert_eq!(xdl!(false), false);
        assert_eq!(xdl!(42), 42);
        assert_eq!(xdl!(3.5), 3.5);
        assert_eq!(xdl!("hello"), "hello");
    }

    #[test]
    fn test_xdl_macro_arrays() {
        assert!(xdl!([]).is(Kind::Array));
        assert!(xdl!([]).is_empty());

        let arr = xdl!([1, "two", [3]]);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.at(0), 1);
        assert_eq!(arr.at(1), "two");
        assert_eq!(arr.at(2).at(0), 3);
    }

    #[test]
    fn test_xdl_macro_objects() {
        assert_eq!(xdl!({}), Var::object());

        let obj = xdl!({
            "name": "Alice",
            "age": 30,
            "address": { "city": "Paris" }
        });
        assert_eq!(obj.keys(), vec!["name", "age", "address"]);
        assert_eq!(obj.get("age"), 30);
        assert_eq!(obj.get("address").get("city"), "Paris");
    }
}
