/// Builds a frozen [`Value`](crate::value::Value) from HOCON-like syntax.
///
/// ```
/// use hocon_tree::hocon;
///
/// let value = hocon!({ server { host: "localhost", ports: [80, 443] }, debug = false });
/// assert_eq!(value.get_by_path(["server", "host"]), Some(&hocon!("localhost")));
/// ```
#[macro_export]
macro_rules! hocon {
    ({ $($content:tt)* }) => {
        $crate::value::Value::Object($crate::hocon_object!(@internal {} $($content)*))
    };
    ([ $($content:tt)* ]) => {
        $crate::value::Value::Array($crate::hocon_array!(@internal [] $($content)*))
    };
    ($e:expr) => {
        $crate::value::Value::from($e)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! hocon_object {
    (@internal { $($k:expr => $v:expr),* } ) => {
        {
            #[allow(unused_mut)]
            let mut map = $crate::indexmap::IndexMap::new();
            $(
                map.insert($k, $v);
            )*
            map
        }
    };

    (@internal { $($k:expr => $v:expr),* } $key:ident = $val:tt $($rest:tt)*) => {
        $crate::hocon_object!(@internal { $($k => $v,)* String::from(stringify!($key)) => $crate::hocon_value!($val) } $($rest)*)
    };

    (@internal { $($k:expr => $v:expr),* } $key:ident : $val:tt $($rest:tt)*) => {
        $crate::hocon_object!(@internal { $($k => $v,)* String::from(stringify!($key)) => $crate::hocon_value!($val) } $($rest)*)
    };

    (@internal { $($k:expr => $v:expr),* } $key:literal : $val:tt $($rest:tt)*) => {
        $crate::hocon_object!(@internal { $($k => $v,)* $key.to_string() => $crate::hocon_value!($val) } $($rest)*)
    };

    (@internal { $($k:expr => $v:expr),* } $key:literal = $val:tt $($rest:tt)*) => {
        $crate::hocon_object!(@internal { $($k => $v,)* $key.to_string() => $crate::hocon_value!($val) } $($rest)*)
    };

    // `key { ... }` without a separator
    (@internal { $($k:expr => $v:expr),* } $key:ident { $($sub_content:tt)* } $($rest:tt)*) => {
        $crate::hocon_object!(@internal { $($k => $v,)* String::from(stringify!($key)) => $crate::hocon!({ $($sub_content)* }) } $($rest)*)
    };

    (@internal { $($k:expr => $v:expr),* } , $($rest:tt)*) => {
        $crate::hocon_object!(@internal { $($k => $v),* } $($rest)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! hocon_array {
    (@internal [ $($val:expr),* ] ) => {
        {
            #[allow(unused_mut)]
            let mut vec = ::std::vec::Vec::new();
            $(
                vec.push($val);
            )*
            vec
        }
    };
    (@internal [ $($val:expr),* ] , $($tail:tt)*) => {
        $crate::hocon_array!(@internal [ $($val),* ] $($tail)*)
    };
    (@internal [ $($val:expr),* ] $head:tt $($tail:tt)*) => {
        $crate::hocon_array!(@internal [ $($val,)* $crate::hocon_value!($head) ] $($tail)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! hocon_value {
    (null) => {
        $crate::value::Value::Null
    };
    ({ $($content:tt)* }) => {
        $crate::hocon!({ $($content)* })
    };
    ([ $($content:tt)* ]) => {
        $crate::hocon!([ $($content)* ])
    };
    ($lit:literal) => {
        $crate::value::Value::from($lit)
    };
    ($e:expr) => {
        $crate::value::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::value::Value;

    #[test]
    fn test_hocon_macro() {
        let port = 8080;
        let value = hocon!({
            name = "demo",
            "quoted key": true,
            server { port: port, tags: ["a", "b"] },
            empty: {},
            nothing: null
        });
        let Value::Object(object) = &value else {
            panic!("expected an object");
        };
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "quoted key", "server", "empty", "nothing"]);
        assert_eq!(value.get_by_path(["server", "port"]), Some(&Value::from(8080)));
        assert_eq!(
            value.get_by_path(["server", "tags"]),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(value.get_by_path(["nothing"]), Some(&Value::Null));
        assert_eq!(hocon!([]), Value::Array(vec![]));
    }
}
