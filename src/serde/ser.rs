use crate::Result;
use crate::value::Value;
use serde::ser::Serialize;
use std::io;

#[inline]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    serde_json::to_writer(writer, value)?;
    Ok(())
}

#[inline]
pub fn to_writer_pretty<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[inline]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let data = serde_json::to_vec(value)?;
    Ok(data)
}

#[inline]
pub fn to_vec_pretty<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let data = serde_json::to_vec_pretty(value)?;
    Ok(data)
}

#[inline]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let string = serde_json::to_string(value)?;
    Ok(string)
}

#[inline]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let string = serde_json::to_string_pretty(value)?;
    Ok(string)
}

/// Converts any serializable type into a frozen value.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    Ok(Value::from(serde_json::to_value(value)?))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use crate::hocon;
    use crate::serde::ser;
    use crate::value::Value;

    #[derive(Serialize)]
    struct Limits {
        max: u32,
        names: Vec<&'static str>,
    }

    #[test]
    fn test_serialization() -> crate::Result<()> {
        let value = Value::Array(vec![hocon!(1), hocon!(2), hocon!(3)]);
        let mut w = vec![];
        ser::to_writer(&mut w, &value)?;
        assert_eq!(w, b"[1,2,3]");
        assert!(ser::to_writer_pretty(&mut w, &value).is_ok());
        assert_eq!(ser::to_vec(&value)?, b"[1,2,3]");
        assert!(!ser::to_vec_pretty(&value)?.is_empty());
        assert_eq!(ser::to_string(&value)?, "[1,2,3]");
        assert_eq!(ser::to_string_pretty(&value)?, "[\n  1,\n  2,\n  3\n]");
        Ok(())
    }

    #[test]
    fn test_to_value() -> crate::Result<()> {
        let limits = Limits {
            max: 3,
            names: vec!["a", "b"],
        };
        assert_eq!(ser::to_value(&limits)?, hocon!({ max: 3, names: ["a", "b"] }));
        Ok(())
    }
}
