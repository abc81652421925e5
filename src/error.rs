use derive_more::{Constructor, Display, Error};

/// A coordinate or data variable whose dimensions or lengths cannot be laid out on the mesh
#[derive(Display, Debug, Clone, PartialEq, Constructor, Error)]
#[display(fmt = "shape mismatch for `{name}`: {reason}")]
pub struct ShapeMismatch {
    pub(crate) name: String,
    pub(crate) reason: String,
}

impl ShapeMismatch {
    pub(crate) fn of<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::new(name.into(), reason.into())
    }

    /// name of the offending variable or dimension
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A requested index or parameter outside of its valid range
#[derive(Display, Debug, Clone, PartialEq, Constructor, Error)]
#[display(fmt = "{what} = {value} is outside of the valid range {range}")]
pub struct OutOfRange {
    pub(crate) what: String,
    pub(crate) value: String,
    pub(crate) range: String,
}

impl OutOfRange {
    pub(crate) fn index(what: &str, value: usize, len: usize) -> Self {
        Self::new(what.into(), value.to_string(), format!("[0, {len})"))
    }

    /// the parameter that was out of range, such as `time_index`
    pub fn what(&self) -> &str {
        &self.what
    }
}

#[test]
fn error_display() {
    let err = crate::Error::from(ShapeMismatch::of("lon", "length 3 along `x`, data has 4"));
    assert_eq!(
        err.to_string(),
        "shape mismatch for `lon`: length 3 along `x`, data has 4"
    );

    let err = crate::Error::from(OutOfRange::index("time_index", 5, 3));
    assert!(err.to_string().contains("[0, 3)"));
}
