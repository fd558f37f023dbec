use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot convert `{source_type}` to `{dest_type}`")]
    NoConversion {
        source_type: &'static str,
        dest_type: &'static str,
    },
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Type-mismatch error for an accessor invoked on the wrong tag.
    pub fn no_conversion(value: &crate::Value, dest_type: &'static str) -> Self {
        Self::NoConversion {
            source_type: value.variant_name(),
            dest_type,
        }
    }
}
