//! Binary media values
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Wrapper;
use crate::error::Result;
use crate::reflect::{Bytes, Reflect};
use crate::types::{FieldDesc, Type};
use crate::value::{Data, Value};

/// An uploaded file: location, MIME type and content
///
/// All state is private, so the mapper only ever moves a `Media` whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
    url: String,
    mime_type: String,
    content: Vec<u8>,
}

impl Media {
    pub fn new(
        url: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl Reflect for Media {
    fn reflect_type() -> Type {
        Type::structure(
            "Media",
            vec![
                FieldDesc::new("url", Type::string()).hidden(),
                FieldDesc::new("mime_type", Type::string()).hidden(),
                FieldDesc::new("content", Type::bytes()).hidden(),
            ],
        )
    }

    fn to_value(&self) -> Value {
        Value::from_parts(
            Self::reflect_type(),
            Data::Struct(vec![
                self.url.to_value(),
                self.mime_type.to_value(),
                Value::bytes(self.content.clone()),
            ]),
        )
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            url: String::from_value(value.require_field("url")?)?,
            mime_type: String::from_value(value.require_field("mime_type")?)?,
            content: Bytes::from_value(value.require_field("content")?)?.0,
        })
    }
}

/// Opaque marker, no custom coercion
#[derive(Debug, Clone, Copy)]
pub struct MediaWrapper;

impl Wrapper for MediaWrapper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ObjectModel;

    #[test]
    fn test_media_has_no_visible_fields() {
        let value = Media::new("s3://bucket/a.png", "image/png", vec![1, 2, 3]).to_value();
        assert!(ObjectModel::new(&value).keys().is_empty());
        assert!(!value.is_zero());
    }

    #[test]
    fn test_media_round_trip() {
        let media = Media::new("file:///tmp/a.txt", "text/plain", b"hello".to_vec());
        assert_eq!(Media::from_value(&media.to_value()).unwrap(), media);
    }
}
