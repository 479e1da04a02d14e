//! Full-value copies
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::{Mapper, Mode};
use crate::error::{Error, Result};
use crate::types::Kind;
use crate::value::{Data, Value};

impl Mapper {
    /// Copy `source` into `target`, zero values included
    ///
    /// Two structs are copied field by field; any other pair goes through the
    /// cascade in copy mode.
    pub(crate) fn copy_into(&self, source: &Value, target: &mut Value) -> Result<()> {
        if source.struct_parts().is_some() && target.struct_parts().is_some() {
            self.merge_fields(target, source, Mode::Copy)
        } else {
            self.coerce(target, source, Mode::Copy)
        }
    }

    /// Copy each element of `source` into a fresh element appended to `target`
    ///
    /// Elements copied before a failure stay appended.
    pub(crate) fn append_copies(&self, source: &Value, target: &mut Value) -> Result<()> {
        let elem = match target.ty().elem() {
            Some(elem) if target.kind() == Kind::Slice => elem.clone(),
            _ => {
                return Err(Error::TypeMismatch {
                    expected: "slice target".to_string(),
                    found: target.ty().to_string(),
                })
            }
        };
        let items = source.indirect().items().ok_or_else(|| Error::TypeMismatch {
            expected: "slice or array source".to_string(),
            found: source.ty().to_string(),
        })?;

        for item in items {
            let mut element = Value::zero(&elem);
            self.copy_into(item, &mut element)?;
            if let Data::List(list) = target.data_mut() {
                list.push(element);
            }
        }
        Ok(())
    }
}
