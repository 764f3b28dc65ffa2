// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic message handle.
//!
//! A [`MessageHandle`] pairs one compiled message descriptor with one mutable
//! dynamic instance of that type. The descriptor is fixed at creation; the
//! instance is replaced by [`MessageHandle::decode`] and mutated in place by
//! [`MessageHandle::set_field`].

use prost::Message;
use prost_reflect::{DynamicMessage, FieldDescriptor, MessageDescriptor, ReflectMessage, Value};
use thiserror::Error;

use crate::coerce::{self, Classified, FieldInput};

/// Errors for handle operations.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("field '{field}' not found in message {message_type}")]
    FieldNotFound { message_type: String, field: String },

    #[error("field '{field}' expects {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("unsupported field kind for '{field}': {kind}")]
    UnsupportedKind { field: String, kind: String },

    #[error("failed to encode message: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("failed to decode {message_type}: {source}")]
    Decode {
        message_type: String,
        #[source]
        source: prost::DecodeError,
    },
}

impl MessageError {
    /// True for both a rejected input kind and an unsupported field kind.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::UnsupportedKind { .. })
    }
}

/// One message type plus one mutable instance of it.
#[derive(Debug, Clone)]
pub struct MessageHandle {
    descriptor: MessageDescriptor,
    message: DynamicMessage,
}

impl MessageHandle {
    /// Create a handle holding a zero-valued instance of `descriptor`.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        let message = DynamicMessage::new(descriptor.clone());
        Self {
            descriptor,
            message,
        }
    }

    /// New zero-valued handle of the same type.
    pub fn fresh(&self) -> Self {
        Self::new(self.descriptor.clone())
    }

    /// Short type name (e.g. `Person`).
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Fully-qualified type name (e.g. `people.v1.Person`).
    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    /// The owning type descriptor.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// The current instance.
    pub fn message(&self) -> &DynamicMessage {
        &self.message
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.descriptor
            .fields()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Serialize the current instance to the binary wire format.
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        let mut buf = Vec::with_capacity(self.message.encoded_len());
        self.message.encode(&mut buf)?;
        Ok(buf)
    }

    /// Size in bytes of [`MessageHandle::encode`]'s output.
    pub fn encoded_len(&self) -> usize {
        self.message.encoded_len()
    }

    /// Replace the current instance with one parsed from `bytes`.
    ///
    /// On error the previous instance is kept unchanged.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<(), MessageError> {
        let decoded = DynamicMessage::decode(self.descriptor.clone(), bytes).map_err(|source| {
            MessageError::Decode {
                message_type: self.descriptor.full_name().to_string(),
                source,
            }
        })?;
        self.message = decoded;
        Ok(())
    }

    /// Coerce `value` to the declared kind of `field` and store it.
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<FieldInput>,
    ) -> Result<(), MessageError> {
        let value = value.into();
        let desc = self.lookup(&self.descriptor, field)?;

        let class = match coerce::classify(&desc) {
            Classified::Supported(class) => class,
            Classified::Unsupported(kind) => {
                return Err(MessageError::UnsupportedKind {
                    field: field.to_string(),
                    kind,
                })
            }
        };

        let mismatch = || MessageError::TypeMismatch {
            field: field.to_string(),
            expected: format!("{}-compatible value", class),
            got: value.kind().to_string(),
        };
        let row = coerce::coercion_for(class).ok_or_else(mismatch)?;
        if !row.accepts.contains(&value.kind()) {
            return Err(mismatch());
        }
        let converted = (row.convert)(&value).ok_or_else(mismatch)?;

        log::trace!(
            "[message] {}.{} <- {:?}",
            self.descriptor.name(),
            field,
            converted
        );
        self.message.set_field(&desc, converted);
        Ok(())
    }

    /// Current value of `field`, or the kind's zero value when unset.
    ///
    /// The field is resolved against the instance's own descriptor.
    pub fn get_field(&self, field: &str) -> Result<Value, MessageError> {
        let desc = self.lookup(&self.message.descriptor(), field)?;
        Ok(self.message.get_field(&desc).into_owned())
    }

    /// Whether `field` holds a non-default value.
    pub fn has_field(&self, field: &str) -> Result<bool, MessageError> {
        let desc = self.lookup(&self.descriptor, field)?;
        Ok(self.message.has_field(&desc))
    }

    /// Reset one field to its zero value.
    pub fn clear_field(&mut self, field: &str) -> Result<(), MessageError> {
        let desc = self.lookup(&self.descriptor, field)?;
        self.message.clear_field(&desc);
        Ok(())
    }

    /// Reset every field.
    pub fn clear(&mut self) {
        self.message.clear();
    }

    fn lookup(
        &self,
        descriptor: &MessageDescriptor,
        field: &str,
    ) -> Result<FieldDescriptor, MessageError> {
        descriptor
            .get_field_by_name(field)
            .ok_or_else(|| MessageError::FieldNotFound {
                message_type: descriptor.full_name().to_string(),
                field: field.to_string(),
            })
    }
}
