//! Runtime-described objects.
//!
//! When a type cannot derive [`RequestFields`], an [`ObjectDescriptor`]
//! lists its fields and roles and a [`Record`] reads them from the
//! object's JSON form.
//!
//! # Example
//!
//! ```
//! use stencil_core::{ObjectDescriptor, Record, Request};
//!
//! let schema = ObjectDescriptor::new("Pull")
//!     .path("owner", "owner")
//!     .query("state", "state")
//!     .body("draft");
//! let value = serde_json::json!({"owner": "apache", "state": "open", "draft": true});
//!
//! let request = Request::from_object(None, &Record::new(&schema, &value)).expect("record");
//! assert_eq!(request.path_param("owner"), Some("apache"));
//! assert_eq!(request.body(), Some(r#"{"draft":true}"#));
//! ```

use serde::Serialize;

use crate::params::render_param;
use crate::{Field, RequestFields, Result, Role};

/// A declared field of an [`ObjectDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Key of the field in the JSON form of the object.
    pub key: String,
    /// Role of the field.
    pub role: Role,
    /// Wire name of the field.
    pub name: String,
}

/// Field list of a runtime-described object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl ObjectDescriptor {
    /// Empty descriptor for type `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Declare a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, role: Role, name: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor {
            key: key.into(),
            role,
            name: name.into(),
        });
        self
    }

    /// Declare a path field.
    #[must_use]
    pub fn path(self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.field(key, Role::Path, name)
    }

    /// Declare a query field.
    #[must_use]
    pub fn query(self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.field(key, Role::Query, name)
    }

    /// Declare a header field.
    #[must_use]
    pub fn header(self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.field(key, Role::Header, name)
    }

    /// Declare a body field, written under its own key.
    #[must_use]
    pub fn body(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.field(key.clone(), Role::Body, key)
    }
}

/// An object value read through an [`ObjectDescriptor`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    descriptor: &'a ObjectDescriptor,
    value: &'a serde_json::Value,
}

impl<'a> Record<'a> {
    /// Pair a descriptor with the JSON form of an object.
    #[must_use]
    pub const fn new(descriptor: &'a ObjectDescriptor, value: &'a serde_json::Value) -> Self {
        Self { descriptor, value }
    }

    fn get(&self, key: &str) -> Result<&'a serde_json::Value> {
        self.value
            .get(key)
            .ok_or_else(|| crate::Error::field_access(&self.descriptor.name, key))
    }
}

impl RequestFields for Record<'_> {
    fn type_name(&self) -> &'static str {
        "Record"
    }

    fn fields(&self) -> Result<Vec<Field>> {
        self.descriptor
            .fields
            .iter()
            .map(|field| {
                let value = self.get(&field.key)?;
                let value = if field.role == Role::Body {
                    None
                } else {
                    render_param(&field.name, Ok(value.clone()))?
                };
                Ok(Field::new(field.role, field.name.clone(), value))
            })
            .collect()
    }

    fn body(&self) -> Result<Option<serde_json::Value>> {
        let mut body = serde_json::Map::new();
        for field in self.descriptor.fields.iter().filter(|f| f.role == Role::Body) {
            body.insert(field.name.clone(), self.get(&field.key)?.clone());
        }
        Ok((!body.is_empty()).then_some(serde_json::Value::Object(body)))
    }
}

/// An owned object value with its descriptor.
///
/// Convenience over [`Record`] for any serializable value.
#[derive(Debug, Clone)]
pub struct OwnedRecord {
    descriptor: ObjectDescriptor,
    value: serde_json::Value,
}

impl OwnedRecord {
    /// Serialize `value` and pair it with `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodySerialization`](crate::Error::BodySerialization)
    /// if `value` cannot be serialized.
    pub fn new<T: Serialize + ?Sized>(descriptor: ObjectDescriptor, value: &T) -> Result<Self> {
        Ok(Self {
            descriptor,
            value: serde_json::to_value(value)?,
        })
    }

    /// Borrow as a [`Record`].
    #[must_use]
    pub const fn as_record(&self) -> Record<'_> {
        Record::new(&self.descriptor, &self.value)
    }
}

impl RequestFields for OwnedRecord {
    fn type_name(&self) -> &'static str {
        "OwnedRecord"
    }

    fn fields(&self) -> Result<Vec<Field>> {
        self.as_record().fields()
    }

    fn body(&self) -> Result<Option<serde_json::Value>> {
        self.as_record().body()
    }
}
