// src/extractors/schema.rs

//! Field declarations and their resolution into column rules.
//!
//! A record type lists its fields (name, source column, optional extractor
//! override, setter) and its named extractors on a [`SchemaBuilder`]. The
//! builder resolves every field to exactly one extractor, checks that the
//! extractor's value type matches the field, and composes the pair into a
//! single closure. Names are never consulted again after that.

use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use scraper::ElementRef;

use crate::utils::error::{ExtractError, SchemaError};

/// Signature every extractor has: one cell in, one value out.
pub type ExtractFn<V> = fn(ElementRef<'_>) -> Result<V, ExtractError>;

type ErasedExtract = Arc<dyn Fn(ElementRef<'_>) -> Result<Box<dyn Any>, ExtractError> + Send + Sync>;
type ErasedAssign<T> = Arc<dyn Fn(&mut T, Box<dyn Any>) -> bool + Send + Sync>;
type ApplyFn<T> = Box<dyn Fn(&mut T, ElementRef<'_>) -> Result<(), ExtractError> + Send + Sync>;

/// A record type the table engine can materialize.
pub trait TableRecord: Default + Sized + 'static {
    /// Name used in errors and logs.
    const KIND: &'static str;
    /// Endpoint serving this record type's board (`{PATH}.php`).
    const PATH: &'static str;

    fn declare(schema: &mut SchemaBuilder<Self>);
}

/// Declared metadata of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub column: usize,
    pub extractor: Option<&'static str>,
}

impl FieldSchema {
    /// The explicit override, else `get_<field>`.
    pub fn extractor_name(&self) -> Cow<'static, str> {
        match self.extractor {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("get_{}", self.name)),
        }
    }
}

struct DeclaredField<T> {
    schema: FieldSchema,
    input: TypeId,
    input_name: &'static str,
    assign: ErasedAssign<T>,
}

struct NamedExtractor {
    name: &'static str,
    output: TypeId,
    output_name: &'static str,
    call: ErasedExtract,
}

pub struct SchemaBuilder<T> {
    fields: Vec<DeclaredField<T>>,
    extractors: Vec<NamedExtractor>,
}

impl<T: TableRecord> SchemaBuilder<T> {
    pub(crate) fn new() -> Self {
        Self { fields: Vec::new(), extractors: Vec::new() }
    }

    /// Declares a field bound by convention to `get_<name>`.
    pub fn field<V, F>(&mut self, name: &'static str, column: usize, set: F) -> &mut Self
    where
        V: 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push_field(FieldSchema { name, column, extractor: None }, set)
    }

    /// Declares a field bound to an explicitly named extractor.
    pub fn field_via<V, F>(&mut self, name: &'static str, column: usize, extractor: &'static str, set: F) -> &mut Self
    where
        V: 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push_field(FieldSchema { name, column, extractor: Some(extractor) }, set)
    }

    pub fn extractor<V: 'static>(&mut self, name: &'static str, f: ExtractFn<V>) -> &mut Self {
        self.extractors.push(NamedExtractor {
            name,
            output: TypeId::of::<V>(),
            output_name: type_name::<V>(),
            call: Arc::new(move |cell: ElementRef<'_>| f(cell).map(|v| Box::new(v) as Box<dyn Any>)),
        });
        self
    }

    fn push_field<V, F>(&mut self, schema: FieldSchema, set: F) -> &mut Self
    where
        V: 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign: ErasedAssign<T> = Arc::new(move |record: &mut T, value: Box<dyn Any>| {
            match value.downcast::<V>() {
                Ok(v) => {
                    set(record, *v);
                    true
                }
                Err(_) => false,
            }
        });
        self.fields.push(DeclaredField {
            schema,
            input: TypeId::of::<V>(),
            input_name: type_name::<V>(),
            assign,
        });
        self
    }

    /// Binds every declared field. Fails on the first field whose extractor
    /// is missing or yields the wrong type; never returns a partial schema.
    pub(crate) fn resolve(self) -> Result<ResolvedSchema<T>, SchemaError> {
        for (i, ex) in self.extractors.iter().enumerate() {
            if self.extractors[..i].iter().any(|other| other.name == ex.name) {
                return Err(SchemaError::DuplicateExtractor { record: T::KIND, extractor: ex.name });
            }
        }

        let mut columns: Vec<ColumnRules<T>> = Vec::new();
        for field in self.fields {
            let wanted = field.schema.extractor_name();
            let extractor = self
                .extractors
                .iter()
                .find(|ex| ex.name == wanted)
                .ok_or_else(|| SchemaError::MissingExtractor {
                    record: T::KIND,
                    field: field.schema.name,
                    extractor: wanted.to_string(),
                })?;

            if extractor.output != field.input {
                return Err(SchemaError::TypeMismatch {
                    record: T::KIND,
                    field: field.schema.name,
                    extractor: wanted.to_string(),
                    expected: field.input_name,
                    found: extractor.output_name,
                });
            }

            let binding = Binding::compose(field.schema, extractor.name, extractor.call.clone(), field.assign);
            match columns.iter_mut().find(|c| c.column == binding.field.column) {
                Some(group) => group.bindings.push(binding),
                None => columns.push(ColumnRules { column: binding.field.column, bindings: vec![binding] }),
            }
        }

        Ok(ResolvedSchema { record: T::KIND, columns })
    }
}

/// A field paired with its resolved extractor.
pub struct Binding<T> {
    field: FieldSchema,
    extractor: &'static str,
    apply: ApplyFn<T>,
}

impl<T: 'static> Binding<T> {
    fn compose(field: FieldSchema, extractor: &'static str, extract: ErasedExtract, assign: ErasedAssign<T>) -> Self {
        let name = field.name;
        let apply: ApplyFn<T> = Box::new(move |record: &mut T, cell: ElementRef<'_>| {
            let value = extract(cell)?;
            if assign(record, value) {
                Ok(())
            } else {
                Err(ExtractError::SlotMismatch(name))
            }
        });
        Self { field, extractor, apply }
    }
}

impl<T> Binding<T> {
    pub fn field(&self) -> &FieldSchema {
        &self.field
    }

    pub fn extractor(&self) -> &'static str {
        self.extractor
    }

    /// Runs the extractor on `cell` and stores the value into `record`.
    pub fn apply(&self, record: &mut T, cell: ElementRef<'_>) -> Result<(), ExtractError> {
        (self.apply)(record, cell)
    }
}

/// All bindings reading the same source column, in declaration order.
pub struct ColumnRules<T> {
    pub column: usize,
    pub bindings: Vec<Binding<T>>,
}

/// Immutable, shareable result of resolving one record type.
pub struct ResolvedSchema<T> {
    record: &'static str,
    columns: Vec<ColumnRules<T>>,
}

impl<T> ResolvedSchema<T> {
    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn columns(&self) -> &[ColumnRules<T>] {
        &self.columns
    }

    pub fn field_count(&self) -> usize {
        self.columns.iter().map(|c| c.bindings.len()).sum()
    }

    /// `(field, column, extractor)` triples, grouped by column.
    pub fn bindings(&self) -> Vec<(&'static str, usize, &'static str)> {
        self.columns
            .iter()
            .flat_map(|c| c.bindings.iter().map(move |b| (b.field().name, c.column, b.extractor())))
            .collect()
    }
}

impl<T> fmt::Debug for ResolvedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSchema")
            .field("record", &self.record)
            .field("bindings", &self.bindings())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::markup::NodeExt;

    #[derive(Default)]
    struct Notice {
        id: i64,
        title: String,
        shouting: bool,
    }

    fn get_id(cell: ElementRef<'_>) -> Result<i64, ExtractError> {
        Ok(cell.inner_text().trim().parse().unwrap_or(0))
    }

    fn get_title(cell: ElementRef<'_>) -> Result<String, ExtractError> {
        Ok(cell.inner_text().trim().to_string())
    }

    fn is_upper(cell: ElementRef<'_>) -> Result<bool, ExtractError> {
        let text = cell.inner_text();
        Ok(!text.is_empty() && text.chars().all(|c| !c.is_lowercase()))
    }

    impl TableRecord for Notice {
        const KIND: &'static str = "Notice";
        const PATH: &'static str = "notice";

        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema
                .field("id", 0, |r: &mut Self, v| r.id = v)
                .field("title", 1, |r: &mut Self, v| r.title = v)
                .field_via("shouting", 1, "is_upper", |r: &mut Self, v| r.shouting = v)
                .extractor("get_id", get_id)
                .extractor("get_title", get_title)
                .extractor("is_upper", is_upper);
        }
    }

    fn resolve<T: TableRecord>() -> Result<ResolvedSchema<T>, SchemaError> {
        let mut builder = SchemaBuilder::new();
        T::declare(&mut builder);
        builder.resolve()
    }

    #[test]
    fn test_convention_and_override_names() {
        let by_convention = FieldSchema { name: "title", column: 3, extractor: None };
        let overridden = FieldSchema { name: "kind", column: 1, extractor: Some("get_item_type") };
        assert_eq!(by_convention.extractor_name(), "get_title");
        assert_eq!(overridden.extractor_name(), "get_item_type");
    }

    #[test]
    fn test_fields_sharing_a_column_are_grouped() {
        let schema = resolve::<Notice>().unwrap();
        assert_eq!(schema.record(), "Notice");
        assert_eq!(schema.field_count(), 3);
        assert_eq!(schema.columns().len(), 2);
        assert_eq!(
            schema.bindings(),
            vec![("id", 0, "get_id"), ("title", 1, "get_title"), ("shouting", 1, "is_upper")]
        );

        let shared = &schema.columns()[1];
        assert_eq!(shared.column, 1);
        let overridden = &shared.bindings[1];
        assert_eq!(overridden.field().name, "shouting");
        assert_eq!(overridden.field().extractor, Some("is_upper"));
        assert_eq!(overridden.extractor(), "is_upper");
    }

    #[derive(Default)]
    struct Orphan {
        views: i64,
    }

    impl TableRecord for Orphan {
        const KIND: &'static str = "Orphan";
        const PATH: &'static str = "orphan";

        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema.field("views", 2, |r: &mut Self, v| r.views = v).extractor("get_id", get_id);
        }
    }

    #[test]
    fn test_missing_extractor_names_field_and_function() {
        let err = resolve::<Orphan>().unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingExtractor { record: "Orphan", field: "views", extractor: "get_views".to_string() }
        );
        assert!(err.to_string().contains("get_views"));
        assert!(err.to_string().contains("views"));
    }

    #[derive(Default)]
    struct Mistyped {
        title: String,
    }

    impl TableRecord for Mistyped {
        const KIND: &'static str = "Mistyped";
        const PATH: &'static str = "mistyped";

        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema.field("title", 0, |r: &mut Self, v| r.title = v).extractor("get_title", get_id);
        }
    }

    #[test]
    fn test_value_type_mismatch_fails_resolution() {
        match resolve::<Mistyped>() {
            Err(SchemaError::TypeMismatch { field, extractor, .. }) => {
                assert_eq!(field, "title");
                assert_eq!(extractor, "get_title");
            }
            other => panic!("expected type mismatch, got {:?}", other.map(|s| s.bindings())),
        }
    }

    #[derive(Default)]
    struct Twice {
        id: i64,
    }

    impl TableRecord for Twice {
        const KIND: &'static str = "Twice";
        const PATH: &'static str = "twice";

        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema
                .field("id", 0, |r: &mut Self, v| r.id = v)
                .extractor("get_id", get_id)
                .extractor("get_id", get_id);
        }
    }

    #[test]
    fn test_duplicate_extractor_names_are_rejected() {
        assert_eq!(
            resolve::<Twice>().unwrap_err(),
            SchemaError::DuplicateExtractor { record: "Twice", extractor: "get_id" }
        );
    }
}
