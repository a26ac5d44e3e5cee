//! Conversion of raw documents into the contract model
//!
//! All load-time invariants are enforced here: unique names per scope, a
//! known type (or nested fields) for every field, no scalar constraints on
//! nested fields, known quality metrics and interpretable thresholds.

use super::error::LoadError;
use super::raw::{RawContract, RawField, RawModel, RawQuality, RawQualitySection, RawServer};
use super::resolve::DefinitionResolver;
use crate::config::LoaderConfig;
use crate::models::contract::DEFAULT_SPECIFICATION;
use crate::models::quality::tighter;
use crate::models::{
    Bound, Constraints, Container, Contract, DataType, Field, FieldKind, FieldMetadata, Info,
    Model, QualityKind, QualityRule, Server, ServerType, Threshold,
};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Guard against definitions that (indirectly) contain themselves
const MAX_FIELD_DEPTH: usize = 64;

pub(crate) struct Converter<'a> {
    resolver: &'a DefinitionResolver<'a>,
    inline_definitions: bool,
    inline_quality: bool,
}

impl<'a> Converter<'a> {
    pub fn new(resolver: &'a DefinitionResolver<'a>, config: &LoaderConfig) -> Self {
        Self {
            resolver,
            inline_definitions: config.inline_definitions,
            inline_quality: config.inline_quality,
        }
    }

    pub fn convert(&self, raw: RawContract) -> Result<Contract, LoadError> {
        check_unique("servers", "server", raw.servers.iter().map(|(n, _)| n.as_str()))?;
        check_unique("models", "model", raw.models.iter().map(|(n, _)| n.as_str()))?;

        let servers = raw
            .servers
            .into_iter()
            .map(|(name, server)| convert_server(name, server))
            .collect::<Result<Vec<_>, _>>()?;

        let models = raw
            .models
            .into_iter()
            .map(|(name, model)| self.convert_model(name, model))
            .collect::<Result<Vec<_>, _>>()?;

        let quality = self.convert_quality_section(raw.quality, "quality")?;

        Ok(Contract {
            specification: raw
                .data_contract_specification
                .unwrap_or_else(|| DEFAULT_SPECIFICATION.to_string()),
            id: raw.id.unwrap_or_default(),
            info: Info {
                title: raw.info.title.unwrap_or_default(),
                version: raw.info.version.unwrap_or_default(),
                description: raw.info.description,
                owner: raw.info.owner,
                contact: raw.info.contact,
            },
            terms: raw.terms,
            servers,
            models,
            quality,
        })
    }

    fn convert_model(&self, name: String, raw: RawModel) -> Result<Model, LoadError> {
        let path = format!("models.{}", name);
        let fields = self.convert_fields(raw.fields, &path, 0)?;
        let quality = self.convert_quality_section(raw.quality, &format!("{}.quality", path))?;

        Ok(Model {
            name,
            model_type: raw.model_type,
            title: raw.title,
            description: raw.description,
            primary_key: raw.primary_key,
            fields,
            quality,
            tags: raw.tags,
        })
    }

    fn convert_fields(
        &self,
        fields: Vec<(String, RawField)>,
        parent: &str,
        depth: usize,
    ) -> Result<Vec<Field>, LoadError> {
        let scope = format!("{}.fields", parent);
        check_unique(&scope, "field", fields.iter().map(|(n, _)| n.as_str()))?;
        fields
            .into_iter()
            .map(|(name, field)| {
                let path = format!("{}.{}", scope, name);
                self.convert_field(name, field, &path, depth)
            })
            .collect()
    }

    fn convert_field(
        &self,
        name: String,
        mut raw: RawField,
        path: &str,
        depth: usize,
    ) -> Result<Field, LoadError> {
        self.inline_reference(&mut raw, path, depth)?;
        let kind = self.field_kind(&mut raw, path, depth)?;
        let quality = self.convert_quality_section(raw.quality, &format!("{}.quality", path))?;

        Ok(Field {
            name,
            kind,
            required: raw.required.unwrap_or(false),
            unique: raw.unique.unwrap_or(false),
            primary: raw.primary.unwrap_or(false),
            references: raw.references,
            default: raw.default,
            title: raw.title,
            description: raw.description,
            quality,
            metadata: FieldMetadata {
                tags: raw.tags,
                pii: raw.pii,
                classification: raw.classification,
                example: raw.example,
            },
        })
    }

    fn inline_reference(
        &self,
        raw: &mut RawField,
        path: &str,
        depth: usize,
    ) -> Result<(), LoadError> {
        let Some(reference) = raw.reference.take() else {
            return Ok(());
        };
        if depth >= MAX_FIELD_DEPTH {
            return Err(LoadError::UnresolvedReference {
                path: path.to_string(),
                reference,
            });
        }
        if self.inline_definitions {
            let definition = self.resolver.resolve(&reference, path)?;
            raw.inherit(&definition);
        } else {
            debug!("{}: definition inlining disabled, ignoring {}", path, reference);
        }
        Ok(())
    }

    fn convert_quality_section(
        &self,
        section: Option<RawQualitySection>,
        scope: &str,
    ) -> Result<Vec<QualityRule>, LoadError> {
        let rules = section.map(RawQualitySection::into_rules).unwrap_or_default();
        check_unique(
            scope,
            "quality rule",
            rules.iter().filter_map(|r| r.name.as_deref()),
        )?;
        rules
            .into_iter()
            .enumerate()
            .map(|(i, mut rule)| {
                let path = match &rule.name {
                    Some(name) => format!("{}.{}", scope, name),
                    None => format!("{}[{}]", scope, i),
                };
                if self.inline_quality {
                    self.inline_specification(&mut rule, &path)?;
                }
                convert_quality(rule, &path)
            })
            .collect()
    }

    /// Replace a `$ref` specification with the content of the check file
    ///
    /// great-expectations rules carry one specification per model.
    fn inline_specification(&self, raw: &mut RawQuality, path: &str) -> Result<(), LoadError> {
        let per_model = raw
            .rule_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("great-expectations"));
        let Some(specification) = raw.extra.get_mut("specification") else {
            return Ok(());
        };

        let path = format!("{}.specification", path);
        if per_model {
            if let Value::Object(models) = specification {
                for (model, expectations) in models.iter_mut() {
                    self.inline_document(expectations, &format!("{}.{}", path, model))?;
                }
                return Ok(());
            }
        }
        self.inline_document(specification, &path)
    }

    fn inline_document(&self, value: &mut Value, path: &str) -> Result<(), LoadError> {
        let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
            return Ok(());
        };
        let reference = reference.to_string();
        *value = self.resolver.resolve_document(&reference, path)?;
        Ok(())
    }

    fn field_kind(
        &self,
        raw: &mut RawField,
        path: &str,
        depth: usize,
    ) -> Result<FieldKind, LoadError> {
        let type_name = raw
            .field_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase());

        match type_name.as_deref() {
            Some("object") | Some("record") | Some("struct") => {
                self.nested(raw, Container::Object, path, depth)
            }
            Some("array") if raw.items.is_some() => self.array_kind(raw, path, depth),
            Some(name) => {
                if !raw.fields.is_empty() {
                    return Err(LoadError::ConflictingShape {
                        path: path.to_string(),
                        reason: format!("scalar type '{}' cannot have nested fields", name),
                    });
                }
                let data_type = parse_type(name, raw, path)?;
                Ok(FieldKind::Scalar {
                    data_type,
                    constraints: constraints(raw),
                })
            }
            None if !raw.fields.is_empty() => self.nested(raw, Container::Object, path, depth),
            None => Err(LoadError::MissingType {
                path: path.to_string(),
            }),
        }
    }

    fn nested(
        &self,
        raw: &mut RawField,
        container: Container,
        path: &str,
        depth: usize,
    ) -> Result<FieldKind, LoadError> {
        if raw.has_scalar_constraints() {
            return Err(LoadError::ConflictingShape {
                path: path.to_string(),
                reason: "nested field cannot carry scalar constraints".to_string(),
            });
        }
        let fields = self.convert_fields(std::mem::take(&mut raw.fields), path, depth + 1)?;
        Ok(FieldKind::Nested { container, fields })
    }

    /// `type: array` with an `items` definition
    fn array_kind(
        &self,
        raw: &mut RawField,
        path: &str,
        depth: usize,
    ) -> Result<FieldKind, LoadError> {
        let Some(mut items) = raw.items.take() else {
            return Ok(FieldKind::Scalar {
                data_type: DataType::Array(None),
                constraints: constraints(raw),
            });
        };
        let items_path = format!("{}.items", path);
        self.inline_reference(&mut items, &items_path, depth + 1)?;

        let items_type = items
            .field_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase());
        let object_items = match items_type.as_deref() {
            Some("object") | Some("record") | Some("struct") => true,
            None => !items.fields.is_empty(),
            Some(_) => false,
        };

        if object_items {
            if !raw.fields.is_empty() {
                return Err(LoadError::ConflictingShape {
                    path: path.to_string(),
                    reason: "array fields declare children under items".to_string(),
                });
            }
            // children live under the items definition, addressed directly
            // below the array field
            raw.fields = std::mem::take(&mut items.fields);
            return self.nested(raw, Container::Array, path, depth);
        }

        let element = match self.field_kind(&mut items, &items_path, depth + 1)? {
            FieldKind::Scalar { data_type, .. } => data_type,
            FieldKind::Nested { .. } => {
                return Err(LoadError::ConflictingShape {
                    path: items_path,
                    reason: "nested arrays of objects are not supported".to_string(),
                });
            }
        };
        Ok(FieldKind::Scalar {
            data_type: DataType::Array(Some(Box::new(element))),
            constraints: constraints(raw),
        })
    }
}

fn check_unique<'n>(
    scope: &str,
    kind: &'static str,
    names: impl Iterator<Item = &'n str>,
) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(LoadError::DuplicateName {
                scope: scope.to_string(),
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_type(name: &str, raw: &RawField, path: &str) -> Result<DataType, LoadError> {
    let data_type: DataType = name.parse().map_err(|_| LoadError::UnknownType {
        path: path.to_string(),
        type_name: name.to_string(),
    })?;

    // precision/scale may be given as separate keywords
    Ok(match data_type {
        DataType::Decimal { precision, scale } => DataType::Decimal {
            precision: precision.or(raw.precision),
            scale: scale.or(raw.scale),
        },
        other => other,
    })
}

fn constraints(raw: &RawField) -> Constraints {
    Constraints {
        min_length: raw.min_length,
        max_length: raw.max_length,
        pattern: raw.pattern.clone(),
        format: raw.format.clone(),
        minimum: raw.minimum,
        maximum: raw.maximum,
        exclusive_minimum: raw.exclusive_minimum,
        exclusive_maximum: raw.exclusive_maximum,
        enum_values: raw
            .enum_values
            .as_ref()
            .map(|values| values.iter().map(enum_member).collect()),
    }
}

/// Canonical text of an enum member, `1` and `1.0` are the same member
fn enum_member(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn convert_server(name: String, raw: RawServer) -> Result<Server, LoadError> {
    let server_type = raw.server_type.ok_or_else(|| LoadError::MissingType {
        path: format!("servers.{}", name),
    })?;
    Ok(Server {
        name,
        server_type: ServerType::parse(&server_type),
        description: raw.description,
        params: raw.params,
    })
}

fn convert_quality(mut raw: RawQuality, path: &str) -> Result<QualityRule, LoadError> {
    let rule_type = raw
        .rule_type
        .as_deref()
        .map(|t| t.trim().to_ascii_lowercase());

    let kind = match rule_type.as_deref() {
        Some("sql") => QualityKind::Sql,
        Some("text") => QualityKind::Text,
        Some("custom") => QualityKind::Custom,
        None | Some("library") => {
            let metric = raw.metric.as_deref().unwrap_or_default();
            QualityKind::from_metric(metric).ok_or_else(|| LoadError::UnknownQualityMetric {
                path: path.to_string(),
                metric: metric.to_string(),
            })?
        }
        Some(_) => {
            // engine specific formats (SodaCL, great-expectations, ...)
            if let Some(engine) = raw.rule_type.take() {
                raw.extra
                    .entry("engine".to_string())
                    .or_insert(Value::String(engine));
            }
            QualityKind::Custom
        }
    };

    let mut threshold = build_threshold(&raw, path)?;
    match (kind, raw.unit.take()) {
        (QualityKind::Freshness, Some(unit)) => {
            let factor = seconds_per(&unit).ok_or_else(|| LoadError::InvalidThreshold {
                path: path.to_string(),
                reason: format!("unknown time unit '{}'", unit),
            })?;
            threshold = threshold.scaled(factor);
        }
        (_, Some(unit)) => {
            raw.extra
                .insert("unit".to_string(), Value::String(unit));
        }
        (_, None) => {}
    }

    Ok(QualityRule {
        name: raw.name,
        kind,
        threshold,
        description: raw.description,
        params: raw.extra,
    })
}

/// Build the accepted interval from the `mustBe*` keywords
///
/// Several keywords on the same side combine to the tighter bound.
fn build_threshold(raw: &RawQuality, path: &str) -> Result<Threshold, LoadError> {
    let mut lower: Option<Bound> = None;
    let mut upper: Option<Bound> = None;

    if let Some(value) = raw.must_be {
        lower = tighter(lower, Bound::inclusive(value), true);
        upper = tighter(upper, Bound::inclusive(value), false);
    }
    if let Some(value) = raw.must_be_greater_than {
        lower = tighter(lower, Bound::exclusive(value), true);
    }
    if let Some(value) = raw.must_be_greater_than_or_equal_to {
        lower = tighter(lower, Bound::inclusive(value), true);
    }
    if let Some(value) = raw.must_be_less_than {
        upper = tighter(upper, Bound::exclusive(value), false);
    }
    if let Some(value) = raw.must_be_less_than_or_equal_to {
        upper = tighter(upper, Bound::inclusive(value), false);
    }
    if let Some(range) = &raw.must_be_between {
        let [low, high] = range.as_slice() else {
            return Err(LoadError::InvalidThreshold {
                path: path.to_string(),
                reason: format!("mustBeBetween needs two values, got {}", range.len()),
            });
        };
        lower = tighter(lower, Bound::inclusive(*low), true);
        upper = tighter(upper, Bound::inclusive(*high), false);
    }

    Ok(Threshold { lower, upper })
}

fn seconds_per(unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "s" | "sec" | "second" | "seconds" => Some(1.0),
        "m" | "min" | "minute" | "minutes" => Some(60.0),
        "h" | "hour" | "hours" => Some(3_600.0),
        "d" | "day" | "days" => Some(86_400.0),
        _ => None,
    }
}
