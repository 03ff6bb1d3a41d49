use std::collections::BTreeMap;

use bindguard_types::{Annotation, TypeParamDecl, TypeTag, ValidationError};

use crate::model::{CallShape, MapShape, SeqShape, TypeExpr, TypeParam};

/// Convert a host annotation into the canonical expression model.
///
/// Runs exactly once per callable, at decoration time; anything the
/// engine cannot categorize fails here with `UnsupportedShape`, never
/// at call time.
pub fn classify(
    ann: &Annotation,
    type_params: &BTreeMap<String, TypeParamDecl>,
) -> Result<TypeExpr, ValidationError> {
    match ann {
        Annotation::Name(name) => Ok(classify_name(name, type_params)),
        Annotation::Apply(head, args) => classify_apply(head, args, type_params),
        Annotation::Union(members) => {
            if members.is_empty() {
                return Err(ValidationError::unsupported("union with no members"));
            }
            let members = members
                .iter()
                .map(|m| classify(m, type_params))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeExpr::Union(members))
        }
        Annotation::Record(fields) => {
            let fields = fields
                .iter()
                .map(|(name, ann)| Ok((name.clone(), classify(ann, type_params)?)))
                .collect::<Result<BTreeMap<_, _>, ValidationError>>()?;
            Ok(TypeExpr::Record(fields))
        }
        Annotation::Literal(values) => {
            if values.is_empty() {
                return Err(ValidationError::unsupported("literal with no values"));
            }
            Ok(TypeExpr::Literals(values.clone()))
        }
        Annotation::Callable(params, ret) => {
            let params = params
                .iter()
                .map(|p| classify(p, type_params))
                .collect::<Result<Vec<_>, _>>()?;
            let ret = classify(ret, type_params)?;
            Ok(TypeExpr::Callable(Some(CallShape {
                params,
                ret: Box::new(ret),
            })))
        }
        Annotation::Validator(v) => Ok(TypeExpr::Validator(v.clone())),
        Annotation::Any => Ok(TypeExpr::Any),
    }
}

fn classify_name(name: &str, type_params: &BTreeMap<String, TypeParamDecl>) -> TypeExpr {
    if let Some(decl) = type_params.get(name) {
        return TypeExpr::Param(TypeParam {
            name: decl.name.clone(),
            constraints: decl.constraints.clone(),
        });
    }
    match name {
        "none" => TypeExpr::Concrete(TypeTag::Unit),
        "bool" => TypeExpr::Concrete(TypeTag::Bool),
        "int" => TypeExpr::Concrete(TypeTag::Int),
        "float" => TypeExpr::Concrete(TypeTag::Float),
        "str" => TypeExpr::Concrete(TypeTag::Str),
        "bytes" => TypeExpr::Concrete(TypeTag::Bytes),
        "list" => TypeExpr::Concrete(TypeTag::List),
        "tuple" => TypeExpr::Concrete(TypeTag::Tuple),
        "dict" => TypeExpr::Map(None),
        "func" => TypeExpr::Callable(None),
        // Anything else is a host class checked by instance/subclass.
        other => TypeExpr::Concrete(TypeTag::Class(other.to_string())),
    }
}

fn classify_apply(
    head: &str,
    args: &[Annotation],
    type_params: &BTreeMap<String, TypeParamDecl>,
) -> Result<TypeExpr, ValidationError> {
    match head {
        "list" => {
            let [elem] = args else {
                return Err(ValidationError::unsupported(format!(
                    "list takes exactly one element type, got {}",
                    args.len()
                )));
            };
            let elem = classify(elem, type_params)?;
            Ok(TypeExpr::Seq(SeqShape::Homogeneous(Box::new(elem))))
        }
        "tuple" => {
            if args.is_empty() {
                return Err(ValidationError::unsupported("tuple with no element types"));
            }
            let elems = args
                .iter()
                .map(|a| classify(a, type_params))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeExpr::Seq(SeqShape::Fixed(elems)))
        }
        "dict" => {
            let [key, value] = args else {
                return Err(ValidationError::unsupported(format!(
                    "dict takes a key and a value type, got {} arguments",
                    args.len()
                )));
            };
            Ok(TypeExpr::Map(Some(MapShape {
                key: Box::new(classify(key, type_params)?),
                value: Box::new(classify(value, type_params)?),
            })))
        }
        other => Err(ValidationError::unsupported(format!(
            "unknown parameterized type `{other}`"
        ))),
    }
}
