use std::collections::BTreeMap;

use bindguard_engine::{MatchConfig, TypeExpr, classify};
use bindguard_types::{Signature, TypeParamDecl, ValidationError, Value};

/// One parameter as the wrapper sees it: classified expression plus the
/// declared default, if any.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub expr: Option<TypeExpr>,
    pub default: Option<Value>,
}

/// Everything a call needs, derived once at decoration time and immutable
/// thereafter. Unclassifiable annotations fail here, before the callable
/// can ever be invoked.
#[derive(Clone, Debug)]
pub struct InvocationSpec {
    pub func_name: String,
    pub params: Vec<ParamSpec>,
    pub ret: Option<TypeExpr>,
    pub type_params: Vec<String>,
    pub config: MatchConfig,
}

impl InvocationSpec {
    pub fn build(
        func_name: &str,
        sig: &Signature,
        config: MatchConfig,
    ) -> Result<Self, ValidationError> {
        let decls: BTreeMap<String, TypeParamDecl> = sig
            .type_params
            .iter()
            .map(|d| (d.name.clone(), d.clone()))
            .collect();

        let params = sig
            .params
            .iter()
            .map(|p| {
                let expr = p
                    .annotation
                    .as_ref()
                    .map(|ann| classify(ann, &decls))
                    .transpose()?;
                Ok(ParamSpec {
                    name: p.name.clone(),
                    expr,
                    default: p.default.clone(),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let ret = sig
            .ret
            .as_ref()
            .map(|ann| classify(ann, &decls))
            .transpose()?;

        Ok(Self {
            func_name: func_name.to_string(),
            params,
            ret,
            type_params: sig.type_params.iter().map(|d| d.name.clone()).collect(),
            config,
        })
    }
}
