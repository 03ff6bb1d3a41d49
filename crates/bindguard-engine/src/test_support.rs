use bindguard_types::TypeTag;

use crate::bindings::BindingTable;
use crate::model::{TypeExpr, TypeParam};
use crate::policy::MatchConfig;

pub fn strict() -> MatchConfig {
    MatchConfig::default()
}

pub fn lenient() -> MatchConfig {
    MatchConfig {
        strict: false,
        ..MatchConfig::default()
    }
}

pub fn table(params: &[&str]) -> BindingTable {
    BindingTable::new(params.iter().map(|p| (*p).to_string()))
}

pub fn expr_int() -> TypeExpr {
    TypeExpr::Concrete(TypeTag::Int)
}

pub fn expr_str() -> TypeExpr {
    TypeExpr::Concrete(TypeTag::Str)
}

pub fn expr_param(name: &str, constraints: &[TypeTag]) -> TypeExpr {
    TypeExpr::Param(TypeParam {
        name: name.to_string(),
        constraints: constraints.to_vec(),
    })
}
