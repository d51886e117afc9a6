//! Type-annotation rendering, shared by parameter/return-type formatting
//! and by the expression printer's `TypeAscription` case.

use kcl_ast::TypeAnnotation;

pub(crate) fn format_type(ty: &TypeAnnotation) -> String {
    match ty {
        TypeAnnotation::Primitive(name) => name.clone(),
        TypeAnnotation::Number(Some(unit)) => format!("number({unit})"),
        TypeAnnotation::Number(None) => "number".to_string(),
        TypeAnnotation::Array { element, length } => match length {
            Some(len) => format!("[{} {len}]", format_type(element)),
            None => format!("[{}]", format_type(element)),
        },
        TypeAnnotation::Object(fields) => {
            let items: Vec<String> =
                fields.iter().map(|(name, ty)| format!("{name}: {}", format_type(ty))).collect();
            format!("{{{}}}", items.join(", "))
        }
        TypeAnnotation::Named(name) => name.clone(),
    }
}
