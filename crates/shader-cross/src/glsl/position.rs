//! Implicit `gl_Position` for vertex entry points.
//!
//! GLSL declares `gl_Position` implicitly, so a vertex shader that never writes it is still a
//! valid program. The naga front end only materializes built-ins that are referenced, and the
//! validator rejects a vertex entry point without a position output. Entry points in that
//! state get a zero-valued position appended to their result.

use naga::{
    Binding, BuiltIn, Expression, Function, FunctionResult, Handle, Module, Scalar, ShaderStage,
    Span, Statement, StructMember, Type, TypeInner, VectorSize,
};

const POSITION: Binding = Binding::BuiltIn(BuiltIn::Position { invariant: false });
const VEC4_SIZE: u32 = 16;

/// Adds an undefined-but-valid position output to every vertex entry point lacking one.
/// Returns the number of entry points changed.
pub(crate) fn add_implicit_position(module: &mut Module) -> usize {
    let mut changed = 0;
    for index in 0..module.entry_points.len() {
        let entry = &module.entry_points[index];
        if entry.stage != ShaderStage::Vertex || writes_position(module, &entry.function) {
            continue;
        }

        let outputs = match &entry.function.result {
            None => None,
            Some(FunctionResult { ty, binding: None }) => match &module.types[*ty].inner {
                TypeInner::Struct { members, span } => Some((members.clone(), *span)),
                _ => continue,
            },
            Some(FunctionResult {
                binding: Some(_), ..
            }) => continue,
        };

        let vec4 = module.types.insert(
            Type {
                name: None,
                inner: TypeInner::Vector {
                    size: VectorSize::Quad,
                    scalar: Scalar::F32,
                },
            },
            Span::UNDEFINED,
        );
        let struct_ty =
            outputs.map(|(members, span)| extended_struct(module, members, span, vec4));

        let function = &mut module.entry_points[index].function;
        let zero = function
            .expressions
            .append(Expression::ZeroValue(vec4), Span::UNDEFINED);
        match struct_ty {
            None => {
                function.result = Some(FunctionResult {
                    ty: vec4,
                    binding: Some(POSITION),
                });
                rewrite_returns(function, |_, _| Some(zero));
            }
            Some(ty) => {
                function.result = Some(FunctionResult { ty, binding: None });
                rewrite_returns(function, |expressions, value| {
                    let Expression::Compose { components, .. } = &expressions[value?] else {
                        return None;
                    };
                    let mut components = components.clone();
                    components.push(zero);
                    Some(expressions.append(Expression::Compose { ty, components }, Span::UNDEFINED))
                });
            }
        }
        changed += 1;
    }
    changed
}

fn writes_position(module: &Module, function: &Function) -> bool {
    let Some(result) = &function.result else {
        return false;
    };
    let is_position = |binding: &Option<Binding>| {
        matches!(binding, Some(Binding::BuiltIn(BuiltIn::Position { .. })))
    };
    if is_position(&result.binding) {
        return true;
    }
    match &module.types[result.ty].inner {
        TypeInner::Struct { members, .. } => members.iter().any(|m| is_position(&m.binding)),
        _ => false,
    }
}

/// The output struct with a position member appended after the existing members.
fn extended_struct(
    module: &mut Module,
    mut members: Vec<StructMember>,
    span: u32,
    vec4: Handle<Type>,
) -> Handle<Type> {
    let offset = span.next_multiple_of(VEC4_SIZE);
    members.push(StructMember {
        name: Some("gl_Position".to_owned()),
        ty: vec4,
        binding: Some(POSITION),
        offset,
    });
    module.types.insert(
        Type {
            name: None,
            inner: TypeInner::Struct {
                members,
                span: offset + VEC4_SIZE,
            },
        },
        Span::UNDEFINED,
    )
}

/// Replaces the value of each top-level `return` with `rebuild(old value)`, emitting any new
/// expression right before the return.
fn rewrite_returns(
    function: &mut Function,
    mut rebuild: impl FnMut(
        &mut naga::Arena<Expression>,
        Option<Handle<Expression>>,
    ) -> Option<Handle<Expression>>,
) {
    let mut index = 0;
    while index < function.body.len() {
        let Statement::Return { value } = function.body[index] else {
            index += 1;
            continue;
        };
        let before = function.expressions.len();
        let new_value = rebuild(&mut function.expressions, value);
        if let Statement::Return { value } = &mut function.body[index] {
            *value = new_value;
        }
        if function.expressions.len() > before {
            let emit = Statement::Emit(function.expressions.range_from(before));
            function
                .body
                .splice(index..index, naga::Block::from_vec(vec![emit]));
            index += 1;
        }
        index += 1;
    }
}
