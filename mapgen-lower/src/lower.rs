//! Plan-tree lowering into statement form.
//!
//! Lowering is mechanical: the engine already made every decision, so any
//! remaining error node means the resolution had errors and the method
//! cannot be emitted. Lowering fails loudly in that case instead of
//! producing a half-method.

use std::collections::HashMap;

use eyre::{Result, bail};
use mapgen_ir::{
    CollectionShape, EnumPlan, Expr, FallbackValue, Literal, LoweredMethod, MappingMethod, OnNull,
    Plan, PlanKind, SourcePath, Stmt, SwitchArm, SwitchPattern, TemporalConversion, ValueBinding,
};
use mapgen_model::{TypeCatalog, TypeRef};

/// The receiver type name generated mapping methods are called through.
pub const MAPPER_TYPE: &str = "Mapper";

/// Lower one resolved mapping method into statement form.
pub fn lower_method(catalog: &TypeCatalog, method: &MappingMethod) -> Result<LoweredMethod> {
    let mut lowerer = Lowerer {
        catalog,
        temps: HashMap::new(),
    };

    let mut params = vec![("source".to_string(), lowerer.ty_name(method.source))];
    for (name, ty) in &method.extra_params {
        params.push((name.clone(), lowerer.ty_name(*ty)));
    }

    let mut body = Vec::new();
    let returns = if method.existing_target {
        params.push(("target".to_string(), lowerer.ty_name(method.target)));
        lowerer.lower_existing_target(&method.plan, &mut body)?;
        None
    } else {
        let value =
            lowerer.lower_value(&method.plan, Expr::Source(SourcePath::primary()), &mut body)?;
        body.push(Stmt::Return(value));
        Some(lowerer.ty_name(method.target))
    };

    Ok(LoweredMethod {
        name: method.name.clone(),
        params,
        returns,
        body,
    })
}

/// Lower every resolved method, stopping at the first failure.
pub fn lower_methods(
    catalog: &TypeCatalog,
    methods: &[MappingMethod],
) -> Result<Vec<LoweredMethod>> {
    methods.iter().map(|m| lower_method(catalog, m)).collect()
}

struct Lowerer<'c> {
    catalog: &'c TypeCatalog,
    temps: HashMap<String, usize>,
}

impl Lowerer<'_> {
    /// A fresh local name; the first use of a hint keeps the bare hint.
    fn fresh(&mut self, hint: &str) -> String {
        let count = self.temps.entry(hint.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            hint.to_string()
        } else {
            format!("{hint}{count}")
        }
    }

    fn ty_name(&self, ty: TypeRef) -> String {
        let name = self.catalog.name(ty.id);
        if ty.nullable {
            format!("{name}?")
        } else {
            name.to_string()
        }
    }

    fn ty_plain(&self, ty: TypeRef) -> String {
        self.catalog.name(ty.id).to_string()
    }

    /// Apply an existing-target object plan to the `target` parameter.
    fn lower_existing_target(&mut self, plan: &Plan, out: &mut Vec<Stmt>) -> Result<()> {
        let PlanKind::Object(object) = &plan.kind else {
            bail!(
                "existing-target method for '{}' did not resolve to an object plan",
                self.ty_plain(plan.target)
            );
        };
        for binding in &object.assignments {
            let value = self.lower_binding(&binding.value, out)?;
            out.push(Stmt::Assign {
                target: member_chain(Expr::Var("target".to_string()), binding.target.segments()),
                value,
            });
        }
        Ok(())
    }

    fn lower_binding(&mut self, binding: &ValueBinding, out: &mut Vec<Stmt>) -> Result<Expr> {
        self.lower_value(&binding.plan, Expr::Source(binding.source.clone()), out)
    }

    /// Lower a plan applied to an input expression. Statement-shaped plans
    /// push into `out` and return the resulting value expression.
    fn lower_value(&mut self, plan: &Plan, input: Expr, out: &mut Vec<Stmt>) -> Result<Expr> {
        match &plan.kind {
            PlanKind::Identity | PlanKind::Direct => Ok(input),
            PlanKind::Cast => Ok(Expr::cast(self.ty_name(plan.target), input)),
            PlanKind::Delegate { method } => {
                Ok(Expr::static_call(MAPPER_TYPE, method.clone(), vec![input]))
            }
            PlanKind::InstanceMethod { method } => Ok(Expr::call(input, method.clone(), vec![])),
            PlanKind::StaticFactory { method } => Ok(Expr::static_call(
                self.ty_plain(plan.target),
                method.clone(),
                vec![input],
            )),
            PlanKind::SourceConstructor => {
                let param = self.source_constructor_param(plan.target);
                Ok(Expr::New {
                    ty: self.ty_plain(plan.target),
                    args: vec![(param, input)],
                    initializers: vec![],
                })
            }
            PlanKind::Parse { .. } => Ok(Expr::static_call(
                self.ty_plain(plan.target),
                "Parse",
                vec![input],
            )),
            PlanKind::Stringify { format } => {
                let args = match format {
                    Some(format) => vec![Expr::Literal(Literal::Str(format.clone()))],
                    None => vec![],
                };
                Ok(Expr::call(input, "ToString", args))
            }
            PlanKind::Temporal(temporal) => Ok(self.lower_temporal(*temporal, plan.target, input)),
            PlanKind::Enum(enum_plan) => self.lower_enum(enum_plan, plan, input, out),
            PlanKind::Collection(collection) => {
                self.lower_collection(collection, plan, input, out)
            }
            PlanKind::Dictionary(dictionary) => {
                let items = self.fresh("items");
                out.push(Stmt::Let {
                    name: items.clone(),
                    value: Expr::New {
                        ty: self.ty_plain(plan.target),
                        args: vec![],
                        initializers: vec![],
                    },
                });
                let entry = self.fresh("entry");
                let mut body = Vec::new();
                let key = self.lower_value(
                    &dictionary.key,
                    Expr::member(Expr::Var(entry.clone()), "Key"),
                    &mut body,
                )?;
                let value = self.lower_value(
                    &dictionary.value,
                    Expr::member(Expr::Var(entry.clone()), "Value"),
                    &mut body,
                )?;
                body.push(Stmt::Expr(Expr::call(
                    Expr::Var(items.clone()),
                    "Add",
                    vec![key, value],
                )));
                out.push(Stmt::ForEach {
                    var: entry,
                    iterable: input,
                    body,
                });
                Ok(Expr::Var(items))
            }
            PlanKind::Tuple(elements) => {
                let mut args = Vec::new();
                for (index, element) in elements.iter().enumerate() {
                    let item = format!("Item{}", index + 1);
                    let value =
                        self.lower_value(element, Expr::member(input.clone(), item.clone()), out)?;
                    args.push((format!("item{}", index + 1), value));
                }
                Ok(Expr::New {
                    ty: self.ty_plain(plan.target),
                    args,
                    initializers: vec![],
                })
            }
            PlanKind::Object(object) => {
                let ty = self.ty_plain(plan.target);
                let mut args = Vec::new();
                if let Some(call) = &object.constructor {
                    for arg in &call.args {
                        let value = self.lower_binding(&arg.value, out)?;
                        args.push((arg.param.clone(), value));
                    }
                }
                let mut initializers = Vec::new();
                for binding in &object.initializers {
                    let value = self.lower_binding(&binding.value, out)?;
                    initializers.push((binding.target.first().to_string(), value));
                }
                let constructed = Expr::New {
                    ty,
                    args,
                    initializers,
                };
                if object.assignments.is_empty() {
                    return Ok(constructed);
                }

                let result = self.fresh("result");
                out.push(Stmt::Let {
                    name: result.clone(),
                    value: constructed,
                });
                for binding in &object.assignments {
                    let value = self.lower_binding(&binding.value, out)?;
                    out.push(Stmt::Assign {
                        target: member_chain(
                            Expr::Var(result.clone()),
                            binding.target.segments(),
                        ),
                        value,
                    });
                }
                Ok(Expr::Var(result))
            }
            PlanKind::Dispatch(dispatch) => {
                let mapped = self.fresh("mapped");
                out.push(Stmt::Let {
                    name: mapped.clone(),
                    value: Expr::Literal(Literal::Null),
                });
                let mut arms = Vec::new();
                for arm in &dispatch.arms {
                    let binding = self.fresh("derived");
                    let mut body = Vec::new();
                    let value =
                        self.lower_value(&arm.plan, Expr::Var(binding.clone()), &mut body)?;
                    body.push(Stmt::Assign {
                        target: Expr::Var(mapped.clone()),
                        value,
                    });
                    arms.push(SwitchArm {
                        pattern: SwitchPattern::TypeTest {
                            ty: self.ty_plain(arm.source_type),
                            binding,
                        },
                        body,
                    });
                }
                let default = if dispatch.null_fallthrough {
                    vec![Stmt::Assign {
                        target: Expr::Var(mapped.clone()),
                        value: Expr::Literal(Literal::Null),
                    }]
                } else {
                    vec![Stmt::Throw {
                        message: format!(
                            "cannot map unknown subtype of '{}'",
                            self.ty_plain(plan.source)
                        ),
                    }]
                };
                out.push(Stmt::Switch {
                    scrutinee: input,
                    arms,
                    default,
                });
                Ok(Expr::Var(mapped))
            }
            PlanKind::NullGuard(guard) => self.lower_null_guard(guard, input, out),
            PlanKind::Error => bail!(
                "plan still contains an unresolved mapping from '{}' to '{}'",
                self.ty_plain(plan.source),
                self.ty_plain(plan.target)
            ),
        }
    }

    fn lower_null_guard(
        &mut self,
        guard: &mapgen_ir::NullGuardPlan,
        input: Expr,
        out: &mut Vec<Stmt>,
    ) -> Result<Expr> {
        match &guard.on_null {
            OnNull::Wrap => self.lower_value(&guard.inner, input, out),
            OnNull::Throw => {
                out.push(Stmt::If {
                    condition: Expr::is_null(input.clone()),
                    then: vec![Stmt::Throw {
                        message: "source value must not be null".to_string(),
                    }],
                    otherwise: vec![],
                });
                self.lower_value(&guard.inner, input, out)
            }
            OnNull::PassNull => {
                self.lower_guarded(guard, input, Expr::Literal(Literal::Null), out)
            }
            OnNull::Fallback(fallback) => {
                let substitute = match fallback {
                    FallbackValue::Default => Expr::Literal(Literal::Default),
                    FallbackValue::EmptyString => Expr::Literal(Literal::Str(String::new())),
                    FallbackValue::NewInstance => Expr::New {
                        ty: self.ty_plain(guard.inner.target),
                        args: vec![],
                        initializers: vec![],
                    },
                };
                self.lower_guarded(guard, input, substitute, out)
            }
        }
    }

    /// Lower `input == null ? substitute : inner(input)`, falling back to a
    /// statement-level guard when the inner plan needs statements.
    fn lower_guarded(
        &mut self,
        guard: &mapgen_ir::NullGuardPlan,
        input: Expr,
        substitute: Expr,
        out: &mut Vec<Stmt>,
    ) -> Result<Expr> {
        let mut inner_stmts = Vec::new();
        let value = self.lower_value(&guard.inner, input.clone(), &mut inner_stmts)?;
        if inner_stmts.is_empty() {
            return Ok(Expr::conditional(
                Expr::is_null(input),
                substitute,
                value,
            ));
        }

        let mapped = self.fresh("mapped");
        out.push(Stmt::Let {
            name: mapped.clone(),
            value: substitute,
        });
        inner_stmts.push(Stmt::Assign {
            target: Expr::Var(mapped.clone()),
            value,
        });
        out.push(Stmt::If {
            condition: Expr::not(Expr::is_null(input)),
            then: inner_stmts,
            otherwise: vec![],
        });
        Ok(Expr::Var(mapped))
    }

    fn lower_enum(
        &mut self,
        enum_plan: &EnumPlan,
        plan: &Plan,
        input: Expr,
        out: &mut Vec<Stmt>,
    ) -> Result<Expr> {
        let source_ty = self.ty_plain(plan.source);
        let target_ty = self.ty_plain(plan.target);
        match enum_plan {
            EnumPlan::ByValue => Ok(Expr::cast(target_ty, input)),
            EnumPlan::CheckDefined { fallback, .. } => {
                let cast = Expr::cast(target_ty.clone(), input);
                let otherwise = match fallback {
                    Some(member) => Expr::member(Expr::Var(target_ty.clone()), member.clone()),
                    None => Expr::Throw {
                        message: format!("value is not a defined member of '{target_ty}'"),
                    },
                };
                Ok(Expr::conditional(
                    Expr::static_call(target_ty, "IsDefined", vec![cast.clone()]),
                    cast,
                    otherwise,
                ))
            }
            EnumPlan::ByName { arms, fallback } => {
                let mapped = self.fresh("mapped");
                out.push(Stmt::Let {
                    name: mapped.clone(),
                    value: Expr::Literal(Literal::Default),
                });
                let switch_arms = arms
                    .iter()
                    .map(|arm| SwitchArm {
                        pattern: SwitchPattern::EnumMember {
                            ty: source_ty.clone(),
                            member: arm.source.clone(),
                        },
                        body: vec![Stmt::Assign {
                            target: Expr::Var(mapped.clone()),
                            value: Expr::member(
                                Expr::Var(target_ty.clone()),
                                arm.target.clone(),
                            ),
                        }],
                    })
                    .collect();
                let default = match fallback {
                    Some(member) => vec![Stmt::Assign {
                        target: Expr::Var(mapped.clone()),
                        value: Expr::member(Expr::Var(target_ty.clone()), member.clone()),
                    }],
                    None => vec![Stmt::Throw {
                        message: format!("no '{target_ty}' member for this '{source_ty}' value"),
                    }],
                };
                out.push(Stmt::Switch {
                    scrutinee: input,
                    arms: switch_arms,
                    default,
                });
                Ok(Expr::Var(mapped))
            }
            EnumPlan::ToNames { arms } => {
                let mapped = self.fresh("mapped");
                out.push(Stmt::Let {
                    name: mapped.clone(),
                    value: Expr::Literal(Literal::Str(String::new())),
                });
                let switch_arms = arms
                    .iter()
                    .map(|(member, rendered)| SwitchArm {
                        pattern: SwitchPattern::EnumMember {
                            ty: source_ty.clone(),
                            member: member.clone(),
                        },
                        body: vec![Stmt::Assign {
                            target: Expr::Var(mapped.clone()),
                            value: Expr::Literal(Literal::Str(rendered.clone())),
                        }],
                    })
                    .collect();
                let default = vec![Stmt::Assign {
                    target: Expr::Var(mapped.clone()),
                    value: Expr::call(input.clone(), "ToString", vec![]),
                }];
                out.push(Stmt::Switch {
                    scrutinee: input,
                    arms: switch_arms,
                    default,
                });
                Ok(Expr::Var(mapped))
            }
            EnumPlan::FromNames {
                arms,
                case_insensitive,
                fallback,
            } => {
                let mapped = self.fresh("mapped");
                out.push(Stmt::Let {
                    name: mapped.clone(),
                    value: Expr::Literal(Literal::Default),
                });
                let scrutinee = if *case_insensitive {
                    Expr::call(input, "ToLowerInvariant", vec![])
                } else {
                    input
                };
                let switch_arms = arms
                    .iter()
                    .map(|(rendered, member)| {
                        let key = if *case_insensitive {
                            rendered.to_lowercase()
                        } else {
                            rendered.clone()
                        };
                        SwitchArm {
                            pattern: SwitchPattern::StringValue(key),
                            body: vec![Stmt::Assign {
                                target: Expr::Var(mapped.clone()),
                                value: Expr::member(
                                    Expr::Var(target_ty.clone()),
                                    member.clone(),
                                ),
                            }],
                        }
                    })
                    .collect();
                let default = match fallback {
                    Some(member) => vec![Stmt::Assign {
                        target: Expr::Var(mapped.clone()),
                        value: Expr::member(Expr::Var(target_ty.clone()), member.clone()),
                    }],
                    None => vec![Stmt::Throw {
                        message: format!("no '{target_ty}' member with this name"),
                    }],
                };
                out.push(Stmt::Switch {
                    scrutinee,
                    arms: switch_arms,
                    default,
                });
                Ok(Expr::Var(mapped))
            }
        }
    }

    fn lower_collection(
        &mut self,
        collection: &mapgen_ir::CollectionPlan,
        plan: &Plan,
        input: Expr,
        out: &mut Vec<Stmt>,
    ) -> Result<Expr> {
        let items = self.fresh("items");
        // arrays accumulate through a list and convert at the end
        let accumulator_ty = match collection.shape {
            CollectionShape::Array | CollectionShape::Enumerable => {
                format!("List<{}>", self.ty_name(collection.element.target))
            }
            _ => self.ty_plain(plan.target),
        };
        let args = if collection.counted {
            vec![("capacity".to_string(), Expr::member(input.clone(), "Count"))]
        } else {
            vec![]
        };
        out.push(Stmt::Let {
            name: items.clone(),
            value: Expr::New {
                ty: accumulator_ty,
                args,
                initializers: vec![],
            },
        });

        let item = self.fresh("item");
        let mut body = Vec::new();
        let element =
            self.lower_value(&collection.element, Expr::Var(item.clone()), &mut body)?;
        let add_method = match collection.shape {
            CollectionShape::Stack => "Push",
            CollectionShape::Queue => "Enqueue",
            _ => "Add",
        };
        body.push(Stmt::Expr(Expr::call(
            Expr::Var(items.clone()),
            add_method,
            vec![element],
        )));
        out.push(Stmt::ForEach {
            var: item,
            iterable: input,
            body,
        });

        match collection.shape {
            CollectionShape::Array => Ok(Expr::call(Expr::Var(items), "ToArray", vec![])),
            _ => Ok(Expr::Var(items)),
        }
    }

    fn lower_temporal(
        &self,
        temporal: TemporalConversion,
        target: TypeRef,
        input: Expr,
    ) -> Expr {
        match temporal {
            TemporalConversion::DateTimeToDateOnly | TemporalConversion::DateTimeToTimeOnly => {
                Expr::static_call(self.ty_plain(target), "FromDateTime", vec![input])
            }
            TemporalConversion::DateOnlyToDateTime | TemporalConversion::TimeOnlyToDateTime => {
                Expr::call(input, "ToDateTime", vec![])
            }
        }
    }

    fn source_constructor_param(&self, target: TypeRef) -> String {
        self.catalog
            .get(target.id)
            .constructors
            .iter()
            .find(|c| c.required_params() == 1)
            .and_then(|c| c.params.iter().find(|p| !p.optional))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "value".to_string())
    }
}

fn member_chain(root: Expr, segments: &[String]) -> Expr {
    segments
        .iter()
        .fold(root, |expr, segment| Expr::member(expr, segment.clone()))
}
