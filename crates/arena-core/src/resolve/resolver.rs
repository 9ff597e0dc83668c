//! `MemberResolver`: elige el miembro concreto que satisface una firma
//! abstracta.
//!
//! Reglas (en orden):
//! 1. Se filtran candidatos por kind y, salvo constructores, por nombre.
//! 2. Coincidencia exacta de tipos (misma aridad) gana de inmediato; la
//!    primera declarada.
//! 3. Si no, son elegibles los candidatos cuyos parámetros aceptan cada tipo
//!    declarado (`conversion_cost`); gana el de menor costo sumado.
//! 4. Empate en el mínimo: si todos comparten la misma lista de parámetros
//!    gana el primero declarado; si exactamente uno es más específico que
//!    todos los demás, gana ése; si no, `Ambiguous`.
//!
//! Campos: sin parámetros declarados se resuelve una lectura; con uno, una
//! escritura asignable al tipo del campo.
//!
//! El resolver no guarda estado y puede usarse concurrentemente.

use log::debug;

use super::assign::{conversion_cost, more_specific};
use crate::errors::ResolutionFailure;
use crate::model::types::format_params;
use crate::model::{MemberKind, Signature, TypeDescriptor, TypeHierarchy};

/// Resultado de una resolución exitosa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Índice del candidato elegido dentro del slice recibido.
    pub index: usize,
    /// Pasos de widening sumados (0 para coincidencia exacta).
    pub cost: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct MemberResolver<'h> {
    hierarchy: &'h TypeHierarchy,
}

impl<'h> MemberResolver<'h> {
    pub fn new(hierarchy: &'h TypeHierarchy) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        self.hierarchy
    }

    /// Costo de pasar `declared` a los parámetros de `candidate`, o `None`
    /// si no es elegible. No filtra por nombre.
    pub fn cost<S: Signature>(&self, declared: &[TypeDescriptor], candidate: &S) -> Option<u32> {
        if candidate.member_kind() == MemberKind::Field {
            return match declared {
                [] => Some(0),
                [value] => conversion_cost(self.hierarchy, value, candidate.value_type()),
                _ => None,
            };
        }
        let params = candidate.parameter_types();
        if params.len() != declared.len() {
            return None;
        }
        declared.iter()
                .zip(params)
                .try_fold(0u32, |acc, (d, p)| conversion_cost(self.hierarchy, d, p).map(|c| acc + c))
    }

    pub fn resolve<S: Signature>(&self,
                                 kind: MemberKind,
                                 name: &str,
                                 declared: &[TypeDescriptor],
                                 candidates: &[S])
                                 -> Result<Resolution, ResolutionFailure> {
        let filtered: Vec<(usize, &S)> = candidates.iter()
                                                   .enumerate()
                                                   .filter(|(_, c)| c.member_kind() == kind)
                                                   .filter(|(_, c)| kind == MemberKind::Constructor || c.member_name() == name)
                                                   .collect();

        if kind != MemberKind::Field {
            if let Some((index, _)) = filtered.iter().find(|(_, c)| c.parameter_types() == declared) {
                return Ok(Resolution { index: *index, cost: 0 });
            }
        }

        let eligible: Vec<(usize, &S, u32)> = filtered.iter()
                                                      .filter_map(|(i, c)| self.cost(declared, *c).map(|cost| (*i, *c, cost)))
                                                      .collect();
        let Some(min_cost) = eligible.iter().map(|(_, _, cost)| *cost).min() else {
            return Err(ResolutionFailure::NoMatch { kind,
                                                    name: name.to_string(),
                                                    declared: format_params(declared),
                                                    candidates: filtered.iter().map(|(_, c)| c.describe()).collect() });
        };
        let best: Vec<&(usize, &S, u32)> = eligible.iter().filter(|(_, _, cost)| *cost == min_cost).collect();
        if best.len() == 1 {
            return Ok(Resolution { index: best[0].0, cost: min_cost });
        }

        let first_params = best[0].1.parameter_types();
        if best.iter().all(|(_, c, _)| c.parameter_types() == first_params) {
            debug!("resolver: {} candidates share {}{}, taking first declared", best.len(), name, format_params(first_params));
            return Ok(Resolution { index: best[0].0, cost: min_cost });
        }

        let most_specific: Vec<&&(usize, &S, u32)> =
            best.iter()
                .filter(|(i, c, _)| {
                    best.iter()
                        .filter(|(j, _, _)| j != i)
                        .all(|(_, other, _)| more_specific(self.hierarchy, c.parameter_types(), other.parameter_types()))
                })
                .collect();
        match most_specific.as_slice() {
            [only] => Ok(Resolution { index: only.0, cost: min_cost }),
            _ => Err(ResolutionFailure::Ambiguous { kind,
                                                    name: name.to_string(),
                                                    declared: format_params(declared),
                                                    tied: best.iter().map(|(_, c, _)| c.describe()).collect() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberDescriptor, PrimitiveKind};

    fn t(name: &str) -> TypeDescriptor {
        TypeDescriptor::parse(name)
    }

    fn method(name: &str, params: &[&str]) -> MemberDescriptor {
        MemberDescriptor::method(name, params.iter().map(|p| t(p)).collect(), TypeDescriptor::Void)
    }

    #[test]
    fn reference_and_numeric_widening_select_same_candidate() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        let only_object = vec![method("push", &["java.lang.Object"])];
        let by_string = r.resolve(MemberKind::Method, "push", &[t("String")], &only_object).expect("String -> Object");
        let by_short = r.resolve(MemberKind::Method, "push", &[t("short")], &only_object).expect("short -> Object");
        assert_eq!(by_string.index, by_short.index);

        let only_int = vec![method("push", &["int"])];
        let res = r.resolve(MemberKind::Method, "push", &[TypeDescriptor::Primitive(PrimitiveKind::Short)], &only_int)
                   .expect("short -> int");
        assert_eq!(res, Resolution { index: 0, cost: 1 });
    }

    #[test]
    fn cheapest_overload_wins() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        let cands = vec![method("push", &["int"]), method("push", &["java.lang.Object"])];
        assert_eq!(r.resolve(MemberKind::Method, "push", &[t("String")], &cands).expect("string").index, 1);
        assert_eq!(r.resolve(MemberKind::Method, "push", &[t("short")], &cands).expect("short").index, 0);
        assert_eq!(r.resolve(MemberKind::Method, "push", &[t("int")], &cands).expect("exact"),
                   Resolution { index: 0, cost: 0 });
    }

    #[test]
    fn equally_minimal_candidates_are_ambiguous() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        let cands = vec![method("combine", &["java.lang.Object", "java.lang.String"]),
                         method("combine", &["java.lang.String", "java.lang.Object"])];
        let err = r.resolve(MemberKind::Method, "combine", &[t("String"), t("String")], &cands)
                   .expect_err("must be ambiguous");
        assert!(matches!(err, ResolutionFailure::Ambiguous { ref tied, .. } if tied.len() == 2));
    }

    #[test]
    fn more_specific_candidate_breaks_tie() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        // null cuesta 0 hacia ambos; String es más específico que Object
        let cands = vec![method("put", &["java.lang.Object"]), method("put", &["java.lang.String"])];
        assert_eq!(r.resolve(MemberKind::Method, "put", &[TypeDescriptor::Null], &cands).expect("specific").index, 1);

        // listas de parámetros idénticas: primero declarado
        let cands = vec![method("put", &["java.lang.Number"]), method("put", &["java.lang.Number"])];
        assert_eq!(r.resolve(MemberKind::Method, "put", &[t("Integer")], &cands).expect("first declared").index, 0);

        // Number y Comparable están a la misma distancia y no se relacionan
        let cands = vec![method("put", &["java.lang.Number"]), method("put", &["java.lang.Comparable"])];
        assert!(r.resolve(MemberKind::Method, "put", &[t("Integer")], &cands).is_err());
    }

    #[test]
    fn constructors_ignore_name_and_zero_args_pick_default() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        let ctors = vec![MemberDescriptor::constructor("Stack", vec![t("int")]), MemberDescriptor::constructor("Stack", vec![])];
        assert_eq!(r.resolve(MemberKind::Constructor, "Stack", &[], &ctors).expect("default").index, 1);
        assert_eq!(r.resolve(MemberKind::Constructor, "whatever", &[t("short")], &ctors).expect("int").index, 0);
    }

    #[test]
    fn fields_resolve_reads_and_writes() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        let fields = vec![MemberDescriptor::field("count", t("int"))];
        assert!(r.resolve(MemberKind::Field, "count", &[], &fields).is_ok());
        assert!(r.resolve(MemberKind::Field, "count", &[t("short")], &fields).is_ok());
        assert!(r.resolve(MemberKind::Field, "count", &[t("String")], &fields).is_err());
    }

    #[test]
    fn no_match_reports_candidates() {
        let h = TypeHierarchy::jdk();
        let r = MemberResolver::new(&h);
        let cands = vec![method("push", &["int"])];
        let err = r.resolve(MemberKind::Method, "push", &[t("String")], &cands).expect_err("no match");
        match err {
            ResolutionFailure::NoMatch { candidates, .. } => assert_eq!(candidates, vec!["push(int)".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
