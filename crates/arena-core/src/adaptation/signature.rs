//! Estrategia por firma: liga operaciones a métodos compatibles sin exigir
//! que los nombres coincidan.
//!
//! Para cada operación no inicializadora se rankean los métodos cuyos
//! parámetros aceptan los tipos declarados y cuyo retorno es compatible:
//! primero nombre idéntico, luego nombre igual ignorando mayúsculas, luego
//! menor costo de conversión y por último orden de declaración. Las
//! combinaciones se enumeran en orden lexicográfico sobre esos rankings, sin
//! ligar dos operaciones al mismo método, hasta `limit`.

use log::debug;
use std::sync::Arc;

use super::implementation::{AdaptedImplementation, Binding};
use super::strategy::{bind_by_name, bind_initializer, declared_types, hierarchy_for, substitute, AdaptationStrategy};
use crate::constants::DEFAULT_ADAPTER_LIMIT;
use crate::errors::AdaptationError;
use crate::model::{Artifact, InterfaceSpecification, Operation};
use crate::resolve::{conversion_cost, MemberResolver};

#[derive(Debug, Clone, Copy)]
pub struct SignatureMatching {
    limit: usize,
}

impl SignatureMatching {
    pub fn new(limit: usize) -> Self {
        Self { limit: limit.max(1) }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Opciones rankeadas para una operación.
    fn options(&self,
               resolver: &MemberResolver<'_>,
               interface: &InterfaceSpecification,
               artifact: &dyn Artifact,
               op: &Operation)
               -> Result<Vec<Binding>, AdaptationError> {
        let declared = declared_types(interface, artifact, op);
        if op.initializer {
            return Ok(vec![bind_initializer(resolver, artifact, op, &declared)?]);
        }
        let expected_return = substitute(&op.return_type, &interface.name, artifact.name());
        let mut ranked: Vec<((u8, u32, usize), Binding)> = Vec::new();
        for (index, method) in artifact.methods().iter().enumerate() {
            let Some(param_cost) = resolver.cost(&declared, method) else { continue };
            let return_cost = if expected_return.is_void() {
                Some(0)
            } else {
                conversion_cost(resolver.hierarchy(), &method.value_type, &expected_return)
            };
            let Some(return_cost) = return_cost else { continue };
            let name_rank = if method.name == op.name {
                0
            } else if method.name.eq_ignore_ascii_case(&op.name) {
                1
            } else {
                2
            };
            ranked.push(((name_rank, param_cost + return_cost, index), Binding::Method(index)));
        }
        ranked.sort_by_key(|(key, _)| *key);
        if ranked.is_empty() {
            // sin método compatible: campo del mismo nombre, si existe
            return bind_by_name(resolver, artifact, op, &declared).map(|b| vec![b])
                                                                  .map_err(|_| AdaptationError::NoCandidates { operation: op.name.clone() });
        }
        Ok(ranked.into_iter().map(|(_, b)| b).collect())
    }

    /// DFS sobre las opciones por slot; ningún método se usa dos veces.
    fn enumerate(options: &[Vec<Binding>], wanted: usize) -> Vec<Vec<Binding>> {
        fn walk(options: &[Vec<Binding>], slot: usize, current: &mut Vec<Binding>, out: &mut Vec<Vec<Binding>>, wanted: usize) {
            if out.len() >= wanted {
                return;
            }
            if slot == options.len() {
                out.push(current.clone());
                return;
            }
            for candidate in &options[slot] {
                let taken = matches!(candidate, Binding::Method(_)) && current.contains(candidate);
                if taken {
                    continue;
                }
                current.push(*candidate);
                walk(options, slot + 1, current, out, wanted);
                current.pop();
            }
        }
        let mut out = Vec::new();
        walk(options, 0, &mut Vec::with_capacity(options.len()), &mut out, wanted);
        out
    }
}

impl Default for SignatureMatching {
    fn default() -> Self {
        Self::new(DEFAULT_ADAPTER_LIMIT)
    }
}

impl AdaptationStrategy for SignatureMatching {
    fn name(&self) -> &str {
        "signature"
    }

    fn adapt(&self,
             interface: &Arc<InterfaceSpecification>,
             artifact: &Arc<dyn Artifact>,
             variant: i64)
             -> Result<Vec<AdaptedImplementation>, AdaptationError> {
        if variant < -1 {
            return Err(AdaptationError::VariantOutOfRange { requested: variant, available: 0 });
        }
        let hierarchy = hierarchy_for(artifact.as_ref());
        let resolver = MemberResolver::new(&hierarchy);
        let options = interface.operations()
                               .iter()
                               .map(|op| self.options(&resolver, interface, artifact.as_ref(), op))
                               .collect::<Result<Vec<_>, _>>()?;

        let combos = Self::enumerate(&options, self.limit);
        if combos.is_empty() {
            return Err(AdaptationError::NoCandidates { operation: format!("{} (no distinct method assignment)", interface.name) });
        }
        debug!("signature: {} variant(s) of {} for {}", combos.len(), artifact.name(), interface.name);

        let build = |(index, bindings): (usize, Vec<Binding>)| {
            AdaptedImplementation::new(Arc::clone(interface), Arc::clone(artifact), self.name(), index, bindings)
        };
        if variant == -1 {
            return combos.into_iter().enumerate().map(build).collect();
        }
        let available = combos.len();
        let wanted = variant as usize;
        match combos.into_iter().nth(wanted) {
            Some(bindings) => Ok(vec![build((wanted, bindings))?]),
            None => Err(AdaptationError::VariantOutOfRange { requested: variant, available }),
        }
    }
}
