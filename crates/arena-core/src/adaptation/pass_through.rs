//! Estrategia pass-through: los miembros propios del artifact satisfacen la
//! interfaz directamente, emparejados por nombre.

use log::debug;
use std::sync::Arc;

use super::implementation::AdaptedImplementation;
use super::strategy::{bind_by_name, bind_initializer, declared_types, hierarchy_for, AdaptationStrategy};
use crate::errors::AdaptationError;
use crate::model::{Artifact, InterfaceSpecification};
use crate::resolve::MemberResolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl AdaptationStrategy for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn adapt(&self,
             interface: &Arc<InterfaceSpecification>,
             artifact: &Arc<dyn Artifact>,
             variant: i64)
             -> Result<Vec<AdaptedImplementation>, AdaptationError> {
        if variant != 0 && variant != -1 {
            return Err(AdaptationError::VariantOutOfRange { requested: variant, available: 1 });
        }
        let hierarchy = hierarchy_for(artifact.as_ref());
        let resolver = MemberResolver::new(&hierarchy);

        let mut bindings = Vec::with_capacity(interface.len());
        for op in interface.operations() {
            let declared = declared_types(interface, artifact.as_ref(), op);
            let binding = if op.initializer {
                bind_initializer(&resolver, artifact.as_ref(), op, &declared)?
            } else {
                bind_by_name(&resolver, artifact.as_ref(), op, &declared)?
            };
            bindings.push(binding);
        }
        debug!("pass-through: {} adapted to {} ({} slots)", artifact.name(), interface.name, bindings.len());
        Ok(vec![AdaptedImplementation::new(Arc::clone(interface), Arc::clone(artifact), self.name(), 0, bindings)?])
    }
}
