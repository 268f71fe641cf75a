use super::buffer::BufferKind;
use crate::error::{Error, Result};

/// A resource slot the shader declares in bind group 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSlot {
    pub binding: u32,
    pub kind: BufferKind,
}

/// The bindings a shader expects, checked before creating a bind group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderContract {
    slots: Vec<BindingSlot>,
}

impl ShaderContract {
    pub fn new(slots: Vec<BindingSlot>) -> Self {
        Self { slots }
    }

    /// Bindings of the sphere tracing shader
    pub fn scene() -> Self {
        Self::new(vec![
            BindingSlot { binding: 0, kind: BufferKind::Uniform },
            BindingSlot { binding: 1, kind: BufferKind::Storage },
            BindingSlot { binding: 2, kind: BufferKind::Uniform },
        ])
    }

    pub fn slots(&self) -> &[BindingSlot] {
        &self.slots
    }

    /// Check that `entries` fill every slot exactly once with the right kind
    pub fn validate(&self, entries: &[BindingSlot]) -> Result<()> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.binding == entry.binding) {
                return Err(Error::BindingMismatch(format!(
                    "binding {} supplied more than once",
                    entry.binding
                )));
            }
            match self.slots.iter().find(|s| s.binding == entry.binding) {
                None => {
                    return Err(Error::BindingMismatch(format!(
                        "shader declares no binding {}",
                        entry.binding
                    )))
                }
                Some(slot) if slot.kind != entry.kind => {
                    return Err(Error::BindingMismatch(format!(
                        "binding {} expects a {:?} buffer, got {:?}",
                        entry.binding, slot.kind, entry.kind
                    )))
                }
                Some(_) => {}
            }
        }

        if let Some(missing) = self
            .slots
            .iter()
            .find(|s| !entries.iter().any(|e| e.binding == s.binding))
        {
            return Err(Error::BindingMismatch(format!(
                "binding {} ({:?}) left unbound",
                missing.binding, missing.kind
            )));
        }

        Ok(())
    }
}
