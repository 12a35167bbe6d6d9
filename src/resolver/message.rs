//! Message Builder: one message definition into one serialized payload.

use super::address::AddressTable;
use super::snapshot::{PayloadKind, ResolvedPayload};
use crate::document::MessageDefinition;
use crate::error::ResolveError;
use crate::osc::{encode_message, Argument};

pub struct MessageBuilder<'a> {
    addresses: &'a AddressTable,
}

impl<'a> MessageBuilder<'a> {
    pub fn new(addresses: &'a AddressTable) -> Self {
        Self { addresses }
    }

    /// Build the payload for message `name`.
    ///
    /// Pure: depends only on the address table and the definition itself.
    pub fn build(
        &self,
        name: &str,
        definition: &MessageDefinition,
    ) -> Result<ResolvedPayload, ResolveError> {
        let path = self
            .addresses
            .resolve(&definition.address)
            .ok_or_else(|| ResolveError::UnknownAddress {
                message: name.to_string(),
                address: definition.address.clone(),
            })?;

        let args = definition
            .arguments
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Argument::from_value(value).map_err(|reason| ResolveError::InvalidArgument {
                    message: name.to_string(),
                    index,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedPayload::new(
            PayloadKind::Message,
            encode_message(path, &args),
        ))
    }
}
