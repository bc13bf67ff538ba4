use dunk_events::{EntityRef, EventName};
use dunk_scripting::{Entity, Reaction, ScriptError};

use crate::zone::Zone;

/// A stateless detector bound to `zone`: whenever the controlled object
/// enters the zone it sends `event` to `target`.
pub fn zone_relay(
    reference: EntityRef,
    zone: &Zone,
    target: EntityRef,
    event: EventName,
) -> Result<Entity, ScriptError> {
    let mut entity = Entity::marker(reference).with_script();
    let script = entity.scripted()?;

    script.bind_zone(zone.name())?;
    script.on(EventName::CONTROLLEDZONE_ENTER, move |_| {
        Reaction::new().send(target.clone(), event.clone())
    });

    Ok(entity)
}
