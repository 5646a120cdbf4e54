//! Reference-producing entry points, one per component class.

use skyhook_sdk::model::DeviceState;
use skyhook_sdk::{Device, Facility, GroundSdk, Instrument, Peripheral, PilotingItf};

use crate::queue::DeliveryQueue;
use crate::reference::Reference;

/// Observe facets of an entity. Implemented by [`Device`] and, through
/// `Deref`, usable on every typed entity handle.
pub trait DeviceObserve {
    fn get_state<F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<DeviceState>
    where
        F: FnMut(Option<&DeviceState>) + Send + 'static;

    fn get_instrument<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: Instrument,
        F: FnMut(Option<&K>) + Send + 'static;

    fn get_peripheral<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: Peripheral,
        F: FnMut(Option<&K>) + Send + 'static;

    fn get_piloting_itf<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: PilotingItf,
        F: FnMut(Option<&K>) + Send + 'static;
}

impl DeviceObserve for Device {
    fn get_state<F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<DeviceState>
    where
        F: FnMut(Option<&DeviceState>) + Send + 'static,
    {
        Reference::create(queue, self.state(), on_change)
    }

    fn get_instrument<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: Instrument,
        F: FnMut(Option<&K>) + Send + 'static,
    {
        Reference::create(queue, self.instrument::<K>(), on_change)
    }

    fn get_peripheral<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: Peripheral,
        F: FnMut(Option<&K>) + Send + 'static,
    {
        Reference::create(queue, self.peripheral::<K>(), on_change)
    }

    fn get_piloting_itf<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: PilotingItf,
        F: FnMut(Option<&K>) + Send + 'static,
    {
        Reference::create(queue, self.piloting_itf::<K>(), on_change)
    }
}

/// Observe SDK-wide facilities.
pub trait SdkObserve {
    fn get_facility<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: Facility,
        F: FnMut(Option<&K>) + Send + 'static;
}

impl SdkObserve for GroundSdk {
    fn get_facility<K, F>(&self, queue: &DeliveryQueue, on_change: F) -> Reference<K>
    where
        K: Facility,
        F: FnMut(Option<&K>) + Send + 'static,
    {
        Reference::create(queue, self.facility::<K>(), on_change)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skyhook_sdk::SimConfig;
    use skyhook_sdk::model::{AutoConnection, AutoConnectionStatus, BatteryInfo, ConnectionState};

    use super::*;

    #[tokio::test]
    async fn entry_points_deliver_current_values() {
        let queue = DeliveryQueue::spawn();
        let (sdk, sim) = GroundSdk::simulated(SimConfig::default());
        let drone = sim.connect_default_drone();

        let auto = sdk.get_facility::<AutoConnection, _>(&queue, |_| {});
        let state = drone.get_state(&queue, |_| {});
        let battery = drone.get_instrument::<BatteryInfo, _>(&queue, |_| {});

        assert_eq!(auto.value().unwrap().status, AutoConnectionStatus::Stopped);
        assert_eq!(state.value().unwrap().connection, ConnectionState::Connected);
        assert_eq!(battery.value().unwrap().level, 100);
    }
}
