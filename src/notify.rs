//! In-process publish/subscribe for lifecycle events.
//!
//! Services publish after their transaction commits; the `/ws` relay
//! subscribes and forwards notifications whose room the socket joined.
//! Publishing never fails the caller: with no subscribers the event is
//! dropped and logged at debug level.

use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    AdminOrders,
    KitchenAll,
    User(Uuid),
    Table(Uuid),
    Waiter(Uuid),
    Comanda(Uuid),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::AdminOrders => f.write_str("admin_orders"),
            Room::KitchenAll => f.write_str("kitchen_all"),
            Room::User(id) => write!(f, "user_{id}"),
            Room::Table(id) => write!(f, "table_{id}"),
            Room::Waiter(id) => write!(f, "waiter_{id}"),
            Room::Comanda(id) => write!(f, "comanda_{id}"),
        }
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin_orders" => return Ok(Room::AdminOrders),
            "kitchen_all" => return Ok(Room::KitchenAll),
            _ => {}
        }
        let (prefix, id) = s
            .split_once('_')
            .ok_or_else(|| format!("Unknown room {s}"))?;
        let id = Uuid::parse_str(id).map_err(|_| format!("Invalid room id in {s}"))?;
        match prefix {
            "user" => Ok(Room::User(id)),
            "table" => Ok(Room::Table(id)),
            "waiter" => Ok(Room::Waiter(id)),
            "comanda" => Ok(Room::Comanda(id)),
            _ => Err(format!("Unknown room {s}")),
        }
    }
}

impl Serialize for Room {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    NewOrder,
    OrderUpdated,
    OrderStatusChanged,
    ComandaItemUpdated,
    NewItemAdded,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub room: Room,
    pub event: Event,
    pub payload: Value,
}

/// Who hears about an event besides admin and kitchen. Orders carry their
/// customer; comanda items carry the table and its waiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderAudience {
    pub user_id: Option<Uuid>,
    pub table_id: Option<Uuid>,
    pub waiter_id: Option<Uuid>,
}

impl OrderAudience {
    pub fn customer(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    fn floor_rooms(&self) -> Vec<Room> {
        let mut rooms = vec![Room::KitchenAll];
        rooms.extend(self.table_id.map(Room::Table));
        rooms.extend(self.waiter_id.map(Room::Waiter));
        rooms
    }
}

#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn publish(&self, room: Room, event: Event, payload: Value) {
        let notification = Notification {
            room,
            event,
            payload,
        };
        if self.tx.send(notification).is_err() {
            tracing::debug!(%room, ?event, "no subscribers for notification");
        }
    }

    fn publish_all(&self, rooms: impl IntoIterator<Item = Room>, event: Event, payload: &Value) {
        for room in rooms {
            self.publish(room, event, payload.clone());
        }
    }

    pub fn new_order(&self, audience: OrderAudience, payload: Value) {
        let mut rooms = vec![Room::AdminOrders];
        rooms.extend(audience.floor_rooms());
        self.publish_all(rooms, Event::NewOrder, &payload);
    }

    /// Admin gets the full update; everyone else in the audience gets the status change.
    pub fn order_status_changed(&self, audience: OrderAudience, payload: Value) {
        self.publish(Room::AdminOrders, Event::OrderUpdated, payload.clone());
        let mut rooms: Vec<Room> = audience.user_id.map(Room::User).into_iter().collect();
        rooms.extend(audience.floor_rooms());
        self.publish_all(rooms, Event::OrderStatusChanged, &payload);
    }

    pub fn comanda_item_updated(&self, comanda_id: Uuid, audience: OrderAudience, payload: Value) {
        let mut rooms = vec![Room::Comanda(comanda_id), Room::AdminOrders];
        rooms.extend(audience.floor_rooms());
        self.publish_all(rooms, Event::ComandaItemUpdated, &payload);
    }

    pub fn comanda_item_added(&self, comanda_id: Uuid, payload: Value) {
        self.publish_all(
            [Room::Comanda(comanda_id), Room::KitchenAll],
            Event::NewItemAdded,
            &payload,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<(String, Event)> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push((n.room.to_string(), n.event));
        }
        out
    }

    #[test]
    fn room_names_round_trip() {
        let id = Uuid::new_v4();
        for room in [
            Room::AdminOrders,
            Room::KitchenAll,
            Room::User(id),
            Room::Table(id),
            Room::Waiter(id),
            Room::Comanda(id),
        ] {
            assert_eq!(room.to_string().parse::<Room>(), Ok(room));
        }
        assert!("lobby".parse::<Room>().is_err());
        assert!("table_12".parse::<Room>().is_err());
    }

    #[test]
    fn new_order_reaches_admin_and_kitchen() {
        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();
        hub.new_order(OrderAudience::default(), json!({ "id": 1 }));
        assert_eq!(
            drain(&mut rx),
            vec![
                ("admin_orders".to_string(), Event::NewOrder),
                ("kitchen_all".to_string(), Event::NewOrder),
            ]
        );
    }

    #[test]
    fn order_status_change_reaches_its_customer() {
        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();
        let user = Uuid::new_v4();
        hub.order_status_changed(OrderAudience::customer(user), json!({}));
        assert_eq!(
            drain(&mut rx),
            vec![
                ("admin_orders".to_string(), Event::OrderUpdated),
                (format!("user_{user}"), Event::OrderStatusChanged),
                ("kitchen_all".to_string(), Event::OrderStatusChanged),
            ]
        );
    }

    #[test]
    fn comanda_item_update_routes_by_populated_keys() {
        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();
        let comanda = Uuid::new_v4();
        let table = Uuid::new_v4();
        hub.comanda_item_updated(
            comanda,
            OrderAudience {
                table_id: Some(table),
                ..OrderAudience::default()
            },
            json!({}),
        );
        let got = drain(&mut rx);
        assert_eq!(got[0], (format!("comanda_{comanda}"), Event::ComandaItemUpdated));
        assert!(got.contains(&(format!("table_{table}"), Event::ComandaItemUpdated)));
        assert!(got.contains(&("kitchen_all".to_string(), Event::ComandaItemUpdated)));
        assert!(!got.iter().any(|(room, _)| room.starts_with("waiter_") || room.starts_with("user_")));
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let hub = NotificationHub::new(4);
        hub.comanda_item_added(Uuid::new_v4(), json!({}));
    }
}
