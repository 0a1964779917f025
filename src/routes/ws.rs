//! Real-time relay. Clients connect to `/ws?token=...&rooms=a,b` and receive
//! every notification published to the rooms they joined.

use std::collections::HashSet;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, TableSession, decode_table_token, decode_user_token},
    notify::{Notification, Room},
    state::AppState,
};

const MAX_MESSAGE_SIZE: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
    /// Comma separated room names; omitted means the caller's default rooms.
    pub rooms: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Principal {
    Staff(AuthUser),
    Table(TableSession),
}

impl Principal {
    fn authenticate(token: &str) -> AppResult<Self> {
        match decode_user_token(token) {
            Ok(user) => Ok(Principal::Staff(user)),
            Err(_) => decode_table_token(token).map(Principal::Table),
        }
    }

    fn default_rooms(&self) -> HashSet<Room> {
        let mut rooms = HashSet::new();
        match self {
            Principal::Staff(user) => {
                rooms.insert(Room::User(user.user_id));
                if user.role.can(Capability::ManageStore) {
                    rooms.insert(Room::AdminOrders);
                }
                if user.role.can(Capability::OperateKitchen) {
                    rooms.insert(Room::KitchenAll);
                }
                if user.role.can(Capability::OperatePdv) {
                    rooms.insert(Room::Waiter(user.user_id));
                }
            }
            Principal::Table(session) => {
                rooms.insert(Room::Table(session.table_id));
                rooms.insert(Room::Comanda(session.comanda_id));
            }
        }
        rooms
    }
}

/// Whether `principal` may listen to `room`.
pub fn authorize_room(principal: &Principal, room: Room) -> bool {
    match (principal, room) {
        (Principal::Staff(user), Room::AdminOrders) => user.role.can(Capability::ManageStore),
        (Principal::Staff(user), Room::KitchenAll) => user.role.can(Capability::OperateKitchen),
        (Principal::Staff(user), Room::User(id)) => user.user_id == id,
        (Principal::Staff(user), Room::Waiter(id)) => {
            (user.user_id == id && user.role.can(Capability::OperatePdv))
                || user.role.can(Capability::ManageStore)
        }
        (Principal::Staff(user), Room::Table(_) | Room::Comanda(_)) => {
            user.role.can(Capability::OperatePdv) || user.role.can(Capability::OperateKitchen)
        }
        (Principal::Table(session), Room::Table(id)) => session.table_id == id,
        (Principal::Table(session), Room::Comanda(id)) => session.comanda_id == id,
        (Principal::Table(_), _) => false,
    }
}

fn requested_rooms(principal: &Principal, raw: Option<&str>) -> AppResult<HashSet<Room>> {
    let names: Vec<&str> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        return Ok(principal.default_rooms());
    }

    let mut rooms = HashSet::with_capacity(names.len());
    for name in names {
        let room: Room = name.parse().map_err(AppError::BadRequest)?;
        if !authorize_room(principal, room) {
            return Err(AppError::Forbidden);
        }
        rooms.insert(room);
    }
    Ok(rooms)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> AppResult<Response> {
    let principal = Principal::authenticate(&query.token)?;
    let rooms = requested_rooms(&principal, query.rooms.as_deref())?;
    let rx = state.notifier.subscribe();
    info!(rooms = rooms.len(), "websocket client joined");
    Ok(ws
        .max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| relay(socket, rx, rooms)))
}

async fn relay(
    socket: WebSocket,
    mut rx: broadcast::Receiver<Notification>,
    rooms: HashSet<Room>,
) {
    let (mut sender, mut receiver) = socket.split();

    let joined: Vec<String> = rooms.iter().map(Room::to_string).collect();
    let hello = json!({ "event": "connected", "rooms": joined }).to_string();
    if sender.send(Message::Text(hello.into())).await.is_err() {
        return;
    }

    let forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) if rooms.contains(&notification.room) => {
                    let Ok(text) = serde_json::to_string(&notification) else {
                        continue;
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "websocket receive error");
                break;
            }
        }
    }

    forward.abort();
    debug!("websocket client left");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::Role;
    use uuid::Uuid;

    fn staff(role: Role) -> (Uuid, Principal) {
        let id = Uuid::new_v4();
        (
            id,
            Principal::Staff(AuthUser {
                user_id: id,
                role,
            }),
        )
    }

    #[test]
    fn customers_only_hear_their_own_room() {
        let (id, customer) = staff(Role::Customer);
        assert!(authorize_room(&customer, Room::User(id)));
        assert!(!authorize_room(&customer, Room::User(Uuid::new_v4())));
        assert!(!authorize_room(&customer, Room::AdminOrders));
        assert!(!authorize_room(&customer, Room::KitchenAll));
        assert!(!authorize_room(&customer, Room::Table(Uuid::new_v4())));
    }

    #[test]
    fn staff_rooms_follow_capabilities() {
        let (_, kitchen) = staff(Role::Kitchen);
        assert!(authorize_room(&kitchen, Room::KitchenAll));
        assert!(!authorize_room(&kitchen, Room::AdminOrders));

        let (waiter_id, waiter) = staff(Role::Waiter);
        assert!(authorize_room(&waiter, Room::Waiter(waiter_id)));
        assert!(!authorize_room(&waiter, Room::Waiter(Uuid::new_v4())));
        assert!(authorize_room(&waiter, Room::Comanda(Uuid::new_v4())));

        let (_, manager) = staff(Role::Manager);
        assert!(authorize_room(&manager, Room::AdminOrders));
        assert!(authorize_room(&manager, Room::Waiter(Uuid::new_v4())));
    }

    #[test]
    fn table_session_is_bound_to_its_table_and_comanda() {
        let session = TableSession {
            table_id: Uuid::new_v4(),
            comanda_id: Uuid::new_v4(),
        };
        let guest = Principal::Table(session.clone());
        assert!(authorize_room(&guest, Room::Table(session.table_id)));
        assert!(authorize_room(&guest, Room::Comanda(session.comanda_id)));
        assert!(!authorize_room(&guest, Room::Table(Uuid::new_v4())));
        assert!(!authorize_room(&guest, Room::KitchenAll));
    }

    #[test]
    fn rooms_default_by_role_and_reject_foreign_ones() {
        let (id, admin) = staff(Role::Admin);
        let rooms = requested_rooms(&admin, None).unwrap();
        assert!(rooms.contains(&Room::AdminOrders));
        assert!(rooms.contains(&Room::KitchenAll));
        assert!(rooms.contains(&Room::User(id)));

        let (_, customer) = staff(Role::Customer);
        assert!(matches!(
            requested_rooms(&customer, Some("admin_orders")),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            requested_rooms(&customer, Some("lobby")),
            Err(AppError::BadRequest(_))
        ));
    }
}
