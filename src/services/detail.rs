//! Aggregate loaders. Each one issues a fixed number of batched queries for
//! any number of parents instead of walking relations row by row.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    domain::pricing::PricedLine,
    entity::{
        comanda_item_extras::{Column as ComandaExtraCol, Entity as ComandaItemExtras},
        comanda_items::{Column as ComandaItemCol, Entity as ComandaItems, Model as ComandaItemModel},
        comandas::Model as ComandaModel,
        dining_tables::Entity as DiningTables,
        extras::{Column as ExtraCol, Entity as Extras},
        order_item_extras::{Column as OrderExtraCol, Entity as OrderItemExtras},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        order_notes::{Column as NoteCol, Entity as OrderNotes},
        orders::Model as OrderModel,
        products::{Column as ProdCol, Entity as Products},
        status_history::{Column as HistoryCol, Entity as StatusHistory},
    },
    error::{AppError, AppResult},
    models::{
        ComandaDetail, ComandaItemDetail, LineExtra, OrderDetail, OrderItemDetail, StatusChange,
    },
    services::lifecycle::SUBJECT_ORDER,
};

pub async fn product_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect())
}

pub async fn extra_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Extras::find()
        .filter(ExtraCol::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect())
}

fn name_of(names: &HashMap<Uuid, String>, id: &Uuid) -> String {
    names.get(id).cloned().unwrap_or_default()
}

/// Orders with items, extras and history. Internal notes are only included
/// for back-office callers.
pub async fn order_details<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
    include_internal_notes: bool,
) -> AppResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.clone()))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

    let extras = if item_ids.is_empty() {
        Vec::new()
    } else {
        OrderItemExtras::find()
            .filter(OrderExtraCol::OrderItemId.is_in(item_ids))
            .all(conn)
            .await?
    };

    let products = product_names(conn, items.iter().map(|i| i.product_id)).await?;
    let extra_labels = extra_names(conn, extras.iter().map(|e| e.extra_id)).await?;

    let mut extras_by_item: HashMap<Uuid, Vec<LineExtra>> = HashMap::new();
    for extra in extras {
        let name = name_of(&extra_labels, &extra.extra_id);
        extras_by_item
            .entry(extra.order_item_id)
            .or_default()
            .push(LineExtra::from_order_extra(extra, name));
    }

    let mut items_by_order: HashMap<Uuid, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        let product_name = name_of(&products, &item.product_id);
        let extras = extras_by_item.remove(&item.id).unwrap_or_default();
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItemDetail {
                item: item.into(),
                product_name,
                extras,
            });
    }

    let mut history_by_order: HashMap<Uuid, Vec<StatusChange>> = HashMap::new();
    for row in StatusHistory::find()
        .filter(HistoryCol::Subject.eq(SUBJECT_ORDER))
        .filter(HistoryCol::SubjectId.is_in(order_ids.clone()))
        .order_by_asc(HistoryCol::CreatedAt)
        .all(conn)
        .await?
    {
        history_by_order
            .entry(row.subject_id)
            .or_default()
            .push(row.into());
    }

    let mut notes_query = OrderNotes::find().filter(NoteCol::OrderId.is_in(order_ids));
    if !include_internal_notes {
        notes_query = notes_query.filter(NoteCol::IsInternal.eq(false));
    }
    let mut notes_by_order: HashMap<Uuid, Vec<_>> = HashMap::new();
    for note in notes_query
        .order_by_asc(NoteCol::CreatedAt)
        .all(conn)
        .await?
    {
        notes_by_order
            .entry(note.order_id)
            .or_default()
            .push(note.into());
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderDetail {
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            history: history_by_order.remove(&order.id).unwrap_or_default(),
            notes: notes_by_order.remove(&order.id).unwrap_or_default(),
            order: order.into(),
        })
        .collect())
}

pub async fn order_detail<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
    include_internal_notes: bool,
) -> AppResult<OrderDetail> {
    order_details(conn, vec![order], include_internal_notes)
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

/// Comanda items with product names, extras and line totals.
pub async fn comanda_item_details<C: ConnectionTrait>(
    conn: &C,
    items: Vec<ComandaItemModel>,
) -> AppResult<Vec<ComandaItemDetail>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let extras = ComandaItemExtras::find()
        .filter(ComandaExtraCol::ComandaItemId.is_in(item_ids))
        .all(conn)
        .await?;

    let products = product_names(conn, items.iter().map(|i| i.product_id)).await?;
    let extra_labels = extra_names(conn, extras.iter().map(|e| e.extra_id)).await?;

    let mut extras_by_item: HashMap<Uuid, Vec<LineExtra>> = HashMap::new();
    for extra in extras {
        let name = name_of(&extra_labels, &extra.extra_id);
        extras_by_item
            .entry(extra.comanda_item_id)
            .or_default()
            .push(LineExtra::from_comanda_extra(extra, name));
    }

    Ok(items
        .into_iter()
        .map(|item| {
            let extras = extras_by_item.remove(&item.id).unwrap_or_default();
            let line = PricedLine {
                unit_price: item.price,
                extras_per_unit: extras
                    .iter()
                    .map(|e| e.price * i64::from(e.quantity))
                    .sum(),
                quantity: item.quantity,
            };
            ComandaItemDetail {
                product_name: name_of(&products, &item.product_id),
                line_total: line.total(),
                extras,
                item: item.into(),
            }
        })
        .collect())
}

pub async fn comanda_detail<C: ConnectionTrait>(
    conn: &C,
    comanda: ComandaModel,
) -> AppResult<ComandaDetail> {
    let table = match comanda.table_id {
        Some(table_id) => DiningTables::find_by_id(table_id).one(conn).await?,
        None => None,
    };
    let items = ComandaItems::find()
        .filter(ComandaItemCol::ComandaId.eq(comanda.id))
        .order_by_asc(ComandaItemCol::CreatedAt)
        .all(conn)
        .await?;
    Ok(ComandaDetail {
        comanda: comanda.into(),
        table: table.map(Into::into),
        items: comanda_item_details(conn, items).await?,
    })
}
