use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::orders::{CartLine, CreateOrderRequest, OrderWithItems},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
};

/// Place an order for `payload.items`.
///
/// Prices are read and frozen inside one transaction together with the order
/// and its items: either the whole order is stored or nothing is.
pub async fn create_order(
    db: &DatabaseConnection,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    validate_cart(&payload.items)?;

    let txn = db.begin().await.map_err(internal_failure)?;
    let (order, items) = match persist_order(&txn, &payload.items).await {
        Ok(saved) => saved,
        Err(OrderError::UnknownProduct(id)) => {
            tracing::warn!(product_id = id, "order rejected: unknown product");
            return Err(AppError::ProductNotFound(id));
        }
        Err(OrderError::Db(err)) => return Err(internal_failure(err)),
    };
    txn.commit().await.map_err(internal_failure)?;

    tracing::info!(
        order_id = order.id,
        items = items.len(),
        "order created"
    );

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order),
            items: items.into_iter().map(order_item_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

fn validate_cart(lines: &[CartLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("order must contain at least one item".into()));
    }
    if let Some(line) = lines.iter().find(|line| line.quantity < 1) {
        return Err(AppError::BadRequest(format!(
            "invalid quantity {} for product {}",
            line.quantity, line.product_id
        )));
    }
    Ok(())
}

enum OrderError {
    UnknownProduct(i32),
    Db(DbErr),
}

impl From<DbErr> for OrderError {
    fn from(err: DbErr) -> Self {
        OrderError::Db(err)
    }
}

async fn persist_order(
    txn: &DatabaseTransaction,
    lines: &[CartLine],
) -> Result<(OrderModel, Vec<OrderItemModel>), OrderError> {
    let ids: BTreeSet<i32> = lines.iter().map(|line| line.product_id).collect();

    // FOR SHARE keeps the validated prices stable until commit.
    let products: HashMap<i32, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .lock_shared()
        .all(txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    if let Some(line) = lines.iter().find(|line| !products.contains_key(&line.product_id)) {
        return Err(OrderError::UnknownProduct(line.product_id));
    }

    let order = OrderActive {
        id: NotSet,
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;

    let snapshots: Vec<OrderItemActive> = lines
        .iter()
        .map(|line| snapshot_line(order.id, line, &products[&line.product_id]))
        .collect();

    OrderItems::insert_many(snapshots)
        .exec_without_returning(txn)
        .await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(txn)
        .await?;

    Ok((order, items))
}

/// Freeze the product's current price and owner onto a new line item.
fn snapshot_line(order_id: i32, line: &CartLine, product: &ProductModel) -> OrderItemActive {
    OrderItemActive {
        id: NotSet,
        order_id: Set(order_id),
        product_id: Set(product.id),
        quantity: Set(line.quantity),
        price_at_purchase: Set(product.price),
        organization_id: Set(product.organization_id),
    }
}

fn internal_failure(err: DbErr) -> AppError {
    tracing::error!(error = %err, "order creation failed");
    AppError::Internal(anyhow::anyhow!("order creation failed"))
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price_at_purchase: model.price_at_purchase,
        organization_id: model.organization_id,
    }
}
