//! Purchase business logic - Recording, editing and deleting shared purchases.
//!
//! Every mutation runs as one database transaction: load the current balances (and the old
//! purchase when editing), validate and normalize the draft, compute the balance delta with
//! the pure engine in [`crate::core::delta`], write the purchase and its line items, then
//! commit the changed balances. Any failure drops the transaction, leaving both the records
//! and the balances exactly as they were.

use crate::{
    core::{
        balance_store,
        delta::{apply_purchase_delete, apply_purchase_upsert},
        money::Money,
        records::{LineItem, PurchaseRecord, Share},
        shares::{
            ShareSelection, compute_item_shares, compute_line_total, verify_purchase_total,
        },
    },
    entities::{
        ItemShare, Purchase, PurchaseItem, item_share, purchase, purchase_item,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Largest quantity a single line item may carry.
pub const MAX_QUANTITY: f64 = 1_000_000.0;

/// One line of a purchase as submitted by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemDraft {
    /// Item description
    pub item_name: String,
    /// Number of units
    pub quantity: f64,
    /// Unit price
    pub price: Money,
    /// Tax rate in percent
    pub tax_rate: f64,
    /// Who shares this line
    pub participants: ShareSelection,
}

/// A purchase as submitted by a user, before validation.
///
/// `id = None` creates a new purchase; `Some(id)` replaces the stored one. When
/// `expected_version` is set, the update is refused if the stored purchase has moved on.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDraft {
    /// Purchase to replace, if editing
    pub id: Option<i64>,
    /// Version the edit was based on
    pub expected_version: Option<i32>,
    /// What was bought
    pub name: String,
    /// Where it was bought
    pub store: String,
    /// When it was bought
    pub date: Option<NaiveDate>,
    /// Who paid
    pub paid_by: Option<i64>,
    /// Total claimed by the submitter; only compared, never stored
    pub supplied_total: Option<Money>,
    /// Line items
    pub items: Vec<LineItemDraft>,
}

impl PurchaseDraft {
    /// Line `number` of this draft, counting from 1.
    ///
    /// # Errors
    /// [`Error::Validation`] if the draft has no such line.
    pub fn line_item_mut(&mut self, number: usize) -> Result<&mut LineItemDraft> {
        let count = self.items.len();
        number
            .checked_sub(1)
            .and_then(|index| self.items.get_mut(index))
            .ok_or_else(|| {
                Error::validation(format!("Item number must be between 1 and {count}"))
            })
    }
}

/// A stored line item with its shares.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseItemDetail {
    /// Line item row
    pub item: purchase_item::Model,
    /// Share rows for this line
    pub shares: Vec<item_share::Model>,
}

impl PurchaseItemDetail {
    /// Ids of everyone sharing this line, in share order.
    #[must_use]
    pub fn participant_ids(&self) -> Vec<i64> {
        self.shares.iter().map(|share| share.person_id).collect()
    }

    fn to_line_item(&self) -> LineItem {
        LineItem {
            quantity: self.item.quantity,
            price: Money::from_cents(self.item.price_cents),
            tax_rate: self.item.tax_rate,
            shares: self
                .shares
                .iter()
                .map(|share| Share {
                    person_id: share.person_id,
                    share_rate: share.share_rate,
                })
                .collect(),
        }
    }
}

/// A stored purchase with all of its line items and shares.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDetail {
    /// Purchase row
    pub purchase: purchase::Model,
    /// Line items in insertion order
    pub items: Vec<PurchaseItemDetail>,
}

impl PurchaseDetail {
    /// The balance-relevant view of this purchase.
    #[must_use]
    pub fn to_record(&self) -> PurchaseRecord {
        PurchaseRecord {
            paid_by: self.purchase.paid_by,
            items: self
                .items
                .iter()
                .map(PurchaseItemDetail::to_line_item)
                .collect(),
        }
    }

    /// Stored purchase total.
    #[must_use]
    pub const fn total(&self) -> Money {
        Money::from_cents(self.purchase.total_amount_cents)
    }

    /// A draft that edits this purchase, guarded by its current version.
    ///
    /// Participants are carried as explicit selections.
    #[must_use]
    pub fn to_edit_draft(&self) -> PurchaseDraft {
        PurchaseDraft {
            id: Some(self.purchase.id),
            expected_version: Some(self.purchase.version),
            date: Some(self.purchase.date),
            ..duplicate_purchase_draft(self, None)
        }
    }
}

/// Checks a draft before any storage access. Returns the first problem found.
///
/// # Errors
/// [`Error::Validation`] naming the offending field.
pub fn validate_purchase_draft(draft: &PurchaseDraft) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(Error::validation("Name must not be empty"));
    }
    if draft.store.trim().is_empty() {
        return Err(Error::validation("Store must not be empty"));
    }
    if draft.date.is_none() {
        return Err(Error::validation("Date must not be empty"));
    }
    if draft.paid_by.is_none() {
        return Err(Error::validation("Paid by must not be empty"));
    }
    if draft.items.is_empty() {
        return Err(Error::validation("At least one purchase detail is required"));
    }

    for item in &draft.items {
        if item.item_name.trim().is_empty() {
            return Err(Error::validation("Item name must not be empty"));
        }
        if !item.quantity.is_finite() || item.quantity <= 0.0 {
            return Err(Error::validation("Quantity must be greater than 0"));
        }
        if item.quantity > MAX_QUANTITY {
            return Err(Error::validation(format!(
                "Quantity must not exceed {MAX_QUANTITY}"
            )));
        }
        if !item.price.is_positive() {
            return Err(Error::validation("Price must be greater than 0"));
        }
        if item.price > Money::MAX_AMOUNT {
            return Err(Error::validation(format!(
                "Price must not exceed {}",
                Money::MAX_AMOUNT
            )));
        }
        if !item.tax_rate.is_finite() || item.tax_rate < 0.0 {
            return Err(Error::validation(
                "Tax rate must be greater than or equal to 0",
            ));
        }
        compute_line_total(item.quantity, item.price, item.tax_rate)?;
        if matches!(&item.participants, ShareSelection::Selected(ids) if ids.is_empty()) {
            return Err(Error::validation("At least one person must buy this item"));
        }
    }

    Ok(())
}

/// Creates or replaces a purchase and updates balances in one transaction.
///
/// Line totals and the purchase total are always recomputed; a supplied total that
/// disagrees is logged and ignored. Editing replaces every line item and share and bumps
/// the version.
///
/// # Errors
/// - [`Error::Validation`] for a malformed draft
/// - [`Error::PurchaseNotFound`] when editing a purchase that does not exist
/// - [`Error::VersionConflict`] when the purchase changed since `expected_version`
/// - [`Error::PersonNotFound`] when the payer or a participant is unknown
#[instrument(skip(db, draft), fields(purchase_id = ?draft.id))]
pub async fn upsert_purchase(db: &DatabaseConnection, draft: PurchaseDraft) -> Result<PurchaseDetail> {
    validate_purchase_draft(&draft)?;
    let (Some(paid_by), Some(date)) = (draft.paid_by, draft.date) else {
        return Err(Error::validation("Paid by must not be empty"));
    };

    let txn = db.begin().await?;

    let current = balance_store::load_all_balances(&txn).await?;
    let old = match draft.id {
        Some(id) => Some(
            load_purchase_detail(&txn, id)
                .await?
                .ok_or(Error::PurchaseNotFound { id })?,
        ),
        None => None,
    };

    if let (Some(old), Some(expected)) = (&old, draft.expected_version) {
        if old.purchase.version != expected {
            return Err(Error::VersionConflict {
                id: old.purchase.id,
                expected,
                found: old.purchase.version,
            });
        }
    }

    let all_person_ids: Vec<i64> = current.iter().map(|person| person.id).collect();
    let items = draft
        .items
        .iter()
        .map(|item| {
            Ok(LineItem {
                quantity: item.quantity,
                price: item.price,
                tax_rate: item.tax_rate,
                shares: compute_item_shares(&item.participants, &all_person_ids)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let record = PurchaseRecord { paid_by, items };
    let total = verify_purchase_total(draft.id, draft.supplied_total, &record.items)?;

    let old_record = old.as_ref().map(PurchaseDetail::to_record);
    let updated = apply_purchase_upsert(&record, old_record.as_ref(), &current)?;

    let now = chrono::Utc::now();
    let saved = match &old {
        Some(old) => {
            let changes = purchase::ActiveModel {
                name: Set(draft.name.trim().to_string()),
                store: Set(draft.store.trim().to_string()),
                date: Set(date),
                paid_by: Set(paid_by),
                total_amount_cents: Set(total.cents()),
                version: Set(old.purchase.version + 1),
                updated_at: Set(now),
                ..Default::default()
            };
            let result = Purchase::update_many()
                .set(changes)
                .filter(purchase::Column::Id.eq(old.purchase.id))
                .filter(purchase::Column::Version.eq(old.purchase.version))
                .exec(&txn)
                .await?;
            let saved = Purchase::find_by_id(old.purchase.id)
                .one(&txn)
                .await?
                .ok_or(Error::PurchaseNotFound {
                    id: old.purchase.id,
                })?;
            if result.rows_affected == 0 {
                return Err(Error::VersionConflict {
                    id: old.purchase.id,
                    expected: old.purchase.version,
                    found: saved.version,
                });
            }
            delete_line_items(&txn, old).await?;
            saved
        }
        None => {
            purchase::ActiveModel {
                name: Set(draft.name.trim().to_string()),
                store: Set(draft.store.trim().to_string()),
                date: Set(date),
                paid_by: Set(paid_by),
                total_amount_cents: Set(total.cents()),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let mut detail = PurchaseDetail {
        purchase: saved,
        items: Vec::with_capacity(record.items.len()),
    };
    for (item_draft, line) in draft.items.iter().zip(&record.items) {
        detail
            .items
            .push(insert_line_item(&txn, detail.purchase.id, item_draft, line).await?);
    }

    balance_store::commit_balances(&txn, &balance_store::changed_balances(&current, updated))
        .await?;
    txn.commit().await?;

    info!(
        purchase_id = detail.purchase.id,
        version = detail.purchase.version,
        %total,
        "Saved purchase"
    );
    Ok(detail)
}

/// Appends a line item to a stored purchase, rebalancing as an ordinary edit.
///
/// With `expected_version` set, the item is only added if the purchase is still at that
/// version; otherwise the version read here guards the write.
///
/// # Errors
/// Same as [`upsert_purchase`].
pub async fn add_line_item(
    db: &DatabaseConnection,
    purchase_id: i64,
    expected_version: Option<i32>,
    item: LineItemDraft,
) -> Result<PurchaseDetail> {
    let detail = get_purchase_detail(db, purchase_id).await?;
    let mut draft = detail.to_edit_draft();
    if expected_version.is_some() {
        draft.expected_version = expected_version;
    }
    draft.supplied_total = None;
    draft.items.push(item);
    upsert_purchase(db, draft).await
}

/// Deletes a purchase and reverses its effect on balances in one transaction.
///
/// # Errors
/// [`Error::PurchaseNotFound`] if there is no such purchase.
#[instrument(skip(db))]
pub async fn delete_purchase(db: &DatabaseConnection, purchase_id: i64) -> Result<PurchaseDetail> {
    let txn = db.begin().await?;

    let detail = load_purchase_detail(&txn, purchase_id)
        .await?
        .ok_or(Error::PurchaseNotFound { id: purchase_id })?;
    let current = balance_store::load_all_balances(&txn).await?;
    let updated = apply_purchase_delete(&detail.to_record(), &current)?;

    delete_line_items(&txn, &detail).await?;
    Purchase::delete_by_id(purchase_id).exec(&txn).await?;

    balance_store::commit_balances(&txn, &balance_store::changed_balances(&current, updated))
        .await?;
    txn.commit().await?;

    info!(purchase_id, "Deleted purchase");
    Ok(detail)
}

/// Retrieves a purchase with its line items and shares.
///
/// The total is recomputed from the items; a stored total that disagrees is logged.
///
/// # Errors
/// [`Error::PurchaseNotFound`] if there is no such purchase.
pub async fn get_purchase_detail<C>(db: &C, purchase_id: i64) -> Result<PurchaseDetail>
where
    C: ConnectionTrait,
{
    let detail = load_purchase_detail(db, purchase_id)
        .await?
        .ok_or(Error::PurchaseNotFound { id: purchase_id })?;
    let computed = verify_purchase_total(
        Some(purchase_id),
        Some(detail.total()),
        &detail.to_record().items,
    )?;
    Ok(PurchaseDetail {
        purchase: purchase::Model {
            total_amount_cents: computed.cents(),
            ..detail.purchase
        },
        items: detail.items,
    })
}

/// Retrieves the most recent purchases, newest date first.
///
/// # Errors
/// [`Error::Database`] if the query fails.
pub async fn get_recent_purchases<C>(db: &C, limit: u64) -> Result<Vec<purchase::Model>>
where
    C: ConnectionTrait,
{
    Purchase::find()
        .order_by_desc(purchase::Column::Date)
        .order_by_desc(purchase::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Builds a new-purchase draft that repeats `detail` on another date.
///
/// Each line keeps its participants as an explicit selection, so people added since then are
/// not pulled in.
#[must_use]
pub fn duplicate_purchase_draft(detail: &PurchaseDetail, date: Option<NaiveDate>) -> PurchaseDraft {
    PurchaseDraft {
        id: None,
        expected_version: None,
        name: detail.purchase.name.clone(),
        store: detail.purchase.store.clone(),
        date,
        paid_by: Some(detail.purchase.paid_by),
        supplied_total: Some(detail.total()),
        items: detail
            .items
            .iter()
            .map(|item| LineItemDraft {
                item_name: item.item.item_name.clone(),
                quantity: item.item.quantity,
                price: Money::from_cents(item.item.price_cents),
                tax_rate: item.item.tax_rate,
                participants: ShareSelection::Selected(item.participant_ids()),
            })
            .collect(),
    }
}

/// Loads a purchase with its items and shares. Every query runs on `db`, so passing a
/// transaction sees its uncommitted writes.
pub(crate) async fn load_purchase_detail<C>(db: &C, purchase_id: i64) -> Result<Option<PurchaseDetail>>
where
    C: ConnectionTrait,
{
    let Some(purchase) = Purchase::find_by_id(purchase_id).one(db).await? else {
        return Ok(None);
    };

    let items = PurchaseItem::find()
        .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
        .order_by_asc(purchase_item::Column::Id)
        .all(db)
        .await?;
    let item_ids: Vec<i64> = items.iter().map(|item| item.id).collect();
    let mut shares = ItemShare::find()
        .filter(item_share::Column::PurchaseItemId.is_in(item_ids))
        .order_by_asc(item_share::Column::Id)
        .all(db)
        .await?;

    let items = items
        .into_iter()
        .map(|item| {
            let (own, rest): (Vec<_>, Vec<_>) = shares
                .drain(..)
                .partition(|share| share.purchase_item_id == item.id);
            shares = rest;
            PurchaseItemDetail { item, shares: own }
        })
        .collect();

    Ok(Some(PurchaseDetail { purchase, items }))
}

async fn delete_line_items<C>(db: &C, detail: &PurchaseDetail) -> Result<()>
where
    C: ConnectionTrait,
{
    let item_ids: Vec<i64> = detail.items.iter().map(|item| item.item.id).collect();
    ItemShare::delete_many()
        .filter(item_share::Column::PurchaseItemId.is_in(item_ids))
        .exec(db)
        .await?;
    PurchaseItem::delete_many()
        .filter(purchase_item::Column::PurchaseId.eq(detail.purchase.id))
        .exec(db)
        .await?;
    Ok(())
}

async fn insert_line_item<C>(
    db: &C,
    purchase_id: i64,
    draft: &LineItemDraft,
    line: &LineItem,
) -> Result<PurchaseItemDetail>
where
    C: ConnectionTrait,
{
    let item = purchase_item::ActiveModel {
        purchase_id: Set(purchase_id),
        item_name: Set(draft.item_name.trim().to_string()),
        quantity: Set(line.quantity),
        price_cents: Set(line.price.cents()),
        tax_rate: Set(line.tax_rate),
        total_price_cents: Set(line.total_price()?.cents()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut shares = Vec::with_capacity(line.shares.len());
    for share in &line.shares {
        let saved = item_share::ActiveModel {
            purchase_item_id: Set(item.id),
            person_id: Set(share.person_id),
            share_rate: Set(share.share_rate),
            ..Default::default()
        }
        .insert(db)
        .await?;
        shares.push(saved);
    }

    Ok(PurchaseItemDetail { item, shares })
}
