//! Sale service: totals, sale numbers, and status transitions

use crate::error::{CommerceError, Result};
use crate::models::{NewSale, Sale, SaleStatus, SaleWithItems};
use crate::repositories::sale::{SaleDraft, SaleItemDraft};
use crate::repositories::SaleRepository;
use core_store::{Page, PageRequest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Sales tax applied to the discounted subtotal
const TAX_RATE: f64 = 0.12;

/// Service over sale headers and their lines
pub struct SaleService {
    sales: Arc<dyn SaleRepository>,
}

impl SaleService {
    pub fn new(sales: Arc<dyn SaleRepository>) -> Self {
        Self { sales }
    }

    pub async fn get(&self, id: i64) -> Result<SaleWithItems> {
        let sale = self.load(id).await?;
        let items = self.sales.items(id).await?;
        Ok(SaleWithItems { sale, items })
    }

    pub async fn find_by_number(&self, sale_number: &str) -> Result<Option<Sale>> {
        self.sales.find_by_number(sale_number).await
    }

    pub async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Sale>> {
        self.sales.find_by_user(user_id, page_request).await
    }

    pub async fn find_by_date_range(&self, from: i64, to: i64) -> Result<Vec<Sale>> {
        self.sales.find_by_date_range(from, to).await
    }

    /// Create a sale from its lines
    ///
    /// Subtotal is the sum of quantity times unit price per line; tax is
    /// 12% of the subtotal after the discount; the total follows. A unique
    /// sale number is generated. The sale starts Pending.
    ///
    /// # Errors
    /// `InvalidInput` when no lines are supplied, a quantity is not
    /// positive, a unit price is negative, or the discount exceeds the
    /// subtotal.
    pub async fn create(&self, new: NewSale) -> Result<SaleWithItems> {
        if new.items.is_empty() {
            return Err(CommerceError::InvalidInput {
                field: "items".to_string(),
                message: "A sale requires at least one item".to_string(),
            });
        }
        if new.discount < 0.0 {
            return Err(CommerceError::InvalidInput {
                field: "discount".to_string(),
                message: "Discount cannot be negative".to_string(),
            });
        }

        let mut subtotal = 0.0;
        let mut items = Vec::with_capacity(new.items.len());
        for item in &new.items {
            if item.quantity <= 0 {
                return Err(CommerceError::InvalidInput {
                    field: "quantity".to_string(),
                    message: "Item quantity must be positive".to_string(),
                });
            }
            if item.unit_price < 0.0 {
                return Err(CommerceError::InvalidInput {
                    field: "unit_price".to_string(),
                    message: "Item price cannot be negative".to_string(),
                });
            }

            let line_total = item.quantity as f64 * item.unit_price;
            subtotal += line_total;
            items.push(SaleItemDraft {
                product_id: item.product_id,
                product_kind: item.product_kind,
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total,
            });
        }

        if new.discount > subtotal {
            return Err(CommerceError::InvalidInput {
                field: "discount".to_string(),
                message: "Discount cannot exceed the subtotal".to_string(),
            });
        }

        let taxable = subtotal - new.discount;
        let tax = taxable * TAX_RATE;
        let draft = SaleDraft {
            sale_number: generate_sale_number(),
            user_id: new.user_id,
            subtotal,
            discount: new.discount,
            tax,
            total: taxable + tax,
        };

        let id = self.sales.insert(draft, items).await?;
        info!(sale_id = id, "Created sale");
        self.get(id).await
    }

    /// Mark a pending sale completed
    pub async fn complete(&self, id: i64) -> Result<Sale> {
        self.transition(id, SaleStatus::Pending, SaleStatus::Completed)
            .await
    }

    /// Cancel a pending sale
    pub async fn cancel(&self, id: i64) -> Result<Sale> {
        self.transition(id, SaleStatus::Pending, SaleStatus::Cancelled)
            .await
    }

    /// Refund a completed sale
    pub async fn refund(&self, id: i64) -> Result<Sale> {
        self.transition(id, SaleStatus::Completed, SaleStatus::Refunded)
            .await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.load(id).await?;
        self.sales.delete(id).await?;
        info!(sale_id = id, "Removed sale");
        Ok(())
    }

    async fn transition(&self, id: i64, from: SaleStatus, to: SaleStatus) -> Result<Sale> {
        let sale = self.load(id).await?;
        if sale.status != from {
            return Err(CommerceError::InvalidInput {
                field: "status".to_string(),
                message: format!("Sale cannot move from {:?} to {:?}", sale.status, to),
            });
        }

        self.sales.set_status(id, to).await?;
        self.load(id).await
    }

    async fn load(&self, id: i64) -> Result<Sale> {
        self.sales
            .find_by_id(id)
            .await?
            .ok_or(CommerceError::NotFound { entity: "Sale", id })
    }
}

/// Generated human-readable sale identifier
fn generate_sale_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("SALE-{}", &suffix[..12].to_uppercase())
}
