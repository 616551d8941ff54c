//! Line Items

use rusty_money::{Money, iso::Currency};

use crate::ids::ProductId;

/// A single cart line: a product, how many of it, and its unit price.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductId,
    quantity: u32,
    unit_price: Money<'a, Currency>,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item
    pub fn new(
        product: impl Into<ProductId>,
        quantity: u32,
        unit_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            product: product.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the product on this line
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Returns the quantity on this line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price of the line
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Line total in minor units, or `None` on overflow.
    pub fn total_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}

/// Returns line items ordered cheapest unit price first, ties broken by product.
pub fn cheapest_first<'i, 'a>(
    items: impl IntoIterator<Item = &'i LineItem<'a>>,
) -> Vec<&'i LineItem<'a>>
where
    'a: 'i,
{
    let mut items: Vec<&LineItem<'a>> = items.into_iter().collect();

    items.sort_by(|a, b| {
        a.unit_price
            .to_minor_units()
            .cmp(&b.unit_price.to_minor_units())
            .then_with(|| a.product.cmp(&b.product))
    });

    items
}
