use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::models::{Product, ProductId};

/// Sea-ORM Entity for the Product table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "Product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub product_id: i64,
    pub product_name: String,
    pub price: f64,
    pub stock: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Product::new(model.product_name, model.price, model.stock)
            .with_id(ProductId::Integer(model.product_id))
    }
}

impl ActiveModel {
    /// Insert row; `product_id` is left to the store unless supplied
    pub(crate) fn for_insert(product: &Product, product_id: Option<i64>) -> Self {
        Self {
            product_id: product_id.map_or(NotSet, Set),
            ..Self::data_fields(product)
        }
    }

    /// Only the data columns, for `UPDATE ... SET`
    pub(crate) fn data_fields(product: &Product) -> Self {
        Self {
            product_id: NotSet,
            product_name: Set(product.name.clone()),
            price: Set(product.price),
            stock: Set(product.stock),
        }
    }
}
