use crate::{
    entities::{banner, category, product},
    errors::ServiceError,
    Paginated,
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

const DEFAULT_PAGE_SIZE: u64 = 10;
const RECOMMEND_PAGE_SIZE: u64 = 5;

/// Read-only catalog queries: banners, categories, and product browsing.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

/// Filters accepted by the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<i32>,
    pub keyword: Option<String>,
    pub is_recommend: Option<i32>,
    pub promotion: Option<i32>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub icon: String,
    pub parent_id: i32,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub main_image: String,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub main_image: String,
    pub stock: i32,
    pub category_id: i32,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_banners(&self) -> Result<Vec<banner::Model>, ServiceError> {
        let banners = banner::Entity::find()
            .order_by_asc(banner::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(banners)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ServiceError> {
        let categories = category::Entity::find()
            .filter(category::Column::IsShow.eq(1))
            .order_by_asc(category::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(categories
            .into_iter()
            .map(|c| CategoryResponse {
                id: c.id,
                name: c.name,
                icon: c.icon,
                parent_id: c.parent_id,
            })
            .collect())
    }

    /// Paginated product listing over on-sale products, newest first.
    ///
    /// `is_recommend=1` selects the homepage recommendations (smaller default
    /// page); `promotion=1` reuses the recommended set; otherwise category
    /// and keyword filters apply.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Paginated<ProductSummary>, ServiceError> {
        let recommend_only =
            filter.is_recommend == Some(1) || filter.promotion == Some(1);

        let mut condition = Condition::all().add(product::Column::IsSale.eq(1));
        if recommend_only {
            condition = condition.add(product::Column::IsRecommend.eq(1));
        } else {
            if let Some(category_id) = filter.category_id.filter(|id| *id > 0) {
                condition = condition.add(product::Column::CategoryId.eq(category_id));
            }
            if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
                condition = condition.add(product::Column::Name.contains(keyword));
            }
        }

        let page = filter.page.unwrap_or(1).max(1);
        let default_size = if filter.is_recommend == Some(1) {
            RECOMMEND_PAGE_SIZE
        } else {
            DEFAULT_PAGE_SIZE
        };
        let size = filter.size.unwrap_or(default_size).max(1);

        let paginator = product::Entity::find()
            .filter(condition)
            .order_by_desc(product::Column::Id)
            .paginate(&*self.db, size);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        let list = products
            .into_iter()
            .map(|p| ProductSummary {
                id: p.id,
                name: p.name,
                price: p.price,
                main_image: p.main_image,
                stock: p.stock,
            })
            .collect();

        Ok(Paginated::new(list, page, size, total))
    }

    pub async fn get_product(&self, id: i32) -> Result<ProductDetail, ServiceError> {
        let product = product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("product not found".to_string()))?;

        Ok(ProductDetail {
            id: product.id,
            name: product.name,
            price: product.price,
            main_image: product.main_image,
            stock: product.stock,
            category_id: product.category_id,
        })
    }
}
