//! Bootstrap data for a fresh database. Each block only runs when its table
//! is empty, so startup seeding is idempotent.

use crate::auth;
use crate::entities::{banner, cart_item, category, product, user};
use crate::errors::ServiceError;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::info;

pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<(), ServiceError> {
    seed_banners(db).await?;
    seed_categories(db).await?;
    seed_products(db).await?;
    seed_users(db).await?;
    seed_cart_items(db).await?;
    Ok(())
}

async fn seed_banners(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if banner::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let rows = [
        ("iPhone 15 launch", "/assets/image/banner/banner1.png", "/pages/product/list.html?category_id=1"),
        ("MacBook Pro limited offer", "/assets/image/banner/banner2.png", "/pages/product/list.html?category_id=2"),
        ("Mate 60 in stock", "/assets/image/banner/banner3.png", "/pages/product/list.html?category_id=1"),
        ("Tablet deals", "/assets/image/banner/banner4.png", "/pages/product/list.html?category_id=3"),
    ]
    .into_iter()
    .map(|(title, image_url, jump_url)| banner::ActiveModel {
        title: Set(title.to_string()),
        image_url: Set(image_url.to_string()),
        jump_url: Set(jump_url.to_string()),
        ..Default::default()
    });

    banner::Entity::insert_many(rows).exec(db).await?;
    info!("seeded banners");
    Ok(())
}

async fn seed_categories(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if category::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let rows = [
        ("Phones", "fa-mobile", 0),
        ("Laptops", "fa-laptop", 0),
        ("Tablets", "fa-tablet", 0),
        ("Accessories", "fa-headphones", 0),
        ("Apple phones", "fa-apple", 1),
        ("Android phones", "fa-android", 1),
    ]
    .into_iter()
    .map(|(name, icon, parent_id)| category::ActiveModel {
        name: Set(name.to_string()),
        icon: Set(icon.to_string()),
        is_show: Set(1),
        parent_id: Set(parent_id),
        ..Default::default()
    });

    category::Entity::insert_many(rows).exec(db).await?;
    info!("seeded categories");
    Ok(())
}

async fn seed_products(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if product::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    // (name, price, category, recommended, stock, image)
    let catalog = [
        ("iPhone 15 Pro Max 256GB", dec!(9999.0), 1, 1, 50, "/assets/image/product/iphone15.png"),
        ("Huawei Mate 60 Pro+ 16GB+512GB", dec!(8999.0), 1, 1, 20, "/assets/image/product/huawei_mate60.png"),
        ("Xiaomi 14 Ultra photography kit", dec!(6999.0), 1, 1, 80, "/assets/image/product/mi14.png"),
        ("Redmi K70 Pro champion edition", dec!(3599.0), 1, 0, 200, "/assets/image/product/mi14.png"),
        ("MacBook Pro 14 M3 Pro", dec!(16999.0), 2, 1, 30, "/assets/image/product/macbook.png"),
        ("Lenovo Legion Y9000P", dec!(9499.0), 2, 0, 60, "/assets/image/product/legion.png"),
        ("iPad Pro 12.9 M2", dec!(8499.0), 3, 1, 40, "/assets/image/product/ipad.png"),
        ("Huawei MatePad Pro 13.2", dec!(5199.0), 3, 0, 90, "/assets/image/product/matepad.png"),
        ("AirPods Pro 2", dec!(1899.0), 4, 0, 150, "/assets/image/product/airpods.png"),
        ("Sony WH-1000XM5", dec!(2399.0), 4, 0, 70, "/assets/image/product/sony_xm5.png"),
    ]
    .into_iter()
    .map(
        |(name, price, category_id, is_recommend, stock, main_image)| product::ActiveModel {
            name: Set(name.to_string()),
            price: Set(price),
            main_image: Set(main_image.to_string()),
            category_id: Set(category_id),
            stock: Set(stock),
            is_recommend: Set(is_recommend),
            is_sale: Set(1),
            ..Default::default()
        },
    );

    product::Entity::insert_many(catalog).exec(db).await?;
    info!("seeded products");
    Ok(())
}

async fn seed_users(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if user::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let accounts = [
        ("test", "123456", "13800138000"),
        ("admin", "admin123", "13900139000"),
        ("user1", "123456", "13700137000"),
    ];

    let mut rows = Vec::with_capacity(accounts.len());
    for (username, password, phone) in accounts {
        rows.push(user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(auth::hash_password(password)?),
            phone: Set(phone.to_string()),
            ..Default::default()
        });
    }

    user::Entity::insert_many(rows).exec(db).await?;
    info!("seeded demo users");
    Ok(())
}

async fn seed_cart_items(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if cart_item::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let now = Utc::now();
    let rows = [(1, 1, 1), (1, 5, 1), (1, 10, 2), (3, 2, 1)].into_iter().map(
        |(user_id, product_id, quantity)| cart_item::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        },
    );

    cart_item::Entity::insert_many(rows).exec(db).await?;
    info!("seeded cart items");
    Ok(())
}
