pub mod cart;
pub mod cart_item;
pub mod category;
pub mod contact_message;
pub mod order;
pub mod order_item;
pub mod product;
pub mod shipping_address;
pub mod user;

use sea_orm::{
    sea_query::Index, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Schema, Set,
};

use crate::entities::{
    cart::Entity as Cart, cart_item::Entity as CartItem, category::Entity as Category,
    contact_message::Entity as ContactMessage, order::Entity as Order,
    order_item::Entity as OrderItem, product::Entity as Product,
    shipping_address::Entity as ShippingAddress, user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());
    let create_user_table = schema.create_table_from_entity(User);
    let create_category_table = schema.create_table_from_entity(Category);
    let create_product_table = schema.create_table_from_entity(Product);
    let create_cart_table = schema.create_table_from_entity(Cart);
    let create_cart_item_table = schema.create_table_from_entity(CartItem);
    let create_order_table = schema.create_table_from_entity(Order);
    let create_order_item_table = schema.create_table_from_entity(OrderItem);
    let create_shipping_table = schema.create_table_from_entity(ShippingAddress);
    let create_contact_table = schema.create_table_from_entity(ContactMessage);

    db.execute(db.get_database_backend().build(&create_user_table))
        .await
        .expect("Failed to create users schema");
    db.execute(db.get_database_backend().build(&create_category_table))
        .await
        .expect("Failed to create category schema");
    db.execute(db.get_database_backend().build(&create_product_table))
        .await
        .expect("Failed to create products schema");
    db.execute(db.get_database_backend().build(&create_cart_table))
        .await
        .expect("Failed to create cart schema");
    db.execute(db.get_database_backend().build(&create_cart_item_table))
        .await
        .expect("Failed to create cart_item schema");
    db.execute(db.get_database_backend().build(&create_order_table))
        .await
        .expect("Failed to create orders schema");
    db.execute(db.get_database_backend().build(&create_order_item_table))
        .await
        .expect("Failed to create order_item schema");
    db.execute(db.get_database_backend().build(&create_shipping_table))
        .await
        .expect("Failed to create shipping_address schema");
    db.execute(db.get_database_backend().build(&create_contact_table))
        .await
        .expect("Failed to create contact_message schema");

    //(cart_id, product_id) must stay unique so repeat adds merge instead of
    //growing duplicate rows.
    let cart_item_unique = Index::create()
        .name("idx_cart_item_cart_product")
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .to_owned();
    db.execute(db.get_database_backend().build(&cart_item_unique))
        .await
        .expect("Failed to create cart_item unique index");
}

//Seeds the staff account once, so a fresh database has a working admin login.
pub async fn ensure_admin(db: &DatabaseConnection) {
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "ChangeMe123".to_string());

    let existing = User::find()
        .filter(user::Column::Username.eq(&username))
        .one(db)
        .await
        .expect("Failed to look up admin account");

    if existing.is_some() {
        return;
    }

    let password_hash = user::hash_password(&password).expect("Failed to hash admin password");

    let new_admin = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password: Set(password_hash),
        is_staff: Set(true),
        ..Default::default()
    };

    User::insert(new_admin)
        .exec(db)
        .await
        .expect("Failed to seed admin account");
}
