use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::ClearInventoryRequest,
        cart::{AddCartItemRequest, UpdateCartItemRequest},
        collections::{CreateCollectionRequest, UpdateCollectionRequest},
        customers::{CreateCustomerRequest, UpdateCustomerRequest},
        orders::{CreateOrderRequest, UpdateOrderRequest},
        products::{CreateProductImageRequest, CreateProductRequest, UpdateProductRequest},
        reviews::{CreateReviewRequest, UpdateReviewRequest},
    },
    entity::{customers::Membership, orders::PaymentStatus},
    models::{
        AddedCartItem, AdminCustomer, AdminOrder, AdminProduct, Cart, CartItem,
        ClearInventoryResult, Collection, Customer, Order, OrderItem, Product, ProductImage,
        Review, SimpleProduct,
    },
    response::ErrorBody,
    routes::{admin, carts, collections, customers, health, images, orders, products, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        collections::list_collections,
        collections::get_collection,
        collections::create_collection,
        collections::update_collection,
        collections::delete_collection,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        images::list_images,
        images::get_image,
        images::create_image,
        images::delete_image,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        carts::create_cart,
        carts::get_cart,
        carts::delete_cart,
        carts::list_items,
        carts::get_item,
        carts::add_item,
        carts::update_item,
        carts::delete_item,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        customers::get_me,
        customers::update_me,
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        admin::list_products,
        admin::clear_inventory,
        admin::list_customers,
        admin::list_collections,
        admin::list_orders
    ),
    components(
        schemas(
            health::HealthData,
            Collection,
            Product,
            SimpleProduct,
            ProductImage,
            Review,
            Cart,
            CartItem,
            AddedCartItem,
            Order,
            OrderItem,
            Customer,
            Membership,
            PaymentStatus,
            AdminProduct,
            AdminCustomer,
            AdminOrder,
            ClearInventoryResult,
            CreateCollectionRequest,
            UpdateCollectionRequest,
            CreateProductRequest,
            UpdateProductRequest,
            CreateProductImageRequest,
            CreateReviewRequest,
            UpdateReviewRequest,
            AddCartItemRequest,
            UpdateCartItemRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            ClearInventoryRequest,
            ErrorBody
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Collections", description = "Product collections"),
        (name = "Products", description = "Catalog products"),
        (name = "Product Images", description = "Images attached to a product"),
        (name = "Reviews", description = "Anonymous product reviews"),
        (name = "Carts", description = "Anonymous carts and their items"),
        (name = "Orders", description = "Orders placed from carts"),
        (name = "Customers", description = "Customer profiles"),
        (name = "Admin", description = "Staff screens"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_store_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/collections/",
            "/products/{product_id}/reviews/",
            "/carts/{cart_id}/items/",
            "/orders/",
            "/customers/me/",
            "/admin/products/clear-inventory/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
